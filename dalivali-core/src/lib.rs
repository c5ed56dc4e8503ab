//! Core library for `dalivali`, the "does it rain?" check.
//!
//! This crate defines:
//! - Shared domain models (coordinates, forecast)
//! - Location resolution with a fallback to Sofia
//! - Abstraction over precipitation sources (Open-Meteo, offline mock)
//! - Rendering rules against an abstract page
//! - Configuration handling
//!
//! It is used by `dalivali-cli`, but the page and animation traits let other
//! front-ends reuse the same pipeline.

pub mod config;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;

pub use config::{Config, GeolocationMode};
pub use location::{DEFAULT_COORDINATES, Geolocator, LocationError, resolve_location};
pub use model::{Coordinates, Forecast};
pub use pipeline::check;
pub use provider::{FetchError, PrecipitationSource, SourceId};
pub use render::{ElementId, Language, Page, RainAnimator, RainOptions, RenderOptions, render};
