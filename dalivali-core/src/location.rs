//! Resolving the viewer's coordinates.
//!
//! A [`Geolocator`] stands in for the platform's location capability. The
//! resolver never fails: a missing capability, a refusal or any error all
//! end up at [`DEFAULT_COORDINATES`].

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;

/// Sofia, Bulgaria.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates::new(42.75, 23.25);

pub const IP_API_URL: &str = "http://ip-api.com/json";

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
    #[error("Location error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Resolve coordinates, rounded to two decimals, or fall back to Sofia.
pub async fn resolve_location(geolocator: Option<&dyn Geolocator>) -> Coordinates {
    let Some(geolocator) = geolocator else {
        tracing::debug!("No geolocation capability, using default location");
        return DEFAULT_COORDINATES;
    };

    match geolocator.current_position().await {
        Ok(pos) => {
            let coords = Coordinates::rounded(pos.latitude, pos.longitude);
            tracing::debug!(?coords, "Resolved current position");
            coords
        }
        Err(e) => {
            tracing::warn!("Geolocation failed ({e}), using default location");
            DEFAULT_COORDINATES
        }
    }
}

/// A position the user typed in, treated as a device fix.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.position)
    }
}

/// The user said no to sharing their location.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Approximate position of the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    base_url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_base_url(IP_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        tracing::debug!(url = %self.base_url, "Looking up position by IP");

        let res = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if !res.status().is_success() {
            return Err(LocationError::Unavailable(format!("status {}", res.status())));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| body.status.clone()),
            )),
        }
    }
}
