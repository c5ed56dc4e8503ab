use serde::{Deserialize, Serialize};

use crate::provider::FetchError;

/// Round to two decimal places, half-up (`-0.125` becomes `-0.12`).
pub fn round_to_2nd_dec(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build coordinates with both fields rounded to two decimals.
    pub fn rounded(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_to_2nd_dec(latitude),
            longitude: round_to_2nd_dec(longitude),
        }
    }
}

/// Current conditions for the coordinates the request was made for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub coordinates: Coordinates,
    /// Millimetres over the preceding interval, never negative.
    pub precipitation: f64,
    /// Timestamp as reported by the API, e.g. `2024-01-01T10:00`.
    pub time: String,
    /// `None` when the request did not ask for the day/night flag.
    pub is_day: Option<bool>,
}

impl Forecast {
    pub fn new(
        coordinates: Coordinates,
        precipitation: f64,
        time: impl Into<String>,
        is_day: Option<bool>,
    ) -> Result<Self, FetchError> {
        if !precipitation.is_finite() || precipitation < 0.0 {
            return Err(FetchError::InvalidPrecipitation(precipitation));
        }

        Ok(Self {
            coordinates,
            precipitation,
            time: time.into(),
            is_day,
        })
    }

    pub fn is_raining(&self) -> bool {
        self.precipitation > 0.0
    }
}
