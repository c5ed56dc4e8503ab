use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use crate::{
    model::{Coordinates, Forecast},
    provider::FetchError,
};

use super::PrecipitationSource;

/// Offline stand-in for the weather API: always a dry night.
#[derive(Debug, Clone)]
pub struct MockSource {
    delay: Duration,
}

impl MockSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl PrecipitationSource for MockSource {
    async fn fetch(&self, coordinates: Coordinates) -> Result<Forecast, FetchError> {
        tokio::time::sleep(self.delay).await;

        let time = Local::now().format("%Y-%m-%dT%H:%M").to_string();
        Forecast::new(coordinates, 0.0, time, Some(false))
    }
}
