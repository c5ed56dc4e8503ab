use crate::{
    Config, Coordinates, Forecast,
    provider::{mock::MockSource, openmeteo::OpenMeteoSource},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug};

pub mod mock;
pub mod openmeteo;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse weather JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid precipitation value {0}")]
    InvalidPrecipitation(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceId {
    #[default]
    OpenMeteo,
    Mock,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::OpenMeteo => "open-meteo",
            SourceId::Mock => "mock",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::OpenMeteo, SourceId::Mock]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" => Ok(SourceId::OpenMeteo),
            "mock" => Ok(SourceId::Mock),
            _ => Err(anyhow::anyhow!(
                "Unknown weather source '{value}'. Supported sources: open-meteo, mock."
            )),
        }
    }
}

impl TryFrom<String> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SourceId::try_from(value.as_str())
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.as_str().to_string()
    }
}

/// Where the current precipitation comes from.
#[async_trait]
pub trait PrecipitationSource: Send + Sync + Debug {
    async fn fetch(&self, coordinates: Coordinates) -> Result<Forecast, FetchError>;
}

/// Construct a source from config and explicit SourceId.
pub fn source_from_config(id: SourceId, config: &Config) -> Box<dyn PrecipitationSource> {
    match id {
        SourceId::OpenMeteo => Box::new(OpenMeteoSource::from_config(&config.api)),
        SourceId::Mock => Box::new(MockSource::default()),
    }
}

/// Construct the source named by `config.source`.
pub fn default_source_from_config(config: &Config) -> Box<dyn PrecipitationSource> {
    source_from_config(config.source, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
