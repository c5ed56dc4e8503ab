use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::ApiConfig,
    model::{Coordinates, Forecast},
    provider::{FetchError, truncate_body},
};

use super::PrecipitationSource;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Which `current` variables to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurrentFields {
    Precipitation,
    #[default]
    DayAndPrecipitation,
}

impl CurrentFields {
    pub fn as_query(&self) -> &'static str {
        match self {
            CurrentFields::Precipitation => "precipitation",
            CurrentFields::DayAndPrecipitation => "is_day,precipitation",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    current_fields: CurrentFields,
    timezone_auto: bool,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new(
        base_url: impl Into<String>,
        current_fields: CurrentFields,
        timezone_auto: bool,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            current_fields,
            timezone_auto,
            http: Client::new(),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.base_url.clone(), api.current_fields, api.timezone_auto)
    }

    fn query(&self, coordinates: Coordinates) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", self.current_fields.as_query().to_string()),
            ("forecast_days", "1".to_string()),
        ];
        if self.timezone_auto {
            query.push(("timezone", "auto".to_string()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    precipitation: f64,
    time: String,
    is_day: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

#[async_trait]
impl PrecipitationSource for OpenMeteoSource {
    async fn fetch(&self, coordinates: Coordinates) -> Result<Forecast, FetchError> {
        let query = self.query(coordinates);
        tracing::debug!(url = %self.base_url, ?query, "Requesting current precipitation");

        let res = self.http.get(&self.base_url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OmResponse = serde_json::from_str(&body)?;
        let current = parsed.current;

        let forecast = Forecast::new(
            coordinates,
            current.precipitation,
            current.time,
            current.is_day.map(|d| d != 0),
        )?;

        tracing::debug!(
            precipitation = forecast.precipitation,
            time = %forecast.time,
            "Received current conditions"
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, fields: CurrentFields, tz: bool) -> OpenMeteoSource {
        OpenMeteoSource::new(format!("{}/v1/forecast", server.uri()), fields, tz)
    }

    #[tokio::test]
    async fn fetches_day_and_precipitation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "42.7"))
            .and(query_param("longitude", "23.32"))
            .and(query_param("current", "is_day,precipitation"))
            .and(query_param("forecast_days", "1"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 42.7,
                "longitude": 23.32,
                "current": {
                    "time": "2024-01-01T10:00",
                    "interval": 900,
                    "is_day": 1,
                    "precipitation": 2.5
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coords = Coordinates::new(42.7, 23.32);
        let forecast = source(&server, CurrentFields::DayAndPrecipitation, true)
            .fetch(coords)
            .await
            .unwrap();

        assert_eq!(forecast.coordinates, coords);
        assert_eq!(forecast.precipitation, 2.5);
        assert_eq!(forecast.time, "2024-01-01T10:00");
        assert_eq!(forecast.is_day, Some(true));
    }

    #[tokio::test]
    async fn precipitation_only_without_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("current", "precipitation"))
            .and(query_param_is_missing("timezone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": { "time": "2024-01-01T10:00", "precipitation": 0 }
            })))
            .mount(&server)
            .await;

        let forecast = source(&server, CurrentFields::Precipitation, false)
            .fetch(Coordinates::new(42.75, 23.25))
            .await
            .unwrap();

        assert_eq!(forecast.precipitation, 0.0);
        assert_eq!(forecast.is_day, None);
        assert!(!forecast.is_raining());
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":true,"reason":"Latitude must be in range"}"#),
            )
            .mount(&server)
            .await;

        let err = source(&server, CurrentFields::default(), true)
            .fetch(Coordinates::new(142.0, 23.0))
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Latitude must be in range"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"hourly\":{}}"))
            .mount(&server)
            .await;

        let err = source(&server, CurrentFields::default(), true)
            .fetch(Coordinates::new(42.75, 23.25))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn negative_precipitation_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": { "time": "2024-01-01T10:00", "precipitation": -1.0 }
            })))
            .mount(&server)
            .await;

        let err = source(&server, CurrentFields::default(), true)
            .fetch(Coordinates::new(42.75, 23.25))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidPrecipitation(_)));
    }

    #[test]
    fn current_fields_query_values() {
        assert_eq!(CurrentFields::Precipitation.as_query(), "precipitation");
        assert_eq!(CurrentFields::DayAndPrecipitation.as_query(), "is_day,precipitation");
    }
}
