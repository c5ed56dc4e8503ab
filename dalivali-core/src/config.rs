use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::Coordinates,
    provider::{SourceId, openmeteo::{CurrentFields, OPEN_METEO_URL}},
    render::{Language, RenderOptions},
};

/// How the current position is obtained when no manual location is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// No location capability at all.
    #[default]
    Off,
    /// Approximate position of the public IP address.
    Ip,
    /// Capability exists but the user refused it.
    Denied,
}

impl TryFrom<&str> for GeolocationMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "off" => Ok(GeolocationMode::Off),
            "ip" => Ok(GeolocationMode::Ip),
            "denied" => Ok(GeolocationMode::Denied),
            _ => Err(anyhow!(
                "Unknown geolocation mode '{value}'. Supported modes: off, ip, denied."
            )),
        }
    }
}

/// Weather API request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub current_fields: CurrentFields,
    pub timezone_auto: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_METEO_URL.to_string(),
            current_fields: CurrentFields::default(),
            timezone_auto: true,
        }
    }
}

/// Rain animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    pub pass_intensity: bool,
    /// Size of the rain container, in terminal cells.
    pub width: u32,
    pub height: u32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            pass_intensity: true,
            width: 60,
            height: 12,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// language = "en"
/// geolocation = "ip"
///
/// [location]
/// latitude = 42.69
/// longitude = 23.32
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub source: SourceId,
    pub geolocation: GeolocationMode,
    /// Manual position; wins over `geolocation` when set.
    pub location: Option<Coordinates>,
    pub api: ApiConfig,
    pub rain: RainConfig,
}

impl Config {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            language: self.language,
            pass_intensity: self.rain.pass_intensity,
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dalivali", "dalivali")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();

        assert_eq!(cfg.language, Language::Bg);
        assert_eq!(cfg.source, SourceId::OpenMeteo);
        assert_eq!(cfg.geolocation, GeolocationMode::Off);
        assert_eq!(cfg.location, None);
        assert_eq!(cfg.api.base_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(cfg.api.current_fields, CurrentFields::DayAndPrecipitation);
        assert!(cfg.api.timezone_auto);
        assert!(cfg.rain.pass_intensity);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
language = "en"
source = "mock"
geolocation = "ip"

[location]
latitude = 42.69
longitude = 23.32

[api]
current_fields = "precipitation"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.language, Language::En);
        assert_eq!(cfg.source, SourceId::Mock);
        assert_eq!(cfg.geolocation, GeolocationMode::Ip);
        assert_eq!(cfg.location, Some(Coordinates::new(42.69, 23.32)));
        assert_eq!(cfg.api.current_fields, CurrentFields::Precipitation);
        assert_eq!(cfg.api.base_url, OPEN_METEO_URL);
        assert_eq!(cfg.rain, RainConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.language = Language::En;
        cfg.location = Some(Coordinates::new(48.21, 16.37));
        cfg.rain.pass_intensity = false;
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "source = \"accuweather\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn geolocation_mode_parsing() {
        assert_eq!(GeolocationMode::try_from("IP").unwrap(), GeolocationMode::Ip);
        assert!(GeolocationMode::try_from("gps").is_err());
    }
}
