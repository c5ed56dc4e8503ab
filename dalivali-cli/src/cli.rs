use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dalivali_core::{
    Config, Coordinates, GeolocationMode, Geolocator, Language, SourceId,
    location::{DeniedGeolocator, FixedGeolocator, IpGeolocator},
    provider::default_source_from_config,
};
use inquire::{Confirm, CustomType, Select};

use crate::terminal::{TerminalPage, TerminalRain};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dalivali", version, about = "Does it rain right now?")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether it is raining (the default).
    Check(CheckArgs),

    /// Interactively set language, location permission and defaults.
    Configure,

    /// Print the path of the configuration file.
    ConfigPath,
}

#[derive(Debug, Default, Args)]
pub struct CheckArgs {
    /// Latitude of a fixed position, in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of a fixed position, in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// How to find the current position: off, ip or denied.
    #[arg(long, value_parser = parse_geolocation)]
    pub locate: Option<GeolocationMode>,

    /// Use the offline mock instead of the weather API.
    #[arg(long)]
    pub mock: bool,

    /// Output language: bg or en.
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Print the result without playing the rain animation.
    #[arg(long)]
    pub no_animation: bool,
}

impl CheckArgs {
    /// Command-line flags win over the config file.
    fn apply(&self, config: &mut Config) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.location = Some(Coordinates::new(lat, lon));
        }
        if let Some(mode) = self.locate {
            config.geolocation = mode;
            if self.lat.is_none() {
                config.location = None;
            }
        }
        if self.mock {
            config.source = SourceId::Mock;
        }
        if let Some(lang) = self.lang {
            config.language = lang;
        }
    }
}

fn parse_geolocation(s: &str) -> anyhow::Result<GeolocationMode> {
    GeolocationMode::try_from(s)
}

fn parse_language(s: &str) -> anyhow::Result<Language> {
    Language::try_from(s)
}

fn geolocator_for(config: &Config) -> Option<Box<dyn Geolocator>> {
    if let Some(position) = config.location {
        return Some(Box::new(FixedGeolocator::new(position)));
    }

    match config.geolocation {
        GeolocationMode::Off => None,
        GeolocationMode::Ip => Some(Box::new(IpGeolocator::new())),
        GeolocationMode::Denied => Some(Box::new(DeniedGeolocator)),
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or_else(|| Command::Check(CheckArgs::default())) {
            Command::Check(args) => check(args).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn check(args: CheckArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    args.apply(&mut config);
    tracing::debug!(?config, "Effective configuration");

    let geolocator = geolocator_for(&config);
    let source = default_source_from_config(&config);

    let mut page = TerminalPage::new(config.rain.width, config.rain.height);
    let mut rain = TerminalRain::default();

    let result = dalivali_core::check(
        geolocator.as_deref(),
        source.as_ref(),
        &mut page,
        &mut rain,
        config.render_options(),
    )
    .await;

    if let Err(e) = &result {
        tracing::error!("Weather fetch failed: {e}");
    }
    let forecast = result.context("Could not get the current weather")?;
    tracing::info!(
        precipitation = forecast.precipitation,
        coordinates = ?forecast.coordinates,
        "Rendered forecast"
    );

    print!("{page}");
    if !args.no_animation {
        rain.play().await;
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let languages = vec!["bg", "en"];
    let current = match config.language {
        Language::Bg => 0,
        Language::En => 1,
    };
    let lang = Select::new("Language:", languages)
        .with_starting_cursor(current)
        .prompt()?;
    config.language = Language::try_from(lang)?;

    let share = Confirm::new("Allow looking up your approximate location by IP address?")
        .with_default(config.geolocation == GeolocationMode::Ip)
        .prompt()?;
    config.geolocation = if share { GeolocationMode::Ip } else { GeolocationMode::Denied };

    let manual = Confirm::new("Use a fixed location instead?")
        .with_default(config.location.is_some())
        .prompt()?;
    config.location = if manual {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 42.69")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. 23.32")
            .prompt()?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    config.rain.pass_intensity = Confirm::new("Scale the rain animation with precipitation?")
        .with_default(config.rain.pass_intensity)
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_check() {
        let cli = Cli::try_parse_from(["dalivali"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn check_flags_override_config() {
        let cli = Cli::try_parse_from([
            "dalivali", "check", "--lat", "-33.87", "--lon", "151.21", "--mock", "--lang", "en",
        ])
        .unwrap();
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check");
        };

        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.location, Some(Coordinates::new(-33.87, 151.21)));
        assert_eq!(config.source, SourceId::Mock);
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["dalivali", "check", "--lat", "42.7"]).is_err());
    }

    #[test]
    fn locate_clears_configured_position() {
        let cli = Cli::try_parse_from(["dalivali", "check", "--locate", "denied"]).unwrap();
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check");
        };

        let mut config = Config {
            location: Some(Coordinates::new(1.0, 2.0)),
            ..Config::default()
        };
        args.apply(&mut config);

        assert_eq!(config.location, None);
        assert_eq!(config.geolocation, GeolocationMode::Denied);
        assert!(format!("{:?}", geolocator_for(&config)).contains("DeniedGeolocator"));
    }

    #[test]
    fn geolocator_selection() {
        let config = Config::default();
        assert!(geolocator_for(&config).is_none());

        let config = Config {
            geolocation: GeolocationMode::Ip,
            ..Config::default()
        };
        assert!(format!("{:?}", geolocator_for(&config)).contains("IpGeolocator"));

        let config = Config {
            geolocation: GeolocationMode::Ip,
            location: Some(Coordinates::new(1.0, 2.0)),
            ..Config::default()
        };
        assert!(format!("{:?}", geolocator_for(&config)).contains("FixedGeolocator"));
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!(Cli::try_parse_from(["dalivali", "check", "--lang", "de"]).is_err());
    }
}
