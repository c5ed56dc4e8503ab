//! Putting a [`Forecast`] on a page.
//!
//! The page and the rain animation are collaborators behind traits so the
//! same rendering rules drive a terminal, a test double or anything else
//! that has a `result`, a `data` and a `rain-container` element.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::Forecast;

/// Rain animations get at most this intensity.
pub const MAX_RAINFALL_INTENSITY: f64 = 6.0;

const EN_SPACE: char = '\u{2002}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Result,
    Data,
    RainContainer,
}

impl ElementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::Result => "result",
            ElementId::Data => "data",
            ElementId::RainContainer => "rain-container",
        }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Page {
    fn set_text(&mut self, id: ElementId, text: &str);
    fn add_class(&mut self, id: ElementId, class: &str);
    /// Current rendered `(width, height)` of an element.
    fn dimensions(&self, id: ElementId) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainOptions {
    pub width: u32,
    pub height: u32,
    pub rainfall_intensity: Option<f64>,
}

pub trait RainAnimator {
    fn attach(&mut self, id: ElementId, options: RainOptions);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Bg,
    En,
}

impl Language {
    pub fn yes(&self) -> &'static str {
        match self {
            Language::Bg => "ДА",
            Language::En => "YES",
        }
    }

    pub fn no(&self) -> &'static str {
        match self {
            Language::Bg => "НЕ",
            Language::En => "NO",
        }
    }

    fn date_format(&self) -> &'static str {
        match self {
            Language::Bg => "%-d.%m.%Y г.",
            Language::En => "%-m/%-d/%Y",
        }
    }

    // en-US prints "10:00:00 AM"; dropping the last `:` group leaves "10:00".
    fn time_format(&self) -> &'static str {
        match self {
            Language::Bg => "%H:%M",
            Language::En => "%-I:%M",
        }
    }
}

impl TryFrom<&str> for Language {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "bg" => Ok(Language::Bg),
            "en" => Ok(Language::En),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported: bg, en.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub language: Language,
    /// Hand the (clamped) precipitation to the animation.
    pub pass_intensity: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            pass_intensity: true,
        }
    }
}

pub fn rainfall_intensity(precipitation: f64) -> f64 {
    precipitation.min(MAX_RAINFALL_INTENSITY)
}

/// `day-rain`, `day-clear`, `night-rain` or `night-clear`.
pub fn theme_class(forecast: &Forecast) -> String {
    let day = if forecast.is_day.unwrap_or(false) { "day" } else { "night" };
    let sky = if forecast.is_raining() { "rain" } else { "clear" };
    format!("{day}-{sky}")
}

/// Localized date plus time truncated to minutes.
pub fn format_timestamp(time: &str, language: Language) -> String {
    let parsed = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S"));

    match parsed {
        Ok(dt) => format!(
            "{} {}",
            dt.format(language.date_format()),
            dt.format(language.time_format())
        ),
        Err(_) => {
            tracing::debug!(time, "Unrecognized timestamp, showing it as is");
            time.to_string()
        }
    }
}

pub fn data_line(forecast: &Forecast, language: Language) -> String {
    let c = forecast.coordinates;
    format!(
        "lat. {}{EN_SPACE}long. {}{EN_SPACE}{}",
        c.latitude,
        c.longitude,
        format_timestamp(&forecast.time, language)
    )
}

pub fn render(
    forecast: &Forecast,
    page: &mut dyn Page,
    animator: &mut dyn RainAnimator,
    options: RenderOptions,
) {
    let language = options.language;

    if forecast.is_raining() {
        let (width, height) = page.dimensions(ElementId::RainContainer);
        let rainfall_intensity = options
            .pass_intensity
            .then(|| rainfall_intensity(forecast.precipitation));

        animator.attach(
            ElementId::RainContainer,
            RainOptions {
                width,
                height,
                rainfall_intensity,
            },
        );
        page.set_text(ElementId::Result, language.yes());
    } else {
        page.set_text(ElementId::Result, language.no());
    }

    page.add_class(ElementId::RainContainer, &theme_class(forecast));
    page.set_text(ElementId::Data, &data_line(forecast, language));
}
