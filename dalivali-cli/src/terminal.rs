//! Terminal versions of the page and the rain animation.

use std::{collections::HashMap, fmt, io::Write, time::Duration};

use colored::{ColoredString, Colorize};
use dalivali_core::{
    ElementId, Page, RainAnimator, RainOptions, render::MAX_RAINFALL_INTENSITY,
};
use rand::Rng;

/// Intensity used when the renderer leaves it to the animation.
const DEFAULT_INTENSITY: f64 = 3.0;
const FRAMES: usize = 40;
const FRAME_DELAY: Duration = Duration::from_millis(80);

#[derive(Debug, Default)]
struct Element {
    text: String,
    classes: Vec<String>,
}

/// In-memory `result`, `data` and `rain-container` elements.
#[derive(Debug)]
pub struct TerminalPage {
    elements: HashMap<ElementId, Element>,
    container: (u32, u32),
}

impl TerminalPage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            elements: HashMap::new(),
            container: (width, height),
        }
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.elements.get(&id).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn classes(&self, id: ElementId) -> &[String] {
        self.elements.get(&id).map(|e| e.classes.as_slice()).unwrap_or(&[])
    }

    fn themed(&self, text: &str) -> ColoredString {
        let theme = self
            .classes(ElementId::RainContainer)
            .last()
            .map(String::as_str)
            .unwrap_or("");

        match theme {
            "day-clear" => text.bold().yellow(),
            "day-rain" => text.bold().blue(),
            "night-clear" => text.bold().magenta(),
            "night-rain" => text.bold().cyan(),
            _ => text.bold(),
        }
    }
}

impl Page for TerminalPage {
    fn set_text(&mut self, id: ElementId, text: &str) {
        self.elements.entry(id).or_default().text = text.to_string();
    }

    fn add_class(&mut self, id: ElementId, class: &str) {
        let element = self.elements.entry(id).or_default();
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
    }

    fn dimensions(&self, id: ElementId) -> (u32, u32) {
        match id {
            ElementId::RainContainer => self.container,
            _ => (self.container.0, 1),
        }
    }
}

impl fmt::Display for TerminalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "  {}", self.themed(self.text(ElementId::Result)))?;
        writeln!(f)?;
        writeln!(f, "  {}", self.text(ElementId::Data).dimmed())
    }
}

/// Falling drops in a fixed-size box.
#[derive(Debug, Clone)]
pub struct RainField {
    width: u32,
    height: u32,
    /// Chance of a new drop per column per frame.
    density: f64,
    drops: Vec<(u32, u32)>,
}

impl RainField {
    pub fn new(options: RainOptions) -> Self {
        let intensity = options.rainfall_intensity.unwrap_or(DEFAULT_INTENSITY);
        let density = (intensity / MAX_RAINFALL_INTENSITY).clamp(0.0, 1.0) * 0.3;

        Self {
            width: options.width,
            height: options.height,
            density,
            drops: Vec::new(),
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn drops(&self) -> &[(u32, u32)] {
        &self.drops
    }

    /// Move every drop one row down and spawn new ones on the top row.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let height = self.height;
        for drop in &mut self.drops {
            drop.1 += 1;
        }
        self.drops.retain(|&(_, y)| y < height);

        if height == 0 {
            return;
        }
        for x in 0..self.width {
            if rng.random_bool(self.density) {
                self.drops.push((x, 0));
            }
        }
    }

    pub fn frame(&self) -> String {
        let width = self.width as usize;
        let mut rows = vec![vec![' '; width]; self.height as usize];
        for &(x, y) in &self.drops {
            rows[y as usize][x as usize] = '|';
        }

        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Plays the rain animation after the page has been printed.
#[derive(Debug, Default)]
pub struct TerminalRain {
    field: Option<RainField>,
}

impl TerminalRain {
    pub fn is_attached(&self) -> bool {
        self.field.is_some()
    }

    pub async fn play(&mut self) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        if field.height == 0 || field.width == 0 {
            return;
        }

        let mut stdout = std::io::stdout();
        let mut rng = rand::rng();
        for i in 0..FRAMES {
            field.step(&mut rng);
            if i > 0 {
                // Redraw over the previous frame.
                if field.height > 1 {
                    print!("\x1b[{}A", field.height - 1);
                }
                print!("\r");
            }
            print!("{}", field.frame().blue());
            if let Err(e) = stdout.flush() {
                tracing::debug!("Stopping rain animation: {e}");
                break;
            }
            tokio::time::sleep(FRAME_DELAY).await;
        }
        println!();
    }
}

impl RainAnimator for TerminalRain {
    fn attach(&mut self, id: ElementId, options: RainOptions) {
        tracing::debug!(%id, ?options, "Attaching rain");
        self.field = Some(RainField::new(options));
    }
}
