use serde::{Deserialize, Serialize};

use crate::markers::DEFAULT_MAX_MARKERS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid view options JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Waterfall needs at least one row")]
    NoRows,
    #[error("dB range is empty: min {min} >= max {max}")]
    EmptyRange { min: f64, max: f64 },
    #[error("Spectrum percentage {0} is outside 0..=100")]
    SpectrumPercent(f64),
}

/// CSS colours used when drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub magnitudes: String,
    pub max_hold: String,
    pub markers: String,
    pub live_marker: String,
    pub text: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "white".into(),
            magnitudes: "blue".into(),
            max_hold: "green".into(),
            markers: "red".into(),
            live_marker: "black".into(),
            text: "black".into(),
        }
    }
}

/// Construction options for a [`crate::SpectrumView`]. Every field is
/// optional in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub center_hz: f64,
    pub span_hz: f64,
    /// Initial bin count; follows the first frame.
    pub wf_size: u32,
    /// Waterfall rows, which is also the history capacity.
    pub wf_rows: u32,
    pub spectrum_percent: f64,
    pub spectrum_percent_step: f64,
    pub averaging: u32,
    pub max_hold: bool,
    pub min_db: f64,
    pub max_db: f64,
    pub max_markers: usize,
    pub spectrum_gradient: bool,
    pub palette: Palette,
    /// `log` level name for the browser console.
    pub log_level: String,
    /// Frame/snapshot server. `None` derives it from the page host.
    pub websocket_url: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            center_hz: 0.0,
            span_hz: 0.0,
            wf_size: 0,
            wf_rows: 2048,
            spectrum_percent: 25.0,
            spectrum_percent_step: 5.0,
            averaging: 0,
            max_hold: false,
            min_db: -80.0,
            max_db: 20.0,
            max_markers: DEFAULT_MAX_MARKERS,
            spectrum_gradient: false,
            palette: Palette::default(),
            log_level: "info".into(),
            websocket_url: None,
        }
    }
}

impl ViewOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wf_rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.min_db >= self.max_db {
            return Err(ConfigError::EmptyRange {
                min: self.min_db,
                max: self.max_db,
            });
        }
        if !(0.0..=100.0).contains(&self.spectrum_percent) {
            return Err(ConfigError::SpectrumPercent(self.spectrum_percent));
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
