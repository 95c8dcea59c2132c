//! Configuration management for feedback thresholds
//!
//! This module provides runtime configuration loading from JSON files so
//! thresholds for each feedback kind can be tuned without recompilation.
//! Every threshold section for a feedback kind is optional on purpose: a
//! kind without its section reports a configuration error instead of
//! running on guessed values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::FeedbackKind;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

/// Named numeric thresholds consumed by the ratio engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Diameter of the region searched around a live sample for the
    /// closest reference sample
    #[serde(default = "default_scan_diameter")]
    pub closest_point_scan_diameter: f64,
    #[serde(default)]
    pub accuracy: Option<AccuracyThresholds>,
    #[serde(default)]
    pub pressure: Option<PressureThresholds>,
    #[serde(default)]
    pub tilt: Option<TiltThresholds>,
    #[serde(default)]
    pub speed: Option<SpeedThresholds>,
}

fn default_scan_diameter() -> f64 {
    80.0
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            closest_point_scan_diameter: default_scan_diameter(),
            accuracy: Some(AccuracyThresholds::default()),
            pressure: Some(PressureThresholds::default()),
            tilt: Some(TiltThresholds::default()),
            speed: Some(SpeedThresholds::default()),
        }
    }
}

/// Positional deviation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyThresholds {
    /// Distance from the reference within which no feedback is given;
    /// the ratio saturates at four times this distance
    pub max_deviation_radius: f64,
}

impl Default for AccuracyThresholds {
    fn default() -> Self {
        Self {
            max_deviation_radius: 10.0,
        }
    }
}

/// Pressure thresholds, as magnitudes relative to the reference pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureThresholds {
    pub high_pressure_start: f64,
    pub high_pressure_cutoff: f64,
    pub low_pressure_start: f64,
    pub low_pressure_cutoff: f64,
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            high_pressure_start: 0.1,
            high_pressure_cutoff: 0.2,
            low_pressure_start: 0.1,
            low_pressure_cutoff: 0.2,
        }
    }
}

/// Tilt thresholds in degrees; saturates at twice `angle_deviation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltThresholds {
    pub angle_deviation: f64,
}

impl Default for TiltThresholds {
    fn default() -> Self {
        Self {
            angle_deviation: 10.0,
        }
    }
}

/// Speed thresholds in units per second above the reference speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedThresholds {
    pub high_speed_start: f64,
    pub high_speed_cutoff: f64,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            high_speed_start: 500.0,
            high_speed_cutoff: 1000.0,
        }
    }
}

/// Which feedback kind drives each output channel, and how it is rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub visual: Option<FeedbackKind>,
    #[serde(default)]
    pub audio: Option<FeedbackKind>,
    #[serde(default)]
    pub visual_style: VisualStyle,
    #[serde(default)]
    pub audio_style: AudioStyle,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            visual: Some(FeedbackKind::Accuracy),
            audio: Some(FeedbackKind::Pressure),
            visual_style: VisualStyle::default(),
            audio_style: AudioStyle::default(),
        }
    }
}

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Pen colors used for visual feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    /// Ink color with no deviation
    pub base_color: Rgba,
    /// Target color for positive ratios (too far, too hard, too fast)
    pub high_color: Rgba,
    /// Target color for negative ratios (too light)
    pub low_color: Rgba,
    /// Color approached once the deviation passes its cutoff
    pub severe_color: Rgba,
    pub pen_width: f64,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            base_color: Rgba::new(0, 0, 0, 255),
            high_color: Rgba::new(230, 40, 40, 255),
            low_color: Rgba::new(40, 90, 230, 255),
            severe_color: Rgba::new(120, 0, 0, 255),
            pen_width: 2.0,
        }
    }
}

/// Tone parameters used for audio feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStyle {
    /// Tone frequency for a neutral ratio
    pub base_frequency_hz: f64,
    /// Pitch shift in octaves at ratio ±1
    pub octave_span: f64,
    /// Glide time between consecutive tones
    pub portamento_ms: f64,
}

impl Default for AudioStyle {
    fn default() -> Self {
        Self {
            base_frequency_hz: 440.0,
            octave_span: 1.0,
            portamento_ms: 30.0,
        }
    }
}

/// Batched comparison parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Error zones narrower than this fraction of the progress axis are dropped
    pub min_error_highlighting_fraction: f64,
    /// Neighbors on each side averaged into each plotted value
    pub data_points_averaging_neighbors: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            min_error_highlighting_fraction: 0.01,
            data_points_averaging_neighbors: 2,
        }
    }
}

impl AppConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file is missing or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
