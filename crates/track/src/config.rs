use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::spatial::IndexParams;

/// Tunables for the editing engine.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Endpoint gap below which a track counts as almost a loop.
    pub loop_threshold_m: f64,
    /// Endpoint gap at or below which the endpoints are merged exactly.
    pub loop_exact_tolerance_m: f64,
    /// Cap on the magnitude of a move/stretch drag vector.
    pub move_max_m: f64,
    pub quick_fix_spacing_m: f64,
    pub quick_fix_max_passes: usize,
    pub bezier_samples_per_span: usize,
    pub centroid_passes: usize,
    pub bend_spacing_m: f64,
    /// `None` keeps every entry.
    pub history_limit: Option<usize>,
    /// Initial search radius around a pick ray; grows until a point is found.
    pub pick_radius_m: f64,
    /// Half-size of the planar cell used by `all_near`.
    pub contains_half_size_m: f64,
    pub split_start_buffer_m: f64,
    pub split_end_buffer_m: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            loop_threshold_m: 200.0,
            loop_exact_tolerance_m: 1.0,
            move_max_m: 100.0,
            quick_fix_spacing_m: 25.0,
            quick_fix_max_passes: 32,
            bezier_samples_per_span: 4,
            centroid_passes: 3,
            bend_spacing_m: 5.0,
            history_limit: None,
            pick_radius_m: 5.0,
            contains_half_size_m: 10.0,
            split_start_buffer_m: 60.0,
            split_end_buffer_m: 140.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EditorConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            pick_radius_m: self.pick_radius_m,
            contains_half_size_m: self.contains_half_size_m,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("loop_threshold_m", self.loop_threshold_m),
            ("loop_exact_tolerance_m", self.loop_exact_tolerance_m),
            ("move_max_m", self.move_max_m),
            ("quick_fix_spacing_m", self.quick_fix_spacing_m),
            ("bend_spacing_m", self.bend_spacing_m),
            ("pick_radius_m", self.pick_radius_m),
            ("contains_half_size_m", self.contains_half_size_m),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive distance, got {value}"),
                });
            }
        }

        for (field, value) in [
            ("split_start_buffer_m", self.split_start_buffer_m),
            ("split_end_buffer_m", self.split_end_buffer_m),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must not be negative, got {value}"),
                });
            }
        }

        if self.loop_exact_tolerance_m >= self.loop_threshold_m {
            return Err(ConfigError::Invalid {
                field: "loop_exact_tolerance_m",
                reason: "must be smaller than loop_threshold_m".to_string(),
            });
        }
        if self.bezier_samples_per_span == 0 {
            return Err(ConfigError::Invalid {
                field: "bezier_samples_per_span",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                reason: "use null for unbounded history".to_string(),
            });
        }
        Ok(())
    }
}
