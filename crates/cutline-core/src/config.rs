//! Editor configuration.
//!
//! Every field has a default, so a partial JSON file only overrides what it
//! names.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CutlineError, Result};
use crate::time::RationalTime;

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots retained.
    pub history_capacity: usize,
    /// Trim floor: no element may become shorter than this.
    pub min_element_duration: RationalTime,
    /// Reported timeline duration never drops below this, so an empty
    /// timeline still has a ruler.
    pub min_timeline_duration: RationalTime,
    /// Duration given to new elements that do not specify one.
    pub default_element_duration: RationalTime,
    /// Initial zoom in pixels per second.
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Extra pixels appended to the laid-out timeline width.
    pub timeline_padding_px: f64,
    /// Canvas used when a project carries no dimensions.
    pub default_width: u32,
    pub default_height: u32,
    pub default_fps: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            min_element_duration: RationalTime::new(1, 10),
            min_timeline_duration: RationalTime::from_secs(10),
            default_element_duration: RationalTime::from_secs(5),
            default_zoom: 50.0,
            min_zoom: 10.0,
            max_zoom: 200.0,
            timeline_padding_px: 200.0,
            default_width: 1080,
            default_height: 1920,
            default_fps: 30,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON bytes and validate.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| CutlineError::Serialization(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(CutlineError::InvalidParameter(
                "history_capacity must be at least 1".into(),
            ));
        }
        if !self.min_element_duration.is_positive() {
            return Err(CutlineError::InvalidParameter(
                "min_element_duration must be positive".into(),
            ));
        }
        if self.default_element_duration < self.min_element_duration {
            return Err(CutlineError::InvalidParameter(
                "default_element_duration is below min_element_duration".into(),
            ));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(CutlineError::InvalidParameter(format!(
                "zoom bounds [{}, {}] are invalid",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.default_width == 0 || self.default_height == 0 {
            return Err(CutlineError::InvalidParameter(
                "default canvas must be non-empty".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a zoom request into the configured bounds.
    pub fn clamp_zoom(&self, px_per_sec: f64) -> f64 {
        if px_per_sec.is_nan() {
            return self.default_zoom;
        }
        px_per_sec.clamp(self.min_zoom, self.max_zoom)
    }
}
