use crate::error::Result;
use crate::resample::{Rounding, SampleOrigin, Sampling};
use serde::Deserialize;
use std::path::Path;

/// Degrees the image turns per completed frame.
pub const ANGULAR_STEP_DEGREES: f64 = 5.0;

/// Side of the square frame buffer, in pixels.
pub const DEFAULT_TARGET_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub target_size: usize,
    pub angular_step_deg: f64,
    pub rounding: Rounding,
    pub sample_origin: SampleOrigin,
    /// Restart the frame counter when a new image arrives mid-animation.
    pub reset_on_reload: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            angular_step_deg: ANGULAR_STEP_DEGREES,
            rounding: Rounding::Nearest,
            sample_origin: SampleOrigin::ZeroBased,
            reset_on_reload: true,
        }
    }
}

impl Config {
    pub fn sampling(&self) -> Sampling {
        Sampling {
            rounding: self.rounding,
            origin: self.sample_origin,
        }
    }

    pub fn from_json_str(json_text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json_text)?;
        Ok(config.sanitized())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded config from {}: {config:?}", path.as_ref().display());
        Ok(config)
    }

    // A zero-sized target has no pixels to draw into.
    fn sanitized(mut self) -> Self {
        if self.target_size == 0 {
            log::warn!("target_size 0 is unusable, using {DEFAULT_TARGET_SIZE}");
            self.target_size = DEFAULT_TARGET_SIZE;
        }
        if !self.angular_step_deg.is_finite() {
            log::warn!("angular_step_deg must be finite, using {ANGULAR_STEP_DEGREES}");
            self.angular_step_deg = ANGULAR_STEP_DEGREES;
        }
        self
    }
}
