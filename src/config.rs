use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigFileError;

/// Smallest window that still fits the subplots, slider and buttons.
pub const MIN_WINDOW_WIDTH: usize = 320;
pub const MIN_WINDOW_HEIGHT: usize = 240;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Total map applications per run.
    pub iterations: usize,
    /// Trailing iterations kept for plotting.
    pub last_num: usize,
    /// Grid points per parameter axis.
    pub resolution: usize,
    pub window: WindowConfig,
    pub progress: ProgressConfig,
    pub animation: AnimationConfig,
    pub point_alpha: f32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        DiagramConfig {
            iterations: 1000,
            last_num: 100,
            resolution: 300,
            window: WindowConfig::default(),
            progress: ProgressConfig::default(),
            animation: AnimationConfig::default(),
            point_alpha: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub fps: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1200, height: 600, fps: 30 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub width: usize,
    pub step: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig { width: 32, step: 0.032347 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames in one sweep across the first parameter.
    pub frames: usize,
    pub interval_ms: u64,
}

impl AnimationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig { frames: 100, interval_ms: 20 }
    }
}

impl DiagramConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DiagramConfig =
            serde_json::from_str(&text).map_err(|source| ConfigFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        let invalid = |msg: &str| Err(ConfigFileError::Invalid(msg.to_string()));

        if self.animation.frames == 0 {
            return invalid("animation.frames must be positive");
        }
        if self.animation.interval_ms == 0 {
            return invalid("animation.interval_ms must be positive");
        }
        if !(self.progress.step > 0.0 && self.progress.step <= 1.0) {
            return invalid("progress.step must be in (0, 1]");
        }
        if !(self.point_alpha > 0.0 && self.point_alpha <= 1.0) {
            return invalid("point_alpha must be in (0, 1]");
        }
        if self.window.width < MIN_WINDOW_WIDTH || self.window.height < MIN_WINDOW_HEIGHT {
            return Err(ConfigFileError::Invalid(format!(
                "window must be at least {}x{}, got {}x{}",
                MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT, self.window.width, self.window.height
            )));
        }
        if self.resolution == 0 {
            return invalid("resolution must be positive");
        }
        Ok(())
    }
}
