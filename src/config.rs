//! Viewer configuration.
//!
//! Configurations are plain JSON. Every field has a default, so a file only
//! needs the values it changes:
//!
//! ```json
//! {
//!   "rain": { "count": 50000, "seed": 7 },
//!   "flash": { "chance_one_in": 250 },
//!   "simulation": { "step": "per_frame" }
//! }
//! ```

use crate::camera::Projection;
use crate::error::ConfigError;
use crate::flash::FlashSettings;
use crate::lighting::LightingSettings;
use crate::rain::RainSettings;
use crate::spawn::MAX_EXTENT;
use crate::uniforms::DropInstance;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How simulation time advances each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Scale motion by wall-clock frame time.
    #[default]
    RealTime,
    /// Advance by a fixed [`PER_FRAME_DELTA`] every frame, whatever the frame
    /// rate. The simulation runs faster on faster machines.
    PerFrame,
}

/// Step used by [`StepMode::PerFrame`]. With the default speeds this moves
/// rain 0.3 and the camera 0.03 units per frame.
pub const PER_FRAME_DELTA: f32 = 1.0 / 60.0;

impl StepMode {
    /// Fixed step to feed the frame clock, if any.
    pub fn fixed_delta(self) -> Option<f32> {
        match self {
            StepMode::RealTime => None,
            StepMode::PerFrame => Some(PER_FRAME_DELTA),
        }
    }
}

/// Largest rain field the viewer accepts. The GPU instance buffer for this
/// many drops fits wgpu's default 256 MiB buffer limit.
pub const MAX_DROPS: usize = (256 << 20) / std::mem::size_of::<DropInstance>();

/// Frame timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub step: StepMode,
    /// Upper bound on a real-time step, so a stalled frame does not teleport
    /// the rain through the ground.
    pub max_delta: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            step: StepMode::RealTime,
            max_delta: 0.1,
        }
    }
}

/// Window setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Hide and lock the cursor for mouse-look.
    pub grab_cursor: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Stormview".into(),
            width: 1920,
            height: 1080,
            vsync: true,
            grab_cursor: true,
        }
    }
}

/// Camera placement and controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// World units per time unit while a movement key is held.
    pub move_speed: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub projection: Projection,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(-1.1, 0.9, 2.75),
            target: Vec3::new(-1.4, 1.0, 0.0),
            up: Vec3::Y,
            // 0.03 units per frame at 60 fps
            move_speed: 1.8,
            mouse_sensitivity: 0.1,
            projection: Projection::default(),
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowSettings,
    pub simulation: SimulationSettings,
    pub camera: CameraSettings,
    pub rain: RainSettings,
    pub flash: FlashSettings,
    pub lighting: LightingSettings,
}

impl ViewerConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the viewer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rain = &self.rain;
        non_negative("rain.horizontal_half_extent", rain.horizontal_half_extent)?;
        non_negative("rain.spawn_height_range", rain.spawn_height_range)?;
        non_negative("rain.fall_speed", rain.fall_speed)?;
        finite("rain.spawn_height_base", rain.spawn_height_base)?;
        finite("rain.ground_level", rain.ground_level)?;
        if rain.count > MAX_DROPS {
            return Err(ConfigError::Invalid(format!(
                "rain.count ({}) exceeds the maximum of {}",
                rain.count, MAX_DROPS
            )));
        }
        within_extent("rain.horizontal_half_extent", rain.horizontal_half_extent)?;
        within_extent("rain.spawn_height_base", rain.spawn_height_base)?;
        within_extent("rain.ground_level", rain.ground_level)?;
        within_extent(
            "rain.spawn_height_base + rain.spawn_height_range",
            rain.spawn_height_base + rain.spawn_height_range,
        )?;
        if rain.spawn_height_base < rain.ground_level {
            return Err(ConfigError::Invalid(format!(
                "rain.spawn_height_base ({}) is below rain.ground_level ({})",
                rain.spawn_height_base, rain.ground_level
            )));
        }

        non_negative("flash.duration", self.flash.duration)?;
        non_negative("camera.move_speed", self.camera.move_speed)?;
        finite("camera.mouse_sensitivity", self.camera.mouse_sensitivity)?;

        let projection = &self.camera.projection;
        if !(projection.fov_y_degrees > 0.0 && projection.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.projection.fov_y_degrees must be in (0, 180), got {}",
                projection.fov_y_degrees
            )));
        }
        if !(projection.near > 0.0 && projection.far > projection.near) {
            return Err(ConfigError::Invalid(format!(
                "camera.projection needs 0 < near < far, got near {} far {}",
                projection.near, projection.far
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if !(self.simulation.max_delta > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.max_delta must be positive, got {}",
                self.simulation.max_delta
            )));
        }
        Ok(())
    }
}

fn finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be finite, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Invalid(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(())
}

fn within_extent(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.abs() <= MAX_EXTENT {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be within {:e} of the origin, got {}",
            name, MAX_EXTENT, value
        )))
    }
}
