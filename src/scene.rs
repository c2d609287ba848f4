//! Scene state and the per-frame update.
//!
//! [`Scene`] owns the camera, the rain, the flash effect and the lighting
//! toggles. [`Scene::update`] runs them in a fixed order:
//!
//! 1. key commands and camera movement from input
//! 2. rain step
//! 3. flash step
//!
//! The renderer then reads a [`FrameState`] and the rain positions. Nothing in
//! here touches the GPU.

use crate::camera::{Camera, Projection};
use crate::config::ViewerConfig;
use crate::controls::{self, CameraControls, Command, RenderMode};
use crate::error::SceneError;
use crate::flash::{Chance, FlashEffect, Trigger};
use crate::input::Input;
use crate::lighting::{LightState, SceneLighting};
use crate::rain::ParticleField;
use glam::{Mat4, Vec3};

/// Everything the renderer needs for one frame, besides the rain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light: LightState,
    /// Whether to draw the flash overlay.
    pub flash_active: bool,
    /// Overlay strength in `[0, 1]`.
    pub flash_intensity: f32,
    pub render_mode: RenderMode,
}

impl FrameState {
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// What an update asked the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub quit: bool,
    /// Rain drops recycled this frame.
    pub recycled: usize,
}

/// Owned simulation state for the viewer.
pub struct Scene<T: Trigger = Chance> {
    camera: Camera,
    projection: Projection,
    controls: CameraControls,
    rain: ParticleField,
    flash: FlashEffect<T>,
    lighting: SceneLighting,
    render_mode: RenderMode,
}

impl Scene<Chance> {
    /// Build the scene described by `config`.
    pub fn new(config: &ViewerConfig) -> Result<Self, SceneError> {
        Self::with_flash(config, FlashEffect::new(&config.flash))
    }
}

impl<T: Trigger> Scene<T> {
    /// Build a scene around an existing flash effect.
    pub fn with_flash(config: &ViewerConfig, flash: FlashEffect<T>) -> Result<Self, SceneError> {
        let camera_settings = &config.camera;
        Ok(Self {
            camera: Camera::new(camera_settings.position, camera_settings.target, camera_settings.up),
            projection: camera_settings.projection,
            controls: CameraControls {
                move_speed: camera_settings.move_speed,
                mouse_sensitivity: camera_settings.mouse_sensitivity,
            },
            rain: ParticleField::new(&config.rain)?,
            flash,
            lighting: SceneLighting::new(&config.lighting),
            render_mode: RenderMode::default(),
        })
    }

    /// Advance the scene by one frame.
    pub fn update(&mut self, input: &Input, dt: f32) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        for command in controls::pressed_commands(input) {
            match command {
                Command::ToggleLight => {
                    let on = self.lighting.toggle_ambient();
                    log::info!("Scene light {}", if on { "on" } else { "off" });
                }
                Command::TogglePointLight => {
                    let on = self.lighting.toggle_point_light();
                    log::info!("Point light {}", if on { "on" } else { "off" });
                }
                Command::SetRenderMode(mode) => {
                    if mode != self.render_mode {
                        log::info!("Render mode {:?}", mode);
                        self.render_mode = mode;
                    }
                }
                Command::Quit => outcome.quit = true,
            }
        }

        self.controls.apply(input, &mut self.camera, dt);
        outcome.recycled = self.rain.tick(dt);
        self.flash.tick(dt);

        outcome
    }

    /// Snapshot for the renderer.
    pub fn frame(&self, aspect: f32) -> FrameState {
        FrameState {
            view: self.camera.view_matrix(),
            projection: self.projection.matrix(aspect),
            camera_position: self.camera.position(),
            light: self.lighting.resolve(&self.flash),
            flash_active: self.flash.is_active(),
            flash_intensity: self.flash.intensity(),
            render_mode: self.render_mode,
        }
    }

    /// Fall back to another render mode, e.g. when the GPU cannot draw the
    /// requested one.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn rain(&self) -> &ParticleField {
        &self.rain
    }

    #[inline]
    pub fn flash(&self) -> &FlashEffect<T> {
        &self.flash
    }

    #[inline]
    pub fn lighting(&self) -> &SceneLighting {
        &self.lighting
    }

    #[inline]
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }
}
