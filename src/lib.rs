//! # Stormview
//!
//! A first-person viewer for a night storm: tens of thousands of rain drops
//! falling through a lit scene, with random lightning flashes.
//!
//! The simulation runs on the CPU and knows nothing about the GPU. The window
//! loop feeds input and a time step into a [`Scene`], then hands a
//! [`FrameState`](scene::FrameState) and the rain positions to the renderer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stormview::Viewer;
//!
//! fn main() -> Result<(), stormview::ViewerError> {
//!     Viewer::new().with_particle_count(30_000).run()
//! }
//! ```
//!
//! ## Core Pieces
//!
//! | Piece | Type |
//! |-------|------|
//! | First-person camera | [`Camera`] |
//! | Rain | [`ParticleField`] |
//! | Lightning | [`FlashEffect`] |
//! | Light toggles and composition | [`SceneLighting`] |
//! | Everything together | [`Scene`] |
//!
//! All of them can be driven headless, which is how the tests use them:
//!
//! ```
//! use stormview::prelude::*;
//!
//! let mut config = ViewerConfig::default();
//! config.rain.count = 100;
//! config.rain.seed = Some(1);
//!
//! let mut scene = Scene::new(&config).unwrap();
//! let mut input = Input::new();
//! input.press(KeyCode::W);
//!
//! scene.update(&input, 1.0 / 60.0);
//! let frame = scene.frame(16.0 / 9.0);
//! assert_eq!(frame.camera_position, scene.camera().position());
//! ```
//!
//! ## Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `W` `A` `S` `D` / arrows | Move |
//! | Mouse | Look |
//! | `L` | Toggle the scene light |
//! | `O` | Toggle the point light |
//! | `Z` `X` `C` | Fill / wireframe / point rendering |
//! | `Esc` | Quit |

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod flash;
mod gpu;
pub mod input;
pub mod lighting;
pub mod mesh;
pub mod rain;
pub mod scene;
pub mod shaders;
pub mod spawn;
pub mod time;
pub mod uniforms;
mod viewer;

pub use camera::{Camera, MoveDirection, Projection};
pub use config::{StepMode, ViewerConfig};
pub use controls::{Command, RenderMode};
pub use error::{ConfigError, GpuError, SceneError, ViewerError};
pub use flash::{Chance, FlashEffect, FlashSettings, FlashState, Trigger};
pub use glam::{Vec2, Vec3, Vec4};
pub use lighting::{LightState, PointLight, SceneLighting};
pub use rain::{ParticleField, RainSettings, Raindrop};
pub use scene::{FrameState, Scene, UpdateOutcome};
pub use spawn::SpawnVolume;
pub use viewer::Viewer;

/// Convenient re-exports for common usage.
///
/// ```
/// use stormview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::{Camera, MoveDirection, Projection};
    pub use crate::config::{StepMode, ViewerConfig};
    pub use crate::controls::RenderMode;
    pub use crate::flash::{FlashEffect, FlashSettings, Trigger};
    pub use crate::input::{Input, KeyCode};
    pub use crate::lighting::SceneLighting;
    pub use crate::rain::{ParticleField, RainSettings};
    pub use crate::scene::Scene;
    pub use crate::time::Time;
    pub use crate::viewer::Viewer;
    pub use crate::{Vec2, Vec3, Vec4};
}
