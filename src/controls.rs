//! Key bindings.
//!
//! | Key | Action |
//! |-----|--------|
//! | W / S or Up / Down | move forward / backward |
//! | A / D or Left / Right | strafe left / right |
//! | mouse | look around |
//! | L | toggle the scene light |
//! | O | toggle the point light |
//! | Z / X / C | fill / wireframe / point rendering |
//! | Esc | quit |

use crate::camera::{Camera, MoveDirection};
use crate::input::{Input, KeyCode};

/// How scene geometry is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Fill,
    Wireframe,
    Points,
}

/// Discrete actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleLight,
    TogglePointLight,
    SetRenderMode(RenderMode),
    Quit,
}

const MOVE_BINDINGS: [(KeyCode, MoveDirection); 8] = [
    (KeyCode::W, MoveDirection::Forward),
    (KeyCode::Up, MoveDirection::Forward),
    (KeyCode::S, MoveDirection::Backward),
    (KeyCode::Down, MoveDirection::Backward),
    (KeyCode::A, MoveDirection::Left),
    (KeyCode::Left, MoveDirection::Left),
    (KeyCode::D, MoveDirection::Right),
    (KeyCode::Right, MoveDirection::Right),
];

const COMMAND_BINDINGS: [(KeyCode, Command); 6] = [
    (KeyCode::L, Command::ToggleLight),
    (KeyCode::O, Command::TogglePointLight),
    (KeyCode::Z, Command::SetRenderMode(RenderMode::Fill)),
    (KeyCode::X, Command::SetRenderMode(RenderMode::Wireframe)),
    (KeyCode::C, Command::SetRenderMode(RenderMode::Points)),
    (KeyCode::Escape, Command::Quit),
];

/// Maps input onto camera motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraControls {
    /// World units per time unit.
    pub move_speed: f32,
    /// Degrees per pixel.
    pub mouse_sensitivity: f32,
}

impl CameraControls {
    /// Move and rotate `camera` from this frame's input.
    ///
    /// Each held direction moves once per frame even if two keys are bound to
    /// it. Mouse Y is inverted so pushing the mouse away looks up.
    pub fn apply(&self, input: &Input, camera: &mut Camera, dt: f32) {
        let step = self.move_speed * dt.max(0.0);
        let mut moved: Vec<MoveDirection> = Vec::with_capacity(4);
        for (key, direction) in MOVE_BINDINGS {
            if input.key_held(key) && !moved.contains(&direction) {
                camera.move_in(direction, step);
                moved.push(direction);
            }
        }

        let delta = input.mouse_delta() * self.mouse_sensitivity;
        if delta != glam::Vec2::ZERO {
            camera.rotate(-delta.y, delta.x);
        }
    }
}

/// Commands whose key went down this frame, in binding order.
pub fn pressed_commands(input: &Input) -> impl Iterator<Item = Command> + '_ {
    COMMAND_BINDINGS
        .into_iter()
        .filter(move |(key, _)| input.key_pressed(*key))
        .map(|(_, command)| command)
}
