//! Input state for the frame loop.
//!
//! [`Input`] folds raw window and device events into per-frame state: which
//! keys are held, which went down or up this frame, and how far the mouse
//! moved. The scene reads it once per frame, then the window clears the
//! per-frame parts with `begin_frame`.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    L,
    O,
    Z,
    X,
    C,
    Up,
    Down,
    Left,
    Right,
    Escape,
    /// Any key without a binding.
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyA => KeyCode::A,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyD => KeyCode::D,
            WinitKeyCode::KeyL => KeyCode::L,
            WinitKeyCode::KeyO => KeyCode::O,
            WinitKeyCode::KeyZ => KeyCode::Z,
            WinitKeyCode::KeyX => KeyCode::X,
            WinitKeyCode::KeyC => KeyCode::C,
            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// Keyboard and mouse state tracking.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    /// Raw mouse motion accumulated since the last frame, in pixels.
    mouse_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Key Queries ==========

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key is currently held down.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was released this frame (just went up).
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    // ========== Mouse Queries ==========

    /// Mouse movement since last frame in pixels. Y grows downwards.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    // ========== Event Intake ==========

    /// Record a key going down. Auto-repeat does not count as a new press.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    /// Record a key going up.
    pub fn release(&mut self, key: KeyCode) {
        if self.keys_held.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Add raw mouse motion.
    pub fn add_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta += Vec2::new(dx as f32, dy as f32);
    }

    /// Forget held keys, e.g. when the window loses focus and release
    /// events will not arrive.
    pub fn release_all(&mut self) {
        let held: Vec<KeyCode> = self.keys_held.drain().collect();
        self.keys_released.extend(held);
    }

    /// Called after each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();

        assert!(!input.key_held(KeyCode::W));
        assert!(!input.key_pressed(KeyCode::W));

        input.press(KeyCode::W);
        assert!(input.key_held(KeyCode::W));
        assert!(input.key_pressed(KeyCode::W));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.key_held(KeyCode::W));
        assert!(!input.key_pressed(KeyCode::W));
    }

    #[test]
    fn test_repeat_is_not_a_new_press() {
        let mut input = Input::new();
        input.press(KeyCode::L);
        input.begin_frame();
        input.press(KeyCode::L);
        assert!(!input.key_pressed(KeyCode::L));
    }

    #[test]
    fn test_release() {
        let mut input = Input::new();
        input.press(KeyCode::A);
        input.begin_frame();
        input.release(KeyCode::A);
        assert!(!input.key_held(KeyCode::A));
        assert!(input.key_released(KeyCode::A));
    }

    #[test]
    fn test_release_all() {
        let mut input = Input::new();
        input.press(KeyCode::W);
        input.press(KeyCode::D);
        input.release_all();
        assert!(!input.key_held(KeyCode::W));
        assert!(input.key_released(KeyCode::D));
    }

    #[test]
    fn test_mouse_motion_accumulates() {
        let mut input = Input::new();
        input.add_mouse_motion(3.0, -1.0);
        input.add_mouse_motion(2.0, 4.0);
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
