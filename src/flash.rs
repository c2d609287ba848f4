//! Lightning flash effect.
//!
//! A two-state process. While idle, every tick rolls a die and may start a
//! flash. While flashing, a timer counts down by the elapsed time and the
//! effect returns to idle once it runs out. The current light colour follows
//! the state: the flash colour while flashing, the default colour otherwise.
//!
//! ```text
//!            trigger fires
//!   Idle ───────────────────▶ Flashing { remaining = duration }
//!    ▲                              │
//!    └──────── remaining <= 0 ──────┘
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Flash parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashSettings {
    /// How long a flash stays active.
    pub duration: f32,
    /// Each idle tick starts a flash with probability `1 / chance_one_in`.
    /// Zero disables flashes.
    pub chance_one_in: u32,
    /// Light colour while flashing.
    pub flash_color: Vec3,
    /// Light colour while idle.
    pub default_color: Vec3,
    /// Fixed seed for the trigger. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FlashSettings {
    fn default() -> Self {
        Self {
            duration: 0.5,
            chance_one_in: 100,
            flash_color: Vec3::splat(10.0),
            default_color: Vec3::new(0.1, 0.3, 0.3),
            seed: None,
        }
    }
}

/// State of a [`FlashEffect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashState {
    Idle,
    Flashing {
        /// Time left before the flash ends.
        remaining: f32,
    },
}

/// Decides whether an idle tick starts a flash.
pub trait Trigger {
    fn fires(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Trigger for F {
    fn fires(&mut self) -> bool {
        self()
    }
}

/// One-in-N random trigger.
#[derive(Debug, Clone)]
pub struct Chance {
    one_in: u32,
    rng: SmallRng,
}

impl Chance {
    pub fn new(one_in: u32, seed: u64) -> Self {
        Self {
            one_in,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Trigger for Chance {
    fn fires(&mut self) -> bool {
        self.one_in > 0 && self.rng.gen_range(0..self.one_in) == 0
    }
}

/// Randomised lightning flash.
#[derive(Debug, Clone)]
pub struct FlashEffect<T: Trigger = Chance> {
    state: FlashState,
    duration: f32,
    flash_color: Vec3,
    default_color: Vec3,
    light_color: Vec3,
    trigger: T,
}

impl FlashEffect<Chance> {
    /// Idle flash effect driven by a [`Chance`] trigger.
    pub fn new(settings: &FlashSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(crate::spawn::entropy_seed);
        Self::with_trigger(settings, Chance::new(settings.chance_one_in, seed))
    }
}

impl<T: Trigger> FlashEffect<T> {
    /// Idle flash effect with a custom trigger.
    pub fn with_trigger(settings: &FlashSettings, trigger: T) -> Self {
        Self {
            state: FlashState::Idle,
            duration: settings.duration.max(0.0),
            flash_color: settings.flash_color,
            default_color: settings.default_color,
            light_color: settings.default_color,
            trigger,
        }
    }

    /// Run one transition step. Negative or NaN `dt` counts as zero.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        match self.state {
            FlashState::Idle => {
                if self.trigger.fires() {
                    log::debug!("Lightning flash for {:.2}s", self.duration);
                    self.state = FlashState::Flashing {
                        remaining: self.duration,
                    };
                    self.light_color = self.flash_color;
                }
            }
            FlashState::Flashing { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.state = FlashState::Idle;
                    self.light_color = self.default_color;
                } else {
                    self.state = FlashState::Flashing { remaining };
                }
            }
        }
    }

    /// True while flashing; gates the overlay draw.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, FlashState::Flashing { .. })
    }

    #[inline]
    pub fn state(&self) -> FlashState {
        self.state
    }

    /// Light colour for this frame.
    #[inline]
    pub fn light_color(&self) -> Vec3 {
        self.light_color
    }

    #[inline]
    pub fn default_color(&self) -> Vec3 {
        self.default_color
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Fraction of the flash still to run, 1 at the start and 0 when idle.
    pub fn intensity(&self) -> f32 {
        match self.state {
            FlashState::Idle => 0.0,
            FlashState::Flashing { .. } if self.duration <= 0.0 => 1.0,
            FlashState::Flashing { remaining } => (remaining / self.duration).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn once() -> impl FnMut() -> bool {
        let mut fired = false;
        move || !std::mem::replace(&mut fired, true)
    }

    #[test]
    fn test_starts_idle_with_default_color() {
        let flash = FlashEffect::new(&FlashSettings::default());
        assert_eq!(flash.state(), FlashState::Idle);
        assert!(!flash.is_active());
        assert_eq!(flash.light_color(), Vec3::new(0.1, 0.3, 0.3));
        assert_eq!(flash.intensity(), 0.0);
    }

    #[test]
    fn test_trigger_starts_flash_without_decrement() {
        let settings = FlashSettings::default();
        let mut flash = FlashEffect::with_trigger(&settings, once());
        flash.tick(0.1);
        assert_eq!(flash.state(), FlashState::Flashing { remaining: 0.5 });
        assert_eq!(flash.light_color(), settings.flash_color);
        assert_eq!(flash.intensity(), 1.0);
    }

    #[test]
    fn test_short_tick_keeps_flashing() {
        let settings = FlashSettings::default();
        let mut flash = FlashEffect::with_trigger(&settings, once());
        flash.tick(0.0);
        flash.tick(0.2);
        assert!(flash.is_active());
        assert_eq!(flash.light_color(), settings.flash_color);
        assert!((flash.intensity() - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_exact_duration_ends_flash() {
        let settings = FlashSettings::default();
        let mut flash = FlashEffect::with_trigger(&settings, once());
        flash.tick(0.0);
        flash.tick(0.5);
        assert_eq!(flash.state(), FlashState::Idle);
        assert_eq!(flash.light_color(), settings.default_color);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut flash = FlashEffect::with_trigger(&FlashSettings::default(), once());
        flash.tick(0.0);
        flash.tick(-5.0);
        flash.tick(f32::NAN);
        assert_eq!(flash.state(), FlashState::Flashing { remaining: 0.5 });
    }

    #[test]
    fn test_chance_bounds() {
        let mut never = Chance::new(0, 9);
        let mut always = Chance::new(1, 9);
        for _ in 0..100 {
            assert!(!never.fires());
            assert!(always.fires());
        }
    }

    #[test]
    fn test_chance_rate_is_plausible() {
        let mut chance = Chance::new(100, 2024);
        let hits = (0..100_000).filter(|_| chance.fires()).count();
        assert!((700..1300).contains(&hits), "hits = {hits}");
    }
}
