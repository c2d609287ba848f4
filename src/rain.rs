//! Particle rain.
//!
//! A [`ParticleField`] owns a fixed number of drops. Each step moves every drop
//! by its velocity; a drop that ends up below the ground is put back at a fresh
//! random spawn point instead of being removed, so the working set never
//! changes size.
//!
//! # Example
//!
//! ```
//! use stormview::rain::{ParticleField, RainSettings};
//!
//! let settings = RainSettings { count: 1_000, seed: Some(3), ..Default::default() };
//! let mut field = ParticleField::new(&settings).unwrap();
//! field.tick(1.0 / 60.0);
//! field.for_each(|position| assert!(position.y >= -1.0));
//! ```

use crate::error::SceneError;
use crate::spawn::{self, SpawnVolume};
use crate::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Height below which a drop is recycled.
pub const GROUND_LEVEL: f32 = -1.0;

/// Rain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainSettings {
    /// Number of drops, fixed for the life of the field.
    pub count: usize,
    /// x and z spawn in `[-horizontal_half_extent, horizontal_half_extent]`.
    pub horizontal_half_extent: f32,
    /// Lowest spawn height.
    pub spawn_height_base: f32,
    /// Height band above `spawn_height_base`.
    pub spawn_height_range: f32,
    /// Downward speed in world units per time unit.
    pub fall_speed: f32,
    /// Recycle threshold.
    pub ground_level: f32,
    /// Fixed seed for reproducible rain. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            count: 30_000,
            horizontal_half_extent: 30.0,
            spawn_height_base: 20.0,
            spawn_height_range: 50.0,
            // 0.3 units per frame at 60 fps
            fall_speed: 18.0,
            ground_level: GROUND_LEVEL,
            seed: None,
        }
    }
}

/// A single rain drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raindrop {
    pub position: Vec3,
    /// Fixed at spawn; recycling keeps it.
    pub velocity: Vec3,
}

/// Fixed-size collection of falling drops.
#[derive(Debug, Clone)]
pub struct ParticleField {
    drops: Vec<Raindrop>,
    volume: SpawnVolume,
    ground_level: f32,
    seed: u64,
    step: u64,
}

impl ParticleField {
    /// Allocate and scatter `settings.count` drops.
    ///
    /// Out-of-range settings are brought into range rather than rejected. A
    /// spawn band starting below the ground is raised to it. `fall_speed` is
    /// taken by magnitude, or zero if not finite.
    ///
    /// Fails only if the drop storage cannot be allocated.
    pub fn new(settings: &RainSettings) -> Result<Self, SceneError> {
        let ground_level = if settings.ground_level.is_finite() {
            spawn::clamp_coordinate(settings.ground_level)
        } else {
            GROUND_LEVEL
        };
        let volume = SpawnVolume::new(
            settings.horizontal_half_extent,
            settings.spawn_height_base.max(ground_level),
            settings.spawn_height_range,
        );
        let seed = settings.seed.unwrap_or_else(spawn::entropy_seed);
        let fall_speed = if settings.fall_speed.is_finite() {
            settings.fall_speed.abs()
        } else {
            0.0
        };
        let velocity = Vec3::new(0.0, -fall_speed, 0.0);

        let mut drops = Vec::new();
        drops
            .try_reserve_exact(settings.count)
            .map_err(|source| SceneError::Allocation {
                count: settings.count,
                source,
            })?;
        drops.extend((0..settings.count).map(|index| Raindrop {
            position: volume.sample(&mut spawn::drop_rng(seed, 0, index)),
            velocity,
        }));

        log::debug!(
            "Rain field: {} drops, seed {}, spawn y {}..{}",
            drops.len(),
            seed,
            volume.height_base(),
            volume.height_top()
        );

        Ok(Self {
            drops,
            volume,
            ground_level,
            seed,
            step: 0,
        })
    }

    /// Advance every drop by `velocity * dt`, recycling those that fall below
    /// the ground.
    ///
    /// `dt` is in the unit `fall_speed` is given in; a negative or non-finite
    /// `dt` counts as zero. Returns how many drops were recycled.
    pub fn tick(&mut self, dt: f32) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.step += 1;
        let step = self.step;
        let seed = self.seed;
        let volume = self.volume;
        let ground_level = self.ground_level;

        self.drops
            .par_iter_mut()
            .enumerate()
            .filter_map(|(index, drop)| {
                drop.position += drop.velocity * dt;
                if drop.position.y < ground_level {
                    drop.position = volume.sample(&mut spawn::drop_rng(seed, step, index));
                    Some(())
                } else {
                    None
                }
            })
            .count()
    }

    /// Visit every drop position.
    pub fn for_each<F: FnMut(Vec3)>(&self, mut visit: F) {
        for drop in &self.drops {
            visit(drop.position);
        }
    }

    /// Iterator over drop positions.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.drops.iter().map(|drop| drop.position)
    }

    /// All drops, read-only.
    #[inline]
    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Where recycled drops are placed.
    #[inline]
    pub fn spawn_volume(&self) -> SpawnVolume {
        self.volume
    }

    #[inline]
    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }

    /// Seed in use (the configured one, or the clock-derived one).
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of ticks since creation.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(count: usize) -> RainSettings {
        RainSettings {
            count,
            fall_speed: 0.3,
            seed: Some(1234),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_drops_in_spawn_volume() {
        let field = ParticleField::new(&settings(5_000)).unwrap();
        assert_eq!(field.len(), 5_000);
        let volume = field.spawn_volume();
        for drop in field.drops() {
            assert!(volume.contains(drop.position));
            assert_eq!(drop.velocity, Vec3::new(0.0, -0.3, 0.0));
        }
    }

    #[test]
    fn test_empty_field() {
        let mut field = ParticleField::new(&settings(0)).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.tick(1.0), 0);
        let mut visited = 0;
        field.for_each(|_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_tick_moves_by_velocity() {
        let mut field = ParticleField::new(&settings(100)).unwrap();
        let before: Vec<Vec3> = field.positions().collect();
        assert_eq!(field.tick(1.0), 0);
        for (old, drop) in before.iter().zip(field.drops()) {
            assert_eq!(drop.position, *old + drop.velocity);
        }
        assert_eq!(field.steps(), 1);
    }

    #[test]
    fn test_same_seed_same_rain() {
        let mut a = ParticleField::new(&settings(500)).unwrap();
        let mut b = ParticleField::new(&settings(500)).unwrap();
        for _ in 0..300 {
            assert_eq!(a.tick(1.0), b.tick(1.0));
        }
        assert_eq!(a.drops(), b.drops());
    }

    #[test]
    fn test_zero_dt_is_still() {
        let mut field = ParticleField::new(&settings(50)).unwrap();
        let before: Vec<Vec3> = field.positions().collect();
        field.tick(0.0);
        assert!(field.positions().eq(before.into_iter()));
    }

    #[test]
    fn test_negative_or_nan_dt_is_still() {
        let mut field = ParticleField::new(&settings(50)).unwrap();
        let before: Vec<Vec3> = field.positions().collect();
        for dt in [-1.0, -1_000.0, f32::NAN, f32::NEG_INFINITY, f32::INFINITY] {
            assert_eq!(field.tick(dt), 0);
            assert!(field.positions().eq(before.iter().copied()), "dt {}", dt);
        }
    }

    #[test]
    fn test_spawn_band_below_ground_is_raised() {
        let mut field = ParticleField::new(&RainSettings {
            spawn_height_base: -10.0,
            spawn_height_range: 5.0,
            ground_level: -1.0,
            ..settings(50)
        })
        .unwrap();
        assert_eq!(field.spawn_volume().height_base(), -1.0);

        for _ in 0..20 {
            field.tick(1.0);
            for position in field.positions() {
                assert!(position.y >= field.ground_level(), "drop at {}", position.y);
            }
        }
    }

    #[test]
    fn test_fall_speed_is_sanitized() {
        let upward = ParticleField::new(&RainSettings {
            fall_speed: -0.3,
            ..settings(10)
        })
        .unwrap();
        let broken = ParticleField::new(&RainSettings {
            fall_speed: f32::NAN,
            ..settings(10)
        })
        .unwrap();
        assert!(upward.drops().iter().all(|d| d.velocity == Vec3::new(0.0, -0.3, 0.0)));
        assert!(broken.drops().iter().all(|d| d.velocity == Vec3::ZERO));
    }
}
