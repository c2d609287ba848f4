//! Spawn volume sampling for rain drops.
//!
//! Drops spawn uniformly inside an axis-aligned slab: a square in XZ centred on
//! the origin and a band of heights above the ground.
//!
//! Every drop that needs a random position gets its own RNG, derived from the
//! field seed, the step number and the drop index. That keeps recycling
//! independent of iteration order, so a parallel tick is reproducible.

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Largest coordinate magnitude a spawn volume covers. Keeps every sampling
/// range, and the span between its ends, finite.
pub const MAX_EXTENT: f32 = f32::MAX / 4.0;

/// Region new drops are placed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnVolume {
    half_extent: f32,
    height_base: f32,
    height_range: f32,
}

impl SpawnVolume {
    /// Create a spawn volume.
    ///
    /// * `half_extent` - x and z are sampled in `[-half_extent, half_extent]`
    /// * `height_base` - lowest spawn height
    /// * `height_range` - y is sampled in `[height_base, height_base + height_range]`
    ///
    /// Negative sizes are taken by magnitude and non-finite values become zero.
    /// Everything is clamped so the volume stays within [`MAX_EXTENT`] of the
    /// origin; sampling is never handed an empty or overflowing range.
    pub fn new(half_extent: f32, height_base: f32, height_range: f32) -> Self {
        let height_base = clamp_coordinate(height_base);
        Self {
            half_extent: finite_or_zero(half_extent).abs().min(MAX_EXTENT),
            height_base,
            height_range: finite_or_zero(height_range)
                .abs()
                .min(MAX_EXTENT - height_base.max(0.0)),
        }
    }

    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    #[inline]
    pub fn height_base(&self) -> f32 {
        self.height_base
    }

    #[inline]
    pub fn height_range(&self) -> f32 {
        self.height_range
    }

    /// Highest spawn height.
    #[inline]
    pub fn height_top(&self) -> f32 {
        self.height_base + self.height_range
    }

    /// Uniform random point inside the volume.
    ///
    /// Height is drawn first, then x and z.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let y = rng.gen_range(self.height_base..=self.height_top());
        let x = rng.gen_range(-self.half_extent..=self.half_extent);
        let z = rng.gen_range(-self.half_extent..=self.half_extent);
        Vec3::new(x, y, z)
    }

    /// Whether `point` lies inside the volume (bounds inclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_extent
            && point.z.abs() <= self.half_extent
            && point.y >= self.height_base
            && point.y <= self.height_top()
    }
}

/// RNG for one drop at one simulation step.
pub(crate) fn drop_rng(seed: u64, step: u64, index: usize) -> SmallRng {
    let stream = splitmix64(seed ^ splitmix64(step));
    SmallRng::seed_from_u64(splitmix64(stream ^ index as u64))
}

/// Seed taken from the wall clock, for runs without a configured seed.
pub(crate) fn entropy_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Finite value within `[-MAX_EXTENT, MAX_EXTENT]`.
pub(crate) fn clamp_coordinate(value: f32) -> f32 {
    finite_or_zero(value).clamp(-MAX_EXTENT, MAX_EXTENT)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
