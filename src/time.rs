//! Frame clock.
//!
//! # Example
//!
//! ```
//! use stormview::time::Time;
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0));
//!
//! // In the frame loop:
//! let dt = time.update();
//! assert_eq!(dt, 1.0);
//! assert_eq!(time.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// Delta time, frame counting and FPS for the frame loop.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    delta_secs: f32,
    elapsed_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// Replaces the measured delta when set.
    fixed_delta: Option<f32>,
    /// Cap on the measured delta.
    max_delta: Option<f32>,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
            max_delta: None,
        }
    }

    /// Advance one frame. Call once per frame; returns the delta time.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        let measured = match self.max_delta {
            Some(max) => raw_delta.min(max),
            None => raw_delta,
        };
        self.delta_secs = self.fixed_delta.unwrap_or(measured);
        self.elapsed_secs += self.delta_secs;
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Time step of the last frame.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Sum of all deltas so far, i.e. simulated time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last measurement window.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Use a fixed step instead of measured time. `None` restores real time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Cap the measured step. Does not affect a fixed delta.
    pub fn set_max_delta(&mut self, max: Option<f32>) {
        self.max_delta = max.map(|m| m.max(0.0));
    }

    /// Whether the FPS value changed on the last `update`.
    pub fn fps_updated(&self) -> bool {
        self.fps_update_time == self.last_frame && self.frame_count > 0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
