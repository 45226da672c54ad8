//! Scene state: the chaos/formed mode, frame timing, and the interpolation
//! helpers every category animator shares.
//!
//! Ownership contract: `SceneMode` has a single writer (the gesture bridge,
//! or the manual keyboard toggle routed through [`forest::Forest`]); every
//! animator reads it once per frame inside the same frame callback. Each
//! instance record is owned and mutated exclusively by its category's
//! animator, so no locking is required under the single render loop.

pub mod decor;
pub mod elements;
pub mod foliage;
pub mod forest;
pub mod lights;
pub mod ornaments;

pub use forest::Forest;

/// Global scene arrangement. There are no intermediate states; transitions
/// are continuous positional interpolation toward the active target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneMode {
    #[default]
    Chaos,
    Formed,
}

impl SceneMode {
    pub fn toggled(self) -> Self {
        match self {
            SceneMode::Chaos => SceneMode::Formed,
            SceneMode::Formed => SceneMode::Chaos,
        }
    }

    pub fn is_formed(self) -> bool {
        matches!(self, SceneMode::Formed)
    }
}

/// Per-frame interpolation factor, clamped so a lerp can never overshoot the
/// segment between the previous position and the active target, no matter
/// how large a frame delta gets.
#[inline]
pub fn lerp_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Framerate-independent exponential smoothing of `current` toward `target`
/// with decay constant `lambda`. Drives the foliage progress scalar.
#[inline]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-lambda * dt).exp())
}

/// Cubic ease-in-out, applied to the foliage blend in the rendering stage.
#[inline]
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powf(3.0) / 2.0
    }
}

/// Time management for the animation loop.
#[derive(Debug, Clone)]
pub struct TimeState {
    pub current_time: f32,
    pub delta_time: f32,
    pub last_frame_time: std::time::Instant,
    pub frame_count: u64,
    pub last_fps_instant: std::time::Instant,
}

impl Default for TimeState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            delta_time: 0.0,
            last_frame_time: std::time::Instant::now(),
            frame_count: 0,
            last_fps_instant: std::time::Instant::now(),
        }
    }
}

impl TimeState {
    pub fn update(&mut self) {
        let now = std::time::Instant::now();
        self.delta_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.current_time += self.delta_time;
        self.last_frame_time = now;
        self.frame_count += 1;
    }

    /// Advance by a fixed delta. Used by tests and headless stepping.
    pub fn advance(&mut self, dt: f32) {
        self.delta_time = dt;
        self.current_time += dt;
        self.frame_count += 1;
    }

    pub fn fps_sample(&mut self) -> Option<f32> {
        let now = std::time::Instant::now();
        let elapsed = now.duration_since(self.last_fps_instant).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.last_fps_instant = now;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_factor_never_exceeds_one() {
        assert_eq!(lerp_factor(10.0, 2.0), 1.0);
        assert_eq!(lerp_factor(0.0, 2.0), 0.0);
        let f = lerp_factor(0.016, 1.5);
        assert!(f > 0.0 && f < 1.0);
    }

    #[test]
    fn damp_converges_without_overshoot() {
        let mut p = 0.0f32;
        let mut last = p;
        for _ in 0..600 {
            p = damp(p, 1.0, 1.5, 1.0 / 60.0);
            assert!(p >= last && p <= 1.0);
            last = p;
        }
        assert!((1.0 - p) < 1e-3);
    }

    #[test]
    fn damp_is_stable_under_mode_flips() {
        let mut p = 0.0f32;
        for frame in 0..100 {
            let target = if frame % 2 == 0 { 1.0 } else { 0.0 };
            p = damp(p, target, 1.5, 1.0 / 60.0);
            assert!(p.is_finite() && (0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn ease_is_anchored_and_monotone() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_cubic(1.0) - 1.0).abs() < 1e-6);
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_cubic(i as f32 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn fixed_step_accumulates_time() {
        let mut t = TimeState::default();
        for _ in 0..60 {
            t.advance(1.0 / 60.0);
        }
        assert!((t.current_time - 1.0).abs() < 1e-4);
        assert_eq!(t.frame_count, 60);
    }

    #[test]
    fn mode_toggles_between_two_values() {
        assert_eq!(SceneMode::default(), SceneMode::Chaos);
        assert_eq!(SceneMode::Chaos.toggled(), SceneMode::Formed);
        assert_eq!(SceneMode::Formed.toggled(), SceneMode::Chaos);
    }
}
