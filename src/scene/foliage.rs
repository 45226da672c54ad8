//! Fine-particle foliage field.
//!
//! Unlike the other categories, foliage carries no per-instance current
//! position: a single scene-wide progress scalar is damped toward 0 (chaos)
//! or 1 (formed), and the per-instance blend (cubic-eased, plus a small
//! time-based wobble) is evaluated in the rendering stage. That asymmetry is
//! deliberate; it keeps the per-frame CPU cost of the largest category at a
//! single scalar update.

use crate::layout;
use crate::scene::{damp, ease_in_out_cubic, SceneMode};
use glam::Vec3;
use rand::Rng;

/// Chaos scatter ball radius for foliage particles.
const SCATTER_RADIUS: f32 = 25.0;
/// Wobble amplitude added to formed positions.
const WOBBLE: f32 = 0.15;
/// Exponential damping constant for the shared progress scalar.
const PROGRESS_LAMBDA: f32 = 1.5;

/// Struct-of-arrays particle storage. Positions are fixed for the session;
/// only `progress` changes per frame.
pub struct Foliage {
    pub chaos: Vec<Vec3>,
    pub targets: Vec<Vec3>,
    /// Per-instance random in [0,1): modulates point size and wobble phase.
    pub randoms: Vec<f32>,
    progress: f32,
}

impl Foliage {
    pub fn new<R: Rng>(rng: &mut R, count: usize, height: f32, base_radius: f32) -> Self {
        let mut chaos = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);
        let mut randoms = Vec::with_capacity(count);
        for _ in 0..count {
            chaos.push(layout::scatter_sphere(rng, SCATTER_RADIUS));
            targets.push(layout::cone_volume(rng, height, base_radius));
            randoms.push(rng.gen::<f32>());
        }
        Self {
            chaos,
            targets,
            randoms,
            progress: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.chaos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chaos.is_empty()
    }

    /// Advance the shared progress scalar toward the active mode.
    pub fn update(&mut self, dt: f32, mode: SceneMode) {
        let target = if mode.is_formed() { 1.0 } else { 0.0 };
        self.progress = damp(self.progress, target, PROGRESS_LAMBDA, dt).clamp(0.0, 1.0);
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Cubic-eased blend factor, shared by position and brightness.
    pub fn eased_progress(&self) -> f32 {
        ease_in_out_cubic(self.progress)
    }

    /// Blended position of particle `i` at scene time `time`. Mirrors the
    /// formed-side wobble: a sine offset keyed off the chaos position so
    /// neighboring particles stay decorrelated.
    pub fn position(&self, i: usize, time: f32) -> Vec3 {
        let c = self.chaos[i];
        let wobble = Vec3::new(
            (time * 1.5 + c.x).sin(),
            (time + c.y).cos(),
            (time * 1.5 + c.z).sin(),
        ) * WOBBLE;
        c.lerp(self.targets[i] + wobble, self.eased_progress())
    }

    /// Relative point size for particle `i` (scaled by depth in the
    /// rasterizer).
    pub fn point_size(&self, i: usize) -> f32 {
        1.0 + self.randoms[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> Foliage {
        let mut rng = StdRng::seed_from_u64(1);
        Foliage::new(&mut rng, 500, 32.0, 12.0)
    }

    #[test]
    fn progress_converges_when_formed() {
        let mut f = field();
        for _ in 0..600 {
            f.update(1.0 / 60.0, SceneMode::Formed);
        }
        assert!(f.progress() > 0.999);
        // Fully formed particles sit at target plus bounded wobble.
        let p = f.position(0, 3.0);
        assert!((p - f.targets[0]).length() <= WOBBLE * 3.0_f32.sqrt() + 1e-3);
    }

    #[test]
    fn progress_survives_per_frame_mode_flips() {
        let mut f = field();
        for frame in 0..100 {
            let mode = if frame % 2 == 0 {
                SceneMode::Formed
            } else {
                SceneMode::Chaos
            };
            f.update(1.0 / 60.0, mode);
            let p = f.progress();
            assert!(p.is_finite() && (0.0..=1.0).contains(&p));
            let pos = f.position(frame % f.len(), frame as f32 * 0.016);
            assert!(pos.is_finite());
        }
    }

    #[test]
    fn chaos_progress_blends_back_toward_scatter() {
        let mut f = field();
        for _ in 0..600 {
            f.update(1.0 / 60.0, SceneMode::Formed);
        }
        for _ in 0..600 {
            f.update(1.0 / 60.0, SceneMode::Chaos);
        }
        assert!(f.progress() < 1e-3);
        let p = f.position(10, 0.0);
        assert!((p - f.chaos[10]).length() < 0.05);
    }

    #[test]
    fn point_sizes_are_in_expected_band() {
        let f = field();
        for i in 0..f.len() {
            let s = f.point_size(i);
            assert!((1.0..2.0).contains(&s));
        }
    }
}
