//! Static-layout decor: the star topper, the singleton toy figure, and the
//! gift boxes piled under each tree. These don't lerp between chaos and
//! formed positions; the star scales in smoothly, while the figure and
//! gifts simply appear at full size once the scene is formed.

use crate::config::Rgb;
use crate::scene::{lerp_factor, SceneMode};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Star spin rate, radians per second.
const STAR_SPIN: f32 = 0.5;
const STAR_SCALE_RATE: f32 = 3.0;
/// Gap between the cone apex and the star center.
const STAR_CLEARANCE: f32 = 1.8;

pub struct StarTopper {
    pub position: Vec3,
    pub color: Rgb,
    pub spin: f32,
    scale: f32,
}

impl StarTopper {
    pub fn new(tree_height: f32, color: Rgb) -> Self {
        Self {
            position: Vec3::new(0.0, tree_height / 2.0 + STAR_CLEARANCE, 0.0),
            color,
            spin: 0.0,
            scale: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, mode: SceneMode) {
        self.spin += dt * STAR_SPIN;
        let target = if mode.is_formed() { 1.0 } else { 0.0 };
        self.scale += (target - self.scale) * lerp_factor(dt, STAR_SCALE_RATE);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// The toy figure beside the main tree. Rendered at full scale only while
/// the scene is formed; sways gently like a roly-poly while visible.
pub struct Figure {
    pub position: Vec3,
}

impl Figure {
    pub fn new(tree_height: f32) -> Self {
        Self {
            position: Vec3::new(8.0, -tree_height / 2.0 + 2.0, 5.0),
        }
    }

    pub fn scale(&self, mode: SceneMode) -> f32 {
        if mode.is_formed() {
            1.5
        } else {
            0.0
        }
    }

    /// Sway angles (z, y) at scene time `time`.
    pub fn sway(&self, time: f32, mode: SceneMode) -> (f32, f32) {
        if mode.is_formed() {
            ((time * 2.0).sin() * 0.1, time.sin() * 0.1)
        } else {
            (0.0, 0.0)
        }
    }
}

pub struct GiftRecord {
    pub position: Vec3,
    pub scale: f32,
    pub color: Rgb,
    pub ribbon: Rgb,
    pub yaw: f32,
}

pub struct GroundGifts {
    pub gifts: Vec<GiftRecord>,
}

impl GroundGifts {
    pub fn new<R: Rng>(
        rng: &mut R,
        count: usize,
        tree_height: f32,
        tree_radius: f32,
        colors: &[Rgb],
        ribbons: &[Rgb],
    ) -> Self {
        let gifts = (0..count)
            .map(|_| {
                let angle = rng.gen::<f32>() * TAU;
                let dist = rng.gen::<f32>() * tree_radius * 0.8;
                let scale = 1.5 + rng.gen::<f32>() * 2.0;
                GiftRecord {
                    // Resting on the ground plane under the tree.
                    position: Vec3::new(
                        angle.cos() * dist,
                        -tree_height / 2.0 + scale * 0.5,
                        angle.sin() * dist,
                    ),
                    scale,
                    color: colors[rng.gen_range(0..colors.len())],
                    ribbon: ribbons[rng.gen_range(0..ribbons.len())],
                    yaw: rng.gen::<f32>() * std::f32::consts::PI,
                }
            })
            .collect();
        Self { gifts }
    }

    pub fn visible_scale(&self, record: &GiftRecord, mode: SceneMode) -> f32 {
        if mode.is_formed() {
            record.scale
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn star_scales_in_and_out_smoothly() {
        let mut star = StarTopper::new(32.0, [1.0, 0.84, 0.0]);
        assert_eq!(star.scale(), 0.0);
        for _ in 0..300 {
            star.update(1.0 / 60.0, SceneMode::Formed);
            assert!((0.0..=1.0).contains(&star.scale()));
        }
        assert!(star.scale() > 0.99);
        for _ in 0..300 {
            star.update(1.0 / 60.0, SceneMode::Chaos);
        }
        assert!(star.scale() < 0.01);
    }

    #[test]
    fn star_sits_above_the_apex() {
        let star = StarTopper::new(32.0, [1.0, 0.84, 0.0]);
        assert!((star.position.y - 17.8).abs() < 1e-5);
    }

    #[test]
    fn figure_is_hidden_in_chaos() {
        let fig = Figure::new(32.0);
        assert_eq!(fig.scale(SceneMode::Chaos), 0.0);
        assert_eq!(fig.scale(SceneMode::Formed), 1.5);
        assert_eq!(fig.sway(1.0, SceneMode::Chaos), (0.0, 0.0));
        // Both sway axes are live while formed.
        let (z, y) = fig.sway(1.0, SceneMode::Formed);
        assert!(z.abs() > 1e-3 && y.abs() > 1e-3);
    }

    #[test]
    fn gifts_rest_inside_the_base_disc() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = GroundGifts::new(&mut rng, 15, 32.0, 12.0, &[[1.0, 0.0, 0.0]], &[[1.0; 3]]);
        assert_eq!(g.gifts.len(), 15);
        for gift in &g.gifts {
            let radial = (gift.position.x.powi(2) + gift.position.z.powi(2)).sqrt();
            assert!(radial <= 12.0 * 0.8 + 1e-4);
            // Bottom face on the ground plane.
            assert!((gift.position.y + 16.0 - gift.scale * 0.5).abs() < 1e-4);
            assert_eq!(g.visible_scale(gift, SceneMode::Chaos), 0.0);
            assert_eq!(g.visible_scale(gift, SceneMode::Formed), gift.scale);
        }
    }
}
