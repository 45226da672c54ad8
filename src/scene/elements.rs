//! Decorative solids: box and sphere ornaments with a fixed-rate lerp and a
//! simple x-axis tumble while in chaos. No reorientation when formed.

use crate::config::Rgb;
use crate::layout;
use crate::scene::{lerp_factor, SceneMode};
use glam::Vec3;
use rand::Rng;

const SCATTER_EXTENT: f32 = 60.0;
/// Solids sit just inside the silhouette.
const SURFACE_SCALE: f32 = 0.95;
const LERP_RATE: f32 = 1.5;
/// Chaos tumble rate about x, radians per second.
const TUMBLE_RATE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidKind {
    Box,
    Sphere,
}

pub struct SolidRecord {
    pub kind: SolidKind,
    pub chaos_pos: Vec3,
    pub target_pos: Vec3,
    pub current_pos: Vec3,
    pub color: Rgb,
    /// Accumulated x-axis tumble, advanced only in chaos.
    pub tumble_x: f32,
    /// Fixed random orientation applied on top of the tumble.
    pub base_rotation: Vec3,
}

impl SolidRecord {
    /// Apparent half-extent factor of the tumbling solid: full when a face
    /// is square to the viewer, narrower mid-spin. The base rotation acts as
    /// a fixed per-solid phase offset.
    pub fn tumble_extent(&self) -> f32 {
        let phase = self.tumble_x + self.base_rotation.x + self.base_rotation.y;
        0.75 + 0.25 * phase.cos().abs()
    }
}

pub struct Elements {
    pub solids: Vec<SolidRecord>,
}

impl Elements {
    pub fn new<R: Rng>(
        rng: &mut R,
        count: usize,
        height: f32,
        base_radius: f32,
        colors: &[Rgb],
    ) -> Self {
        let solids = (0..count)
            .map(|_| {
                let chaos_pos = layout::scatter_cube(rng, SCATTER_EXTENT);
                let target_pos = layout::cone_surface(rng, height, base_radius, SURFACE_SCALE, 0.0);
                let kind = if rng.gen::<f32>() > 0.5 {
                    SolidKind::Box
                } else {
                    SolidKind::Sphere
                };
                SolidRecord {
                    kind,
                    chaos_pos,
                    target_pos,
                    current_pos: chaos_pos,
                    color: colors[rng.gen_range(0..colors.len())],
                    tumble_x: 0.0,
                    base_rotation: Vec3::new(
                        rng.gen::<f32>() * std::f32::consts::PI,
                        rng.gen::<f32>(),
                        0.0,
                    ),
                }
            })
            .collect();
        Self { solids }
    }

    pub fn update(&mut self, dt: f32, mode: SceneMode) {
        let formed = mode.is_formed();
        let factor = lerp_factor(dt, LERP_RATE);
        for s in &mut self.solids {
            let target = if formed { s.target_pos } else { s.chaos_pos };
            s.current_pos = s.current_pos.lerp(target, factor);
            if !formed {
                s.tumble_x += dt * TUMBLE_RATE;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn elements() -> Elements {
        let mut rng = StdRng::seed_from_u64(9);
        let colors = [[0.7, 0.1, 0.1], [0.1, 0.1, 0.5], [0.0, 0.3, 0.25]];
        Elements::new(&mut rng, 80, 32.0, 12.0, &colors)
    }

    #[test]
    fn solids_converge_when_formed() {
        let mut e = elements();
        for _ in 0..600 {
            e.update(1.0 / 60.0, SceneMode::Formed);
        }
        for s in &e.solids {
            assert!((s.current_pos - s.target_pos).length() < 1e-3);
        }
    }

    #[test]
    fn tumble_only_advances_in_chaos() {
        let mut e = elements();
        for _ in 0..60 {
            e.update(1.0 / 60.0, SceneMode::Formed);
        }
        assert!(e.solids.iter().all(|s| s.tumble_x == 0.0));
        for _ in 0..60 {
            e.update(1.0 / 60.0, SceneMode::Chaos);
        }
        for s in &e.solids {
            assert!((s.tumble_x - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn mode_flip_every_frame_is_stable() {
        let mut e = elements();
        for frame in 0..100 {
            let mode = if frame % 2 == 0 {
                SceneMode::Chaos
            } else {
                SceneMode::Formed
            };
            e.update(1.0 / 60.0, mode);
        }
        for s in &e.solids {
            assert!(s.current_pos.is_finite());
            assert!(s.current_pos.abs().max_element() <= SCATTER_EXTENT / 2.0 + 1.0);
        }
    }

    #[test]
    fn chaos_tumble_modulates_apparent_extent() {
        let mut e = elements();
        let before: Vec<f32> = e.solids.iter().map(|s| s.tumble_extent()).collect();
        for _ in 0..45 {
            e.update(1.0 / 60.0, SceneMode::Chaos);
        }
        let moved = e
            .solids
            .iter()
            .zip(&before)
            .filter(|(s, b)| (s.tumble_extent() - **b).abs() > 1e-3)
            .count();
        assert!(moved > e.solids.len() / 2);
        for s in &e.solids {
            assert!((0.75..=1.0).contains(&s.tumble_extent()));
        }
    }

    #[test]
    fn both_solid_kinds_appear() {
        let e = elements();
        assert!(e.solids.iter().any(|s| s.kind == SolidKind::Box));
        assert!(e.solids.iter().any(|s| s.kind == SolidKind::Sphere));
    }
}
