//! Photo-panel ornaments: one positional record per panel, lerped toward the
//! active target each frame. Formed panels orient to face outward from the
//! tree axis; chaotic panels tumble freely.

use crate::config::Rgb;
use crate::layout;
use crate::scene::{lerp_factor, SceneMode};
use glam::{Quat, Vec3};
use rand::Rng;

/// Chaos scatter cube side for panels.
const SCATTER_EXTENT: f32 = 70.0;
/// Panels sit slightly proud of the tree silhouette.
const SURFACE_OFFSET: f32 = 0.5;
/// Formed lerp rate, scaled by the per-panel weight.
const FORMED_RATE: f32 = 0.8;
/// Chaos lerp rate, identical for every panel.
const CHAOS_RATE: f32 = 0.5;

pub struct PanelRecord {
    pub chaos_pos: Vec3,
    pub target_pos: Vec3,
    pub current_pos: Vec3,
    pub scale: f32,
    /// Per-panel weight in [0.8, 2.0); heavier panels settle faster.
    pub weight: f32,
    /// Accumulated free-rotation angles (x, y), advanced only in chaos.
    pub rotation: Vec3,
    /// Per-panel angular velocities in [-0.5, 0.5).
    pub spin: Vec3,
    pub photo_index: usize,
    pub border_color: Rgb,
}

impl PanelRecord {
    /// Orientation used when drawing. Formed panels billboard outward from
    /// the tree axis (look toward their own x/z doubled, same height);
    /// chaotic panels use their accumulated tumble.
    pub fn orientation(&self, mode: SceneMode) -> Quat {
        if mode.is_formed() {
            let outward = Vec3::new(self.current_pos.x, 0.0, self.current_pos.z);
            if outward.length_squared() > 1e-8 {
                let yaw = outward.x.atan2(outward.z);
                Quat::from_rotation_y(yaw)
            } else {
                Quat::IDENTITY
            }
        } else {
            Quat::from_euler(
                glam::EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            )
        }
    }
}

pub struct Ornaments {
    pub panels: Vec<PanelRecord>,
}

impl Ornaments {
    pub fn new<R: Rng>(
        rng: &mut R,
        count: usize,
        height: f32,
        base_radius: f32,
        photo_count: usize,
        borders: &[Rgb],
    ) -> Self {
        let panels = (0..count)
            .map(|i| {
                let chaos_pos = layout::scatter_cube(rng, SCATTER_EXTENT);
                let target_pos =
                    layout::cone_surface(rng, height, base_radius, 1.0, SURFACE_OFFSET);
                let is_big = rng.gen::<f32>() < 0.2;
                let scale = if is_big {
                    2.2
                } else {
                    0.8 + rng.gen::<f32>() * 0.6
                };
                PanelRecord {
                    chaos_pos,
                    target_pos,
                    current_pos: chaos_pos,
                    scale,
                    weight: 0.8 + rng.gen::<f32>() * 1.2,
                    rotation: Vec3::new(
                        rng.gen::<f32>() * std::f32::consts::PI,
                        rng.gen::<f32>() * std::f32::consts::PI,
                        rng.gen::<f32>() * std::f32::consts::PI,
                    ),
                    spin: Vec3::new(
                        rng.gen::<f32>() - 0.5,
                        rng.gen::<f32>() - 0.5,
                        rng.gen::<f32>() - 0.5,
                    ),
                    photo_index: i % photo_count.max(1),
                    border_color: borders[rng.gen_range(0..borders.len())],
                }
            })
            .collect();
        Self { panels }
    }

    pub fn update(&mut self, dt: f32, mode: SceneMode) {
        let formed = mode.is_formed();
        for p in &mut self.panels {
            let (target, rate) = if formed {
                (p.target_pos, FORMED_RATE * p.weight)
            } else {
                (p.chaos_pos, CHAOS_RATE)
            };
            p.current_pos = p.current_pos.lerp(target, lerp_factor(dt, rate));
            if !formed {
                p.rotation.x += dt * p.spin.x;
                p.rotation.y += dt * p.spin.y;
            }
        }
    }
}
