//! Point-light markers. Geometry barely matters here; the animated signal is
//! emissive intensity, which is zero in chaos and a per-instance sinusoidal
//! flicker over a base brightness while formed. The intensity switch is
//! immediate on a mode change, independent of how far the positional lerp
//! has progressed.

use crate::config::Rgb;
use crate::layout;
use crate::scene::{lerp_factor, SceneMode};
use glam::Vec3;
use rand::Rng;

const SCATTER_EXTENT: f32 = 60.0;
/// Lights sit just outside the silhouette.
const SURFACE_OFFSET: f32 = 0.3;
const LERP_RATE: f32 = 2.0;
/// Formed intensity = BASE + SWING * flicker, flicker in [0,1].
const BASE_INTENSITY: f32 = 3.0;
const INTENSITY_SWING: f32 = 4.0;

pub struct LightRecord {
    pub chaos_pos: Vec3,
    pub target_pos: Vec3,
    pub current_pos: Vec3,
    pub color: Rgb,
    /// Flicker frequency in [2, 5).
    pub speed: f32,
    /// Flicker phase offset in [0, 100).
    pub phase: f32,
}

impl LightRecord {
    /// Emissive intensity at scene time `time`. In [3, 7] whenever the
    /// scene is formed, exactly 0 otherwise.
    pub fn intensity(&self, time: f32, mode: SceneMode) -> f32 {
        if !mode.is_formed() {
            return 0.0;
        }
        let flicker = ((time * self.speed + self.phase).sin() + 1.0) / 2.0;
        BASE_INTENSITY + flicker * INTENSITY_SWING
    }
}

pub struct Lights {
    pub markers: Vec<LightRecord>,
}

impl Lights {
    pub fn new<R: Rng>(
        rng: &mut R,
        count: usize,
        height: f32,
        base_radius: f32,
        colors: &[Rgb],
    ) -> Self {
        let markers = (0..count)
            .map(|_| {
                let chaos_pos = layout::scatter_cube(rng, SCATTER_EXTENT);
                let target_pos =
                    layout::cone_surface(rng, height, base_radius, 1.0, SURFACE_OFFSET);
                LightRecord {
                    chaos_pos,
                    target_pos,
                    current_pos: chaos_pos,
                    color: colors[rng.gen_range(0..colors.len())],
                    speed: 2.0 + rng.gen::<f32>() * 3.0,
                    phase: rng.gen::<f32>() * 100.0,
                }
            })
            .collect();
        Self { markers }
    }

    pub fn update(&mut self, dt: f32, mode: SceneMode) {
        let formed = mode.is_formed();
        let factor = lerp_factor(dt, LERP_RATE);
        for m in &mut self.markers {
            let target = if formed { m.target_pos } else { m.chaos_pos };
            m.current_pos = m.current_pos.lerp(target, factor);
        }
    }
}
