//! CPU splat rasterizer. Projects every instance of every tree into screen
//! space (foliage in parallel), then paints depth-sorted opaque splats and
//! additive glow splats into an RGBA32F framebuffer that the wgpu renderer
//! blits to the surface.

use crate::config::Rgb;
use crate::rendering::camera::Camera;
use crate::scene::elements::SolidKind;
use crate::scene::forest::{Forest, TreeInstance};
use crate::scene::SceneMode;
use glam::Vec3;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;

const BACKGROUND: Rgb = [0.0, 0.012, 0.0];
/// Foliage point size budget, in pixel-units at unit depth.
const FOLIAGE_POINT_SIZE: f32 = 60.0;

const FIGURE_RED: Rgb = [0.83, 0.18, 0.18];
const FIGURE_FACE: Rgb = [1.0, 0.8, 0.74];
const FIGURE_WHITE: Rgb = [1.0, 1.0, 1.0];

#[derive(Clone, Copy)]
enum Shape {
    Disc,
    Square,
}

#[derive(Clone, Copy)]
struct Splat {
    x: f32,
    y: f32,
    depth: f32,
    /// Half-extent in pixels.
    radius: f32,
    color: Rgb,
    shape: Shape,
    additive: bool,
}

pub struct Rasterizer {
    camera: Arc<RwLock<Camera>>,
    emerald: Rgb,
    /// Reused splat buffer, cleared each frame.
    splats: Vec<Splat>,
}

impl Rasterizer {
    pub fn new(camera: Arc<RwLock<Camera>>, emerald: Rgb) -> Self {
        Self {
            camera,
            emerald,
            splats: Vec::new(),
        }
    }

    /// Rasterize the forest at scene time `time` into `framebuffer`
    /// (row-major, `width * height` RGBA texels). `photo_tints` supplies one
    /// averaged color per photo asset for the panel fronts.
    pub fn render(
        &mut self,
        forest: &Forest,
        photo_tints: &[Rgb],
        time: f32,
        framebuffer: &mut [[f32; 4]],
        width: u32,
        height: u32,
    ) {
        debug_assert_eq!(framebuffer.len(), (width * height) as usize);
        for texel in framebuffer.iter_mut() {
            *texel = [BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], 1.0];
        }

        self.splats.clear();
        // Snapshot the camera so the lock isn't held across rasterization.
        let cam = self.camera.read().clone();
        let mode = forest.mode();
        for tree in &forest.trees {
            self.collect_tree(&cam, tree, mode, photo_tints, time, width, height);
        }

        // Painter's order for the opaque set; glow splats accumulate after.
        let mut opaque: Vec<Splat> = self.splats.iter().copied().filter(|s| !s.additive).collect();
        opaque.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        for splat in &opaque {
            draw_splat(splat, framebuffer, width, height);
        }
        for splat in self.splats.iter().filter(|s| s.additive) {
            draw_splat(splat, framebuffer, width, height);
        }

        // Reinhard, as tone mapping of the accumulated glow.
        for texel in framebuffer.iter_mut() {
            for c in texel.iter_mut().take(3) {
                *c /= 1.0 + *c;
            }
        }
    }

    fn collect_tree(
        &mut self,
        cam: &Camera,
        tree: &TreeInstance,
        mode: SceneMode,
        photo_tints: &[Rgb],
        time: f32,
        width: u32,
        height: u32,
    ) {
        let offset = tree.offset;
        let ts = tree.scale;
        let project = |p: Vec3| cam.world_to_screen(offset + p * ts, width, height);

        // Foliage dominates the instance count; project it in parallel.
        if !tree.foliage.is_empty() {
            let mix = tree.foliage.eased_progress();
            let brightness = 0.3 + (1.2 - 0.3) * mix;
            let color = scale_rgb(self.emerald, brightness);
            let foliage: Vec<Splat> = (0..tree.foliage.len())
                .into_par_iter()
                .filter_map(|i| {
                    let (x, y, z) = project(tree.foliage.position(i, time))?;
                    let radius =
                        (FOLIAGE_POINT_SIZE * ts * tree.foliage.point_size(i) / z).clamp(0.4, 4.0);
                    Some(Splat {
                        x,
                        y,
                        depth: z,
                        radius,
                        color,
                        shape: Shape::Disc,
                        additive: true,
                    })
                })
                .collect();
            self.splats.extend(foliage);
        }

        for panel in &tree.ornaments.panels {
            if let Some((x, y, z)) = project(panel.current_pos) {
                let px = cam.pixel_scale(z, height);
                // Dim panels that face away from the camera.
                let facing = (panel.orientation(mode) * Vec3::Z)
                    .dot(-cam.forward)
                    .abs()
                    .max(0.25);
                let half = 0.5 * panel.scale * ts * px;
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z + 0.01,
                    radius: half * 1.3,
                    color: scale_rgb(panel.border_color, facing),
                    shape: Shape::Square,
                    additive: false,
                });
                let tint = photo_tints
                    .get(panel.photo_index % photo_tints.len().max(1))
                    .copied()
                    .unwrap_or([0.8, 0.8, 0.8]);
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z,
                    radius: half,
                    color: scale_rgb(tint, facing),
                    shape: Shape::Square,
                    additive: false,
                });
            }
        }

        for solid in &tree.elements.solids {
            if let Some((x, y, z)) = project(solid.current_pos) {
                let px = cam.pixel_scale(z, height);
                // Spheres read the same from any angle; boxes narrow as they
                // tumble edge-on.
                let (shape, half_world) = match solid.kind {
                    SolidKind::Box => (Shape::Square, 0.4 * solid.tumble_extent()),
                    SolidKind::Sphere => (Shape::Disc, 0.5),
                };
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z,
                    radius: half_world * ts * px,
                    color: solid.color,
                    shape,
                    additive: false,
                });
            }
        }

        for marker in &tree.lights.markers {
            let intensity = marker.intensity(time, mode);
            if intensity <= 0.0 {
                continue;
            }
            if let Some((x, y, z)) = project(marker.current_pos) {
                let px = cam.pixel_scale(z, height);
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z,
                    radius: 0.12 * ts * px * (1.0 + intensity * 0.1),
                    color: scale_rgb(marker.color, intensity),
                    shape: Shape::Disc,
                    additive: true,
                });
            }
        }

        let star = &tree.star;
        if star.scale() > 1e-3 {
            if let Some((x, y, z)) = project(star.position) {
                let px = cam.pixel_scale(z, height);
                // The spin shows up as a subtle shimmer of the glow radius.
                let shimmer = 1.0 + 0.08 * (star.spin * 4.0).sin();
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z,
                    radius: 1.3 * star.scale() * ts * px * shimmer,
                    color: scale_rgb(star.color, 1.5 * star.scale()),
                    shape: Shape::Disc,
                    additive: true,
                });
            }
        }

        if let Some(figure) = &tree.figure {
            let fs = figure.scale(mode);
            if fs > 0.0 {
                let (sway_z, sway_y) = figure.sway(time, mode);
                // Body, head, hat: stacked discs with a slight lean.
                let parts: [(f32, f32, Rgb); 4] = [
                    (2.5, 1.75, FIGURE_RED),
                    (4.5, 1.2, FIGURE_FACE),
                    (4.0, 0.7, FIGURE_WHITE),
                    (5.5, 0.9, FIGURE_RED),
                ];
                for (h, r, color) in parts {
                    let lean = Vec3::new(sway_z.sin() * h * 0.1, 0.0, sway_y.sin() * h * 0.1);
                    let p = figure.position + Vec3::new(0.0, h, 0.0) * fs + lean;
                    if let Some((x, y, z)) = project(p) {
                        let px = cam.pixel_scale(z, height);
                        self.splats.push(Splat {
                            x,
                            y,
                            depth: z,
                            radius: r * fs * ts * px,
                            color,
                            shape: Shape::Disc,
                            additive: false,
                        });
                    }
                }
            }
        }

        for gift in &tree.gifts.gifts {
            let gs = tree.gifts.visible_scale(gift, mode);
            if gs <= 0.0 {
                continue;
            }
            if let Some((x, y, z)) = project(gift.position) {
                let px = cam.pixel_scale(z, height);
                let half = 0.5 * gs * ts * px;
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z,
                    radius: half,
                    color: gift.color,
                    shape: Shape::Square,
                    additive: false,
                });
                // Ribbon stripe across the face.
                self.splats.push(Splat {
                    x,
                    y,
                    depth: z - 0.01,
                    radius: half * 0.2,
                    color: gift.ribbon,
                    shape: Shape::Square,
                    additive: false,
                });
            }
        }
    }
}

fn scale_rgb(c: Rgb, s: f32) -> Rgb {
    [c[0] * s, c[1] * s, c[2] * s]
}

fn draw_splat(splat: &Splat, framebuffer: &mut [[f32; 4]], width: u32, height: u32) {
    let r = splat.radius.max(0.4);
    let min_x = ((splat.x - r).floor().max(0.0)) as u32;
    let max_x = ((splat.x + r).ceil().min(width as f32 - 1.0)) as u32;
    let min_y = ((splat.y - r).floor().max(0.0)) as u32;
    let max_y = ((splat.y + r).ceil().min(height as f32 - 1.0)) as u32;
    if min_x > max_x || min_y > max_y {
        return;
    }
    let r2 = r * r;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - splat.x;
            let dy = y as f32 + 0.5 - splat.y;
            let inside = match splat.shape {
                Shape::Square => dx.abs() <= r && dy.abs() <= r,
                Shape::Disc => dx * dx + dy * dy <= r2,
            };
            if !inside {
                continue;
            }
            let texel = &mut framebuffer[(y * width + x) as usize];
            if splat.additive {
                // Soft falloff toward the rim keeps glows round.
                let fall = match splat.shape {
                    Shape::Disc => 1.0 - ((dx * dx + dy * dy) / r2).sqrt(),
                    Shape::Square => 1.0,
                };
                texel[0] += splat.color[0] * fall;
                texel[1] += splat.color[1] * fall;
                texel[2] += splat.color[2] * fall;
            } else {
                texel[0] = splat.color[0];
                texel[1] = splat.color[1];
                texel[2] = splat.color[2];
            }
            texel[3] = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::Forest;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_scene() -> (Forest, Rasterizer) {
        let mut config = SceneConfig::default();
        config.counts.foliage = 200;
        config.counts.ornaments = 8;
        config.counts.elements = 8;
        config.counts.lights = 8;
        let camera = Arc::new(RwLock::new(Camera::default()));
        let mut rng = StdRng::seed_from_u64(4);
        let forest = Forest::new(&mut rng, &config, 4, camera.clone());
        let raster = Rasterizer::new(camera, config.palette.emerald);
        (forest, raster)
    }

    #[test]
    fn frame_is_finite_and_normalized() {
        let (mut forest, mut raster) = tiny_scene();
        forest.set_mode(SceneMode::Formed);
        for _ in 0..30 {
            forest.step(1.0 / 60.0);
        }
        let (w, h) = (160u32, 90u32);
        let mut fb = vec![[0.0f32; 4]; (w * h) as usize];
        raster.render(&forest, &[[0.8, 0.7, 0.6]], 0.5, &mut fb, w, h);
        for texel in &fb {
            for &c in texel {
                assert!(c.is_finite());
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn formed_scene_lights_up_more_pixels_than_empty_background() {
        let (mut forest, mut raster) = tiny_scene();
        forest.set_mode(SceneMode::Formed);
        for _ in 0..240 {
            forest.step(1.0 / 60.0);
        }
        let (w, h) = (160u32, 90u32);
        let mut fb = vec![[0.0f32; 4]; (w * h) as usize];
        raster.render(&forest, &[[0.8, 0.7, 0.6]], 2.0, &mut fb, w, h);
        let bg = BACKGROUND[1] / (1.0 + BACKGROUND[1]);
        let lit = fb.iter().filter(|t| (t[1] - bg).abs() > 1e-4).count();
        assert!(lit > 100, "only {lit} texels touched");
    }
}
