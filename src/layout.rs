//! Layout generation: pure samplers mapping randomness to "chaos" scatter
//! positions and "formed" tree-silhouette positions.
//!
//! All functions here are pure over the caller-supplied RNG and are invoked
//! once per instance at category initialization, never per frame.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Local cone radius at height `y` for a cone of the given height and base
/// radius, apex at the top: `R * (1 - (y + H/2) / H)`.
pub fn cone_radius_at(y: f32, height: f32, base_radius: f32) -> f32 {
    let t = (y + height / 2.0) / height;
    base_radius * (1.0 - t)
}

/// Uniform sample inside the cone volume (used by the foliage field).
pub fn cone_volume<R: Rng>(rng: &mut R, height: f32, base_radius: f32) -> Vec3 {
    let y = rng.gen_range(-height / 2.0..height / 2.0);
    let local = cone_radius_at(y, height, base_radius);
    let r = rng.gen_range(0.0..=local.max(f32::EPSILON));
    let theta = rng.gen_range(0.0..TAU);
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Sample on the cone surface with a radial adjustment. Ornaments sit
/// slightly proud of the silhouette, elements slightly inside, lights just
/// outside; `radius_offset` and `radius_scale` express those per-category
/// tweaks.
pub fn cone_surface<R: Rng>(
    rng: &mut R,
    height: f32,
    base_radius: f32,
    radius_scale: f32,
    radius_offset: f32,
) -> Vec3 {
    let y = rng.gen_range(-height / 2.0..height / 2.0);
    let r = cone_radius_at(y, height, base_radius) * radius_scale + radius_offset;
    let theta = rng.gen_range(0.0..TAU);
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Uniform sample inside a centered cube with the given side length.
pub fn scatter_cube<R: Rng>(rng: &mut R, extent: f32) -> Vec3 {
    let half = extent / 2.0;
    Vec3::new(
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
    )
}

/// Uniform sample inside a centered ball, by rejection.
pub fn scatter_sphere<R: Rng>(rng: &mut R, radius: f32) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0f32),
            rng.gen_range(-1.0..1.0f32),
            rng.gen_range(-1.0..1.0f32),
        );
        if p.length_squared() <= 1.0 {
            return p * radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const H: f32 = 32.0;
    const R: f32 = 12.0;

    #[test]
    fn midpoint_taper_is_half_radius() {
        assert_eq!(cone_radius_at(0.0, H, R), 6.0);
        assert_eq!(cone_radius_at(-H / 2.0, H, R), R);
        assert!(cone_radius_at(H / 2.0, H, R).abs() < 1e-5);
    }

    #[test]
    fn cone_volume_samples_stay_inside_silhouette() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let p = cone_volume(&mut rng, H, R);
            assert!(p.y >= -16.0 && p.y <= 16.0, "y out of range: {}", p.y);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            let allowed = R * (1.0 - (p.y + 16.0) / 32.0);
            assert!(
                radial <= allowed + 1e-4,
                "radius {radial} exceeds taper {allowed} at y={}",
                p.y
            );
        }
    }

    #[test]
    fn cone_surface_sits_on_adjusted_silhouette() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let p = cone_surface(&mut rng, H, R, 1.0, 0.5);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            let expected = cone_radius_at(p.y, H, R) + 0.5;
            assert!((radial - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn scatter_sphere_stays_in_ball() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            assert!(scatter_sphere(&mut rng, 25.0).length() <= 25.0 + 1e-4);
        }
    }

    #[test]
    fn samplers_are_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(cone_volume(&mut a, H, R), cone_volume(&mut b, H, R));
        assert_eq!(scatter_cube(&mut a, 70.0), scatter_cube(&mut b, 70.0));
    }
}
