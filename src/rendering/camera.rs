//! Perspective camera plus the orbit controller the gesture bridge steers.
//! Right-handed system; the camera looks down -Z.

use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub version: u64,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let fov_y = 45f32.to_radians();
        let forward = (target - position).normalize_or_zero();
        let world_up = Vec3::Y;
        let right = forward.cross(world_up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        Self {
            position,
            forward,
            up,
            right,
            fov_y,
            aspect,
            near: 0.1,
            far: 1_000.0,
            version: 0,
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-6), self.near, self.far)
    }

    /// Project a world point to pixel coordinates. Returns (x, y, view_z)
    /// where view_z is the positive distance along the view axis, or None
    /// for points at or behind the near plane.
    pub fn world_to_screen(&self, p: Vec3, width: u32, height: u32) -> Option<(f32, f32, f32)> {
        let view = self.view_matrix() * Vec4::new(p.x, p.y, p.z, 1.0);
        let view_z = -view.z;
        if view_z <= self.near {
            return None;
        }
        let clip = self.projection_matrix() * view;
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let sx = (ndc_x + 1.0) * 0.5 * width as f32;
        let sy = (1.0 - ndc_y) * 0.5 * height as f32;
        Some((sx, sy, view_z))
    }

    /// Pixels per world unit at the given view depth.
    pub fn pixel_scale(&self, view_z: f32, height: u32) -> f32 {
        height as f32 / (2.0 * (self.fov_y * 0.5).tan() * view_z)
    }

    #[inline]
    pub fn mark_changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 8.0, 60.0), Vec3::ZERO, 16.0 / 9.0)
    }
}

/// Orbit control around a fixed target. The azimuth is advanced directly by
/// the gesture rotation-speed scalar each frame; distance and polar angle
/// stay inside the controller's own limits regardless of input.
pub struct OrbitController {
    pub target: Vec3,
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        let rest = Vec3::new(0.0, 8.0, 60.0);
        Self {
            target: Vec3::ZERO,
            azimuth: 0.0,
            // Matches the default camera resting pose.
            polar: (rest.y / rest.length()).acos(),
            distance: rest.length(),
            min_distance: 20.0,
            max_distance: 150.0,
            max_polar: std::f32::consts::PI / 1.7,
        }
    }
}

impl OrbitController {
    pub fn advance_azimuth(&mut self, delta: f32) {
        self.azimuth = (self.azimuth + delta).rem_euclid(std::f32::consts::TAU);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(self.min_distance, self.max_distance);
    }

    pub fn tilt(&mut self, delta: f32) {
        self.polar = (self.polar + delta).clamp(0.1, self.max_polar);
    }

    /// Place the camera on the orbit sphere and aim it at the target.
    pub fn apply(&self, cam: &mut Camera) {
        let d = self.distance.clamp(self.min_distance, self.max_distance);
        let polar = self.polar.clamp(0.1, self.max_polar);
        let sp = polar.sin();
        cam.position = self.target
            + Vec3::new(
                d * sp * self.azimuth.sin(),
                d * polar.cos(),
                d * sp * self.azimuth.cos(),
            );
        cam.forward = (self.target - cam.position).normalize_or_zero();
        cam.right = cam.forward.cross(Vec3::Y).normalize_or_zero();
        cam.up = cam.right.cross(cam.forward).normalize_or_zero();
        cam.mark_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_keeps_distance_and_aims_at_target() {
        let mut cam = Camera::default();
        let mut ctl = OrbitController::default();
        for _ in 0..50 {
            ctl.advance_azimuth(0.3);
            ctl.apply(&mut cam);
            let d = (cam.position - ctl.target).length();
            assert!((d - ctl.distance).abs() < 1e-3);
            let to_target = (ctl.target - cam.position).normalize();
            assert!(cam.forward.dot(to_target) > 0.999);
        }
    }

    #[test]
    fn zoom_and_tilt_respect_limits() {
        let mut ctl = OrbitController::default();
        ctl.zoom(-1_000.0);
        assert_eq!(ctl.distance, 20.0);
        ctl.zoom(1_000.0);
        assert_eq!(ctl.distance, 150.0);
        ctl.tilt(10.0);
        assert!((ctl.polar - std::f32::consts::PI / 1.7).abs() < 1e-6);
    }

    #[test]
    fn projection_lands_scene_center_on_screen() {
        let cam = Camera::default();
        let (x, y, z) = cam.world_to_screen(Vec3::ZERO, 1280, 720).unwrap();
        assert!((x - 640.0).abs() < 1.0);
        assert!((y - 360.0).abs() < 1.0);
        assert!(z > 0.0);
        // Behind the camera: rejected.
        assert!(cam
            .world_to_screen(Vec3::new(0.0, 8.0, 120.0), 1280, 720)
            .is_none());
    }
}
