//! Scene composer: a fixed small number of tree instances at distinct
//! offsets and scales, each owning its four category animators plus decor,
//! updated in order inside one frame callback. Also forwards the gesture
//! rotation-speed scalar to the shared orbit camera.

use crate::config::SceneConfig;
use crate::gesture::GestureEvent;
use crate::rendering::camera::{Camera, OrbitController};
use crate::scene::decor::{Figure, GroundGifts, StarTopper};
use crate::scene::elements::Elements;
use crate::scene::foliage::Foliage;
use crate::scene::lights::Lights;
use crate::scene::ornaments::Ornaments;
use crate::scene::{SceneMode, TimeState};
use glam::Vec3;
use parking_lot::RwLock;
use rand::Rng;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Slow ambient orbit used when no hand is steering and the tree is formed.
const AUTO_ORBIT_RATE: f32 = 0.05;

/// One tree in the forest. Offset, scale, and figure hosting are immutable
/// after creation; the category animators own all per-frame mutation.
pub struct TreeInstance {
    pub offset: Vec3,
    pub scale: f32,
    pub foliage: Foliage,
    pub ornaments: Ornaments,
    pub elements: Elements,
    pub lights: Lights,
    pub star: StarTopper,
    pub gifts: GroundGifts,
    /// Present on exactly one tree.
    pub figure: Option<Figure>,
}

impl TreeInstance {
    fn update(&mut self, dt: f32, mode: SceneMode) {
        self.foliage.update(dt, mode);
        self.ornaments.update(dt, mode);
        self.elements.update(dt, mode);
        self.lights.update(dt, mode);
        self.star.update(dt, mode);
    }
}

pub struct Forest {
    pub trees: Vec<TreeInstance>,
    mode: SceneMode,
    pub rotation_speed: f32,
    pub status: String,
    pub time: TimeState,
    pub camera: Arc<RwLock<Camera>>,
    pub controller: OrbitController,
    pub paused: bool,
    pub show_hud: bool,
    pub last_fps: Option<f32>,
}

impl Forest {
    pub fn new<R: Rng>(
        rng: &mut R,
        config: &SceneConfig,
        photo_count: usize,
        camera: Arc<RwLock<Camera>>,
    ) -> Self {
        let tree = config.tree;
        let trees = config
            .forest
            .iter()
            .map(|placement| TreeInstance {
                offset: Vec3::from_array(placement.offset),
                scale: placement.scale,
                foliage: Foliage::new(rng, config.counts.foliage, tree.height, tree.base_radius),
                ornaments: Ornaments::new(
                    rng,
                    config.counts.ornaments,
                    tree.height,
                    tree.base_radius,
                    photo_count,
                    &config.palette.borders,
                ),
                elements: Elements::new(
                    rng,
                    config.counts.elements,
                    tree.height,
                    tree.base_radius,
                    &config.palette.gifts,
                ),
                lights: Lights::new(
                    rng,
                    config.counts.lights,
                    tree.height,
                    tree.base_radius,
                    &config.palette.lights,
                ),
                star: StarTopper::new(tree.height, config.palette.gold),
                gifts: GroundGifts::new(
                    rng,
                    config.counts.gifts_per_tree,
                    tree.height,
                    tree.base_radius,
                    &config.palette.gifts,
                    &config.palette.ribbons,
                ),
                figure: placement.hosts_figure.then(|| Figure::new(tree.height)),
            })
            .collect();
        Self {
            trees,
            mode: SceneMode::default(),
            rotation_speed: 0.0,
            status: "INITIALIZING".to_string(),
            time: TimeState::default(),
            camera,
            controller: OrbitController::default(),
            paused: false,
            show_hud: true,
            last_fps: None,
        }
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    /// Single entry point for mode writes: the gesture bridge and the manual
    /// toggle both land here.
    pub fn set_mode(&mut self, mode: SceneMode) {
        if mode != self.mode {
            log::info!("scene mode -> {:?}", mode);
            self.mode = mode;
        }
    }

    /// Pause or resume animation. On resume the frame clock restarts from
    /// now, so the time spent paused never shows up as one huge delta that
    /// would snap every instance to its target.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            self.time.last_frame_time = std::time::Instant::now();
        }
    }

    /// Drain pending gesture events. Called once per frame before `update`;
    /// the channel decouples the gesture polling loop from the render loop.
    pub fn apply_gesture_events(&mut self, rx: &Receiver<GestureEvent>) {
        while let Ok(event) = rx.try_recv() {
            match event {
                GestureEvent::ModeChange(mode) => self.set_mode(mode),
                GestureEvent::RotationSpeed(v) => self.rotation_speed = v,
                GestureEvent::Status(text) => {
                    log::info!("gesture bridge: {text}");
                    self.status = text;
                }
            }
        }
    }

    /// Advance one frame using wall-clock timing.
    pub fn update(&mut self) {
        if !self.paused {
            self.time.update();
        }
        self.step(self.time.delta_time);
        if let Some(fps) = self.time.fps_sample() {
            log::info!("FPS: {fps:.1}");
            self.last_fps = Some(fps);
        }
    }

    /// Advance one frame by an explicit delta. All categories of all trees
    /// observe the same delta and the same mode within a frame.
    pub fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let mode = self.mode;
        for tree in &mut self.trees {
            tree.update(dt, mode);
        }
        // Forward the gesture scalar to the camera orbit. The ambient spin
        // only kicks in once the tree is formed and the hand is idle.
        let speed = if self.rotation_speed == 0.0 && mode.is_formed() {
            dt * AUTO_ORBIT_RATE
        } else {
            self.rotation_speed
        };
        let mut cam = self.camera.write();
        self.controller.advance_azimuth(speed);
        self.controller.apply(&mut cam);
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    match code {
                        KeyCode::Space => self.set_mode(self.mode.toggled()),
                        KeyCode::KeyP => self.toggle_pause(),
                        KeyCode::KeyH => self.show_hud = !self.show_hud,
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let MouseScrollDelta::LineDelta(_, y) = delta {
                    self.controller.zoom(-y * 3.0);
                }
            }
            _ => {}
        }
    }

    pub fn hud_text(&self) -> String {
        if !self.show_hud {
            return String::new();
        }
        let polaroids: usize = self.trees.iter().map(|t| t.ornaments.panels.len()).sum();
        let needles: usize = self.trees.iter().map(|t| t.foliage.len()).sum();
        format!(
            "{:?}{} | {} polaroids | {}k needles | fps {:.0} | {}",
            self.mode,
            if self.paused { " (PAUSED)" } else { "" },
            polaroids,
            needles / 1000,
            self.last_fps.unwrap_or(0.0),
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureEvent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::mpsc;

    fn small_forest() -> Forest {
        let mut config = SceneConfig::default();
        config.counts.foliage = 100;
        config.counts.ornaments = 10;
        config.counts.elements = 10;
        config.counts.lights = 10;
        let camera = Arc::new(RwLock::new(Camera::default()));
        let mut rng = StdRng::seed_from_u64(17);
        Forest::new(&mut rng, &config, 32, camera)
    }

    #[test]
    fn builds_three_trees_with_one_figure_host() {
        let f = small_forest();
        assert_eq!(f.trees.len(), 3);
        assert_eq!(f.trees.iter().filter(|t| t.figure.is_some()).count(), 1);
        assert!(f.trees[0].figure.is_some());
        assert_eq!(f.trees[1].scale, 0.7);
    }

    #[test]
    fn gesture_events_drive_mode_speed_and_status() {
        let mut f = small_forest();
        let (tx, rx) = mpsc::channel();
        tx.send(GestureEvent::ModeChange(SceneMode::Formed)).unwrap();
        tx.send(GestureEvent::RotationSpeed(0.04)).unwrap();
        tx.send(GestureEvent::Status("READY".into())).unwrap();
        f.apply_gesture_events(&rx);
        assert_eq!(f.mode(), SceneMode::Formed);
        assert_eq!(f.rotation_speed, 0.04);
        assert_eq!(f.status, "READY");
    }

    #[test]
    fn step_converges_every_category_when_formed() {
        let mut f = small_forest();
        f.set_mode(SceneMode::Formed);
        for _ in 0..(120 * 60) {
            f.step(1.0 / 60.0);
        }
        for tree in &f.trees {
            assert!(tree.foliage.progress() > 0.999);
            for p in &tree.ornaments.panels {
                assert!((p.current_pos - p.target_pos).length() < 1e-2);
            }
            for s in &tree.elements.solids {
                assert!((s.current_pos - s.target_pos).length() < 1e-2);
            }
            for m in &tree.lights.markers {
                assert!((m.current_pos - m.target_pos).length() < 1e-2);
            }
            assert!(tree.star.scale() > 0.99);
        }
    }

    #[test]
    fn rotation_speed_advances_camera_azimuth() {
        let mut f = small_forest();
        let before = f.controller.azimuth;
        f.rotation_speed = 0.02;
        for _ in 0..10 {
            f.step(1.0 / 60.0);
        }
        assert!((f.controller.azimuth - before - 0.2).abs() < 1e-5);
    }

    #[test]
    fn idle_formed_scene_auto_rotates() {
        let mut f = small_forest();
        f.set_mode(SceneMode::Formed);
        let before = f.controller.azimuth;
        f.step(1.0 / 60.0);
        assert!(f.controller.azimuth > before);
    }

    #[test]
    fn paused_forest_does_not_advance() {
        let mut f = small_forest();
        f.set_mode(SceneMode::Formed);
        f.paused = true;
        let progress = f.trees[0].foliage.progress();
        f.step(1.0 / 60.0);
        assert_eq!(f.trees[0].foliage.progress(), progress);
    }

    #[test]
    fn resuming_does_not_fast_forward_by_the_pause() {
        let mut f = small_forest();
        f.set_mode(SceneMode::Formed);
        f.update();
        f.toggle_pause();
        // Simulate 400 ms spent paused: the frame clock goes stale.
        f.time.last_frame_time = std::time::Instant::now() - std::time::Duration::from_millis(400);
        let before = (f.trees[0].ornaments.panels[0].current_pos
            - f.trees[0].ornaments.panels[0].target_pos)
            .length();
        f.toggle_pause();
        f.update();
        assert!(
            f.time.delta_time < 0.1,
            "stale pause leaked into the delta: {}",
            f.time.delta_time
        );
        let after = (f.trees[0].ornaments.panels[0].current_pos
            - f.trees[0].ornaments.panels[0].target_pos)
            .length();
        // One real frame's worth of progress at most, never a snap.
        assert!(after > before * 0.5, "panel jumped {before} -> {after}");
    }
}
