use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod assets;
mod config;
mod gesture;
mod layout;
mod rendering;
mod scene;

use assets::PhotoSet;
use config::SceneConfig;
use gesture::{GestureBridge, ScriptedTracker};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rendering::{Camera, Rasterizer, Renderer};
use scene::forest::Forest;
use std::path::Path;
use std::sync::{mpsc, Arc};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::from_file(Path::new(&path))?,
        None => SceneConfig::default(),
    };
    config.validate()?;
    let photos = PhotoSet::load(Path::new(&config.photo_dir))?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Treeform")
        .with_inner_size(winit::dpi::PhysicalSize::new(1280, 720))
        .build(&event_loop)?;
    let window = std::sync::Arc::new(window);

    let size = window.inner_size();
    let camera = Arc::new(RwLock::new(Camera::new(
        glam::Vec3::new(0.0, 8.0, 60.0),
        glam::Vec3::ZERO,
        size.width as f32 / size.height.max(1) as f32,
    )));
    let mut rng = StdRng::from_entropy();
    let mut forest = Forest::new(&mut rng, &config, photos.len(), camera.clone());
    let mut rasterizer = Rasterizer::new(camera.clone(), config.palette.emerald);
    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    let (tx, rx) = mpsc::channel();
    let mut bridge = GestureBridge::spawn(ScriptedTracker::new(), tx);

    println!("Treeform started");
    println!("Controls: open palm = chaos, closed fist = form, Space toggles, P pause, H hud, wheel zoom");

    let win_id = window.id();
    let win_clone = window.clone();
    event_loop.run(move |event, target| match event {
        Event::WindowEvent { event, window_id } if window_id == win_id => match event {
            WindowEvent::CloseRequested => {
                bridge.shutdown();
                target.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                if size.height > 0 {
                    let mut cam = camera.write();
                    cam.aspect = size.width as f32 / size.height as f32;
                    cam.mark_changed();
                }
            }
            WindowEvent::RedrawRequested => {
                forest.apply_gesture_events(&rx);
                forest.update();
                let (width, height) = renderer.dimensions();
                let time = forest.time.current_time;
                rasterizer.render(
                    &forest,
                    &photos.tints,
                    time,
                    renderer.framebuffer_mut(),
                    width,
                    height,
                );
                if let Err(e) = renderer.present() {
                    log::error!("render error: {e}");
                }
                win_clone.set_title(&format!("Treeform | {}", forest.hud_text()));
            }
            _ => forest.handle_window_event(&event),
        },
        Event::AboutToWait => win_clone.request_redraw(),
        _ => {}
    })?;
    Ok(())
}
