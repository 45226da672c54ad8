//! Gesture bridge: turns hand readings from an external recognizer into the
//! three signals the scene consumes: a discrete mode change, a continuous
//! rotation speed, and human-readable status text.
//!
//! The recognizer itself lives behind [`HandTracker`]; this crate ships only
//! a scripted stand-in. The bridge runs its own polling loop on a dedicated
//! thread and talks to the render loop exclusively through an mpsc channel,
//! so the two loops share no mutable state. The thread is torn down through
//! an atomic shutdown flag when the hosting window goes away.

use crate::scene::SceneMode;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Recognition score a gesture must exceed before it changes the mode.
const SCORE_THRESHOLD: f32 = 0.4;
/// Horizontal displacement gain for the rotation-speed signal.
const ROTATION_GAIN: f32 = 0.15;
/// Displacements below this produce no rotation at all.
const ROTATION_DEADBAND: f32 = 0.01;
/// Inference cadence. Decoupled from the display refresh on purpose.
const POLL_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    ModeChange(SceneMode),
    RotationSpeed(f32),
    Status(String),
}

/// One recognizer observation: the top gesture category with its confidence,
/// and the palm's horizontal position in [0, 1] across the camera frame.
#[derive(Debug, Clone)]
pub struct HandReading {
    pub category: String,
    pub score: f32,
    pub palm_x: f32,
}

/// Seam for the external gesture-recognition model. `init` covers model
/// download and camera acquisition; `poll` returns the latest reading, or
/// `None` when no hand is visible.
pub trait HandTracker: Send {
    fn init(&mut self) -> Result<()>;
    fn poll(&mut self) -> Result<Option<HandReading>>;
}

/// Map a recognized gesture to a scene mode. Only categories crossing the
/// confidence threshold count; anything else leaves the mode untouched.
pub fn classify(category: &str, score: f32) -> Option<SceneMode> {
    if score <= SCORE_THRESHOLD {
        return None;
    }
    match category {
        "Open_Palm" => Some(SceneMode::Chaos),
        "Closed_Fist" => Some(SceneMode::Formed),
        _ => None,
    }
}

/// Signed rotation speed from the palm's horizontal offset off center,
/// zeroed inside a small deadband so a steady hand doesn't drift the camera.
pub fn rotation_speed(palm_x: f32) -> f32 {
    let speed = (0.5 - palm_x) * ROTATION_GAIN;
    if speed.abs() > ROTATION_DEADBAND {
        speed
    } else {
        0.0
    }
}

pub struct GestureBridge {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GestureBridge {
    /// Start the polling loop on its own thread. Initialization failure is
    /// reported once through the status channel and never retried; the
    /// scene simply keeps its default mode and zero rotation.
    pub fn spawn<T: HandTracker + 'static>(mut tracker: T, tx: Sender<GestureEvent>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let handle = std::thread::Builder::new()
            .name("gesture-bridge".into())
            .spawn(move || {
                let _ = tx.send(GestureEvent::Status("DOWNLOADING MODEL".into()));
                if let Err(err) = tracker.init() {
                    let _ = tx.send(GestureEvent::Status(format!("ERROR: {err}")));
                    return;
                }
                let _ = tx.send(GestureEvent::Status("READY: SHOW HAND".into()));
                while !flag.load(Ordering::Relaxed) {
                    match tracker.poll() {
                        Ok(Some(reading)) => {
                            if let Some(mode) = classify(&reading.category, reading.score) {
                                if tx.send(GestureEvent::ModeChange(mode)).is_err() {
                                    break;
                                }
                            }
                            let _ =
                                tx.send(GestureEvent::RotationSpeed(rotation_speed(reading.palm_x)));
                        }
                        Ok(None) => {
                            let _ = tx.send(GestureEvent::RotationSpeed(0.0));
                        }
                        Err(err) => {
                            let _ = tx.send(GestureEvent::Status(format!("ERROR: {err}")));
                            return;
                        }
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            })
            .expect("spawn gesture thread");
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stop polling and join the thread. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GestureBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Scripted stand-in for the real recognizer: closes the fist a few seconds
/// in, reopens later, and sways the palm slowly so the orbit responds.
pub struct ScriptedTracker {
    started: std::time::Instant,
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }
}

impl Default for ScriptedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HandTracker for ScriptedTracker {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<HandReading>> {
        let t = self.started.elapsed().as_secs_f32();
        // 20-second loop: form, orbit, disperse.
        let phase = t % 20.0;
        let (category, score) = if phase < 3.0 {
            ("Open_Palm", 0.9)
        } else {
            ("Closed_Fist", 0.9)
        };
        Ok(Some(HandReading {
            category: category.to_string(),
            score,
            palm_x: 0.5 + 0.2 * (t * 0.3).sin(),
        }))
    }
}
