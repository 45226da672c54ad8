//! Rendering: camera and orbit control, the CPU splat rasterizer, and the
//! wgpu presentation path that blits the rasterized framebuffer.

pub mod camera;
pub mod rasterizer;
pub mod renderer;
pub mod shaders;

pub use camera::{Camera, OrbitController};
pub use rasterizer::Rasterizer;
pub use renderer::Renderer;

/// Rendering error types.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

pub type RenderResult<T> = Result<T, RenderError>;
