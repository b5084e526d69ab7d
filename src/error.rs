//! Renderer error type.

use thiserror::Error;

/// Failures that stop a renderer instance or a single frame
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(String),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(String),

    #[error("Shader rejected: {0}")]
    Shader(String),

    #[error("Surface lost or outdated")]
    SurfaceLost,

    #[error("GPU out of memory")]
    OutOfMemory,

    #[error("Frame acquisition timed out")]
    Timeout,

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            wgpu::SurfaceError::Timeout => Self::Timeout,
        }
    }
}
