//! Headless image output: single-frame snapshots and noise heightmaps.

use std::path::Path;

use image::{GrayImage, Luma};
use noise::NoiseFn;

use crate::canvas::render_frame;
use crate::compositor::Compositor;
use crate::error::RenderError;
use crate::frame::SurfaceSize;
use crate::params::ShoreParams;

/// Rasterise one frame on the CPU and save it as a PNG.
///
/// Returns `false` without touching the filesystem when `size` has no area.
pub fn save_snapshot(
    params: ShoreParams,
    time_s: f32,
    size: SurfaceSize,
    path: impl AsRef<Path>,
) -> Result<bool, RenderError> {
    let path = path.as_ref();
    if size.is_empty() {
        log::warn!(
            "Skipping snapshot {}: surface is {}x{}",
            path.display(),
            size.width,
            size.height
        );
        return Ok(false);
    }

    let compositor = Compositor::new(params);
    let image = render_frame(&compositor, time_s, size);
    image.save(path)?;
    log::info!(
        "Saved {}x{} snapshot at t={}s to {}",
        size.width,
        size.height,
        time_s,
        path.display()
    );
    Ok(true)
}

/// Sample a 2D noise function on a square grid into a grayscale image.
///
/// Noise values in [0, 1] map onto [0, 255]; anything outside is clamped.
pub fn noise_heightmap<N: NoiseFn<f64, 2>>(noise: &N, size: u32, frequency: f64) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let nx = x as f64 * frequency;
        let ny = y as f64 * frequency;
        let gray = (noise.get([nx, ny]) * 255.0).clamp(0.0, 255.0) as u8;
        *pixel = Luma([gray]);
    }
    img
}

/// Write a noise heightmap to a PNG
pub fn save_noise_heightmap<N: NoiseFn<f64, 2>>(
    noise: &N,
    size: u32,
    frequency: f64,
    path: impl AsRef<Path>,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    noise_heightmap(noise, size, frequency).save(path)?;
    log::info!("Saved {}x{} noise heightmap to {}", size, size, path.display());
    Ok(())
}
