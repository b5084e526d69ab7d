//! CPU render target: rasterises the compositor into an RGB image.

use glam::{vec2, Vec3};
use image::{Rgb, RgbImage};

use crate::compositor::Compositor;
use crate::error::RenderError;
use crate::frame::{FrameInput, RenderTarget, SurfaceSize};
use crate::params::ShoreParams;

/// Convert a [0, 1] color to 8-bit RGB
pub fn to_rgb8(color: Vec3) -> Rgb<u8> {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    Rgb([c.x as u8, c.y as u8, c.z as u8])
}

/// Rasterise one frame at `size`.
///
/// Row 0 is the top of the image. Pixel centers are sampled and the vertical
/// axis is flipped, so the bottom row sits at the shore (y near 0). A
/// zero-area size yields an empty image.
pub fn render_frame(compositor: &Compositor, time_s: f32, size: SurfaceSize) -> RgbImage {
    let mut image = RgbImage::new(size.width, size.height);
    render_into(compositor, time_s, &mut image);
    image
}

/// Rasterise into an existing image, covering every pixel
pub fn render_into(compositor: &Compositor, time_s: f32, image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let w = width as f32;
    let h = height as f32;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let uv = vec2((x as f32 + 0.5) / w, 1.0 - (y as f32 + 0.5) / h);
        *pixel = to_rgb8(compositor.shade(uv, time_s));
    }
}

/// In-memory canvas driven by the frame loop
pub struct CpuCanvas {
    compositor: Compositor,
    image: RgbImage,
    reallocations: usize,
}

impl CpuCanvas {
    pub fn new(params: ShoreParams) -> Self {
        Self {
            compositor: Compositor::new(params),
            image: RgbImage::new(0, 0),
            reallocations: 0,
        }
    }

    /// Last drawn frame
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Number of times the backing image was reallocated
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }
}

impl RenderTarget for CpuCanvas {
    fn resize(&mut self, size: SurfaceSize) {
        if self.image.dimensions() == (size.width, size.height) {
            return;
        }
        self.image = RgbImage::new(size.width, size.height);
        self.reallocations += 1;
    }

    fn draw(&mut self, frame: &FrameInput) -> Result<(), RenderError> {
        // The loop resizes before drawing; this only guards direct callers
        self.resize(frame.size);
        render_into(&self.compositor, frame.time_s, &mut self.image);
        Ok(())
    }
}
