//! Rendering and recording configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (logical pixels)
    pub window_width: u32,

    /// Window height (logical pixels)
    pub window_height: u32,

    /// Upper bound on the device-pixel-ratio used for the surface.
    /// 2.0 keeps high-DPI displays from quadrupling fragment work again.
    pub max_scale_factor: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            max_scale_factor: 2.0,
        }
    }
}

impl RenderConfig {
    /// Validate configuration (scale cap must be a usable multiplier)
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_scale_factor.is_finite() && self.max_scale_factor >= 1.0) {
            return Err(format!(
                "max scale factor must be >= 1.0, got {}",
                self.max_scale_factor
            ));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Path of a single captured frame
    pub fn frame_path(&self, frame_num: u64) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), frame_num)
    }
}
