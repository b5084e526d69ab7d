//! Command-line argument parsing.

use clap::Parser;

use crate::params::{RecordingConfig, RenderConfig, ShoreParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Shorebreak")]
#[command(about = "Procedural waves rolling onto a sandy shore", long_about = None)]
pub struct Args {
    /// Window width (logical pixels); also the snapshot width
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Window height (logical pixels); also the snapshot height
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,

    /// Upper bound on the device-pixel-ratio
    #[arg(long, value_name = "FACTOR", default_value_t = 2.0)]
    pub max_scale: f64,

    /// Record frames to disk (duration in seconds), then exit
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Render a single frame on the CPU to this PNG and exit
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<String>,

    /// Elapsed time of the snapshot frame
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Write the fBm noise field to this PNG and exit
    #[arg(long, value_name = "PATH")]
    pub dump_noise: Option<String>,

    /// Noise dump size (width = height)
    #[arg(long, value_name = "PIXELS", default_value_t = 256)]
    pub noise_size: u32,

    /// Noise dump frequency (spatial scale per pixel)
    #[arg(long, value_name = "FREQ", default_value_t = 0.05)]
    pub noise_frequency: f64,

    /// Override where the waterline sits (0 = bottom edge, 1 = top edge)
    #[arg(long, value_name = "Y")]
    pub shore_base: Option<f32>,

    /// Override the animation speed multiplier
    #[arg(long, value_name = "FACTOR")]
    pub time_scale: Option<f32>,
}

impl Args {
    /// Window and surface settings from the command line
    pub fn render_config(&self) -> Result<RenderConfig, String> {
        let config = RenderConfig {
            window_width: self.width,
            window_height: self.height,
            max_scale_factor: self.max_scale,
        };
        config.validate()?;
        Ok(config)
    }

    /// Shore parameters with command-line overrides applied
    pub fn shore_params(&self) -> Result<ShoreParams, String> {
        let mut params = ShoreParams::default();
        if let Some(shore_base) = self.shore_base {
            params.shore_base = shore_base;
        }
        if let Some(time_scale) = self.time_scale {
            params.time_scale = time_scale;
        }
        params.validate()?;
        Ok(params)
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> std::io::Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        let config = RecordingConfig::new(duration);

        // Create output directories
        std::fs::create_dir_all(config.frames_dir())?;
        log::info!(
            "Recording {}s ({} frames) to {}",
            config.duration_secs,
            config.total_frames(),
            config.frames_dir()
        );

        Ok(Some(config))
    }
}
