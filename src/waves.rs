//! Rolling swell waveforms.
//!
//! Each swell line is a sine travelling along the vertical axis toward the
//! shore (decreasing y), remapped to [0, 1] and sharpened with a power curve
//! so crests are narrower than troughs.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::noise::saturate;
use crate::params::{ShoreParams, WaveDescriptor, WAVE_COUNT};

/// Shape of a single crest profile (bend and sharpening)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrestShape {
    pub bend: f32,
    pub bend_frequency: f32,
    pub bend_phase: f32,
    pub sharpness: f32,
}

impl Default for CrestShape {
    fn default() -> Self {
        Self::from_params(&ShoreParams::default())
    }
}

impl CrestShape {
    pub fn from_params(params: &ShoreParams) -> Self {
        Self {
            bend: params.crest_bend,
            bend_frequency: params.crest_bend_frequency,
            bend_phase: params.crest_bend_phase,
            sharpness: params.crest_sharpness,
        }
    }
}

/// Wave height in [0, 1] at `uv` using the default crest shape
pub fn wave(uv: Vec2, time: f32, frequency: f32, speed: f32, phase_offset: f32) -> f32 {
    wave_with_shape(
        uv,
        time,
        frequency,
        speed,
        phase_offset,
        &CrestShape::default(),
    )
}

/// Wave height in [0, 1] at `uv`.
///
/// # Arguments
/// * `uv` - Normalized position (y = 0 at the shore)
/// * `time` - Shader time in seconds (already scaled)
/// * `frequency` - Crests per unit height
/// * `speed` - Cycles per second
/// * `phase_offset` - Offset in cycles along y
/// * `shape` - Crest bend and sharpening
pub fn wave_with_shape(
    uv: Vec2,
    time: f32,
    frequency: f32,
    speed: f32,
    phase_offset: f32,
    shape: &CrestShape,
) -> f32 {
    // Bend the crest line so it is not a perfectly straight band
    let bend = (uv.x * shape.bend_frequency + phase_offset * shape.bend_phase).sin() * shape.bend;
    let y = uv.y + phase_offset + bend;

    let w = ((y * frequency + time * speed) * TAU).sin() * 0.5 + 0.5;
    saturate(w).powf(shape.sharpness)
}

impl WaveDescriptor {
    /// Evaluate this swell line at `uv`
    pub fn sample(&self, uv: Vec2, time: f32, shape: &CrestShape) -> f32 {
        wave_with_shape(
            uv,
            time,
            self.frequency,
            self.speed,
            self.phase_offset,
            shape,
        )
    }
}

/// The full set of staggered swell lines
#[derive(Debug, Clone)]
pub struct WaveSet {
    waves: [WaveDescriptor; WAVE_COUNT],
    shape: CrestShape,
}

impl WaveSet {
    pub fn new(params: &ShoreParams) -> Self {
        Self {
            waves: params.waves,
            shape: CrestShape::from_params(params),
        }
    }

    /// Heights of every swell line at `uv`, in descriptor order
    pub fn sample(&self, uv: Vec2, time: f32) -> [f32; WAVE_COUNT] {
        self.waves.map(|w| w.sample(uv, time, &self.shape))
    }
}
