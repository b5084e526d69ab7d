//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers of the shoreline animation are extracted here with:
//! - Units (normalized screen height, seconds, cycles)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the shader

mod render;
mod shore;

// Re-export all types
pub use render::{RecordingConfig, RenderConfig};
pub use shore::{ShorePalette, ShoreParams, WaveDescriptor, WAVE_COUNT};
