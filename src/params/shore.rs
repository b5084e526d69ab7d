//! Shoreline shading parameters: palette, swell and shore geometry.
//!
//! Coordinates are normalized to [0, 1] across the surface, with y = 0 at the
//! shore (bottom edge) and y = 1 at open water (top edge).

use glam::{vec3, Vec3};

/// A single rolling swell line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDescriptor {
    /// Crests per unit of normalized height
    pub frequency: f32,

    /// Cycles per second of (scaled) shader time
    pub speed: f32,

    /// Phase offset in cycles, applied to the vertical coordinate
    pub phase_offset: f32,
}

impl WaveDescriptor {
    pub const fn new(frequency: f32, speed: f32, phase_offset: f32) -> Self {
        Self {
            frequency,
            speed,
            phase_offset,
        }
    }

    /// Time for one full cycle (seconds of shader time)
    pub fn period_s(&self) -> f32 {
        1.0 / self.speed
    }
}

/// Fixed colors for every surface the compositor blends (linear RGB, 0-1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShorePalette {
    /// Open water far from shore (deep turquoise)
    pub deep_water: Vec3,

    /// Water right behind the break (light turquoise)
    pub shallow_water: Vec3,

    /// Foam on crests and along the swash line
    pub foam: Vec3,

    /// Sand the waves just left
    pub wet_sand: Vec3,

    /// Sand above the reach of the swash
    pub dry_sand: Vec3,
}

impl Default for ShorePalette {
    fn default() -> Self {
        Self {
            deep_water: vec3(0.0, 0.35, 0.5),
            shallow_water: vec3(0.1, 0.6, 0.65),
            foam: vec3(0.95, 0.98, 1.0),
            wet_sand: vec3(0.76, 0.70, 0.55),
            dry_sand: vec3(0.92, 0.85, 0.70),
        }
    }
}

/// Number of swell lines evaluated per pixel
pub const WAVE_COUNT: usize = 4;

/// Everything the compositor needs besides time and pixel position
#[derive(Debug, Clone)]
pub struct ShoreParams {
    /// Multiplier from elapsed wall-clock seconds to shader time
    /// 0.5 = the animation runs at half speed
    pub time_scale: f32,

    /// Nominal water/sand boundary in normalized height, before wave surge
    pub shore_base: f32,

    /// Swell lines, staggered a quarter cycle apart
    pub waves: [WaveDescriptor; WAVE_COUNT],

    /// Amplitude of the sideways bend on each crest (normalized height)
    pub crest_bend: f32,

    /// Horizontal frequency of the crest bend (radians per unit width)
    pub crest_bend_frequency: f32,

    /// Phase factor that decorrelates the bend between swell lines
    pub crest_bend_phase: f32,

    /// Power-curve exponent applied to the normalized wave (<1 sharpens crests)
    pub crest_sharpness: f32,

    /// Wave height where foam starts to appear
    pub foam_threshold: f32,

    /// Width of the foam fade-in above the threshold
    pub foam_band: f32,

    /// Color constants
    pub palette: ShorePalette,
}

impl Default for ShoreParams {
    fn default() -> Self {
        Self {
            time_scale: 0.5,
            shore_base: 0.2,
            waves: [
                WaveDescriptor::new(4.0, 0.8, 0.0),
                WaveDescriptor::new(4.0, 0.8, 0.25),
                WaveDescriptor::new(4.0, 0.8, 0.5),
                WaveDescriptor::new(4.0, 0.8, 0.75),
            ],
            crest_bend: 0.02,
            crest_bend_frequency: 2.0,
            crest_bend_phase: 5.0,
            crest_sharpness: 0.7,
            foam_threshold: 0.75,
            foam_band: 0.15,
            palette: ShorePalette::default(),
        }
    }
}

impl ShoreParams {
    /// Validate parameters (finite values, positive wave rates, shore on screen)
    pub fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("time_scale", self.time_scale),
            ("shore_base", self.shore_base),
            ("crest_bend", self.crest_bend),
            ("crest_bend_frequency", self.crest_bend_frequency),
            ("crest_bend_phase", self.crest_bend_phase),
            ("crest_sharpness", self.crest_sharpness),
            ("foam_threshold", self.foam_threshold),
            ("foam_band", self.foam_band),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(format!("{} must be finite, got {}", name, value));
            }
        }

        if !(0.0..1.0).contains(&self.shore_base) {
            return Err(format!(
                "shore_base must be in [0, 1), got {}",
                self.shore_base
            ));
        }
        if self.crest_sharpness <= 0.0 {
            return Err(format!(
                "crest_sharpness must be > 0, got {}",
                self.crest_sharpness
            ));
        }
        if self.foam_band <= 0.0 {
            return Err(format!("foam_band must be > 0, got {}", self.foam_band));
        }

        for (i, wave) in self.waves.iter().enumerate() {
            if !(wave.frequency.is_finite() && wave.frequency > 0.0) {
                return Err(format!(
                    "wave {} frequency must be > 0, got {}",
                    i, wave.frequency
                ));
            }
            if !(wave.speed.is_finite() && wave.speed > 0.0) {
                return Err(format!("wave {} speed must be > 0, got {}", i, wave.speed));
            }
            if !wave.phase_offset.is_finite() {
                return Err(format!("wave {} phase offset must be finite", i));
            }
        }

        let p = &self.palette;
        for color in [p.deep_water, p.shallow_water, p.foam, p.wet_sand, p.dry_sand] {
            if !color.is_finite() || color.min_element() < 0.0 || color.max_element() > 1.0 {
                return Err(format!("palette color {:?} outside [0, 1]", color));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(ShoreParams::default().validate().is_ok());
    }

    #[test]
    fn test_default_waves_stagger_by_quarter_cycle() {
        let params = ShoreParams::default();
        let offsets: Vec<f32> = params.waves.iter().map(|w| w.phase_offset).collect();
        assert_eq!(offsets, vec![0.0, 0.25, 0.5, 0.75]);
        assert!(params
            .waves
            .iter()
            .all(|w| w.frequency == 4.0 && w.speed == 0.8));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut params = ShoreParams::default();
        params.shore_base = 1.2;
        assert!(params.validate().is_err());

        let mut params = ShoreParams::default();
        params.waves[2].speed = 0.0;
        assert!(params.validate().is_err());

        let mut params = ShoreParams::default();
        params.time_scale = f32::NAN;
        assert!(params.validate().is_err());

        let mut params = ShoreParams::default();
        params.palette.foam = vec3(1.5, 1.0, 1.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_wave_period() {
        let wave = WaveDescriptor::new(4.0, 0.8, 0.0);
        assert!((wave.period_s() - 1.25).abs() < 1e-6);
    }
}
