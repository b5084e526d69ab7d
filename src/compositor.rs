//! Per-pixel shoreline compositor (CPU reference of `shore.wgsl`).
//!
//! Combines the swell lines, depth gradient, foam masks and a surging shore
//! boundary into a final color. Every blend weight stays in [0, 1] and the
//! final color is clamped, so any finite input yields a displayable color.

use glam::{vec2, Vec2, Vec3};

use crate::noise::{fbm, saturate, smoothstep};
use crate::params::{ShoreParams, WAVE_COUNT};
use crate::waves::WaveSet;

/// Distance (normalized height) over which foam fades out going offshore
const SHORE_PROXIMITY_RANGE: f32 = 0.5;

/// Half-width of the soft edge between wet swash and sand
const SHORE_EDGE: f32 = 0.02;

/// Width of the foam line drawn along the swash boundary
const SHORE_FOAM_WIDTH: f32 = 0.03;

/// Darkest trough shading relative to the water color
const TROUGH_SHADE: f32 = 0.85;

/// Intermediate masks of one compositor evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeLayers {
    /// Swell heights in [0, 1]
    pub waves: [f32; WAVE_COUNT],

    /// Low-frequency organic variation (fbm scaled by 0.1)
    pub noise: f32,

    /// 1 at the nominal shore, falling to 0 half a screen offshore
    pub shore_proximity: f32,

    /// Crest foam, already weighted by proximity and texture (may exceed 1)
    pub foam: f32,

    /// Bright rim at the very tip of the two leading crests
    pub edge_foam: f32,

    /// Depth gradient: 0 at the shore line, 1 at the top edge
    pub depth: f32,

    /// Current reach of the swash (normalized height)
    pub reach: f32,

    /// 1 where the pixel is on sand, 0 on water
    pub on_shore: f32,

    /// Band just above the nominal shore where sand stays wet
    pub wet_zone: f32,

    /// Foam line hugging the swash boundary
    pub shore_foam: f32,

    /// Specular glints on open water
    pub sparkle: f32,
}

/// Stateless compositor bound to a parameter set
#[derive(Debug, Clone)]
pub struct Compositor {
    params: ShoreParams,
    waves: WaveSet,
}

impl Compositor {
    /// Bind a parameter set.
    ///
    /// Parameters are expected to pass [`ShoreParams::validate`]; outside that
    /// range colors stay finite only for finite parameter values.
    pub fn new(params: ShoreParams) -> Self {
        let waves = WaveSet::new(&params);
        Self { params, waves }
    }

    pub fn params(&self) -> &ShoreParams {
        &self.params
    }

    /// Evaluate every intermediate mask for a pixel.
    ///
    /// # Arguments
    /// * `uv` - Normalized position, y = 0 at the bottom (shore) edge
    /// * `elapsed_s` - Seconds since the renderer started
    pub fn layers(&self, uv: Vec2, elapsed_s: f32) -> ShadeLayers {
        let p = &self.params;
        let time = elapsed_s * p.time_scale;
        let shore = p.shore_base;

        let waves = self.waves.sample(uv, time);
        let [w1, w2, _, _] = waves;

        let noise = fbm(uv * 8.0 + Vec2::splat(time * 0.2)) * 0.1;

        // Crest foam, biased toward the shore and broken up by texture
        let crest_foam: f32 = waves
            .iter()
            .map(|&w| smoothstep(p.foam_threshold, p.foam_threshold + p.foam_band, w))
            .sum();
        let shore_proximity = 1.0 - smoothstep(shore, shore + SHORE_PROXIMITY_RANGE, uv.y);
        let foam_texture = fbm(uv * 30.0 + Vec2::splat(time * 0.5));
        let foam = crest_foam
            * 0.3
            * (0.3 + shore_proximity * 0.7)
            * (0.7 + foam_texture * 0.5);

        let edge = |w: f32| smoothstep(0.85, 0.95, w) * smoothstep(1.0, 0.9, w);
        let edge_foam = (edge(w1) + edge(w2)) * 0.5;

        let depth = depth_weight(uv.y, p);

        // Swash surges with the two leading swells
        let reach = shore + (w1 * 0.15 + w2 * 0.1) * shore_proximity + noise * 0.5;
        let on_shore = smoothstep(reach + SHORE_EDGE, reach - SHORE_EDGE, uv.y);

        let wet_zone = smoothstep(shore - 0.1, shore + 0.15, uv.y)
            * (1.0 - smoothstep(shore + 0.15, shore + 0.35, uv.y));

        let shore_foam = smoothstep(SHORE_FOAM_WIDTH, 0.0, (uv.y - reach).abs())
            * (0.5 + fbm(vec2(uv.x * 20.0, time * 2.0)) * 0.5);

        let sparkle = fbm(uv * 50.0 + Vec2::splat(time)).powi(3) * depth;

        ShadeLayers {
            waves,
            noise,
            shore_proximity,
            foam,
            edge_foam,
            depth,
            reach,
            on_shore,
            wet_zone,
            shore_foam,
            sparkle,
        }
    }

    /// Blend the masks into the final color, clamped to [0, 1]
    pub fn compose(&self, layers: &ShadeLayers) -> Vec3 {
        let palette = &self.params.palette;
        let [w1, w2, _, _] = layers.waves;

        let water = palette
            .shallow_water
            .lerp(palette.deep_water, layers.depth);
        let water = (water * TROUGH_SHADE).lerp(water, (w1 + w2) * 0.5);

        let sand = palette.dry_sand.lerp(
            palette.wet_sand,
            saturate(layers.wet_zone * 0.8 + layers.on_shore * 0.3),
        );

        let mut color = water;
        color = color.lerp(palette.foam, saturate(layers.foam * 0.8));
        color = color.lerp(palette.foam, saturate(layers.edge_foam * 0.6));
        color = color.lerp(sand, layers.on_shore);
        color = color.lerp(palette.foam, saturate(layers.shore_foam * 0.9));
        color += Vec3::splat(layers.sparkle * 0.1);

        color.clamp(Vec3::ZERO, Vec3::ONE)
    }

    /// Final color of a pixel
    pub fn shade(&self, uv: Vec2, elapsed_s: f32) -> Vec3 {
        self.compose(&self.layers(uv, elapsed_s))
    }
}

/// Depth gradient weight: 0 at the nominal shore, rising to 1 at the top edge
pub fn depth_weight(y: f32, params: &ShoreParams) -> f32 {
    smoothstep(params.shore_base, 1.0, y)
}

/// Convenience wrapper for one-off evaluation with an explicit parameter set
pub fn shade(uv: Vec2, elapsed_s: f32, params: &ShoreParams) -> Vec3 {
    Compositor::new(params.clone()).shade(uv, elapsed_s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec2> {
        (0..=24).flat_map(|i| (0..=24).map(move |j| vec2(i as f32 / 24.0, j as f32 / 24.0)))
    }

    #[test]
    fn test_shade_is_deterministic() {
        let compositor = Compositor::new(ShoreParams::default());
        for uv in grid() {
            let a = compositor.shade(uv, 3.75);
            let b = compositor.shade(uv, 3.75);
            assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
        }
    }

    #[test]
    fn test_colors_stay_in_display_range() {
        let compositor = Compositor::new(ShoreParams::default());
        for &t in &[0.0, 0.5, 7.3, 120.0, 3600.0] {
            for uv in grid() {
                let c = compositor.shade(uv, t);
                assert!(c.is_finite(), "non-finite color at {:?}, t={}", uv, t);
                assert!(
                    c.min_element() >= 0.0 && c.max_element() <= 1.0,
                    "color {:?} out of range at {:?}, t={}",
                    c,
                    uv,
                    t
                );
            }
        }
    }

    #[test]
    fn test_shore_at_top_edge_stays_displayable() {
        // depth gradient collapses to zero width
        let params = ShoreParams {
            shore_base: 1.0,
            ..ShoreParams::default()
        };
        let compositor = Compositor::new(params);
        for uv in grid() {
            let c = compositor.shade(uv, 1.5);
            assert!(c.is_finite(), "non-finite color at {:?}", uv);
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
        }
        assert_eq!(depth_weight(0.5, compositor.params()), 0.0);
        assert_eq!(depth_weight(1.0, compositor.params()), 1.0);
    }

    #[test]
    fn test_blend_weights_stay_in_unit_range() {
        let compositor = Compositor::new(ShoreParams::default());
        for &t in &[0.0, 2.2, 40.0] {
            for uv in grid() {
                let l = compositor.layers(uv, t);
                for value in [
                    l.shore_proximity,
                    l.edge_foam,
                    l.depth,
                    l.on_shore,
                    l.wet_zone,
                    l.shore_foam,
                    l.sparkle,
                ] {
                    assert!((0.0..=1.0).contains(&value), "{:?}", l);
                }
                assert!(l.foam >= 0.0);
            }
        }
    }

    #[test]
    fn test_depth_is_monotonic_offshore() {
        let params = ShoreParams::default();
        let mut previous = depth_weight(params.shore_base, &params);
        assert_eq!(previous, 0.0);
        for i in 1..=200 {
            let y = params.shore_base + (1.0 - params.shore_base) * i as f32 / 200.0;
            let d = depth_weight(y, &params);
            assert!(d >= previous, "depth fell from {} to {} at y={}", previous, d, y);
            previous = d;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_sand_at_bottom_water_at_top() {
        let params = ShoreParams::default();
        let compositor = Compositor::new(params.clone());

        for &t in &[0.0, 1.0, 9.5] {
            let bottom = compositor.shade(vec2(0.5, 0.02), t);
            let top = compositor.shade(vec2(0.5, 0.98), t);

            // Sand is warm (red over blue), water and foam are cool
            assert!(bottom.x > bottom.z, "bottom {:?} is not sand", bottom);
            assert!(top.z > top.x, "top {:?} is not water", top);

            let sand = params.palette.dry_sand;
            assert!(
                bottom.distance(sand) < top.distance(sand),
                "bottom {:?} should be closer to sand than top {:?}",
                bottom,
                top
            );
        }
    }

    #[test]
    fn test_bottom_edge_is_fully_on_shore() {
        let compositor = Compositor::new(ShoreParams::default());
        let layers = compositor.layers(vec2(0.25, 0.0), 4.0);
        assert_eq!(layers.on_shore, 1.0);
        assert!(layers.reach >= compositor.params().shore_base);
    }

    #[test]
    fn test_free_function_matches_compositor() {
        let params = ShoreParams::default();
        let uv = vec2(0.7, 0.45);
        assert_eq!(shade(uv, 2.0, &params), Compositor::new(params).shade(uv, 2.0));
    }
}
