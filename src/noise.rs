//! Value noise and fractal Brownian motion for the shoreline shader.
//!
//! These are the CPU reference versions of the functions in `shore.wgsl`.
//! They operate on `f32` so that both back-ends see the same precision, and
//! they are fully deterministic: the same point always yields the same value.

use glam::{vec2, Vec2};
use noise::NoiseFn;

/// Dot-product constants for the lattice hash
const HASH_DOT: Vec2 = Vec2::new(127.1, 311.7);

/// Scale applied to `sin` before taking the fractional part
const HASH_SCALE: f32 = 43758.5453;

/// Number of fBm octaves
pub const FBM_OCTAVES: usize = 4;

/// Fractional part, GLSL semantics (`x - floor(x)`, always in [0, 1))
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Linear interpolation `a + (b - a) * t`
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1]
#[inline]
pub fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Hermite step between two edges.
///
/// Reversed edges (`edge0 > edge1`) produce a falling step, which the
/// compositor relies on for the shore mask. Coincident edges collapse to a
/// hard step at `edge0`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = saturate((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Pseudo-random scalar in [0, 1) for a 2D point
#[inline]
pub fn hash(p: Vec2) -> f32 {
    fract(p.dot(HASH_DOT).sin() * HASH_SCALE)
}

/// Smoothed value noise in [0, 1].
///
/// Hashes the four surrounding lattice corners and blends them with a
/// `3t² - 2t³` weight, which hides the lattice grid.
pub fn value_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;
    let w = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let a = hash(i);
    let b = hash(i + vec2(1.0, 0.0));
    let c = hash(i + vec2(0.0, 1.0));
    let d = hash(i + vec2(1.0, 1.0));

    mix(mix(a, b, w.x), mix(c, d, w.x), w.y)
}

/// Four octaves of value noise, doubling frequency and halving amplitude.
///
/// Output lies in [0, 0.9375].
pub fn fbm(p: Vec2) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * value_noise(p * frequency);
        frequency *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// [`value_noise`] behind the `noise` crate's sampling interface
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueNoise;

impl NoiseFn<f64, 2> for ValueNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        value_noise(vec2(point[0] as f32, point[1] as f32)) as f64
    }
}

/// [`fbm`] behind the `noise` crate's sampling interface
#[derive(Clone, Copy, Debug, Default)]
pub struct Fbm;

impl NoiseFn<f64, 2> for Fbm {
    fn get(&self, point: [f64; 2]) -> f64 {
        fbm(vec2(point[0] as f32, point[1] as f32)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_hash_is_deterministic() {
        let p = vec2(1.23, 4.56);
        let first = hash(p);
        let second = hash(p);
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((0.0..1.0).contains(&first));
    }

    #[test]
    fn test_hash_varies_between_cells() {
        let a = hash(vec2(0.0, 0.0));
        let b = hash(vec2(1.0, 0.0));
        let c = hash(vec2(0.0, 1.0));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_noise_matches_hash_at_lattice_points() {
        for (x, y) in [(0.0, 0.0), (3.0, -2.0), (17.0, 5.0)] {
            let p = vec2(x, y);
            assert!((value_noise(p) - hash(p)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_value_noise_bounded() {
        for i in 0..200 {
            for j in 0..50 {
                let p = vec2(i as f32 * 0.173 - 12.0, j as f32 * 0.291 - 3.0);
                let n = value_noise(p);
                assert!(
                    n >= -EPSILON && n <= 1.0 + EPSILON,
                    "value_noise({:?}) = {} out of range",
                    p,
                    n
                );
            }
        }
    }

    #[test]
    fn test_fbm_bounded() {
        for i in 0..100 {
            for j in 0..100 {
                let p = vec2(i as f32 * 0.37, j as f32 * 0.53) * 8.0;
                let n = fbm(p);
                assert!(n >= 0.0 && n <= 0.9375 + EPSILON, "fbm({:?}) = {}", p, n);
            }
        }
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.2, 0.7, 0.0), 0.0);
        assert_eq!(smoothstep(0.2, 0.7, 1.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < EPSILON);

        // Reversed edges fall instead of rise
        assert_eq!(smoothstep(1.0, 0.9, 0.8), 1.0);
        assert_eq!(smoothstep(1.0, 0.9, 1.0), 0.0);
    }

    #[test]
    fn test_smoothstep_coincident_edges_is_a_step() {
        assert_eq!(smoothstep(1.0, 1.0, 0.5), 0.0);
        assert_eq!(smoothstep(1.0, 1.0, 1.0), 1.0);
        assert_eq!(smoothstep(0.0, 0.0, 0.25), 1.0);
    }

    #[test]
    fn test_fract_is_floor_based() {
        assert!((fract(-0.25) - 0.75).abs() < EPSILON);
        assert!((fract(2.5) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_noise_fn_agrees_with_fbm() {
        let sampler = Fbm;
        for &(x, y) in &[(0.5, 0.25), (12.75, 3.5), (-4.0, 9.125)] {
            let direct = fbm(vec2(x as f32, y as f32)) as f64;
            assert_eq!(sampler.get([x, y]), direct);
        }
        assert_eq!(
            ValueNoise.get([2.5, 7.25]),
            value_noise(vec2(2.5, 7.25)) as f64
        );
    }
}
