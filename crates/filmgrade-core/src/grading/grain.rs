//! Film grain synthesis.
//!
//! Grain is two to four octaves of value noise on the pixel grid, one
//! shared luminance layer plus one layer per dye. Roughness adds the finer
//! octaves. The result is deterministic for
//! a given `(x, y, seed)` so renders are reproducible and can run in any
//! pixel order.
//!
//! # Response
//! ```text
//! octaves  = 2 + round(2 × roughness)               each at twice the frequency
//! layer    = Σ w_i × noise_i / Σ w_i,  w_i = 0.7^i
//! density  = 1 − |2(lum − 0.5)|^2.5                 peak at mid-gray
//! response = density + (1 − density) × (shadow_mask × shadows + highlight_mask × highlights)
//! noise_c  = mix(luma_noise, dye_noise_c, chromacity)
//! out_c    = in_c + noise_c × amount × 0.12 × response
//! ```

use crate::color_management::color_space::{clamp01, luminance, smoothstep};

/// Amplitude ratio between successive octaves.
const PERSISTENCE: f32 = 0.7;

/// Seeds for the luminance layer and the three dye layers.
const LAYER_SALT: [u32; 4] = [0x9E37_79B9, 0x85EB_CA6B, 0xC2B2_AE35, 0x27D4_EB2F];

/// Grain settings, normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grain {
    pub amount: f32,
    /// 0 = finest (one-pixel cells), 1 = coarse (four-pixel cells).
    pub size: f32,
    /// 0 = two smooth octaves, 1 = four octaves down to sub-pixel detail.
    pub roughness: f32,
    /// 0 = monochrome, 1 = independent dye layers.
    pub chromacity: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub seed: u32,
}

impl Grain {
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }

    /// Grain visibility for a given luminance.
    pub fn response(&self, lum: f32) -> f32 {
        let density = 1.0 - ((lum - 0.5).abs() * 2.0).min(1.0).powf(2.5);
        let shadow_mask = 1.0 - smoothstep(0.0, 0.5, lum);
        let highlight_mask = smoothstep(0.5, 1.0, lum);
        density + (1.0 - density) * (shadow_mask * self.shadows + highlight_mask * self.highlights)
    }

    /// Number of noise octaves, 2 to 4.
    fn octaves(&self) -> u32 {
        2 + (self.roughness.clamp(0.0, 1.0) * 2.0).round() as u32
    }

    /// Multi-octave noise in [-1, 1] for one layer.
    fn layer(&self, x: f32, y: f32, salt: u32) -> f32 {
        let seed = self.seed ^ salt;
        let mut scale = 1.0 / ((1.0 + 3.0 * self.size) * 2.0);
        let mut weight = 1.0;
        let (mut sum, mut total) = (0.0, 0.0);
        for octave in 0..self.octaves() {
            sum += value_noise(x * scale, y * scale, seed.wrapping_add(octave)) * weight;
            total += weight;
            scale *= 2.0;
            weight *= PERSISTENCE;
        }
        (sum / total) * 2.0 - 1.0
    }

    /// Add grain to one pixel at integer position `(x, y)`.
    pub fn apply(&self, rgb: [f32; 3], x: u32, y: u32) -> [f32; 3] {
        if !self.is_active() {
            return rgb;
        }
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        let luma_noise = self.layer(fx, fy, LAYER_SALT[0]);
        let k = self.amount * 0.12 * self.response(luminance(rgb));

        let mut out = rgb;
        for c in 0..3 {
            let noise = if self.chromacity > 0.0 {
                let dye = self.layer(fx, fy, LAYER_SALT[c + 1]);
                luma_noise + (dye - luma_noise) * self.chromacity
            } else {
                luma_noise
            };
            out[c] += noise * k;
        }
        clamp01(out)
    }
}

/// Integer lattice hash to [0, 1).
pub(crate) fn lattice_hash(ix: i32, iy: i32, seed: u32) -> f32 {
    let mut h = (ix as u32).wrapping_mul(0x8DA6_B343)
        ^ (iy as u32).wrapping_mul(0xD816_3841)
        ^ seed.wrapping_mul(0xCB1A_B31F);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5BD1_E995);
    h ^= h >> 15;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

/// Smoothly interpolated lattice noise in [0, 1].
fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (ix, iy) = (x0 as i32, y0 as i32);

    let a = lattice_hash(ix, iy, seed);
    let b = lattice_hash(ix + 1, iy, seed);
    let c = lattice_hash(ix, iy + 1, seed);
    let d = lattice_hash(ix + 1, iy + 1, seed);

    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);
    let top = a + (b - a) * ux;
    let bottom = c + (d - c) * ux;
    top + (bottom - top) * uy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grain(amount: f32, chromacity: f32) -> Grain {
        Grain {
            amount,
            size: 0.5,
            roughness: 0.5,
            chromacity,
            highlights: 0.2,
            shadows: 0.8,
            seed: 7,
        }
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let rgb = [0.25, 0.5, 0.75];
        assert_eq!(grain(0.0, 0.6).apply(rgb, 3, 9), rgb);
    }

    #[test]
    fn test_deterministic_per_pixel_and_seed() {
        let g = grain(1.0, 0.6);
        assert_eq!(g.apply([0.5; 3], 10, 20), g.apply([0.5; 3], 10, 20));
        let reseeded = Grain { seed: 8, ..g };
        let differs = (0..32).any(|x| g.apply([0.5; 3], x, 0) != reseeded.apply([0.5; 3], x, 0));
        assert!(differs, "seed should change the pattern");
    }

    #[test]
    fn test_output_is_finite_and_clamped() {
        let g = grain(1.0, 1.0);
        for y in 0..16 {
            for x in 0..16 {
                for rgb in [[0.0; 3], [0.5; 3], [1.0; 3]] {
                    let out = g.apply(rgb, x, y);
                    assert!(
                        out.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)),
                        "({x}, {y}): {out:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_monochrome_grain_keeps_gray_neutral() {
        let g = grain(1.0, 0.0);
        for x in 0..16 {
            let out = g.apply([0.5; 3], x, x);
            assert_eq!(out[0], out[1]);
            assert_eq!(out[1], out[2]);
        }
    }

    /// Mean absolute difference between horizontal neighbours of one layer.
    fn neighbour_energy(g: &Grain) -> f32 {
        let mut total = 0.0;
        for y in 0..64 {
            for x in 0..64 {
                let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
                total += (g.layer(fx + 1.0, fy, LAYER_SALT[0]) - g.layer(fx, fy, LAYER_SALT[0])).abs();
            }
        }
        total / (64.0 * 64.0)
    }

    #[test]
    fn test_roughness_sets_octave_count() {
        let at = |roughness| Grain { roughness, ..grain(1.0, 0.0) }.octaves();
        assert_eq!(at(0.0), 2);
        assert_eq!(at(0.5), 3);
        assert_eq!(at(1.0), 4);
    }

    #[test]
    fn test_roughness_adds_fine_detail() {
        let smooth = Grain { roughness: 0.0, ..grain(1.0, 0.0) };
        let rough = Grain { roughness: 1.0, ..grain(1.0, 0.0) };
        let (a, b) = (neighbour_energy(&smooth), neighbour_energy(&rough));
        assert!(b > a, "rough {b} should exceed smooth {a}");
    }

    /// Sum of channel spread over a flat gray patch.
    fn channel_spread(chromacity: f32) -> (f32, usize) {
        let g = grain(1.0, chromacity);
        let mut spread = 0.0;
        let mut coloured = 0;
        for y in 0..32 {
            for x in 0..32 {
                let [r, gr, b] = g.apply([0.5; 3], x, y);
                let d = (r - gr).abs() + (gr - b).abs();
                spread += d;
                if d > 1e-4 {
                    coloured += 1;
                }
            }
        }
        (spread, coloured)
    }

    #[test]
    fn test_chromacity_decorrelates_dye_layers() {
        let (_, coloured) = channel_spread(1.0);
        assert!(coloured > 32 * 32 / 2, "only {coloured} pixels carry colour");

        let spreads: Vec<f32> = [0.0, 0.25, 0.5, 1.0].map(|c| channel_spread(c).0).to_vec();
        assert_eq!(spreads[0], 0.0);
        for pair in spreads.windows(2) {
            assert!(pair[1] > pair[0], "{spreads:?}");
        }
    }

    #[test]
    fn test_response_peaks_at_mid_gray() {
        let g = Grain {
            highlights: 0.0,
            shadows: 0.0,
            ..grain(1.0, 0.0)
        };
        assert!((g.response(0.5) - 1.0).abs() < 1e-6);
        assert!(g.response(0.1) < g.response(0.4));
        assert!(g.response(1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shadow_override_raises_dark_grain() {
        let low = Grain { shadows: 0.0, ..grain(1.0, 0.0) };
        let high = Grain { shadows: 1.0, ..grain(1.0, 0.0) };
        assert!(high.response(0.05) > low.response(0.05));
    }

    #[test]
    fn test_value_noise_range() {
        for i in 0..200 {
            let v = value_noise(i as f32 * 0.37, i as f32 * 0.11, 3);
            assert!((0.0..=1.0).contains(&v), "{v}");
        }
    }
}
