//! Film emulation: per-stock colour recipes, the dye-crosstalk matrix,
//! the toe/shoulder tone curve, and the shadow/highlight crossover.
//!
//! Every stock's look is a [`Recipe`]: a short fixed chain of channel
//! gains, shadow tint, contrast, highlight roll-off, and HSL saturation.
//! Stocks without a hand-tuned recipe derive one from their registry
//! record.

use glam::{Mat3, Vec3};

use crate::color_management::color_space::{
    REC709, clamp01, hsl_to_rgb, luminance, mix3, rgb_to_hsl, smoothstep,
};
use crate::film::registry::{FilmProfile, FilmType};
use crate::grading::sliders::apply_contrast;

/// Extra channel boost applied after a vivid recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VividBoost {
    /// Unconditional blue gain.
    Blue(f32),
    /// Blue gain on sky-like pixels, green gain on foliage-like pixels.
    SkyAndFoliage { sky: f32, foliage: f32 },
}

/// The emulation chain for one stock.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Recipe {
    /// Gains, shadow tint, contrast, optional roll-off toward gray, saturation.
    Negative {
        gains: [f32; 3],
        shadow_tint: [f32; 3],
        contrast: f32,
        /// `(start, amount)`: mix toward luminance by `smoothstep(start, 1, lum) × amount`.
        rolloff: Option<(f32, f32)>,
        saturation: f32,
    },
    /// Saturation first, then contrast, then a channel boost.
    Vivid {
        saturation: f32,
        contrast: f32,
        boost: VividBoost,
    },
    /// Weighted gray, contrast, power.
    Mono {
        weights: [f32; 3],
        contrast: f32,
        gamma: f32,
    },
    /// Derived from the registry shifts and multipliers.
    Generic {
        shadow_shift: [f32; 3],
        highlight_shift: [f32; 3],
        contrast: f32,
        saturation: f32,
    },
}

const fn negative(
    gains: [f32; 3],
    shadow_tint: [f32; 3],
    contrast: f32,
    rolloff: Option<(f32, f32)>,
    saturation: f32,
) -> Recipe {
    Recipe::Negative {
        gains,
        shadow_tint,
        contrast,
        rolloff,
        saturation,
    }
}

const fn mono(weights: [f32; 3], contrast: f32) -> Recipe {
    Recipe::Mono {
        weights,
        contrast,
        gamma: 1.0,
    }
}

impl Recipe {
    fn for_profile(profile: &FilmProfile) -> Self {
        use FilmType as F;
        const FLAT: [f32; 3] = [0.0; 3];
        const UNIT: [f32; 3] = [1.0; 3];
        match profile.film {
            F::AmberGold => negative([1.12, 1.03, 0.82], [0.04, 0.02, -0.01], 0.12, None, 1.25),
            F::Portrait160 => negative([1.01, 1.015, 0.99], FLAT, -0.08, Some((0.85, 0.25)), 0.85),
            F::Portrait400 => negative([1.02, 1.01, 0.98], FLAT, -0.05, Some((0.8, 0.2)), 0.88),
            F::Portrait800 => negative([1.03, 1.02, 0.97], [0.02, 0.025, 0.015], -0.02, None, 0.9),
            F::Vivid100 => Recipe::Vivid {
                saturation: 1.35,
                contrast: 0.18,
                boost: VividBoost::Blue(1.02),
            },
            F::Max400 => negative([1.08, 1.02, 0.88], [0.03, 0.02, -0.02], 0.1, None, 1.2),
            F::BudgetColor => negative([1.06, 1.015, 0.9], [0.03, 0.015, -0.015], 0.08, None, 1.15),
            F::VintageChrome => negative([1.15, 1.02, 0.85], [0.02, 0.0, -0.02], 0.25, None, 1.4),
            F::Chrome100 => negative([0.98, 1.0, 1.08], FLAT, 0.15, None, 1.2),
            F::Verdant400 => negative([0.97, 1.06, 0.94], [0.0, 0.035, 0.0], 0.08, None, 1.12),
            F::FPortrait400 => negative([0.99, 1.02, 1.02], [-0.01, 0.02, 0.02], -0.1, None, 0.82),
            F::FC200 => negative([0.99, 1.04, 0.98], FLAT, 0.05, None, 1.1),
            F::Natural100 => negative(UNIT, FLAT, 0.08, None, 1.15),
            F::Vivid50 => Recipe::Vivid {
                saturation: 1.6,
                contrast: 0.25,
                boost: VividBoost::SkyAndFoliage {
                    sky: 1.12,
                    foliage: 1.08,
                },
            },
            F::Soft100 => negative(UNIT, FLAT, 0.02, Some((0.85, 0.15)), 1.0),
            F::Motion800T => negative([0.92, 0.98, 1.15], [-0.03, 0.01, 0.05], 0.05, None, 1.1),
            F::Motion50D => negative([1.02, 1.01, 1.03], FLAT, 0.12, None, 1.2),
            F::MonoClassic400 => mono(REC709, 0.2),
            F::MonoClassicTx => mono([0.22, 0.68, 0.10], 0.18),
            F::MonoGrain3200 => Recipe::Mono {
                weights: REC709,
                contrast: 0.28,
                gamma: 1.1,
            },
            F::MonoFine100 => mono(REC709, 0.15),
            F::MonoFineAc => mono([0.25, 0.60, 0.15], 0.1),
            F::MonoFinePf => mono(REC709, 0.22),
            F::Cinema2383 | F::LomochromePurple | F::RealaAce | F::None => Recipe::Generic {
                shadow_shift: profile.shadow_shift,
                highlight_shift: profile.highlight_shift,
                contrast: profile.contrast - 1.0,
                saturation: profile.saturation,
            },
        }
    }

    /// Run the chain. Luminance masks and vivid boosts key off the
    /// colour entering the recipe, not the partially processed one.
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let lum = luminance(rgb);
        match *self {
            Recipe::Negative {
                gains,
                shadow_tint,
                contrast,
                rolloff,
                saturation,
            } => {
                let mut c = [0.0; 3];
                for i in 0..3 {
                    c[i] = rgb[i] * gains[i] + (1.0 - lum) * shadow_tint[i];
                }
                c = apply_contrast(c, contrast);
                if let Some((start, amount)) = rolloff {
                    c = mix3(c, [lum; 3], smoothstep(start, 1.0, lum) * amount);
                }
                scale_saturation(c, saturation)
            }
            Recipe::Vivid {
                saturation,
                contrast,
                boost,
            } => {
                let mut c = apply_contrast(scale_saturation(rgb, saturation), contrast);
                let [r, g, b] = rgb;
                match boost {
                    VividBoost::Blue(k) => c[2] *= k,
                    VividBoost::SkyAndFoliage { sky, foliage } => {
                        if b > r && b > g * 0.8 {
                            c[2] *= sky;
                        }
                        if g > r && g > b {
                            c[1] *= foliage;
                        }
                    }
                }
                c
            }
            Recipe::Mono {
                weights,
                contrast,
                gamma,
            } => {
                let gray = rgb[0] * weights[0] + rgb[1] * weights[1] + rgb[2] * weights[2];
                let c = apply_contrast([gray; 3], contrast);
                if (gamma - 1.0).abs() < 1e-7 {
                    c
                } else {
                    c.map(|v| v.max(0.0).powf(gamma))
                }
            }
            Recipe::Generic {
                shadow_shift,
                highlight_shift,
                contrast,
                saturation,
            } => {
                let mut c = [0.0; 3];
                for i in 0..3 {
                    c[i] = rgb[i] + (1.0 - lum) * shadow_shift[i] + lum * highlight_shift[i];
                }
                scale_saturation(apply_contrast(c, contrast), saturation)
            }
        }
    }
}

/// Multiply HSL saturation, keeping it in [0, 1].
fn scale_saturation(rgb: [f32; 3], k: f32) -> [f32; 3] {
    if (k - 1.0).abs() < 1e-7 {
        return rgb;
    }
    let [h, s, l] = rgb_to_hsl(rgb);
    hsl_to_rgb([h, (s * k).clamp(0.0, 1.0), l])
}

/// Stage 13: optional crosstalk matrix, then the stock recipe, blended
/// with the incoming colour by `strength`.
///
/// ```text
/// m    = matrix × in          (or in, without a matrix)
/// film = recipe(m)
/// out  = mix(in, film, strength)
/// ```
pub fn apply_film(
    rgb: [f32; 3],
    profile: &FilmProfile,
    matrix: Option<Mat3>,
    strength: f32,
) -> [f32; 3] {
    if strength <= 0.0 {
        return rgb;
    }
    let crossed = match matrix {
        Some(m) => (m * Vec3::from_array(rgb)).to_array(),
        None => rgb,
    };
    let film = Recipe::for_profile(profile).apply(crossed);
    mix3(rgb, film, strength.min(1.0))
}

/// Stage 14: toe lift and exponential shoulder.
///
/// ```text
/// toe:      x += toe × 0.3 × (1 − x)²
/// shoulder: x  = mix(x, 1 − e^(−x(1 + shoulder × 0.5)), smoothstep(0.5, 1, x))
/// ```
pub fn apply_tone_map(rgb: [f32; 3], toe: f32, shoulder: f32) -> [f32; 3] {
    if toe <= 0.0 && shoulder <= 0.0 {
        return rgb;
    }
    let mut out = rgb;
    if toe > 0.0 {
        let k = toe * 0.3;
        out = out.map(|x| x + k * (1.0 - x) * (1.0 - x));
    }
    if shoulder > 0.0 {
        let k = 1.0 + shoulder * 0.5;
        out = out.map(|x| {
            let compressed = 1.0 - (-x * k).exp();
            x + (compressed - x) * smoothstep(0.5, 1.0, x)
        });
    }
    clamp01(out)
}

/// Stage 15: push shadows one way and highlights the other.
///
/// ```text
/// out = in + shift × (1 − smoothstep(0, 0.5, lum)) × 0.1 × k
///          − shift × smoothstep(0.5, 1, lum) × 0.05 × k
/// ```
pub fn apply_crossover(rgb: [f32; 3], shift: [f32; 3], strength: f32) -> [f32; 3] {
    let magnitude = (shift[0] * shift[0] + shift[1] * shift[1] + shift[2] * shift[2]).sqrt();
    if magnitude < 0.001 || strength <= 0.0 {
        return rgb;
    }
    let lum = luminance(rgb);
    let shadow = (1.0 - smoothstep(0.0, 0.5, lum)) * 0.1;
    let highlight = smoothstep(0.5, 1.0, lum) * 0.05;
    let mut out = rgb;
    for c in 0..3 {
        out[c] += (shift[c] * shadow - shift[c] * highlight) * strength;
    }
    clamp01(out)
}
