//! Lift/Gamma/Gain color wheel adjustments.
//!
//! Each wheel is an RGB offset in [-1, 1] whose influence is confined to
//! a tonal band by a luminance weight computed once from the input.
//!
//! # Formula
//! For each channel `c` in `{R, G, B}`, with `lum` the Rec. 709 luminance
//! of the input:
//! ```text
//!   lift_w  = (1 − lum)²
//!   mid_w   = 1 − (2|lum − 0.5|)²
//!   gain_w  = lum²
//!
//!   x   = in + lift[c] × lift_w × 0.5
//!   x   = mix(x, max(x, 0.001)^(1 / (1 + gamma[c] × 0.5)), mid_w)
//!   out = clamp(x × (1 + gain[c] × gain_w × 0.5), 0, 1)
//! ```
//!
//! ```text
//!   Input ──→ +Lift (shadows) ──→ ^Gamma (midtones) ──→ ×Gain (highlights) ──→ clamp ──→ Output
//! ```

use crate::color_management::color_space::luminance;

/// Apply lift, gamma, and gain.
///
/// All three at `[0, 0, 0]` produce no change.
pub fn apply_wheels(rgb: [f32; 3], lift: [f32; 3], gamma: [f32; 3], gain: [f32; 3]) -> [f32; 3] {
    let neutral = |w: &[f32; 3]| w.iter().all(|v| v.abs() < 1e-7);
    if neutral(&lift) && neutral(&gamma) && neutral(&gain) {
        return rgb;
    }

    let lum = luminance(rgb);
    let lift_w = (1.0 - lum).powi(2);
    let mid_w = 1.0 - ((lum - 0.5).abs() * 2.0).powi(2);
    let gain_w = lum * lum;

    let mut out = [0.0_f32; 3];
    for c in 0..3 {
        let mut x = rgb[c] + lift[c] * lift_w * 0.5;

        // Floor at 0.001 so the power base stays positive.
        let exponent = 1.0 / (1.0 + gamma[c] * 0.5);
        let powered = x.max(0.001).powf(exponent);
        x += (powered - x) * mid_w;

        x *= 1.0 + gain[c] * gain_w * 0.5;
        out[c] = x.clamp(0.0, 1.0);
    }
    out
}
