//! Slider-based grading adjustments: exposure, contrast, tonal range,
//! saturation, vibrance, and the HSL spectral controls.
//!
//! Every function takes normalized slider values (slider / 100, exposure
//! in stops) and returns the input untouched when its control is neutral.

use crate::color_management::color_space::{
    clamp01, hsl_to_rgb, luminance, mix3, rgb_to_hsl, smoothstep,
};

/// Contrast pivot: the 8-bit mid-gray code value.
pub const MID_GRAY: f32 = 128.0 / 255.0;

/// Scale linear values by a power of two.
///
/// ```text
/// out = in × 2^stops
/// ```
pub fn apply_exposure(rgb: [f32; 3], stops: f32) -> [f32; 3] {
    if stops.abs() < 1e-7 {
        return rgb;
    }
    let k = stops.exp2();
    [rgb[0] * k, rgb[1] * k, rgb[2] * k]
}

/// S-curve contrast around mid-gray.
///
/// ```text
/// factor = (1 + k) / (1 − 0.9k)
/// out    = clamp(pivot + (in − pivot) × factor, 0, 1)
/// ```
///
/// `k` ranges over [-1, 1]; `k = 0` is a no-op.
pub fn apply_contrast(rgb: [f32; 3], k: f32) -> [f32; 3] {
    if k.abs() < 1e-7 {
        return rgb;
    }
    let factor = (1.0 + k) / (1.0 - 0.9 * k);
    let f = |v: f32| (MID_GRAY + (v - MID_GRAY) * factor).clamp(0.0, 1.0);
    [f(rgb[0]), f(rgb[1]), f(rgb[2])]
}

/// Highlights, shadows, whites, and blacks as luminance-masked offsets.
///
/// ```text
/// shadow_w    = 1 − smoothstep(0, 0.5, lum)
/// highlight_w = smoothstep(0.5, 1, lum)
/// black_w     = 1 − smoothstep(0, 0.25, lum)
/// white_w     = smoothstep(0.75, 1, lum)
///
/// out = in + shadows × shadow_w × 0.5 × (1 − in)
///          + highlights × highlight_w × 0.5 × in
///          + blacks × black_w × 0.3
///          − whites × white_w × 0.3 × (1 − in)
/// ```
pub fn apply_tonal_range(
    rgb: [f32; 3],
    highlights: f32,
    shadows: f32,
    whites: f32,
    blacks: f32,
) -> [f32; 3] {
    if highlights.abs() < 1e-7 && shadows.abs() < 1e-7 && whites.abs() < 1e-7 && blacks.abs() < 1e-7 {
        return rgb;
    }

    let lum = luminance(rgb);
    let shadow_w = 1.0 - smoothstep(0.0, 0.5, lum);
    let highlight_w = smoothstep(0.5, 1.0, lum);
    let black_w = 1.0 - smoothstep(0.0, 0.25, lum);
    let white_w = smoothstep(0.75, 1.0, lum);

    let mut out = rgb;
    for (o, &c) in out.iter_mut().zip(&rgb) {
        *o += shadows * shadow_w * 0.5 * (1.0 - c);
        *o += highlights * highlight_w * 0.5 * c;
        *o += blacks * black_w * 0.3;
        *o -= whites * white_w * 0.3 * (1.0 - c);
    }
    clamp01(out)
}

/// Blend between Rec. 709 gray and the input.
///
/// ```text
/// out = mix(gray, in, 1 + saturation)
/// ```
pub fn apply_saturation(rgb: [f32; 3], saturation: f32) -> [f32; 3] {
    if saturation.abs() < 1e-7 {
        return rgb;
    }
    let gray = luminance(rgb);
    mix3([gray; 3], rgb, 1.0 + saturation)
}

/// Saturation that favours muted colours and protects skin tones.
///
/// ```text
/// sat    = (max − min) / (max + 0.001)
/// amount = vibrance × (1 − sat)
/// skin   = 1 − 0.5 × (r − b) / (r + 0.001)   when r > g > b and 0.4 < r < 0.95
/// out    = mix(gray, in, 1 + amount × skin × 0.5)
/// ```
pub fn apply_vibrance(rgb: [f32; 3], vibrance: f32) -> [f32; 3] {
    if vibrance.abs() < 1e-7 {
        return rgb;
    }
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let sat = (max - min) / (max + 0.001);
    let amount = vibrance * (1.0 - sat);

    let skin = if r > g && g > b && r > 0.4 && r < 0.95 {
        let likelihood = (r - b) / (r + 0.001);
        1.0 - likelihood * 0.5
    } else {
        1.0
    };

    let gray = luminance(rgb);
    mix3([gray; 3], rgb, 1.0 + amount * skin * 0.5)
}

/// Spectral volume, luminance, and hue, applied in HSL.
///
/// - volume: `s += volume × (1 − 0.5s) × 0.5`, so muted colours gain more.
/// - luminance: `l += luminance × 0.3 × (0.5s + 0.5)`, stronger on saturated colours.
/// - hue: `h = (h + hue × 0.5) mod 1`, up to half a turn either way.
pub fn apply_spectral(rgb: [f32; 3], volume: f32, lum_shift: f32, hue_shift: f32) -> [f32; 3] {
    if volume.abs() < 1e-7 && lum_shift.abs() < 1e-7 && hue_shift.abs() < 1e-7 {
        return rgb;
    }

    let [mut h, mut s, mut l] = rgb_to_hsl(rgb);
    if volume != 0.0 {
        let boost = volume * (1.0 - s * 0.5);
        s = (s + boost * 0.5).clamp(0.0, 1.0);
    }
    if lum_shift != 0.0 {
        let adjust = lum_shift * 0.3 * (s * 0.5 + 0.5);
        l = (l + adjust).clamp(0.0, 1.0);
    }
    if hue_shift != 0.0 {
        h = (h + hue_shift * 0.5).rem_euclid(1.0);
    }
    hsl_to_rgb([h, s, l])
}
