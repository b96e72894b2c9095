//! Optical and print effects applied after film emulation: fade, bloom,
//! diffusion, halation, vignette, and acutance.
//!
//! All but acutance are pure per-pixel functions. Position-dependent
//! effects take `uv`, the pixel centre in normalized image coordinates
//! (`(x + 0.5) / width`, `(y + 0.5) / height`).

use crate::color_management::color_space::{clamp01, luminance, mix3, smoothstep};
use crate::image::GradingImage;

/// Lift the floor, lower the ceiling, and pull toward mid-gray.
///
/// ```text
/// out = mix(clamp(in, fade × 0.15, 1 − fade × 0.1), 0.5, fade × 0.1)
/// ```
pub fn apply_fade(rgb: [f32; 3], fade: f32) -> [f32; 3] {
    if fade <= 0.0 {
        return rgb;
    }
    let floor = fade * 0.15;
    let ceiling = 1.0 - fade * 0.1;
    let limited = rgb.map(|v| v.max(floor).min(ceiling));
    mix3(limited, [0.5; 3], fade * 0.1)
}

/// Additive glow on highlights with a slight warm fringe.
pub fn apply_bloom(rgb: [f32; 3], bloom: f32) -> [f32; 3] {
    if bloom <= 0.0 {
        return rgb;
    }
    let k = smoothstep(0.6, 1.0, luminance(rgb)) * bloom * 0.3;
    clamp01([
        rgb[0] + rgb[0] * k * 1.1,
        rgb[1] + rgb[1] * k,
        rgb[2] + rgb[2] * k * 0.95,
    ])
}

/// Soften toward flat luminance, overshooting in highlights.
///
/// ```text
/// diffused = mix(in, lum, d × 0.3)
/// out      = mix(in, diffused, 1 + smoothstep(0.5, 1, lum) × d × 0.5)
/// ```
pub fn apply_diffusion(rgb: [f32; 3], diffusion: f32) -> [f32; 3] {
    if diffusion <= 0.0 {
        return rgb;
    }
    let lum = luminance(rgb);
    let diffused = mix3(rgb, [lum; 3], diffusion * 0.3);
    let weight = 1.0 + smoothstep(0.5, 1.0, lum) * diffusion * 0.5;
    clamp01(mix3(rgb, diffused, weight))
}

/// Halation settings, all normalized to [0, 1] except the tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halation {
    pub amount: f32,
    pub tint: [f32; 3],
    pub threshold: f32,
    pub radius: f32,
}

impl Halation {
    /// Coloured glow around bright areas, stronger toward the frame edge.
    ///
    /// ```text
    /// low    = mix(0.3, 0.8, threshold)
    /// mask   = smoothstep(low, low + mix(0.1, 0.3, radius), lum)
    /// radial = 1 + |uv − 0.5| × 0.5
    /// out    = in + in × tint × mask × amount × 0.3 × radial
    ///             + tint × 0.1 × mask × amount
    /// ```
    ///
    /// The radius widens the knee above the threshold so more of the
    /// surrounding tonal range picks up the glow.
    pub fn apply(&self, rgb: [f32; 3], uv: [f32; 2]) -> [f32; 3] {
        if self.amount <= 0.0 {
            return rgb;
        }
        let low = 0.3 + 0.5 * self.threshold;
        let knee = 0.1 + 0.2 * self.radius;
        let mask = smoothstep(low, low + knee, luminance(rgb));
        if mask <= 0.0 {
            return rgb;
        }
        let radial = 1.0 + distance_from_center(uv) * 0.5;
        let glow = mask * self.amount * 0.3 * radial;
        let secondary = mask * self.amount * 0.1;
        let mut out = rgb;
        for c in 0..3 {
            out[c] += rgb[c] * self.tint[c] * glow + self.tint[c] * secondary;
        }
        clamp01(out)
    }
}

/// Radial darkening with a slight warm cast in the falloff zone.
///
/// ```text
/// mask = smoothstep(mix(0.2, 0.6, radius), mix(0.7, 1.0, radius), |uv − 0.5|)
/// out  = in × (1 − mask × s × 0.7),  r += mask × s × 0.02,  b −= mask × s × 0.02
/// ```
pub fn apply_vignette(rgb: [f32; 3], strength: f32, radius: f32, uv: [f32; 2]) -> [f32; 3] {
    if strength <= 0.0 {
        return rgb;
    }
    let inner = 0.2 + 0.4 * radius;
    let outer = 0.7 + 0.3 * radius;
    let mask = smoothstep(inner, outer, distance_from_center(uv));
    if mask <= 0.0 {
        return rgb;
    }
    let k = mask * strength;
    let mut out = rgb.map(|v| v * (1.0 - k * 0.7));
    out[0] += k * 0.02;
    out[2] -= k * 0.02;
    clamp01(out)
}

/// Four-neighbour unsharp mask over the source image.
///
/// The detail term is taken from the untouched source so earlier stages
/// cannot feed back into it:
/// ```text
/// detail = src(x, y) − avg(src(x±1, y), src(x, y±1))
/// out    = in + detail × strength × 4
/// ```
pub fn apply_acutance(rgb: [f32; 3], source: &GradingImage, x: u32, y: u32, strength: f32) -> [f32; 3] {
    if strength <= 0.0 {
        return rgb;
    }
    let (x, y) = (x as i64, y as i64);
    let center = source.sample_clamped(x, y);
    let n = source.sample_clamped(x, y - 1);
    let s = source.sample_clamped(x, y + 1);
    let e = source.sample_clamped(x + 1, y);
    let w = source.sample_clamped(x - 1, y);

    let mut out = rgb;
    for c in 0..3 {
        let neighbors = (n[c] + s[c] + e[c] + w[c]) * 0.25;
        out[c] += (center[c] - neighbors) * strength * 4.0;
    }
    clamp01(out)
}

fn distance_from_center(uv: [f32; 2]) -> f32 {
    let dx = uv[0] - 0.5;
    let dy = uv[1] - 0.5;
    (dx * dx + dy * dy).sqrt()
}
