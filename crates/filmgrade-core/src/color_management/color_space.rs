//! Pure colour-space conversions: sRGB transfer, HSL, CIE Lab, luminance.
//!
//! Conventions used across the crate:
//! - Pipeline colours are `[f32; 3]` RGB in [0, 1].
//! - HSL hue is normalized to [0, 1), not degrees.
//! - Lab conversions take and return RGB on the 0–255 scale, matching how
//!   image statistics are gathered from 8-bit buffers.
//!
//! # Lab chain (D65)
//! ```text
//! sRGB (0–255) → /255 → linearize → XYZ×100 → f(t) → L*a*b*
//! f(t) = t^(1/3)              if t > 0.008856
//!      = 7.787·t + 16/116     otherwise
//! ```

/// Rec.709 luma weights.
pub const REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// sRGB → XYZ (D65), 7 significant figures.
const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ (D65) → sRGB, inverse of [`RGB_TO_XYZ`].
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// D65 reference white, Y normalized to 100.
const WHITE_D65: [f64; 3] = [95.047, 100.0, 108.883];

const LAB_EPSILON: f64 = 0.008856;
const LAB_SLOPE: f64 = 7.787;
const LAB_OFFSET: f64 = 16.0 / 116.0;

/// Rec.709 luminance of a linear-or-encoded RGB triple.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    REC709[0] * rgb[0] + REC709[1] * rgb[1] + REC709[2] * rgb[2]
}

/// Decode one sRGB-encoded channel in [0, 1] to linear light.
#[inline]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear channel to sRGB. Exact inverse of [`srgb_to_linear`].
#[inline]
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb_to_linear_f64(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb_f64(v: f64) -> f64 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_SLOPE * t + LAB_OFFSET
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cube = f * f * f;
    if cube > LAB_EPSILON {
        cube
    } else {
        (f - LAB_OFFSET) / LAB_SLOPE
    }
}

fn mat_mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Convert sRGB (channels on the 0–255 scale) to CIE L*a*b* (D65).
pub fn rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let lin = [
        srgb_to_linear_f64(rgb[0] as f64 / 255.0) * 100.0,
        srgb_to_linear_f64(rgb[1] as f64 / 255.0) * 100.0,
        srgb_to_linear_f64(rgb[2] as f64 / 255.0) * 100.0,
    ];
    let xyz = mat_mul(&RGB_TO_XYZ, lin);

    let fx = lab_f(xyz[0] / WHITE_D65[0]);
    let fy = lab_f(xyz[1] / WHITE_D65[1]);
    let fz = lab_f(xyz[2] / WHITE_D65[2]);

    [
        (116.0 * fy - 16.0) as f32,
        (500.0 * (fx - fy)) as f32,
        (200.0 * (fy - fz)) as f32,
    ]
}

/// Convert CIE L*a*b* (D65) back to sRGB on the 0–255 scale.
///
/// Output is clamped to [0, 255] but not rounded; see [`lab_to_rgb8`].
pub fn lab_to_rgb(lab: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] as f64 + 16.0) / 116.0;
    let fx = lab[1] as f64 / 500.0 + fy;
    let fz = fy - lab[2] as f64 / 200.0;

    let xyz = [
        lab_f_inv(fx) * WHITE_D65[0] / 100.0,
        lab_f_inv(fy) * WHITE_D65[1] / 100.0,
        lab_f_inv(fz) * WHITE_D65[2] / 100.0,
    ];
    let lin = mat_mul(&XYZ_TO_RGB, xyz);

    let encode = |v: f64| (linear_to_srgb_f64(v.max(0.0)) * 255.0).clamp(0.0, 255.0) as f32;
    [encode(lin[0]), encode(lin[1]), encode(lin[2])]
}

/// [`lab_to_rgb`] rounded to bytes.
pub fn lab_to_rgb8(lab: [f32; 3]) -> [u8; 3] {
    let rgb = lab_to_rgb(lab);
    [rgb[0].round() as u8, rgb[1].round() as u8, rgb[2].round() as u8]
}

/// Convert RGB to HSL. Hue in [0, 1).
pub fn rgb_to_hsl(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) * 0.5;

    if max == min {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    [h / 6.0, s, l]
}

/// Convert HSL (hue in [0, 1)) to RGB.
pub fn hsl_to_rgb(hsl: [f32; 3]) -> [f32; 3] {
    let [h, s, l] = hsl;
    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Hermite smoothstep, matching the shading-language builtin.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation between two colours.
#[inline]
pub fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Clamp every channel to [0, 1].
#[inline]
pub fn clamp01(rgb: [f32; 3]) -> [f32; 3] {
    [rgb[0].clamp(0.0, 1.0), rgb[1].clamp(0.0, 1.0), rgb[2].clamp(0.0, 1.0)]
}
