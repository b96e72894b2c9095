//! Cinematography filter emulation (pro-mist, black mist, heavy diffusion,
//! Hollywood black magic, glimmerglass, white diffusion, Orton, streak).
//!
//! Each filter gathers light from the untouched source around the pixel:
//! a gaussian-weighted blur of all taps softens detail, and a second sum
//! of only the bright taps adds glow. The kernel is 5×5 with jittered tap
//! positions, or a line of 9 taps along the streak angle.
//!
//! ```text
//! spacing = 1 + radius × 6  (pixels)
//! gate_n  = smoothstep(t, t + 0.25, lum(src_n))
//! blur    = Σ w_n src_n / Σ w_n
//! glow    = Σ w_n gate_n src_n / Σ w_n
//! soft    = in + (blur − src) × (1 − sharpness) × blur_weight × s
//! out     = soft + glow × tint × glow_weight × s  (+ per-type extras)
//! ```

use crate::color_management::color_space::{clamp01, luminance, smoothstep};
use crate::grading::grain::lattice_hash;
use crate::image::GradingImage;
use crate::transform::params::FilterType;

const JITTER_SEED: u32 = 0x5EED_F117;

/// How strongly a filter type blurs, glows, and what it adds on top.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FilterCharacter {
    blur_weight: f32,
    glow_weight: f32,
    tint: [f32; 3],
    /// Raise deep shadows, weighted by `(1 − lum)²`.
    black_lift: f32,
    /// Veil toward white, weighted by `(1 − out)`.
    veil: f32,
    /// Screen-blend the blurred image back in.
    screen: f32,
}

impl FilterCharacter {
    const fn new(blur_weight: f32, glow_weight: f32, tint: [f32; 3]) -> Self {
        Self {
            blur_weight,
            glow_weight,
            tint,
            black_lift: 0.0,
            veil: 0.0,
            screen: 0.0,
        }
    }

    fn of(filter: FilterType) -> Option<Self> {
        let c = match filter {
            FilterType::None => return None,
            FilterType::BlackProMist => Self::new(0.35, 0.6, [1.0, 0.97, 0.92]),
            FilterType::BlackMist => Self {
                black_lift: 0.04,
                ..Self::new(0.25, 0.45, [1.0, 1.0, 1.0])
            },
            FilterType::Hdf => Self::new(0.8, 0.4, [1.0, 1.0, 1.0]),
            FilterType::HollywoodBlackMagic => Self::new(0.3, 0.7, [1.0, 0.95, 0.88]),
            FilterType::Glimmerglass => Self::new(0.15, 0.8, [1.0, 1.0, 1.02]),
            FilterType::WhiteDiffusion => Self {
                veil: 0.06,
                ..Self::new(0.5, 0.5, [1.0, 1.0, 1.0])
            },
            FilterType::Orton => Self {
                screen: 0.5,
                ..Self::new(0.6, 0.3, [1.0, 1.0, 1.0])
            },
            FilterType::Streak => Self::new(0.0, 0.9, [0.85, 0.92, 1.0]),
        };
        Some(c)
    }
}

/// Filter settings, normalized to [0, 1] except the angle (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CineFilter {
    pub filter: FilterType,
    pub strength: f32,
    pub glow_radius: f32,
    pub glow_threshold: f32,
    pub sharpness: f32,
    pub streak_angle: f32,
}

/// Weighted sums gathered around one pixel.
#[derive(Default)]
struct Gather {
    blur: [f32; 3],
    glow: [f32; 3],
    weight: f32,
}

impl Gather {
    fn add(&mut self, rgb: [f32; 3], w: f32, threshold: f32) {
        let gate = smoothstep(threshold, threshold + 0.25, luminance(rgb));
        for c in 0..3 {
            self.blur[c] += rgb[c] * w;
            self.glow[c] += rgb[c] * w * gate;
        }
        self.weight += w;
    }

    fn finish(self) -> ([f32; 3], [f32; 3]) {
        let inv = if self.weight > 0.0 { 1.0 / self.weight } else { 0.0 };
        (self.blur.map(|v| v * inv), self.glow.map(|v| v * inv))
    }
}

impl CineFilter {
    pub fn is_active(&self) -> bool {
        self.filter != FilterType::None && self.strength > 0.0
    }

    fn spacing(&self) -> f32 {
        1.0 + self.glow_radius * 6.0
    }

    fn gather_area(&self, source: &GradingImage, x: u32, y: u32) -> Gather {
        let spacing = self.spacing();
        let sigma = 1.2_f32;
        let mut acc = Gather::default();
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let d2 = (dx * dx + dy * dy) as f32;
                let w = (-d2 / (2.0 * sigma * sigma)).exp();
                let (jx, jy) = if dx == 0 && dy == 0 {
                    (0.0, 0.0)
                } else {
                    let seed = JITTER_SEED ^ ((dy + 2) * 5 + dx + 2) as u32;
                    (
                        lattice_hash(x as i32, y as i32, seed) - 0.5,
                        lattice_hash(y as i32, x as i32, seed.rotate_left(7)) - 0.5,
                    )
                };
                let sx = x as f32 + (dx as f32 + jx) * spacing;
                let sy = y as f32 + (dy as f32 + jy) * spacing;
                let rgb = source.sample_clamped(sx.round() as i64, sy.round() as i64);
                acc.add(rgb, w, self.glow_threshold);
            }
        }
        acc
    }

    fn gather_line(&self, source: &GradingImage, x: u32, y: u32) -> Gather {
        let spacing = self.spacing();
        let (sin, cos) = self.streak_angle.sin_cos();
        let sigma = 2.0_f32;
        let mut acc = Gather::default();
        for i in -4i32..=4 {
            let t = i as f32;
            let w = (-(t * t) / (2.0 * sigma * sigma)).exp();
            let sx = x as f32 + cos * t * spacing;
            let sy = y as f32 + sin * t * spacing;
            let rgb = source.sample_clamped(sx.round() as i64, sy.round() as i64);
            acc.add(rgb, w, self.glow_threshold);
        }
        acc
    }

    /// Stage 24 for the pixel at `(x, y)`.
    pub fn apply(&self, rgb: [f32; 3], source: &GradingImage, x: u32, y: u32) -> [f32; 3] {
        if !self.is_active() {
            return rgb;
        }
        let Some(ch) = FilterCharacter::of(self.filter) else {
            return rgb;
        };

        let gather = match self.filter {
            FilterType::Streak => self.gather_line(source, x, y),
            _ => self.gather_area(source, x, y),
        };
        let (blur, glow) = gather.finish();
        let src = source.sample_clamped(x as i64, y as i64);
        let s = self.strength;
        let soften = (1.0 - self.sharpness) * ch.blur_weight * s;

        let mut out = rgb;
        for c in 0..3 {
            out[c] += (blur[c] - src[c]) * soften;
            out[c] += glow[c] * ch.tint[c] * ch.glow_weight * s;
        }

        if ch.black_lift > 0.0 {
            let lum = luminance(out).clamp(0.0, 1.0);
            let lift = ch.black_lift * s * (1.0 - lum) * (1.0 - lum);
            out = out.map(|v| v + lift);
        }
        if ch.veil > 0.0 {
            out = out.map(|v| v + (1.0 - v.min(1.0)) * ch.veil * s);
        }
        if ch.screen > 0.0 {
            let k = ch.screen * s;
            for c in 0..3 {
                let b = (blur[c] * k).clamp(0.0, 1.0);
                out[c] = 1.0 - (1.0 - out[c].clamp(0.0, 1.0)) * (1.0 - b);
            }
        }
        clamp01(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{PixelBuffer, PixelFormat};

    fn filter(kind: FilterType) -> CineFilter {
        CineFilter {
            filter: kind,
            strength: 1.0,
            glow_radius: 0.5,
            glow_threshold: 0.65,
            sharpness: 0.3,
            streak_angle: 0.0,
        }
    }

    fn image_with_bright_dot(size: u32, at: (u32, u32)) -> GradingImage {
        let mut data = vec![20u8; (size * size * 3) as usize];
        let i = ((at.1 * size + at.0) * 3) as usize;
        data[i..i + 3].copy_from_slice(&[255, 255, 255]);
        GradingImage::from_buffer(&PixelBuffer::new(size, size, PixelFormat::Rgb8, data).unwrap())
    }

    #[test]
    fn test_none_and_zero_strength_are_identity() {
        let img = image_with_bright_dot(9, (4, 4));
        let rgb = [0.3, 0.4, 0.5];
        assert_eq!(filter(FilterType::None).apply(rgb, &img, 2, 2), rgb);
        let off = CineFilter {
            strength: 0.0,
            ..filter(FilterType::BlackProMist)
        };
        assert_eq!(off.apply(rgb, &img, 2, 2), rgb);
    }

    #[test]
    fn test_dark_flat_area_gets_no_glow() {
        let buf = PixelBuffer::filled(9, 9, PixelFormat::Rgb8, [20, 20, 20]);
        let img = GradingImage::from_buffer(&buf);
        let rgb = img.sample_clamped(4, 4);
        let out = filter(FilterType::Glimmerglass).apply(rgb, &img, 4, 4);
        for c in 0..3 {
            assert!((out[c] - rgb[c]).abs() < 1e-5, "channel {c}: {} vs {}", out[c], rgb[c]);
        }
    }

    #[test]
    fn test_glow_gathers_from_bright_neighbour() {
        let img = image_with_bright_dot(15, (7, 7));
        let f = CineFilter {
            glow_radius: 0.0,
            ..filter(FilterType::HollywoodBlackMagic)
        };
        // One pixel from the dot: the unjittered neighbour tap lands within rounding.
        let rgb = img.sample_clamped(8, 7);
        let out = f.apply(rgb, &img, 8, 7);
        assert!(out[0] > rgb[0], "neighbour should pick up glow: {out:?}");
    }

    #[test]
    fn test_streak_follows_angle() {
        let img = image_with_bright_dot(21, (10, 10));
        let horizontal = filter(FilterType::Streak);
        let vertical = CineFilter {
            streak_angle: std::f32::consts::FRAC_PI_2,
            ..horizontal
        };
        let rgb = img.sample_clamped(14, 10);
        let along = horizontal.apply(rgb, &img, 14, 10);
        let across = vertical.apply(rgb, &img, 14, 10);
        assert!(along[2] > across[2], "horizontal streak should reach (14, 10)");
        assert_eq!(across, rgb);
    }

    #[test]
    fn test_black_mist_lifts_shadows() {
        let buf = PixelBuffer::filled(5, 5, PixelFormat::Rgb8, [0, 0, 0]);
        let img = GradingImage::from_buffer(&buf);
        let out = filter(FilterType::BlackMist).apply([0.0; 3], &img, 2, 2);
        assert!(out[0] > 0.03, "black should lift: {out:?}");
    }
}
