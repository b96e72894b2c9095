//! Reinhard colour transfer in CIE L*a*b*.
//!
//! ```text
//! out_c = (target_std_c / source_std_c) × (in_c − source_mean_c) + target_mean_c
//! ```
//! applied independently to L, a, and b, converted back to RGB, then
//! blended with the original pixel by `strength`. Each pixel depends only
//! on the global statistics, so the transform runs in any pixel order.

use rayon::prelude::*;

use crate::analysis::stats::{ImageStats, LabStats};
use crate::color_management::color_space::{lab_to_rgb, rgb_to_lab};
use crate::image::PixelBuffer;
use crate::transform::params::{AdaptiveParams, LabTriple};

/// Floor for the source standard deviation.
pub const STD_EPSILON: f32 = 0.001;

/// Precomputed transfer from one Lab distribution to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReinhardTransfer {
    source_mean: [f32; 3],
    target_mean: [f32; 3],
    /// `target_std / max(source_std, ε)` per channel.
    scale: [f32; 3],
    /// 0 (no change) to 1 (full transfer).
    strength: f32,
}

impl ReinhardTransfer {
    pub fn new(source_mean: LabTriple, source_std: LabTriple, target_mean: LabTriple, target_std: LabTriple, strength: f32) -> Self {
        let src_std = source_std.to_array();
        if src_std.iter().any(|&s| s < STD_EPSILON) {
            tracing::warn!(?src_std, "source Lab deviation below {STD_EPSILON}, flooring");
        }
        let tgt_std = target_std.to_array();
        let mut scale = [0.0; 3];
        for c in 0..3 {
            scale[c] = tgt_std[c] / src_std[c].max(STD_EPSILON);
        }
        Self {
            source_mean: source_mean.to_array(),
            target_mean: target_mean.to_array(),
            scale,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    pub fn from_stats(source: &LabStats, target: &LabStats, strength: f32) -> Self {
        Self::new(source.mean(), source.std(), target.mean(), target.std(), strength)
    }

    /// The pipeline's stage-0 transfer, when adaptive matching is enabled
    /// and all four Lab vectors are present.
    pub fn from_adaptive(adaptive: &AdaptiveParams) -> Option<Self> {
        if !adaptive.enabled {
            return None;
        }
        let strength = if adaptive.strength.is_finite() {
            adaptive.strength.clamp(0.0, 100.0) / 100.0
        } else {
            0.0
        };
        if strength <= 0.0 {
            return None;
        }
        match (
            adaptive.source_mean,
            adaptive.source_std,
            adaptive.target_mean,
            adaptive.target_std,
        ) {
            (Some(sm), Some(ss), Some(tm), Some(ts)) => Some(Self::new(sm, ss, tm, ts, strength)),
            _ => {
                tracing::warn!("adaptive colour enabled without complete Lab statistics, skipping");
                None
            }
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Transfer one normalized RGB pixel.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.strength <= 0.0 {
            return rgb;
        }
        let lab = rgb_to_lab(rgb.map(|v| v.clamp(0.0, 1.0) * 255.0));
        let mut moved = [0.0; 3];
        for c in 0..3 {
            moved[c] = self.scale[c] * (lab[c] - self.source_mean[c]) + self.target_mean[c];
        }
        let matched = lab_to_rgb(moved).map(|v| v / 255.0);
        let mut out = [0.0; 3];
        for c in 0..3 {
            let v = rgb[c] + (matched[c] - rgb[c]) * self.strength;
            out[c] = if v.is_finite() { v } else { rgb[c] };
        }
        out
    }
}

impl AdaptiveParams {
    /// Fill the adaptive record from analyzed source and target images.
    /// `strength` is on the 0–100 slider scale.
    pub fn from_stats(source: &ImageStats, target: &ImageStats, strength: f32) -> Self {
        Self {
            enabled: true,
            strength: strength.clamp(0.0, 100.0),
            source_mean: Some(source.lab.mean()),
            source_std: Some(source.lab.std()),
            target_mean: Some(target.lab.mean()),
            target_std: Some(target.lab.std()),
        }
    }
}

/// Match a whole buffer to `target_stats`. Alpha passes through.
pub fn reinhard(source: &PixelBuffer, source_stats: &ImageStats, target_stats: &ImageStats, strength: f32) -> PixelBuffer {
    let transfer = ReinhardTransfer::from_stats(&source_stats.lab, &target_stats.lab, strength);
    let mut out = source.clone();
    let ch = out.format().channels();
    out.data_mut().par_chunks_mut(ch).for_each(|px| {
        let rgb = [px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0];
        let matched = transfer.apply(rgb);
        for c in 0..3 {
            px[c] = crate::image::quantize(matched[c]);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    fn lab(l: f32, a: f32, b: f32) -> LabTriple {
        LabTriple { l, a, b }
    }

    fn colourful() -> PixelBuffer {
        let mut data = Vec::new();
        for i in 0..64u32 {
            data.extend_from_slice(&[(i * 4) as u8, (255 - i * 3) as u8, ((i * 37) % 256) as u8]);
        }
        PixelBuffer::new(8, 8, PixelFormat::Rgb8, data).unwrap()
    }

    #[test]
    fn test_self_match_is_identity_within_rounding() {
        let buf = colourful();
        let stats = ImageStats::analyze(&buf);
        let out = reinhard(&buf, &stats, &stats, 1.0);
        for (i, (a, b)) in buf.data().iter().zip(out.data()).enumerate() {
            assert!((*a as i32 - *b as i32).abs() <= 1, "byte {i}: {a} vs {b}");
        }
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let buf = colourful();
        let stats = ImageStats::analyze(&buf);
        let warm = ImageStats {
            lab: LabStats {
                mean_l: 70.0,
                mean_a: 10.0,
                mean_b: 30.0,
                ..stats.lab
            },
            ..stats.clone()
        };
        assert_eq!(reinhard(&buf, &stats, &warm, 0.0), buf);
    }

    #[test]
    fn test_shifts_mean_toward_target() {
        let buf = colourful();
        let stats = ImageStats::analyze(&buf);
        let mut target = stats.clone();
        target.lab.mean_b += 20.0;
        let out = reinhard(&buf, &stats, &target, 1.0);
        let after = ImageStats::analyze(&out);
        assert!(after.lab.mean_b > stats.lab.mean_b + 10.0, "{} -> {}", stats.lab.mean_b, after.lab.mean_b);
    }

    #[test]
    fn test_zero_variance_source_stays_finite() {
        let t = ReinhardTransfer::new(lab(50.0, 0.0, 0.0), lab(0.0, 0.0, 0.0), lab(60.0, 5.0, 5.0), lab(10.0, 10.0, 10.0), 1.0);
        let out = t.apply([0.3, 0.6, 0.9]);
        assert!(out.iter().all(|v| v.is_finite()), "{out:?}");
    }

    #[test]
    fn test_from_adaptive_requires_all_vectors() {
        let mut adaptive = AdaptiveParams {
            enabled: true,
            source_mean: Some(lab(50.0, 0.0, 0.0)),
            source_std: Some(lab(20.0, 5.0, 5.0)),
            target_mean: Some(lab(60.0, 5.0, 10.0)),
            ..AdaptiveParams::default()
        };
        assert!(ReinhardTransfer::from_adaptive(&adaptive).is_none());
        adaptive.target_std = Some(lab(20.0, 5.0, 5.0));
        let t = ReinhardTransfer::from_adaptive(&adaptive).unwrap();
        assert_eq!(t.strength(), 1.0);
        adaptive.enabled = false;
        assert!(ReinhardTransfer::from_adaptive(&adaptive).is_none());
    }

    #[test]
    fn test_adaptive_from_stats() {
        let buf = colourful();
        let stats = ImageStats::analyze(&buf);
        let adaptive = AdaptiveParams::from_stats(&stats, &stats, 150.0);
        assert!(adaptive.enabled);
        assert_eq!(adaptive.strength, 100.0);
        assert_eq!(adaptive.target_mean, Some(stats.lab.mean()));
    }
}
