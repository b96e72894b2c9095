//! Automatic correction and reference matching.
//!
//! Derives slider values from [`ImageStats`]: auto exposure, contrast and
//! gray-world white balance for a single image, or the adjustments that
//! bring a source image toward a reference. Results are
//! [`ParamAdjustments`], which only touch the sliders they set.

use serde::{Deserialize, Serialize};

use crate::analysis::stats::ImageStats;
use crate::transform::params::GradingParams;

/// Target average luminance (0–255) for auto exposure.
const TARGET_LUMINANCE: f32 = 115.0;
/// Ideal p1–p99 luminance range.
const TARGET_RANGE: f32 = 235.0;

/// Slider values computed by auto grading. `None` leaves the slider alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamAdjustments {
    pub exposure: Option<f32>,
    pub contrast: Option<f32>,
    pub temperature: Option<f32>,
    pub tint: Option<f32>,
}

impl ParamAdjustments {
    pub fn apply_to(&self, params: &mut GradingParams) {
        if let Some(v) = self.exposure {
            params.exposure = v;
        }
        if let Some(v) = self.contrast {
            params.contrast = v;
        }
        if let Some(v) = self.temperature {
            params.temperature = v;
        }
        if let Some(v) = self.tint {
            params.tint = v;
        }
    }
}

/// Which parts of the look to match, and how strongly (0–1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    pub exposure: bool,
    pub contrast: bool,
    pub white_balance: bool,
    pub strength: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exposure: true,
            contrast: true,
            white_balance: true,
            strength: 1.0,
        }
    }
}

/// Correct a single image toward a neutral, well-exposed baseline.
///
/// Gray world: if the scene average is neutral then `r = g = b`. A warm
/// average (`r > b`) gets a cooling temperature, a green average a
/// magenta tint.
pub fn auto_params(stats: &ImageStats) -> ParamAdjustments {
    let exposure = ((TARGET_LUMINANCE - stats.exposure) * 0.8).clamp(-80.0, 80.0);

    let black = stats.luminance_percentile(0.01);
    let white = stats.luminance_percentile(0.99);
    let range = white - black;
    let contrast = if range < 150.0 {
        (1.0 - range / TARGET_RANGE) * 50.0
    } else if range < 200.0 {
        10.0
    } else {
        0.0
    };

    let avg = stats.average;
    let temperature = (-(avg.r - avg.b) * 1.5).clamp(-60.0, 60.0);
    let tint = (-(avg.g - (avg.r + avg.b) / 2.0) * 2.0).clamp(-60.0, 60.0);

    let adjustments = ParamAdjustments {
        exposure: Some(exposure),
        contrast: Some(contrast.min(60.0)),
        temperature: Some(temperature),
        tint: Some(tint),
    };
    tracing::debug!(?adjustments, range, "auto params");
    adjustments
}

/// Adjustments that move `source` toward `reference`.
pub fn reference_params(source: &ImageStats, reference: &ImageStats, options: MatchOptions) -> ParamAdjustments {
    let strength = options.strength.clamp(0.0, 1.0);
    let mut out = ParamAdjustments::default();

    if options.exposure {
        let v = (reference.exposure - source.exposure) * 0.8 * strength;
        out.exposure = Some(v.clamp(-80.0, 80.0));
    }

    if options.contrast {
        let target = reference.percentiles.p95 - reference.percentiles.p5;
        let current = source.percentiles.p95 - source.percentiles.p5;
        if current > 0.0 && target > 0.0 {
            let v = (target / current - 1.0) * 50.0 * strength;
            out.contrast = Some(v.clamp(-60.0, 60.0));
        }
    }

    if options.white_balance {
        // b* is the blue–yellow axis, a* green–magenta.
        let a_diff = reference.lab.mean_a - source.lab.mean_a;
        let b_diff = reference.lab.mean_b - source.lab.mean_b;
        out.temperature = Some((b_diff * 2.0 * strength).clamp(-60.0, 60.0));
        out.tint = Some((a_diff * 2.0 * strength).clamp(-60.0, 60.0));
    }

    out
}

/// Global corrections that map one image's distribution onto another's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationParams {
    /// Stops.
    pub exposure_adjust: f32,
    /// Contrast multiplier.
    pub contrast_adjust: f32,
    /// Target black level, 0–255.
    pub black_point: f32,
    /// Target white level, 0–255.
    pub white_point: f32,
    /// Lab (a, b) shift.
    pub white_balance_shift: [f32; 2],
}

pub fn normalization(source: &ImageStats, target: &ImageStats) -> NormalizationParams {
    let source_l = source.lab.mean_l.max(0.001);
    let target_l = target.lab.mean_l.max(0.001);
    NormalizationParams {
        exposure_adjust: (target_l / source_l).log2(),
        contrast_adjust: target.contrast / source.contrast.max(0.001),
        black_point: target.percentiles.p5,
        white_point: target.percentiles.p95,
        white_balance_shift: [
            target.lab.mean_a - source.lab.mean_a,
            target.lab.mean_b - source.lab.mean_b,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::{LabStats, Percentiles, Rgb};
    use crate::image::{PixelBuffer, PixelFormat};

    const EPSILON: f32 = 1e-4;

    fn stats_for(rgb: [u8; 3]) -> ImageStats {
        ImageStats::analyze(&PixelBuffer::filled(4, 4, PixelFormat::Rgb8, rgb))
    }

    #[test]
    fn test_neutral_gray_needs_no_white_balance() {
        let adj = auto_params(&stats_for([115, 115, 115]));
        assert!(adj.temperature.unwrap().abs() < EPSILON);
        assert!(adj.tint.unwrap().abs() < EPSILON);
        assert!(adj.exposure.unwrap().abs() < 0.01, "exposure: {:?}", adj.exposure);
    }

    #[test]
    fn test_warm_cast_gets_cooled() {
        let adj = auto_params(&stats_for([180, 120, 80]));
        assert!(adj.temperature.unwrap() < 0.0);
        assert_eq!(adj.temperature.unwrap(), -60.0);
    }

    #[test]
    fn test_dark_image_is_brightened_and_clamped() {
        let adj = auto_params(&stats_for([5, 5, 5]));
        assert_eq!(adj.exposure, Some(80.0));
    }

    #[test]
    fn test_flat_image_gets_contrast() {
        let adj = auto_params(&stats_for([100, 100, 100]));
        // Zero range: (1 − 0) × 50.
        assert_eq!(adj.contrast, Some(50.0));
    }

    #[test]
    fn test_reference_params_respects_options() {
        let src = ImageStats {
            exposure: 100.0,
            percentiles: Percentiles {
                p5: 20.0,
                p50: 100.0,
                p95: 180.0,
            },
            ..ImageStats::default()
        };
        let reference = ImageStats {
            exposure: 130.0,
            percentiles: Percentiles {
                p5: 10.0,
                p50: 120.0,
                p95: 250.0,
            },
            lab: LabStats {
                mean_a: 5.0,
                mean_b: 10.0,
                ..LabStats::default()
            },
            ..ImageStats::default()
        };
        let all = reference_params(&src, &reference, MatchOptions::default());
        assert!((all.exposure.unwrap() - 24.0).abs() < EPSILON);
        assert!((all.contrast.unwrap() - 25.0).abs() < EPSILON);
        assert!((all.temperature.unwrap() - 20.0).abs() < EPSILON);
        assert!((all.tint.unwrap() - 10.0).abs() < EPSILON);

        let half = reference_params(
            &src,
            &reference,
            MatchOptions {
                contrast: false,
                strength: 0.5,
                ..MatchOptions::default()
            },
        );
        assert!(half.contrast.is_none());
        assert!((half.exposure.unwrap() - 12.0).abs() < EPSILON);
    }

    #[test]
    fn test_apply_to_only_touches_set_fields() {
        let mut params = GradingParams {
            saturation: 30.0,
            tint: 7.0,
            ..GradingParams::default()
        };
        ParamAdjustments {
            exposure: Some(12.0),
            ..ParamAdjustments::default()
        }
        .apply_to(&mut params);
        assert_eq!(params.exposure, 12.0);
        assert_eq!(params.tint, 7.0);
        assert_eq!(params.saturation, 30.0);
    }

    #[test]
    fn test_normalization() {
        let src = ImageStats {
            lab: LabStats {
                mean_l: 50.0,
                ..LabStats::default()
            },
            contrast: 10.0,
            average: Rgb::default(),
            ..ImageStats::default()
        };
        let tgt = ImageStats {
            lab: LabStats {
                mean_l: 25.0,
                mean_a: 3.0,
                ..LabStats::default()
            },
            contrast: 20.0,
            percentiles: Percentiles {
                p5: 12.0,
                p50: 0.0,
                p95: 230.0,
            },
            ..ImageStats::default()
        };
        let n = normalization(&src, &tgt);
        assert!((n.exposure_adjust + 1.0).abs() < EPSILON);
        assert!((n.contrast_adjust - 2.0).abs() < EPSILON);
        assert_eq!(n.black_point, 12.0);
        assert_eq!(n.white_point, 230.0);
        assert_eq!(n.white_balance_shift, [3.0, 0.0]);
    }
}
