//! Camera log decode curves.
//!
//! Each curve converts a normalized code value in [0, 1] to scene-linear
//! light using the manufacturer's published constants. Output may exceed
//! 1.0; the pipeline decides whether to clamp (see `RenderOptions`).

use crate::transform::params::LogProfile;

/// A camera log encoding that can be decoded to linear light.
pub trait LogCurve: Send + Sync {
    /// Convert from log-encoded code value to linear light.
    fn to_linear(&self, encoded: f32) -> f32;
}

/// Resolve the decode curve for a profile. `None` for [`LogProfile::None`].
pub fn get_log_curve(profile: LogProfile) -> Option<&'static dyn LogCurve> {
    match profile {
        LogProfile::None => None,
        LogProfile::SLog3 => Some(&SLog3),
        LogProfile::VLog => Some(&VLog),
        LogProfile::CLog3 => Some(&CLog3),
        LogProfile::LogC3 => Some(&ArriLogC3),
        LogProfile::NLog => Some(&NLog),
        LogProfile::FLog => Some(&FLog),
        LogProfile::Braw => Some(&BmdFilmGen5),
    }
}

/// Decode all three channels. When `clamp` is set, output is limited to [0, 1].
pub fn apply_log_decode(rgb: [f32; 3], curve: &dyn LogCurve, clamp: bool) -> [f32; 3] {
    let out = [
        curve.to_linear(rgb[0]),
        curve.to_linear(rgb[1]),
        curve.to_linear(rgb[2]),
    ];
    if clamp {
        [out[0].clamp(0.0, 1.0), out[1].clamp(0.0, 1.0), out[2].clamp(0.0, 1.0)]
    } else {
        out
    }
}

// ---------------------------------------------------------------------------
// Sony S-Log3
// ---------------------------------------------------------------------------

/// Sony S-Log3.
///
/// ```text
/// x >= 0.171 → 10^((x − 0.410) / 0.255) × 0.18 − 0.01
/// x <  0.171 → (x − 0.092) / 5 × 0.18 − 0.01
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SLog3;

impl LogCurve for SLog3 {
    fn to_linear(&self, x: f32) -> f32 {
        if x >= 0.171 {
            10.0_f32.powf((x - 0.410) / 0.255) * 0.18 - 0.01
        } else {
            (x - 0.092) / 5.0 * 0.18 - 0.01
        }
    }
}

// ---------------------------------------------------------------------------
// Panasonic V-Log
// ---------------------------------------------------------------------------

/// Panasonic V-Log.
///
/// ```text
/// x < 0.181 → (x − 0.125) / 5.6
/// otherwise → 10^((x − d) / c) − b
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VLog;

impl VLog {
    const CUT_INV: f32 = 0.181;
    const B: f32 = 0.00873;
    const C: f32 = 0.241;
    const D: f32 = 0.598;
}

impl LogCurve for VLog {
    fn to_linear(&self, x: f32) -> f32 {
        if x < Self::CUT_INV {
            (x - 0.125) / 5.6
        } else {
            10.0_f32.powf((x - Self::D) / Self::C) - Self::B
        }
    }
}

// ---------------------------------------------------------------------------
// Canon C-Log3
// ---------------------------------------------------------------------------

/// Canon C-Log3. Three segments: log below black, linear toe, log above.
#[derive(Debug, Clone, Copy)]
pub struct CLog3;

impl LogCurve for CLog3 {
    fn to_linear(&self, x: f32) -> f32 {
        if x < 0.097 {
            -(10.0_f32.powf((0.073 - x) / 0.529) - 1.0) / 14.98
        } else if x > 0.15 {
            (10.0_f32.powf((x - 0.073) / 0.529) - 1.0) / 14.98
        } else {
            (x - 0.073) / 9.0
        }
    }
}

// ---------------------------------------------------------------------------
// ARRI LogC3 (EI 800)
// ---------------------------------------------------------------------------

/// ARRI LogC3 at EI 800.
///
/// ```text
/// x > e×cut + f → (10^((x − d) / c) − b) / a
/// otherwise     → (x − f) / e
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArriLogC3;

impl ArriLogC3 {
    const CUT: f32 = 0.010591;
    const A: f32 = 5.555556;
    const B: f32 = 0.052272;
    const C: f32 = 0.247190;
    const D: f32 = 0.385537;
    const E: f32 = 5.367655;
    const F: f32 = 0.092809;
}

impl LogCurve for ArriLogC3 {
    fn to_linear(&self, x: f32) -> f32 {
        if x > Self::E * Self::CUT + Self::F {
            (10.0_f32.powf((x - Self::D) / Self::C) - Self::B) / Self::A
        } else {
            (x - Self::F) / Self::E
        }
    }
}

// ---------------------------------------------------------------------------
// Nikon N-Log
// ---------------------------------------------------------------------------

/// Nikon N-Log: cubic toe, natural-log upper segment.
#[derive(Debug, Clone, Copy)]
pub struct NLog;

impl LogCurve for NLog {
    fn to_linear(&self, x: f32) -> f32 {
        if x < 0.328 {
            (x / 0.328).powi(3) * 0.018
        } else {
            ((x - 0.636) / 0.181).exp() * 0.18
        }
    }
}

// ---------------------------------------------------------------------------
// Fujifilm F-Log
// ---------------------------------------------------------------------------

/// Fujifilm F-Log.
#[derive(Debug, Clone, Copy)]
pub struct FLog;

impl FLog {
    const A: f32 = 0.555556;
    const B: f32 = 0.009468;
    const C: f32 = 0.344676;
    const D: f32 = 0.790453;
    const CUT_INV: f32 = 0.100537775;
}

impl LogCurve for FLog {
    fn to_linear(&self, x: f32) -> f32 {
        if x >= Self::CUT_INV {
            10.0_f32.powf((x - Self::D) / Self::C) / Self::A - Self::B / Self::A
        } else {
            (x - 0.092864) / 8.799461
        }
    }
}

// ---------------------------------------------------------------------------
// Blackmagic Film Gen 5
// ---------------------------------------------------------------------------

/// Blackmagic Design Film Generation 5.
///
/// ```text
/// x > 0.149 → 2^((x − 0.5300133) / 0.09246575)
/// otherwise → x / 10.44426855
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BmdFilmGen5;

impl BmdFilmGen5 {
    const A: f32 = 0.09246575;
    const B: f32 = 0.5300133;
    const C: f32 = 0.149;
    const LIN_SLOPE: f32 = 10.44426855;
}

impl LogCurve for BmdFilmGen5 {
    fn to_linear(&self, x: f32) -> f32 {
        if x > Self::C {
            2.0_f32.powf((x - Self::B) / Self::A)
        } else {
            x / Self::LIN_SLOPE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn all_curves() -> Vec<(LogProfile, &'static dyn LogCurve)> {
        [
            LogProfile::SLog3,
            LogProfile::VLog,
            LogProfile::CLog3,
            LogProfile::LogC3,
            LogProfile::NLog,
            LogProfile::FLog,
            LogProfile::Braw,
        ]
        .into_iter()
        .filter_map(|p| get_log_curve(p).map(|c| (p, c)))
        .collect()
    }

    #[test]
    fn test_none_has_no_curve() {
        assert!(get_log_curve(LogProfile::None).is_none());
        assert_eq!(all_curves().len(), 7);
    }

    #[test]
    fn test_log_segments_are_increasing() {
        for (profile, curve) in all_curves() {
            let mut prev = curve.to_linear(0.4);
            for i in 1..=120 {
                let v = curve.to_linear(0.4 + i as f32 * 0.005);
                assert!(v >= prev - 1e-6, "{profile:?} not monotonic at {i}: {prev} -> {v}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_slog3_middle_gray() {
        // S-Log3 encodes 18% gray at code value 0.410.
        let v = SLog3.to_linear(0.410);
        assert!((v - 0.17).abs() < EPSILON, "got {v}");
    }

    #[test]
    fn test_logc3_middle_gray() {
        // LogC3 EI 800 places 18% gray near 0.391.
        let v = ArriLogC3.to_linear(0.391);
        assert!((v - 0.18).abs() < 0.005, "got {v}");
    }

    #[test]
    fn test_vlog_linear_segment() {
        let v = VLog.to_linear(0.125);
        assert!(v.abs() < EPSILON, "V-Log black should decode to 0, got {v}");
    }

    #[test]
    fn test_decode_clamps_when_requested() {
        let curve = get_log_curve(LogProfile::Braw).unwrap();
        let clamped = apply_log_decode([1.0, 1.0, 1.0], curve, true);
        let open = apply_log_decode([1.0, 1.0, 1.0], curve, false);
        assert_eq!(clamped, [1.0, 1.0, 1.0]);
        assert!(open[0] > 1.0, "BMD film white should exceed 1.0, got {}", open[0]);
    }
}
