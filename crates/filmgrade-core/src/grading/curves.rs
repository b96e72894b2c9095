//! Tone curves: Catmull-Rom interpolation baked into 256-entry tables.
//!
//! A curve is a short list of `(x, y)` control points on the 0–255 scale.
//! Four curves are kept: a master `rgb` curve applied first, then the
//! per-channel `red`, `green`, `blue` curves.
//!
//! # Algorithm
//! For each output index `i`, find the segment `[P1, P2]` with
//! `P1.x <= i`, take neighbours `P0`/`P3` (reusing the endpoint at the
//! ends of the list), and evaluate
//! ```text
//! q(t) = 0.5 × ((2×P1) + (-P0 + P2)×t + (2×P0 - 5×P1 + 4×P2 - P3)×t² + (-P0 + 3×P1 - 3×P2 + P3)×t³)
//! ```
//! on the y coordinates. The result is rounded and clamped to [0, 255].

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, GradeResult};

/// Minimum control points per curve.
pub const MIN_POINTS: usize = 2;
/// Maximum control points per curve.
pub const MAX_POINTS: usize = 8;

/// One control point, both coordinates on the 0–255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

fn identity_points() -> Vec<CurvePoint> {
    vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(255.0, 255.0)]
}

/// Control points for the master and per-channel curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvesData {
    pub rgb: Vec<CurvePoint>,
    pub red: Vec<CurvePoint>,
    pub green: Vec<CurvePoint>,
    pub blue: Vec<CurvePoint>,
}

impl Default for CurvesData {
    /// The identity line on every channel.
    fn default() -> Self {
        Self {
            rgb: identity_points(),
            red: identity_points(),
            green: identity_points(),
            blue: identity_points(),
        }
    }
}

impl CurvesData {
    fn channels(&self) -> [(&'static str, &[CurvePoint]); 4] {
        [
            ("rgb", &self.rgb),
            ("red", &self.red),
            ("green", &self.green),
            ("blue", &self.blue),
        ]
    }

    /// True when every channel is the two-point identity line.
    pub fn is_identity(&self) -> bool {
        self.channels().iter().all(|(_, pts)| is_identity_curve(pts))
    }

    /// Check point counts, ordering, and the fixed endpoints.
    pub fn validate(&self) -> GradeResult<()> {
        for (channel, pts) in self.channels() {
            if !(MIN_POINTS..=MAX_POINTS).contains(&pts.len()) {
                return Err(GradeError::CurvePointCount {
                    channel,
                    count: pts.len(),
                    min: MIN_POINTS,
                    max: MAX_POINTS,
                });
            }
            for p in pts {
                let in_range = |v: f32| v.is_finite() && (0.0..=255.0).contains(&v);
                if !in_range(p.x) || !in_range(p.y) {
                    return Err(GradeError::InvalidCurve {
                        channel,
                        message: format!("point ({}, {}) outside [0, 255]", p.x, p.y),
                    });
                }
            }
            if pts.windows(2).any(|w| w[1].x < w[0].x) {
                return Err(GradeError::InvalidCurve {
                    channel,
                    message: "points are not sorted by x".to_string(),
                });
            }
            let first = pts[0].x;
            let last = pts[pts.len() - 1].x;
            if first != 0.0 || last != 255.0 {
                return Err(GradeError::InvalidCurve {
                    channel,
                    message: format!("endpoints must sit at x=0 and x=255, got {first} and {last}"),
                });
            }
        }
        Ok(())
    }
}

fn is_identity_curve(pts: &[CurvePoint]) -> bool {
    pts.len() == 2 && pts[0] == CurvePoint::new(0.0, 0.0) && pts[1] == CurvePoint::new(255.0, 255.0)
}

/// Catmull-Rom cubic interpolation between P1 and P2.
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Bake control points into a 256-entry table.
///
/// Points are sorted by x first. Fewer than two points, or the untouched
/// two-point diagonal, yield the identity table. Indices past the last
/// point take the last point's y.
pub fn build_lut(points: &[CurvePoint]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if points.len() < MIN_POINTS || is_identity_curve(points) {
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }
        return lut;
    }

    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x));
    let last = pts.len() - 1;

    let mut idx = 0;
    for (i, out) in lut.iter_mut().enumerate() {
        let x = i as f32;
        while idx < last && pts[idx + 1].x < x {
            idx += 1;
        }

        let value = if idx >= last {
            pts[last].y
        } else {
            let p0 = pts[idx.saturating_sub(1)];
            let p1 = pts[idx];
            let p2 = pts[(idx + 1).min(last)];
            let p3 = pts[(idx + 2).min(last)];

            let span = p2.x - p1.x;
            let t = if span.abs() < 1e-6 { 0.0 } else { ((x - p1.x) / span).clamp(0.0, 1.0) };
            catmull_rom(p0.y, p1.y, p2.y, p3.y, t)
        };

        *out = value.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Baked tables for all four curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveLut {
    pub rgb: [u8; 256],
    pub red: [u8; 256],
    pub green: [u8; 256],
    pub blue: [u8; 256],
}

impl CurveLut {
    pub fn bake(curves: &CurvesData) -> Self {
        Self {
            rgb: build_lut(&curves.rgb),
            red: build_lut(&curves.red),
            green: build_lut(&curves.green),
            blue: build_lut(&curves.blue),
        }
    }

    /// Master curve first, then the per-channel curves.
    ///
    /// Inputs are looked up at the nearest table entry, so the curve stage
    /// quantizes to 8 bits like a 256-texel texture would.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let lookup = |table: &[u8; 256], v: f32| table[index(v)] as f32 / 255.0;
        let r = lookup(&self.rgb, rgb[0]);
        let g = lookup(&self.rgb, rgb[1]);
        let b = lookup(&self.rgb, rgb[2]);
        [
            lookup(&self.red, r),
            lookup(&self.green, g),
            lookup(&self.blue, b),
        ]
    }
}

fn index(v: f32) -> usize {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_curve_builds_identity_table() {
        let lut = build_lut(&identity_points());
        for (i, v) in lut.iter().enumerate() {
            assert_eq!(*v as usize, i, "index {i}");
        }
    }

    #[test]
    fn test_single_point_is_identity() {
        let lut = build_lut(&[CurvePoint::new(128.0, 0.0)]);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[200], 200);
    }

    #[test]
    fn test_curve_passes_through_control_points() {
        let pts = [
            CurvePoint::new(0.0, 0.0),
            CurvePoint::new(64.0, 40.0),
            CurvePoint::new(192.0, 220.0),
            CurvePoint::new(255.0, 255.0),
        ];
        let lut = build_lut(&pts);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[64], 40);
        assert_eq!(lut[192], 220);
        assert_eq!(lut[255], 255);
    }

    #[test]
    fn test_unsorted_points_are_sorted() {
        let sorted = [
            CurvePoint::new(0.0, 10.0),
            CurvePoint::new(128.0, 100.0),
            CurvePoint::new(255.0, 240.0),
        ];
        let shuffled = [sorted[2], sorted[0], sorted[1]];
        assert_eq!(build_lut(&sorted), build_lut(&shuffled));
    }

    #[test]
    fn test_flat_curve() {
        let lut = build_lut(&[CurvePoint::new(0.0, 128.0), CurvePoint::new(255.0, 128.0)]);
        assert!(lut.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_apply_identity_is_exact_on_bytes() {
        let lut = CurveLut::bake(&CurvesData::default());
        for b in 0..=255u8 {
            let v = b as f32 / 255.0;
            let out = lut.apply([v, v, v]);
            assert!((out[0] - v).abs() < 1e-6, "byte {b}: {}", out[0]);
        }
    }

    #[test]
    fn test_validate_rejects_short_curve() {
        let curves = CurvesData {
            red: vec![CurvePoint::new(0.0, 0.0)],
            ..Default::default()
        };
        assert!(matches!(
            curves.validate(),
            Err(GradeError::CurvePointCount { channel: "red", count: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_moved_endpoint() {
        let curves = CurvesData {
            rgb: vec![CurvePoint::new(10.0, 0.0), CurvePoint::new(255.0, 255.0)],
            ..Default::default()
        };
        assert!(matches!(curves.validate(), Err(GradeError::InvalidCurve { channel: "rgb", .. })));
    }

    #[test]
    fn test_default_is_identity() {
        let curves = CurvesData::default();
        assert!(curves.is_identity());
        assert!(curves.validate().is_ok());
    }
}
