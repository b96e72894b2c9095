//! White balance adjustment via tri-stimulus scaling.
//!
//! Temperature scales RGB toward a warm or cool reference triple along the
//! blue-orange axis. Tint is a small additive shift on the green-magenta
//! axis: green moves against red and blue.

use crate::color_management::color_space::clamp01;

/// Multiplier reached at temperature +1.
const WARM: [f32; 3] = [1.0, 0.9, 0.7];
/// Multiplier reached at temperature −1.
const COOL: [f32; 3] = [0.7, 0.9, 1.0];

/// Apply white balance adjustment using temperature and tint.
///
/// - `temperature`: −1 (cool) .. 1 (warm). 0.0 = neutral.
/// - `tint`: −1 (green) .. 1 (magenta). 0.0 = neutral.
///
/// ```text
/// scale = mix(1, warm, t)  for t > 0
///         mix(1, cool, −t) otherwise
/// rgb  *= scale
/// g    −= tint × 0.1
/// r, b += tint × 0.05
/// ```
///
/// Both values at 0.0 produce no change (identity). Output is clamped.
pub fn apply_white_balance(rgb: [f32; 3], temperature: f32, tint: f32) -> [f32; 3] {
    if temperature.abs() < 1e-7 && tint.abs() < 1e-7 {
        return rgb;
    }

    let (target, t) = if temperature > 0.0 {
        (WARM, temperature)
    } else {
        (COOL, -temperature)
    };

    let mut out = [0.0_f32; 3];
    for c in 0..3 {
        let scale = 1.0 + (target[c] - 1.0) * t;
        out[c] = rgb[c] * scale;
    }

    out[1] -= tint * 0.1;
    out[0] += tint * 0.05;
    out[2] += tint * 0.05;

    clamp01(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_white_balance_zero_is_identity() {
        let rgb = [0.5, 0.4, 0.3];
        let result = apply_white_balance(rgb, 0.0, 0.0);
        assert_eq!(result, rgb);
    }

    #[test]
    fn test_white_balance_warm_shifts_toward_yellow() {
        let rgb = [0.5, 0.5, 0.5];
        let result = apply_white_balance(rgb, 1.0, 0.0);
        assert!((result[0] - 0.5).abs() < EPSILON, "red unchanged at full warm");
        assert!((result[2] - 0.35).abs() < EPSILON, "blue: {}", result[2]);
    }

    #[test]
    fn test_white_balance_cool_shifts_toward_blue() {
        let rgb = [0.5, 0.5, 0.5];
        let result = apply_white_balance(rgb, -0.5, 0.0);
        assert!((result[0] - 0.425).abs() < EPSILON, "red: {}", result[0]);
        assert!((result[2] - 0.5).abs() < EPSILON, "blue: {}", result[2]);
    }

    #[test]
    fn test_tint_moves_green_against_magenta() {
        let result = apply_white_balance([0.5, 0.5, 0.5], 0.0, 1.0);
        assert!((result[0] - 0.55).abs() < EPSILON);
        assert!((result[1] - 0.4).abs() < EPSILON);
        assert!((result[2] - 0.55).abs() < EPSILON);
    }

    #[test]
    fn test_white_balance_preserves_black_without_tint() {
        let result = apply_white_balance([0.0, 0.0, 0.0], 0.8, 0.0);
        for i in 0..3 {
            assert!(result[i].abs() < EPSILON, "channel {i}: {}", result[i]);
        }
    }
}
