//! Central parameter struct that defines the entire grading look.
//!
//! `GradingParams` is the single source of truth for all grading adjustments.
//! It is a flat, JSON-compatible record in slider units (mostly −100..100 or
//! 0..100). Missing keys fall back to their defaults and unknown keys are
//! ignored, so presets saved by other versions keep loading.
//!
//! The pipeline never reads slider units directly: [`ResolvedParams`]
//! clamps every field to its range and converts it to the normalized
//! quantities the stages work in.

use glam::Mat3;
use serde::{Deserialize, Serialize};

use crate::analysis::reinhard::ReinhardTransfer;
use crate::color_management::transfer::{LogCurve, get_log_curve};
use crate::error::{GradeError, GradeResult};
use crate::film::registry::{FilmProfile, FilmType};
use crate::grading::curves::CurvesData;

/// Camera log encoding of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogProfile {
    #[default]
    None,
    /// Sony S-Log3.
    SLog3,
    /// Panasonic V-Log.
    VLog,
    /// Canon C-Log3.
    CLog3,
    /// ARRI LogC3 (EI 800).
    LogC3,
    /// Nikon N-Log.
    NLog,
    /// Fujifilm F-Log.
    FLog,
    /// Blackmagic Film Gen 5.
    Braw,
}

impl LogProfile {
    pub const ALL: [LogProfile; 8] = [
        Self::None,
        Self::SLog3,
        Self::VLog,
        Self::CLog3,
        Self::LogC3,
        Self::NLog,
        Self::FLog,
        Self::Braw,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SLog3 => "slog3",
            Self::VLog => "vlog",
            Self::CLog3 => "clog3",
            Self::LogC3 => "logc3",
            Self::NLog => "nlog",
            Self::FLog => "flog",
            Self::Braw => "braw",
        }
    }

    /// Human-readable label for menus and log output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SLog3 => "Sony S-Log3",
            Self::VLog => "Panasonic V-Log",
            Self::CLog3 => "Canon C-Log3",
            Self::LogC3 => "ARRI LogC3",
            Self::NLog => "Nikon N-Log",
            Self::FLog => "Fujifilm F-Log",
            Self::Braw => "Blackmagic Film Gen 5",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

lenient_string_enum!(LogProfile, LogProfile::None, "log profile");

/// Optical diffusion filter emulated in the last stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    #[default]
    None,
    BlackProMist,
    BlackMist,
    /// Heavy diffusion (HDF).
    Hdf,
    HollywoodBlackMagic,
    Glimmerglass,
    WhiteDiffusion,
    Orton,
    /// Anamorphic-style streak along an angle.
    Streak,
}

impl FilterType {
    pub const ALL: [FilterType; 9] = [
        Self::None,
        Self::BlackProMist,
        Self::BlackMist,
        Self::Hdf,
        Self::HollywoodBlackMagic,
        Self::Glimmerglass,
        Self::WhiteDiffusion,
        Self::Orton,
        Self::Streak,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BlackProMist => "black-pro-mist",
            Self::BlackMist => "black-mist",
            Self::Hdf => "hdf",
            Self::HollywoodBlackMagic => "hollywood-black-magic",
            Self::Glimmerglass => "glimmerglass",
            Self::WhiteDiffusion => "white-diffusion",
            Self::Orton => "orton",
            Self::Streak => "streak",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }
}

lenient_string_enum!(FilterType, FilterType::None, "filter type");

/// Per-channel offset in slider units (−100..100).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbOffset {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbOffset {
    pub const ZERO: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    fn normalized(self) -> [f32; 3] {
        let n = |v: f32| v.clamp(-100.0, 100.0) / 100.0;
        [n(self.r), n(self.g), n(self.b)]
    }
}

impl From<[f32; 3]> for RgbOffset {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// A Lab triple as stored in saved parameters (`{"L": .., "a": .., "b": ..}`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabTriple {
    #[serde(rename = "L")]
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl LabTriple {
    pub fn to_array(self) -> [f32; 3] {
        [self.l, self.a, self.b]
    }
}

impl From<[f32; 3]> for LabTriple {
    fn from(v: [f32; 3]) -> Self {
        Self {
            l: v[0],
            a: v[1],
            b: v[2],
        }
    }
}

/// Reference-based colour matching, applied before every other stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdaptiveParams {
    #[serde(rename = "useAdaptiveColor")]
    pub enabled: bool,
    /// 0..100 blend with the unmatched image.
    #[serde(rename = "adaptiveStrength")]
    pub strength: f32,
    #[serde(rename = "adaptiveSourceMean", skip_serializing_if = "Option::is_none")]
    pub source_mean: Option<LabTriple>,
    #[serde(rename = "adaptiveSourceStd", skip_serializing_if = "Option::is_none")]
    pub source_std: Option<LabTriple>,
    #[serde(rename = "adaptiveTargetMean", skip_serializing_if = "Option::is_none")]
    pub target_mean: Option<LabTriple>,
    #[serde(rename = "adaptiveTargetStd", skip_serializing_if = "Option::is_none")]
    pub target_std: Option<LabTriple>,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 100.0,
            source_mean: None,
            source_std: None,
            target_mean: None,
            target_std: None,
        }
    }
}

/// Every tool writes here. The pipeline reads a resolved copy per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradingParams {
    /// Camera log encoding to decode first.
    pub input_log_profile: LogProfile,

    /// −100..100, ±2 stops.
    pub exposure: f32,
    pub contrast: f32,

    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,

    /// −100 (cool) .. 100 (warm).
    pub temperature: f32,
    /// −100 (green) .. 100 (magenta).
    pub tint: f32,
    pub saturation: f32,
    pub vibrance: f32,

    pub spectral_volume: f32,
    pub spectral_luminance: f32,
    pub spectral_hue: f32,

    pub shadow_lift: RgbOffset,
    pub midtone_gamma: RgbOffset,
    pub highlight_gain: RgbOffset,

    pub curves: CurvesData,

    pub film_type: FilmType,
    /// 0..100.
    pub film_strength: f32,

    pub film_toe: f32,
    pub film_shoulder: f32,
    pub crossover_shift: RgbOffset,

    pub grain_amount: f32,
    pub grain_size: f32,
    pub grain_roughness: f32,
    /// 0 = monochrome grain, 100 = fully independent dye layers.
    pub grain_chromacity: f32,
    pub grain_highlights: f32,
    pub grain_shadows: f32,
    pub acutance: f32,

    pub use_film_color_matrix: bool,
    pub fade: f32,
    pub halation: f32,
    /// `#RRGGBB`.
    pub halation_color: String,
    pub halation_threshold: f32,
    pub halation_radius: f32,
    pub bloom: f32,
    pub diffusion: f32,
    pub vignette: f32,
    pub vignette_radius: f32,

    /// Blend of the creative LUT, 0..100.
    pub lut_strength: f32,

    pub filter_type: FilterType,
    pub filter_strength: f32,
    pub filter_glow_radius: f32,
    pub filter_glow_threshold: f32,
    pub filter_sharpness: f32,
    /// Degrees, 0..360.
    pub filter_streak_angle: f32,

    #[serde(flatten)]
    pub adaptive: AdaptiveParams,
}

/// Default halation tint.
pub const DEFAULT_HALATION_COLOR: &str = "#FF5500";

impl Default for GradingParams {
    /// Identity transform: the image passes through unchanged.
    fn default() -> Self {
        Self {
            input_log_profile: LogProfile::None,
            exposure: 0.0,
            contrast: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            whites: 0.0,
            blacks: 0.0,
            temperature: 0.0,
            tint: 0.0,
            saturation: 0.0,
            vibrance: 0.0,
            spectral_volume: 0.0,
            spectral_luminance: 0.0,
            spectral_hue: 0.0,
            shadow_lift: RgbOffset::ZERO,
            midtone_gamma: RgbOffset::ZERO,
            highlight_gain: RgbOffset::ZERO,
            curves: CurvesData::default(),
            film_type: FilmType::None,
            film_strength: 50.0,
            film_toe: 0.0,
            film_shoulder: 0.0,
            crossover_shift: RgbOffset::ZERO,
            grain_amount: 0.0,
            grain_size: 50.0,
            grain_roughness: 50.0,
            grain_chromacity: 60.0,
            grain_highlights: 20.0,
            grain_shadows: 80.0,
            acutance: 0.0,
            use_film_color_matrix: true,
            fade: 0.0,
            halation: 0.0,
            halation_color: DEFAULT_HALATION_COLOR.to_string(),
            halation_threshold: 65.0,
            halation_radius: 50.0,
            bloom: 0.0,
            diffusion: 0.0,
            vignette: 0.0,
            vignette_radius: 50.0,
            lut_strength: 100.0,
            filter_type: FilterType::None,
            filter_strength: 50.0,
            filter_glow_radius: 50.0,
            filter_glow_threshold: 65.0,
            filter_sharpness: 30.0,
            filter_streak_angle: 0.0,
            adaptive: AdaptiveParams::default(),
        }
    }
}

const BIPOLAR: (f32, f32) = (-100.0, 100.0);
const UNIPOLAR: (f32, f32) = (0.0, 100.0);

impl GradingParams {
    /// Parse saved parameters and validate every ranged field.
    pub fn from_json(json: &str) -> GradeResult<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> GradeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every scalar slider with its documented range.
    fn ranged_fields(&self) -> Vec<(&'static str, f32, (f32, f32))> {
        let mut fields = vec![
            ("exposure", self.exposure, BIPOLAR),
            ("contrast", self.contrast, BIPOLAR),
            ("highlights", self.highlights, BIPOLAR),
            ("shadows", self.shadows, BIPOLAR),
            ("whites", self.whites, BIPOLAR),
            ("blacks", self.blacks, BIPOLAR),
            ("temperature", self.temperature, BIPOLAR),
            ("tint", self.tint, BIPOLAR),
            ("saturation", self.saturation, BIPOLAR),
            ("vibrance", self.vibrance, BIPOLAR),
            ("spectralVolume", self.spectral_volume, BIPOLAR),
            ("spectralLuminance", self.spectral_luminance, BIPOLAR),
            ("spectralHue", self.spectral_hue, BIPOLAR),
            ("filmStrength", self.film_strength, UNIPOLAR),
            ("filmToe", self.film_toe, UNIPOLAR),
            ("filmShoulder", self.film_shoulder, UNIPOLAR),
            ("grainAmount", self.grain_amount, UNIPOLAR),
            ("grainSize", self.grain_size, UNIPOLAR),
            ("grainRoughness", self.grain_roughness, UNIPOLAR),
            ("grainChromacity", self.grain_chromacity, UNIPOLAR),
            ("grainHighlights", self.grain_highlights, UNIPOLAR),
            ("grainShadows", self.grain_shadows, UNIPOLAR),
            ("acutance", self.acutance, UNIPOLAR),
            ("fade", self.fade, UNIPOLAR),
            ("halation", self.halation, UNIPOLAR),
            ("halationThreshold", self.halation_threshold, UNIPOLAR),
            ("halationRadius", self.halation_radius, UNIPOLAR),
            ("bloom", self.bloom, UNIPOLAR),
            ("diffusion", self.diffusion, UNIPOLAR),
            ("vignette", self.vignette, UNIPOLAR),
            ("vignetteRadius", self.vignette_radius, UNIPOLAR),
            ("lutStrength", self.lut_strength, UNIPOLAR),
            ("filterStrength", self.filter_strength, UNIPOLAR),
            ("filterGlowRadius", self.filter_glow_radius, UNIPOLAR),
            ("filterGlowThreshold", self.filter_glow_threshold, UNIPOLAR),
            ("filterSharpness", self.filter_sharpness, UNIPOLAR),
            ("filterStreakAngle", self.filter_streak_angle, (0.0, 360.0)),
            ("adaptiveStrength", self.adaptive.strength, UNIPOLAR),
        ];
        let offsets = [
            ("shadowLift", self.shadow_lift),
            ("midtoneGamma", self.midtone_gamma),
            ("highlightGain", self.highlight_gain),
            ("crossoverShift", self.crossover_shift),
        ];
        for (name, offset) in offsets {
            for v in offset.to_array() {
                fields.push((name, v, BIPOLAR));
            }
        }
        fields
    }

    /// Check ranges, curves, and the halation colour.
    pub fn validate(&self) -> GradeResult<()> {
        for (name, value, (min, max)) in self.ranged_fields() {
            if !value.is_finite() || value < min || value > max {
                return Err(GradeError::ParamOutOfRange {
                    name,
                    value,
                    min,
                    max,
                });
            }
        }
        self.curves.validate()?;
        parse_hex_color(&self.halation_color)?;
        Ok(())
    }

    /// Select a film stock and merge its recipe overrides.
    pub fn select_film(&mut self, film: FilmType) {
        self.film_type = film;
        let Some(profile) = film.profile() else {
            return;
        };
        let o = &profile.overrides;
        if let Some(v) = o.shadow_lift {
            self.shadow_lift = v.into();
        }
        if let Some(v) = o.midtone_gamma {
            self.midtone_gamma = v.into();
        }
        if let Some(v) = o.highlight_gain {
            self.highlight_gain = v.into();
        }
        if let Some(curve) = o.curve {
            self.curves.rgb = curve.to_vec();
        }
        if let Some(v) = o.saturation {
            self.saturation = v;
        }
        if let Some(v) = o.contrast {
            self.contrast = v;
        }
        if let Some(v) = o.halation {
            self.halation = v;
        }
        if let Some(v) = o.halation_color {
            self.halation_color = v.to_string();
        }
        if let Some(v) = o.halation_threshold {
            self.halation_threshold = v;
        }
        if let Some(v) = o.halation_radius {
            self.halation_radius = v;
        }
    }

    /// Copy the selected stock's grain and acutance defaults into the sliders.
    pub fn apply_film_defaults(&mut self) {
        let Some(profile) = self.film_type.profile() else {
            return;
        };
        self.grain_amount = profile.grain_amount_percent();
        self.grain_size = profile.grain_size_percent();
        if let Some(a) = profile.acutance {
            self.acutance = (a * 100.0).clamp(0.0, 100.0);
        }
    }
}

/// Parse `#RRGGBB` into normalized RGB.
pub fn parse_hex_color(hex: &str) -> GradeResult<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(GradeError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| GradeError::InvalidColor(hex.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Parameters converted to the units the stages work in, clamped to range.
///
/// Built once per render; every per-pixel stage reads from here.
#[derive(Clone)]
pub struct ResolvedParams {
    pub log_curve: Option<&'static dyn LogCurve>,
    pub adaptive: Option<ReinhardTransfer>,
    /// Stops.
    pub exposure: f32,
    pub contrast: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
    pub temperature: f32,
    pub tint: f32,
    pub saturation: f32,
    pub vibrance: f32,
    pub spectral_volume: f32,
    pub spectral_luminance: f32,
    pub spectral_hue: f32,
    pub lift: [f32; 3],
    pub gamma: [f32; 3],
    pub gain: [f32; 3],
    pub lut_strength: f32,
    pub film: Option<&'static FilmProfile>,
    pub film_strength: f32,
    pub film_matrix: Option<Mat3>,
    pub toe: f32,
    pub shoulder: f32,
    pub crossover: [f32; 3],
    pub fade: f32,
    pub bloom: f32,
    pub diffusion: f32,
    pub halation: f32,
    pub halation_color: [f32; 3],
    pub halation_threshold: f32,
    pub halation_radius: f32,
    pub vignette: f32,
    pub vignette_radius: f32,
    pub acutance: f32,
    pub grain_amount: f32,
    pub grain_size: f32,
    pub grain_roughness: f32,
    pub grain_chromacity: f32,
    pub grain_highlights: f32,
    pub grain_shadows: f32,
    pub filter_type: FilterType,
    pub filter_strength: f32,
    pub filter_glow_radius: f32,
    pub filter_glow_threshold: f32,
    pub filter_sharpness: f32,
    /// Radians.
    pub filter_streak_angle: f32,
}

impl ResolvedParams {
    pub fn new(p: &GradingParams) -> Self {
        let bi = |v: f32| sanitize(v).clamp(-100.0, 100.0) / 100.0;
        let uni = |v: f32| sanitize(v).clamp(0.0, 100.0) / 100.0;

        let film = p.film_type.profile();
        let film_matrix = if p.use_film_color_matrix {
            film.and_then(FilmProfile::matrix)
        } else {
            None
        };

        let halation_color = parse_hex_color(&p.halation_color).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default halation colour");
            [1.0, 85.0 / 255.0, 0.0]
        });

        Self {
            log_curve: get_log_curve(p.input_log_profile),
            adaptive: ReinhardTransfer::from_adaptive(&p.adaptive),
            exposure: sanitize(p.exposure).clamp(-100.0, 100.0) / 50.0,
            contrast: bi(p.contrast),
            highlights: bi(p.highlights),
            shadows: bi(p.shadows),
            whites: bi(p.whites),
            blacks: bi(p.blacks),
            temperature: bi(p.temperature),
            tint: bi(p.tint),
            saturation: bi(p.saturation),
            vibrance: bi(p.vibrance),
            spectral_volume: bi(p.spectral_volume),
            spectral_luminance: bi(p.spectral_luminance),
            spectral_hue: bi(p.spectral_hue),
            lift: p.shadow_lift.normalized(),
            gamma: p.midtone_gamma.normalized(),
            gain: p.highlight_gain.normalized(),
            lut_strength: uni(p.lut_strength),
            film,
            film_strength: uni(p.film_strength),
            film_matrix,
            toe: uni(p.film_toe),
            shoulder: uni(p.film_shoulder),
            crossover: p.crossover_shift.normalized(),
            fade: uni(p.fade),
            bloom: uni(p.bloom),
            diffusion: uni(p.diffusion),
            halation: uni(p.halation),
            halation_color,
            halation_threshold: uni(p.halation_threshold),
            halation_radius: uni(p.halation_radius),
            vignette: uni(p.vignette),
            vignette_radius: uni(p.vignette_radius),
            acutance: uni(p.acutance),
            grain_amount: uni(p.grain_amount),
            grain_size: uni(p.grain_size),
            grain_roughness: uni(p.grain_roughness),
            grain_chromacity: uni(p.grain_chromacity),
            grain_highlights: uni(p.grain_highlights),
            grain_shadows: uni(p.grain_shadows),
            filter_type: p.filter_type,
            filter_strength: uni(p.filter_strength),
            filter_glow_radius: uni(p.filter_glow_radius),
            filter_glow_threshold: uni(p.filter_glow_threshold),
            filter_sharpness: uni(p.filter_sharpness),
            filter_streak_angle: (sanitize(p.filter_streak_angle).clamp(0.0, 360.0)).to_radians(),
        }
    }
}

/// Non-finite slider values count as neutral.
fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrips_through_json() {
        let params = GradingParams::default();
        let json = params.to_json().unwrap();
        let back = GradingParams::from_json(&json).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn test_missing_and_unknown_keys_use_defaults() {
        let params = GradingParams::from_json(
            r#"{"exposure": 20, "acesOutputTransform": "rec709", "filmType": "autumn-breeze"}"#,
        )
        .unwrap();
        assert_eq!(params.exposure, 20.0);
        assert_eq!(params.film_type, FilmType::None);
        assert_eq!(params.film_strength, 50.0);
        assert_eq!(params.halation_color, DEFAULT_HALATION_COLOR);
        assert!(params.curves.is_identity());
    }

    #[test]
    fn test_non_string_enum_values_use_none() {
        let params = GradingParams::from_json(
            r#"{"filmType": 3, "inputLogProfile": null, "filterType": {"id": "pro-mist"}, "exposure": 10}"#,
        )
        .unwrap();
        assert_eq!(params.film_type, FilmType::None);
        assert_eq!(params.input_log_profile, LogProfile::None);
        assert_eq!(params.filter_type, FilterType::None);
        assert_eq!(params.exposure, 10.0);
    }

    #[test]
    fn test_camel_case_keys() {
        let params = GradingParams::from_json(
            r#"{"shadowLift": {"r": 10, "g": 0, "b": -5}, "inputLogProfile": "vlog", "filterType": "black-mist", "useAdaptiveColor": true, "adaptiveTargetMean": {"L": 60, "a": 2, "b": 8}}"#,
        )
        .unwrap();
        assert_eq!(params.shadow_lift, RgbOffset::new(10.0, 0.0, -5.0));
        assert_eq!(params.input_log_profile, LogProfile::VLog);
        assert_eq!(params.filter_type, FilterType::BlackMist);
        assert!(params.adaptive.enabled);
        assert_eq!(params.adaptive.target_mean.map(|m| m.l), Some(60.0));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let err = GradingParams::from_json(r#"{"exposure": 250}"#).unwrap_err();
        assert!(matches!(
            err,
            GradeError::ParamOutOfRange {
                name: "exposure",
                ..
            }
        ));

        let err = GradingParams::from_json(r#"{"crossoverShift": {"r": 0, "g": 101, "b": 0}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GradeError::ParamOutOfRange {
                name: "crossoverShift",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_halation_color_is_rejected() {
        let err = GradingParams::from_json(r##"{"halationColor": "#GG0000"}"##).unwrap_err();
        assert!(matches!(err, GradeError::InvalidColor(_)));
    }

    #[test]
    fn test_parse_hex_color() {
        let c = parse_hex_color("#FF5500").unwrap();
        assert_eq!(c, [1.0, 85.0 / 255.0, 0.0]);
        assert!(parse_hex_color("#FFF").is_err());
    }

    #[test]
    fn test_resolve_clamps_and_scales() {
        let params = GradingParams {
            exposure: 500.0,
            contrast: -50.0,
            film_strength: f32::NAN,
            filter_streak_angle: 90.0,
            ..Default::default()
        };
        let r = ResolvedParams::new(&params);
        assert_eq!(r.exposure, 2.0);
        assert_eq!(r.contrast, -0.5);
        assert_eq!(r.film_strength, 0.0);
        assert!((r.filter_streak_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(r.log_curve.is_none());
        assert!(r.film.is_none());
    }

    #[test]
    fn test_select_film_applies_overrides() {
        let mut params = GradingParams::default();
        params.select_film(FilmType::Motion800T);
        assert_eq!(params.film_type, FilmType::Motion800T);
        assert_eq!(params.halation, 35.0);
        assert_eq!(params.halation_color, "#FF3300");

        let mut params = GradingParams::default();
        params.select_film(FilmType::Cinema2383);
        assert_eq!(params.curves.rgb.len(), 5);
        assert!(params.curves.validate().is_ok());
    }

    #[test]
    fn test_film_matrix_respects_toggle() {
        let mut params = GradingParams::default();
        params.select_film(FilmType::AmberGold);
        assert!(ResolvedParams::new(&params).film_matrix.is_some());
        params.use_film_color_matrix = false;
        assert!(ResolvedParams::new(&params).film_matrix.is_none());
    }

    #[test]
    fn test_apply_film_defaults() {
        let mut params = GradingParams::default();
        params.select_film(FilmType::MonoFine100);
        params.apply_film_defaults();
        assert!((params.grain_amount - 12.0).abs() < 1e-4);
        assert!((params.acutance - 40.0).abs() < 1e-4);
    }
}
