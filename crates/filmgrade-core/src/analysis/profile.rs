//! Reference profiles: a saved "look" derived from a reference photo.
//!
//! A profile stores the reference's [`ImageStats`] so later images can be
//! matched to it without re-analyzing the reference, plus optional film
//! settings and a small raw thumbnail.

use std::path::Path;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::analysis::histogram::Histogram;
use crate::analysis::stats::{ImageStats, LabStats, Percentiles};
use crate::error::{GradeError, GradeResult};
use crate::film::registry::FilmType;
use crate::image::{PixelBuffer, PixelFormat};
use crate::transform::params::GradingParams;

/// Longest thumbnail side in pixels.
pub const THUMBNAIL_MAX_SIDE: u32 = 96;

/// Film look that accompanies a reference, in slider units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilmSettings {
    pub film_type: FilmType,
    pub contrast: f32,
    pub saturation: f32,
    pub grain_amount: f32,
    pub grain_size: f32,
}

impl Default for FilmSettings {
    fn default() -> Self {
        Self {
            film_type: FilmType::None,
            contrast: 0.0,
            saturation: 0.0,
            grain_amount: 0.0,
            grain_size: 50.0,
        }
    }
}

impl FilmSettings {
    /// Settings taken from a stock's registry entry.
    pub fn from_film(film: FilmType) -> Self {
        let Some(profile) = film.profile() else {
            return Self::default();
        };
        Self {
            film_type: film,
            contrast: ((profile.contrast - 1.0) * 100.0).clamp(-100.0, 100.0),
            saturation: ((profile.saturation - 1.0) * 100.0).clamp(-100.0, 100.0),
            grain_amount: profile.grain_amount_percent(),
            grain_size: profile.grain_size_percent(),
        }
    }

    pub fn apply_to(&self, params: &mut GradingParams) {
        if self.film_type != FilmType::None {
            params.select_film(self.film_type);
        }
        params.contrast = self.contrast;
        params.saturation = self.saturation;
        params.grain_amount = self.grain_amount;
        params.grain_size = self.grain_size;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stats: ImageStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub film_settings: Option<FilmSettings>,
    /// `WxH:` followed by base64 of raw RGB8 bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ReferenceProfile {
    pub fn new(name: impl Into<String>, stats: ImageStats) -> Self {
        let profile = Self {
            name: name.into(),
            description: String::new(),
            stats,
            film_settings: None,
            thumbnail: None,
        };
        tracing::info!(name = %profile.name, samples = profile.stats.pixel_count, "created reference profile");
        profile
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_film_settings(mut self, settings: FilmSettings) -> Self {
        self.film_settings = Some(settings);
        self
    }

    /// Store a nearest-neighbour thumbnail of `image`, no larger than
    /// [`THUMBNAIL_MAX_SIDE`] on either side.
    pub fn with_thumbnail(mut self, image: &PixelBuffer) -> Self {
        if image.is_empty() {
            return self;
        }
        let (w, h) = (image.width(), image.height());
        let scale = (THUMBNAIL_MAX_SIDE as f32 / w.max(h) as f32).min(1.0);
        let tw = ((w as f32 * scale).round() as u32).max(1);
        let th = ((h as f32 * scale).round() as u32).max(1);

        let mut raw = Vec::with_capacity((tw * th * 3) as usize);
        for ty in 0..th {
            let sy = ((ty as u64 * h as u64) / th as u64) as u32;
            for tx in 0..tw {
                let sx = ((tx as u64 * w as u64) / tw as u64) as u32;
                raw.extend_from_slice(&image.rgb_at(sx, sy));
            }
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&raw);
        self.thumbnail = Some(format!("{tw}x{th}:{encoded}"));
        self
    }

    /// Decode the stored thumbnail, if any.
    pub fn thumbnail_pixels(&self) -> GradeResult<Option<PixelBuffer>> {
        let Some(text) = &self.thumbnail else {
            return Ok(None);
        };
        let bad = |msg: &str| GradeError::Thumbnail(msg.to_string());
        let (dims, payload) = text.split_once(':').ok_or_else(|| bad("missing WxH prefix"))?;
        let (w, h) = dims.split_once('x').ok_or_else(|| bad("malformed dimensions"))?;
        let width: u32 = w.parse().map_err(|_| bad("bad width"))?;
        let height: u32 = h.parse().map_err(|_| bad("bad height"))?;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| GradeError::Thumbnail(e.to_string()))?;
        PixelBuffer::new(width, height, PixelFormat::Rgb8, raw).map(Some)
    }

    pub fn from_json(json: &str) -> GradeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> GradeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> GradeResult<Self> {
        let profile = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), name = %profile.name, "loaded reference profile");
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> GradeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Built-in warm, golden look with soft contrast.
    pub fn autumn_breeze() -> Self {
        let percentiles = Percentiles {
            p5: 10.0,
            p50: 120.0,
            p95: 240.0,
        };
        let stats = ImageStats {
            histogram: Histogram::default(),
            percentiles,
            lab: LabStats {
                mean_l: 65.0,
                mean_a: 10.0,
                mean_b: 25.0,
                std_l: 25.0,
                std_a: 10.0,
                std_b: 15.0,
            },
            contrast: 25.0,
            saturation: 18.0,
            color_temp: 25.0,
            dynamic_range: 230.0,
            exposure: 120.0,
            ..ImageStats::default()
        };
        Self {
            name: "Autumn Breeze".to_string(),
            description: "Warm, golden hues with soft contrast".to_string(),
            stats,
            film_settings: None,
            thumbnail: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 128, 255]);
            }
        }
        PixelBuffer::new(width, height, PixelFormat::Rgba8, data).unwrap()
    }

    #[test]
    fn test_thumbnail_roundtrip_small_image() {
        let img = gradient(4, 3);
        let profile = ReferenceProfile::new("t", ImageStats::analyze(&img)).with_thumbnail(&img);
        assert!(profile.thumbnail.as_deref().unwrap().starts_with("4x3:"));
        let thumb = profile.thumbnail_pixels().unwrap().unwrap();
        assert_eq!(thumb.format(), PixelFormat::Rgb8);
        assert_eq!(thumb.rgb_at(3, 2), [3, 2, 128]);
    }

    #[test]
    fn test_thumbnail_is_downscaled() {
        let img = gradient(200, 100);
        let profile = ReferenceProfile::new("t", ImageStats::default()).with_thumbnail(&img);
        let thumb = profile.thumbnail_pixels().unwrap().unwrap();
        assert_eq!((thumb.width(), thumb.height()), (96, 48));
    }

    #[test]
    fn test_malformed_thumbnail_is_an_error() {
        let mut profile = ReferenceProfile::autumn_breeze();
        profile.thumbnail = Some("no-prefix".into());
        assert!(matches!(profile.thumbnail_pixels(), Err(GradeError::Thumbnail(_))));
        profile.thumbnail = Some("2x2:AAAA".into());
        assert!(matches!(profile.thumbnail_pixels(), Err(GradeError::BufferLength { .. })));
    }

    #[test]
    fn test_profile_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.json");
        let profile = ReferenceProfile::autumn_breeze()
            .with_description("warm")
            .with_film_settings(FilmSettings::from_film(FilmType::AmberGold));
        profile.save(&path).unwrap();
        let back = ReferenceProfile::load(&path).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_sparse_profile_json_loads() {
        let json = r#"{"name": "x", "stats": {"lab": {"meanL": 50, "meanA": 0, "meanB": 0, "stdL": 20, "stdA": 5, "stdB": 5}}}"#;
        let profile = ReferenceProfile::from_json(json).unwrap();
        assert_eq!(profile.stats.lab.std_l, 20.0);
        assert_eq!(profile.stats.histogram.luminance.len(), 256);
    }

    #[test]
    fn test_film_settings_apply() {
        let settings = FilmSettings::from_film(FilmType::Motion800T);
        let mut params = GradingParams::default();
        settings.apply_to(&mut params);
        assert_eq!(params.film_type, FilmType::Motion800T);
        assert_eq!(params.grain_amount, settings.grain_amount);
    }
}
