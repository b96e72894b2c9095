//! Film character presets.
//!
//! A character preset sets the texture of the image (grain, halation,
//! glow, roll-off) independently of the stock's colour. Applying one
//! overwrites only the fields it names.

use crate::film::registry::GRAIN_AMOUNT_SCALE;
use crate::transform::params::GradingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilmPreset {
    /// No texture at all.
    Clean,
    Standard,
    Cinema,
    Vintage,
    Gritty,
}

/// Grain settings on the stocks' native scale: amount, size, chromacity,
/// highlight response, shadow response.
struct GrainCharacter(f32, f32, f32, f32, f32);

impl FilmPreset {
    pub const ALL: [FilmPreset; 5] = [
        Self::Clean,
        Self::Standard,
        Self::Cinema,
        Self::Vintage,
        Self::Gritty,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Standard => "standard",
            Self::Cinema => "cinema",
            Self::Vintage => "vintage",
            Self::Gritty => "gritty",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Clean => "Clean (Digital)",
            Self::Standard => "Standard (35mm)",
            Self::Cinema => "Cinema (Vision3)",
            Self::Vintage => "Vintage (16mm)",
            Self::Gritty => "Gritty (Pushed)",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Clean => "No grain, no halation. Pure color response.",
            Self::Standard => "Subtle grain and structure typical of modern 35mm stock.",
            Self::Cinema => "Halation, soft highlights, and organic grain.",
            Self::Vintage => "Heavy grain, faded shadows, and reduced contrast.",
            Self::Gritty => "High contrast, coarse grain, and rough texture.",
        }
    }

    fn grain(&self) -> Option<GrainCharacter> {
        match self {
            Self::Clean => None,
            Self::Standard => Some(GrainCharacter(0.015, 0.5, 0.4, 0.2, 0.6)),
            Self::Cinema => Some(GrainCharacter(0.02, 0.6, 0.5, 0.3, 0.7)),
            Self::Vintage => Some(GrainCharacter(0.045, 0.9, 0.3, 0.4, 0.8)),
            Self::Gritty => Some(GrainCharacter(0.05, 1.2, 0.0, 0.5, 0.9)),
        }
    }

    /// Overwrite the preset's fields in `params`.
    pub fn apply(&self, params: &mut GradingParams) {
        let percent = |v: f32| (v * 100.0).clamp(0.0, 100.0);
        match self.grain() {
            Some(GrainCharacter(amount, size, chroma, highlights, shadows)) => {
                params.grain_amount = (amount * GRAIN_AMOUNT_SCALE).clamp(0.0, 100.0);
                params.grain_size = percent(size);
                params.grain_chromacity = percent(chroma);
                params.grain_highlights = percent(highlights);
                params.grain_shadows = percent(shadows);
            }
            None => params.grain_amount = 0.0,
        }

        match self {
            Self::Clean => {
                params.halation = 0.0;
                params.bloom = 0.0;
                params.diffusion = 0.0;
                params.film_toe = 0.0;
                params.film_shoulder = 0.0;
            }
            Self::Standard => {
                params.halation = 0.0;
                params.film_toe = 10.0;
                params.film_shoulder = 10.0;
            }
            Self::Cinema => {
                params.halation = 30.0;
                params.halation_radius = 50.0;
                params.halation_threshold = 60.0;
                params.bloom = 10.0;
                params.film_toe = 15.0;
                params.film_shoulder = 25.0;
                params.fade = 5.0;
            }
            Self::Vintage => {
                params.halation = 40.0;
                params.halation_radius = 70.0;
                params.diffusion = 20.0;
                params.film_toe = 20.0;
                params.film_shoulder = 10.0;
                params.fade = 15.0;
                params.vignette = 30.0;
            }
            Self::Gritty => {
                params.acutance = 40.0;
                params.contrast = 10.0;
                params.film_toe = 5.0;
                params.film_shoulder = 5.0;
            }
        }
        tracing::debug!(preset = self.id(), "applied film character preset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for preset in FilmPreset::ALL {
            assert_eq!(FilmPreset::from_id(preset.id()), Some(preset));
        }
        assert_eq!(FilmPreset::from_id("super8"), None);
    }

    #[test]
    fn test_clean_removes_texture() {
        let mut params = GradingParams {
            grain_amount: 40.0,
            halation: 20.0,
            bloom: 15.0,
            film_toe: 30.0,
            ..Default::default()
        };
        FilmPreset::Clean.apply(&mut params);
        assert_eq!(params.grain_amount, 0.0);
        assert_eq!(params.halation, 0.0);
        assert_eq!(params.bloom, 0.0);
        assert_eq!(params.film_toe, 0.0);
    }

    #[test]
    fn test_presets_produce_valid_params() {
        for preset in FilmPreset::ALL {
            let mut params = GradingParams::default();
            preset.apply(&mut params);
            assert!(params.validate().is_ok(), "{} produced invalid params", preset.id());
        }
    }

    #[test]
    fn test_gritty_scaling() {
        let mut params = GradingParams::default();
        FilmPreset::Gritty.apply(&mut params);
        assert!((params.grain_amount - 50.0).abs() < 1e-4);
        assert_eq!(params.grain_size, 100.0);
        assert_eq!(params.grain_chromacity, 0.0);
        assert_eq!(params.contrast, 10.0);
    }

    #[test]
    fn test_untouched_fields_survive() {
        let mut params = GradingParams {
            exposure: 12.0,
            ..Default::default()
        };
        FilmPreset::Cinema.apply(&mut params);
        assert_eq!(params.exposure, 12.0);
        assert_eq!(params.halation, 30.0);
    }
}
