//! Core transform evaluation: the full grading chain for a single pixel.
//!
//! Stages run in a fixed order; each one assumes the colour left by the
//! previous stage:
//!
//! ```text
//!  0  adaptive colour transfer (Reinhard)
//!  1  log decode               13  film emulation
//!  2  input LUT                14  toe / shoulder
//!  3  exposure                 15  crossover
//!  4  contrast                 16  fade
//!  5  tonal range              17  bloom
//!  6  temperature / tint       18  diffusion
//!  7  saturation               19  halation
//!  8  vibrance                 20  vignette
//!  9  spectral                 21  acutance        (reads source neighbours)
//! 10  curves                   22  grain
//! 11  lift / gamma / gain      23  output LUT
//! 12  creative LUT             24  cinema filters  (reads source neighbours)
//! ```
//!
//! Every stage is a no-op at its neutral setting, so default parameters
//! reproduce the source exactly.

use crate::color_management::color_space::{clamp01, mix3};
use crate::color_management::transfer::apply_log_decode;
use crate::color_management::white_balance::apply_white_balance;
use crate::grading::curves::CurveLut;
use crate::grading::effects::{
    Halation, apply_acutance, apply_bloom, apply_diffusion, apply_fade, apply_vignette,
};
use crate::grading::film::{apply_crossover, apply_film, apply_tone_map};
use crate::grading::filters::CineFilter;
use crate::grading::grain::Grain;
use crate::grading::sliders::{
    apply_contrast, apply_exposure, apply_saturation, apply_spectral, apply_tonal_range,
    apply_vibrance,
};
use crate::grading::wheels::apply_wheels;
use crate::image::GradingImage;
use crate::transform::lut::Lut3D;
use crate::transform::params::ResolvedParams;

/// Everything one render needs per pixel, borrowed for the render's
/// duration. Shared read-only across worker threads.
pub struct PixelPipeline<'a> {
    params: &'a ResolvedParams,
    source: &'a GradingImage,
    curves: Option<&'a CurveLut>,
    input_lut: Option<&'a Lut3D>,
    creative_lut: Option<&'a Lut3D>,
    output_lut: Option<&'a Lut3D>,
    clamp_log: bool,
    halation: Halation,
    grain: Grain,
    filter: CineFilter,
    crossover_strength: f32,
    inv_size: [f32; 2],
}

/// Optional tables for a render.
#[derive(Clone, Copy, Default)]
pub struct PipelineLuts<'a> {
    pub curves: Option<&'a CurveLut>,
    pub input: Option<&'a Lut3D>,
    pub creative: Option<&'a Lut3D>,
    pub output: Option<&'a Lut3D>,
}

impl<'a> PixelPipeline<'a> {
    pub fn new(
        params: &'a ResolvedParams,
        source: &'a GradingImage,
        luts: PipelineLuts<'a>,
        clamp_log: bool,
        grain_seed: u32,
    ) -> Self {
        let p = params;
        Self {
            params,
            source,
            curves: luts.curves,
            input_lut: luts.input,
            creative_lut: luts.creative.filter(|_| p.lut_strength > 0.0),
            output_lut: luts.output,
            clamp_log,
            halation: Halation {
                amount: p.halation,
                tint: p.halation_color,
                threshold: p.halation_threshold,
                radius: p.halation_radius,
            },
            grain: Grain {
                amount: p.grain_amount,
                size: p.grain_size,
                roughness: p.grain_roughness,
                chromacity: p.grain_chromacity,
                highlights: p.grain_highlights,
                shadows: p.grain_shadows,
                seed: grain_seed,
            },
            filter: CineFilter {
                filter: p.filter_type,
                strength: p.filter_strength,
                glow_radius: p.filter_glow_radius,
                glow_threshold: p.filter_glow_threshold,
                sharpness: p.filter_sharpness,
                streak_angle: p.filter_streak_angle,
            },
            crossover_strength: if p.film.is_some() { p.film_strength } else { 1.0 },
            inv_size: [
                1.0 / source.width.max(1) as f32,
                1.0 / source.height.max(1) as f32,
            ],
        }
    }

    /// Names of the stages that will do work, for logging.
    pub fn active_stages(&self) -> Vec<&'static str> {
        let p = self.params;
        let checks = [
            ("adaptive", p.adaptive.is_some()),
            ("log", p.log_curve.is_some()),
            ("input_lut", self.input_lut.is_some()),
            ("exposure", p.exposure != 0.0),
            ("contrast", p.contrast != 0.0),
            (
                "tonal",
                p.highlights != 0.0 || p.shadows != 0.0 || p.whites != 0.0 || p.blacks != 0.0,
            ),
            ("white_balance", p.temperature != 0.0 || p.tint != 0.0),
            ("saturation", p.saturation != 0.0),
            ("vibrance", p.vibrance != 0.0),
            (
                "spectral",
                p.spectral_volume != 0.0 || p.spectral_luminance != 0.0 || p.spectral_hue != 0.0,
            ),
            ("curves", self.curves.is_some()),
            ("wheels", p.lift != [0.0; 3] || p.gamma != [0.0; 3] || p.gain != [0.0; 3]),
            ("creative_lut", self.creative_lut.is_some()),
            ("film", p.film.is_some() && p.film_strength > 0.0),
            ("tone_map", p.toe > 0.0 || p.shoulder > 0.0),
            ("crossover", p.crossover != [0.0; 3]),
            ("fade", p.fade > 0.0),
            ("bloom", p.bloom > 0.0),
            ("diffusion", p.diffusion > 0.0),
            ("halation", p.halation > 0.0),
            ("vignette", p.vignette > 0.0),
            ("acutance", p.acutance > 0.0),
            ("grain", self.grain.is_active()),
            ("output_lut", self.output_lut.is_some()),
            ("filter", self.filter.is_active()),
        ];
        checks.into_iter().filter(|(_, on)| *on).map(|(name, _)| name).collect()
    }

    /// Grade the source pixel at `(x, y)`. Output is clamped to [0, 1].
    pub fn evaluate(&self, x: u32, y: u32) -> [f32; 3] {
        let p = self.params;
        let mut c = self.source.sample_clamped(x as i64, y as i64);

        if let Some(transfer) = &p.adaptive {
            c = transfer.apply(c);
        }
        if let Some(curve) = p.log_curve {
            c = apply_log_decode(c, curve, self.clamp_log);
        }
        if let Some(lut) = self.input_lut {
            c = lut.sample(c);
        }

        c = apply_exposure(c, p.exposure);
        c = apply_contrast(c, p.contrast);
        c = apply_tonal_range(c, p.highlights, p.shadows, p.whites, p.blacks);
        c = apply_white_balance(c, p.temperature, p.tint);
        c = apply_saturation(c, p.saturation);
        c = apply_vibrance(c, p.vibrance);
        c = apply_spectral(c, p.spectral_volume, p.spectral_luminance, p.spectral_hue);
        if let Some(curves) = self.curves {
            c = curves.apply(c);
        }
        c = apply_wheels(c, p.lift, p.gamma, p.gain);

        if let Some(lut) = self.creative_lut {
            c = mix3(c, lut.sample(c), p.lut_strength);
        }

        if let Some(film) = p.film {
            c = apply_film(c, film, p.film_matrix, p.film_strength);
        }
        c = apply_tone_map(c, p.toe, p.shoulder);
        c = apply_crossover(c, p.crossover, self.crossover_strength);

        let uv = [
            (x as f32 + 0.5) * self.inv_size[0],
            (y as f32 + 0.5) * self.inv_size[1],
        ];
        c = apply_fade(c, p.fade);
        c = apply_bloom(c, p.bloom);
        c = apply_diffusion(c, p.diffusion);
        c = self.halation.apply(c, uv);
        c = apply_vignette(c, p.vignette, p.vignette_radius, uv);
        c = apply_acutance(c, self.source, x, y, p.acutance);
        c = self.grain.apply(c, x, y);

        if let Some(lut) = self.output_lut {
            c = lut.sample(c);
        }
        c = self.filter.apply(c, self.source, x, y);

        clamp01(c.map(|v| if v.is_nan() { 0.0 } else { v }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::registry::FilmType;
    use crate::image::{PixelBuffer, PixelFormat};
    use crate::transform::params::GradingParams;

    const EPSILON: f32 = 1e-6;

    fn single(rgb: [u8; 3]) -> GradingImage {
        GradingImage::from_buffer(&PixelBuffer::filled(1, 1, PixelFormat::Rgb8, rgb))
    }

    fn eval(params: &GradingParams, rgb: [u8; 3]) -> [f32; 3] {
        let resolved = ResolvedParams::new(params);
        let img = single(rgb);
        PixelPipeline::new(&resolved, &img, PipelineLuts::default(), true, 0).evaluate(0, 0)
    }

    #[test]
    fn test_default_params_pass_through() {
        let rgb = [12, 130, 251];
        let out = eval(&GradingParams::default(), rgb);
        for c in 0..3 {
            assert!(
                (out[c] - rgb[c] as f32 / 255.0).abs() < EPSILON,
                "channel {c}: {}",
                out[c]
            );
        }
    }

    #[test]
    fn test_default_params_have_no_active_stages() {
        let resolved = ResolvedParams::new(&GradingParams::default());
        let img = single([0, 0, 0]);
        let pipeline = PixelPipeline::new(&resolved, &img, PipelineLuts::default(), true, 0);
        assert!(pipeline.active_stages().is_empty(), "{:?}", pipeline.active_stages());
    }

    #[test]
    fn test_creative_lut_respects_strength() {
        let mut data = vec![0.0; 8 * 3];
        for v in data.iter_mut() {
            *v = 1.0;
        }
        let white = Lut3D::new(2, data).unwrap();
        let params = GradingParams {
            lut_strength: 50.0,
            ..GradingParams::default()
        };
        let resolved = ResolvedParams::new(&params);
        let img = single([0, 0, 0]);
        let luts = PipelineLuts {
            creative: Some(&white),
            ..PipelineLuts::default()
        };
        let out = PixelPipeline::new(&resolved, &img, luts, true, 0).evaluate(0, 0);
        assert!((out[0] - 0.5).abs() < EPSILON, "{out:?}");
    }

    #[test]
    fn test_output_lut_is_unconditional() {
        let inverted: Vec<f32> = Lut3D::identity(2).unwrap().data().iter().map(|v| 1.0 - v).collect();
        let lut = Lut3D::new(2, inverted).unwrap();
        let resolved = ResolvedParams::new(&GradingParams {
            lut_strength: 0.0,
            ..GradingParams::default()
        });
        let img = single([255, 0, 0]);
        let luts = PipelineLuts {
            output: Some(&lut),
            ..PipelineLuts::default()
        };
        let out = PixelPipeline::new(&resolved, &img, luts, true, 0).evaluate(0, 0);
        assert!((out[0] - 0.0).abs() < EPSILON && (out[1] - 1.0).abs() < EPSILON, "{out:?}");
    }

    #[test]
    fn test_crossover_without_film_runs_at_full_strength() {
        let mut params = GradingParams::default();
        params.crossover_shift.b = 100.0;
        let out = eval(&params, [0, 0, 0]);
        assert!((out[2] - 0.1).abs() < 1e-5, "blue: {}", out[2]);
    }

    #[test]
    fn test_film_strength_zero_leaves_colour() {
        let mut params = GradingParams::default();
        params.film_type = FilmType::Vivid50;
        params.film_strength = 0.0;
        let rgb = [40, 120, 200];
        let out = eval(&params, rgb);
        for c in 0..3 {
            assert!((out[c] - rgb[c] as f32 / 255.0).abs() < EPSILON, "channel {c}");
        }
    }
}
