//! Render context: the loaded LUTs, the curve table cache, and engine
//! options, passed explicitly to every render.
//!
//! ```ignore
//! let ctx = RenderContext::new(RenderOptions::default())
//!     .with_creative_lut(Arc::new(Lut3D::load_cube(path)?));
//! let graded = ctx.render(&source, &params)?;
//! ```
//!
//! `render` takes `&self`, so one context can serve several threads. The
//! curve table is rebuilt only when the curves value changes.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GradeResult;
use crate::grading::curves::{CurveLut, CurvesData};
use crate::image::{GradingImage, PixelBuffer, quantize};
use crate::transform::evaluate::{PipelineLuts, PixelPipeline};
use crate::transform::lut::Lut3D;
use crate::transform::params::{GradingParams, ResolvedParams};

/// Below this many pixels the render stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// Engine switches that are not part of a look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Keep log-decoded values above 1.0 until the final clamp.
    pub log_headroom: bool,
    /// Grain pattern seed.
    pub grain_seed: f32,
    /// Use the rayon pool for large images.
    pub parallel: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            log_headroom: false,
            grain_seed: 0.0,
            parallel: true,
        }
    }
}

/// The baked curve table for the last curves value seen.
#[derive(Default)]
struct CurveCache {
    curves: Option<CurvesData>,
    /// `None` when the cached curves are the identity.
    lut: Option<Arc<CurveLut>>,
    generation: u64,
}

pub struct RenderContext {
    options: RenderOptions,
    input_lut: Option<Arc<Lut3D>>,
    creative_lut: Option<Arc<Lut3D>>,
    output_lut: Option<Arc<Lut3D>>,
    curve_cache: RwLock<CurveCache>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl RenderContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            input_lut: None,
            creative_lut: None,
            output_lut: None,
            curve_cache: RwLock::new(CurveCache::default()),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Camera input transform, applied after log decode.
    pub fn with_input_lut(mut self, lut: Arc<Lut3D>) -> Self {
        self.input_lut = Some(lut);
        self
    }

    /// Creative LUT, blended by `lutStrength`.
    pub fn with_creative_lut(mut self, lut: Arc<Lut3D>) -> Self {
        self.creative_lut = Some(lut);
        self
    }

    /// Display transform, applied at full strength.
    pub fn with_output_lut(mut self, lut: Arc<Lut3D>) -> Self {
        self.output_lut = Some(lut);
        self
    }

    pub fn set_input_lut(&mut self, lut: Option<Arc<Lut3D>>) {
        self.input_lut = lut;
    }

    pub fn set_creative_lut(&mut self, lut: Option<Arc<Lut3D>>) {
        self.creative_lut = lut;
    }

    pub fn set_output_lut(&mut self, lut: Option<Arc<Lut3D>>) {
        self.output_lut = lut;
    }

    /// How many times the curve table has been rebuilt.
    pub fn curve_generation(&self) -> u64 {
        self.curve_cache.read().generation
    }

    /// The baked curve table for `curves`, rebuilding only on change.
    fn curve_lut(&self, curves: &CurvesData) -> Option<Arc<CurveLut>> {
        {
            let cache = self.curve_cache.read();
            if cache.curves.as_ref() == Some(curves) {
                return cache.lut.clone();
            }
        }

        let mut cache = self.curve_cache.write();
        // Another thread may have rebuilt while we waited.
        if cache.curves.as_ref() == Some(curves) {
            return cache.lut.clone();
        }
        let lut = if curves.is_identity() {
            None
        } else {
            Some(Arc::new(CurveLut::bake(curves)))
        };
        cache.curves = Some(curves.clone());
        cache.lut = lut.clone();
        cache.generation += 1;
        tracing::debug!(generation = cache.generation, identity = lut.is_none(), "rebuilt curve table");
        lut
    }

    /// Grade `source` with `params`.
    ///
    /// Fails only on malformed curves, before any pixel is written. Alpha
    /// is copied through untouched.
    pub fn render(&self, source: &PixelBuffer, params: &GradingParams) -> GradeResult<PixelBuffer> {
        params.curves.validate()?;

        let resolved = ResolvedParams::new(params);
        let curves = self.curve_lut(&params.curves);
        let image = GradingImage::from_buffer(source);
        let luts = PipelineLuts {
            curves: curves.as_deref(),
            input: self.input_lut.as_deref(),
            creative: self.creative_lut.as_deref(),
            output: self.output_lut.as_deref(),
        };
        let pipeline = PixelPipeline::new(
            &resolved,
            &image,
            luts,
            !self.options.log_headroom,
            self.options.grain_seed.to_bits(),
        );

        let mut output = source.clone();
        if source.is_empty() {
            return Ok(output);
        }

        let active = pipeline.active_stages();
        tracing::debug!(
            width = source.width(),
            height = source.height(),
            format = %source.format(),
            stages = ?active,
            "rendering"
        );
        if active.is_empty() {
            return Ok(output);
        }

        let channels = source.format().channels();
        let row_len = source.width() as usize * channels;
        let grade_row = |(y, row): (usize, &mut [u8])| {
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                let rgb = pipeline.evaluate(x as u32, y as u32);
                px[0] = quantize(rgb[0]);
                px[1] = quantize(rgb[1]);
                px[2] = quantize(rgb[2]);
            }
        };

        let data = output.data_mut();
        if self.options.parallel && source.len() >= PARALLEL_THRESHOLD {
            data.par_chunks_mut(row_len).enumerate().for_each(grade_row);
        } else {
            data.chunks_mut(row_len).enumerate().for_each(grade_row);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::curves::CurvePoint;
    use crate::image::PixelFormat;

    fn noise_image(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        let mut state = 12345u32;
        for _ in 0..width * height {
            for _ in 0..3 {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                data.push((state >> 16) as u8);
            }
            data.push(77);
        }
        PixelBuffer::new(width, height, PixelFormat::Rgba8, data).unwrap()
    }

    fn graded_params() -> GradingParams {
        GradingParams {
            exposure: 20.0,
            contrast: 15.0,
            grain_amount: 40.0,
            acutance: 30.0,
            vignette: 50.0,
            ..GradingParams::default()
        }
    }

    #[test]
    fn test_alpha_passes_through() {
        let src = noise_image(8, 8);
        let out = RenderContext::default().render(&src, &graded_params()).unwrap();
        for (a, b) in src.data().chunks(4).zip(out.data().chunks(4)) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let src = noise_image(96, 64);
        let params = graded_params();
        let par = RenderContext::default().render(&src, &params).unwrap();
        let seq = RenderContext::new(RenderOptions {
            parallel: false,
            ..RenderOptions::default()
        })
        .render(&src, &params)
        .unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_curve_table_is_cached_by_value() {
        let ctx = RenderContext::default();
        let src = noise_image(4, 4);
        let mut params = GradingParams::default();
        params.curves.rgb = vec![
            CurvePoint::new(0.0, 0.0),
            CurvePoint::new(128.0, 160.0),
            CurvePoint::new(255.0, 255.0),
        ];
        ctx.render(&src, &params).unwrap();
        ctx.render(&src, &params).unwrap();
        assert_eq!(ctx.curve_generation(), 1);
        params.curves.rgb[1].y = 150.0;
        ctx.render(&src, &params).unwrap();
        assert_eq!(ctx.curve_generation(), 2);
    }

    #[test]
    fn test_invalid_curves_fail_before_render() {
        let mut params = GradingParams::default();
        params.curves.red = vec![CurvePoint::new(0.0, 0.0)];
        assert!(RenderContext::default().render(&noise_image(2, 2), &params).is_err());
    }

    #[test]
    fn test_grain_seed_changes_output() {
        let src = PixelBuffer::filled(16, 16, PixelFormat::Rgb8, [128, 128, 128]);
        let params = GradingParams {
            grain_amount: 100.0,
            ..GradingParams::default()
        };
        let a = RenderContext::default().render(&src, &params).unwrap();
        let b = RenderContext::new(RenderOptions {
            grain_seed: 1.5,
            ..RenderOptions::default()
        })
        .render(&src, &params)
        .unwrap();
        assert_ne!(a, b);
    }
}
