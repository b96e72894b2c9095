//! Image statistics for reference matching.
//!
//! One pass over the (optionally strided) pixels accumulates histograms,
//! Lab sums and sums of squares, tonal zone sums, and per-channel extrema.
//! The pass is a reduction: pixels are split into fixed chunks, each chunk
//! is accumulated independently (in parallel when large enough), and the
//! chunk accumulators are merged in chunk order. Integer counts and the
//! fixed merge order make the parallel result identical to a single pass.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::histogram::{Histogram, NormalizedHistogram, luminance_bin};
use crate::color_management::color_space::rgb_to_lab;
use crate::image::PixelBuffer;
use crate::transform::params::LabTriple;

/// Pixels per reduction chunk.
const CHUNK_PIXELS: usize = 16 * 1024;

/// Luminance below this bin counts as shadow.
const SHADOW_LIMIT: u8 = 64;
/// Luminance above this bin counts as highlight.
const HIGHLIGHT_LIMIT: u8 = 192;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f32,
    pub p50: f32,
    pub p95: f32,
}

/// Lab means and standard deviations (L on 0–100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabStats {
    pub mean_l: f32,
    pub mean_a: f32,
    pub mean_b: f32,
    pub std_l: f32,
    pub std_a: f32,
    pub std_b: f32,
}

impl LabStats {
    pub fn mean(&self) -> LabTriple {
        LabTriple {
            l: self.mean_l,
            a: self.mean_a,
            b: self.mean_b,
        }
    }

    pub fn std(&self) -> LabTriple {
        LabTriple {
            l: self.std_l,
            a: self.std_a,
            b: self.std_b,
        }
    }
}

/// Average colour of each tonal zone. Empty zones are (0, 0, 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Zones {
    pub shadows: Rgb,
    pub midtones: Rgb,
    pub highlights: Rgb,
}

/// Summary of an image's tonal and colour distribution.
///
/// Channel values are on the 0–255 scale. Every field defaults so that
/// hand-written or older profiles load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageStats {
    pub histogram: Histogram,
    pub percentiles: Percentiles,
    pub lab: LabStats,
    /// Lab L standard deviation.
    pub contrast: f32,
    /// `sqrt(std_a² + std_b²)`.
    pub saturation: f32,
    /// Lab b mean; positive is warm.
    pub color_temp: f32,
    /// `p95 − p5`.
    pub dynamic_range: f32,
    pub zones: Zones,
    pub average: Rgb,
    pub min: Rgb,
    pub max: Rgb,
    /// Rec. 709 luminance of the average colour.
    pub exposure: f32,
    /// Every `stride`-th pixel was sampled.
    pub stride: usize,
    pub pixel_count: u64,
}

/// How to sample an image for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Sample every Nth pixel (row-major). Values below 1 are treated as 1.
    pub stride: usize,
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            stride: 1,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ZoneSum {
    rgb: [u64; 3],
    count: u64,
}

impl ZoneSum {
    fn average(&self) -> Rgb {
        if self.count == 0 {
            return Rgb::default();
        }
        let n = self.count as f64;
        Rgb::new(
            (self.rgb[0] as f64 / n) as f32,
            (self.rgb[1] as f64 / n) as f32,
            (self.rgb[2] as f64 / n) as f32,
        )
    }
}

#[derive(Debug, Clone)]
struct Accumulator {
    histogram: Histogram,
    lab_sum: [f64; 3],
    lab_sq: [f64; 3],
    rgb_sum: [u64; 3],
    min: [u8; 3],
    max: [u8; 3],
    zones: [ZoneSum; 3],
    count: u64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            histogram: Histogram::default(),
            lab_sum: [0.0; 3],
            lab_sq: [0.0; 3],
            rgb_sum: [0; 3],
            min: [255; 3],
            max: [0; 3],
            zones: [ZoneSum::default(); 3],
            count: 0,
        }
    }
}

impl Accumulator {
    fn add(&mut self, rgb: [u8; 3]) {
        let lum = luminance_bin(rgb);
        self.histogram.add(rgb, lum);

        let lab = rgb_to_lab([rgb[0] as f32, rgb[1] as f32, rgb[2] as f32]);
        for c in 0..3 {
            let v = lab[c] as f64;
            self.lab_sum[c] += v;
            self.lab_sq[c] += v * v;
            self.rgb_sum[c] += rgb[c] as u64;
            self.min[c] = self.min[c].min(rgb[c]);
            self.max[c] = self.max[c].max(rgb[c]);
        }

        let zone = if lum < SHADOW_LIMIT {
            0
        } else if lum > HIGHLIGHT_LIMIT {
            2
        } else {
            1
        };
        let z = &mut self.zones[zone];
        for c in 0..3 {
            z.rgb[c] += rgb[c] as u64;
        }
        z.count += 1;
        self.count += 1;
    }

    fn merge(mut self, other: Accumulator) -> Self {
        self.histogram.merge(&other.histogram);
        for c in 0..3 {
            self.lab_sum[c] += other.lab_sum[c];
            self.lab_sq[c] += other.lab_sq[c];
            self.rgb_sum[c] += other.rgb_sum[c];
            self.min[c] = self.min[c].min(other.min[c]);
            self.max[c] = self.max[c].max(other.max[c]);
        }
        for (z, o) in self.zones.iter_mut().zip(other.zones) {
            for c in 0..3 {
                z.rgb[c] += o.rgb[c];
            }
            z.count += o.count;
        }
        self.count += other.count;
        self
    }

    fn finish(self, stride: usize) -> ImageStats {
        let n = self.count;
        if n == 0 {
            return ImageStats {
                histogram: self.histogram,
                stride,
                ..ImageStats::default()
            };
        }
        let nf = n as f64;

        let mean = self.lab_sum.map(|s| s / nf);
        let mut std = [0.0f64; 3];
        for c in 0..3 {
            let var = self.lab_sq[c] / nf - mean[c] * mean[c];
            std[c] = var.max(0.0).sqrt();
        }
        let lab = LabStats {
            mean_l: mean[0] as f32,
            mean_a: mean[1] as f32,
            mean_b: mean[2] as f32,
            std_l: std[0] as f32,
            std_a: std[1] as f32,
            std_b: std[2] as f32,
        };

        let avg = self.rgb_sum.map(|s| (s as f64 / nf) as f32);
        let percentiles = Percentiles {
            p5: self.histogram.percentile(0.05) as f32,
            p50: self.histogram.percentile(0.50) as f32,
            p95: self.histogram.percentile(0.95) as f32,
        };

        ImageStats {
            percentiles,
            lab,
            contrast: lab.std_l,
            saturation: (lab.std_a * lab.std_a + lab.std_b * lab.std_b).sqrt(),
            color_temp: lab.mean_b,
            dynamic_range: percentiles.p95 - percentiles.p5,
            zones: Zones {
                shadows: self.zones[0].average(),
                midtones: self.zones[1].average(),
                highlights: self.zones[2].average(),
            },
            average: Rgb::new(avg[0], avg[1], avg[2]),
            min: Rgb::new(self.min[0] as f32, self.min[1] as f32, self.min[2] as f32),
            max: Rgb::new(self.max[0] as f32, self.max[1] as f32, self.max[2] as f32),
            exposure: 0.2126 * avg[0] + 0.7152 * avg[1] + 0.0722 * avg[2],
            stride,
            pixel_count: n,
            histogram: self.histogram,
        }
    }
}

/// Accumulate one chunk of pixels starting at global pixel index `base`.
fn accumulate_chunk(buffer: &PixelBuffer, base: usize, count: usize, stride: usize) -> Accumulator {
    let mut acc = Accumulator::default();
    let width = buffer.width() as usize;
    let first = (stride - base % stride) % stride;
    let mut i = base + first;
    while i < base + count {
        acc.add(buffer.rgb_at((i % width) as u32, (i / width) as u32));
        i += stride;
    }
    acc
}

impl ImageStats {
    /// Analyze every pixel.
    pub fn analyze(buffer: &PixelBuffer) -> Self {
        Self::analyze_with(buffer, AnalysisOptions::default())
    }

    pub fn analyze_with(buffer: &PixelBuffer, options: AnalysisOptions) -> Self {
        let stride = options.stride.max(1);
        let total = buffer.len();
        let chunks: Vec<(usize, usize)> = (0..total)
            .step_by(CHUNK_PIXELS)
            .map(|base| (base, CHUNK_PIXELS.min(total - base)))
            .collect();

        let partials: Vec<Accumulator> = if options.parallel && chunks.len() > 1 {
            chunks
                .par_iter()
                .map(|&(base, count)| accumulate_chunk(buffer, base, count, stride))
                .collect()
        } else {
            chunks
                .iter()
                .map(|&(base, count)| accumulate_chunk(buffer, base, count, stride))
                .collect()
        };

        let stats = partials
            .into_iter()
            .fold(Accumulator::default(), Accumulator::merge)
            .finish(stride);

        tracing::debug!(
            width = buffer.width(),
            height = buffer.height(),
            stride,
            samples = stats.pixel_count,
            "analyzed image"
        );
        if stats.pixel_count > 0 && (stats.lab.std_l == 0.0 || stats.lab.std_a == 0.0 || stats.lab.std_b == 0.0) {
            tracing::warn!(?stats.lab, "zero-variance Lab channel; colour transfer will floor it");
        }
        stats
    }

    pub fn normalized_histogram(&self) -> NormalizedHistogram {
        self.histogram.normalized()
    }

    /// Luminance percentile at an arbitrary fraction (0–1).
    pub fn luminance_percentile(&self, fraction: f64) -> f32 {
        self.histogram.percentile(fraction) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;
    use approx::assert_abs_diff_eq;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
            }
        }
        PixelBuffer::new(width, height, PixelFormat::Rgba8, data).unwrap()
    }

    #[test]
    fn test_histogram_conserves_pixel_count() {
        let buf = gradient(37, 11);
        let stats = ImageStats::analyze(&buf);
        assert_eq!(stats.histogram.total(), 37 * 11);
        assert_eq!(stats.histogram.r.iter().map(|&c| c as u64).sum::<u64>(), 37 * 11);
        assert_eq!(stats.pixel_count, 37 * 11);
    }

    #[test]
    fn test_stride_samples_every_nth_pixel() {
        let buf = gradient(10, 10);
        let stats = ImageStats::analyze_with(
            &buf,
            AnalysisOptions {
                stride: 4,
                parallel: false,
            },
        );
        assert_eq!(stats.pixel_count, 25);
        assert_eq!(stats.stride, 4);
    }

    #[test]
    fn test_flat_gray_image() {
        let buf = PixelBuffer::filled(4, 4, PixelFormat::Rgb8, [128, 128, 128]);
        let stats = ImageStats::analyze(&buf);
        assert_eq!(stats.percentiles.p5, 128.0);
        assert_eq!(stats.percentiles.p95, 128.0);
        assert_eq!(stats.dynamic_range, 0.0);
        assert_abs_diff_eq!(stats.lab.std_l, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(stats.lab.mean_a, 0.0, epsilon = 0.05);
        assert_eq!(stats.zones.midtones, Rgb::new(128.0, 128.0, 128.0));
        assert_eq!(stats.zones.shadows, Rgb::default());
        assert_abs_diff_eq!(stats.exposure, 128.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zones_split_on_luminance() {
        let data = vec![10, 10, 10, 128, 128, 128, 250, 250, 250];
        let buf = PixelBuffer::new(3, 1, PixelFormat::Rgb8, data).unwrap();
        let stats = ImageStats::analyze(&buf);
        assert_eq!(stats.zones.shadows.r, 10.0);
        assert_eq!(stats.zones.midtones.r, 128.0);
        assert_eq!(stats.zones.highlights.r, 250.0);
        assert_eq!(stats.min.g, 10.0);
        assert_eq!(stats.max.b, 250.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let buf = gradient(300, 200);
        let seq = ImageStats::analyze_with(
            &buf,
            AnalysisOptions {
                stride: 3,
                parallel: false,
            },
        );
        let par = ImageStats::analyze_with(
            &buf,
            AnalysisOptions {
                stride: 3,
                parallel: true,
            },
        );
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_image() {
        let buf = PixelBuffer::new(0, 0, PixelFormat::Rgb8, Vec::new()).unwrap();
        let stats = ImageStats::analyze(&buf);
        assert_eq!(stats.pixel_count, 0);
        assert_eq!(stats.percentiles, Percentiles::default());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let buf = PixelBuffer::filled(2, 2, PixelFormat::Rgb8, [200, 100, 50]);
        let json = serde_json::to_string(&ImageStats::analyze(&buf)).unwrap();
        assert!(json.contains("\"meanL\""));
        assert!(json.contains("\"dynamicRange\""));
        assert!(json.contains("\"colorTemp\""));
    }
}
