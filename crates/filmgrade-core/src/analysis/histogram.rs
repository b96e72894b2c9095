//! RGB + luminance histograms on the 0–255 byte scale.

use serde::{Deserialize, Serialize};

/// Number of bins per channel.
pub const BINS: usize = 256;

/// Raw counts for R, G, B, and Rec. 709 luminance.
///
/// Histograms from disjoint pixel sets combine with [`Histogram::merge`],
/// which is element-wise addition and therefore order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Histogram {
    pub r: Vec<u32>,
    pub g: Vec<u32>,
    pub b: Vec<u32>,
    pub luminance: Vec<u32>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            r: vec![0; BINS],
            g: vec![0; BINS],
            b: vec![0; BINS],
            luminance: vec![0; BINS],
        }
    }
}

/// Histogram normalized so each channel sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHistogram {
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
    pub luminance: Vec<f32>,
}

/// Rec. 709 luminance of a byte pixel, rounded to a bin.
pub fn luminance_bin(rgb: [u8; 3]) -> u8 {
    let lum = 0.2126 * rgb[0] as f32 + 0.7152 * rgb[1] as f32 + 0.0722 * rgb[2] as f32;
    lum.round().min(255.0) as u8
}

impl Histogram {
    pub fn add(&mut self, rgb: [u8; 3], lum: u8) {
        self.r[rgb[0] as usize] += 1;
        self.g[rgb[1] as usize] += 1;
        self.b[rgb[2] as usize] += 1;
        self.luminance[lum as usize] += 1;
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (dst, src) in [
            (&mut self.r, &other.r),
            (&mut self.g, &other.g),
            (&mut self.b, &other.b),
            (&mut self.luminance, &other.luminance),
        ] {
            dst.resize(BINS.max(src.len()), 0);
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
    }

    /// Pixels counted in the luminance channel.
    pub fn total(&self) -> u64 {
        self.luminance.iter().map(|&c| c as u64).sum()
    }

    /// First luminance bin where the cumulative count reaches `fraction` of
    /// the total. Returns 0 for an empty histogram.
    pub fn percentile(&self, fraction: f64) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let target = total as f64 * fraction;
        let mut acc = 0u64;
        for (i, &count) in self.luminance.iter().enumerate().take(BINS) {
            acc += count as u64;
            if acc as f64 >= target {
                return i as u8;
            }
        }
        255
    }

    pub fn normalized(&self) -> NormalizedHistogram {
        let norm = |bins: &[u32]| {
            let total: u64 = bins.iter().map(|&c| c as u64).sum();
            if total == 0 {
                return vec![0.0; bins.len()];
            }
            bins.iter().map(|&c| (c as f64 / total as f64) as f32).collect()
        };
        NormalizedHistogram {
            r: norm(&self.r),
            g: norm(&self.g),
            b: norm(&self.b),
            luminance: norm(&self.luminance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_bin_extremes() {
        assert_eq!(luminance_bin([0, 0, 0]), 0);
        assert_eq!(luminance_bin([255, 255, 255]), 255);
        assert_eq!(luminance_bin([128, 128, 128]), 128);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut a = Histogram::default();
        a.add([10, 20, 30], 18);
        let mut b = Histogram::default();
        b.add([10, 0, 0], 2);
        a.merge(&b);
        assert_eq!(a.r[10], 2);
        assert_eq!(a.total(), 2);
    }

    #[test]
    fn test_percentiles_are_monotonic() {
        let mut h = Histogram::default();
        for v in 0..=255u8 {
            h.add([v, v, v], v);
        }
        let (p5, p50, p95) = (h.percentile(0.05), h.percentile(0.5), h.percentile(0.95));
        assert!(p5 <= p50 && p50 <= p95, "{p5} {p50} {p95}");
        assert_eq!(p50, 127);
    }

    #[test]
    fn test_empty_histogram_percentile_is_zero() {
        assert_eq!(Histogram::default().percentile(0.95), 0);
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let mut h = Histogram::default();
        h.add([1, 2, 3], 2);
        h.add([200, 100, 50], 115);
        h.add([0, 0, 0], 0);
        let n = h.normalized();
        let sum: f32 = n.luminance.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum = {sum}");
    }
}
