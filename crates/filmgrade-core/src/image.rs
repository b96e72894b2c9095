//! Pixel buffers for the grading pipeline.
//!
//! `PixelBuffer` is the interchange format: row-major, interleaved, 8 bits
//! per channel, RGB or RGBA. `GradingImage` is the float view the pipeline
//! samples from (normalized to [0, 1], alpha kept as the source byte).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GradeError, GradeResult};

/// Channel layout of an 8-bit pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 3 bytes per pixel.
    Rgb8,
    /// 4 bytes per pixel; alpha passes through every stage untouched.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb8 => write!(f, "RGB8"),
            Self::Rgba8 => write!(f, "RGBA8"),
        }
    }
}

/// Row-major interleaved 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw bytes, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> GradeResult<Self> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(GradeError::BufferLength {
                width,
                height,
                format,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// A buffer filled with one colour. Alpha (if any) is opaque.
    pub fn filled(width: u32, height: u32, format: PixelFormat, rgb: [u8; 3]) -> Self {
        let px: &[u8] = match format {
            PixelFormat::Rgb8 => &[rgb[0], rgb[1], rgb[2]],
            PixelFormat::Rgba8 => &[rgb[0], rgb[1], rgb[2], 255],
        };
        let data = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            format,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the RGB part of every pixel.
    pub fn rgb_pixels(&self) -> Box<dyn Iterator<Item = [u8; 3]> + '_> {
        match self.format {
            PixelFormat::Rgb8 => Box::new(bytemuck::cast_slice::<u8, [u8; 3]>(&self.data).iter().copied()),
            PixelFormat::Rgba8 => Box::new(
                bytemuck::cast_slice::<u8, [u8; 4]>(&self.data)
                    .iter()
                    .map(|p| [p[0], p[1], p[2]]),
            ),
        }
    }

    /// RGB bytes of the pixel at `(x, y)`.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let ch = self.format.channels();
        let i = (y as usize * self.width as usize + x as usize) * ch;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Float view of a source buffer, normalized to [0, 1].
///
/// Kept immutable for the whole render: neighbour-sampling stages read
/// from here, never from partially graded output.
#[derive(Debug, Clone)]
pub struct GradingImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB in [0, 1], row-major.
    pub pixels: Vec<[f32; 3]>,
}

impl GradingImage {
    /// Normalize an 8-bit buffer.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let pixels = buffer
            .rgb_pixels()
            .map(|p| [p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0])
            .collect();
        Self {
            width: buffer.width(),
            height: buffer.height(),
            pixels,
        }
    }

    /// Sample with clamp-to-edge addressing.
    pub fn sample_clamped(&self, x: i64, y: i64) -> [f32; 3] {
        if self.pixels.is_empty() {
            return [0.0; 3];
        }
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[cy * self.width as usize + cx]
    }
}

/// Quantize a normalized channel value to a byte.
pub fn quantize(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = PixelBuffer::new(2, 2, PixelFormat::Rgba8, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            GradeError::BufferLength {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_rgb_pixels_skips_alpha() {
        let buf = PixelBuffer::new(2, 1, PixelFormat::Rgba8, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let px: Vec<[u8; 3]> = buf.rgb_pixels().collect();
        assert_eq!(px, vec![[1, 2, 3], [5, 6, 7]]);
    }

    #[test]
    fn test_byte_roundtrip_is_exact() {
        for b in 0..=255u8 {
            assert_eq!(quantize(b as f32 / 255.0), b, "byte {b}");
        }
    }

    #[test]
    fn test_sample_clamped_edges() {
        let buf = PixelBuffer::new(2, 1, PixelFormat::Rgb8, vec![0, 0, 0, 255, 255, 255]).unwrap();
        let img = GradingImage::from_buffer(&buf);
        assert_eq!(img.sample_clamped(-5, 0), [0.0; 3]);
        assert_eq!(img.sample_clamped(9, 3), [1.0; 3]);
    }

    #[test]
    fn test_quantize_nan_is_black() {
        assert_eq!(quantize(f32::NAN), 0);
    }
}
