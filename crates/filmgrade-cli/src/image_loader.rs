//! Image decoding and encoding between files and `PixelBuffer`.

use std::path::Path;

use filmgrade_core::image::{PixelBuffer, PixelFormat};

/// Load an image from disk as 8-bit RGB or RGBA.
///
/// Supports the formats the `image` crate decodes (PNG, JPEG, TIFF, ...).
/// Images with alpha keep it; everything else becomes RGB8. Higher bit
/// depths are reduced to 8 bits.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let buffer = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        PixelBuffer::new(w, h, PixelFormat::Rgba8, rgba.into_raw())
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        PixelBuffer::new(w, h, PixelFormat::Rgb8, rgb.into_raw())
    }
    .map_err(ImageLoadError::Buffer)?;

    tracing::info!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        format = %buffer.format(),
        "loaded image"
    );
    Ok(buffer)
}

/// Write a buffer; the file format follows the extension.
pub fn save_image(path: &Path, buffer: &PixelBuffer) -> Result<(), ImageLoadError> {
    let color = match buffer.format() {
        PixelFormat::Rgb8 => image::ExtendedColorType::Rgb8,
        PixelFormat::Rgba8 => image::ExtendedColorType::Rgba8,
    };
    image::save_buffer(path, buffer.data(), buffer.width(), buffer.height(), color)
        .map_err(ImageLoadError::Encode)?;
    tracing::info!(path = %path.display(), "saved image");
    Ok(())
}

/// Errors that can occur during image loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("decoded image is inconsistent: {0}")]
    Buffer(filmgrade_core::GradeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        let data = vec![10, 20, 30, 40, 50, 60, 70, 80];
        let buf = PixelBuffer::new(2, 1, PixelFormat::Rgba8, data).unwrap();
        save_image(&path, &buf).unwrap();
        assert_eq!(load_image(&path).unwrap(), buf);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_image(Path::new("/nonexistent/definitely-missing.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode(_)));
    }
}
