//! Error types for the grading engine.

/// Result alias used across the crate.
pub type GradeResult<T> = Result<T, GradeError>;

/// Errors raised at construction and parse boundaries.
///
/// Rendering itself does not fail once its inputs have been validated;
/// every variant here is reported before any output pixel is written.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("invalid LUT size {0}: must be between 1 and 256")]
    LutSize(usize),

    #[error("LUT data length mismatch: size {size} needs {expected} values, got {actual}")]
    LutDataLength {
        size: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cube parse error at line {line}: {message}")]
    CubeParse { line: usize, message: String },

    #[error("curve '{channel}' has {count} points, expected {min} to {max}")]
    CurvePointCount {
        channel: &'static str,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("curve '{channel}' is invalid: {message}")]
    InvalidCurve {
        channel: &'static str,
        message: String,
    },

    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    ParamOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("invalid colour '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("pixel buffer length mismatch: {width}x{height} {format} needs {expected} bytes, got {actual}")]
    BufferLength {
        width: u32,
        height: u32,
        format: crate::image::PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("invalid thumbnail: {0}")]
    Thumbnail(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
