//! Filmgrade Core: the colour grading engine.
//!
//! Everything here is pure computation over in-memory pixel buffers: colour
//! science, the grading stage chain, film emulation, LUTs, and image
//! statistics. Decoding and encoding image files is left to the caller.

#[macro_use]
mod macros;

pub mod analysis;
pub mod color_management;
pub mod error;
pub mod film;
pub mod grading;
pub mod image;
pub mod transform;

// Re-exports for convenience.
pub use analysis::profile::{FilmSettings, ReferenceProfile};
pub use analysis::stats::{AnalysisOptions, ImageStats};
pub use error::{GradeError, GradeResult};
pub use film::presets::FilmPreset;
pub use film::registry::FilmType;
pub use grading::curves::{CurvePoint, CurvesData};
pub use image::{GradingImage, PixelBuffer, PixelFormat};
pub use transform::context::{RenderContext, RenderOptions};
pub use transform::lut::Lut3D;
pub use transform::params::{FilterType, GradingParams, LogProfile};
