//! Transform pipeline: parameter definitions, per-pixel evaluation, the
//! render context, and 3D LUTs.

pub mod context;
pub mod evaluate;
pub mod lut;
pub mod params;
