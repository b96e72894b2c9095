//! Film stock emulation data: the stock registry and character presets.

pub mod presets;
pub mod registry;
