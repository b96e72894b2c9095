//! Image statistics, Reinhard colour transfer, and reference profiles.

pub mod histogram;
pub mod profile;
pub mod reinhard;
pub mod stats;
