//! Colour management: colour space conversions, camera log decoding, and
//! white balance.

pub mod color_space;
pub mod transfer;
pub mod white_balance;
