//! Grading stages: sliders, wheels, curves, film emulation, optical
//! effects, grain, cinematography filters, and automatic adjustments.

pub mod auto_balance;
pub mod curves;
pub mod effects;
pub mod film;
pub mod filters;
pub mod grain;
pub mod sliders;
pub mod wheels;
