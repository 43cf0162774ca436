//! Tuning tables and formula constants.

pub mod constants;

pub use constants::*;
