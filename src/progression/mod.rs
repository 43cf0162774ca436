//! Probabilistic enhancement and sublimation tracks.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
