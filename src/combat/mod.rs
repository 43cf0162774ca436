//! Turn-loop scheduler, damage math, and the proc effect pipeline.

pub mod logic;
pub mod procs;
pub mod types;

pub use logic::*;
pub use procs::*;
pub use types::*;
