//! Player combatant and stat aggregation.

pub mod derived_stats;
pub mod player;

pub use derived_stats::*;
pub use player::*;
