//! Warforge is a deterministic-by-injection combat and progression engine
//! for an equipment-driven RPG. It covers enhancement and sublimation rolls,
//! equipped-stat aggregation with station set bonuses, cooldown-gated item
//! effects, and a speed-scheduled battle loop with a structured log.
//!
//! Every probabilistic path takes `&mut impl Rng`, so callers seed their own
//! generator and replay outcomes exactly.

pub mod character;
pub mod combat;
pub mod core;
pub mod items;
pub mod progression;
