//! Equipment content: templates, instances, slots, and proc effect data.

pub mod equipment;
pub mod types;

pub use equipment::*;
pub use types::*;
