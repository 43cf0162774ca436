use serde::{Deserialize, Serialize};

use super::derived_stats::DerivedStats;
use crate::core::constants::{XP_CURVE_BASE, XP_CURVE_EXPONENT};
use crate::items::{Equipment, StatBlock, TemplateRegistry};

/// Experience needed to advance from `level` to `level + 1`.
pub fn xp_to_next_level(level: u32) -> u64 {
    (XP_CURVE_BASE * (level as f64).powf(XP_CURVE_EXPONENT)) as u64
}

/// Player combatant: totals derive from the base block plus equipped-item
/// aggregation. HP is clamped to `[0, total max HP]` at every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: u32,
    pub exp: u64,
    pub base_stats: StatBlock,
    pub current_hp: u32,
    pub equipment: Equipment,
}

impl Player {
    pub fn new(name: impl Into<String>, base_stats: StatBlock) -> Self {
        Self {
            name: name.into(),
            level: 1,
            exp: 0,
            base_stats,
            current_hp: base_stats.max_hp,
            equipment: Equipment::new(),
        }
    }

    /// Recomputes totals on demand; never cached across equipment mutations.
    pub fn derived(&self, registry: &TemplateRegistry) -> DerivedStats {
        DerivedStats::calculate(&self.base_stats, &self.equipment.equipped_views(registry))
    }

    pub fn total_max_hp(&self, registry: &TemplateRegistry) -> u32 {
        self.derived(registry).max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Writes HP through the clamp: floored at zero by the type, capped at
    /// the current total max.
    pub fn set_hp(&mut self, hp: u32, registry: &TemplateRegistry) {
        self.current_hp = hp.min(self.total_max_hp(registry));
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32, registry: &TemplateRegistry) {
        self.set_hp(self.current_hp.saturating_add(amount), registry);
    }

    /// Leveling hook for battle rewards. Returns the number of levels gained.
    pub fn add_exp(&mut self, amount: u64) -> u32 {
        self.exp += amount;
        let mut gained = 0;
        loop {
            let needed = xp_to_next_level(self.level);
            if self.exp < needed {
                break;
            }
            self.exp -= needed;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
