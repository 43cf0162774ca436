use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::*;
use crate::items::{Rarity, StatBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Enhancement,
    Sublimation,
}

/// A level-indexed progression table. `success_rates[level]` is the chance of
/// moving from `level` to `level + 1`; `costs[level]` is the resource price of
/// that attempt.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionTrack {
    pub kind: TrackKind,
    pub success_rates: &'static [f64],
    pub costs: &'static [u32],
    pub max_level: u8,
    pub downgrade_threshold: u8,
}

/// Enhancement track as applied to equipment (cap 15).
pub fn equipment_enhancement() -> ProgressionTrack {
    ProgressionTrack {
        kind: TrackKind::Enhancement,
        success_rates: &ENHANCE_SUCCESS_RATES[..ENHANCE_MAX_LEVEL_EQUIPMENT as usize],
        costs: &ENHANCE_COSTS[..ENHANCE_MAX_LEVEL_EQUIPMENT as usize],
        max_level: ENHANCE_MAX_LEVEL_EQUIPMENT,
        downgrade_threshold: ENHANCE_DOWNGRADE_THRESHOLD,
    }
}

/// Enhancement track as applied by the forge path (cap 20). Kept separate
/// from the equipment cap on purpose; see core::constants.
pub fn forge_enhancement() -> ProgressionTrack {
    ProgressionTrack {
        kind: TrackKind::Enhancement,
        success_rates: &ENHANCE_SUCCESS_RATES[..ENHANCE_MAX_LEVEL_FORGE as usize],
        costs: &ENHANCE_COSTS[..ENHANCE_MAX_LEVEL_FORGE as usize],
        max_level: ENHANCE_MAX_LEVEL_FORGE,
        downgrade_threshold: ENHANCE_DOWNGRADE_THRESHOLD,
    }
}

/// Sublimation track with the flat cap of 10.
pub fn sublimation() -> ProgressionTrack {
    ProgressionTrack {
        kind: TrackKind::Sublimation,
        success_rates: &SUBLIMATION_SUCCESS_RATES[..SUBLIMATION_MAX_LEVEL as usize],
        costs: &SUBLIMATION_COSTS[..SUBLIMATION_MAX_LEVEL as usize],
        max_level: SUBLIMATION_MAX_LEVEL,
        downgrade_threshold: SUBLIMATION_DOWNGRADE_THRESHOLD,
    }
}

/// Rarity-keyed sublimation cap, 10 at Common up to 13 at Mythic.
pub fn sublimation_cap_for_rarity(rarity: Rarity) -> u8 {
    match rarity {
        Rarity::Common | Rarity::Magic => 10,
        Rarity::Rare => 11,
        Rarity::Epic | Rarity::Legendary => 12,
        Rarity::Mythic => 13,
    }
}

/// Sublimation track with the rarity-keyed cap. Coexists with the flat-cap
/// track; callers choose which path they are on.
pub fn sublimation_for_rarity(rarity: Rarity) -> ProgressionTrack {
    let cap = sublimation_cap_for_rarity(rarity);
    ProgressionTrack {
        kind: TrackKind::Sublimation,
        success_rates: &SUBLIMATION_SUCCESS_RATES[..cap as usize],
        costs: &SUBLIMATION_COSTS[..cap as usize],
        max_level: cap,
        downgrade_threshold: SUBLIMATION_DOWNGRADE_THRESHOLD,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptResultKind {
    Success,
    Failure,
    FailureDowngrade,
}

/// Outcome of one progression roll. The caller commits `new_level` onto the
/// instance only after the resource debit went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub success: bool,
    pub result: AttemptResultKind,
    pub new_level: u8,
    pub downgraded: bool,
    pub used_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("already at max level")]
    AtMaxLevel,
    #[error("no progression config for level {0}")]
    NoConfig(u8),
    #[error("insufficient resource: need {needed}, have {available}")]
    InsufficientResource { needed: u32, available: u32 },
}

/// Non-mutating affordability and odds report for the next attempt.
/// `stat_gain` is filled by the item-level query and absent from the
/// level-only one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPreview {
    pub can_attempt: bool,
    pub reason: Option<String>,
    pub current_level: u8,
    pub target_level: u8,
    pub success_rate: f64,
    pub cost: u32,
    pub has_enough_resource: bool,
    #[serde(default)]
    pub stat_gain: Option<StatBlock>,
}

/// Per-level stat multiplier of the enhancement track (linear).
pub fn enhance_multiplier(level: u8) -> f64 {
    1.0 + level as f64 * ENHANCE_BONUS_PER_LEVEL
}

/// Per-level stat multiplier of the sublimation track (exponential).
pub fn sublimation_multiplier(level: u8) -> f64 {
    SUBLIMATION_SCALING_BASE.powi(level as i32)
}

/// Combined multiplier an item applies to its non-zero base stats.
pub fn item_multiplier(enhance_level: u8, sublimation_level: u8) -> f64 {
    enhance_multiplier(enhance_level) * sublimation_multiplier(sublimation_level)
}

/// Display prefix for an enhanced item, e.g. "+5 " (empty at +0).
pub fn enhancement_prefix(level: u8) -> String {
    if level == 0 {
        String::new()
    } else {
        format!("+{} ", level)
    }
}
