// Turn scheduling
pub const TURN_CAP: u32 = 100;
pub const ACTION_TIME_BASE: f64 = 100.0;

// Hit resolution
pub const HIT_RATE_MIN: f64 = 10.0;
pub const HIT_RATE_MAX: f64 = 90.0;
pub const DODGE_WEIGHT: f64 = 0.8;

// Crit resolution
pub const CRIT_GUARD_SCALING: f64 = 1.5;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;
pub const CRIT_DAMAGE_DIVISOR: f64 = 100.0;

// Damage mitigation: reduction = def / (def + level * FACTOR + OFFSET)
pub const DEFENSE_LEVEL_FACTOR: f64 = 100.0;
pub const DEFENSE_BASE_OFFSET: f64 = 500.0;
pub const MIN_DAMAGE: u32 = 1;

// Enemy record defaults for optional stats
pub const DEFAULT_GUARD: u32 = 5;
pub const DEFAULT_CRIT_DAMAGE: u32 = 50;

// Item scaling per progression level
pub const ENHANCE_BONUS_PER_LEVEL: f64 = 0.1;
pub const SUBLIMATION_SCALING_BASE: f64 = 1.2;

// Enhancement track. Success rates are indexed by the current level and are
// non-increasing; stone costs are non-decreasing. Failure below the downgrade
// threshold keeps the level; at or above it the level drops by one.
pub const ENHANCE_DOWNGRADE_THRESHOLD: u8 = 5;

// Two enhancement caps exist side by side: the equipment path stops at 15,
// the forge path at 20. They have never agreed in the source material, so
// both are kept as distinct named configurations. Do not unify without a
// product decision.
pub const ENHANCE_MAX_LEVEL_EQUIPMENT: u8 = 15;
pub const ENHANCE_MAX_LEVEL_FORGE: u8 = 20;

pub const ENHANCE_SUCCESS_RATES: [f64; 20] = [
    1.00, 1.00, 1.00, 0.90, 0.80, // +0-4
    0.70, 0.60, 0.50, 0.45, 0.40, // +5-9
    0.35, 0.30, 0.25, 0.20, 0.15, // +10-14
    0.12, 0.10, 0.08, 0.06, 0.05, // +15-19 (forge path only)
];

pub const ENHANCE_COSTS: [u32; 20] = [
    1, 1, 1, 2, 2, //
    3, 3, 4, 5, 6, //
    8, 10, 12, 15, 20, //
    25, 30, 40, 50, 60,
];

// Sublimation track. The success curve collapses geometrically; costs double
// per level and are paid from a regenerating pool.
pub const SUBLIMATION_DOWNGRADE_THRESHOLD: u8 = 3;

// Same story as the enhancement caps: one path hardcodes 10, the other keys
// the cap off rarity up to 13. Both are preserved.
pub const SUBLIMATION_MAX_LEVEL: u8 = 10;

pub const SUBLIMATION_SUCCESS_RATES: [f64; 13] = [
    0.80, 0.56, 0.39, 0.27, 0.19, 0.13, 0.09, 0.06, 0.04, 0.03, 0.02, 0.015, 0.01,
];

pub const SUBLIMATION_COSTS: [u32; 13] = [
    10, 20, 40, 80, 160, 320, 640, 1280, 2560, 5120, 10240, 20480, 40960,
];

// Set bonuses are keyed by absolute station-number range, not by a per-item
// piece requirement. Each tuple is (station_lo, station_hi, pieces_required,
// percent_bonus).
pub const SET_BONUS_ATTACK: (u32, u32, usize, f64) = (1, 8, 2, 0.05);
pub const SET_BONUS_DEFENSE: (u32, u32, usize, f64) = (9, 16, 3, 0.10);
pub const SET_BONUS_HP: (u32, u32, usize, f64) = (17, 24, 4, 0.15);
pub const SET_BONUS_ALL: (u32, u32, usize, f64) = (25, 32, 6, 0.20);

// Player leveling curve: xp to reach the next level from `level`.
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;
