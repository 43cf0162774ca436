use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Body,
    Legs,
    Feet,
    Weapon,
    Accessory,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 6] = [
        EquipmentSlot::Head,
        EquipmentSlot::Body,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
        EquipmentSlot::Weapon,
        EquipmentSlot::Accessory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Head => "Head",
            EquipmentSlot::Body => "Body",
            EquipmentSlot::Legs => "Legs",
            EquipmentSlot::Feet => "Feet",
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Accessory => "Accessory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common = 0,
    Magic = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    Mythic = 5,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Magic => "Magic",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }
}

/// Flat stat record. Base stats on templates are sparse: a field left out of
/// the JSON stays zero and never scales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub max_hp: u32,
    #[serde(default)]
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub hit: u32,
    #[serde(default)]
    pub dodge: u32,
    #[serde(default)]
    pub crit: u32,
    #[serde(default)]
    pub crit_damage: u32,
    #[serde(default)]
    pub penetration: u32,
    #[serde(default)]
    pub true_damage: u32,
    #[serde(default)]
    pub guard: u32,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, other: &StatBlock) {
        self.max_hp += other.max_hp;
        self.attack += other.attack;
        self.defense += other.defense;
        self.speed += other.speed;
        self.hit += other.hit;
        self.dodge += other.dodge;
        self.crit += other.crit;
        self.crit_damage += other.crit_damage;
        self.penetration += other.penetration;
        self.true_damage += other.true_damage;
        self.guard += other.guard;
    }

    /// Per-field difference, saturating at zero.
    pub fn diff(&self, other: &StatBlock) -> StatBlock {
        StatBlock {
            max_hp: self.max_hp.saturating_sub(other.max_hp),
            attack: self.attack.saturating_sub(other.attack),
            defense: self.defense.saturating_sub(other.defense),
            speed: self.speed.saturating_sub(other.speed),
            hit: self.hit.saturating_sub(other.hit),
            dodge: self.dodge.saturating_sub(other.dodge),
            crit: self.crit.saturating_sub(other.crit),
            crit_damage: self.crit_damage.saturating_sub(other.crit_damage),
            penetration: self.penetration.saturating_sub(other.penetration),
            true_damage: self.true_damage.saturating_sub(other.true_damage),
            guard: self.guard.saturating_sub(other.guard),
        }
    }

    pub fn total(&self) -> u32 {
        self.max_hp
            + self.attack
            + self.defense
            + self.speed
            + self.hit
            + self.dodge
            + self.crit
            + self.crit_damage
            + self.penetration
            + self.true_damage
            + self.guard
    }
}

/// Moments in the turn loop at which conditional effects are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcTrigger {
    OnAttack,
    OnHit,
    OnCrit,
    OnKill,
    OnDefend,
    OnDodge,
    OnDamaged,
    OnTurnStart,
    OnBattleStart,
    OnBattleEnd,
}

/// Conditional effect kinds carried by equipment templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcEffectKind {
    DamageBonus,
    TrueDamage,
    HealPercent,
    ShieldGain,
    LifeSteal,
    Reflect,
    ReduceDefense,
    ReduceAttack,
    BoostAttack,
    BoostDefense,
    IgnoreDefense,
    IgnoreDodge,
    IgnoreShield,
    PenetrationBonus,
    CritBoost,
    CritDamageBoost,
    SpeedBoost,
    DodgeBoost,
    HitBoost,
    DamageReduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcConditionKind {
    HpBelow,
    HpAbove,
    EnemyHpBelow,
}

/// HP-fraction gate on an effect, e.g. `hp_below 0.3` fires only under 30% HP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcCondition {
    pub kind: ProcConditionKind,
    pub value: f64,
}

/// A conditional, probability-gated effect bound to one trigger moment.
///
/// Effects are defined statically on the equipment template and never mutate;
/// only the cooldown timestamp tracked by the proc engine changes between
/// evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcEffect {
    pub id: u32,
    pub trigger: ProcTrigger,
    pub kind: ProcEffectKind,
    pub value: f64,
    #[serde(default)]
    pub value2: Option<f64>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub cooldown_secs: Option<f64>,
    #[serde(default)]
    pub condition: Option<ProcCondition>,
    pub chance: f64,
}

/// Immutable equipment content. Instances reference templates by id and never
/// copy or mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentTemplate {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlot,
    pub rarity: Rarity,
    /// Content-grouping id used for set bonuses; unrelated to slot.
    pub station_number: u32,
    pub base_stats: StatBlock,
    #[serde(default)]
    pub effects: Vec<ProcEffect>,
}

/// Mutable per-player equipment state. Owns its own position on both
/// progression tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInstance {
    pub instance_id: Uuid,
    pub template_id: String,
    pub enhance_level: u8,
    pub sublimation_level: u8,
    pub equipped: bool,
}

impl EquipmentInstance {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            template_id: template_id.into(),
            enhance_level: 0,
            sublimation_level: 0,
            equipped: false,
        }
    }
}
