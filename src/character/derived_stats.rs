use std::collections::HashMap;

use crate::core::constants::*;
use crate::items::{EquipmentTemplate, ItemView, StatBlock};
use crate::progression::item_multiplier;

/// Which stats a set bonus touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBonusTarget {
    Attack,
    Defense,
    MaxHp,
    AllStats,
}

/// An active set bonus: a percent applied to the aggregated totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetBonus {
    pub target: SetBonusTarget,
    pub percent: f64,
}

/// Set-bonus rule: the pieces-required threshold and the bonus both depend on
/// the numeric range the station number falls in, not on any per-item field.
/// That mirrors the original content tables; keep the rule in this one place
/// so it can be corrected without touching callers.
pub fn set_bonus_for_station(station: u32, count: usize) -> Option<SetBonus> {
    let rules = [
        (SET_BONUS_ATTACK, SetBonusTarget::Attack),
        (SET_BONUS_DEFENSE, SetBonusTarget::Defense),
        (SET_BONUS_HP, SetBonusTarget::MaxHp),
        (SET_BONUS_ALL, SetBonusTarget::AllStats),
    ];
    for ((lo, hi, pieces, percent), target) in rules {
        if (lo..=hi).contains(&station) && count >= pieces {
            return Some(SetBonus { target, percent });
        }
    }
    None
}

/// One item's contribution to the aggregate, floored per stat. Zero base
/// stats stay exactly zero regardless of level.
pub fn item_stat_block(
    template: &EquipmentTemplate,
    enhance_level: u8,
    sublimation_level: u8,
) -> StatBlock {
    let mult = item_multiplier(enhance_level, sublimation_level);
    let base = &template.base_stats;
    let scale = |v: u32| (v as f64 * mult).floor() as u32;
    StatBlock {
        max_hp: scale(base.max_hp),
        attack: scale(base.attack),
        defense: scale(base.defense),
        speed: scale(base.speed),
        hit: scale(base.hit),
        dodge: scale(base.dodge),
        crit: scale(base.crit),
        crit_damage: scale(base.crit_damage),
        penetration: scale(base.penetration),
        true_damage: scale(base.true_damage),
        guard: scale(base.guard),
    }
}

// f64 running totals; flooring happens once per stat on output so per-item
// fractions are not lost before set bonuses apply.
#[derive(Debug, Clone, Copy, Default)]
struct StatAccum {
    max_hp: f64,
    attack: f64,
    defense: f64,
    speed: f64,
    hit: f64,
    dodge: f64,
    crit: f64,
    crit_damage: f64,
    penetration: f64,
    true_damage: f64,
    guard: f64,
}

impl StatAccum {
    fn add_scaled(&mut self, base: &StatBlock, mult: f64) {
        self.max_hp += base.max_hp as f64 * mult;
        self.attack += base.attack as f64 * mult;
        self.defense += base.defense as f64 * mult;
        self.speed += base.speed as f64 * mult;
        self.hit += base.hit as f64 * mult;
        self.dodge += base.dodge as f64 * mult;
        self.crit += base.crit as f64 * mult;
        self.crit_damage += base.crit_damage as f64 * mult;
        self.penetration += base.penetration as f64 * mult;
        self.true_damage += base.true_damage as f64 * mult;
        self.guard += base.guard as f64 * mult;
    }

    fn apply_bonus(&mut self, bonus: SetBonus) {
        let scale = 1.0 + bonus.percent;
        match bonus.target {
            SetBonusTarget::Attack => self.attack = (self.attack * scale).floor(),
            SetBonusTarget::Defense => self.defense = (self.defense * scale).floor(),
            SetBonusTarget::MaxHp => self.max_hp = (self.max_hp * scale).floor(),
            SetBonusTarget::AllStats => {
                self.max_hp = (self.max_hp * scale).floor();
                self.attack = (self.attack * scale).floor();
                self.defense = (self.defense * scale).floor();
                self.speed = (self.speed * scale).floor();
                self.hit = (self.hit * scale).floor();
                self.dodge = (self.dodge * scale).floor();
                self.crit = (self.crit * scale).floor();
                self.crit_damage = (self.crit_damage * scale).floor();
                self.penetration = (self.penetration * scale).floor();
                self.true_damage = (self.true_damage * scale).floor();
                self.guard = (self.guard * scale).floor();
            }
        }
    }

    fn floored(&self) -> StatBlock {
        StatBlock {
            max_hp: self.max_hp.floor() as u32,
            attack: self.attack.floor() as u32,
            defense: self.defense.floor() as u32,
            speed: self.speed.floor() as u32,
            hit: self.hit.floor() as u32,
            dodge: self.dodge.floor() as u32,
            crit: self.crit.floor() as u32,
            crit_damage: self.crit_damage.floor() as u32,
            penetration: self.penetration.floor() as u32,
            true_damage: self.true_damage.floor() as u32,
            guard: self.guard.floor() as u32,
        }
    }
}

/// Folds equipped items into one flat stat block: per-item enhancement and
/// sublimation scaling, then active set bonuses, then floor. Carries no
/// identity and is recomputed on demand; callers must not cache it across
/// level mutations.
pub fn aggregate_equipment(views: &[ItemView]) -> StatBlock {
    let mut accum = StatAccum::default();
    for view in views {
        let mult = item_multiplier(view.instance.enhance_level, view.instance.sublimation_level);
        accum.add_scaled(&view.template.base_stats, mult);
    }

    let mut station_counts: HashMap<u32, usize> = HashMap::new();
    for view in views {
        *station_counts.entry(view.template.station_number).or_insert(0) += 1;
    }

    // Fixed application order keeps the floored output deterministic when
    // several bonuses touch the same stat.
    let mut bonuses: Vec<(u32, SetBonus)> = station_counts
        .iter()
        .filter_map(|(&station, &count)| {
            set_bonus_for_station(station, count).map(|bonus| (station, bonus))
        })
        .collect();
    bonuses.sort_by_key(|(station, _)| *station);
    for (_, bonus) in bonuses {
        accum.apply_bonus(bonus);
    }

    accum.floored()
}

/// Totals the combat scheduler reads: base block plus equipment aggregation
/// for every stat. Damage reduction is derived from total defense inside the
/// damage formula, never summed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub hit: u32,
    pub dodge: u32,
    pub crit: u32,
    pub crit_damage: u32,
    pub penetration: u32,
    pub true_damage: u32,
    pub guard: u32,
}

impl DerivedStats {
    pub fn calculate(base: &StatBlock, views: &[ItemView]) -> Self {
        let mut total = *base;
        total.add(&aggregate_equipment(views));
        Self {
            max_hp: total.max_hp,
            attack: total.attack,
            defense: total.defense,
            speed: total.speed,
            hit: total.hit,
            dodge: total.dodge,
            crit: total.crit,
            crit_damage: total.crit_damage,
            penetration: total.penetration,
            true_damage: total.true_damage,
            guard: total.guard,
        }
    }
}
