use std::collections::HashMap;

use rand::Rng;
use uuid::Uuid;

use crate::items::{
    ItemView, ProcCondition, ProcConditionKind, ProcEffect, ProcEffectKind, ProcTrigger,
};

/// Combat-moment inputs the gates and magnitudes read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcContext {
    /// Damage dealt this action, when the trigger happens after damage.
    pub damage: Option<f64>,
    pub is_crit: bool,
    /// HP of the side whose items are being evaluated.
    pub current_hp: u32,
    pub max_hp: u32,
    pub foe_hp: u32,
    pub foe_max_hp: u32,
}

/// Aggregated modifiers from one trigger evaluation. Percent fields are
/// fractions; amount fields are flat HP values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcBundle {
    pub damage_bonus: f64,
    pub heal_amount: f64,
    pub shield_amount: f64,
    pub true_damage_percent: f64,
    pub penetration_bonus: f64,
    pub attack_bonus: f64,
    pub defense_reduction: f64,
    pub effects_applied: Vec<String>,
}

fn condition_passes(condition: &ProcCondition, ctx: &ProcContext) -> bool {
    let own_fraction = ctx.current_hp as f64 / (ctx.max_hp.max(1)) as f64;
    let foe_fraction = ctx.foe_hp as f64 / (ctx.foe_max_hp.max(1)) as f64;
    match condition.kind {
        ProcConditionKind::HpBelow => own_fraction <= condition.value,
        ProcConditionKind::HpAbove => own_fraction >= condition.value,
        ProcConditionKind::EnemyHpBelow => foe_fraction <= condition.value,
    }
}

fn describe(item_name: &str, effect: &ProcEffect) -> String {
    let label = match effect.kind {
        ProcEffectKind::DamageBonus => "damage bonus",
        ProcEffectKind::TrueDamage => "true damage",
        ProcEffectKind::HealPercent => "heal",
        ProcEffectKind::ShieldGain => "shield",
        ProcEffectKind::LifeSteal => "life steal",
        ProcEffectKind::Reflect => "reflect",
        ProcEffectKind::ReduceDefense => "defense down",
        ProcEffectKind::ReduceAttack => "attack down",
        ProcEffectKind::BoostAttack => "attack up",
        ProcEffectKind::BoostDefense => "defense up",
        ProcEffectKind::IgnoreDefense => "ignore defense",
        ProcEffectKind::IgnoreDodge => "ignore dodge",
        ProcEffectKind::IgnoreShield => "ignore shield",
        ProcEffectKind::PenetrationBonus => "penetration",
        ProcEffectKind::CritBoost => "crit up",
        ProcEffectKind::CritDamageBoost => "crit damage up",
        ProcEffectKind::SpeedBoost => "speed up",
        ProcEffectKind::DodgeBoost => "dodge up",
        ProcEffectKind::HitBoost => "hit up",
        ProcEffectKind::DamageReduction => "damage reduction",
    };
    format!("{item_name}: {label} {}", effect.value)
}

/// Evaluates conditional equipment effects for trigger moments and owns the
/// cooldown timestamps. One engine per encounter; cooldowns persist across
/// the whole battle and are cleared when it ends, never per turn. Engines
/// must not be shared between concurrently running encounters.
#[derive(Debug, Default)]
pub struct ProcEngine {
    last_used: HashMap<(Uuid, u32), i64>,
}

impl ProcEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the cooldown store. The battle engine calls this at battle
    /// end, win or lose.
    pub fn clear(&mut self) {
        self.last_used.clear();
    }

    /// Evaluates every equipped effect bound to `trigger`, applying the
    /// cooldown, condition, and chance gates in that order, and folds the
    /// survivors into one modifier bundle. Effects within one call are
    /// independent: none observes another's result.
    pub fn resolve<R: Rng>(
        &mut self,
        trigger: ProcTrigger,
        views: &[ItemView],
        ctx: &ProcContext,
        now_ms: i64,
        rng: &mut R,
    ) -> ProcBundle {
        let mut bundle = ProcBundle::default();

        for view in views {
            for effect in &view.template.effects {
                if effect.trigger != trigger {
                    continue;
                }

                let key = (view.instance.instance_id, effect.id);
                if let Some(cooldown) = effect.cooldown_secs {
                    if let Some(&last) = self.last_used.get(&key) {
                        if (now_ms - last) as f64 / 1000.0 < cooldown {
                            continue;
                        }
                    }
                }

                if let Some(condition) = &effect.condition {
                    if !condition_passes(condition, ctx) {
                        continue;
                    }
                }

                if rng.gen::<f64>() > effect.chance {
                    continue;
                }

                self.last_used.insert(key, now_ms);

                match effect.kind {
                    ProcEffectKind::DamageBonus => bundle.damage_bonus += effect.value,
                    ProcEffectKind::TrueDamage => bundle.true_damage_percent += effect.value,
                    ProcEffectKind::ReduceDefense => bundle.defense_reduction += effect.value,
                    ProcEffectKind::BoostAttack => bundle.attack_bonus += effect.value,
                    ProcEffectKind::IgnoreDefense | ProcEffectKind::PenetrationBonus => {
                        bundle.penetration_bonus += effect.value
                    }
                    ProcEffectKind::HealPercent => {
                        bundle.heal_amount += effect.value * ctx.max_hp as f64
                    }
                    ProcEffectKind::ShieldGain => {
                        bundle.shield_amount += effect.value * ctx.max_hp as f64
                    }
                    ProcEffectKind::LifeSteal => {
                        bundle.heal_amount += effect.value * ctx.damage.unwrap_or(0.0)
                    }
                    // Dormant content kinds: carried on templates and traced,
                    // but nothing in the damage path consumes them yet.
                    ProcEffectKind::Reflect
                    | ProcEffectKind::ReduceAttack
                    | ProcEffectKind::BoostDefense
                    | ProcEffectKind::IgnoreDodge
                    | ProcEffectKind::IgnoreShield
                    | ProcEffectKind::CritBoost
                    | ProcEffectKind::CritDamageBoost
                    | ProcEffectKind::SpeedBoost
                    | ProcEffectKind::DodgeBoost
                    | ProcEffectKind::HitBoost
                    | ProcEffectKind::DamageReduction => {}
                }

                bundle.effects_applied.push(describe(&view.template.name, effect));
            }
        }

        bundle
    }

    /// `resolve` against the wall clock.
    pub fn resolve_now<R: Rng>(
        &mut self,
        trigger: ProcTrigger,
        views: &[ItemView],
        ctx: &ProcContext,
        rng: &mut R,
    ) -> ProcBundle {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.resolve(trigger, views, ctx, now_ms, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{
        Equipment, EquipmentInstance, EquipmentSlot, EquipmentTemplate, Rarity, StatBlock,
        TemplateRegistry,
    };
    use rand::rngs::mock::StepRng;

    fn always_pass() -> StepRng {
        StepRng::new(0, 0)
    }

    fn effect(id: u32, trigger: ProcTrigger, kind: ProcEffectKind, value: f64) -> ProcEffect {
        ProcEffect {
            id,
            trigger,
            kind,
            value,
            value2: None,
            duration: None,
            cooldown_secs: None,
            condition: None,
            chance: 1.0,
        }
    }

    fn setup(effects: Vec<ProcEffect>) -> (Equipment, TemplateRegistry) {
        let mut registry = TemplateRegistry::new();
        registry
            .insert(EquipmentTemplate {
                id: "charm".to_string(),
                name: "Charm".to_string(),
                slot: EquipmentSlot::Accessory,
                rarity: Rarity::Rare,
                station_number: 40,
                base_stats: StatBlock::new(),
                effects,
            })
            .unwrap();
        let mut equipment = Equipment::new();
        equipment.set(EquipmentSlot::Accessory, Some(EquipmentInstance::new("charm")));
        (equipment, registry)
    }

    fn ctx() -> ProcContext {
        ProcContext {
            damage: Some(200.0),
            is_crit: false,
            current_hp: 500,
            max_hp: 1000,
            foe_hp: 800,
            foe_max_hp: 1000,
        }
    }

    #[test]
    fn test_trigger_filtering() {
        let (eq, reg) = setup(vec![
            effect(1, ProcTrigger::OnAttack, ProcEffectKind::DamageBonus, 0.2),
            effect(2, ProcTrigger::OnHit, ProcEffectKind::LifeSteal, 0.1),
        ]);
        let mut engine = ProcEngine::new();
        let bundle = engine.resolve(
            ProcTrigger::OnAttack,
            &eq.equipped_views(&reg),
            &ctx(),
            0,
            &mut always_pass(),
        );
        assert!((bundle.damage_bonus - 0.2).abs() < f64::EPSILON);
        assert_eq!(bundle.heal_amount, 0.0);
        assert_eq!(bundle.effects_applied.len(), 1);
    }

    #[test]
    fn test_heal_and_shield_scale_with_max_hp() {
        let (eq, reg) = setup(vec![
            effect(1, ProcTrigger::OnHit, ProcEffectKind::HealPercent, 0.05),
            effect(2, ProcTrigger::OnHit, ProcEffectKind::ShieldGain, 0.10),
        ]);
        let mut engine = ProcEngine::new();
        let bundle = engine.resolve(
            ProcTrigger::OnHit,
            &eq.equipped_views(&reg),
            &ctx(),
            0,
            &mut always_pass(),
        );
        assert!((bundle.heal_amount - 50.0).abs() < f64::EPSILON);
        assert!((bundle.shield_amount - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_life_steal_scales_with_damage() {
        let (eq, reg) = setup(vec![effect(
            1,
            ProcTrigger::OnHit,
            ProcEffectKind::LifeSteal,
            0.25,
        )]);
        let mut engine = ProcEngine::new();
        let bundle = engine.resolve(
            ProcTrigger::OnHit,
            &eq.equipped_views(&reg),
            &ctx(),
            0,
            &mut always_pass(),
        );
        assert!((bundle.heal_amount - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cooldown_gate_blocks_until_elapsed() {
        let mut e = effect(1, ProcTrigger::OnAttack, ProcEffectKind::DamageBonus, 0.2);
        e.cooldown_secs = Some(5.0);
        let (eq, reg) = setup(vec![e]);
        let views = eq.equipped_views(&reg);
        let mut engine = ProcEngine::new();

        let first = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 1_000, &mut always_pass());
        assert_eq!(first.effects_applied.len(), 1);

        // 3s later: still cooling down.
        let second = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 4_000, &mut always_pass());
        assert!(second.effects_applied.is_empty());
        assert_eq!(second.damage_bonus, 0.0);

        // 5s later: available again.
        let third = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 6_000, &mut always_pass());
        assert_eq!(third.effects_applied.len(), 1);
    }

    #[test]
    fn test_clear_resets_cooldowns_between_encounters() {
        let mut e = effect(1, ProcTrigger::OnAttack, ProcEffectKind::DamageBonus, 0.2);
        e.cooldown_secs = Some(60.0);
        let (eq, reg) = setup(vec![e]);
        let views = eq.equipped_views(&reg);
        let mut engine = ProcEngine::new();

        engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 0, &mut always_pass());
        let blocked = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 1_000, &mut always_pass());
        assert!(blocked.effects_applied.is_empty());

        engine.clear();
        let after_clear =
            engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 1_000, &mut always_pass());
        assert_eq!(after_clear.effects_applied.len(), 1);
    }

    #[test]
    fn test_hp_below_condition_gate() {
        let mut e = effect(1, ProcTrigger::OnHit, ProcEffectKind::DamageBonus, 0.3);
        e.condition = Some(ProcCondition {
            kind: ProcConditionKind::HpBelow,
            value: 0.3,
        });
        let (eq, reg) = setup(vec![e]);
        let views = eq.equipped_views(&reg);
        let mut engine = ProcEngine::new();

        // 50% HP: gate closed.
        let closed = engine.resolve(ProcTrigger::OnHit, &views, &ctx(), 0, &mut always_pass());
        assert!(closed.effects_applied.is_empty());

        // 25% HP: gate open.
        let low_hp = ProcContext {
            current_hp: 250,
            ..ctx()
        };
        let open = engine.resolve(ProcTrigger::OnHit, &views, &low_hp, 0, &mut always_pass());
        assert_eq!(open.effects_applied.len(), 1);
    }

    #[test]
    fn test_hp_above_and_enemy_hp_below_conditions() {
        let mut above = effect(1, ProcTrigger::OnHit, ProcEffectKind::DamageBonus, 0.1);
        above.condition = Some(ProcCondition {
            kind: ProcConditionKind::HpAbove,
            value: 0.4,
        });
        let mut execute = effect(2, ProcTrigger::OnHit, ProcEffectKind::TrueDamage, 0.2);
        execute.condition = Some(ProcCondition {
            kind: ProcConditionKind::EnemyHpBelow,
            value: 0.5,
        });
        let (eq, reg) = setup(vec![above, execute]);
        let views = eq.equipped_views(&reg);
        let mut engine = ProcEngine::new();

        // Own HP 50% (above 40%: open), foe HP 80% (not below 50%: closed).
        let bundle = engine.resolve(ProcTrigger::OnHit, &views, &ctx(), 0, &mut always_pass());
        assert_eq!(bundle.effects_applied.len(), 1);
        assert!((bundle.damage_bonus - 0.1).abs() < f64::EPSILON);
        assert_eq!(bundle.true_damage_percent, 0.0);

        let foe_low = ProcContext {
            foe_hp: 300,
            ..ctx()
        };
        let bundle = engine.resolve(ProcTrigger::OnHit, &views, &foe_low, 0, &mut always_pass());
        assert_eq!(bundle.effects_applied.len(), 2);
    }

    #[test]
    fn test_chance_gate() {
        let mut never = effect(1, ProcTrigger::OnAttack, ProcEffectKind::DamageBonus, 0.5);
        never.chance = 0.5;
        let (eq, reg) = setup(vec![never]);
        let views = eq.equipped_views(&reg);
        let mut engine = ProcEngine::new();

        // Roll ~1.0 > 0.5: skipped, and no cooldown stamp is recorded.
        let mut high_roll = StepRng::new(u64::MAX, 0);
        let skipped = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 0, &mut high_roll);
        assert!(skipped.effects_applied.is_empty());

        // Roll ~0.0 <= 0.5: applied.
        let applied = engine.resolve(ProcTrigger::OnAttack, &views, &ctx(), 0, &mut always_pass());
        assert_eq!(applied.effects_applied.len(), 1);
    }

    #[test]
    fn test_dormant_kinds_trace_without_modifiers() {
        let (eq, reg) = setup(vec![effect(
            1,
            ProcTrigger::OnDefend,
            ProcEffectKind::Reflect,
            0.15,
        )]);
        let mut engine = ProcEngine::new();
        let bundle = engine.resolve(
            ProcTrigger::OnDefend,
            &eq.equipped_views(&reg),
            &ctx(),
            0,
            &mut always_pass(),
        );
        assert_eq!(bundle.effects_applied.len(), 1);
        assert_eq!(bundle, ProcBundle {
            effects_applied: bundle.effects_applied.clone(),
            ..ProcBundle::default()
        });
    }

    #[test]
    fn test_effects_do_not_observe_each_other() {
        // Two heals in one call both read the same pre-call context.
        let (eq, reg) = setup(vec![
            effect(1, ProcTrigger::OnHit, ProcEffectKind::HealPercent, 0.05),
            effect(2, ProcTrigger::OnHit, ProcEffectKind::HealPercent, 0.05),
        ]);
        let mut engine = ProcEngine::new();
        let bundle = engine.resolve(
            ProcTrigger::OnHit,
            &eq.equipped_views(&reg),
            &ctx(),
            0,
            &mut always_pass(),
        );
        assert!((bundle.heal_amount - 100.0).abs() < f64::EPSILON);
    }
}
