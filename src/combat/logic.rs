use rand::Rng;

use super::procs::{ProcContext, ProcEngine};
use super::types::{BattleLogEntry, BattleResult, BattleState, CombatantStats, Enemy};
use crate::character::Player;
use crate::core::constants::*;
use crate::items::{ItemView, ProcTrigger, TemplateRegistry};

/// Chance to land a hit, in percent, clamped to `[10, 90]`.
pub fn calculate_hit_rate(hit: u32, dodge: u32) -> f64 {
    let denominator = hit as f64 + dodge as f64 * DODGE_WEIGHT;
    if denominator <= 0.0 {
        return HIT_RATE_MIN;
    }
    (hit as f64 / denominator * 100.0).clamp(HIT_RATE_MIN, HIT_RATE_MAX)
}

/// Chance to crit, in percent. Zero whenever crit does not exceed guard.
pub fn calculate_crit_chance(crit: u32, guard: u32) -> f64 {
    if crit <= guard {
        return 0.0;
    }
    ((crit - guard) as f64 / (guard as f64 * CRIT_GUARD_SCALING) * 100.0).clamp(0.0, 100.0)
}

/// Inputs to one damage resolution: attacker and defender stats plus the
/// modifiers the pre-damage procs produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageInput {
    pub attack: u32,
    pub true_damage: u32,
    pub penetration: u32,
    pub crit_damage: u32,
    pub defender_defense: u32,
    pub defender_level: u32,
    pub is_crit: bool,
    pub proc_damage_bonus: f64,
    pub proc_true_damage_percent: f64,
    pub proc_penetration_bonus: f64,
    pub proc_defense_reduction: f64,
    pub proc_attack_bonus: f64,
}

/// Resolves the damage formula. Floored, never below 1.
pub fn calculate_damage(input: &DamageInput) -> u32 {
    let attack = input.attack as f64 + input.proc_attack_bonus;
    let damage = attack * (1.0 + input.proc_damage_bonus);

    let true_frac = input.true_damage as f64 / 100.0 + input.proc_true_damage_percent;
    let true_damage = damage * true_frac;
    let normal_damage = damage * (1.0 - true_frac);

    let defense = input.defender_defense as f64;
    let mut def_reduction =
        defense / (defense + input.defender_level as f64 * DEFENSE_LEVEL_FACTOR + DEFENSE_BASE_OFFSET);
    let total_penetration = input.penetration as f64 / 100.0 + input.proc_penetration_bonus;
    def_reduction = (def_reduction - total_penetration).max(0.0);
    def_reduction = (def_reduction - input.proc_defense_reduction).max(0.0);

    let mut final_damage = normal_damage * (1.0 - def_reduction) + true_damage;
    if input.is_crit {
        final_damage *= BASE_CRIT_MULTIPLIER + input.crit_damage as f64 / CRIT_DAMAGE_DIVISOR;
    }
    (final_damage.floor() as u32).max(MIN_DAMAGE)
}

/// Fraction of incoming normal damage absorbed by defense, before
/// penetration. Derived from total defense, never summed directly.
pub fn defense_reduction(defense: u32, level: u32) -> f64 {
    defense as f64 / (defense as f64 + level as f64 * DEFENSE_LEVEL_FACTOR + DEFENSE_BASE_OFFSET)
}

/// Drives one encounter to completion. Owns the proc engine for exactly one
/// battle; a concurrent encounter needs its own engine so cooldown state is
/// never shared.
#[derive(Debug, Default)]
pub struct BattleEngine {
    procs: ProcEngine,
}

impl BattleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the turn loop until one side drops or the shared turn cap is
    /// reached, then commits the player's remaining HP, grants rewards on
    /// victory, and clears the cooldown store.
    pub fn run<R: Rng>(
        &mut self,
        player: &mut Player,
        enemy: &mut Enemy,
        registry: &TemplateRegistry,
        rng: &mut R,
    ) -> BattleResult {
        let player_stats = CombatantStats::from_player(player, registry);
        let enemy_stats = CombatantStats::from_enemy(enemy);
        let views = player.equipment.equipped_views(registry);
        let enemy_views: [ItemView; 0] = [];

        let mut player_hp = player.current_hp.min(player_stats.max_hp);
        let mut enemy_hp = enemy.hp;
        let mut logs: Vec<BattleLogEntry> = Vec::new();
        let mut turn: u32 = 0;
        let mut state = BattleState::Running;

        tracing::debug!(
            player = %player.name,
            enemy = %enemy.name,
            player_hp,
            enemy_hp,
            "battle start"
        );

        // Action cadence: lower next-action time acts first, ties favor the
        // player. A zero speed yields an infinite action time and that side
        // simply never acts.
        let player_interval = ACTION_TIME_BASE / player_stats.speed as f64;
        let enemy_interval = ACTION_TIME_BASE / enemy_stats.speed as f64;
        let mut player_next = player_interval;
        let mut enemy_next = enemy_interval;

        // TODO: wire the battle-start shield output into starting HP.
        let start_ctx = ProcContext {
            damage: None,
            is_crit: false,
            current_hp: player_hp,
            max_hp: player_stats.max_hp,
            foe_hp: enemy_hp,
            foe_max_hp: enemy_stats.max_hp,
        };
        let start_procs =
            self.procs
                .resolve_now(ProcTrigger::OnBattleStart, &views, &start_ctx, rng);
        player_hp = (player_hp + start_procs.heal_amount.floor() as u32).min(player_stats.max_hp);

        while state == BattleState::Running {
            turn += 1;

            if player_next <= enemy_next {
                // --- Player acts ---
                let hit_rate = calculate_hit_rate(player_stats.hit, enemy_stats.dodge);
                if rng.gen_range(0.0..100.0) > hit_rate {
                    logs.push(BattleLogEntry {
                        turn,
                        attacker: player.name.clone(),
                        defender: enemy.name.clone(),
                        damage: 0,
                        is_crit: false,
                        is_dodge: true,
                        is_true_damage: false,
                        effects: vec![],
                    });
                } else {
                    let attack_ctx = ProcContext {
                        damage: None,
                        is_crit: false,
                        current_hp: player_hp,
                        max_hp: player_stats.max_hp,
                        foe_hp: enemy_hp,
                        foe_max_hp: enemy_stats.max_hp,
                    };
                    let attack_procs =
                        self.procs
                            .resolve_now(ProcTrigger::OnAttack, &views, &attack_ctx, rng);

                    let crit_chance = calculate_crit_chance(player_stats.crit, enemy_stats.guard);
                    let is_crit = rng.gen_range(0.0..100.0) < crit_chance;

                    let true_frac = player_stats.true_damage as f64 / 100.0
                        + attack_procs.true_damage_percent;
                    let damage = calculate_damage(&DamageInput {
                        attack: player_stats.attack,
                        true_damage: player_stats.true_damage,
                        penetration: player_stats.penetration,
                        crit_damage: player_stats.crit_damage,
                        defender_defense: enemy_stats.defense,
                        defender_level: enemy_stats.level,
                        is_crit,
                        proc_damage_bonus: attack_procs.damage_bonus,
                        proc_true_damage_percent: attack_procs.true_damage_percent,
                        proc_penetration_bonus: attack_procs.penetration_bonus,
                        proc_defense_reduction: attack_procs.defense_reduction,
                        proc_attack_bonus: attack_procs.attack_bonus,
                    });
                    enemy_hp = enemy_hp.saturating_sub(damage);

                    let mut effects = attack_procs.effects_applied;
                    let mut heal_total = attack_procs.heal_amount;

                    let post_ctx = ProcContext {
                        damage: Some(damage as f64),
                        is_crit,
                        current_hp: player_hp,
                        max_hp: player_stats.max_hp,
                        foe_hp: enemy_hp,
                        foe_max_hp: enemy_stats.max_hp,
                    };
                    let hit_procs =
                        self.procs
                            .resolve_now(ProcTrigger::OnHit, &views, &post_ctx, rng);
                    heal_total += hit_procs.heal_amount;
                    effects.extend(hit_procs.effects_applied);

                    if is_crit {
                        let crit_procs =
                            self.procs
                                .resolve_now(ProcTrigger::OnCrit, &views, &post_ctx, rng);
                        heal_total += crit_procs.heal_amount;
                        effects.extend(crit_procs.effects_applied);
                    }

                    if enemy_hp == 0 {
                        let kill_procs =
                            self.procs
                                .resolve_now(ProcTrigger::OnKill, &views, &post_ctx, rng);
                        heal_total += kill_procs.heal_amount;
                        effects.extend(kill_procs.effects_applied);
                    }

                    player_hp =
                        (player_hp + heal_total.floor() as u32).min(player_stats.max_hp);

                    logs.push(BattleLogEntry {
                        turn,
                        attacker: player.name.clone(),
                        defender: enemy.name.clone(),
                        damage,
                        is_crit,
                        is_dodge: false,
                        is_true_damage: true_frac > 0.0,
                        effects,
                    });
                }
                player_next += player_interval;
            } else {
                // --- Enemy acts ---
                let hit_rate = calculate_hit_rate(enemy_stats.hit, player_stats.dodge);
                if rng.gen_range(0.0..100.0) > hit_rate {
                    // The defender's dodge effects fire on an avoided attack.
                    let dodge_ctx = ProcContext {
                        damage: None,
                        is_crit: false,
                        current_hp: player_hp,
                        max_hp: player_stats.max_hp,
                        foe_hp: enemy_hp,
                        foe_max_hp: enemy_stats.max_hp,
                    };
                    let dodge_procs =
                        self.procs
                            .resolve_now(ProcTrigger::OnDodge, &views, &dodge_ctx, rng);
                    player_hp = (player_hp + dodge_procs.heal_amount.floor() as u32)
                        .min(player_stats.max_hp);

                    logs.push(BattleLogEntry {
                        turn,
                        attacker: enemy.name.clone(),
                        defender: player.name.clone(),
                        damage: 0,
                        is_crit: false,
                        is_dodge: true,
                        is_true_damage: false,
                        effects: dodge_procs.effects_applied,
                    });
                } else {
                    let attack_ctx = ProcContext {
                        damage: None,
                        is_crit: false,
                        current_hp: enemy_hp,
                        max_hp: enemy_stats.max_hp,
                        foe_hp: player_hp,
                        foe_max_hp: player_stats.max_hp,
                    };
                    let attack_procs = self.procs.resolve_now(
                        ProcTrigger::OnAttack,
                        &enemy_views,
                        &attack_ctx,
                        rng,
                    );

                    let crit_chance = calculate_crit_chance(enemy_stats.crit, player_stats.guard);
                    let is_crit = rng.gen_range(0.0..100.0) < crit_chance;

                    let true_frac =
                        enemy_stats.true_damage as f64 / 100.0 + attack_procs.true_damage_percent;
                    let damage = calculate_damage(&DamageInput {
                        attack: enemy_stats.attack,
                        true_damage: enemy_stats.true_damage,
                        penetration: enemy_stats.penetration,
                        crit_damage: enemy_stats.crit_damage,
                        defender_defense: player_stats.defense,
                        defender_level: player_stats.level,
                        is_crit,
                        proc_damage_bonus: attack_procs.damage_bonus,
                        proc_true_damage_percent: attack_procs.true_damage_percent,
                        proc_penetration_bonus: attack_procs.penetration_bonus,
                        proc_defense_reduction: attack_procs.defense_reduction,
                        proc_attack_bonus: attack_procs.attack_bonus,
                    });
                    player_hp = player_hp.saturating_sub(damage);

                    logs.push(BattleLogEntry {
                        turn,
                        attacker: enemy.name.clone(),
                        defender: player.name.clone(),
                        damage,
                        is_crit,
                        is_dodge: false,
                        is_true_damage: true_frac > 0.0,
                        effects: attack_procs.effects_applied,
                    });
                }
                enemy_next += enemy_interval;
            }

            state = if enemy_hp == 0 {
                BattleState::PlayerVictory
            } else if player_hp == 0 {
                BattleState::EnemyVictory
            } else if turn >= TURN_CAP {
                BattleState::Inconclusive
            } else {
                BattleState::Running
            };
        }

        // Commit final HP back onto the records. Victory is strictly "enemy
        // at zero"; a turn-cap stalemate grants nothing.
        let victory = state == BattleState::PlayerVictory;
        player.set_hp(player_hp, registry);
        enemy.hp = enemy_hp;

        let (exp_gained, items_gained) = if victory {
            player.add_exp(enemy.rewards.exp);
            (enemy.rewards.exp, enemy.rewards.items.clone())
        } else {
            (0, Vec::new())
        };

        self.procs.clear();

        tracing::debug!(?state, turns = turn, player_hp, enemy_hp, "battle end");

        BattleResult {
            victory,
            logs,
            turns: turn,
            player_hp_remaining: player_hp,
            enemy_hp_remaining: enemy_hp,
            exp_gained,
            items_gained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_bounds_hold_everywhere() {
        for hit in [0u32, 1, 10, 100, 1_000, 100_000] {
            for dodge in [0u32, 1, 10, 100, 1_000, 100_000] {
                let rate = calculate_hit_rate(hit, dodge);
                assert!(
                    (HIT_RATE_MIN..=HIT_RATE_MAX).contains(&rate),
                    "hit={hit} dodge={dodge} rate={rate}"
                );
            }
        }
    }

    #[test]
    fn test_hit_rate_zero_denominator() {
        assert_eq!(calculate_hit_rate(0, 0), HIT_RATE_MIN);
    }

    #[test]
    fn test_hit_rate_extremes_clamp() {
        assert_eq!(calculate_hit_rate(1_000_000, 0), HIT_RATE_MAX);
        assert_eq!(calculate_hit_rate(0, 1_000_000), HIT_RATE_MIN);
    }

    #[test]
    fn test_crit_chance_zero_when_not_exceeding_guard() {
        assert_eq!(calculate_crit_chance(5, 5), 0.0);
        assert_eq!(calculate_crit_chance(3, 50), 0.0);
        assert_eq!(calculate_crit_chance(0, 0), 0.0);
    }

    #[test]
    fn test_crit_chance_bounds() {
        for crit in [0u32, 5, 20, 100, 10_000] {
            for guard in [0u32, 5, 50, 500] {
                let chance = calculate_crit_chance(crit, guard);
                assert!(
                    (0.0..=100.0).contains(&chance),
                    "crit={crit} guard={guard} chance={chance}"
                );
            }
        }
    }

    #[test]
    fn test_crit_chance_formula() {
        // (20 - 5) / (5 * 1.5) * 100 = 200 -> clamped to 100
        assert_eq!(calculate_crit_chance(20, 5), 100.0);
        // (8 - 5) / (5 * 1.5) * 100 = 40
        assert!((calculate_crit_chance(8, 5) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_damage_never_below_one() {
        let input = DamageInput {
            attack: 1,
            defender_defense: 1_000_000,
            defender_level: 100,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 1);
        let zero = DamageInput::default();
        assert_eq!(calculate_damage(&zero), 1);
    }

    #[test]
    fn test_damage_formula_exact() {
        // attack 100, defense 200, level 1: reduction = 200/(200+100+500) = 0.25
        // damage = 100 * 0.75 = 75
        let input = DamageInput {
            attack: 100,
            defender_defense: 200,
            defender_level: 1,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 75);
    }

    #[test]
    fn test_damage_crit_multiplier() {
        // 75 * (1.5 + 50/100) = 150
        let input = DamageInput {
            attack: 100,
            crit_damage: 50,
            defender_defense: 200,
            defender_level: 1,
            is_crit: true,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 150);
    }

    #[test]
    fn test_damage_true_damage_bypasses_defense() {
        // 100% true damage ignores the 25% reduction entirely.
        let input = DamageInput {
            attack: 100,
            true_damage: 100,
            defender_defense: 200,
            defender_level: 1,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 100);
    }

    #[test]
    fn test_damage_penetration_reduces_mitigation() {
        // reduction 0.25, penetration 25% cancels it out.
        let input = DamageInput {
            attack: 100,
            penetration: 25,
            defender_defense: 200,
            defender_level: 1,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 100);
    }

    #[test]
    fn test_damage_proc_bonus_applies() {
        // 100 * 1.5 * 0.75 = 112.5 -> 112
        let input = DamageInput {
            attack: 100,
            defender_defense: 200,
            defender_level: 1,
            proc_damage_bonus: 0.5,
            ..DamageInput::default()
        };
        assert_eq!(calculate_damage(&input), 112);
    }

    #[test]
    fn test_defense_reduction_monotonicity() {
        let mut previous = -1.0;
        for defense in (0..10_000).step_by(250) {
            let reduction = defense_reduction(defense, 10);
            assert!(reduction >= previous);
            previous = reduction;
        }
        // Higher defender level shrinks the reduction.
        let mut previous = 2.0;
        for level in (1..100).step_by(7) {
            let reduction = defense_reduction(500, level);
            assert!(reduction <= previous);
            previous = reduction;
        }
    }

    #[test]
    fn test_defense_reduction_below_one() {
        assert!(defense_reduction(u32::MAX, 0) < 1.0);
        assert_eq!(defense_reduction(0, 50), 0.0);
    }
}
