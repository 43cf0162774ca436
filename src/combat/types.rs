use serde::{Deserialize, Serialize};

use crate::character::Player;
use crate::core::constants::{DEFAULT_CRIT_DAMAGE, DEFAULT_GUARD};
use crate::items::TemplateRegistry;

fn default_guard() -> u32 {
    DEFAULT_GUARD
}

fn default_crit_damage() -> u32 {
    DEFAULT_CRIT_DAMAGE
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRewards {
    pub exp: u64,
    pub items: Vec<String>,
}

/// Flat enemy stat record. Optional fields fall back to the engine defaults
/// when absent from the data: penetration and true damage to 0, guard to 5,
/// crit damage to 50.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub hit: u32,
    pub dodge: u32,
    pub crit: u32,
    #[serde(default = "default_crit_damage")]
    pub crit_damage: u32,
    #[serde(default)]
    pub penetration: u32,
    #[serde(default)]
    pub true_damage: u32,
    #[serde(default = "default_guard")]
    pub guard: u32,
    pub level: u32,
    #[serde(default)]
    pub rewards: EnemyRewards,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub fn reset_hp(&mut self) {
        self.hp = self.max_hp;
    }
}

/// Flattened attribute snapshot the turn loop reads for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantStats {
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
    pub level: u32,
}

impl CombatantStats {
    pub fn from_player(player: &Player, registry: &TemplateRegistry) -> Self {
        let derived = player.derived(registry);
        Self {
            max_hp: derived.max_hp,
            attack: derived.attack,
            defense: derived.defense,
            speed: derived.speed,
            hit: derived.hit,
            dodge: derived.dodge,
            crit: derived.crit,
            crit_damage: derived.crit_damage,
            penetration: derived.penetration,
            true_damage: derived.true_damage,
            guard: derived.guard,
            level: player.level,
        }
    }

    pub fn from_enemy(enemy: &Enemy) -> Self {
        Self {
            max_hp: enemy.max_hp,
            attack: enemy.attack,
            defense: enemy.defense,
            speed: enemy.speed,
            hit: enemy.hit,
            dodge: enemy.dodge,
            crit: enemy.crit,
            crit_damage: enemy.crit_damage,
            penetration: enemy.penetration,
            true_damage: enemy.true_damage,
            guard: enemy.guard,
            level: enemy.level,
        }
    }
}

/// One resolved action, misses included. Append-only; the sequence is owned
/// by the caller once the battle returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    pub turn: u32,
    pub attacker: String,
    pub defender: String,
    pub damage: u32,
    pub is_crit: bool,
    pub is_dodge: bool,
    pub is_true_damage: bool,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    Running,
    PlayerVictory,
    EnemyVictory,
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub victory: bool,
    pub logs: Vec<BattleLogEntry>,
    pub turns: u32,
    pub player_hp_remaining: u32,
    pub enemy_hp_remaining: u32,
    pub exp_gained: u64,
    pub items_gained: Vec<String>,
}

impl BattleResult {
    /// Terminal state of the encounter. A turn-cap exit with both sides
    /// alive is a stalemate: not a victory, not a loss.
    pub fn outcome(&self) -> BattleState {
        if self.victory {
            BattleState::PlayerVictory
        } else if self.player_hp_remaining == 0 {
            BattleState::EnemyVictory
        } else {
            BattleState::Inconclusive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_enemy() -> Enemy {
        Enemy {
            name: "Husk".to_string(),
            hp: 100,
            max_hp: 100,
            attack: 10,
            defense: 5,
            speed: 8,
            hit: 40,
            dodge: 10,
            crit: 5,
            crit_damage: DEFAULT_CRIT_DAMAGE,
            penetration: 0,
            true_damage: 0,
            guard: DEFAULT_GUARD,
            level: 3,
            rewards: EnemyRewards::default(),
        }
    }

    #[test]
    fn test_enemy_take_damage_no_underflow() {
        let mut enemy = dummy_enemy();
        enemy.take_damage(40);
        assert_eq!(enemy.hp, 60);
        enemy.take_damage(1000);
        assert_eq!(enemy.hp, 0);
        assert!(!enemy.is_alive());
        enemy.reset_hp();
        assert_eq!(enemy.hp, 100);
    }

    #[test]
    fn test_enemy_optional_fields_default_from_json() {
        let json = r#"{
            "name": "Rotling",
            "hp": 50, "max_hp": 50,
            "attack": 12, "defense": 3, "speed": 6,
            "hit": 30, "dodge": 8, "crit": 4,
            "level": 2
        }"#;
        let enemy: Enemy = serde_json::from_str(json).unwrap();
        assert_eq!(enemy.penetration, 0);
        assert_eq!(enemy.true_damage, 0);
        assert_eq!(enemy.guard, 5);
        assert_eq!(enemy.crit_damage, 50);
        assert_eq!(enemy.rewards.exp, 0);
        assert!(enemy.rewards.items.is_empty());
    }

    #[test]
    fn test_battle_result_outcome() {
        let mut result = BattleResult {
            victory: true,
            logs: vec![],
            turns: 10,
            player_hp_remaining: 20,
            enemy_hp_remaining: 0,
            exp_gained: 50,
            items_gained: vec![],
        };
        assert_eq!(result.outcome(), BattleState::PlayerVictory);

        result.victory = false;
        result.player_hp_remaining = 0;
        result.enemy_hp_remaining = 30;
        assert_eq!(result.outcome(), BattleState::EnemyVictory);

        result.player_hp_remaining = 1;
        assert_eq!(result.outcome(), BattleState::Inconclusive);
    }
}
