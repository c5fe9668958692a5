//! Monster species, bosses and their stat tables.
//!
//! Normal monsters scale linearly with level from a per-species table.
//! Bosses take the Orc's per-level numbers and apply fixed multipliers,
//! truncating to integers.

use crate::dice;
use crate::hero::{mitigate, DamageReport};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Per-combat identifier, persisted with cached rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub Uuid);

impl MonsterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MonsterId {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Species
// ============================================================================

/// Per-level growth for a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesStats {
    pub health_per_level: i32,
    pub attack_per_level: i32,
    pub defense_per_level: i32,
    pub exp_per_level: u64,
    pub description: &'static str,
}

/// Stats used for names that match no known species.
pub const FALLBACK_STATS: SpeciesStats = SpeciesStats {
    health_per_level: 8,
    attack_per_level: 2,
    defense_per_level: 1,
    exp_per_level: 10,
    description: "An unfamiliar creature",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Goblin,
    Skeleton,
    Orc,
    Spider,
    Wolf,
    /// Only appears through a boss summon.
    Shade,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::Goblin => "Goblin",
            Species::Skeleton => "Skeleton",
            Species::Orc => "Orc",
            Species::Spider => "Spider",
            Species::Wolf => "Wolf",
            Species::Shade => "Shade",
        }
    }

    pub fn stats(&self) -> SpeciesStats {
        match self {
            Species::Goblin => SpeciesStats {
                health_per_level: 8,
                attack_per_level: 2,
                defense_per_level: 1,
                exp_per_level: 10,
                description: "Small and nasty",
            },
            Species::Skeleton => SpeciesStats {
                health_per_level: 7,
                attack_per_level: 3,
                defense_per_level: 2,
                exp_per_level: 12,
                description: "A risen corpse",
            },
            Species::Orc => SpeciesStats {
                health_per_level: 12,
                attack_per_level: 4,
                defense_per_level: 1,
                exp_per_level: 15,
                description: "Big and strong",
            },
            Species::Spider => SpeciesStats {
                health_per_level: 6,
                attack_per_level: 3,
                defense_per_level: 0,
                exp_per_level: 8,
                description: "A venomous crawler",
            },
            Species::Wolf => SpeciesStats {
                health_per_level: 9,
                attack_per_level: 3,
                defense_per_level: 1,
                exp_per_level: 11,
                description: "A swift predator",
            },
            Species::Shade => SpeciesStats {
                description: "A sliver of living darkness",
                ..FALLBACK_STATS
            },
        }
    }

    /// Look a species up by display name.
    pub fn from_name(name: &str) -> Option<Species> {
        [
            Species::Goblin,
            Species::Skeleton,
            Species::Orc,
            Species::Spider,
            Species::Wolf,
            Species::Shade,
        ]
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

/// Stats for a species name, falling back to [`FALLBACK_STATS`].
pub fn stats_for_name(name: &str) -> SpeciesStats {
    Species::from_name(name)
        .map(|s| s.stats())
        .unwrap_or(FALLBACK_STATS)
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Bosses
// ============================================================================

/// Multipliers a boss applies over the Orc's per-level stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossStats {
    pub health_multiplier: f64,
    pub attack_multiplier: f64,
    pub defense_multiplier: f64,
    pub exp_multiplier: f64,
    /// Lowest floor on which the boss is a candidate.
    pub min_floor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossKind {
    AncientDragon,
    ShadowLord,
    LichKing,
}

impl BossKind {
    pub const ALL: [BossKind; 3] = [BossKind::AncientDragon, BossKind::ShadowLord, BossKind::LichKing];

    pub fn name(&self) -> &'static str {
        match self {
            BossKind::AncientDragon => "Ancient Dragon",
            BossKind::ShadowLord => "Shadow Lord",
            BossKind::LichKing => "Lich King",
        }
    }

    pub fn stats(&self) -> BossStats {
        match self {
            BossKind::AncientDragon => BossStats {
                health_multiplier: 3.0,
                attack_multiplier: 2.5,
                defense_multiplier: 2.0,
                exp_multiplier: 5.0,
                min_floor: 10,
            },
            BossKind::ShadowLord => BossStats {
                health_multiplier: 2.8,
                attack_multiplier: 2.7,
                defense_multiplier: 1.8,
                exp_multiplier: 4.5,
                min_floor: 15,
            },
            BossKind::LichKing => BossStats {
                health_multiplier: 2.5,
                attack_multiplier: 2.3,
                defense_multiplier: 2.2,
                exp_multiplier: 4.0,
                min_floor: 20,
            },
        }
    }

    /// Abilities in the order they are rolled.
    pub fn abilities(&self) -> &'static [BossAbility] {
        match self {
            BossKind::AncientDragon => &[BossAbility::FireBreath, BossAbility::TailStrike],
            BossKind::ShadowLord => &[BossAbility::ShadowBlade, BossAbility::SummonShadows],
            BossKind::LichKing => &[],
        }
    }
}

impl fmt::Display for BossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Special moves a boss may use instead of a normal attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossAbility {
    /// Hits every living hero for half of the multiplied attack.
    FireBreath,
    /// Heavy single-target hit that may stun.
    TailStrike,
    /// Single-target hit that passes through defense.
    ShadowBlade,
    /// Calls Shades into the fight.
    SummonShadows,
}

impl BossAbility {
    pub fn name(&self) -> &'static str {
        match self {
            BossAbility::FireBreath => "Fire Breath",
            BossAbility::TailStrike => "Tail Strike",
            BossAbility::ShadowBlade => "Shadow Blade",
            BossAbility::SummonShadows => "Summon Shadows",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BossAbility::FireBreath => "Burns every hero",
            BossAbility::TailStrike => "Stuns its target",
            BossAbility::ShadowBlade => "Passes through armor",
            BossAbility::SummonShadows => "Summons helpers",
        }
    }

    pub fn chance(&self) -> f64 {
        match self {
            BossAbility::FireBreath => 0.3,
            BossAbility::TailStrike => 0.2,
            BossAbility::ShadowBlade => 0.4,
            BossAbility::SummonShadows => 0.25,
        }
    }

    pub fn damage_multiplier(&self) -> f64 {
        match self {
            BossAbility::FireBreath => 1.8,
            BossAbility::TailStrike => 1.5,
            BossAbility::ShadowBlade => 1.6,
            BossAbility::SummonShadows => 0.0,
        }
    }

    pub fn stun_chance(&self) -> f64 {
        match self {
            BossAbility::TailStrike => 0.4,
            _ => 0.0,
        }
    }

    pub fn summon_count(&self) -> usize {
        match self {
            BossAbility::SummonShadows => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for BossAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Monster
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Normal(Species),
    Boss(BossKind),
}

/// A monster on a tower floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub kind: MonsterKind,
    pub level: u32,
    pub health_max: i32,
    pub health_current: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp_value: u64,
    pub is_alive: bool,
    #[serde(default)]
    pub stunned: bool,
}

impl Monster {
    pub fn new(kind: MonsterKind, level: u32) -> Self {
        let level = level.max(1);
        let lvl = level as i32;
        let (name, health_max, attack, defense, exp_value) = match kind {
            MonsterKind::Normal(species) => {
                let s = species.stats();
                (
                    species.name(),
                    s.health_per_level * lvl,
                    s.attack_per_level * lvl,
                    s.defense_per_level * lvl,
                    s.exp_per_level * level as u64,
                )
            }
            MonsterKind::Boss(boss) => {
                let base = Species::Orc.stats();
                let m = boss.stats();
                (
                    boss.name(),
                    dice::scale(base.health_per_level * lvl, m.health_multiplier),
                    dice::scale(base.attack_per_level * lvl, m.attack_multiplier),
                    dice::scale(base.defense_per_level * lvl, m.defense_multiplier),
                    ((base.exp_per_level * level as u64) as f64 * m.exp_multiplier) as u64,
                )
            }
        };
        Self {
            id: MonsterId::new(),
            name: name.to_string(),
            kind,
            level,
            health_max,
            health_current: health_max,
            attack,
            defense,
            exp_value,
            is_alive: true,
            stunned: false,
        }
    }

    pub fn normal(species: Species, level: u32) -> Self {
        Self::new(MonsterKind::Normal(species), level)
    }

    pub fn boss(boss: BossKind, level: u32) -> Self {
        Self::new(MonsterKind::Boss(boss), level)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, MonsterKind::Boss(_))
    }

    pub fn boss_kind(&self) -> Option<BossKind> {
        match self.kind {
            MonsterKind::Boss(boss) => Some(boss),
            MonsterKind::Normal(_) => None,
        }
    }

    /// Apply a hit with the same defense rule heroes use.
    pub fn take_damage(&mut self, raw_damage: i32) -> DamageReport {
        if !self.is_alive {
            return DamageReport::already_down(&self.name);
        }
        let actual_damage = mitigate(raw_damage, self.defense);
        self.health_current -= actual_damage;
        if self.health_current <= 0 {
            self.health_current = 0;
            self.is_alive = false;
            self.stunned = false;
            return DamageReport {
                actual_damage,
                message: format!("{} is defeated!", self.name),
                died: true,
            };
        }
        DamageReport {
            actual_damage,
            message: format!(
                "{} takes {} damage ({} HP left).",
                self.name, actual_damage, self.health_current
            ),
            died: false,
        }
    }

    /// Raw damage of a normal attack: `[atk/2, atk]`.
    pub fn roll_attack<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        dice::roll_between(rng, self.attack / 2, self.attack)
    }

    /// Roll this boss's abilities in order; the first whose chance fires
    /// is returned. Normal monsters never have one.
    pub fn roll_ability<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<BossAbility> {
        let boss = self.boss_kind()?;
        boss.abilities()
            .iter()
            .copied()
            .find(|ability| dice::chance(rng, ability.chance()))
    }

    pub fn power(&self) -> i32 {
        self.attack + self.defense
    }

    pub fn summary(&self) -> String {
        let tag = if self.is_boss() { " [BOSS]" } else { "" };
        format!(
            "{} Lv.{}{} HP {}/{} ATK {} DEF {}",
            self.name, self.level, tag, self.health_current, self.health_max, self.attack, self.defense
        )
    }
}

impl fmt::Display for Monster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normal_stats_scale_with_level() {
        let goblin = Monster::normal(Species::Goblin, 3);
        assert_eq!(goblin.health_max, 24);
        assert_eq!(goblin.attack, 6);
        assert_eq!(goblin.defense, 3);
        assert_eq!(goblin.exp_value, 30);
        assert_eq!(goblin.health_current, goblin.health_max);
    }

    #[test]
    fn test_boss_stats_use_orc_base() {
        let dragon = Monster::boss(BossKind::AncientDragon, 12);
        assert_eq!(dragon.health_max, (12.0 * 12.0 * 3.0) as i32);
        assert_eq!(dragon.attack, (4.0 * 12.0 * 2.5) as i32);
        assert_eq!(dragon.defense, 24);
        assert_eq!(dragon.exp_value, 900);
        assert!(dragon.is_boss());

        let shadow = Monster::boss(BossKind::ShadowLord, 7);
        assert_eq!(shadow.health_max, (84.0 * 2.8) as i32);
        assert_eq!(shadow.defense, (7.0 * 1.8) as i32);
    }

    #[test]
    fn test_monster_damage_scenario() {
        let mut monster = Monster::normal(Species::Goblin, 4);
        assert_eq!(monster.defense, 4);
        let report = monster.take_damage(10);
        assert_eq!(report.actual_damage, 6);
        assert_eq!(monster.health_current, 32 - 6);
    }

    #[test]
    fn test_unknown_species_fallback() {
        assert_eq!(stats_for_name("Basilisk"), FALLBACK_STATS);
        assert_eq!(stats_for_name("orc").health_per_level, 12);
    }

    #[test]
    fn test_lich_king_has_no_abilities() {
        let mut rng = StdRng::seed_from_u64(1);
        let lich = Monster::boss(BossKind::LichKing, 22);
        for _ in 0..100 {
            assert!(lich.roll_ability(&mut rng).is_none());
        }
        let goblin = Monster::normal(Species::Goblin, 1);
        assert!(goblin.roll_ability(&mut rng).is_none());
    }

    #[test]
    fn test_dragon_abilities_fire_eventually() {
        let mut rng = StdRng::seed_from_u64(2);
        let dragon = Monster::boss(BossKind::AncientDragon, 12);
        let rolled: Vec<_> = (0..500).filter_map(|_| dragon.roll_ability(&mut rng)).collect();
        assert!(rolled.contains(&BossAbility::FireBreath));
        assert!(rolled.contains(&BossAbility::TailStrike));
    }

    #[test]
    fn test_attack_roll_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let orc = Monster::normal(Species::Orc, 5);
        for _ in 0..100 {
            let dmg = orc.roll_attack(&mut rng);
            assert!((10..=20).contains(&dmg));
        }
    }
}
