//! Round-based battle between a hero party and a monster roster.
//!
//! The engine owns its combatants for the length of the fight. Callers
//! hand in snapshots and take them back with [`Combat::into_parts`] to
//! publish the results. Losing is an ordinary outcome, never an error.
//!
//! A fight goes `Intro -> RoundLoop -> {Victory | Defeat | Timeout}`.
//! Each round every living hero acts in party order against a random
//! living monster, then every living monster acts. Bosses first get a
//! 30% chance to try one of their abilities. After [`MAX_ROUNDS`] rounds
//! the fight ends in a timeout, which counts as a defeat.

use crate::dice;
use crate::hero::Hero;
use crate::monster::{BossAbility, Monster, Species};
use crate::traits::decide_action;
use rand::Rng;
use std::fmt;
use tracing::debug;

pub const MAX_ROUNDS: u32 = 15;

/// Chance a boss tries an ability before its normal attack.
pub const BOSS_ABILITY_GATE: f64 = 0.3;

// ============================================================================
// Phases and Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    Intro,
    RoundLoop,
    Finished(CombatOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    /// Both sides still standing after the last round.
    Timeout,
}

impl CombatOutcome {
    pub fn is_victory(&self) -> bool {
        matches!(self, CombatOutcome::Victory)
    }
}

impl fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatOutcome::Victory => write!(f, "VICTORY"),
            CombatOutcome::Defeat => write!(f, "DEFEAT"),
            CombatOutcome::Timeout => write!(f, "DEFEAT (exhausted)"),
        }
    }
}

/// Coarse estimate from the monster/hero power ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_powers(hero_power: i32, monster_power: i32) -> Self {
        let ratio = monster_power as f64 / hero_power.max(1) as f64;
        if ratio < 0.7 {
            Difficulty::Easy
        } else if ratio < 1.2 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        write!(f, "{label}")
    }
}

/// Everything a finished fight produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatReport {
    pub floor: u32,
    pub outcome: CombatOutcome,
    pub rounds: u32,
    pub log: Vec<String>,
    /// Experience from every monster killed.
    pub total_exp: u64,
    pub hero_power: i32,
    pub monster_power: i32,
    pub difficulty: Difficulty,
}

impl CombatReport {
    pub fn is_victory(&self) -> bool {
        self.outcome.is_victory()
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct Combat {
    floor: u32,
    heroes: Vec<Hero>,
    monsters: Vec<Monster>,
    phase: CombatPhase,
    round: u32,
    log: Vec<String>,
    total_exp: u64,
}

fn living_power(powers: impl Iterator<Item = (bool, i32)>) -> i32 {
    powers.filter(|(alive, _)| *alive).map(|(_, p)| p).sum()
}

impl Combat {
    pub fn new(floor: u32, heroes: Vec<Hero>, monsters: Vec<Monster>) -> Self {
        Self {
            floor,
            heroes,
            monsters,
            phase: CombatPhase::Intro,
            round: 0,
            log: Vec::new(),
            total_exp: 0,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn hero_power(&self) -> i32 {
        living_power(self.heroes.iter().map(|h| (h.is_alive, h.power())))
    }

    pub fn monster_power(&self) -> i32 {
        living_power(self.monsters.iter().map(|m| (m.is_alive, m.power())))
    }

    fn heroes_standing(&self) -> bool {
        self.heroes.iter().any(|h| h.is_alive)
    }

    fn monsters_standing(&self) -> bool {
        self.monsters.iter().any(|m| m.is_alive)
    }

    /// Fight to the end and report.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> CombatReport {
        let hero_power = self.hero_power();
        let monster_power = self.monster_power();
        let difficulty = Difficulty::from_powers(hero_power, monster_power);
        self.intro(hero_power, monster_power, difficulty);

        self.phase = CombatPhase::RoundLoop;
        let mut timed_out = false;
        while self.heroes_standing() && self.monsters_standing() {
            if self.round >= MAX_ROUNDS {
                timed_out = true;
                self.log.push("The battle drags on! Both sides are exhausted...".to_string());
                break;
            }
            self.round += 1;
            self.log.push(format!("--- Round {} ---", self.round));
            debug!(floor = self.floor, round = self.round, "Combat round");

            self.heroes_act(rng);
            if !self.monsters_standing() {
                break;
            }
            self.monsters_act(rng);
        }

        let outcome = if timed_out {
            CombatOutcome::Timeout
        } else if self.heroes_standing() {
            CombatOutcome::Victory
        } else {
            CombatOutcome::Defeat
        };
        self.finish(outcome);

        CombatReport {
            floor: self.floor,
            outcome,
            rounds: self.round,
            log: self.log.clone(),
            total_exp: self.total_exp,
            hero_power,
            monster_power,
            difficulty,
        }
    }

    /// Hand the combatants back.
    pub fn into_parts(self) -> (Vec<Hero>, Vec<Monster>) {
        (self.heroes, self.monsters)
    }

    fn intro(&mut self, hero_power: i32, monster_power: i32, difficulty: Difficulty) {
        self.log.push(format!("=== TOWER OF TRIALS - FLOOR {} ===", self.floor));
        self.log.push(format!("Party power: {hero_power}"));
        self.log.push(format!("Monster power: {monster_power}"));
        self.log.push(format!("Difficulty: {difficulty}"));
        for monster in &self.monsters {
            self.log.push(format!("- {}", monster.summary()));
        }
    }

    fn heroes_act<R: Rng>(&mut self, rng: &mut R) {
        for i in 0..self.heroes.len() {
            if !self.heroes[i].is_alive || !self.monsters_standing() {
                continue;
            }
            if self.heroes[i].stunned {
                self.heroes[i].stunned = false;
                self.log.push(format!("{} is stunned and loses the turn!", self.heroes[i].name));
                continue;
            }
            let Some(t) = dice::pick_index(rng, &self.monsters, |m| m.is_alive) else {
                break;
            };
            let outcome = decide_action(&mut self.heroes[i], &mut self.monsters[t], rng);
            self.log.push(outcome.message.clone());
            if outcome.killed_target() {
                let target = &self.monsters[t];
                self.total_exp += target.exp_value;
                self.log.push(format!("{} is slain! +{} exp", target.name, target.exp_value));
            }
        }
    }

    fn monsters_act<R: Rng>(&mut self, rng: &mut R) {
        // Shades summoned this round act from the next one.
        let acting = self.monsters.len();
        for i in 0..acting {
            if !self.monsters[i].is_alive || !self.heroes_standing() {
                continue;
            }
            if self.monsters[i].stunned {
                self.monsters[i].stunned = false;
                self.log.push(format!("{} is stunned and loses the turn!", self.monsters[i].name));
                continue;
            }
            if self.monsters[i].is_boss() && dice::chance(rng, BOSS_ABILITY_GATE) {
                if let Some(ability) = self.monsters[i].roll_ability(rng) {
                    self.execute_ability(i, ability, rng);
                    continue;
                }
            }
            let Some(t) = dice::pick_index(rng, &self.heroes, |h| h.is_alive) else {
                break;
            };
            let raw = self.monsters[i].roll_attack(rng);
            let line = format!("{} attacks {}!", self.monsters[i].name, self.heroes[t].name);
            self.log.push(line);
            let report = self.heroes[t].take_damage(raw);
            self.log.push(report.message);
        }
    }

    fn execute_ability<R: Rng>(&mut self, attacker: usize, ability: BossAbility, rng: &mut R) {
        let (name, attack, level) = {
            let m = &self.monsters[attacker];
            (m.name.clone(), m.attack, m.level)
        };
        self.log.push(format!("{name} uses {ability}!"));
        debug!(boss = %name, ability = %ability, "Boss ability");

        match ability {
            BossAbility::FireBreath => {
                let raw = dice::scale(attack, ability.damage_multiplier()) / 2;
                for hero in self.heroes.iter_mut().filter(|h| h.is_alive) {
                    let report = hero.take_damage(raw);
                    self.log.push(report.message);
                }
            }
            BossAbility::TailStrike => {
                let Some(t) = dice::pick_index(rng, &self.heroes, |h| h.is_alive) else {
                    return;
                };
                let raw = dice::scale(attack, ability.damage_multiplier());
                let report = self.heroes[t].take_damage(raw);
                self.log.push(report.message);
                if self.heroes[t].is_alive && dice::chance(rng, ability.stun_chance()) {
                    self.heroes[t].stunned = true;
                    self.log.push(format!("{} is stunned!", self.heroes[t].name));
                }
            }
            BossAbility::ShadowBlade => {
                let Some(t) = dice::pick_index(rng, &self.heroes, |h| h.is_alive) else {
                    return;
                };
                let raw = dice::scale(attack, ability.damage_multiplier()) + self.heroes[t].defense;
                let report = self.heroes[t].take_damage(raw);
                self.log.push(report.message);
            }
            BossAbility::SummonShadows => {
                let shade_level = (level / 2).max(1);
                for _ in 0..ability.summon_count() {
                    let shade = Monster::normal(Species::Shade, shade_level);
                    self.log.push(format!("A {} (Lv.{}) joins the fight!", shade.name, shade.level));
                    self.monsters.push(shade);
                }
            }
        }
    }

    fn finish(&mut self, outcome: CombatOutcome) {
        for hero in &mut self.heroes {
            hero.stunned = false;
        }
        for monster in &mut self.monsters {
            monster.stunned = false;
        }
        self.phase = CombatPhase::Finished(outcome);
        self.log.push(format!("{outcome}!"));
        debug!(floor = self.floor, rounds = self.round, %outcome, exp = self.total_exp, "Combat finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::Attributes;
    use crate::monster::BossKind;
    use crate::traits::CharacterTrait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hero(attr: i32) -> Hero {
        Hero::new("Hero", 1, Attributes::uniform(attr), CharacterTrait::Calm)
    }

    fn punching_bag() -> Monster {
        let mut m = Monster::normal(Species::Goblin, 1);
        m.health_max = 1_000_000;
        m.health_current = 1_000_000;
        m.attack = 0;
        m.defense = 0;
        m
    }

    #[test]
    fn test_difficulty_labels() {
        assert_eq!(Difficulty::from_powers(100, 69), Difficulty::Easy);
        assert_eq!(Difficulty::from_powers(100, 70), Difficulty::Medium);
        assert_eq!(Difficulty::from_powers(100, 119), Difficulty::Medium);
        assert_eq!(Difficulty::from_powers(100, 120), Difficulty::Hard);
        assert_eq!(Difficulty::from_powers(0, 1), Difficulty::Hard);
    }

    #[test]
    fn test_quick_victory() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut combat = Combat::new(1, vec![hero(30)], vec![Monster::normal(Species::Goblin, 1)]);
        let report = combat.run(&mut rng);
        assert_eq!(report.outcome, CombatOutcome::Victory);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.total_exp, 10);
        assert_eq!(combat.phase(), CombatPhase::Finished(CombatOutcome::Victory));
        let (_, monsters) = combat.into_parts();
        assert!(!monsters[0].is_alive);
    }

    #[test]
    fn test_timeout_is_defeat() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut combat = Combat::new(3, vec![hero(10)], vec![punching_bag()]);
        let report = combat.run(&mut rng);
        assert_eq!(report.outcome, CombatOutcome::Timeout);
        assert_eq!(report.rounds, MAX_ROUNDS);
        assert!(!report.is_victory());
        let (heroes, _) = combat.into_parts();
        assert!(heroes[0].is_alive);
    }

    #[test]
    fn test_defeat() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brute = Monster::normal(Species::Orc, 1);
        brute.attack = 10_000;
        brute.health_max = 1_000_000;
        brute.health_current = 1_000_000;
        let mut combat = Combat::new(4, vec![hero(10)], vec![brute]);
        let report = combat.run(&mut rng);
        assert_eq!(report.outcome, CombatOutcome::Defeat);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.total_exp, 0);
    }

    #[test]
    fn test_stun_skips_turn_and_clears() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut stunned = hero(10);
        stunned.stunned = true;
        let mut combat = Combat::new(2, vec![stunned], vec![punching_bag()]);
        let report = combat.run(&mut rng);
        assert!(report.log.iter().any(|l| l.contains("stunned and loses the turn")));
        let (heroes, monsters) = combat.into_parts();
        assert!(!heroes[0].stunned);
        // 14 default attacks of at least 1 damage each
        assert!(monsters[0].health_current <= 1_000_000 - 14);
    }

    #[test]
    fn test_fire_breath_hits_everyone() {
        let mut rng = StdRng::seed_from_u64(5);
        let boss = Monster::boss(BossKind::AncientDragon, 12);
        let attack = boss.attack;
        let mut combat = Combat::new(10, vec![hero(10), hero(10)], vec![boss]);
        let before: Vec<i32> = combat.heroes().iter().map(|h| h.health_current).collect();
        combat.execute_ability(0, BossAbility::FireBreath, &mut rng);
        let expected = (dice::scale(attack, 1.8) / 2 - combat.heroes()[0].defense).max(1);
        for (h, hp) in combat.heroes().iter().zip(before) {
            assert_eq!(hp - h.health_current, expected.min(hp));
        }
    }

    #[test]
    fn test_shadow_blade_ignores_defense() {
        let mut rng = StdRng::seed_from_u64(6);
        let boss = Monster::boss(BossKind::ShadowLord, 2);
        let attack = boss.attack;
        let mut tank = hero(40);
        tank.health_max = 100_000;
        tank.health_current = 100_000;
        let mut combat = Combat::new(15, vec![tank], vec![boss]);
        combat.execute_ability(0, BossAbility::ShadowBlade, &mut rng);
        let lost = 100_000 - combat.heroes()[0].health_current;
        assert_eq!(lost, dice::scale(attack, 1.6).max(1));
    }

    #[test]
    fn test_summon_shadows_adds_shades() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut combat = Combat::new(15, vec![hero(10)], vec![Monster::boss(BossKind::ShadowLord, 17)]);
        combat.execute_ability(0, BossAbility::SummonShadows, &mut rng);
        let shades: Vec<&Monster> = combat.monsters()[1..].iter().collect();
        assert_eq!(shades.len(), 2);
        assert!(shades.iter().all(|m| m.kind == crate::monster::MonsterKind::Normal(Species::Shade)));
        assert!(shades.iter().all(|m| m.level == 8));
    }

    #[test]
    fn test_never_exceeds_round_cap() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut combat = Combat::new(
                20,
                vec![hero(12), hero(12)],
                vec![Monster::boss(BossKind::LichKing, 22)],
            );
            let report = combat.run(&mut rng);
            assert!(report.rounds <= MAX_ROUNDS);
        }
    }
}
