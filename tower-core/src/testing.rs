//! Testing utilities for the tower engine.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted climbs with a seeded RNG
//! - Fixture builders for heroes and monsters with fixed stats
//! - Assertion helpers for verifying game state

use crate::error::GameError;
use crate::hero::{Attributes, Hero, HeroId};
use crate::monster::{Monster, Species};
use crate::party::PartyId;
use crate::state::GameState;
use crate::tower::{self, ExpeditionReport};
use crate::traits::CharacterTrait;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A 1★ Calm hero with the given combat stats, at full health. The hero
/// sits at its level cap so experience never recomputes the stats.
pub fn hero_with_stats(name: &str, attack: i32, defense: i32, health: i32) -> Hero {
    let mut hero = Hero::new(name, 1, Attributes::uniform(10), CharacterTrait::Calm);
    hero.level = hero.level_cap();
    hero.attack = attack;
    hero.defense = defense;
    hero.health_max = health;
    hero.health_current = health;
    hero
}

/// A level 1 monster of `species` with overridden stats.
pub fn monster_with_stats(species: Species, attack: i32, defense: i32, health: i32) -> Monster {
    let mut monster = Monster::normal(species, 1);
    monster.attack = attack;
    monster.defense = defense;
    monster.health_max = health;
    monster.health_current = health;
    monster
}

/// Test harness for running tower scenarios.
pub struct TestHarness {
    /// The game state.
    pub state: GameState,
    /// Seeded random source shared by every operation.
    pub rng: StdRng,
}

impl TestHarness {
    /// Create a harness with a fresh game and a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a hero directly, skipping the summon cost and capacity check.
    pub fn recruit(&mut self, hero: Hero) -> HeroId {
        let id = hero.id;
        self.state.heroes.push(hero);
        id
    }

    /// Summon through the normal rules.
    pub fn summon(&mut self) -> Result<HeroId, GameError> {
        let cost = crate::summon::SUMMON_COST;
        Ok(self.state.summon_hero(None, cost, &mut self.rng)?.id)
    }

    /// Make sure at least `count` parties exist.
    pub fn with_parties(&mut self, count: usize) -> &mut Self {
        self.state.parties.ensure_slots(count);
        self
    }

    /// Put heroes into a party in order.
    pub fn form_party(&mut self, party: PartyId, heroes: &[HeroId]) -> Result<(), GameError> {
        for hero in heroes {
            self.state.add_hero_to_party(party, *hero)?;
        }
        Ok(())
    }

    /// Jump to a floor, raising the record if needed.
    pub fn set_floor(&mut self, floor: u32) -> &mut Self {
        self.state.tower.floor = floor;
        self.state.tower.normalize();
        self
    }

    /// Run one expedition on the current floor.
    pub fn run_floor(&mut self, parties: &[PartyId]) -> Result<ExpeditionReport, GameError> {
        tower::run_expedition(&mut self.state, parties, &mut self.rng)
    }

    /// Climb with the same parties until `floors` expeditions have run or
    /// one is lost.
    pub fn climb(&mut self, parties: &[PartyId], floors: usize) -> Result<Vec<ExpeditionReport>, GameError> {
        let mut reports = Vec::new();
        for _ in 0..floors {
            let report = self.run_floor(parties)?;
            let won = report.is_victory();
            reports.push(report);
            if !won {
                break;
            }
        }
        Ok(reports)
    }

    pub fn floor(&self) -> u32 {
        self.state.tower.floor
    }

    pub fn hero(&self, id: HeroId) -> Option<&Hero> {
        self.state.hero(id)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the tower is on the expected floor.
#[track_caller]
pub fn assert_floor(harness: &TestHarness, floor: u32) {
    assert_eq!(
        harness.floor(),
        floor,
        "Expected floor {floor}, got {}",
        harness.floor()
    );
}

/// Assert a hero exists and is alive.
#[track_caller]
pub fn assert_alive(harness: &TestHarness, hero: HeroId) {
    assert!(
        harness.hero(hero).map(|h| h.is_alive).unwrap_or(false),
        "Expected hero {hero} to be alive"
    );
}

/// Assert no party holds a dead or missing hero.
#[track_caller]
pub fn assert_parties_clean(harness: &TestHarness) {
    for party in harness.state.parties.parties() {
        for id in &party.heroes {
            assert!(
                harness.hero(*id).map(|h| h.is_alive).unwrap_or(false),
                "Party {} holds dead or missing hero {id}",
                party.id
            );
        }
    }
}
