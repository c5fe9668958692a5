//! Tower progression: floor counter, party selection and expeditions.
//!
//! An expedition takes a snapshot of the selected parties' living heroes,
//! fights the floor's roster, and then publishes everything back into the
//! [`GameState`]: hero health, the floor cache, rewards and experience,
//! the floor change, and finally party and role cleanup.

use crate::buildings::BuildingKind;
use crate::combat::{Combat, CombatReport};
use crate::encounter;
use crate::error::GameError;
use crate::hero::{Hero, HeroId};
use crate::party::{PartyBook, PartyId};
use crate::rewards::{self, Spoils, VictoryRewards};
use crate::state::GameState;
use crate::wallet::{Currency, Wallet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

pub const HEAL_COST: u64 = 100;

// ============================================================================
// Progress
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerProgress {
    pub floor: u32,
    pub max_floor: u32,
}

impl Default for TowerProgress {
    fn default() -> Self {
        Self {
            floor: 1,
            max_floor: 1,
        }
    }
}

impl TowerProgress {
    /// Climb after a victory. The record only ever goes up.
    pub fn advance(&mut self) {
        self.floor += 1;
        self.max_floor = self.max_floor.max(self.floor);
    }

    /// Drop one floor after a defeat, never below the first.
    pub fn retreat(&mut self) {
        self.floor = self.floor.saturating_sub(1).max(1);
    }

    pub fn normalize(&mut self) {
        self.floor = self.floor.max(1);
        self.max_floor = self.max_floor.max(self.floor);
    }
}

/// Every tenth floor needs two parties fighting together.
pub fn required_parties(floor: u32) -> usize {
    if floor % 10 == 0 {
        2
    } else {
        1
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Parse a comma-separated list of 1-based party positions ("1,2").
/// `Ok(None)` means the player backed out with "0" or "b".
pub fn parse_selection(
    input: &str,
    parties: &PartyBook,
    floor: u32,
) -> Result<Option<Vec<PartyId>>, GameError> {
    let input = input.trim();
    if matches!(input, "0" | "b" | "B") {
        return Ok(None);
    }

    let mut chosen = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let position: usize = token
            .parse()
            .map_err(|_| GameError::InvalidSelection(format!("'{token}' is not a party number")))?;
        let id = parties.by_position(position).ok_or_else(|| {
            GameError::InvalidSelection(format!(
                "Party {position} does not exist (1-{})",
                parties.len()
            ))
        })?;
        chosen.push(id);
    }
    validate_selection(&chosen, parties, floor)?;
    Ok(Some(chosen))
}

/// Enforce the counting rule for `floor`, with no unknown or repeated
/// parties.
pub fn validate_selection(selection: &[PartyId], parties: &PartyBook, floor: u32) -> Result<(), GameError> {
    let required = required_parties(floor);
    if selection.len() != required {
        return Err(GameError::InvalidSelection(format!(
            "Floor {floor} requires exactly {required} part{}, {} selected",
            if required == 1 { "y" } else { "ies" },
            selection.len()
        )));
    }
    let mut seen = HashSet::new();
    for id in selection {
        parties.get(*id)?;
        if !seen.insert(*id) {
            return Err(GameError::InvalidSelection(format!("Party {id} was selected twice")));
        }
    }
    Ok(())
}

// ============================================================================
// Expedition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpeditionReport {
    pub floor: u32,
    pub parties: Vec<PartyId>,
    pub combat: CombatReport,
    pub rewards: Option<VictoryRewards>,
    pub exp_per_hero: u64,
    pub level_messages: Vec<String>,
    pub fallen: Vec<HeroId>,
    pub new_floor: u32,
    pub max_floor: u32,
    pub unlocked_buildings: Vec<BuildingKind>,
}

impl ExpeditionReport {
    pub fn is_victory(&self) -> bool {
        self.combat.is_victory()
    }
}

/// Living heroes of the selected parties, in party order.
pub fn expedition_roster(state: &GameState, selection: &[PartyId]) -> Result<Vec<HeroId>, GameError> {
    let mut roster = Vec::new();
    for id in selection {
        for hero in state.parties.party_heroes(*id, &state.heroes)? {
            if !roster.contains(&hero) {
                roster.push(hero);
            }
        }
    }
    Ok(roster)
}

/// Send the selected parties up the current floor.
pub fn run_expedition<R: Rng>(
    state: &mut GameState,
    selection: &[PartyId],
    rng: &mut R,
) -> Result<ExpeditionReport, GameError> {
    let floor = state.tower.floor;
    validate_selection(selection, &state.parties, floor)?;
    let roster = expedition_roster(state, selection)?;
    if roster.is_empty() {
        return Err(GameError::InvalidSelection(
            "The selected parties have no living heroes".to_string(),
        ));
    }

    let snapshot: Vec<Hero> = roster
        .iter()
        .filter_map(|id| state.hero(*id).cloned())
        .collect();
    let monsters = encounter::generate_or_load(floor, &mut state.floor_cache, rng);

    let mut combat = Combat::new(floor, snapshot, monsters);
    let report = combat.run(rng);
    let (heroes, monsters) = combat.into_parts();

    state.floor_cache.store(floor, monsters);
    for hero in heroes {
        if let Some(slot) = state.hero_mut(hero.id) {
            *slot = hero;
        }
    }

    let (survivors, fallen): (Vec<HeroId>, Vec<HeroId>) = roster
        .iter()
        .copied()
        .partition(|id| state.hero(*id).map(|h| h.is_alive).unwrap_or(false));

    let mut granted = None;
    let mut exp_per_hero = 0;
    let mut level_messages = Vec::new();
    if report.is_victory() {
        granted = Some(rewards::grant(
            floor,
            Spoils {
                wallet: &mut state.wallet,
                storage: &mut state.storage,
                recipes: &mut state.recipes,
            },
            rng,
        ));
        if !survivors.is_empty() {
            exp_per_hero = report.total_exp / survivors.len() as u64;
            for id in &survivors {
                if let Some(hero) = state.hero_mut(*id) {
                    level_messages.push(hero.add_experience(exp_per_hero));
                }
            }
        }
        state.tower.advance();
    } else {
        state.tower.retreat();
    }

    let unlocked_buildings = state.buildings.unlock_for_floor(state.tower.floor);
    state.cleanup();

    info!(
        floor,
        outcome = %report.outcome,
        rounds = report.rounds,
        fallen = fallen.len(),
        new_floor = state.tower.floor,
        "Expedition finished"
    );

    Ok(ExpeditionReport {
        floor,
        parties: selection.to_vec(),
        combat: report,
        rewards: granted,
        exp_per_hero,
        level_messages,
        fallen,
        new_floor: state.tower.floor,
        max_floor: state.tower.max_floor,
        unlocked_buildings,
    })
}

// ============================================================================
// Healing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealReport {
    pub healed: Vec<HeroId>,
    pub cost: u64,
    pub message: String,
}

/// Restore every living wounded hero for a flat fee. Nothing is charged
/// when nobody needs healing; the dead stay dead.
pub fn heal_all(heroes: &mut [Hero], wallet: &mut Wallet, cost: u64) -> Result<HealReport, GameError> {
    if !wallet.can_afford_gold(cost) {
        return Err(GameError::funds(Currency::Gold, cost, wallet.gold));
    }
    if !heroes.iter().any(Hero::is_wounded) {
        return Ok(HealReport {
            healed: Vec::new(),
            cost: 0,
            message: "Nobody needs healing.".to_string(),
        });
    }
    if !wallet.try_spend_gold(cost) {
        return Err(GameError::funds(Currency::Gold, cost, wallet.gold));
    }
    let healed: Vec<HeroId> = heroes
        .iter_mut()
        .filter(|h| h.is_wounded())
        .filter_map(|h| h.heal_full().then_some(h.id))
        .collect();
    info!(count = healed.len(), cost, "Heroes healed");
    Ok(HealReport {
        message: format!("{} heroes fully healed for {cost} gold.", healed.len()),
        healed,
        cost,
    })
}
