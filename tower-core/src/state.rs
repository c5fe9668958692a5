//! The complete, serializable game state.
//!
//! Every subsystem keeps its own slice (wallet, roster, parties, roles,
//! buildings, research, storage, recipes, tower progress, floor cache) and
//! the methods here borrow only the slices an action needs. Any method
//! returning `Err` has left the state unchanged.

use crate::buildings::{BuildingKind, Buildings};
use crate::crafting::{CraftOutcome, Forge};
use crate::encounter::{self, FloorCache, FloorPreview};
use crate::error::GameError;
use crate::hero::{Hero, HeroId};
use crate::items::ItemKind;
use crate::party::{PartyBook, PartyId};
use crate::research::{ResearchBook, ResearchKind};
use crate::roles::{Role, RoleBoard};
use crate::storage::Storage;
use crate::summon;
use crate::synergy;
use crate::synthesis::{self, SynthesisResult};
use crate::tower::{self, HealReport, TowerProgress};
use crate::wallet::Wallet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

pub const STARTING_GOLD: u64 = 10_000;
pub const STARTING_CRYSTALS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub wallet: Wallet,
    pub heroes: Vec<Hero>,
    pub parties: PartyBook,
    pub roles: RoleBoard,
    pub buildings: Buildings,
    pub research: ResearchBook,
    pub storage: Storage,
    /// Recipes unlocked, by output item.
    pub recipes: BTreeSet<ItemKind>,
    pub tower: TowerProgress,
    pub floor_cache: FloorCache,
    /// Heroes summoned so far, for default names.
    #[serde(default)]
    pub summoned: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(STARTING_GOLD, STARTING_CRYSTALS)
    }
}

/// What reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub parties_created: Vec<PartyId>,
    pub members_dropped: Vec<HeroId>,
    pub roles_dropped: usize,
}

impl GameState {
    pub fn new(gold: u64, crystals: u64) -> Self {
        Self {
            wallet: Wallet::new(gold, crystals),
            heroes: Vec::new(),
            parties: PartyBook::new(),
            roles: RoleBoard::new(),
            buildings: Buildings::new(),
            research: ResearchBook::new(),
            storage: Storage::default(),
            recipes: BTreeSet::new(),
            tower: TowerProgress::default(),
            floor_cache: FloorCache::new(),
            summoned: 0,
        }
    }

    pub fn hero(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == id)
    }

    pub fn hero_mut(&mut self, id: HeroId) -> Option<&mut Hero> {
        self.heroes.iter_mut().find(|h| h.id == id)
    }

    fn require_hero(&self, id: HeroId) -> Result<&Hero, GameError> {
        self.hero(id).ok_or(GameError::UnknownHero(id))
    }

    pub fn living_heroes(&self) -> impl Iterator<Item = &Hero> {
        self.heroes.iter().filter(|h| h.is_alive)
    }

    pub fn hero_capacity(&self) -> usize {
        self.buildings.hero_capacity()
    }

    pub fn hidden_stats_revealed(&self) -> bool {
        self.research.effects().hero_understanding
    }

    /// A hero's attributes, masked until Hero Understanding is researched.
    pub fn hero_sheet(&self, id: HeroId) -> Result<String, GameError> {
        let hero = self.require_hero(id)?;
        Ok(hero.attribute_sheet(self.hidden_stats_revealed()))
    }

    // ========================================================================
    // Consistency
    // ========================================================================

    /// Drop dead or missing heroes from parties and roles. Idempotent.
    pub fn cleanup(&mut self) -> Vec<HeroId> {
        let removed = self.parties.cleanup_dead_heroes(&self.heroes, &mut self.roles);
        self.roles.cleanup(&self.heroes);
        removed
    }

    /// Create the parties research entitles us to.
    pub fn apply_research_effects(&mut self) -> Vec<PartyId> {
        let effects = self.research.effects();
        self.parties.ensure_slots(effects.max_parties)
    }

    /// Bring a freshly loaded state into a consistent shape: clamp
    /// research and tower values, re-apply research, then clean up.
    pub fn reconcile(&mut self) -> Reconciliation {
        self.research.normalize();
        self.tower.normalize();
        let parties_created = self.apply_research_effects();
        let members_dropped = self.parties.cleanup_dead_heroes(&self.heroes, &mut self.roles);
        let roles_dropped = self.roles.cleanup(&self.heroes);
        if !members_dropped.is_empty() || roles_dropped > 0 {
            warn!(
                members = members_dropped.len(),
                roles = roles_dropped,
                "Dropped stale party members and roles from loaded state"
            );
        }
        Reconciliation {
            parties_created,
            members_dropped,
            roles_dropped,
        }
    }

    // ========================================================================
    // Heroes
    // ========================================================================

    /// Summon a hero, named `name` or "Hero N".
    pub fn summon_hero<R: Rng + ?Sized>(
        &mut self,
        name: Option<String>,
        cost: u64,
        rng: &mut R,
    ) -> Result<&Hero, GameError> {
        let name = name.unwrap_or_else(|| format!("Hero {}", self.summoned + 1));
        let capacity = self.hero_capacity();
        let idx = summon::summon(name, &mut self.heroes, capacity, cost, &mut self.wallet, rng)?;
        self.summoned += 1;
        Ok(&self.heroes[idx])
    }

    pub fn synthesize<R: Rng + ?Sized>(
        &mut self,
        base: HeroId,
        sacrifices: &[HeroId],
        rng: &mut R,
    ) -> Result<SynthesisResult, GameError> {
        if !self.buildings.is_built(BuildingKind::SynthesisRoom) {
            return Err(GameError::MissingPrerequisite(
                "Synthesis Room is not built".to_string(),
            ));
        }
        let result = synthesis::synthesize(&mut self.heroes, base, sacrifices, rng)?;
        self.cleanup();
        Ok(result)
    }

    pub fn heal_all(&mut self, cost: u64) -> Result<HealReport, GameError> {
        tower::heal_all(&mut self.heroes, &mut self.wallet, cost)
    }

    // ========================================================================
    // Parties
    // ========================================================================

    pub fn add_hero_to_party(&mut self, party: PartyId, hero: HeroId) -> Result<(), GameError> {
        self.parties.add_hero_to_party(party, hero, &self.heroes, &self.roles)
    }

    pub fn remove_hero_from_party(&mut self, party: PartyId, hero: HeroId) -> Result<(), GameError> {
        self.parties.get(party)?;
        if self.parties.remove_hero_from_party(party, hero) {
            Ok(())
        } else {
            Err(GameError::InvalidSelection(format!(
                "{hero} is not in party {party}"
            )))
        }
    }

    pub fn unlock_party(&mut self, name: Option<String>) -> Result<PartyId, GameError> {
        let name = name.unwrap_or_else(|| format!("Battle Group #{}", self.parties.len() + 1));
        self.parties.unlock_new_party(name)
    }

    /// Synergy multiplier and description for a party's living members.
    pub fn party_synergy(&self, party: PartyId) -> Result<(f64, String), GameError> {
        let traits: Vec<_> = self
            .parties
            .party_heroes(party, &self.heroes)?
            .into_iter()
            .filter_map(|id| self.hero(id).map(|h| h.character_trait))
            .collect();
        let bonus = synergy::party_bonus(&traits);
        Ok((bonus, synergy::describe(bonus)))
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// Returns whoever previously held the role.
    pub fn assign_role(&mut self, role: Role, hero: HeroId) -> Result<Option<HeroId>, GameError> {
        let hero = self.require_hero(hero)?.clone();
        self.roles.assign(role, &hero, &self.parties, &self.buildings)
    }

    pub fn unassign_role(&mut self, role: Role) -> Option<HeroId> {
        self.roles.unassign(role)
    }

    // ========================================================================
    // Base
    // ========================================================================

    pub fn upgrade_building(&mut self, kind: BuildingKind) -> Result<u32, GameError> {
        self.buildings
            .upgrade(kind, self.tower.floor, &mut self.wallet)
    }

    pub fn start_research(&mut self, kind: ResearchKind) -> Result<u32, GameError> {
        let lab = self.buildings.level(BuildingKind::Laboratory);
        let level = self
            .research
            .start(kind, self.tower.floor, lab, &mut self.wallet)?;
        self.apply_research_effects();
        Ok(level)
    }

    pub fn craft<R: Rng + ?Sized>(&mut self, output: ItemKind, rng: &mut R) -> Result<CraftOutcome, GameError> {
        let forge = Forge {
            level: self.buildings.level(BuildingKind::Forge),
            has_blacksmith: self.roles.holder(Role::Blacksmith).is_some(),
            unlocked: &self.recipes,
        };
        forge.craft(output, &mut self.storage, rng)
    }

    pub fn floor_preview(&self) -> FloorPreview {
        encounter::preview(self.tower.floor)
    }
}
