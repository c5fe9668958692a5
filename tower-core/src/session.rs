//! GameSession - the primary public API for tower play.
//!
//! A session owns the [`GameState`], its configuration and the random
//! source, and exposes every player action as a single call. Going up
//! the tower autosaves to the configured slot.

use crate::buildings::BuildingKind;
use crate::crafting::CraftOutcome;
use crate::encounter::FloorPreview;
use crate::error::GameError;
use crate::hero::{Hero, HeroId};
use crate::items::ItemKind;
use crate::party::PartyId;
use crate::persist::{self, PersistError, SavedGame};
use crate::research::ResearchKind;
use crate::roles::Role;
use crate::state::{GameState, Reconciliation, STARTING_CRYSTALS, STARTING_GOLD};
use crate::summon::SUMMON_COST;
use crate::synthesis::SynthesisResult;
use crate::tower::{self, ExpeditionReport, HealReport, HEAL_COST};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the save slots.
    pub save_dir: PathBuf,

    pub slot: u32,

    pub starting_gold: u64,

    pub starting_crystals: u64,

    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,

    /// Save after every expedition.
    pub autosave: bool,

    pub summon_cost: u64,

    pub heal_cost: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("saves")
    }
}

impl SessionConfig {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            slot: 1,
            starting_gold: STARTING_GOLD,
            starting_crystals: STARTING_CRYSTALS,
            seed: None,
            autosave: true,
            summon_cost: SUMMON_COST,
            heal_cost: HEAL_COST,
        }
    }

    pub fn with_slot(mut self, slot: u32) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_starting_gold(mut self, gold: u64) -> Self {
        self.starting_gold = gold;
        self
    }

    pub fn with_starting_crystals(mut self, crystals: u64) -> Self {
        self.starting_crystals = crystals;
        self
    }

    /// Path of the configured save slot.
    pub fn save_path(&self) -> PathBuf {
        persist::slot_path(&self.save_dir, self.slot)
    }

    /// Read a config from a JSON file. Missing fields take their defaults.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = persist::read_save(path.as_ref()).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ============================================================================
// Session
// ============================================================================

/// A tower game session.
pub struct GameSession {
    state: GameState,
    config: SessionConfig,
    rng: StdRng,
}

impl GameSession {
    /// Start a fresh game.
    pub fn new(config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = GameState::new(config.starting_gold, config.starting_crystals);
        Self { state, config, rng }
    }

    /// Start a session and load its configured slot.
    pub async fn resume(config: SessionConfig) -> Result<Self, SessionError> {
        let mut session = Self::new(config);
        session.load().await?;
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access to the state.
    ///
    /// Use with caution - changes made here skip the game rules.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ========================================================================
    // Heroes
    // ========================================================================

    pub fn summon_hero(&mut self, name: Option<String>) -> Result<&Hero, GameError> {
        self.state
            .summon_hero(name, self.config.summon_cost, &mut self.rng)
    }

    pub fn synthesize(&mut self, base: HeroId, sacrifices: &[HeroId]) -> Result<SynthesisResult, GameError> {
        self.state.synthesize(base, sacrifices, &mut self.rng)
    }

    pub fn heal_all(&mut self) -> Result<HealReport, GameError> {
        self.state.heal_all(self.config.heal_cost)
    }

    // ========================================================================
    // Parties and roles
    // ========================================================================

    pub fn add_hero_to_party(&mut self, party: PartyId, hero: HeroId) -> Result<(), GameError> {
        self.state.add_hero_to_party(party, hero)
    }

    pub fn remove_hero_from_party(&mut self, party: PartyId, hero: HeroId) -> Result<(), GameError> {
        self.state.remove_hero_from_party(party, hero)
    }

    pub fn unlock_party(&mut self, name: Option<String>) -> Result<PartyId, GameError> {
        self.state.unlock_party(name)
    }

    pub fn party_synergy(&self, party: PartyId) -> Result<(f64, String), GameError> {
        self.state.party_synergy(party)
    }

    pub fn assign_role(&mut self, role: Role, hero: HeroId) -> Result<Option<HeroId>, GameError> {
        self.state.assign_role(role, hero)
    }

    pub fn unassign_role(&mut self, role: Role) -> Option<HeroId> {
        self.state.unassign_role(role)
    }

    // ========================================================================
    // Base
    // ========================================================================

    pub fn upgrade_building(&mut self, kind: BuildingKind) -> Result<u32, GameError> {
        self.state.upgrade_building(kind)
    }

    pub fn start_research(&mut self, kind: ResearchKind) -> Result<u32, GameError> {
        self.state.start_research(kind)
    }

    pub fn craft(&mut self, output: ItemKind) -> Result<CraftOutcome, GameError> {
        self.state.craft(output, &mut self.rng)
    }

    // ========================================================================
    // Tower
    // ========================================================================

    pub fn floor_preview(&self) -> FloorPreview {
        self.state.floor_preview()
    }

    /// Send the parties named by `selection` ("1" or "1,2") up the current
    /// floor. `Ok(None)` means the player backed out.
    pub async fn send_to_tower(&mut self, selection: &str) -> Result<Option<ExpeditionReport>, SessionError> {
        let floor = self.state.tower.floor;
        let Some(parties) = tower::parse_selection(selection, &self.state.parties, floor)? else {
            return Ok(None);
        };
        self.send_parties(&parties).await.map(Some)
    }

    /// Send already-resolved parties up the current floor.
    pub async fn send_parties(&mut self, parties: &[PartyId]) -> Result<ExpeditionReport, SessionError> {
        let report = tower::run_expedition(&mut self.state, parties, &mut self.rng)?;
        if self.config.autosave {
            if let Err(e) = self.save().await {
                warn!(error = %e, slot = self.config.slot, "Autosave failed");
            }
        }
        Ok(report)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save to the configured slot.
    pub async fn save(&self) -> Result<PathBuf, SessionError> {
        let path = self.config.save_path();
        SavedGame::new(self.state.clone(), self.config.slot)
            .save_json(&path)
            .await?;
        Ok(path)
    }

    /// Replace the current game with the configured slot. On error the
    /// current game is left as it was.
    pub async fn load(&mut self) -> Result<Reconciliation, SessionError> {
        let path = self.config.save_path();
        let saved = SavedGame::load_json(&path).await?;
        let mut state = saved.state;
        let reconciliation = state.reconcile();
        self.state = state;
        info!(
            path = %path.display(),
            floor = self.state.tower.floor,
            heroes = self.state.heroes.len(),
            "Game loaded"
        );
        Ok(reconciliation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded(dir: &Path) -> GameSession {
        GameSession::new(SessionConfig::new(dir).with_seed(42))
    }

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new("/tmp/saves")
            .with_slot(3)
            .with_seed(7)
            .with_autosave(false)
            .with_starting_gold(500)
            .with_starting_crystals(7);

        assert_eq!(config.slot, 3);
        assert_eq!(config.seed, Some(7));
        assert!(!config.autosave);
        assert_eq!(config.starting_gold, 500);
        assert_eq!(config.starting_crystals, 7);
        assert_eq!(config.summon_cost, 50);
        assert_eq!(config.heal_cost, 100);
        assert!(config.save_path().ends_with("slot_3.json"));

        let session = GameSession::new(config);
        assert_eq!(session.state().wallet.gold, 500);
        assert_eq!(session.state().wallet.crystals, 7);
    }

    #[tokio::test]
    async fn test_config_load_json_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"slot": 4, "seed": 9}"#).expect("write config");

        let config = SessionConfig::load_json(&path).await.expect("Load should succeed");
        assert_eq!(config.slot, 4);
        assert_eq!(config.seed, Some(9));
        assert!(config.autosave);
        assert_eq!(config.starting_gold, 10_000);
    }

    #[test]
    fn test_seeded_sessions_agree() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut a = seeded(temp_dir.path());
        let mut b = seeded(temp_dir.path());
        let ha = a.summon_hero(None).unwrap().clone();
        let hb = b.summon_hero(None).unwrap().clone();
        assert_eq!(ha.name, "Hero 1");
        assert_eq!(ha.star, hb.star);
        assert_eq!(ha.attributes, hb.attributes);
        assert_eq!(ha.character_trait, hb.character_trait);
        assert_eq!(a.state().wallet.gold, 10_000 - 50);
    }

    #[tokio::test]
    async fn test_back_out_of_selection() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = seeded(temp_dir.path());
        let before = session.state().clone();
        assert!(session.send_to_tower("b").await.unwrap().is_none());
        assert_eq!(session.state(), &before);
        assert!(!session.config().save_path().exists());
    }

    #[tokio::test]
    async fn test_rejected_selection_leaves_state() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = seeded(temp_dir.path());
        let before = session.state().clone();
        let err = session.send_to_tower("1").await.unwrap_err();
        assert!(matches!(err, SessionError::Game(GameError::InvalidSelection(_))));
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn test_expedition_autosaves() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = seeded(temp_dir.path());
        let hero = session.summon_hero(None).unwrap().id;
        session.add_hero_to_party(PartyId(1), hero).unwrap();

        let report = session
            .send_to_tower("1")
            .await
            .unwrap()
            .expect("a party was selected");
        assert_eq!(report.floor, 1);
        assert!(session.config().save_path().exists());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = seeded(temp_dir.path());
        session.summon_hero(Some("Aria".to_string())).unwrap();
        session.save().await.expect("Save should succeed");
        let saved = session.state().clone();

        session.summon_hero(None).unwrap();
        session.load().await.expect("Load should succeed");
        assert_eq!(session.state(), &saved);

        let resumed = GameSession::resume(SessionConfig::new(temp_dir.path()))
            .await
            .expect("Resume should succeed");
        assert_eq!(resumed.state().heroes[0].name, "Aria");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_game() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = seeded(temp_dir.path());
        session.summon_hero(None).unwrap();
        let before = session.state().clone();

        let err = session.load().await.unwrap_err();
        assert!(matches!(err, SessionError::Persist(PersistError::NotFound(_))));
        assert_eq!(session.state(), &before);
    }
}
