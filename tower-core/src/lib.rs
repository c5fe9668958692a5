//! Tower-climbing idle RPG engine.
//!
//! This crate provides:
//! - Heroes with star tiers, traits and trait-driven combat actions
//! - Floor encounters with cached rosters and boss abilities
//! - Parties, roles, buildings, research, storage and crafting
//! - Async save slots
//!
//! # Quick Start
//!
//! ```ignore
//! use tower_core::{GameSession, PartyId, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::new(SessionConfig::new("saves"));
//!
//!     let hero = session.summon_hero(None)?.id;
//!     session.add_hero_to_party(PartyId(1), hero)?;
//!
//!     if let Some(report) = session.send_to_tower("1").await? {
//!         for line in &report.combat.log {
//!             println!("{line}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod buildings;
pub mod combat;
pub mod crafting;
pub mod dice;
pub mod encounter;
pub mod error;
pub mod hero;
pub mod items;
pub mod logging;
pub mod monster;
pub mod party;
pub mod persist;
pub mod research;
pub mod rewards;
pub mod roles;
pub mod session;
pub mod state;
pub mod storage;
pub mod summon;
pub mod synergy;
pub mod synthesis;
pub mod testing;
pub mod tower;
pub mod traits;
pub mod wallet;

// Primary public API
pub use combat::{CombatOutcome, CombatReport};
pub use error::GameError;
pub use hero::{Hero, HeroId};
pub use logging::{init_tracing, TracingConfig};
pub use monster::{Monster, MonsterId};
pub use party::PartyId;
pub use persist::{PersistError, SavedGame};
pub use session::{GameSession, SessionConfig, SessionError};
pub use state::GameState;
pub use testing::TestHarness;
pub use tower::ExpeditionReport;
pub use traits::CharacterTrait;
pub use wallet::Wallet;
