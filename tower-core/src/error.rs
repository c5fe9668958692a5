//! Game-logic rejections.
//!
//! None of these are fatal: they carry a human-readable reason and the
//! operation that returned one has left the game state unchanged.

use crate::hero::HeroId;
use crate::party::PartyId;
use crate::wallet::Currency;
use thiserror::Error;

/// Why a player action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not enough {currency}: need {needed}, have {available}")]
    InsufficientFunds {
        needed: u64,
        available: u64,
        currency: Currency,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("{0}")]
    MissingPrerequisite(String),

    #[error("no hero with id {0}")]
    UnknownHero(HeroId),

    #[error("party {0} does not exist")]
    UnknownParty(PartyId),

    #[error("party is full")]
    PartyFull,

    #[error("hero {hero} is not available")]
    HeroUnavailable { hero: HeroId },

    #[error("the dormitory is full ({capacity} heroes)")]
    RosterFull { capacity: usize },
}

impl GameError {
    /// Shorthand for a failed purchase.
    pub fn funds(currency: Currency, needed: u64, available: u64) -> Self {
        GameError::InsufficientFunds {
            needed,
            available,
            currency,
        }
    }
}
