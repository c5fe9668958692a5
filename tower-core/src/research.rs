//! Laboratory research.
//!
//! Research levels are revealed by reaching tower floors, cost gold and
//! crystals scaled by the level being bought, and require a built
//! laboratory. Their effects are derived from levels alone so they can be
//! re-applied after loading a save.

use crate::error::GameError;
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResearchKind {
    /// Reveals heroes' hidden attributes.
    HeroUnderstanding,
    /// One extra party per level.
    PartyExpansion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub base_gold: u64,
    pub base_crystals: u64,
    pub max_level: u32,
    pub min_lab_level: u32,
    /// Floor that reveals each level, by index.
    pub reveal_floors: &'static [u32],
}

impl ResearchKind {
    pub const ALL: [ResearchKind; 2] = [ResearchKind::HeroUnderstanding, ResearchKind::PartyExpansion];

    pub fn spec(&self) -> ResearchSpec {
        match self {
            ResearchKind::HeroUnderstanding => ResearchSpec {
                name: "Hero Understanding",
                description: "Shows heroes' hidden attributes",
                base_gold: 500,
                base_crystals: 50,
                max_level: 1,
                min_lab_level: 1,
                reveal_floors: &[5],
            },
            ResearchKind::PartyExpansion => ResearchSpec {
                name: "Party Expansion",
                description: "Allows additional battle groups",
                base_gold: 100,
                base_crystals: 10,
                max_level: 3,
                min_lab_level: 1,
                reveal_floors: &[5, 10, 15],
            },
        }
    }
}

impl fmt::Display for ResearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec().name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Research {
    pub kind: ResearchKind,
    pub level: u32,
}

impl Research {
    pub fn is_complete(&self) -> bool {
        self.level >= self.kind.spec().max_level
    }

    /// Whether the next level has been revealed by `floor`. Levels past
    /// the end of the reveal list are never floor-gated.
    pub fn next_level_revealed(&self, floor: u32) -> bool {
        let spec = self.kind.spec();
        let next = self.level + 1;
        if next > spec.max_level {
            return false;
        }
        spec.reveal_floors
            .get((next - 1) as usize)
            .map(|required| floor >= *required)
            .unwrap_or(true)
    }

    /// `(gold, crystals)` for the next level.
    pub fn next_level_cost(&self) -> (u64, u64) {
        let spec = self.kind.spec();
        let next = (self.level + 1) as u64;
        (spec.base_gold * next, spec.base_crystals * next)
    }
}

/// Derived effects of all research levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchEffects {
    pub hero_understanding: bool,
    pub max_parties: usize,
}

/// Research levels, one entry per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchBook {
    entries: Vec<Research>,
}

impl Default for ResearchBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchBook {
    pub fn new() -> Self {
        Self {
            entries: ResearchKind::ALL
                .into_iter()
                .map(|kind| Research { kind, level: 0 })
                .collect(),
        }
    }

    pub fn get(&self, kind: ResearchKind) -> Research {
        self.entries
            .iter()
            .find(|r| r.kind == kind)
            .copied()
            .unwrap_or(Research { kind, level: 0 })
    }

    pub fn level(&self, kind: ResearchKind) -> u32 {
        self.get(kind).level
    }

    /// Listed in the laboratory: not finished and next level revealed.
    pub fn is_visible(&self, kind: ResearchKind, floor: u32) -> bool {
        let research = self.get(kind);
        !research.is_complete() && research.next_level_revealed(floor)
    }

    pub fn visible(&self, floor: u32) -> Vec<ResearchKind> {
        ResearchKind::ALL
            .into_iter()
            .filter(|k| self.is_visible(*k, floor))
            .collect()
    }

    /// Check every requirement for the next level without changing anything.
    pub fn can_research(
        &self,
        kind: ResearchKind,
        floor: u32,
        lab_level: u32,
        wallet: &Wallet,
    ) -> Result<(), GameError> {
        let research = self.get(kind);
        let spec = kind.spec();
        if research.is_complete() {
            return Err(GameError::MissingPrerequisite(format!(
                "{} is already at its maximum level",
                spec.name
            )));
        }
        if !research.next_level_revealed(floor) {
            return Err(GameError::MissingPrerequisite(
                "Clear a higher floor to reveal the next level".to_string(),
            ));
        }
        if lab_level < spec.min_lab_level {
            return Err(GameError::MissingPrerequisite(format!(
                "Requires Laboratory level {}",
                spec.min_lab_level
            )));
        }
        let (gold, crystals) = research.next_level_cost();
        if let Some((currency, needed, available)) = wallet.shortfall(gold, crystals) {
            return Err(GameError::funds(currency, needed, available));
        }
        Ok(())
    }

    /// Pay for and complete the next level. Returns the new level.
    pub fn start(
        &mut self,
        kind: ResearchKind,
        floor: u32,
        lab_level: u32,
        wallet: &mut Wallet,
    ) -> Result<u32, GameError> {
        self.can_research(kind, floor, lab_level, wallet)?;
        let (gold, crystals) = self.get(kind).next_level_cost();
        if !wallet.try_spend(gold, crystals) {
            return Err(GameError::MissingPrerequisite("Payment failed".to_string()));
        }

        let level = match self.entries.iter_mut().find(|r| r.kind == kind) {
            Some(entry) => {
                entry.level += 1;
                entry.level
            }
            None => {
                self.entries.push(Research { kind, level: 1 });
                1
            }
        };
        info!(research = %kind, level, gold, crystals, "Research completed");
        Ok(level)
    }

    pub fn effects(&self) -> ResearchEffects {
        ResearchEffects {
            hero_understanding: self.level(ResearchKind::HeroUnderstanding) > 0,
            max_parties: 1 + self.level(ResearchKind::PartyExpansion) as usize,
        }
    }

    /// Clamp levels loaded from an old or edited save into range.
    pub fn normalize(&mut self) {
        for entry in &mut self.entries {
            entry.level = entry.level.min(entry.kind.spec().max_level);
        }
    }
}
