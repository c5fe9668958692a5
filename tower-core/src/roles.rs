//! Production roles held by heroes outside of combat.

use crate::buildings::{BuildingKind, Buildings};
use crate::error::GameError;
use crate::hero::{Hero, HeroId};
use crate::party::PartyBook;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Cook,
    Blacksmith,
    Researcher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Cook, Role::Blacksmith, Role::Researcher];

    /// The building the role works in.
    pub fn building(&self) -> BuildingKind {
        match self {
            Role::Cook => BuildingKind::Canteen,
            Role::Blacksmith => BuildingKind::Forge,
            Role::Researcher => BuildingKind::Laboratory,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Cook => "Cook",
            Role::Blacksmith => "Blacksmith",
            Role::Researcher => "Researcher",
        }
    }

    pub fn bonus(&self) -> &'static str {
        match self {
            Role::Cook => "Increases experience gained",
            Role::Blacksmith => "Increases crafting success chance",
            Role::Researcher => "Speeds up research",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub hero: HeroId,
}

/// Who holds which role. A role has at most one holder and a hero holds
/// at most one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBoard {
    assignments: Vec<RoleAssignment>,
}

impl RoleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignments(&self) -> &[RoleAssignment] {
        &self.assignments
    }

    pub fn holder(&self, role: Role) -> Option<HeroId> {
        self.assignments
            .iter()
            .find(|a| a.role == role)
            .map(|a| a.hero)
    }

    pub fn role_of(&self, hero: HeroId) -> Option<Role> {
        self.assignments
            .iter()
            .find(|a| a.hero == hero)
            .map(|a| a.role)
    }

    pub fn is_assigned(&self, hero: HeroId) -> bool {
        self.role_of(hero).is_some()
    }

    /// Put `hero` in `role`. A hero already holding another role moves;
    /// a previous holder of `role` is relieved and returned.
    pub fn assign(
        &mut self,
        role: Role,
        hero: &Hero,
        parties: &PartyBook,
        buildings: &Buildings,
    ) -> Result<Option<HeroId>, GameError> {
        if !hero.is_alive || parties.party_of(hero.id).is_some() {
            return Err(GameError::HeroUnavailable { hero: hero.id });
        }
        if !buildings.is_built(role.building()) {
            return Err(GameError::MissingPrerequisite(format!(
                "{} is not built",
                role.building()
            )));
        }

        self.remove_hero(hero.id);
        let previous = self.unassign(role);
        self.assignments.push(RoleAssignment { role, hero: hero.id });
        info!(role = %role, hero = %hero.name, "Role assigned");
        Ok(previous)
    }

    /// Clear a role, returning whoever held it.
    pub fn unassign(&mut self, role: Role) -> Option<HeroId> {
        let idx = self.assignments.iter().position(|a| a.role == role)?;
        Some(self.assignments.remove(idx).hero)
    }

    /// Relieve a hero of any role. Returns whether they held one.
    pub fn remove_hero(&mut self, hero: HeroId) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.hero != hero);
        self.assignments.len() != before
    }

    /// Drop assignments whose hero is dead or no longer in the roster.
    pub fn cleanup(&mut self, roster: &[Hero]) -> usize {
        let before = self.assignments.len();
        self.assignments.retain(|a| {
            roster
                .iter()
                .any(|h| h.id == a.hero && h.is_alive)
        });
        before - self.assignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::Attributes;
    use crate::traits::CharacterTrait;
    use crate::wallet::Wallet;

    fn hero(name: &str) -> Hero {
        Hero::new(name, 1, Attributes::uniform(10), CharacterTrait::Calm)
    }

    fn built_forge() -> Buildings {
        let mut buildings = Buildings::new();
        let mut wallet = Wallet::new(10_000, 0);
        buildings
            .upgrade(BuildingKind::Forge, 7, &mut wallet)
            .unwrap();
        buildings
    }

    #[test]
    fn test_requires_building() {
        let mut board = RoleBoard::new();
        let parties = PartyBook::new();
        let h = hero("Smith");
        let err = board
            .assign(Role::Blacksmith, &h, &parties, &Buildings::new())
            .unwrap_err();
        assert!(matches!(err, GameError::MissingPrerequisite(_)));
        assert!(board.holder(Role::Blacksmith).is_none());
    }

    #[test]
    fn test_assign_and_replace() {
        let mut board = RoleBoard::new();
        let parties = PartyBook::new();
        let buildings = built_forge();
        let a = hero("A");
        let b = hero("B");
        assert_eq!(board.assign(Role::Blacksmith, &a, &parties, &buildings), Ok(None));
        assert_eq!(
            board.assign(Role::Blacksmith, &b, &parties, &buildings),
            Ok(Some(a.id))
        );
        assert_eq!(board.holder(Role::Blacksmith), Some(b.id));
        assert!(!board.is_assigned(a.id));
    }

    #[test]
    fn test_party_member_unavailable() {
        let mut board = RoleBoard::new();
        let mut parties = PartyBook::new();
        let buildings = built_forge();
        let h = hero("Busy");
        let roster = vec![h.clone()];
        parties
            .add_hero_to_party(parties.current_party(), h.id, &roster, &board)
            .unwrap();
        let err = board
            .assign(Role::Blacksmith, &h, &parties, &buildings)
            .unwrap_err();
        assert_eq!(err, GameError::HeroUnavailable { hero: h.id });
    }

    #[test]
    fn test_cleanup_drops_dead_and_missing() {
        let mut board = RoleBoard::new();
        let parties = PartyBook::new();
        let mut buildings = built_forge();
        let mut wallet = Wallet::new(10_000, 0);
        buildings.upgrade(BuildingKind::Canteen, 5, &mut wallet).unwrap();

        let mut dead = hero("Dead");
        let gone = hero("Gone");
        board.assign(Role::Blacksmith, &dead, &parties, &buildings).unwrap();
        board.assign(Role::Cook, &gone, &parties, &buildings).unwrap();
        dead.take_damage(10_000);

        assert_eq!(board.cleanup(&[dead.clone()]), 2);
        assert!(board.assignments().is_empty());
        assert_eq!(board.cleanup(&[dead]), 0);
    }
}
