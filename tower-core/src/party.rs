//! Parties and roster consistency.
//!
//! Parties hold hero ids, never heroes, so the roster stays the single
//! owner of hero state. [`PartyBook::cleanup_dead_heroes`] reconciles
//! membership with the roster and must run after every combat, after
//! synthesis and after loading a save.

use crate::error::GameError;
use crate::hero::{Hero, HeroId};
use crate::roles::RoleBoard;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

pub const MAX_PARTY_SIZE: usize = 5;

/// 1-based party number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(pub u32);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub heroes: Vec<HeroId>,
    pub unlocked: bool,
}

impl Party {
    pub fn new(id: PartyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            heroes: Vec::new(),
            unlocked: true,
        }
    }

    pub fn is_full(&self) -> bool {
        self.heroes.len() >= MAX_PARTY_SIZE
    }

    pub fn contains(&self, hero: HeroId) -> bool {
        self.heroes.contains(&hero)
    }
}

/// All parties plus the unlock limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBook {
    parties: Vec<Party>,
    max_parties: usize,
    current_party: PartyId,
}

impl Default for PartyBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PartyBook {
    /// One unlocked party, "Main Group".
    pub fn new() -> Self {
        Self {
            parties: vec![Party::new(PartyId(1), "Main Group")],
            max_parties: 1,
            current_party: PartyId(1),
        }
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn max_parties(&self) -> usize {
        self.max_parties
    }

    pub fn current_party(&self) -> PartyId {
        self.current_party
    }

    pub fn get(&self, id: PartyId) -> Result<&Party, GameError> {
        self.parties
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::UnknownParty(id))
    }

    fn get_mut(&mut self, id: PartyId) -> Result<&mut Party, GameError> {
        self.parties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::UnknownParty(id))
    }

    /// Party at a 1-based display position.
    pub fn by_position(&self, position: usize) -> Option<PartyId> {
        position
            .checked_sub(1)
            .and_then(|idx| self.parties.get(idx))
            .map(|p| p.id)
    }

    pub fn party_of(&self, hero: HeroId) -> Option<PartyId> {
        self.parties
            .iter()
            .find(|p| p.contains(hero))
            .map(|p| p.id)
    }

    /// A hero can join `excluding` (or any party when `None`) if they are
    /// alive, not in a different party and not holding a role.
    pub fn is_hero_available(
        &self,
        hero: &Hero,
        excluding: Option<PartyId>,
        roles: &RoleBoard,
    ) -> bool {
        if !hero.is_alive || roles.is_assigned(hero.id) {
            return false;
        }
        !self
            .parties
            .iter()
            .any(|p| Some(p.id) != excluding && p.contains(hero.id))
    }

    /// Heroes that could be added to `party` right now.
    pub fn available_heroes(&self, party: PartyId, roster: &[Hero], roles: &RoleBoard) -> Vec<HeroId> {
        let members: HashSet<HeroId> = self
            .get(party)
            .map(|p| p.heroes.iter().copied().collect())
            .unwrap_or_default();
        roster
            .iter()
            .filter(|h| !members.contains(&h.id) && self.is_hero_available(h, Some(party), roles))
            .map(|h| h.id)
            .collect()
    }

    pub fn add_hero_to_party(
        &mut self,
        party: PartyId,
        hero: HeroId,
        roster: &[Hero],
        roles: &RoleBoard,
    ) -> Result<(), GameError> {
        let found = roster
            .iter()
            .find(|h| h.id == hero)
            .ok_or(GameError::UnknownHero(hero))?;
        let target = self.get(party)?;
        if target.contains(hero) {
            return Err(GameError::HeroUnavailable { hero });
        }
        if target.is_full() {
            return Err(GameError::PartyFull);
        }
        if !self.is_hero_available(found, Some(party), roles) {
            return Err(GameError::HeroUnavailable { hero });
        }
        self.get_mut(party)?.heroes.push(hero);
        Ok(())
    }

    pub fn remove_hero_from_party(&mut self, party: PartyId, hero: HeroId) -> bool {
        let Ok(target) = self.get_mut(party) else {
            return false;
        };
        let before = target.heroes.len();
        target.heroes.retain(|h| *h != hero);
        target.heroes.len() != before
    }

    /// Living members of `party` in party order.
    pub fn party_heroes(&self, party: PartyId, roster: &[Hero]) -> Result<Vec<HeroId>, GameError> {
        let target = self.get(party)?;
        Ok(target
            .heroes
            .iter()
            .copied()
            .filter(|id| roster.iter().any(|h| h.id == *id && h.is_alive))
            .collect())
    }

    pub fn can_unlock_new_party(&self) -> bool {
        self.parties.len() < self.max_parties
    }

    pub fn unlock_new_party(&mut self, name: impl Into<String>) -> Result<PartyId, GameError> {
        if !self.can_unlock_new_party() {
            return Err(GameError::MissingPrerequisite(format!(
                "Party limit reached ({}); research Party Expansion for more",
                self.max_parties
            )));
        }
        let id = PartyId(self.parties.len() as u32 + 1);
        self.parties.push(Party::new(id, name));
        Ok(id)
    }

    /// Raise the party limit and create any missing parties up to it.
    /// Returns the ids created.
    pub fn ensure_slots(&mut self, max_parties: usize) -> Vec<PartyId> {
        self.max_parties = self.max_parties.max(max_parties);
        let mut created = Vec::new();
        for n in 2..=self.max_parties as u32 {
            let id = PartyId(n);
            if self.get(id).is_err() {
                self.parties.push(Party::new(id, format!("Battle Group #{n}")));
                created.push(id);
            }
        }
        self.parties.sort_by_key(|p| p.id);
        created
    }

    /// Drop members that are dead, missing from the roster or already
    /// listed in an earlier party, relieving each dropped hero of any role.
    /// Returns the dropped ids; a second call returns nothing.
    pub fn cleanup_dead_heroes(&mut self, roster: &[Hero], roles: &mut RoleBoard) -> Vec<HeroId> {
        let mut seen = HashSet::new();
        let mut removed = Vec::new();
        for party in &mut self.parties {
            party.heroes.retain(|id| {
                let alive = roster.iter().any(|h| h.id == *id && h.is_alive);
                if alive && seen.insert(*id) {
                    true
                } else {
                    removed.push(*id);
                    false
                }
            });
        }
        for id in &removed {
            if !roster.iter().any(|h| h.id == *id && h.is_alive) {
                roles.remove_hero(*id);
            }
        }
        if !removed.is_empty() {
            debug!(count = removed.len(), "Removed heroes from parties");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::Attributes;
    use crate::traits::CharacterTrait;

    fn roster(n: usize) -> Vec<Hero> {
        (0..n)
            .map(|i| Hero::new(format!("Hero {i}"), 1, Attributes::uniform(10), CharacterTrait::Calm))
            .collect()
    }

    #[test]
    fn test_party_size_cap() {
        let heroes = roster(6);
        let roles = RoleBoard::new();
        let mut book = PartyBook::new();
        for h in &heroes[..5] {
            book.add_hero_to_party(PartyId(1), h.id, &heroes, &roles).unwrap();
        }
        assert_eq!(
            book.add_hero_to_party(PartyId(1), heroes[5].id, &heroes, &roles),
            Err(GameError::PartyFull)
        );
    }

    #[test]
    fn test_hero_in_one_party_only() {
        let heroes = roster(1);
        let roles = RoleBoard::new();
        let mut book = PartyBook::new();
        book.ensure_slots(2);
        book.add_hero_to_party(PartyId(1), heroes[0].id, &heroes, &roles).unwrap();
        assert_eq!(
            book.add_hero_to_party(PartyId(2), heroes[0].id, &heroes, &roles),
            Err(GameError::HeroUnavailable { hero: heroes[0].id })
        );
        assert_eq!(
            book.add_hero_to_party(PartyId(1), heroes[0].id, &heroes, &roles),
            Err(GameError::HeroUnavailable { hero: heroes[0].id })
        );
        assert!(book.is_hero_available(&heroes[0], Some(PartyId(1)), &roles));
        assert!(!book.is_hero_available(&heroes[0], Some(PartyId(2)), &roles));
    }

    #[test]
    fn test_dead_hero_cannot_join() {
        let mut heroes = roster(1);
        heroes[0].take_damage(10_000);
        let mut book = PartyBook::new();
        let err = book
            .add_hero_to_party(PartyId(1), heroes[0].id, &heroes, &RoleBoard::new())
            .unwrap_err();
        assert_eq!(err, GameError::HeroUnavailable { hero: heroes[0].id });
    }

    #[test]
    fn test_available_heroes_filters_roster() {
        use crate::buildings::{BuildingKind, Buildings};
        use crate::roles::Role;
        use crate::wallet::Wallet;

        let mut heroes = roster(5);
        let mut book = PartyBook::new();
        book.ensure_slots(2);
        let mut roles = RoleBoard::new();
        let mut buildings = Buildings::new();
        buildings
            .upgrade(BuildingKind::Forge, 7, &mut Wallet::new(10_000, 0))
            .unwrap();

        book.add_hero_to_party(PartyId(1), heroes[0].id, &heroes, &roles).unwrap();
        book.add_hero_to_party(PartyId(2), heroes[1].id, &heroes, &roles).unwrap();
        heroes[2].take_damage(10_000);
        roles
            .assign(Role::Blacksmith, &heroes[3], &book, &buildings)
            .unwrap();

        assert_eq!(
            book.available_heroes(PartyId(1), &heroes, &roles),
            vec![heroes[4].id]
        );
        assert_eq!(
            book.available_heroes(PartyId(2), &heroes, &roles),
            vec![heroes[4].id]
        );
    }

    #[test]
    fn test_unknown_party_and_hero() {
        let heroes = roster(1);
        let mut book = PartyBook::new();
        let roles = RoleBoard::new();
        assert_eq!(
            book.add_hero_to_party(PartyId(9), heroes[0].id, &heroes, &roles),
            Err(GameError::UnknownParty(PartyId(9)))
        );
        let stranger = HeroId::new();
        assert_eq!(
            book.add_hero_to_party(PartyId(1), stranger, &heroes, &roles),
            Err(GameError::UnknownHero(stranger))
        );
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut heroes = roster(3);
        let mut roles = RoleBoard::new();
        let mut book = PartyBook::new();
        for h in &heroes {
            book.add_hero_to_party(PartyId(1), h.id, &heroes, &roles).unwrap();
        }
        heroes[1].take_damage(10_000);
        let gone = heroes.remove(2).id;

        let removed = book.cleanup_dead_heroes(&heroes, &mut roles);
        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&gone));
        assert_eq!(book.get(PartyId(1)).unwrap().heroes, vec![heroes[0].id]);

        let snapshot = book.clone();
        assert!(book.cleanup_dead_heroes(&heroes, &mut roles).is_empty());
        assert_eq!(book, snapshot);
    }

    #[test]
    fn test_unlock_and_ensure_slots() {
        let mut book = PartyBook::new();
        assert!(book.unlock_new_party("Second").is_err());
        let created = book.ensure_slots(3);
        assert_eq!(created, vec![PartyId(2), PartyId(3)]);
        assert_eq!(book.get(PartyId(3)).unwrap().name, "Battle Group #3");
        assert!(book.ensure_slots(3).is_empty());
        assert_eq!(book.by_position(2), Some(PartyId(2)));
        assert_eq!(book.by_position(0), None);
    }

    #[test]
    fn test_party_heroes_skip_the_dead() {
        let mut heroes = roster(2);
        let roles = RoleBoard::new();
        let mut book = PartyBook::new();
        for h in &heroes {
            book.add_hero_to_party(PartyId(1), h.id, &heroes, &roles).unwrap();
        }
        heroes[0].take_damage(10_000);
        assert_eq!(book.party_heroes(PartyId(1), &heroes).unwrap(), vec![heroes[1].id]);
    }
}
