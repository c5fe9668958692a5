//! Heroes: hidden attributes, derived stats, leveling and damage.
//!
//! A hero's six attributes are rolled once from its star tier and never
//! change except for synthesis bumps. Everything combat reads (health,
//! mana, attack, defense) is derived from attributes and level and is
//! recomputed whenever either changes.

use crate::dice;
use crate::traits::CharacterTrait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Stable identifier for heroes, persisted with the save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeroId(pub Uuid);

impl HeroId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HeroId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Star Tiers
// ============================================================================

pub const MIN_STAR: u8 = 1;
pub const MAX_STAR: u8 = 7;

const STAR_LEVELS: [(u32, u32); 7] = [
    (1, 10),
    (11, 20),
    (21, 40),
    (41, 60),
    (61, 80),
    (81, 100),
    (101, 120),
];

/// Inclusive level band `(min, max)` for a star tier. Out-of-range tiers
/// are clamped into 1..=7.
pub fn level_band(star: u8) -> (u32, u32) {
    STAR_LEVELS[(star.clamp(MIN_STAR, MAX_STAR) - 1) as usize]
}

/// `"★★★"` for a three-star hero.
pub fn star_string(star: u8) -> String {
    "★".repeat(star as usize)
}

// ============================================================================
// Attributes
// ============================================================================

/// The six hidden attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Dexterity => "Dexterity",
            Attribute::Constitution => "Constitution",
            Attribute::Intelligence => "Intelligence",
            Attribute::Wisdom => "Wisdom",
            Attribute::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Attribute; 6] {
        [
            Attribute::Strength,
            Attribute::Dexterity,
            Attribute::Constitution,
            Attribute::Intelligence,
            Attribute::Wisdom,
            Attribute::Charisma,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Attribute container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Attributes {
    /// Every attribute set to `value`.
    pub fn uniform(value: i32) -> Self {
        Self {
            strength: value,
            dexterity: value,
            constitution: value,
            intelligence: value,
            wisdom: value,
            charisma: value,
        }
    }

    /// Roll `5 + 3×star + [0,5]` for each attribute.
    pub fn roll<R: Rng + ?Sized>(star: u8, rng: &mut R) -> Self {
        let base = 5 + 3 * star as i32;
        let mut roll = || base + dice::roll_between(rng, 0, 5);
        Self {
            strength: roll(),
            dexterity: roll(),
            constitution: roll(),
            intelligence: roll(),
            wisdom: roll(),
            charisma: roll(),
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn get_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        }
    }
}

// ============================================================================
// Damage
// ============================================================================

/// Damage after defense. A hit always lands for at least 1.
pub fn mitigate(raw_damage: i32, defense: i32) -> i32 {
    (raw_damage - defense).max(1)
}

/// Outcome of a single `take_damage` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageReport {
    pub actual_damage: i32,
    pub message: String,
    pub died: bool,
}

impl DamageReport {
    pub(crate) fn already_down(name: &str) -> Self {
        Self {
            actual_damage: 0,
            message: format!("{name} has already fallen."),
            died: false,
        }
    }
}

// ============================================================================
// Hero
// ============================================================================

/// A summoned hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub star: u8,
    pub level: u32,
    pub experience: u64,
    pub exp_to_next_level: u64,
    pub attributes: Attributes,
    pub health_current: i32,
    pub health_max: i32,
    pub mana_current: i32,
    pub mana_max: i32,
    pub attack: i32,
    pub defense: i32,
    pub character_trait: CharacterTrait,
    pub is_alive: bool,
    #[serde(default)]
    pub stunned: bool,
}

impl Hero {
    /// Build a hero at the bottom of its star tier's level band, at full
    /// health and mana.
    pub fn new(
        name: impl Into<String>,
        star: u8,
        attributes: Attributes,
        character_trait: CharacterTrait,
    ) -> Self {
        let star = star.clamp(MIN_STAR, MAX_STAR);
        let (level, _) = level_band(star);
        let mut hero = Self {
            id: HeroId::new(),
            name: name.into(),
            star,
            level,
            experience: 0,
            exp_to_next_level: level as u64 * 100,
            attributes,
            health_current: 0,
            health_max: 0,
            mana_current: 0,
            mana_max: 0,
            attack: 0,
            defense: 0,
            character_trait,
            is_alive: true,
            stunned: false,
        };
        hero.recompute_stats();
        hero.health_current = hero.health_max;
        hero.mana_current = hero.mana_max;
        hero
    }

    /// Roll attributes and a trait for a freshly summoned hero.
    pub fn summon<R: Rng + ?Sized>(name: impl Into<String>, star: u8, rng: &mut R) -> Self {
        let attributes = Attributes::roll(star, rng);
        let character_trait = CharacterTrait::random(rng);
        Self::new(name, star, attributes, character_trait)
    }

    pub fn level_band(&self) -> (u32, u32) {
        level_band(self.star)
    }

    pub fn level_cap(&self) -> u32 {
        self.level_band().1
    }

    fn recompute_stats(&mut self) {
        let a = &self.attributes;
        let level = self.level as i32;
        self.health_max = 20 + 3 * a.constitution + 2 * level;
        self.mana_max = 10 + 2 * a.intelligence + level;
        self.attack = 3 + a.strength / 2 + a.dexterity / 3 + level;
        self.defense = 1 + a.constitution / 3 + a.wisdom / 4;
    }

    /// Recompute derived stats after an attribute change, keeping current
    /// health and mana within the new maxima.
    pub fn refresh_stats(&mut self) {
        self.recompute_stats();
        self.health_current = self.health_current.clamp(0, self.health_max);
        self.mana_current = self.mana_current.clamp(0, self.mana_max);
    }

    /// Apply a hit. Health is clamped at zero and death is one-way.
    pub fn take_damage(&mut self, raw_damage: i32) -> DamageReport {
        if !self.is_alive {
            return DamageReport::already_down(&self.name);
        }
        let actual_damage = mitigate(raw_damage, self.defense);
        self.health_current -= actual_damage;
        if self.health_current <= 0 {
            self.health_current = 0;
            self.is_alive = false;
            self.stunned = false;
            return DamageReport {
                actual_damage,
                message: format!("{} takes {} damage and falls!", self.name, actual_damage),
                died: true,
            };
        }
        DamageReport {
            actual_damage,
            message: format!(
                "{} takes {} damage ({}/{} HP left).",
                self.name, actual_damage, self.health_current, self.health_max
            ),
            died: false,
        }
    }

    /// Restore up to `amount` health. Returns how much was restored. The
    /// dead are not healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive || amount <= 0 {
            return 0;
        }
        let before = self.health_current;
        self.health_current = (self.health_current + amount).min(self.health_max);
        self.health_current - before
    }

    pub fn is_wounded(&self) -> bool {
        self.is_alive
            && (self.health_current < self.health_max || self.mana_current < self.mana_max)
    }

    /// Restore health and mana to their maxima. Returns false for the dead,
    /// who stay dead.
    pub fn heal_full(&mut self) -> bool {
        if !self.is_alive {
            return false;
        }
        self.health_current = self.health_max;
        self.mana_current = self.mana_max;
        true
    }

    /// Grant experience, leveling up while the threshold is met and the
    /// star tier's cap is not reached.
    pub fn add_experience(&mut self, amount: u64) -> String {
        let cap = self.level_cap();
        if self.level >= cap {
            return format!("{} is already at max level ({}).", self.name, cap);
        }

        let start_level = self.level;
        self.experience += amount;
        while self.experience >= self.exp_to_next_level && self.level < cap {
            self.experience -= self.exp_to_next_level;
            self.level_up();
        }

        if self.level > start_level {
            format!(
                "{} gains {} exp and reaches level {}!",
                self.name, amount, self.level
            )
        } else {
            format!(
                "{} gains {} exp ({}/{}).",
                self.name, amount, self.experience, self.exp_to_next_level
            )
        }
    }

    fn level_up(&mut self) {
        let (health, health_max) = (self.health_current, self.health_max);
        let (mana, mana_max) = (self.mana_current, self.mana_max);

        self.level += 1;
        self.exp_to_next_level = self.level as u64 * 100;
        self.recompute_stats();

        self.health_current = carry_ratio(health, health_max, self.health_max);
        self.mana_current = carry_ratio(mana, mana_max, self.mana_max);
    }

    /// At the level cap of a tier that still has room above it.
    pub fn can_star_up(&self) -> bool {
        self.level >= self.level_cap() && self.star < MAX_STAR
    }

    /// Combined attack and defense, used for difficulty estimates.
    pub fn power(&self) -> i32 {
        self.attack + self.defense
    }

    /// One-line status for rosters and combat logs.
    pub fn summary(&self) -> String {
        let status = if self.is_alive { "" } else { " [fallen]" };
        format!(
            "{} {} Lv.{} HP {}/{} MP {}/{} ATK {} DEF {} ({}){}",
            self.name,
            star_string(self.star),
            self.level,
            self.health_current,
            self.health_max,
            self.mana_current,
            self.mana_max,
            self.attack,
            self.defense,
            self.character_trait,
            status
        )
    }

    /// Attribute sheet, masked unless hidden stats have been researched.
    pub fn attribute_sheet(&self, revealed: bool) -> String {
        Attribute::all()
            .iter()
            .map(|attr| {
                if revealed {
                    format!("{}: {}", attr, self.attributes.get(*attr))
                } else {
                    format!("{attr}: ?")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Keep the current/max ratio when the maximum changes.
fn carry_ratio(current: i32, old_max: i32, new_max: i32) -> i32 {
    if old_max <= 0 {
        return new_max;
    }
    let carried = current as i64 * new_max as i64 / old_max as i64;
    (carried as i32).clamp(0, new_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_hero() -> Hero {
        Hero::new("Aria", 1, Attributes::uniform(10), CharacterTrait::Brave)
    }

    #[test]
    fn test_level_band_table() {
        assert_eq!(level_band(1), (1, 10));
        assert_eq!(level_band(3), (21, 40));
        assert_eq!(level_band(7), (101, 120));
        assert_eq!(level_band(0), (1, 10));
        assert_eq!(level_band(9), (101, 120));
    }

    #[test]
    fn test_derived_stats() {
        let hero = sample_hero();
        assert_eq!(hero.level, 1);
        assert_eq!(hero.health_max, 20 + 30 + 2);
        assert_eq!(hero.mana_max, 10 + 20 + 1);
        assert_eq!(hero.attack, 3 + 5 + 3 + 1);
        assert_eq!(hero.defense, 1 + 3 + 2);
        assert_eq!(hero.health_current, hero.health_max);
        assert_eq!(hero.exp_to_next_level, 100);
    }

    #[test]
    fn test_summon_rolls_attributes_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for star in 1..=4u8 {
            let hero = Hero::summon("Rolled", star, &mut rng);
            let base = 5 + 3 * star as i32;
            for attr in Attribute::all() {
                let v = hero.attributes.get(attr);
                assert!((base..=base + 5).contains(&v));
            }
            assert_eq!(hero.level, level_band(star).0);
        }
    }

    #[test]
    fn test_take_damage_respects_defense_floor() {
        let mut hero = sample_hero();
        let report = hero.take_damage(0);
        assert_eq!(report.actual_damage, 1);
        assert!(!report.died);

        let before = hero.health_current;
        let report = hero.take_damage(10);
        assert_eq!(report.actual_damage, 10 - hero.defense);
        assert_eq!(hero.health_current, before - report.actual_damage);
    }

    #[test]
    fn test_lethal_damage_clamps_and_kills() {
        let mut hero = sample_hero();
        let report = hero.take_damage(1000);
        assert!(report.died);
        assert_eq!(hero.health_current, 0);
        assert!(!hero.is_alive);

        let again = hero.take_damage(50);
        assert_eq!(again.actual_damage, 0);
        assert_eq!(hero.health_current, 0);
    }

    #[test]
    fn test_dead_heroes_are_not_revived() {
        let mut hero = sample_hero();
        hero.take_damage(1000);
        assert!(!hero.heal_full());
        assert_eq!(hero.heal(20), 0);
        assert!(!hero.is_alive);
        assert_eq!(hero.health_current, 0);
    }

    #[test]
    fn test_level_up_carries_health_ratio() {
        let mut hero = sample_hero();
        hero.health_current = hero.health_max / 2;
        let old_max = hero.health_max;
        hero.add_experience(100);
        assert_eq!(hero.level, 2);
        assert_eq!(hero.exp_to_next_level, 200);
        assert_eq!(hero.health_max, old_max + 2);
        assert_eq!(
            hero.health_current,
            (old_max / 2) * hero.health_max / old_max
        );
    }

    #[test]
    fn test_multi_level_up_and_remainder() {
        let mut hero = sample_hero();
        // 100 + 200 + 50 left over
        hero.add_experience(350);
        assert_eq!(hero.level, 3);
        assert_eq!(hero.experience, 50);
        assert_eq!(hero.exp_to_next_level, 300);
    }

    #[test]
    fn test_experience_stops_at_cap() {
        let mut hero = sample_hero();
        hero.add_experience(1_000_000);
        assert_eq!(hero.level, 10);
        let exp = hero.experience;
        let msg = hero.add_experience(500);
        assert!(msg.contains("max level"));
        assert_eq!(hero.experience, exp);
        assert!(hero.can_star_up());
    }

    #[test]
    fn test_seven_star_cannot_star_up() {
        let mut hero = Hero::new("Apex", 7, Attributes::uniform(30), CharacterTrait::Calm);
        hero.add_experience(u64::MAX / 2);
        assert_eq!(hero.level, 120);
        assert!(!hero.can_star_up());
    }

    #[test]
    fn test_refresh_stats_after_bump() {
        let mut hero = sample_hero();
        *hero.attributes.get_mut(Attribute::Constitution) += 1;
        hero.refresh_stats();
        assert_eq!(hero.health_max, 20 + 33 + 2);
        assert!(hero.health_current <= hero.health_max);
    }

    #[test]
    fn test_attribute_sheet_masking() {
        let hero = sample_hero();
        assert!(hero.attribute_sheet(false).contains("Strength: ?"));
        assert!(hero.attribute_sheet(true).contains("Strength: 10"));
    }
}
