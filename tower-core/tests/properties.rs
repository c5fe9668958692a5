//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Heroes: health bounds, minimum damage, monotonic leveling
//! - Encounters: boss floors and monster counts
//! - Combat: round cap
//! - Parties: idempotent cleanup, single membership

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_core::combat::{Combat, MAX_ROUNDS};
use tower_core::encounter;
use tower_core::hero::{Attributes, Hero};
use tower_core::party::{PartyBook, PartyId};
use tower_core::roles::RoleBoard;
use tower_core::traits::CharacterTrait;

fn any_trait() -> impl Strategy<Value = CharacterTrait> {
    (0..CharacterTrait::ALL.len()).prop_map(|i| CharacterTrait::ALL[i])
}

fn any_hero() -> impl Strategy<Value = Hero> {
    (1u8..=7, 5i32..=40, any_trait()).prop_map(|(star, attr, t)| {
        Hero::new("Prop", star, Attributes::uniform(attr), t)
    })
}

// ============================================================
// Hero Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_health_stays_in_bounds(
        mut hero in any_hero(),
        ops in prop::collection::vec((any::<bool>(), 0i32..500), 0..40),
    ) {
        for (is_damage, amount) in ops {
            if is_damage {
                hero.take_damage(amount);
            } else {
                hero.heal(amount);
            }
            prop_assert!(hero.health_current >= 0 && hero.health_current <= hero.health_max);
            prop_assert!(hero.mana_current >= 0 && hero.mana_current <= hero.mana_max);
        }
    }

    #[test]
    fn prop_damage_always_bites(mut hero in any_hero(), raw in 0i32..200, defense in 0i32..1000) {
        hero.defense = defense;
        let before = hero.health_current;
        let report = hero.take_damage(raw);
        prop_assert!(report.actual_damage >= 1);
        prop_assert!(hero.health_current < before);
    }

    #[test]
    fn prop_leveling_is_monotonic_and_capped(
        mut hero in any_hero(),
        grants in prop::collection::vec(0u64..5_000, 1..20),
    ) {
        let cap = hero.level_cap();
        for amount in grants {
            let before = hero.level;
            let at_cap = hero.level >= cap;
            let snapshot = hero.clone();
            hero.add_experience(amount);
            prop_assert!(hero.level >= before);
            prop_assert!(hero.level <= cap);
            if hero.level > before {
                prop_assert_eq!(hero.exp_to_next_level, hero.level as u64 * 100);
            }
            if at_cap {
                prop_assert_eq!(&hero, &snapshot);
            }
        }
    }
}

// ============================================================
// Encounter Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_boss_floor_has_single_boss(seed in any::<u64>(), step in 1u32..=40) {
        let floor = step * 5;
        let mut rng = StdRng::seed_from_u64(seed);
        let monsters = encounter::generate(floor, &mut rng);
        prop_assert_eq!(monsters.len(), 1);
        prop_assert!(monsters[0].is_boss());
        prop_assert_eq!(monsters[0].level, floor + 2);
    }

    #[test]
    fn prop_monster_count_in_range(seed in any::<u64>(), floor in 1u32..=60) {
        prop_assume!(!encounter::is_boss_floor(floor));
        let mut rng = StdRng::seed_from_u64(seed);
        let monsters = encounter::generate(floor, &mut rng);
        let (min, max) = encounter::count_range(floor);
        prop_assert!(monsters.len() as u32 >= min && monsters.len() as u32 <= max);
        prop_assert!(monsters.iter().all(|m| !m.is_boss() && m.is_alive));
    }
}

// ============================================================
// Combat Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_combat_respects_round_cap(
        seed in any::<u64>(),
        floor in 1u32..=30,
        heroes in prop::collection::vec(any_hero(), 1..=5),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let monsters = encounter::generate(floor, &mut rng);
        let mut combat = Combat::new(floor, heroes, monsters);
        let report = combat.run(&mut rng);
        prop_assert!(report.rounds <= MAX_ROUNDS);

        let (heroes, monsters) = combat.into_parts();
        prop_assert!(heroes.iter().all(|h| !h.stunned));
        prop_assert!(monsters.iter().all(|m| !m.stunned));
        if report.outcome.is_victory() {
            prop_assert!(monsters.iter().all(|m| !m.is_alive));
        }
    }
}

// ============================================================
// Party Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_cleanup_is_idempotent(
        placement in prop::collection::vec((0usize..3, any::<bool>()), 1..15),
    ) {
        let mut book = PartyBook::new();
        book.ensure_slots(3);
        let roles = RoleBoard::new();
        let mut roster = Vec::new();

        for (party, _) in &placement {
            let hero = Hero::new("Member", 1, Attributes::uniform(10), CharacterTrait::Calm);
            let id = hero.id;
            roster.push(hero);
            // Full parties simply reject the extra member.
            let _ = book.add_hero_to_party(PartyId(*party as u32 + 1), id, &roster, &roles);
        }
        for (hero, (_, dies)) in roster.iter_mut().zip(&placement) {
            if *dies {
                hero.take_damage(100_000);
            }
        }

        let mut roles = RoleBoard::new();
        book.cleanup_dead_heroes(&roster, &mut roles);
        let once = book.clone();
        let removed = book.cleanup_dead_heroes(&roster, &mut roles);
        prop_assert!(removed.is_empty());
        prop_assert_eq!(&book, &once);

        let mut seen = std::collections::HashSet::new();
        for party in book.parties() {
            prop_assert!(party.heroes.len() <= tower_core::party::MAX_PARTY_SIZE);
            for id in &party.heroes {
                prop_assert!(seen.insert(*id), "hero in two parties");
                let alive = roster.iter().any(|h| h.id == *id && h.is_alive);
                prop_assert!(alive);
            }
        }
    }
}
