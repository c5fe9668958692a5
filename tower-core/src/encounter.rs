//! Encounter generation and the per-floor monster cache.
//!
//! A floor's roster is generated on the first visit and cached, so a
//! half-finished fight survives save/load. Once every monster in a cached
//! roster is dead the floor counts as cleared and the next visit rolls a
//! fresh roster.

use crate::dice;
use crate::monster::{BossAbility, BossKind, Monster, Species, SpeciesStats};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Count range used past the end of [`MONSTER_COUNTS`].
pub const DEFAULT_COUNT: (u32, u32) = (1, 3);

/// `(floor, (min, max))` monster counts.
pub static MONSTER_COUNTS: [(u32, (u32, u32)); 10] = [
    (1, (1, 2)),
    (2, (1, 3)),
    (3, (2, 3)),
    (4, (2, 4)),
    (5, (3, 4)),
    (6, (3, 5)),
    (7, (4, 5)),
    (8, (4, 6)),
    (9, (5, 6)),
    (10, (1, 1)),
];

/// `(floor, weights)`; a floor uses the first entry whose key is at
/// least the floor number, or the last entry beyond the table.
pub static SPAWN_WEIGHTS: [(u32, &[(Species, u32)]); 5] = [
    (1, &[(Species::Goblin, 70), (Species::Skeleton, 30)]),
    (
        2,
        &[(Species::Goblin, 50), (Species::Skeleton, 40), (Species::Wolf, 10)],
    ),
    (
        3,
        &[
            (Species::Goblin, 30),
            (Species::Skeleton, 40),
            (Species::Wolf, 20),
            (Species::Spider, 10),
        ],
    ),
    (
        4,
        &[
            (Species::Skeleton, 30),
            (Species::Orc, 30),
            (Species::Wolf, 20),
            (Species::Spider, 20),
        ],
    ),
    (
        5,
        &[
            (Species::Orc, 40),
            (Species::Skeleton, 30),
            (Species::Wolf, 20),
            (Species::Spider, 10),
        ],
    ),
];

pub fn is_boss_floor(floor: u32) -> bool {
    floor % 5 == 0
}

pub fn boss_level(floor: u32) -> u32 {
    floor + 2
}

pub fn count_range(floor: u32) -> (u32, u32) {
    MONSTER_COUNTS
        .iter()
        .find(|(f, _)| *f == floor)
        .map(|(_, range)| *range)
        .unwrap_or(DEFAULT_COUNT)
}

pub fn spawn_weights(floor: u32) -> &'static [(Species, u32)] {
    SPAWN_WEIGHTS
        .iter()
        .find(|(key, _)| *key >= floor)
        .or_else(|| SPAWN_WEIGHTS.last())
        .map(|(_, weights)| *weights)
        .unwrap_or(&[])
}

/// Bosses eligible for a floor, or all of them if none qualify yet.
pub fn boss_candidates(floor: u32) -> Vec<BossKind> {
    let eligible: Vec<BossKind> = BossKind::ALL
        .into_iter()
        .filter(|b| b.stats().min_floor <= floor)
        .collect();
    if eligible.is_empty() {
        BossKind::ALL.to_vec()
    } else {
        eligible
    }
}

/// Roll a fresh roster for `floor`.
pub fn generate<R: Rng + ?Sized>(floor: u32, rng: &mut R) -> Vec<Monster> {
    if is_boss_floor(floor) {
        let candidates = boss_candidates(floor);
        let boss = dice::pick(rng, &candidates)
            .copied()
            .unwrap_or(BossKind::AncientDragon);
        return vec![Monster::boss(boss, boss_level(floor))];
    }

    let (min, max) = count_range(floor);
    let count = dice::roll_count(rng, min, max);
    let weights = spawn_weights(floor);
    (0..count)
        .map(|_| {
            let species = dice::weighted_pick(rng, weights).unwrap_or(Species::Goblin);
            let level = (floor as i64 + rng.gen_range(-1..=1)).max(1) as u32;
            Monster::normal(species, level)
        })
        .collect()
}

// ============================================================================
// Floor Cache
// ============================================================================

/// Monster rosters keyed by floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorCache {
    floors: BTreeMap<u32, Vec<Monster>>,
}

impl FloorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, floor: u32) -> Option<&[Monster]> {
        self.floors.get(&floor).map(|m| m.as_slice())
    }

    /// A cached roster with at least one monster still standing.
    pub fn live_roster(&self, floor: u32) -> Option<&[Monster]> {
        self.get(floor)
            .filter(|monsters| monsters.iter().any(|m| m.is_alive))
    }

    pub fn store(&mut self, floor: u32, monsters: Vec<Monster>) {
        self.floors.insert(floor, monsters);
    }

    pub fn remove(&mut self, floor: u32) -> Option<Vec<Monster>> {
        self.floors.remove(&floor)
    }

    pub fn floors(&self) -> impl Iterator<Item = u32> + '_ {
        self.floors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

/// Return the floor's cached roster if it is still being fought,
/// otherwise generate one and cache it immediately.
pub fn generate_or_load<R: Rng + ?Sized>(
    floor: u32,
    cache: &mut FloorCache,
    rng: &mut R,
) -> Vec<Monster> {
    if let Some(monsters) = cache.live_roster(floor) {
        debug!(floor, count = monsters.len(), "Reusing cached roster");
        return monsters.to_vec();
    }
    let monsters = generate(floor, rng);
    debug!(floor, count = monsters.len(), "Generated roster");
    cache.store(floor, monsters.clone());
    monsters
}

// ============================================================================
// Preview
// ============================================================================

/// A boss that may appear on a floor.
#[derive(Debug, Clone, PartialEq)]
pub struct BossPreview {
    pub boss: BossKind,
    pub level: u32,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub abilities: Vec<BossAbility>,
}

/// A species that may spawn on a floor, at the floor's level.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPreview {
    pub species: Species,
    pub weight: u32,
    pub stats: SpeciesStats,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
}

/// What a floor holds, without rolling or caching anything.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorPreview {
    Boss { floor: u32, candidates: Vec<BossPreview> },
    Normal { floor: u32, count: (u32, u32), spawns: Vec<SpawnPreview> },
}

impl FloorPreview {
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        match self {
            FloorPreview::Boss { floor, candidates } => {
                lines.push(format!("Floor {floor}: boss floor"));
                for c in candidates {
                    lines.push(format!(
                        "  {} (Lv.{}) HP {} ATK {} DEF {}",
                        c.boss, c.level, c.health, c.attack, c.defense
                    ));
                    for ability in &c.abilities {
                        lines.push(format!(
                            "    - {} ({:.0}%): {}",
                            ability,
                            ability.chance() * 100.0,
                            ability.description()
                        ));
                    }
                }
            }
            FloorPreview::Normal { floor, count, spawns } => {
                lines.push(format!("Floor {floor}: {}-{} monsters", count.0, count.1));
                for s in spawns {
                    lines.push(format!(
                        "  {} (weight {}) HP {} ATK {} DEF {}",
                        s.species, s.weight, s.health, s.attack, s.defense
                    ));
                }
            }
        }
        lines.join("\n")
    }
}

pub fn preview(floor: u32) -> FloorPreview {
    if is_boss_floor(floor) {
        let level = boss_level(floor);
        let candidates = boss_candidates(floor)
            .into_iter()
            .map(|boss| {
                let sample = Monster::boss(boss, level);
                BossPreview {
                    boss,
                    level,
                    health: sample.health_max,
                    attack: sample.attack,
                    defense: sample.defense,
                    abilities: boss.abilities().to_vec(),
                }
            })
            .collect();
        return FloorPreview::Boss { floor, candidates };
    }

    let level = floor.max(1) as i32;
    let spawns = spawn_weights(floor)
        .iter()
        .map(|(species, weight)| {
            let stats = species.stats();
            SpawnPreview {
                species: *species,
                weight: *weight,
                stats,
                health: stats.health_per_level * level,
                attack: stats.attack_per_level * level,
                defense: stats.defense_per_level * level,
            }
        })
        .collect();
    FloorPreview::Normal {
        floor,
        count: count_range(floor),
        spawns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_boss_floor_has_single_boss() {
        let mut rng = StdRng::seed_from_u64(1);
        for floor in [5, 10, 15, 20, 25, 100] {
            let roster = generate(floor, &mut rng);
            assert_eq!(roster.len(), 1);
            assert!(roster[0].is_boss());
            assert_eq!(roster[0].level, floor + 2);
        }
    }

    #[test]
    fn test_boss_candidates_fallback() {
        assert_eq!(boss_candidates(5), BossKind::ALL.to_vec());
        assert_eq!(boss_candidates(10), vec![BossKind::AncientDragon]);
        assert_eq!(
            boss_candidates(15),
            vec![BossKind::AncientDragon, BossKind::ShadowLord]
        );
        assert_eq!(boss_candidates(40).len(), 3);
    }

    #[test]
    fn test_normal_floor_counts_and_levels() {
        let mut rng = StdRng::seed_from_u64(2);
        for floor in [1, 2, 3, 4, 6, 7, 8, 9, 11, 23] {
            let (min, max) = count_range(floor);
            for _ in 0..20 {
                let roster = generate(floor, &mut rng);
                let n = roster.len() as u32;
                assert!(n >= min && n <= max, "floor {floor} gave {n}");
                for m in &roster {
                    assert!(!m.is_boss());
                    assert!(m.level >= floor.saturating_sub(1).max(1) && m.level <= floor + 1);
                }
            }
        }
        assert_eq!(count_range(11), DEFAULT_COUNT);
    }

    #[test]
    fn test_spawn_table_lookup() {
        assert_eq!(spawn_weights(1)[0], (Species::Goblin, 70));
        assert_eq!(spawn_weights(4)[1], (Species::Orc, 30));
        assert_eq!(spawn_weights(5)[0], (Species::Orc, 40));
        assert_eq!(spawn_weights(42), spawn_weights(5));
    }

    #[test]
    fn test_floor_one_spawns_only_goblins_and_skeletons() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            for m in generate(1, &mut rng) {
                assert!(matches!(
                    m.kind,
                    crate::monster::MonsterKind::Normal(Species::Goblin | Species::Skeleton)
                ));
            }
        }
    }

    #[test]
    fn test_cache_reuses_live_roster() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut cache = FloorCache::new();
        let first = generate_or_load(3, &mut cache, &mut rng);
        let second = generate_or_load(3, &mut cache, &mut rng);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cleared_roster_is_regenerated() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cache = FloorCache::new();
        let mut roster = generate_or_load(2, &mut cache, &mut rng);
        for m in roster.iter_mut() {
            m.take_damage(10_000);
        }
        cache.store(2, roster.clone());
        let fresh = generate_or_load(2, &mut cache, &mut rng);
        assert!(fresh.iter().all(|m| m.is_alive));
        assert_ne!(fresh[0].id, roster[0].id);
    }

    #[test]
    fn test_preview_does_not_touch_cache() {
        match preview(10) {
            FloorPreview::Boss { candidates, .. } => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].level, 12);
                assert_eq!(candidates[0].abilities.len(), 2);
            }
            other => panic!("expected boss preview, got {other:?}"),
        }
        match preview(3) {
            FloorPreview::Normal { count, spawns, .. } => {
                assert_eq!(count, (2, 3));
                assert_eq!(spawns.len(), 4);
            }
            other => panic!("expected normal preview, got {other:?}"),
        }
        assert!(preview(5).describe().contains("boss floor"));
    }
}
