//! Floor rewards: currency, item drops and recipe unlocks.

use crate::dice;
use crate::items::{Item, ItemKind};
use crate::storage::Storage;
use crate::wallet::Wallet;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Quantity range for one item drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRange {
    pub item: ItemKind,
    pub min: u32,
    pub max: u32,
}

const fn drop(item: ItemKind, min: u32, max: u32) -> DropRange {
    DropRange { item, min, max }
}

/// What clearing a floor pays out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorReward {
    pub gold: u64,
    pub crystals: u64,
    pub drops: Vec<DropRange>,
    pub unlocks: Vec<ItemKind>,
}

/// Legendary floors pay the most.
pub const LEGENDARY_FLOORS: [u32; 4] = [25, 50, 75, 100];

/// Reward table for a floor. Legendary floors take precedence over
/// every-tenth floors, which take precedence over every-fifth floors.
pub fn floor_rewards(floor: u32) -> FloorReward {
    let f = floor as u64;
    let (gold, crystals, drops) = if LEGENDARY_FLOORS.contains(&floor) {
        (
            400 * f,
            (3 * f).max(10),
            vec![
                drop(ItemKind::IronOre, 5, 10),
                drop(ItemKind::SteelBar, 3, 6),
                drop(ItemKind::MagicCrystal, 2, 4),
                drop(ItemKind::IronSword, 1, 1),
            ],
        )
    } else if floor < 100 && floor % 10 == 0 && floor > 0 {
        (
            250 * f,
            (2 * f).max(5),
            vec![
                drop(ItemKind::IronOre, 3, 7),
                drop(ItemKind::SteelBar, 2, 4),
                drop(ItemKind::MagicCrystal, 1, 2),
            ],
        )
    } else if floor < 100 && floor % 5 == 0 && floor > 0 {
        (
            150 * f,
            f.max(3),
            vec![drop(ItemKind::IronOre, 2, 5), drop(ItemKind::SteelBar, 1, 2)],
        )
    } else if (1..100).contains(&floor) {
        (80 * f, (f / 2).max(1), vec![drop(ItemKind::IronOre, 1, 3)])
    } else {
        (20 * f, (f / 4).max(1), vec![drop(ItemKind::IronOre, 1, 2)])
    };

    FloorReward {
        gold,
        crystals,
        drops,
        unlocks: recipe_unlocks(floor),
    }
}

/// Recipes (named by their output) unlocked by clearing a floor.
pub fn recipe_unlocks(floor: u32) -> Vec<ItemKind> {
    match floor {
        5 => vec![ItemKind::SteelBar],
        10 => vec![ItemKind::MagicCrystal],
        15 => vec![ItemKind::IronSword],
        20 => vec![ItemKind::SteelSword],
        _ => Vec::new(),
    }
}

/// Roll a concrete quantity for each drop.
pub fn roll_drops<R: Rng + ?Sized>(drops: &[DropRange], rng: &mut R) -> Vec<(ItemKind, u32)> {
    drops
        .iter()
        .map(|d| (d.item, dice::roll_count(rng, d.min, d.max)))
        .collect()
}

/// What was actually granted after a victory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VictoryRewards {
    pub gold: u64,
    pub crystals: u64,
    /// Items that made it into storage.
    pub items: BTreeMap<ItemKind, u32>,
    /// Items dropped but lost because storage was full.
    pub lost: BTreeMap<ItemKind, u32>,
    pub unlocked_recipes: Vec<ItemKind>,
}

/// Mutable slices of game state a victory pays into.
pub struct Spoils<'a> {
    pub wallet: &'a mut Wallet,
    pub storage: &'a mut Storage,
    pub recipes: &'a mut BTreeSet<ItemKind>,
}

/// Roll and commit a floor's rewards.
pub fn grant<R: Rng + ?Sized>(floor: u32, spoils: Spoils<'_>, rng: &mut R) -> VictoryRewards {
    let table = floor_rewards(floor);
    spoils.wallet.add_gold(table.gold);
    spoils.wallet.add_crystals(table.crystals);

    let mut granted = VictoryRewards {
        gold: table.gold,
        crystals: table.crystals,
        ..Default::default()
    };

    for (kind, quantity) in roll_drops(&table.drops, rng) {
        let target = if spoils.storage.add_item(Item::create(kind, quantity)) {
            &mut granted.items
        } else {
            &mut granted.lost
        };
        *target.entry(kind).or_insert(0) += quantity;
    }

    for recipe in table.unlocks {
        if spoils.recipes.insert(recipe) {
            granted.unlocked_recipes.push(recipe);
        }
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reward_precedence() {
        let normal = floor_rewards(3);
        assert_eq!((normal.gold, normal.crystals), (240, 1));
        assert_eq!(normal.drops.len(), 1);

        let fifth = floor_rewards(15);
        assert_eq!((fifth.gold, fifth.crystals), (2250, 15));

        let tenth = floor_rewards(20);
        assert_eq!((tenth.gold, tenth.crystals), (5000, 40));
        assert_eq!(tenth.drops.len(), 3);

        let legendary = floor_rewards(50);
        assert_eq!((legendary.gold, legendary.crystals), (20000, 150));
        assert!(legendary.drops.iter().any(|d| d.item == ItemKind::IronSword));

        let top = floor_rewards(100);
        assert_eq!(top.gold, 40000);

        let beyond = floor_rewards(105);
        assert_eq!((beyond.gold, beyond.crystals), (2100, 26));
    }

    #[test]
    fn test_low_floor_minimums() {
        assert_eq!(floor_rewards(1).crystals, 1);
        assert_eq!(floor_rewards(5).crystals, 5);
        assert_eq!(floor_rewards(10).crystals, 20);
    }

    #[test]
    fn test_grant_commits_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wallet = Wallet::new(0, 0);
        let mut storage = Storage::default();
        let mut recipes = BTreeSet::new();
        let granted = grant(
            5,
            Spoils {
                wallet: &mut wallet,
                storage: &mut storage,
                recipes: &mut recipes,
            },
            &mut rng,
        );
        assert_eq!(wallet.gold, 750);
        assert_eq!(wallet.crystals, 5);
        let ore = granted.items[&ItemKind::IronOre];
        assert!((2..=5).contains(&ore));
        assert_eq!(storage.quantity_of(ItemKind::IronOre), ore);
        assert_eq!(granted.unlocked_recipes, vec![ItemKind::SteelBar]);
        assert!(recipes.contains(&ItemKind::SteelBar));
    }

    #[test]
    fn test_repeat_unlock_is_not_reported() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut wallet = Wallet::default();
        let mut storage = Storage::default();
        let mut recipes = BTreeSet::from([ItemKind::SteelBar]);
        let granted = grant(
            5,
            Spoils {
                wallet: &mut wallet,
                storage: &mut storage,
                recipes: &mut recipes,
            },
            &mut rng,
        );
        assert!(granted.unlocked_recipes.is_empty());
    }

    #[test]
    fn test_full_storage_loses_drops() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut wallet = Wallet::default();
        let mut storage = Storage::new(0);
        let mut recipes = BTreeSet::new();
        let granted = grant(
            2,
            Spoils {
                wallet: &mut wallet,
                storage: &mut storage,
                recipes: &mut recipes,
            },
            &mut rng,
        );
        assert!(granted.items.is_empty());
        assert!(granted.lost.contains_key(&ItemKind::IronOre));
        assert_eq!(wallet.gold, 160);
    }
}
