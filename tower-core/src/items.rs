//! Item catalog.
//!
//! Contains the materials dropped by the tower and the weapons the forge
//! can make, looked up by [`ItemKind`] or by string id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every item the game knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    IronOre,
    SteelBar,
    MagicCrystal,
    IronSword,
    SteelSword,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::IronOre,
        ItemKind::SteelBar,
        ItemKind::MagicCrystal,
        ItemKind::IronSword,
        ItemKind::SteelSword,
    ];

    /// Stable string id, also used as the storage slot key.
    pub fn id(&self) -> &'static str {
        match self {
            ItemKind::IronOre => "iron_ore",
            ItemKind::SteelBar => "steel_bar",
            ItemKind::MagicCrystal => "magic_crystal",
            ItemKind::IronSword => "iron_sword",
            ItemKind::SteelSword => "steel_sword",
        }
    }

    pub fn from_id(id: &str) -> Option<ItemKind> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// The catalog entry for this kind.
    pub fn template(&self) -> &'static Item {
        &CATALOG[self]
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template().name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
    Material,
    Consumable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        };
        write!(f, "{name}")
    }
}

/// An item or a stack of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub stats: BTreeMap<String, i32>,
    pub required_level: u32,
    pub stackable: bool,
    pub max_stack: u32,
    pub quantity: u32,
}

impl Item {
    pub fn new(kind: ItemKind, name: &str, item_type: ItemType, rarity: Rarity) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: String::new(),
            item_type,
            rarity,
            stats: BTreeMap::new(),
            required_level: 1,
            stackable: false,
            max_stack: 1,
            quantity: 1,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_stat(mut self, stat: &str, value: i32) -> Self {
        self.stats.insert(stat.to_string(), value);
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn stackable(mut self, max_stack: u32) -> Self {
        self.stackable = true;
        self.max_stack = max_stack;
        self
    }

    /// A fresh copy of the catalog entry with the given quantity.
    pub fn create(kind: ItemKind, quantity: u32) -> Self {
        let mut item = kind.template().clone();
        item.quantity = quantity;
        item
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rarity, self.name)?;
        if self.stackable {
            write!(f, " x{}", self.quantity)?;
        }
        Ok(())
    }
}

lazy_static::lazy_static! {
    /// All catalog entries, quantity 1.
    pub static ref CATALOG: BTreeMap<ItemKind, Item> = [
        // Materials
        Item::new(ItemKind::IronOre, "Iron Ore", ItemType::Material, Rarity::Common)
            .with_description("Raw iron for crafting")
            .stackable(99),
        Item::new(ItemKind::SteelBar, "Steel Bar", ItemType::Material, Rarity::Uncommon)
            .with_description("Refined steel")
            .stackable(50),
        Item::new(ItemKind::MagicCrystal, "Magic Crystal", ItemType::Material, Rarity::Rare)
            .with_description("A source of magical energy")
            .stackable(25),
        // Weapons
        Item::new(ItemKind::IronSword, "Iron Sword", ItemType::Weapon, Rarity::Common)
            .with_description("A plain iron sword")
            .with_stat("attack", 15)
            .with_stat("crit_chance", 5)
            .with_required_level(5),
        Item::new(ItemKind::SteelSword, "Steel Sword", ItemType::Weapon, Rarity::Uncommon)
            .with_description("A well-made steel sword")
            .with_stat("attack", 25)
            .with_stat("crit_chance", 8)
            .with_required_level(10),
    ]
    .into_iter()
    .map(|item| (item.kind, item))
    .collect();
}
