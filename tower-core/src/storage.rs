//! Slot-limited item storage with stacking.

use crate::items::{Item, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CAPACITY: usize = 50;

/// The warehouse. Each entry occupies one slot; stackable items merge
/// into their kind's stack and spill into a single `<id>_extra` stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub capacity: usize,
    slots: BTreeMap<String, Item>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Storage {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: BTreeMap::new(),
        }
    }

    pub fn used_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn has_space(&self) -> bool {
        self.slots.len() < self.capacity
    }

    /// Slot key and contents, in key order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.slots.get(key)
    }

    /// Total quantity of a kind across all of its stacks.
    pub fn quantity_of(&self, kind: ItemKind) -> u32 {
        self.slots
            .values()
            .filter(|item| item.kind == kind)
            .map(|item| item.quantity)
            .sum()
    }

    /// Store an item. Returns false, leaving storage untouched, when it
    /// does not fit.
    pub fn add_item(&mut self, item: Item) -> bool {
        if item.quantity == 0 {
            return true;
        }
        if !item.stackable {
            if !self.has_space() {
                return false;
            }
            let key = self.free_key(item.kind.id());
            self.slots.insert(key, item);
            return true;
        }

        let key = item.kind.id().to_string();
        let Some(existing) = self.slots.get(&key) else {
            if !self.has_space() {
                return false;
            }
            self.slots.insert(key, item);
            return true;
        };

        let (held, max_stack) = (existing.quantity, existing.max_stack);
        if held + item.quantity <= max_stack {
            if let Some(stack) = self.slots.get_mut(&key) {
                stack.quantity += item.quantity;
            }
            return true;
        }

        let room = max_stack.saturating_sub(held);
        let overflow = item.quantity - room;
        let extra_key = format!("{key}_extra");
        let fits = match self.slots.get(&extra_key) {
            Some(extra) => extra.quantity + overflow <= max_stack,
            None => self.has_space(),
        };
        if !fits {
            return false;
        }

        if let Some(stack) = self.slots.get_mut(&key) {
            stack.quantity = max_stack;
        }
        match self.slots.get_mut(&extra_key) {
            Some(extra) => extra.quantity += overflow,
            None => {
                self.slots.insert(extra_key, Item::create(item.kind, overflow));
            }
        }
        true
    }

    /// Remove `quantity` from one slot. Fails if the slot holds less.
    pub fn remove_item(&mut self, key: &str, quantity: u32) -> bool {
        let Some(item) = self.slots.get_mut(key) else {
            return false;
        };
        if !item.stackable || item.quantity == quantity {
            self.slots.remove(key);
            return true;
        }
        if item.quantity > quantity {
            item.quantity -= quantity;
            return true;
        }
        false
    }

    /// Remove `quantity` of a kind across its stacks, overflow stacks
    /// first. All or nothing.
    pub fn remove_quantity(&mut self, kind: ItemKind, quantity: u32) -> bool {
        if self.quantity_of(kind) < quantity {
            return false;
        }
        let mut keys: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, item)| item.kind == kind)
            .map(|(k, _)| k.clone())
            .collect();
        keys.reverse();

        let mut remaining = quantity;
        for key in keys {
            if remaining == 0 {
                break;
            }
            let Some(item) = self.slots.get_mut(&key) else {
                continue;
            };
            let take = item.quantity.min(remaining);
            item.quantity -= take;
            remaining -= take;
            if item.quantity == 0 {
                self.slots.remove(&key);
            }
        }
        true
    }

    fn free_key(&self, base: &str) -> String {
        if !self.slots.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|k| !self.slots.contains_key(k))
            .unwrap_or_else(|| base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacks_merge() {
        let mut storage = Storage::default();
        assert!(storage.add_item(Item::create(ItemKind::IronOre, 10)));
        assert!(storage.add_item(Item::create(ItemKind::IronOre, 5)));
        assert_eq!(storage.used_slots(), 1);
        assert_eq!(storage.quantity_of(ItemKind::IronOre), 15);
    }

    #[test]
    fn test_overflow_goes_to_extra_stack() {
        let mut storage = Storage::default();
        assert!(storage.add_item(Item::create(ItemKind::MagicCrystal, 20)));
        assert!(storage.add_item(Item::create(ItemKind::MagicCrystal, 10)));
        assert_eq!(storage.get("magic_crystal").map(|i| i.quantity), Some(25));
        assert_eq!(storage.get("magic_crystal_extra").map(|i| i.quantity), Some(5));
        assert_eq!(storage.quantity_of(ItemKind::MagicCrystal), 30);
    }

    #[test]
    fn test_full_storage_rejects_without_change() {
        let mut storage = Storage::new(1);
        assert!(storage.add_item(Item::create(ItemKind::SteelBar, 45)));
        let before = storage.clone();
        assert!(!storage.add_item(Item::create(ItemKind::SteelBar, 10)));
        assert!(!storage.add_item(Item::create(ItemKind::IronOre, 1)));
        assert_eq!(storage, before);
        assert!(storage.add_item(Item::create(ItemKind::SteelBar, 5)));
    }

    #[test]
    fn test_weapons_take_own_slots() {
        let mut storage = Storage::default();
        assert!(storage.add_item(Item::create(ItemKind::IronSword, 1)));
        assert!(storage.add_item(Item::create(ItemKind::IronSword, 1)));
        assert_eq!(storage.used_slots(), 2);
        assert_eq!(storage.quantity_of(ItemKind::IronSword), 2);
    }

    #[test]
    fn test_remove_item_semantics() {
        let mut storage = Storage::default();
        storage.add_item(Item::create(ItemKind::IronOre, 4));
        assert!(!storage.remove_item("iron_ore", 5));
        assert!(storage.remove_item("iron_ore", 3));
        assert!(storage.remove_item("iron_ore", 1));
        assert_eq!(storage.used_slots(), 0);
        assert!(!storage.remove_item("iron_ore", 1));
    }

    #[test]
    fn test_remove_quantity_spans_stacks() {
        let mut storage = Storage::default();
        storage.add_item(Item::create(ItemKind::MagicCrystal, 25));
        storage.add_item(Item::create(ItemKind::MagicCrystal, 3));
        assert!(!storage.remove_quantity(ItemKind::MagicCrystal, 29));
        assert!(storage.remove_quantity(ItemKind::MagicCrystal, 5));
        assert_eq!(storage.quantity_of(ItemKind::MagicCrystal), 23);
        assert!(storage.get("magic_crystal_extra").is_none());
    }
}
