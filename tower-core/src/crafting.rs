//! Forge recipes.

use crate::dice;
use crate::error::GameError;
use crate::items::{Item, ItemKind};
use crate::storage::Storage;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub output: ItemKind,
    pub quantity: u32,
    pub materials: &'static [(ItemKind, u32)],
    pub required_forge_level: u32,
}

pub static RECIPES: [Recipe; 3] = [
    Recipe {
        output: ItemKind::SteelBar,
        quantity: 1,
        materials: &[(ItemKind::IronOre, 3)],
        required_forge_level: 1,
    },
    Recipe {
        output: ItemKind::IronSword,
        quantity: 1,
        materials: &[(ItemKind::IronOre, 5), (ItemKind::SteelBar, 2)],
        required_forge_level: 2,
    },
    Recipe {
        output: ItemKind::SteelSword,
        quantity: 1,
        materials: &[(ItemKind::SteelBar, 5), (ItemKind::MagicCrystal, 1)],
        required_forge_level: 3,
    },
];

pub const BASE_SUCCESS_CHANCE: f64 = 0.85;
pub const BLACKSMITH_BONUS: f64 = 0.15;

pub fn recipe_for(output: ItemKind) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.output == output)
}

pub fn success_chance(has_blacksmith: bool) -> f64 {
    let bonus = if has_blacksmith { BLACKSMITH_BONUS } else { 0.0 };
    (BASE_SUCCESS_CHANCE + bonus).min(1.0)
}

/// Materials lost on a failed attempt: half of each, at least one.
pub fn failure_cost(recipe: &Recipe) -> Vec<(ItemKind, u32)> {
    recipe
        .materials
        .iter()
        .map(|(kind, qty)| (*kind, (qty / 2).max(1)))
        .collect()
}

/// What the forge has to work with.
pub struct Forge<'a> {
    pub level: u32,
    pub has_blacksmith: bool,
    pub unlocked: &'a BTreeSet<ItemKind>,
}

impl Forge<'_> {
    pub fn can_craft(&self, output: ItemKind, storage: &Storage) -> Result<&'static Recipe, GameError> {
        let recipe = recipe_for(output)
            .ok_or_else(|| GameError::InvalidSelection(format!("No recipe produces {output}")))?;
        if !self.unlocked.contains(&output) {
            return Err(GameError::MissingPrerequisite(format!(
                "The {output} recipe has not been unlocked"
            )));
        }
        if self.level < recipe.required_forge_level {
            return Err(GameError::MissingPrerequisite(format!(
                "Requires Forge level {}",
                recipe.required_forge_level
            )));
        }
        for (kind, qty) in recipe.materials {
            let held = storage.quantity_of(*kind);
            if held < *qty {
                return Err(GameError::MissingPrerequisite(format!(
                    "Not enough {kind}: {held}/{qty}"
                )));
            }
        }
        if !storage.has_space() {
            return Err(GameError::MissingPrerequisite("Storage is full".to_string()));
        }
        Ok(recipe)
    }

    /// Recipes that could be crafted right now.
    pub fn available(&self, storage: &Storage) -> Vec<&'static Recipe> {
        RECIPES
            .iter()
            .filter(|r| self.can_craft(r.output, storage).is_ok())
            .collect()
    }

    /// Attempt a recipe. Materials are always spent (fully on success,
    /// partly on failure); storage is left untouched on any error.
    pub fn craft<R: Rng + ?Sized>(
        &self,
        output: ItemKind,
        storage: &mut Storage,
        rng: &mut R,
    ) -> Result<CraftOutcome, GameError> {
        let recipe = self.can_craft(output, storage)?;
        let succeeded = dice::roll_unit(rng) <= success_chance(self.has_blacksmith);

        let consumed: Vec<(ItemKind, u32)> = if succeeded {
            recipe.materials.to_vec()
        } else {
            failure_cost(recipe)
        };

        let mut staged = storage.clone();
        for (kind, qty) in &consumed {
            if !staged.remove_quantity(*kind, *qty) {
                return Err(GameError::MissingPrerequisite(format!("Not enough {kind}")));
            }
        }
        if succeeded && !staged.add_item(Item::create(recipe.output, recipe.quantity)) {
            return Err(GameError::MissingPrerequisite("Storage is full".to_string()));
        }
        *storage = staged;

        info!(item = %output, succeeded, "Crafting attempt");
        Ok(if succeeded {
            CraftOutcome::Crafted {
                item: recipe.output,
                quantity: recipe.quantity,
                consumed,
            }
        } else {
            CraftOutcome::Failed { consumed }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftOutcome {
    Crafted {
        item: ItemKind,
        quantity: u32,
        consumed: Vec<(ItemKind, u32)>,
    },
    Failed {
        consumed: Vec<(ItemKind, u32)>,
    },
}

impl CraftOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, CraftOutcome::Crafted { .. })
    }

    pub fn message(&self) -> String {
        match self {
            CraftOutcome::Crafted { item, quantity, .. } => format!("Crafted {quantity}x {item}!"),
            CraftOutcome::Failed { consumed } => {
                let lost = consumed
                    .iter()
                    .map(|(k, q)| format!("{q}x {k}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Crafting failed. Lost {lost}.")
            }
        }
    }
}
