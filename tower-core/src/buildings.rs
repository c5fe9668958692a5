//! Base buildings, their costs and floor-gated upgrades.

use crate::error::GameError;
use crate::wallet::{Currency, Wallet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    SummonHall,
    Dormitory,
    SynthesisRoom,
    Storage,
    Laboratory,
    Canteen,
    Forge,
    ElevationRoom,
}

/// Static data for a building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub max_level: u32,
    pub base_cost: u64,
    pub starts_built: bool,
    pub unlock_floor: u32,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 8] = [
        BuildingKind::SummonHall,
        BuildingKind::Dormitory,
        BuildingKind::SynthesisRoom,
        BuildingKind::Storage,
        BuildingKind::Laboratory,
        BuildingKind::Canteen,
        BuildingKind::Forge,
        BuildingKind::ElevationRoom,
    ];

    pub fn spec(&self) -> BuildingSpec {
        let (name, description, max_level, base_cost, starts_built, unlock_floor) = match self {
            BuildingKind::SummonHall => ("Summon Hall", "Summons new heroes", 1, 0, true, 0),
            BuildingKind::Dormitory => ("Dormitory", "Raises the hero limit", 20, 50, true, 0),
            BuildingKind::SynthesisRoom => {
                ("Synthesis Room", "Merges heroes to grow stronger", 10, 100, true, 0)
            }
            // Starts built, and its next level needs floor 5 anyway.
            BuildingKind::Storage => ("Storage", "Holds resources", 15, 75, true, 3),
            BuildingKind::Laboratory => ("Laboratory", "Enables research", 5, 300, false, 5),
            BuildingKind::Canteen => ("Canteen", "Keeps heroes fed and effective", 10, 200, false, 3),
            BuildingKind::Forge => ("Forge", "Enables crafting", 8, 300, false, 7),
            BuildingKind::ElevationRoom => {
                ("Elevation Room", "Raises heroes' star tier", 5, 500, false, 10)
            }
        };
        BuildingSpec {
            name,
            description,
            max_level,
            base_cost,
            starts_built,
            unlock_floor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Highest building level allowed at a floor: one more per five floors.
pub fn max_level_for_floor(floor: u32) -> u32 {
    1 + floor / 5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub level: u32,
    pub built: bool,
    pub unlocked: bool,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        let built = kind.spec().starts_built;
        Self {
            kind,
            level: u32::from(built),
            built,
            unlocked: built,
        }
    }

    pub fn spec(&self) -> BuildingSpec {
        self.kind.spec()
    }

    pub fn is_available(&self, floor: u32) -> bool {
        floor >= self.spec().unlock_floor
    }

    pub fn build_cost(&self) -> u64 {
        self.spec().base_cost * 2
    }

    /// Cost of the next level; building from scratch costs the build price.
    pub fn upgrade_cost(&self) -> u64 {
        if self.level == 0 {
            self.build_cost()
        } else {
            self.spec().base_cost * self.level as u64
        }
    }

    /// Why the next level cannot be bought right now, if it can't.
    pub fn upgrade_blocker(&self, floor: u32) -> Option<String> {
        let spec = self.spec();
        if !self.is_available(floor) {
            return Some(format!("{} unlocks at floor {}", spec.name, spec.unlock_floor));
        }
        if self.level >= spec.max_level {
            return Some(format!("{} is at its maximum level", spec.name));
        }
        if self.level >= max_level_for_floor(floor) {
            return Some(format!(
                "{} is at the maximum level for floor {}",
                spec.name, floor
            ));
        }
        None
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.built { "built" } else { "not built" };
        write!(f, "{} (Lv.{}) - {}", self.kind, self.level, status)
    }
}

/// Hero roster limit for a dormitory level.
pub fn dormitory_capacity(level: u32) -> usize {
    5 + 2 * level.saturating_sub(1) as usize
}

/// All base buildings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildings {
    buildings: Vec<Building>,
}

impl Default for Buildings {
    fn default() -> Self {
        Self::new()
    }
}

impl Buildings {
    pub fn new() -> Self {
        Self {
            buildings: BuildingKind::ALL.into_iter().map(Building::new).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn get(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.iter().find(|b| b.kind == kind)
    }

    /// Mutable access, adding a fresh entry for a kind an old save lacks.
    fn entry(&mut self, kind: BuildingKind) -> &mut Building {
        let idx = match self.buildings.iter().position(|b| b.kind == kind) {
            Some(idx) => idx,
            None => {
                self.buildings.push(Building::new(kind));
                self.buildings.len() - 1
            }
        };
        &mut self.buildings[idx]
    }

    pub fn level(&self, kind: BuildingKind) -> u32 {
        self.get(kind).map(|b| b.level).unwrap_or(0)
    }

    pub fn is_built(&self, kind: BuildingKind) -> bool {
        self.level(kind) >= 1
    }

    pub fn hero_capacity(&self) -> usize {
        dormitory_capacity(self.level(BuildingKind::Dormitory).max(1))
    }

    /// Mark buildings unlocked by reaching `floor`, returning the newly
    /// unlocked kinds.
    pub fn unlock_for_floor(&mut self, floor: u32) -> Vec<BuildingKind> {
        let mut unlocked = Vec::new();
        for building in &mut self.buildings {
            if !building.unlocked && building.is_available(floor) {
                building.unlocked = true;
                unlocked.push(building.kind);
            }
        }
        if !unlocked.is_empty() {
            info!(floor, ?unlocked, "Buildings unlocked");
        }
        unlocked
    }

    /// Build or upgrade one level, paying in gold.
    pub fn upgrade(
        &mut self,
        kind: BuildingKind,
        floor: u32,
        wallet: &mut Wallet,
    ) -> Result<u32, GameError> {
        let building = self.entry(kind);
        if let Some(reason) = building.upgrade_blocker(floor) {
            return Err(GameError::MissingPrerequisite(reason));
        }
        let cost = building.upgrade_cost();
        if !wallet.try_spend_gold(cost) {
            return Err(GameError::funds(Currency::Gold, cost, wallet.gold));
        }
        building.level += 1;
        building.built = true;
        building.unlocked = true;
        info!(building = %kind, level = building.level, cost, "Building upgraded");
        Ok(building.level)
    }
}
