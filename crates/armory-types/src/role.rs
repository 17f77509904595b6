//! Raw per-role generation templates.
//!
//! A [`RoleTemplate`] is external data describing what an agent of a given
//! role may carry and how likely each piece is. The generator derives its
//! cached pools from it and never mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{BodyPart, ContainerKind, EquipmentSlot, LootCategory, Side};
use crate::ids::TemplateId;

/// Template id to relative selection weight.
pub type WeightMap = BTreeMap<TemplateId, u32>;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMax {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl MinMax {
    /// Create a range.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `min <= max`.
    pub const fn is_valid(self) -> bool {
        self.min <= self.max
    }
}

/// Raw item pools of a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInventory {
    /// Candidate gear per equipment slot.
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, WeightMap>,
    /// Candidate cartridges per caliber.
    #[serde(default)]
    pub ammo: BTreeMap<String, WeightMap>,
    /// Candidate loose loot per container.
    #[serde(default)]
    pub items: BTreeMap<ContainerKind, WeightMap>,
}

/// Spawn chances in percent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChances {
    /// Chance per equipment slot.
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, u32>,
    /// Chance per weapon mod slot name.
    #[serde(default)]
    pub weapon_mods: BTreeMap<String, u32>,
    /// Chance per gear mod slot name.
    #[serde(default)]
    pub equipment_mods: BTreeMap<String, u32>,
}

/// How many items of a kind to generate, plus an optional explicit pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountWeights {
    /// Item count to relative weight.
    #[serde(default)]
    pub weights: BTreeMap<u32, u32>,
    /// When non-empty, replaces the derived category pool.
    #[serde(default)]
    pub whitelist: WeightMap,
}

/// Count tables for loot generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGeneration {
    /// Per-category item counts.
    #[serde(default)]
    pub items: BTreeMap<LootCategory, CountWeights>,
    /// Spare magazine counts.
    #[serde(default)]
    pub magazines: CountWeights,
}

/// Health ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHealth {
    /// Maximum hit points per body part.
    pub body_parts: BTreeMap<BodyPart, MinMax>,
    /// Starting hydration.
    pub hydration: MinMax,
    /// Starting energy.
    pub energy: MinMax,
}

impl Default for RoleHealth {
    fn default() -> Self {
        let body_parts = BodyPart::ALL
            .into_iter()
            .map(|part| {
                let range = match part {
                    BodyPart::Head => MinMax::new(35, 35),
                    BodyPart::Chest => MinMax::new(85, 85),
                    BodyPart::Stomach => MinMax::new(70, 70),
                    BodyPart::LeftArm | BodyPart::RightArm => MinMax::new(60, 60),
                    BodyPart::LeftLeg | BodyPart::RightLeg => MinMax::new(65, 65),
                };
                (part, range)
            })
            .collect();
        Self {
            body_parts,
            hydration: MinMax::new(100, 100),
            energy: MinMax::new(100, 100),
        }
    }
}

/// Appearance pools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAppearance {
    /// Head models.
    #[serde(default)]
    pub head: WeightMap,
    /// Upper body models.
    #[serde(default)]
    pub body: WeightMap,
    /// Lower body models.
    #[serde(default)]
    pub feet: WeightMap,
    /// Hand models.
    #[serde(default)]
    pub hands: WeightMap,
    /// Voice lines.
    #[serde(default)]
    pub voice: WeightMap,
}

/// Everything the generator needs to know about one agent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    /// Role name, e.g. `assault` or `pmc_usec`.
    pub role: String,
    /// Faction.
    pub side: Side,
    /// Level range.
    pub level: MinMax,
    /// Raw item pools.
    #[serde(default)]
    pub inventory: RoleInventory,
    /// Spawn chances.
    #[serde(default)]
    pub chances: RoleChances,
    /// Count tables.
    #[serde(default)]
    pub generation: RoleGeneration,
    /// Health ranges.
    #[serde(default)]
    pub health: RoleHealth,
    /// Skill name to level range.
    #[serde(default)]
    pub skills: BTreeMap<String, MinMax>,
    /// Appearance pools.
    #[serde(default)]
    pub appearance: RoleAppearance,
    /// Nickname pool.
    #[serde(default)]
    pub names: Vec<String>,
}

impl RoleTemplate {
    /// Create an empty template for `role`.
    pub fn new(role: &str, side: Side, level: MinMax) -> Self {
        Self {
            role: String::from(role),
            side,
            level,
            inventory: RoleInventory::default(),
            chances: RoleChances::default(),
            generation: RoleGeneration::default(),
            health: RoleHealth::default(),
            skills: BTreeMap::new(),
            appearance: RoleAppearance::default(),
            names: Vec::new(),
        }
    }

    /// Count table for a loot category.
    pub fn count_weights(&self, category: LootCategory) -> Option<&CountWeights> {
        self.generation.items.get(&category)
    }
}
