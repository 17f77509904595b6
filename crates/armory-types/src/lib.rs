//! Shared type definitions for the Armory agent and loot generator.
//!
//! This crate is the single source of truth for the data flowing between
//! the generation engine (`armory-gen`) and its callers. Everything here is
//! plain data with `serde` derives; no generation logic lives here.
//!
//! # Modules
//!
//! - [`ids`] -- UUID wrappers for generated entities, string keys for templates
//! - [`enums`] -- Equipment slots, loot categories, body parts, sides
//! - [`template`] -- Immutable catalog item templates
//! - [`role`] -- Raw per-role generation templates
//! - [`inventory`] -- The inventory graph (arena of items linked by id)
//! - [`agent`] -- Generated agent records
//! - [`loot`] -- Flat loot lists and presets

pub mod agent;
pub mod enums;
pub mod ids;
pub mod inventory;
pub mod loot;
pub mod role;
pub mod template;

// Re-export all public types at crate root for convenience.
pub use agent::{AgentHealth, AgentInfo, Appearance, GeneratedAgent, HealthValue};
pub use enums::{BodyPart, ContainerKind, Difficulty, EquipmentSlot, LootCategory, Side};
pub use ids::{AgentId, ItemId, TemplateId};
pub use inventory::{
    Durability, GraphError, InventoryGraph, InventoryItem, InventoryRoots, ItemLocation,
    ItemProperties,
};
pub use loot::{LootItem, Preset};
pub use role::{
    CountWeights, MinMax, RoleAppearance, RoleChances, RoleGeneration, RoleHealth, RoleInventory,
    RoleTemplate, WeightMap,
};
pub use template::{GridProps, ItemSlot, ItemTemplate, StackSlot};

/// Monetary amounts (catalog prices, loot value budgets), in roubles.
pub type Money = rust_decimal::Decimal;
