//! Agent equipment and loot generation for the Armory backend.
//!
//! This crate builds non-player agents (attributes plus a fully populated
//! inventory) and flat loot lists from weighted role templates. It is pure
//! logic: no I/O beyond optional config loading, no async. Templates come
//! from an [`ItemCatalog`]; everything the full game would customize sits
//! behind a trait with a stand-alone implementation.
//!
//! # Modules
//!
//! - [`agent`] -- The generation pipeline ([`AgentGenerator`])
//! - [`assembly`] -- Weapon building and attachment filling seams
//! - [`attributes`] -- Level, experience, health, skills, appearance
//! - [`catalog`] -- Catalog trait, base-class ids, [`InMemoryCatalog`]
//! - [`compatibility`] -- Equipment conflict rules
//! - [`composer`] -- Reward and sealed-crate loot lists ([`LootComposer`])
//! - [`config`] -- Tuning loaded from YAML ([`GeneratorConfig`])
//! - [`container`] -- Loose loot passes into containers ([`ContainerFiller`])
//! - [`context`] -- Borrowed collaborators shared by every builder
//! - [`equipment`] -- Equipment slot selection and ordering
//! - [`error`] -- [`GenerationError`] and logged [`GenerationEvent`]s
//! - [`ids`] -- Id minting ([`UuidV7Ids`], [`SequentialIds`])
//! - [`item_builder`] -- Quantity rules for new loot items
//! - [`limits`] -- Per-agent spawn ceilings
//! - [`placement`] -- Grid placement inside containers
//! - [`pool_cache`] -- Raid-scoped per-role loot pools ([`LootCache`])
//! - [`session`] -- Raid-scoped state ([`GenerationSession`])
//! - [`starter_kit`] -- Demo catalog, roles and presets
//! - [`weapons`] -- Weapons, spare magazines and ammunition
//! - [`weighted`] -- Weighted pools and sampling helpers

pub mod agent;
pub mod assembly;
pub mod attributes;
pub mod catalog;
pub mod compatibility;
pub mod composer;
pub mod config;
pub mod container;
pub mod context;
pub mod equipment;
pub mod error;
pub mod ids;
pub mod item_builder;
pub mod limits;
pub mod placement;
pub mod pool_cache;
pub mod session;
pub mod starter_kit;
pub mod weapons;
pub mod weighted;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentGenerator, AgentRequest, Collaborators};
pub use assembly::{BasicWeaponBuilder, GeneratedWeapon, ModFiller, SlotModFiller, WeaponBuilder, WeaponRequest};
pub use catalog::{InMemoryCatalog, ItemCatalog, base_class};
pub use compatibility::{Compatibility, CompatibilityChecker, ConflictRules};
pub use composer::{CrateRequest, LootComposer, LootRequest, PresetProvider, StaticPresets};
pub use config::{ConfigError, GeneratorConfig};
pub use container::{ContainerFiller, FillReport, FillRequest, FillStop};
pub use context::GenerationContext;
pub use equipment::{EquipmentSelector, SlotOutcome, SlotRequest};
pub use error::{GenerationError, GenerationEvent};
pub use ids::{IdGenerator, SequentialIds, UuidV7Ids};
pub use limits::{LimitCheck, SpawnLimitCounter};
pub use pool_cache::{LootCache, NoPmcLoot, PmcLootSource, PriceRange, StaticPmcLoot};
pub use session::GenerationSession;
pub use weapons::{WeaponAssembler, WeaponReport};
pub use weighted::WeightedPool;
