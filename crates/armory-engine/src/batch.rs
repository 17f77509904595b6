//! Batch generation driven by the `engine` section of `armory-config.yaml`.
//!
//! A batch builds a number of agents per starter role, one reward pool and
//! the contents of one sealed weapon crate. Everything is generated against
//! a single [`GenerationSession`], which is closed with `end_raid` at the
//! end of the batch.

use armory_gen::starter_kit;
use armory_gen::{
    AgentGenerator, AgentRequest, Collaborators, CrateRequest, GenerationContext,
    GenerationSession, GeneratorConfig, ItemCatalog, LootComposer, LootRequest, UuidV7Ids,
};
use armory_types::{Difficulty, GeneratedAgent, LootItem, MinMax, Money, TemplateId};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Batch settings, loaded from the `engine` key of `armory-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchConfig {
    /// Agents generated per starter role.
    #[serde(default = "default_agents_per_role")]
    pub agents_per_role: u32,

    /// Fixed RNG seed. Without one the thread RNG is used.
    #[serde(default)]
    pub seed: Option<u64>,

    /// AI difficulty assigned to every agent.
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Reward pool settings.
    #[serde(default)]
    pub rewards: RewardConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            agents_per_role: default_agents_per_role(),
            seed: None,
            difficulty: Difficulty::default(),
            rewards: RewardConfig::default(),
        }
    }
}

/// Reward pool shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewardConfig {
    /// Loose items drawn from the catalog.
    #[serde(default = "default_item_count")]
    pub item_count: u32,

    /// Classes loose items are drawn from.
    #[serde(default = "default_item_classes")]
    pub item_classes: Vec<TemplateId>,

    /// Templates never rewarded.
    #[serde(default)]
    pub blacklist: Vec<TemplateId>,

    /// Stack size range for stackable rewards.
    #[serde(default = "default_stack_range")]
    pub stack_range: MinMax,

    /// Weapon presets added.
    #[serde(default = "default_preset_count")]
    pub weapon_preset_count: u32,

    /// Armor presets added.
    #[serde(default = "default_preset_count")]
    pub armor_preset_count: u32,

    /// Allowed armor protection levels; empty allows any.
    #[serde(default)]
    pub armor_levels: Vec<u8>,

    /// Sealed crates added to the pool.
    #[serde(default = "default_crate_count")]
    pub crate_count: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            item_count: default_item_count(),
            item_classes: default_item_classes(),
            blacklist: Vec::new(),
            stack_range: default_stack_range(),
            weapon_preset_count: default_preset_count(),
            armor_preset_count: default_preset_count(),
            armor_levels: Vec::new(),
            crate_count: default_crate_count(),
        }
    }
}

impl RewardConfig {
    /// Loot request drawing sealed crates from `crate_weapon`.
    fn to_request(&self) -> LootRequest {
        LootRequest {
            crate_pool: vec![TemplateId::from("crate_weapon")],
            crate_count: self.crate_count,
            item_count: self.item_count,
            item_classes: self.item_classes.clone(),
            blacklist: self.blacklist.clone(),
            stack_range: self.stack_range,
            weapon_preset_count: self.weapon_preset_count,
            armor_preset_count: self.armor_preset_count,
            armor_levels: self.armor_levels.clone(),
            ..LootRequest::default()
        }
    }
}

const fn default_agents_per_role() -> u32 {
    3
}

const fn default_item_count() -> u32 {
    6
}

fn default_item_classes() -> Vec<TemplateId> {
    ["class.barter", "class.food", "class.meds", "class.ammo"]
        .into_iter()
        .map(TemplateId::from)
        .collect()
}

const fn default_stack_range() -> MinMax {
    MinMax::new(10, 60)
}

const fn default_preset_count() -> u32 {
    1
}

const fn default_crate_count() -> u32 {
    1
}

// -----------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------

/// Everything one batch produced.
#[derive(Debug, Serialize)]
pub struct BatchOutput {
    /// Generated agents, grouped by role in starter order.
    pub agents: Vec<GeneratedAgent>,
    /// Reward pool entries.
    pub rewards: Vec<LootItem>,
    /// Catalog value of the reward pool.
    pub reward_value: Money,
    /// Contents of one opened sealed crate.
    pub crate_contents: Vec<LootItem>,
}

// -----------------------------------------------------------------------
// Running
// -----------------------------------------------------------------------

/// Generate a full batch against the starter catalog.
pub fn run_batch(
    batch: &BatchConfig,
    config: &GeneratorConfig,
    rng: &mut dyn RngCore,
) -> Result<BatchOutput, EngineError> {
    let catalog = starter_kit::catalog();
    let presets = starter_kit::presets();
    let ids = UuidV7Ids;
    let ctx = GenerationContext::new(&catalog, &ids, config);
    let session = GenerationSession::with_pmc_source(Box::new(starter_kit::pmc_loot()));
    let collaborators = Collaborators::basic(config);
    let generator = AgentGenerator::new(ctx, &session, &collaborators);

    let mut agents = Vec::new();
    for role in starter_kit::roles() {
        for _ in 0..batch.agents_per_role {
            let agent = generator.generate(&AgentRequest::new(&role, batch.difficulty), rng)?;
            info!(
                role = agent.info.role.as_str(),
                nickname = agent.info.nickname.as_str(),
                level = agent.info.level,
                items = agent.inventory.len(),
                "agent generated"
            );
            agents.push(agent);
        }
    }

    let composer = LootComposer::new(ctx, &presets);
    let rewards = composer.compose(&batch.rewards.to_request(), rng);
    let reward_value = value_of(&rewards, &catalog);
    info!(entries = rewards.len(), value = %reward_value, "reward pool composed");

    let crate_request = CrateRequest {
        rewards: starter_kit::weights(&[("ps545", 3), ("bp545", 1), ("f1", 1), ("ai2", 2)]),
        reward_count: MinMax::new(2, 4),
        ..CrateRequest::default()
    };
    let crate_contents = composer.sealed_crate_contents(&crate_request, rng);
    info!(entries = crate_contents.len(), "sealed crate opened");

    info!(
        agents = agents.len(),
        pools_built = session.cache().builds(),
        roles_validated = session.validated_roles(),
        "batch complete"
    );
    session.end_raid();

    Ok(BatchOutput {
        agents,
        rewards,
        reward_value,
        crate_contents,
    })
}

/// Catalog value of a loot list; unpriced entries count as zero.
fn value_of(items: &[LootItem], catalog: &dyn ItemCatalog) -> Money {
    items.iter().fold(Money::ZERO, |total, item| {
        let unit = catalog.price_of(&item.tpl).unwrap_or(Money::ZERO);
        total.saturating_add(unit.saturating_mul(Money::from(item.stack_count)))
    })
}
