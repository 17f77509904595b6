//! Agent generation pipeline.
//!
//! One call to [`AgentGenerator::generate`] runs, in order:
//!
//! 1. role validation (memoized per session)
//! 2. attributes: level, experience, health, skills, appearance
//! 3. equipment slots
//! 4. weapons, spare magazines and ammunition
//! 5. loose loot, category by category, into the equipped containers
//!
//! Everything mutable lives on the stack of the call: the inventory graph,
//! the spawn-limit counter and the working pools. The generator itself
//! only borrows shared state.

use armory_types::{
    ContainerKind, Difficulty, EquipmentSlot, GeneratedAgent, InventoryGraph, InventoryRoots,
    LootCategory, RoleTemplate,
};
use chrono::Utc;
use rand::RngCore;

use crate::assembly::{BasicWeaponBuilder, ModFiller, SlotModFiller, WeaponBuilder};
use crate::attributes::generate_attributes;
use crate::compatibility::{CompatibilityChecker, ConflictRules};
use crate::config::GeneratorConfig;
use crate::container::{ContainerFiller, FillRequest};
use crate::context::GenerationContext;
use crate::equipment::EquipmentSelector;
use crate::error::GenerationError;
use crate::limits::SpawnLimitCounter;
use crate::session::GenerationSession;
use crate::weapons::WeaponAssembler;
use crate::weighted::draw_count;

use EquipmentSlot::{Backpack, Pockets, SecuredContainer, TacticalVest};

/// Everything general-purpose containers can take, in preference order.
const SUPPLY_TARGETS: [EquipmentSlot; 4] = [TacticalVest, Pockets, Backpack, SecuredContainer];

/// Loot passes in the order they run: category, target containers, whether
/// spawn limits apply, and the container whose value budget caps the pass.
const LOOT_PASSES: [(LootCategory, &[EquipmentSlot], bool, Option<ContainerKind>); 12] = [
    (LootCategory::Special, &[Pockets, Backpack, TacticalVest], true, None),
    (LootCategory::Healing, &SUPPLY_TARGETS, true, None),
    (LootCategory::Drugs, &SUPPLY_TARGETS, true, None),
    (LootCategory::Food, &SUPPLY_TARGETS, true, None),
    (LootCategory::Drink, &SUPPLY_TARGETS, true, None),
    (LootCategory::Currency, &[Pockets, Backpack, TacticalVest], true, None),
    (LootCategory::Stimulant, &SUPPLY_TARGETS, true, None),
    (LootCategory::Grenade, &[TacticalVest, Pockets], true, None),
    (LootCategory::Backpack, &[Backpack], true, Some(ContainerKind::Backpack)),
    (LootCategory::Vest, &[TacticalVest], true, Some(ContainerKind::TacticalVest)),
    (LootCategory::Pocket, &[Pockets], true, Some(ContainerKind::Pockets)),
    (LootCategory::Secure, &[SecuredContainer], false, None),
];

/// One agent to generate.
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    /// Role template.
    pub role: &'a RoleTemplate,
    /// AI difficulty.
    pub difficulty: Difficulty,
}

impl<'a> AgentRequest<'a> {
    /// Request an agent of `role`.
    pub const fn new(role: &'a RoleTemplate, difficulty: Difficulty) -> Self {
        Self { role, difficulty }
    }
}

/// Pluggable builders used by the pipeline.
pub struct Collaborators {
    /// Equipment compatibility rules.
    pub compatibility: Box<dyn CompatibilityChecker>,
    /// Attachment filler for equipment.
    pub mods: Box<dyn ModFiller>,
    /// Weapon builder.
    pub weapons: Box<dyn WeaponBuilder>,
}

impl Collaborators {
    /// The stand-alone implementations, tuned from `config`.
    pub fn basic(config: &GeneratorConfig) -> Self {
        Self {
            compatibility: Box::new(ConflictRules),
            mods: Box::new(SlotModFiller::new(config.weapons.default_mod_chance_pct)),
            weapons: Box::new(BasicWeaponBuilder::new(config.weapons.default_mod_chance_pct)),
        }
    }
}

impl core::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Builds complete agents.
#[derive(Debug, Clone, Copy)]
pub struct AgentGenerator<'a> {
    ctx: GenerationContext<'a>,
    session: &'a GenerationSession,
    collaborators: &'a Collaborators,
}

impl<'a> AgentGenerator<'a> {
    /// Create a generator.
    pub const fn new(
        ctx: GenerationContext<'a>,
        session: &'a GenerationSession,
        collaborators: &'a Collaborators,
    ) -> Self {
        Self {
            ctx,
            session,
            collaborators,
        }
    }

    /// Generate one agent.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRoleConfig`] if the role fails
    /// validation, or [`GenerationError::Graph`] if an item tree could not
    /// be attached to the inventory.
    pub fn generate(
        &self,
        request: &AgentRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedAgent, GenerationError> {
        let role = request.role;
        self.session.check_role(role)?;
        let is_special_class = self.ctx.config.is_special_class(&role.role);

        let attributes = generate_attributes(role, request.difficulty, &self.ctx.config.attributes, rng);

        let ids = self.ctx.ids;
        let mut inventory = InventoryGraph::new(InventoryRoots {
            equipment: ids.item_id(),
            stash: ids.item_id(),
            quest_raid_items: ids.item_id(),
            sorting_table: ids.item_id(),
        });

        EquipmentSelector::new(
            self.ctx,
            self.collaborators.compatibility.as_ref(),
            self.collaborators.mods.as_ref(),
        )
        .fill_all(&mut inventory, role, is_special_class, rng)?;

        WeaponAssembler::new(self.ctx, self.collaborators.weapons.as_ref())
            .assign_weapons(&mut inventory, role, rng)?;

        self.fill_loot(&mut inventory, role, is_special_class, rng)?;

        tracing::debug!(
            role = role.role.as_str(),
            level = attributes.info.level,
            items = inventory.len(),
            "agent generated"
        );

        Ok(GeneratedAgent {
            id: ids.agent_id(),
            info: attributes.info,
            health: attributes.health,
            skills: attributes.skills,
            appearance: attributes.appearance,
            inventory,
            generated_at: Utc::now(),
        })
    }

    fn fill_loot(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        is_special_class: bool,
        rng: &mut dyn RngCore,
    ) -> Result<(), GenerationError> {
        let mut limits = SpawnLimitCounter::for_role(self.ctx.config, &role.role, is_special_class);
        let filler = ContainerFiller::new(self.ctx, &role.role);

        for (category, targets, use_limits, budget) in LOOT_PASSES {
            let count = role
                .count_weights(category)
                .map_or(0, |table| draw_count(&table.weights, rng));
            if count == 0 {
                continue;
            }
            let pool = self
                .session
                .cache()
                .get(role, is_special_class, category, self.ctx.catalog, None);
            if pool.is_empty() {
                continue;
            }
            let mut fill = FillRequest::new(pool, targets.to_vec(), count).special_class(is_special_class);
            if use_limits {
                fill = fill.with_limits();
            }
            if let Some(kind) = budget {
                fill = fill.with_budget(self.ctx.config.loot.budget_for(kind));
            }
            let report = filler.fill(fill, inventory, &mut limits, rng)?;
            tracing::trace!(
                role = role.role.as_str(),
                category = %category,
                count = report.placed.len(),
                "loot pass"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{MinMax, Side, TemplateId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::ids::SequentialIds;
    use crate::starter_kit;

    #[test]
    fn generates_valid_agents_for_every_starter_role() {
        let catalog = starter_kit::catalog();
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let session = GenerationSession::new();
        let collaborators = Collaborators::basic(&config);
        let generator = AgentGenerator::new(
            GenerationContext::new(&catalog, &ids, &config),
            &session,
            &collaborators,
        );
        let mut rng = SmallRng::seed_from_u64(11);
        for role in starter_kit::roles() {
            let agent = generator
                .generate(&AgentRequest::new(&role, Difficulty::Normal), &mut rng)
                .unwrap();
            assert_eq!(agent.info.role, role.role);
            assert!(agent.inventory.validate().is_ok());
            assert!(agent.inventory.equipped(EquipmentSlot::Pockets).is_some());
        }
    }

    #[test]
    fn invalid_role_is_rejected() {
        let catalog = InMemoryCatalog::new();
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let session = GenerationSession::new();
        let collaborators = Collaborators::basic(&config);
        let generator = AgentGenerator::new(
            GenerationContext::new(&catalog, &ids, &config),
            &session,
            &collaborators,
        );
        let role = RoleTemplate::new("empty", Side::Savage, MinMax::new(1, 1));
        let mut rng = SmallRng::seed_from_u64(12);
        let err = generator
            .generate(&AgentRequest::new(&role, Difficulty::Easy), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRoleConfig { ref role, .. } if role == "empty"));
    }

    #[test]
    fn missing_catalog_still_yields_an_agent() {
        let catalog = InMemoryCatalog::new();
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let session = GenerationSession::new();
        let collaborators = Collaborators::basic(&config);
        let generator = AgentGenerator::new(
            GenerationContext::new(&catalog, &ids, &config),
            &session,
            &collaborators,
        );
        let mut role = RoleTemplate::new("ghost", Side::Savage, MinMax::new(1, 3));
        role.chances.equipment.insert(EquipmentSlot::Headwear, 100);
        let mut pool = armory_types::WeightMap::new();
        pool.insert(TemplateId::from("unknown_helmet"), 1);
        role.inventory.equipment.insert(EquipmentSlot::Headwear, pool);
        let mut rng = SmallRng::seed_from_u64(13);
        let agent = generator
            .generate(&AgentRequest::new(&role, Difficulty::Normal), &mut rng)
            .unwrap();
        assert!(agent.inventory.equipped(EquipmentSlot::Headwear).is_none());
        assert!(agent.inventory.validate().is_ok());
    }
}
