//! Equipment slot selection.
//!
//! [`EquipmentSelector::fill_slot`] picks one item for one slot: roll the
//! spawn chance, then draw from a working copy of the slot pool until a
//! candidate exists in the catalog and is compatible with what is already
//! worn, giving up after a bounded number of rejections.
//!
//! [`EquipmentSelector::fill_all`] runs the slots in a fixed order so that
//! head gear blocking rules and the armor/rig exclusivity see the items
//! they depend on.

use std::collections::BTreeMap;

use armory_types::{EquipmentSlot, InventoryGraph, InventoryItem, RoleTemplate, Side};
use rand::RngCore;

use crate::assembly::ModFiller;
use crate::catalog::ItemCatalog;
use crate::compatibility::{Compatibility, CompatibilityChecker};
use crate::context::GenerationContext;
use crate::error::{GenerationError, GenerationEvent};
use crate::item_builder::randomize_durability;
use crate::weighted::{WeightedPool, roll_chance};

/// Result of filling one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// An item was equipped.
    Added,
    /// The slot did not spawn (chance roll, empty pool, or no config).
    Skipped,
    /// Every candidate was rejected.
    Exhausted,
}

/// Slots filled before the order-sensitive head and torso slots.
const LEADING_SLOTS: [EquipmentSlot; 6] = [
    EquipmentSlot::Scabbard,
    EquipmentSlot::Eyewear,
    EquipmentSlot::ArmBand,
    EquipmentSlot::Backpack,
    EquipmentSlot::Pockets,
    EquipmentSlot::SecuredContainer,
];

/// Head gear and body armor, in dependency order.
const ORDERED_SLOTS: [EquipmentSlot; 4] = [
    EquipmentSlot::FaceCover,
    EquipmentSlot::Headwear,
    EquipmentSlot::Earpiece,
    EquipmentSlot::ArmorVest,
];

/// One slot to fill.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest<'a> {
    /// Target slot.
    pub slot: EquipmentSlot,
    /// Candidate pool. Never mutated; rejections only shrink a copy.
    pub pool: &'a WeightedPool,
    /// Role being generated.
    pub role: &'a RoleTemplate,
}

/// Number of rejected draws tolerated for a pool of `pool_len` entries.
pub fn retry_ceiling(pool_len: usize, fraction_pct: u32) -> usize {
    let scaled = u64::try_from(pool_len)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(fraction_pct))
        .saturating_add(50)
        / 100;
    usize::try_from(scaled).unwrap_or(usize::MAX)
}

/// Picks and equips gear.
pub struct EquipmentSelector<'a> {
    ctx: GenerationContext<'a>,
    compatibility: &'a dyn CompatibilityChecker,
    mods: &'a dyn ModFiller,
}

impl core::fmt::Debug for EquipmentSelector<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EquipmentSelector").finish_non_exhaustive()
    }
}

impl<'a> EquipmentSelector<'a> {
    /// Create a selector.
    pub const fn new(
        ctx: GenerationContext<'a>,
        compatibility: &'a dyn CompatibilityChecker,
        mods: &'a dyn ModFiller,
    ) -> Self {
        Self {
            ctx,
            compatibility,
            mods,
        }
    }

    /// Spawn chance for a slot, `None` when the role does not configure it.
    fn spawn_chance(role: &RoleTemplate, slot: EquipmentSlot) -> Option<u32> {
        if slot.always_spawns() {
            return Some(100);
        }
        role.chances.equipment.get(&slot).copied()
    }

    /// Try to equip one item into `request.slot`.
    pub fn fill_slot(
        &self,
        inventory: &mut InventoryGraph,
        request: &SlotRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<SlotOutcome, GenerationError> {
        let role = request.role.role.as_str();
        let Some(chance) = Self::spawn_chance(request.role, request.slot) else {
            GenerationEvent::SlotConfigMissing { slot: request.slot }.log(role);
            return Ok(SlotOutcome::Skipped);
        };
        if request.pool.is_empty() || !roll_chance(rng, chance) {
            return Ok(SlotOutcome::Skipped);
        }

        let catalog = self.ctx.catalog;
        let ceiling = retry_ceiling(
            request.pool.len(),
            self.ctx.config.retry.slot_retry_fraction_pct,
        );
        let mut working = request.pool.clone();
        let mut attempts: usize = 0;

        let template = loop {
            let Some(tpl) = working.draw(rng).cloned() else {
                break None;
            };
            match catalog.lookup(&tpl) {
                None => {
                    GenerationEvent::MissingTemplate { tpl: tpl.clone() }.log(role);
                }
                Some(template) => {
                    match self
                        .compatibility
                        .check(inventory, request.slot, template, catalog)
                    {
                        Compatibility::Compatible => break Some(template),
                        Compatibility::Incompatible { reason } => {
                            tracing::debug!(role, slot = %request.slot, tpl = %tpl, reason = reason.as_str(), "candidate rejected");
                        }
                    }
                }
            }
            working.remove(&tpl);
            attempts = attempts.saturating_add(1);
            if attempts > ceiling {
                break None;
            }
        };

        let Some(template) = template else {
            GenerationEvent::PoolExhausted {
                context: format!("equipment slot {}", request.slot),
            }
            .log(role);
            return Ok(SlotOutcome::Exhausted);
        };

        let mut root = InventoryItem::child_of(
            self.ctx.ids.item_id(),
            template.id.clone(),
            inventory.equipment_id(),
            request.slot.as_str(),
        );
        if template.armor_class.is_some() {
            randomize_durability(
                &mut root,
                template,
                self.ctx.config.equipment.armor_durability_pct,
                rng,
            );
        }
        let children = self.mods.fill(
            &self.ctx,
            root.id,
            template,
            &request.role.chances.equipment_mods,
            rng,
        );
        let mut tree = Vec::with_capacity(children.len().saturating_add(1));
        tree.push(root);
        tree.extend(children);
        inventory.add_tree(tree)?;
        tracing::debug!(role, slot = %request.slot, tpl = %template.id, "equipped");
        Ok(SlotOutcome::Added)
    }

    /// Fill every non-weapon slot of `role` in dependency order.
    pub fn fill_all(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        is_special_class: bool,
        rng: &mut dyn RngCore,
    ) -> Result<BTreeMap<EquipmentSlot, SlotOutcome>, GenerationError> {
        let mut outcomes = BTreeMap::new();
        for slot in LEADING_SLOTS.into_iter().chain(ORDERED_SLOTS) {
            let pool = slot_pool(role, slot);
            let request = SlotRequest {
                slot,
                pool: &pool,
                role,
            };
            outcomes.insert(slot, self.fill_slot(inventory, &request, rng)?);
        }

        let armor_worn = outcomes.get(&EquipmentSlot::ArmorVest) == Some(&SlotOutcome::Added);
        let rigs = self.rig_pool(role, armor_worn);
        let request = SlotRequest {
            slot: EquipmentSlot::TacticalVest,
            pool: &rigs,
            role,
        };
        outcomes.insert(
            EquipmentSlot::TacticalVest,
            self.fill_slot(inventory, &request, rng)?,
        );

        if is_special_class {
            let outcome = self.add_dog_tag(inventory, role.side, &role.role)?;
            outcomes.insert(EquipmentSlot::Dogtag, outcome);
        }
        Ok(outcomes)
    }

    /// Tactical vest candidates given whether body armor is worn.
    /// "Armored" rigs are those exposing plate or insert slots.
    fn rig_pool(&self, role: &RoleTemplate, armor_worn: bool) -> WeightedPool {
        let pool = slot_pool(role, EquipmentSlot::TacticalVest);
        let rules = &self.ctx.config.equipment;
        let catalog = self.ctx.catalog;
        if armor_worn && rules.no_double_armor {
            return pool.filtered(|tpl| !is_armored_rig(catalog, tpl));
        }
        if !armor_worn && rules.force_armored_rig_when_bare {
            return pool.filtered(|tpl| is_armored_rig(catalog, tpl));
        }
        pool
    }

    fn add_dog_tag(
        &self,
        inventory: &mut InventoryGraph,
        side: Side,
        role: &str,
    ) -> Result<SlotOutcome, GenerationError> {
        let Some(tpl) = self.ctx.config.equipment.dog_tags.get(&side) else {
            return Ok(SlotOutcome::Skipped);
        };
        if self.ctx.catalog.lookup(tpl).is_none() {
            GenerationEvent::MissingTemplate { tpl: tpl.clone() }.log(role);
            return Ok(SlotOutcome::Skipped);
        }
        let mut tag = InventoryItem::child_of(
            self.ctx.ids.item_id(),
            tpl.clone(),
            inventory.equipment_id(),
            EquipmentSlot::Dogtag.as_str(),
        );
        tag.props.tags.push(format!("{side:?}"));
        inventory.add(tag)?;
        Ok(SlotOutcome::Added)
    }
}

/// The role's raw pool for a slot.
pub fn slot_pool(role: &RoleTemplate, slot: EquipmentSlot) -> WeightedPool {
    role.inventory
        .equipment
        .get(&slot)
        .map(WeightedPool::from_weights)
        .unwrap_or_default()
}

fn is_armored_rig(catalog: &dyn ItemCatalog, tpl: &armory_types::TemplateId) -> bool {
    catalog.lookup(tpl).is_some_and(armory_types::ItemTemplate::has_slots)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{InventoryRoots, ItemId, ItemSlot, ItemTemplate, MinMax, TemplateId, WeightMap};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::assembly::SlotModFiller;
    use crate::catalog::{InMemoryCatalog, base_class};
    use crate::compatibility::ConflictRules;
    use crate::config::GeneratorConfig;
    use crate::ids::SequentialIds;

    fn graph() -> InventoryGraph {
        InventoryGraph::new(InventoryRoots {
            equipment: ItemId::new(),
            stash: ItemId::new(),
            quest_raid_items: ItemId::new(),
            sorting_table: ItemId::new(),
        })
    }

    fn plate_slot() -> ItemSlot {
        ItemSlot {
            name: String::from("front_plate"),
            required: false,
            filter: Vec::new(),
            default_item: None,
        }
    }

    fn catalog() -> InMemoryCatalog {
        let mut armor = ItemTemplate::new("6b13", "6B13", base_class::ARMOR);
        armor.armor_class = Some(4);
        armor.max_durability = Some(60);
        let mut armored_rig = ItemTemplate::new("armored_rig", "Armored rig", base_class::VEST);
        armored_rig.slots.push(plate_slot());
        let plain_rig = ItemTemplate::new("plain_rig", "Plain rig", base_class::VEST);
        let mut helmet = ItemTemplate::new("altyn", "Altyn", base_class::HEADWEAR);
        helmet.blocks_earpiece = true;
        let headset = ItemTemplate::new("comtac", "ComTac", "class.headset");
        let pockets = ItemTemplate::new("pockets", "Pockets", base_class::POCKETS);
        let tag = ItemTemplate::new("dogtag_usec", "Dog tag", base_class::DOGTAG);
        [armor, armored_rig, plain_rig, helmet, headset, pockets, tag]
            .into_iter()
            .collect()
    }

    fn weights(ids: &[&str]) -> WeightMap {
        ids.iter().map(|id| (TemplateId::from(*id), 1)).collect()
    }

    fn role(armor_chance: u32) -> RoleTemplate {
        let mut role = RoleTemplate::new("pmc_usec", Side::Usec, MinMax::new(1, 10));
        let eq = &mut role.inventory.equipment;
        eq.insert(EquipmentSlot::ArmorVest, weights(&["6b13"]));
        eq.insert(EquipmentSlot::TacticalVest, weights(&["armored_rig", "plain_rig"]));
        eq.insert(EquipmentSlot::Headwear, weights(&["altyn"]));
        eq.insert(EquipmentSlot::Earpiece, weights(&["comtac"]));
        eq.insert(EquipmentSlot::Pockets, weights(&["pockets"]));
        let chances = &mut role.chances.equipment;
        for slot in EquipmentSlot::ALL {
            chances.insert(slot, 100);
        }
        chances.insert(EquipmentSlot::ArmorVest, armor_chance);
        role
    }

    struct Fixture {
        catalog: InMemoryCatalog,
        ids: SequentialIds,
        config: GeneratorConfig,
        mods: SlotModFiller,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: catalog(),
                ids: SequentialIds::starting_at(100),
                config: GeneratorConfig::default(),
                mods: SlotModFiller::new(0),
            }
        }

        fn selector(&self) -> EquipmentSelector<'_> {
            let ctx = GenerationContext::new(&self.catalog, &self.ids, &self.config);
            EquipmentSelector::new(ctx, &ConflictRules, &self.mods)
        }
    }

    fn equipped(g: &InventoryGraph, slot: EquipmentSlot) -> Option<&str> {
        g.equipped(slot).map(|item| item.tpl.as_str())
    }

    #[test]
    fn retry_ceiling_rounds() {
        assert_eq!(retry_ceiling(1, 75), 1);
        assert_eq!(retry_ceiling(2, 75), 2);
        assert_eq!(retry_ceiling(4, 75), 3);
        assert_eq!(retry_ceiling(10, 75), 8);
        assert_eq!(retry_ceiling(0, 75), 0);
    }

    #[test]
    fn armor_worn_means_unarmored_rig() {
        let f = Fixture::new();
        for seed in 0..20 {
            let mut g = graph();
            let mut rng = SmallRng::seed_from_u64(seed);
            f.selector().fill_all(&mut g, &role(100), true, &mut rng).unwrap();
            assert_eq!(equipped(&g, EquipmentSlot::ArmorVest), Some("6b13"));
            assert_eq!(equipped(&g, EquipmentSlot::TacticalVest), Some("plain_rig"));
        }
    }

    #[test]
    fn bare_agent_gets_armored_rig() {
        let f = Fixture::new();
        for seed in 0..20 {
            let mut g = graph();
            let mut rng = SmallRng::seed_from_u64(seed);
            f.selector().fill_all(&mut g, &role(0), true, &mut rng).unwrap();
            assert_eq!(equipped(&g, EquipmentSlot::ArmorVest), None);
            assert_eq!(equipped(&g, EquipmentSlot::TacticalVest), Some("armored_rig"));
        }
    }

    #[test]
    fn bare_agent_without_armored_rigs_goes_without() {
        let f = Fixture::new();
        let mut role = role(0);
        role.inventory
            .equipment
            .insert(EquipmentSlot::TacticalVest, weights(&["plain_rig"]));
        for seed in 0..20 {
            let mut g = graph();
            let mut rng = SmallRng::seed_from_u64(seed);
            let outcomes = f.selector().fill_all(&mut g, &role, false, &mut rng).unwrap();
            assert_ne!(outcomes.get(&EquipmentSlot::TacticalVest), Some(&SlotOutcome::Added));
            assert_eq!(equipped(&g, EquipmentSlot::TacticalVest), None);
        }
    }

    #[test]
    fn bare_rule_off_keeps_plain_rigs() {
        let mut f = Fixture::new();
        f.config.equipment.force_armored_rig_when_bare = false;
        let mut role = role(0);
        role.inventory
            .equipment
            .insert(EquipmentSlot::TacticalVest, weights(&["plain_rig"]));
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(8);
        f.selector().fill_all(&mut g, &role, false, &mut rng).unwrap();
        assert_eq!(equipped(&g, EquipmentSlot::TacticalVest), Some("plain_rig"));
    }

    #[test]
    fn helmet_blocks_headset() {
        let f = Fixture::new();
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(1);
        let outcomes = f.selector().fill_all(&mut g, &role(100), false, &mut rng).unwrap();
        assert_eq!(outcomes.get(&EquipmentSlot::Headwear), Some(&SlotOutcome::Added));
        assert_eq!(outcomes.get(&EquipmentSlot::Earpiece), Some(&SlotOutcome::Exhausted));
        assert_eq!(equipped(&g, EquipmentSlot::Earpiece), None);
    }

    #[test]
    fn special_class_receives_dog_tag() {
        let f = Fixture::new();
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(2);
        f.selector().fill_all(&mut g, &role(100), true, &mut rng).unwrap();
        let tag = g.equipped(EquipmentSlot::Dogtag).unwrap();
        assert_eq!(tag.tpl.as_str(), "dogtag_usec");
        assert_eq!(tag.props.tags, vec![String::from("Usec")]);
    }

    #[test]
    fn armor_durability_randomized() {
        let f = Fixture::new();
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(3);
        f.selector().fill_all(&mut g, &role(100), false, &mut rng).unwrap();
        let armor = g.equipped(EquipmentSlot::ArmorVest).unwrap();
        let durability = armor.props.durability.unwrap();
        assert_eq!(durability.max, 60);
        assert!((42..=60).contains(&durability.current));
    }

    #[test]
    fn missing_chance_skips_slot() {
        let f = Fixture::new();
        let mut role = role(100);
        role.chances.equipment.remove(&EquipmentSlot::Headwear);
        let pool = slot_pool(&role, EquipmentSlot::Headwear);
        let request = SlotRequest {
            slot: EquipmentSlot::Headwear,
            pool: &pool,
            role: &role,
        };
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(4);
        let outcome = f.selector().fill_slot(&mut g, &request, &mut rng).unwrap();
        assert_eq!(outcome, SlotOutcome::Skipped);
    }

    #[test]
    fn missing_templates_exhaust_the_pool() {
        let f = Fixture::new();
        let role = role(100);
        let pool: WeightedPool = weights(&["ghost_a", "ghost_b"])
            .into_iter()
            .collect();
        let request = SlotRequest {
            slot: EquipmentSlot::Eyewear,
            pool: &pool,
            role: &role,
        };
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = f.selector().fill_slot(&mut g, &request, &mut rng).unwrap();
        assert_eq!(outcome, SlotOutcome::Exhausted);
        assert!(g.is_empty());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pockets_always_spawn() {
        let f = Fixture::new();
        let mut role = role(100);
        role.chances.equipment.insert(EquipmentSlot::Pockets, 0);
        let pool = slot_pool(&role, EquipmentSlot::Pockets);
        let request = SlotRequest {
            slot: EquipmentSlot::Pockets,
            pool: &pool,
            role: &role,
        };
        let mut g = graph();
        let mut rng = SmallRng::seed_from_u64(6);
        let outcome = f.selector().fill_slot(&mut g, &request, &mut rng).unwrap();
        assert_eq!(outcome, SlotOutcome::Added);
    }
}
