//! Gear compatibility rules.
//!
//! Before the slot selector accepts a candidate it asks a
//! [`CompatibilityChecker`] whether the candidate can be worn alongside what
//! is already equipped. [`ConflictRules`] implements the two rules the
//! catalog expresses: explicit conflict lists and the `blocks_*` flags of
//! head-mounted gear.

use armory_types::{EquipmentSlot, InventoryGraph, ItemTemplate};

use crate::catalog::ItemCatalog;

/// Verdict of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// The candidate may be equipped.
    Compatible,
    /// The candidate clashes with equipped gear.
    Incompatible {
        /// Human-readable reason, for logs.
        reason: String,
    },
}

impl Compatibility {
    /// Whether the verdict allows equipping.
    pub const fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

/// Decides whether a candidate fits next to already equipped items.
pub trait CompatibilityChecker: Send + Sync {
    /// Check `candidate` for `slot` against the current equipment.
    fn check(
        &self,
        inventory: &InventoryGraph,
        slot: EquipmentSlot,
        candidate: &ItemTemplate,
        catalog: &dyn ItemCatalog,
    ) -> Compatibility;
}

/// Conflict lists plus head-gear blocking flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictRules;

/// Equipment slots a template blocks when worn.
fn blocked_slots(template: &ItemTemplate) -> impl Iterator<Item = EquipmentSlot> {
    [
        (template.blocks_earpiece, EquipmentSlot::Earpiece),
        (template.blocks_headwear, EquipmentSlot::Headwear),
        (template.blocks_face_cover, EquipmentSlot::FaceCover),
        (template.blocks_eyewear, EquipmentSlot::Eyewear),
    ]
    .into_iter()
    .filter_map(|(blocks, slot)| blocks.then_some(slot))
}

impl CompatibilityChecker for ConflictRules {
    fn check(
        &self,
        inventory: &InventoryGraph,
        slot: EquipmentSlot,
        candidate: &ItemTemplate,
        catalog: &dyn ItemCatalog,
    ) -> Compatibility {
        let equipment = inventory.equipment_id();
        for worn in inventory.children(equipment) {
            if candidate.conflicting_items.contains(&worn.tpl) {
                return Compatibility::Incompatible {
                    reason: format!("{} conflicts with equipped {}", candidate.id, worn.tpl),
                };
            }
            let Some(worn_template) = catalog.lookup(&worn.tpl) else {
                continue;
            };
            if worn_template.conflicting_items.contains(&candidate.id) {
                return Compatibility::Incompatible {
                    reason: format!("equipped {} conflicts with {}", worn.tpl, candidate.id),
                };
            }
            if blocked_slots(worn_template).any(|blocked| blocked == slot) {
                return Compatibility::Incompatible {
                    reason: format!("{slot} is blocked by equipped {}", worn.tpl),
                };
            }
            let worn_slot = worn.slot_id.as_deref();
            if blocked_slots(candidate).any(|blocked| Some(blocked.as_str()) == worn_slot) {
                return Compatibility::Incompatible {
                    reason: format!("{} would block occupied {}", candidate.id, worn.tpl),
                };
            }
        }
        Compatibility::Compatible
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{InventoryItem, InventoryRoots, ItemId, TemplateId};

    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn graph() -> InventoryGraph {
        InventoryGraph::new(InventoryRoots {
            equipment: ItemId::new(),
            stash: ItemId::new(),
            quest_raid_items: ItemId::new(),
            sorting_table: ItemId::new(),
        })
    }

    fn equip(graph: &mut InventoryGraph, tpl: &str, slot: EquipmentSlot) {
        let item = InventoryItem::child_of(
            ItemId::new(),
            TemplateId::from(tpl),
            graph.equipment_id(),
            slot.as_str(),
        );
        graph.add(item).unwrap();
    }

    fn catalog() -> InMemoryCatalog {
        let mut altyn = ItemTemplate::new("altyn", "Altyn", "class.headwear");
        altyn.blocks_earpiece = true;
        altyn.blocks_eyewear = true;
        let comtac = ItemTemplate::new("comtac", "ComTac", "class.headset");
        let mut gp5 = ItemTemplate::new("gp5", "GP-5", "class.face_cover");
        gp5.conflicting_items.push(TemplateId::from("glasses"));
        let glasses = ItemTemplate::new("glasses", "Glasses", "class.eyewear");
        [altyn, comtac, gp5, glasses].into_iter().collect()
    }

    #[test]
    fn empty_equipment_accepts_anything() {
        let c = catalog();
        let verdict = ConflictRules.check(
            &graph(),
            EquipmentSlot::Headwear,
            c.lookup(&TemplateId::from("altyn")).unwrap(),
            &c,
        );
        assert!(verdict.is_compatible());
    }

    #[test]
    fn worn_helmet_blocks_earpiece() {
        let c = catalog();
        let mut g = graph();
        equip(&mut g, "altyn", EquipmentSlot::Headwear);
        let comtac = c.lookup(&TemplateId::from("comtac")).unwrap();
        assert!(!ConflictRules.check(&g, EquipmentSlot::Earpiece, comtac, &c).is_compatible());
    }

    #[test]
    fn helmet_rejected_when_blocked_slot_occupied() {
        let c = catalog();
        let mut g = graph();
        equip(&mut g, "glasses", EquipmentSlot::Eyewear);
        let altyn = c.lookup(&TemplateId::from("altyn")).unwrap();
        assert!(!ConflictRules.check(&g, EquipmentSlot::Headwear, altyn, &c).is_compatible());
    }

    #[test]
    fn conflict_lists_apply_both_ways() {
        let c = catalog();
        let mut g = graph();
        equip(&mut g, "gp5", EquipmentSlot::FaceCover);
        let glasses = c.lookup(&TemplateId::from("glasses")).unwrap();
        assert!(!ConflictRules.check(&g, EquipmentSlot::Eyewear, glasses, &c).is_compatible());

        let mut g = graph();
        equip(&mut g, "glasses", EquipmentSlot::Eyewear);
        let gp5 = c.lookup(&TemplateId::from("gp5")).unwrap();
        assert!(!ConflictRules.check(&g, EquipmentSlot::FaceCover, gp5, &c).is_compatible());
    }
}
