//! Catalog item templates.
//!
//! An [`ItemTemplate`] is the immutable definition of an item type. The
//! generator never creates templates; it reads them from an external
//! catalog. Base classes are templates too: every template names its
//! `parent`, forming a class hierarchy that predicates walk upwards.

use serde::{Deserialize, Serialize};

use crate::ids::TemplateId;

/// A mod or attachment point on an item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSlot {
    /// Slot name, e.g. `mod_magazine` or `soft_armor_front`.
    pub name: String,
    /// Whether the item is incomplete without something in this slot.
    #[serde(default)]
    pub required: bool,
    /// Templates allowed in this slot.
    #[serde(default)]
    pub filter: Vec<TemplateId>,
    /// Template the item ships with in this slot, if any.
    #[serde(default)]
    pub default_item: Option<TemplateId>,
}

/// A rectangular storage grid inside a container item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridProps {
    /// Grid name, used as the slot id of items stored in it.
    pub name: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

/// A cartridge slot inside an ammo box or magazine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSlot {
    /// Slot name, usually `cartridges`.
    pub name: String,
    /// Maximum number of rounds the slot holds.
    pub max_count: u32,
    /// Ammunition templates allowed in the slot.
    #[serde(default)]
    pub filter: Vec<TemplateId>,
}

/// Immutable catalog definition of an item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Catalog key.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Parent class in the template hierarchy. `None` only for the root.
    #[serde(default)]
    pub parent: Option<TemplateId>,
    /// Footprint width in grid cells.
    #[serde(default = "one")]
    pub width: u32,
    /// Footprint height in grid cells.
    #[serde(default = "one")]
    pub height: u32,
    /// Largest stack a single item node may hold.
    #[serde(default = "one")]
    pub stack_max_size: u32,
    /// Lower bound for randomized stack sizes.
    #[serde(default = "one")]
    pub stack_min_random: u32,
    /// Upper bound for randomized stack sizes.
    #[serde(default = "one")]
    pub stack_max_random: u32,
    /// Attachment points.
    #[serde(default)]
    pub slots: Vec<ItemSlot>,
    /// Named storage grids (containers only).
    #[serde(default)]
    pub grids: Vec<GridProps>,
    /// Cartridge slots (ammo boxes).
    #[serde(default)]
    pub stack_slots: Vec<StackSlot>,
    /// Cartridge slot of a magazine.
    #[serde(default)]
    pub cartridges: Option<StackSlot>,
    /// Caliber of ammunition, or the caliber a weapon chambers.
    #[serde(default)]
    pub ammo_caliber: Option<String>,
    /// Present on magazines.
    #[serde(default)]
    pub reload_magazine: bool,
    /// Seconds to apply; present on medical items.
    #[serde(default)]
    pub med_use_time: Option<u32>,
    /// Present on throwables.
    #[serde(default)]
    pub throw_type: Option<String>,
    /// Protection level for armor and armor plates.
    #[serde(default)]
    pub armor_class: Option<u8>,
    /// Maximum durability for degradable gear.
    #[serde(default)]
    pub max_durability: Option<u32>,
    /// Quest-only items never appear in generic loot.
    #[serde(default)]
    pub quest_item: bool,
    /// Templates that may not be worn together with this one.
    #[serde(default)]
    pub conflicting_items: Vec<TemplateId>,
    /// Occupies the earpiece position when worn.
    #[serde(default)]
    pub blocks_earpiece: bool,
    /// Occupies the headwear position when worn.
    #[serde(default)]
    pub blocks_headwear: bool,
    /// Occupies the face cover position when worn.
    #[serde(default)]
    pub blocks_face_cover: bool,
    /// Occupies the eyewear position when worn.
    #[serde(default)]
    pub blocks_eyewear: bool,
}

const fn one() -> u32 {
    1
}

impl ItemTemplate {
    /// Create a bare template of the given class with every optional
    /// property unset and a 1x1 footprint.
    pub fn new(id: impl Into<TemplateId>, name: &str, parent: impl Into<TemplateId>) -> Self {
        Self {
            id: id.into(),
            name: String::from(name),
            parent: Some(parent.into()),
            width: 1,
            height: 1,
            stack_max_size: 1,
            stack_min_random: 1,
            stack_max_random: 1,
            slots: Vec::new(),
            grids: Vec::new(),
            stack_slots: Vec::new(),
            cartridges: None,
            ammo_caliber: None,
            reload_magazine: false,
            med_use_time: None,
            throw_type: None,
            armor_class: None,
            max_durability: None,
            quest_item: false,
            conflicting_items: Vec::new(),
            blocks_earpiece: false,
            blocks_headwear: false,
            blocks_face_cover: false,
            blocks_eyewear: false,
        }
    }

    /// Whether the template exposes any attachment slot.
    pub fn has_slots(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Whether more than one unit can share a node.
    pub const fn is_stackable(&self) -> bool {
        self.stack_max_size > 1
    }

    /// Find a slot by name.
    pub fn slot(&self, name: &str) -> Option<&ItemSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_template_has_unit_footprint() {
        let tpl = ItemTemplate::new("salewa", "Salewa", "meds");
        assert_eq!((tpl.width, tpl.height), (1, 1));
        assert!(!tpl.is_stackable());
        assert!(!tpl.has_slots());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let json = r#"{"id":"ps","name":"5.45 PS","parent":"ammo","stack_max_size":60}"#;
        let tpl: Result<ItemTemplate, _> = serde_json::from_str(json);
        let tpl = tpl.ok();
        assert_eq!(tpl.as_ref().map(|t| t.stack_max_size), Some(60));
        assert_eq!(tpl.as_ref().map(|t| t.width), Some(1));
        assert_eq!(tpl.as_ref().map(ItemTemplate::is_stackable), Some(true));
    }

    #[test]
    fn slot_lookup_by_name() {
        let mut tpl = ItemTemplate::new("ak74", "AK-74", "weapon");
        tpl.slots.push(ItemSlot {
            name: String::from("mod_magazine"),
            required: false,
            filter: vec![TemplateId::from("mag_30")],
            default_item: None,
        });
        assert!(tpl.slot("mod_magazine").is_some());
        assert!(tpl.slot("mod_scope").is_none());
    }
}
