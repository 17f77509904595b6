//! Flat loot lists and item presets.

use serde::{Deserialize, Serialize};

use crate::ids::TemplateId;
use crate::inventory::InventoryItem;

/// One entry of a reward or crate loot list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    /// Catalog template (the root template for presets).
    pub tpl: TemplateId,
    /// Whether this entry stands for a pre-built assembly.
    pub is_preset: bool,
    /// Number of units.
    pub stack_count: u32,
}

impl LootItem {
    /// A single loose item.
    pub const fn single(tpl: TemplateId) -> Self {
        Self {
            tpl,
            is_preset: false,
            stack_count: 1,
        }
    }

    /// A stack of loose items.
    pub const fn stack(tpl: TemplateId, count: u32) -> Self {
        Self {
            tpl,
            is_preset: false,
            stack_count: count,
        }
    }

    /// A pre-built assembly.
    pub const fn preset(tpl: TemplateId) -> Self {
        Self {
            tpl,
            is_preset: true,
            stack_count: 1,
        }
    }
}

/// A pre-built item assembly (weapon with mods, armor with plates).
///
/// `items` holds the root first; children reference their parent by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Preset name.
    pub name: String,
    /// Template of the root item.
    pub root_tpl: TemplateId,
    /// Whether this is the catalog's default build of the root template.
    pub is_default: bool,
    /// Root item followed by its attachments.
    pub items: Vec<InventoryItem>,
}

impl Preset {
    /// The root item, if present.
    pub fn root(&self) -> Option<&InventoryItem> {
        self.items.first()
    }
}
