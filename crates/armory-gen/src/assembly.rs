//! Weapon construction and attachment filling.
//!
//! Both are external seams: the full game plugs in a weapon generator that
//! knows about mod compatibility and presets. [`BasicWeaponBuilder`] and
//! [`SlotModFiller`] are the stand-alone implementations, which fill slots
//! from their catalog filters by chance.

use std::collections::BTreeMap;

use armory_types::{
    EquipmentSlot, InventoryItem, ItemId, ItemSlot, ItemTemplate, RoleTemplate, TemplateId,
};
use rand::RngCore;

use crate::catalog::is_magazine;
use crate::context::GenerationContext;
use crate::item_builder::{loaded_magazine, randomize_durability};
use crate::weighted::{WeightedPool, roll_chance};

/// Name of the magazine socket on weapons.
pub const MAGAZINE_SLOT: &str = "mod_magazine";

/// Attachment nesting deeper than this is not filled.
const MAX_MOD_DEPTH: u32 = 5;

// ---------------------------------------------------------------------------
// Mod filling
// ---------------------------------------------------------------------------

/// Fills the attachment slots of a freshly created item.
pub trait ModFiller: Send + Sync {
    /// Children (parents before descendants) for the slots of the item
    /// `root`, whose template is `template`. `chances` maps slot names to
    /// spawn percentages; required slots always fill.
    fn fill(
        &self,
        ctx: &GenerationContext<'_>,
        root: ItemId,
        template: &ItemTemplate,
        chances: &BTreeMap<String, u32>,
        rng: &mut dyn RngCore,
    ) -> Vec<InventoryItem>;
}

/// Fills slots from their filters, preferring the slot default.
#[derive(Debug, Clone, Default)]
pub struct SlotModFiller {
    /// Slots never filled by this filler.
    pub skip_slots: Vec<String>,
    /// Chance for optional slots without a configured chance.
    pub default_chance_pct: u32,
}

impl SlotModFiller {
    /// Filler with the given fallback chance.
    pub const fn new(default_chance_pct: u32) -> Self {
        Self {
            skip_slots: Vec::new(),
            default_chance_pct,
        }
    }

    /// Filler that leaves the named slots alone.
    #[must_use]
    pub fn skipping(mut self, slot: &str) -> Self {
        self.skip_slots.push(String::from(slot));
        self
    }

    fn pick(
        ctx: &GenerationContext<'_>,
        slot: &ItemSlot,
        rng: &mut dyn RngCore,
    ) -> Option<TemplateId> {
        if let Some(default) = slot
            .default_item
            .as_ref()
            .filter(|tpl| ctx.catalog.lookup(tpl).is_some())
        {
            return Some(default.clone());
        }
        let candidates: WeightedPool = slot
            .filter
            .iter()
            .filter(|tpl| ctx.catalog.lookup(tpl).is_some())
            .map(|tpl| (tpl.clone(), 1))
            .collect();
        candidates.draw(rng).cloned()
    }

    fn fill_level(
        &self,
        ctx: &GenerationContext<'_>,
        parent: ItemId,
        template: &ItemTemplate,
        chances: &BTreeMap<String, u32>,
        depth: u32,
        rng: &mut dyn RngCore,
        out: &mut Vec<InventoryItem>,
    ) {
        if depth >= MAX_MOD_DEPTH {
            return;
        }
        for slot in &template.slots {
            if self.skip_slots.iter().any(|skip| *skip == slot.name) {
                continue;
            }
            let chance = if slot.required {
                100
            } else {
                chances
                    .get(&slot.name)
                    .copied()
                    .unwrap_or(self.default_chance_pct)
            };
            if !roll_chance(rng, chance) {
                continue;
            }
            let Some(tpl) = Self::pick(ctx, slot, rng) else {
                continue;
            };
            let Some(child_template) = ctx.catalog.lookup(&tpl) else {
                continue;
            };
            let child = InventoryItem::child_of(ctx.ids.item_id(), tpl, parent, &slot.name);
            let child_id = child.id;
            out.push(child);
            self.fill_level(
                ctx,
                child_id,
                child_template,
                chances,
                depth.saturating_add(1),
                rng,
                out,
            );
        }
    }
}

impl ModFiller for SlotModFiller {
    fn fill(
        &self,
        ctx: &GenerationContext<'_>,
        root: ItemId,
        template: &ItemTemplate,
        chances: &BTreeMap<String, u32>,
        rng: &mut dyn RngCore,
    ) -> Vec<InventoryItem> {
        let mut out = Vec::new();
        self.fill_level(ctx, root, template, chances, 0, rng, &mut out);
        out
    }
}

// ---------------------------------------------------------------------------
// Weapon building
// ---------------------------------------------------------------------------

/// What to build.
#[derive(Debug, Clone, Copy)]
pub struct WeaponRequest<'a> {
    /// Weapon template drawn for the slot.
    pub weapon_tpl: &'a TemplateId,
    /// Equipment slot the weapon goes into.
    pub slot: EquipmentSlot,
    /// Parent of the weapon root (the equipment root).
    pub parent: ItemId,
    /// Role being generated, for ammo pools and mod chances.
    pub role: &'a RoleTemplate,
}

/// A weapon tree plus what the magazine assembler needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWeapon {
    /// Weapon root first, attachments after.
    pub items: Vec<InventoryItem>,
    /// Weapon template.
    pub weapon_tpl: TemplateId,
    /// Cartridge chosen for the weapon, if its caliber has an ammo pool.
    pub ammo_tpl: Option<TemplateId>,
    /// Magazine template fitted, if any.
    pub magazine_tpl: Option<TemplateId>,
}

/// Builds a complete weapon for an equipment slot.
pub trait WeaponBuilder: Send + Sync {
    /// Build the weapon, or `None` if it cannot be built.
    fn build(
        &self,
        ctx: &GenerationContext<'_>,
        request: &WeaponRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<GeneratedWeapon>;
}

/// Weapon root, loaded magazine, and chance-rolled attachments.
#[derive(Debug, Clone)]
pub struct BasicWeaponBuilder {
    mods: SlotModFiller,
}

impl Default for BasicWeaponBuilder {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BasicWeaponBuilder {
    /// Builder filling optional attachments at `default_mod_chance_pct`
    /// when the role has no chance for a slot.
    pub fn new(default_mod_chance_pct: u32) -> Self {
        Self {
            mods: SlotModFiller::new(default_mod_chance_pct).skipping(MAGAZINE_SLOT),
        }
    }

    fn pick_ammo(
        request: &WeaponRequest<'_>,
        weapon: &ItemTemplate,
        rng: &mut dyn RngCore,
    ) -> Option<TemplateId> {
        let caliber = weapon.ammo_caliber.as_ref()?;
        let pool = request
            .role
            .inventory
            .ammo
            .get(caliber)
            .map(WeightedPool::from_weights)?;
        pool.draw(rng).cloned()
    }

    fn pick_magazine<'c>(
        ctx: &GenerationContext<'c>,
        weapon: &ItemTemplate,
        rng: &mut dyn RngCore,
    ) -> Option<&'c ItemTemplate> {
        let slot = weapon.slot(MAGAZINE_SLOT)?;
        let candidates: WeightedPool = slot
            .filter
            .iter()
            .filter(|tpl| ctx.catalog.lookup(tpl).is_some_and(is_magazine))
            .map(|tpl| (tpl.clone(), 1))
            .collect();
        let preferred = slot
            .default_item
            .as_ref()
            .filter(|tpl| candidates.contains(tpl));
        let chosen = preferred.or_else(|| candidates.draw(rng))?;
        ctx.catalog.lookup(chosen)
    }
}

impl WeaponBuilder for BasicWeaponBuilder {
    fn build(
        &self,
        ctx: &GenerationContext<'_>,
        request: &WeaponRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<GeneratedWeapon> {
        let weapon = ctx.catalog.lookup(request.weapon_tpl)?;
        let mut root = InventoryItem::child_of(
            ctx.ids.item_id(),
            weapon.id.clone(),
            request.parent,
            request.slot.as_str(),
        );
        randomize_durability(
            &mut root,
            weapon,
            ctx.config.equipment.weapon_durability_pct,
            rng,
        );

        let ammo_tpl = Self::pick_ammo(request, weapon, rng);
        let magazine = Self::pick_magazine(ctx, weapon, rng);

        let root_id = root.id;
        let mut items = vec![root];
        if let Some(mag_tpl) = magazine {
            let mut mag_items = loaded_magazine(ctx, mag_tpl, ammo_tpl.as_ref());
            if let Some(mag_root) = mag_items.first_mut() {
                mag_root.parent_id = Some(root_id);
                mag_root.slot_id = Some(String::from(MAGAZINE_SLOT));
                mag_root.props.spawned_in_session = false;
            }
            items.extend(mag_items);
        }
        items.extend(self.mods.fill(ctx, root_id, weapon, &request.role.chances.weapon_mods, rng));

        Some(GeneratedWeapon {
            items,
            weapon_tpl: weapon.id.clone(),
            ammo_tpl,
            magazine_tpl: magazine.map(|m| m.id.clone()),
        })
    }
}
