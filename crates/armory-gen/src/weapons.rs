//! Weapon slots, spare magazines and ammunition.
//!
//! The primary weapon is rolled first. A secondary long gun is only
//! considered when a primary was placed, and an agent that ends up without
//! a primary always gets a sidearm if its holster pool has one. Each placed
//! weapon then receives spare loaded magazines (or loose cartridges when it
//! takes no magazine) and, optionally, cartridge stacks in the secure
//! container.

use armory_types::{EquipmentSlot, InventoryGraph, ItemId, RoleTemplate, TemplateId};
use rand::RngCore;

use crate::assembly::{GeneratedWeapon, WeaponBuilder, WeaponRequest};
use crate::context::GenerationContext;
use crate::equipment::{retry_ceiling, slot_pool};
use crate::error::{GenerationError, GenerationEvent};
use crate::item_builder::{ammo_stack, loaded_magazine};
use crate::placement::{equipped_containers, place_tree};
use crate::weighted::{draw_count, roll_chance};

/// Containers that hold spare magazines, in preference order.
const MAGAZINE_CONTAINERS: [EquipmentSlot; 2] = [EquipmentSlot::TacticalVest, EquipmentSlot::Pockets];

/// Containers that hold loose cartridges, in preference order.
const AMMO_CONTAINERS: [EquipmentSlot; 3] = [
    EquipmentSlot::TacticalVest,
    EquipmentSlot::Pockets,
    EquipmentSlot::Backpack,
];

/// What the weapon pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponReport {
    /// Slots that received a weapon.
    pub placed: Vec<EquipmentSlot>,
    /// Spare magazines stored.
    pub spare_magazines: u32,
    /// Loose cartridge stacks stored outside the secure container.
    pub loose_ammo_stacks: u32,
    /// Cartridge stacks stored in the secure container.
    pub secure_ammo_stacks: u32,
}

impl WeaponReport {
    /// Whether `slot` received a weapon.
    pub fn has(&self, slot: EquipmentSlot) -> bool {
        self.placed.contains(&slot)
    }
}

/// Places weapons and their ammunition.
pub struct WeaponAssembler<'a> {
    ctx: GenerationContext<'a>,
    builder: &'a dyn WeaponBuilder,
}

impl core::fmt::Debug for WeaponAssembler<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeaponAssembler").finish_non_exhaustive()
    }
}

impl<'a> WeaponAssembler<'a> {
    /// Create an assembler.
    pub const fn new(ctx: GenerationContext<'a>, builder: &'a dyn WeaponBuilder) -> Self {
        Self { ctx, builder }
    }

    /// Roll and place every weapon slot of `role`.
    pub fn assign_weapons(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        rng: &mut dyn RngCore,
    ) -> Result<WeaponReport, GenerationError> {
        let mut report = WeaponReport::default();

        let primary_chance = self.chance(role, EquipmentSlot::FirstPrimaryWeapon);
        if roll_chance(rng, primary_chance) {
            self.spawn(inventory, role, EquipmentSlot::FirstPrimaryWeapon, rng, &mut report)?;
        }
        let has_primary = report.has(EquipmentSlot::FirstPrimaryWeapon);

        if has_primary {
            let chance = self.chance(role, EquipmentSlot::SecondPrimaryWeapon);
            if roll_chance(rng, chance) {
                self.spawn(inventory, role, EquipmentSlot::SecondPrimaryWeapon, rng, &mut report)?;
            }
        }

        let holster_chance = if has_primary {
            self.chance(role, EquipmentSlot::Holster)
        } else {
            100
        };
        if roll_chance(rng, holster_chance) {
            self.spawn(inventory, role, EquipmentSlot::Holster, rng, &mut report)?;
        }

        tracing::debug!(
            role = role.role.as_str(),
            weapons = report.placed.len(),
            magazines = report.spare_magazines,
            "weapons assigned"
        );
        Ok(report)
    }

    fn chance(&self, role: &RoleTemplate, slot: EquipmentSlot) -> u32 {
        role.chances.equipment.get(&slot).copied().unwrap_or_else(|| {
            GenerationEvent::SlotConfigMissing { slot }.log(&role.role);
            0
        })
    }

    /// Draw, build and place a weapon for `slot`, then give it ammunition.
    fn spawn(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        slot: EquipmentSlot,
        rng: &mut dyn RngCore,
        report: &mut WeaponReport,
    ) -> Result<(), GenerationError> {
        let pool = slot_pool(role, slot);
        if pool.is_empty() {
            return Ok(());
        }
        let ceiling = retry_ceiling(pool.len(), self.ctx.config.retry.slot_retry_fraction_pct);
        let mut working = pool;
        let mut attempts: usize = 0;

        let weapon = loop {
            let Some(tpl) = working.draw(rng).cloned() else {
                break None;
            };
            let request = WeaponRequest {
                weapon_tpl: &tpl,
                slot,
                parent: inventory.equipment_id(),
                role,
            };
            if let Some(weapon) = self.builder.build(&self.ctx, &request, rng) {
                break Some(weapon);
            }
            if self.ctx.catalog.lookup(&tpl).is_none() {
                GenerationEvent::MissingTemplate { tpl: tpl.clone() }.log(&role.role);
            }
            working.remove(&tpl);
            attempts = attempts.saturating_add(1);
            if attempts > ceiling {
                break None;
            }
        };

        let Some(weapon) = weapon else {
            GenerationEvent::PoolExhausted {
                context: format!("weapon slot {slot}"),
            }
            .log(&role.role);
            return Ok(());
        };

        let GeneratedWeapon {
            items,
            weapon_tpl,
            ammo_tpl,
            magazine_tpl,
        } = weapon;
        inventory.add_tree(items)?;
        report.placed.push(slot);
        tracing::debug!(role = role.role.as_str(), slot = %slot, tpl = %weapon_tpl, "weapon placed");

        match (magazine_tpl.as_ref(), ammo_tpl.as_ref()) {
            (Some(mag), _) => {
                report.spare_magazines = report
                    .spare_magazines
                    .saturating_add(self.spare_magazines(inventory, role, mag, ammo_tpl.as_ref(), rng)?);
            }
            (None, Some(ammo)) => {
                let stacks = self.ctx.config.weapons.loose_ammo_stacks;
                let containers = equipped_containers(inventory, &AMMO_CONTAINERS);
                report.loose_ammo_stacks = report
                    .loose_ammo_stacks
                    .saturating_add(self.store_ammo(inventory, role, ammo, stacks, &containers, rng)?);
            }
            (None, None) => {}
        }

        if let Some(ammo) = ammo_tpl.as_ref() {
            let stacks = self.ctx.config.weapons.secure_ammo_stacks;
            let containers = equipped_containers(inventory, &[EquipmentSlot::SecuredContainer]);
            report.secure_ammo_stacks = report
                .secure_ammo_stacks
                .saturating_add(self.store_ammo(inventory, role, ammo, stacks, &containers, rng)?);
        }
        Ok(())
    }

    /// Store loaded spare magazines in the vest, then pockets. Stops at the
    /// first magazine that does not fit.
    fn spare_magazines(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        mag_tpl: &TemplateId,
        ammo_tpl: Option<&TemplateId>,
        rng: &mut dyn RngCore,
    ) -> Result<u32, GenerationError> {
        let Some(magazine) = self.ctx.catalog.lookup(mag_tpl) else {
            GenerationEvent::MissingTemplate {
                tpl: mag_tpl.clone(),
            }
            .log(&role.role);
            return Ok(0);
        };
        let count = draw_count(&role.generation.magazines.weights, rng);
        let targets = equipped_containers(inventory, &MAGAZINE_CONTAINERS);
        let mut stored: u32 = 0;
        for _ in 0..count {
            let items = loaded_magazine(&self.ctx, magazine, ammo_tpl);
            if place_tree(inventory, items, &targets, self.ctx.catalog)?.is_none() {
                GenerationEvent::PlacementFailure {
                    tpl: mag_tpl.clone(),
                }
                .log(&role.role);
                break;
            }
            stored = stored.saturating_add(1);
        }
        Ok(stored)
    }

    fn store_ammo(
        &self,
        inventory: &mut InventoryGraph,
        role: &RoleTemplate,
        ammo_tpl: &TemplateId,
        stacks: u32,
        targets: &[ItemId],
        rng: &mut dyn RngCore,
    ) -> Result<u32, GenerationError> {
        if targets.is_empty() {
            return Ok(0);
        }
        let mut stored: u32 = 0;
        for _ in 0..stacks {
            let items = ammo_stack(&self.ctx, ammo_tpl, rng);
            if place_tree(inventory, items, targets, self.ctx.catalog)?.is_none() {
                GenerationEvent::PlacementFailure {
                    tpl: ammo_tpl.clone(),
                }
                .log(&role.role);
                break;
            }
            stored = stored.saturating_add(1);
        }
        Ok(stored)
    }
}
