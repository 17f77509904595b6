//! Loose loot for backpacks, rigs, pockets and the secure container.
//!
//! A fill pass draws from a working copy of the category pool, applies
//! spawn limits, materializes each item with its quantity rules and drops
//! it into the first target container with room. Passes are bounded three
//! ways: the requested count, consecutive placement failures, and an
//! optional catalog value budget.

use armory_types::{EquipmentSlot, InventoryGraph, Money, TemplateId};
use rand::RngCore;

use crate::context::GenerationContext;
use crate::error::{GenerationError, GenerationEvent};
use crate::item_builder::build_loot_item;
use crate::limits::{LimitCheck, SpawnLimitCounter};
use crate::placement::{equipped_containers, place_tree};
use crate::weighted::WeightedPool;

/// One fill pass.
#[derive(Debug, Clone)]
pub struct FillRequest {
    /// Candidates and their weights.
    pub pool: WeightedPool,
    /// Containers to fill, in preference order.
    pub targets: Vec<EquipmentSlot>,
    /// Number of counted draws.
    pub total_count: u32,
    /// Whether spawn limits apply.
    pub use_limits: bool,
    /// Stop once placed value exceeds this. Zero means unlimited.
    pub value_budget: Money,
    /// Whether the agent belongs to the special class.
    pub is_special_class: bool,
}

impl FillRequest {
    /// A pass over `pool` into `targets` with no limits and no budget.
    pub const fn new(pool: WeightedPool, targets: Vec<EquipmentSlot>, total_count: u32) -> Self {
        Self {
            pool,
            targets,
            total_count,
            use_limits: false,
            value_budget: Money::ZERO,
            is_special_class: false,
        }
    }

    /// Apply spawn limits.
    #[must_use]
    pub const fn with_limits(mut self) -> Self {
        self.use_limits = true;
        self
    }

    /// Cap the pass at `budget` of catalog value.
    #[must_use]
    pub const fn with_budget(mut self, budget: Money) -> Self {
        self.value_budget = budget;
        self
    }

    /// Mark the agent as special class.
    #[must_use]
    pub const fn special_class(mut self, is_special_class: bool) -> Self {
        self.is_special_class = is_special_class;
        self
    }
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStop {
    /// Every counted draw was used.
    CountReached,
    /// The working pool ran dry.
    PoolExhausted,
    /// Too many consecutive placement failures.
    NoRoom,
    /// The value budget was exceeded.
    BudgetExceeded,
    /// No target container is equipped.
    NoContainers,
}

/// What a pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Templates placed, in order.
    pub placed: Vec<TemplateId>,
    /// Sum of catalog prices of placed items.
    pub value: Money,
    /// Draws rejected by spawn limits.
    pub limit_rejections: u32,
    /// Why the pass stopped.
    pub stop: FillStop,
}

impl FillReport {
    const fn empty(stop: FillStop) -> Self {
        Self {
            placed: Vec::new(),
            value: Money::ZERO,
            limit_rejections: 0,
            stop,
        }
    }
}

/// Fills containers with loose loot.
#[derive(Debug, Clone, Copy)]
pub struct ContainerFiller<'a> {
    ctx: GenerationContext<'a>,
    role: &'a str,
}

impl<'a> ContainerFiller<'a> {
    /// Filler for agents of `role`.
    pub const fn new(ctx: GenerationContext<'a>, role: &'a str) -> Self {
        Self { ctx, role }
    }

    /// Run one pass.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Graph`] if a built item tree cannot be
    /// attached to the inventory.
    pub fn fill(
        &self,
        request: FillRequest,
        inventory: &mut InventoryGraph,
        limits: &mut SpawnLimitCounter,
        rng: &mut dyn RngCore,
    ) -> Result<FillReport, GenerationError> {
        let containers = equipped_containers(inventory, &request.targets);
        if containers.is_empty() {
            return Ok(FillReport::empty(FillStop::NoContainers));
        }
        let max_failures = self.ctx.config.retry.max_placement_failures.max(1);
        let has_budget = request.value_budget > Money::ZERO;
        let mut working = request.pool;
        let mut report = FillReport::empty(FillStop::CountReached);
        let mut counted: u32 = 0;
        let mut failures: u32 = 0;

        while counted < request.total_count {
            let Some(tpl) = working.draw(rng).cloned() else {
                GenerationEvent::PoolExhausted {
                    context: format!("fill {:?}", request.targets),
                }
                .log(self.role);
                report.stop = FillStop::PoolExhausted;
                break;
            };
            let Some(template) = self.ctx.catalog.lookup(&tpl) else {
                GenerationEvent::MissingTemplate { tpl: tpl.clone() }.log(self.role);
                working.remove(&tpl);
                continue;
            };
            if request.use_limits {
                match limits.check(&tpl, self.ctx.catalog) {
                    LimitCheck::Allowed => {}
                    LimitCheck::OverCeiling => {
                        report.limit_rejections = report.limit_rejections.saturating_add(1);
                        continue;
                    }
                    LimitCheck::Saturated => {
                        tracing::debug!(role = self.role, tpl = %tpl, "spawn limit saturated");
                        working.remove(&tpl);
                        continue;
                    }
                }
            }

            let items = build_loot_item(&self.ctx, template, request.is_special_class, rng);
            if place_tree(inventory, items, &containers, self.ctx.catalog)?.is_none() {
                GenerationEvent::PlacementFailure { tpl: tpl.clone() }.log(self.role);
                failures = failures.saturating_add(1);
                if failures >= max_failures {
                    tracing::debug!(role = self.role, failures, "container pass abandoned");
                    report.stop = FillStop::NoRoom;
                    break;
                }
                continue;
            }
            failures = 0;
            counted = counted.saturating_add(1);

            let price = self.ctx.catalog.price_of(&tpl).unwrap_or(Money::ZERO);
            report.value = report.value.saturating_add(price);
            report.placed.push(tpl);
            if has_budget && report.value > request.value_budget {
                GenerationEvent::BudgetExceeded {
                    context: format!("{} over {}", report.value, request.value_budget),
                }
                .log(self.role);
                report.stop = FillStop::BudgetExceeded;
                break;
            }
        }

        tracing::debug!(
            role = self.role,
            count = report.placed.len(),
            value = %report.value,
            "container pass finished"
        );
        Ok(report)
    }
}
