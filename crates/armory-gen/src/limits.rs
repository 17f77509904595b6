//! Per-agent spawn ceilings.
//!
//! A [`SpawnLimitCounter`] lives for a single agent-generation call. Each
//! check of a limited template bumps its counter; the counter for a key
//! never exceeds `ceiling * overflow_factor`, because the check that would
//! cross that line reports [`LimitCheck::Saturated`] instead and the caller
//! drops the template from its working pool.

use std::collections::BTreeMap;

use armory_types::TemplateId;

use crate::catalog::{ItemCatalog, MAX_CLASS_DEPTH};
use crate::config::GeneratorConfig;

/// Result of a spawn-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheck {
    /// The template is unlimited or still under its ceiling.
    Allowed,
    /// The ceiling has been reached; reject this draw and keep going.
    OverCeiling,
    /// The counter would pass its hard bound; remove the template.
    Saturated,
}

/// Running spawn counts keyed by template id or base-class id.
#[derive(Debug, Clone, Default)]
pub struct SpawnLimitCounter {
    ceilings: BTreeMap<TemplateId, u32>,
    counts: BTreeMap<TemplateId, u32>,
    overflow_factor: u32,
}

impl SpawnLimitCounter {
    /// Create a counter over explicit ceilings.
    pub const fn new(ceilings: BTreeMap<TemplateId, u32>, overflow_factor: u32) -> Self {
        Self {
            ceilings,
            counts: BTreeMap::new(),
            overflow_factor,
        }
    }

    /// Counter with the ceilings configured for `role`.
    pub fn for_role(config: &GeneratorConfig, role: &str, is_special_class: bool) -> Self {
        Self::new(
            config.limits.table_for(role, is_special_class).clone(),
            config.retry.spawn_limit_overflow_factor,
        )
    }

    /// Counter that never limits anything.
    pub const fn unlimited() -> Self {
        Self::new(BTreeMap::new(), 1)
    }

    /// The key `tpl` is counted under: the template itself when it has a
    /// ceiling, otherwise the nearest limited ancestor class.
    pub fn limit_key(&self, tpl: &TemplateId, catalog: &dyn ItemCatalog) -> Option<TemplateId> {
        if self.ceilings.is_empty() {
            return None;
        }
        let mut current = Some(tpl.clone());
        for _ in 0..MAX_CLASS_DEPTH {
            let id = current?;
            if self.ceilings.contains_key(&id) {
                return Some(id);
            }
            current = catalog.base_class_of(&id).cloned();
        }
        None
    }

    /// Count one more candidate of `tpl` and report whether it may spawn.
    pub fn check(&mut self, tpl: &TemplateId, catalog: &dyn ItemCatalog) -> LimitCheck {
        let Some(key) = self.limit_key(tpl, catalog) else {
            return LimitCheck::Allowed;
        };
        let ceiling = self.ceilings.get(&key).copied().unwrap_or(u32::MAX);
        let hard_bound = ceiling.saturating_mul(self.overflow_factor);
        let count = self.counts.entry(key).or_insert(0);
        let next = count.saturating_add(1);
        if next > hard_bound {
            return LimitCheck::Saturated;
        }
        *count = next;
        if next > ceiling {
            LimitCheck::OverCeiling
        } else {
            LimitCheck::Allowed
        }
    }

    /// Current count for a limit key.
    pub fn count(&self, key: &TemplateId) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Ceiling for a limit key, if limited.
    pub fn ceiling(&self, key: &TemplateId) -> Option<u32> {
        self.ceilings.get(key).copied()
    }

    /// Largest value the counter for a key may reach.
    pub fn hard_bound(&self, key: &TemplateId) -> Option<u32> {
        self.ceiling(key)
            .map(|ceiling| ceiling.saturating_mul(self.overflow_factor))
    }
}
