//! Error and event types for the `armory-gen` crate.
//!
//! Generation distinguishes two kinds of trouble:
//!
//! - [`GenerationEvent`]: non-fatal conditions (a template missing from
//!   the catalog, a pool running dry, a container with no room). These
//!   are logged through `tracing` and generation carries on with a
//!   smaller result.
//! - [`GenerationError`]: fatal conditions that make an agent impossible
//!   to build. These are returned to the caller.

use armory_types::{EquipmentSlot, GraphError, TemplateId};

/// Errors that abort generation of an agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// A mandatory table of the role template is empty or inconsistent.
    #[error("invalid role config for {role}: {reason}")]
    InvalidRoleConfig {
        /// Role name.
        role: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An inventory graph operation violated a structural invariant.
    #[error("inventory graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Non-fatal conditions encountered during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// A pool referenced a template the catalog does not know.
    MissingTemplate {
        /// The unknown template.
        tpl: TemplateId,
    },
    /// An equipment slot has no configured spawn chance.
    SlotConfigMissing {
        /// The slot.
        slot: EquipmentSlot,
    },
    /// Every candidate of a pool was rejected.
    PoolExhausted {
        /// What the pool was for.
        context: String,
    },
    /// No target container had room for an item.
    PlacementFailure {
        /// The item that did not fit.
        tpl: TemplateId,
    },
    /// The loot value budget was used up.
    BudgetExceeded {
        /// What the budget was for.
        context: String,
    },
}

impl GenerationEvent {
    /// Emit the event through `tracing` at its conventional level.
    pub fn log(&self, role: &str) {
        match self {
            Self::MissingTemplate { tpl } => {
                tracing::warn!(role, tpl = %tpl, "template missing from catalog");
            }
            Self::SlotConfigMissing { slot } => {
                tracing::warn!(role, slot = %slot, "no spawn chance configured for slot");
            }
            Self::PoolExhausted { context } => {
                tracing::debug!(role, context = context.as_str(), "pool exhausted");
            }
            Self::PlacementFailure { tpl } => {
                tracing::debug!(role, tpl = %tpl, "no container has room for item");
            }
            Self::BudgetExceeded { context } => {
                tracing::debug!(role, context = context.as_str(), "loot value budget exceeded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use armory_types::ItemId;

    use super::*;

    #[test]
    fn graph_errors_convert() {
        let id = ItemId::new();
        let err = GenerationError::from(GraphError::ItemNotFound(id));
        assert!(matches!(err, GenerationError::Graph(GraphError::ItemNotFound(x)) if x == id));
    }

    #[test]
    fn invalid_config_message_names_role() {
        let err = GenerationError::InvalidRoleConfig {
            role: String::from("assault"),
            reason: String::from("no equipment chances"),
        };
        assert!(err.to_string().contains("assault"));
    }
}
