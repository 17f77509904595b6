//! Identifier generation for inventory items and agents.
//!
//! Production code mints UUID v7 ids; tests that compare generated graphs
//! across runs use [`SequentialIds`] for stable output.

use core::sync::atomic::{AtomicU64, Ordering};

use armory_types::{AgentId, ItemId};
use uuid::Uuid;

/// Source of globally unique ids.
pub trait IdGenerator: Send + Sync {
    /// Mint a new item id.
    fn item_id(&self) -> ItemId;

    /// Mint a new agent id.
    fn agent_id(&self) -> AgentId;
}

/// Time-ordered random ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn item_id(&self) -> ItemId {
        ItemId::new()
    }

    fn agent_id(&self) -> AgentId {
        AgentId::new()
    }
}

/// Deterministic ids counting up from a starting value.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting at `start`.
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    fn bump(&self) -> Uuid {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(value))
    }
}

impl IdGenerator for SequentialIds {
    fn item_id(&self) -> ItemId {
        ItemId(self.bump())
    }

    fn agent_id(&self) -> AgentId {
        AgentId(self.bump())
    }
}
