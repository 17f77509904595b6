//! Generated agent records handed to the raid orchestrator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{BodyPart, Difficulty, Side};
use crate::ids::{AgentId, TemplateId};
use crate::inventory::InventoryGraph;

/// Identity and progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Display name.
    pub nickname: String,
    /// Role the agent was generated from.
    pub role: String,
    /// Faction.
    pub side: Side,
    /// Character level.
    pub level: u32,
    /// Total experience matching the level.
    pub experience: u64,
    /// AI difficulty.
    pub difficulty: Difficulty,
}

/// A bounded vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthValue {
    /// Current value.
    pub current: u32,
    /// Maximum value.
    pub maximum: u32,
}

/// Vitals at spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHealth {
    /// Hit points per body part.
    pub body_parts: BTreeMap<BodyPart, HealthValue>,
    /// Hydration.
    pub hydration: HealthValue,
    /// Energy.
    pub energy: HealthValue,
}

/// Visual customization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Head model.
    pub head: Option<TemplateId>,
    /// Upper body model.
    pub body: Option<TemplateId>,
    /// Lower body model.
    pub feet: Option<TemplateId>,
    /// Hand model.
    pub hands: Option<TemplateId>,
    /// Voice.
    pub voice: Option<TemplateId>,
}

/// A fully generated non-player agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAgent {
    /// Unique id.
    pub id: AgentId,
    /// Identity and progression.
    pub info: AgentInfo,
    /// Vitals.
    pub health: AgentHealth,
    /// Skill name to level.
    pub skills: BTreeMap<String, u32>,
    /// Visual customization.
    pub appearance: Appearance,
    /// Worn and carried items.
    pub inventory: InventoryGraph,
    /// When generation finished.
    pub generated_at: DateTime<Utc>,
}
