//! Non-inventory agent attributes: progression, vitals, skills, looks.
//!
//! Every value is drawn uniformly within the role's range. Inverted ranges
//! are tolerated by swapping their bounds; levels are clamped to what the
//! experience table describes.

use std::collections::BTreeMap;

use armory_types::{
    AgentHealth, AgentInfo, Appearance, Difficulty, HealthValue, MinMax, RoleTemplate, TemplateId,
    WeightMap,
};
use rand::{Rng, RngCore};

use crate::config::AttributeConfig;
use crate::weighted::{WeightedPool, random_between};

/// Attributes of one agent, before its inventory is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Identity and progression.
    pub info: AgentInfo,
    /// Vitals.
    pub health: AgentHealth,
    /// Skill levels.
    pub skills: BTreeMap<String, u32>,
    /// Visual customization.
    pub appearance: Appearance,
}

/// Draw every attribute for an agent of `role`.
pub fn generate_attributes(
    role: &RoleTemplate,
    difficulty: Difficulty,
    config: &AttributeConfig,
    rng: &mut dyn RngCore,
) -> Attributes {
    let (level, experience) = generate_level(role.level, config, rng);
    let info = AgentInfo {
        nickname: pick_nickname(role, rng),
        role: role.role.clone(),
        side: role.side,
        level,
        experience,
        difficulty,
    };
    Attributes {
        info,
        health: generate_health(role, rng),
        skills: generate_skills(&role.skills, rng),
        appearance: generate_appearance(role, rng),
    }
}

/// Level within `range` and a matching experience total.
///
/// Experience is the sum of the table up to the level plus a random part
/// of the step to the next level, so it always maps back to `level`.
pub fn generate_level(range: MinMax, config: &AttributeConfig, rng: &mut dyn RngCore) -> (u32, u64) {
    let max_level = config.max_level();
    let lo = range.min.clamp(1, max_level);
    let hi = range.max.clamp(1, max_level);
    let level = random_between(rng, lo, hi);

    let completed = usize::try_from(level.saturating_sub(1)).unwrap_or(usize::MAX);
    let base = config
        .experience_table
        .iter()
        .take(completed)
        .fold(0_u64, |acc, step| acc.saturating_add(*step));
    let partial = config
        .experience_table
        .get(completed)
        .filter(|&&next| next > 0)
        .map_or(0, |&next| rng.random_range(0..next));
    (level, base.saturating_add(partial))
}

/// Full body-part health and starting hydration and energy.
pub fn generate_health(role: &RoleTemplate, rng: &mut dyn RngCore) -> AgentHealth {
    let body_parts = role
        .health
        .body_parts
        .iter()
        .map(|(&part, range)| {
            let maximum = random_between(rng, range.min, range.max);
            (part, HealthValue { current: maximum, maximum })
        })
        .collect();
    AgentHealth {
        body_parts,
        hydration: vital(role.health.hydration, rng),
        energy: vital(role.health.energy, rng),
    }
}

fn vital(range: MinMax, rng: &mut dyn RngCore) -> HealthValue {
    let maximum = range.max.max(range.min);
    HealthValue {
        current: random_between(rng, range.min, range.max),
        maximum,
    }
}

/// Skill levels, one per configured skill.
pub fn generate_skills(ranges: &BTreeMap<String, MinMax>, rng: &mut dyn RngCore) -> BTreeMap<String, u32> {
    ranges
        .iter()
        .map(|(name, range)| (name.clone(), random_between(rng, range.min, range.max)))
        .collect()
}

/// Weighted appearance pick per body model.
pub fn generate_appearance(role: &RoleTemplate, rng: &mut dyn RngCore) -> Appearance {
    let looks = &role.appearance;
    Appearance {
        head: pick(&looks.head, rng),
        body: pick(&looks.body, rng),
        feet: pick(&looks.feet, rng),
        hands: pick(&looks.hands, rng),
        voice: pick(&looks.voice, rng),
    }
}

fn pick(weights: &WeightMap, rng: &mut dyn RngCore) -> Option<TemplateId> {
    WeightedPool::from_weights(weights).draw(rng).cloned()
}

/// A name from the role's pool, or the role name when the pool is empty.
pub fn pick_nickname(role: &RoleTemplate, rng: &mut dyn RngCore) -> String {
    if role.names.is_empty() {
        return role.role.clone();
    }
    let index = rng.random_range(0..role.names.len());
    role.names
        .get(index)
        .cloned()
        .unwrap_or_else(|| role.role.clone())
}
