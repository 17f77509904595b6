//! Raid-scoped generation state.
//!
//! A [`GenerationSession`] owns everything that outlives a single agent:
//! the per-role loot pool cache and the memo of role validation results.
//! Both are cleared by [`GenerationSession::end_raid`]. The session is
//! shared by reference, so several threads can generate agents against it
//! at once.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use armory_types::RoleTemplate;

use crate::error::GenerationError;
use crate::pool_cache::{LootCache, PmcLootSource};

/// Check that the mandatory tables of `role` are usable.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidRoleConfig`] when the role has no
/// equipment chances, no non-empty equipment pool, or an inverted level
/// range.
pub fn validate_role(role: &RoleTemplate) -> Result<(), GenerationError> {
    let invalid = |reason: &str| GenerationError::InvalidRoleConfig {
        role: role.role.clone(),
        reason: String::from(reason),
    };
    if role.chances.equipment.is_empty() {
        return Err(invalid("no equipment spawn chances"));
    }
    if role.inventory.equipment.values().all(|pool| pool.is_empty()) {
        return Err(invalid("no equipment pools"));
    }
    if !role.level.is_valid() {
        return Err(invalid("level range minimum exceeds maximum"));
    }
    Ok(())
}

/// Loot cache plus validation memo for one raid.
#[derive(Debug, Default)]
pub struct GenerationSession {
    cache: LootCache,
    validated: Mutex<BTreeMap<String, Result<(), GenerationError>>>,
}

impl GenerationSession {
    /// A session whose roles use their own container pools.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session substituting special-class container pools.
    pub fn with_pmc_source(pmc: Box<dyn PmcLootSource>) -> Self {
        Self {
            cache: LootCache::with_pmc_source(pmc),
            validated: Mutex::new(BTreeMap::new()),
        }
    }

    /// The loot pool cache.
    pub const fn cache(&self) -> &LootCache {
        &self.cache
    }

    /// Validate `role`, once per session. A failing role is logged at
    /// error level the first time only; later calls return the remembered
    /// error silently.
    ///
    /// # Errors
    ///
    /// Returns the [`GenerationError::InvalidRoleConfig`] from
    /// [`validate_role`].
    pub fn check_role(&self, role: &RoleTemplate) -> Result<(), GenerationError> {
        let mut memo = self.validated.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = memo.get(&role.role) {
            return result.clone();
        }
        let result = validate_role(role);
        if let Err(err) = &result {
            tracing::error!(role = role.role.as_str(), error = %err, "role configuration rejected");
        }
        memo.insert(role.role.clone(), result.clone());
        result
    }

    /// Number of roles validated this session.
    pub fn validated_roles(&self) -> usize {
        self.validated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget every cached pool and validation result.
    pub fn end_raid(&self) {
        self.cache.clear();
        self.validated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("raid ended, generation caches cleared");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{EquipmentSlot, MinMax, Side, TemplateId};

    use super::*;

    fn valid_role() -> RoleTemplate {
        let mut role = RoleTemplate::new("assault", Side::Savage, MinMax::new(1, 10));
        role.chances.equipment.insert(EquipmentSlot::Headwear, 50);
        let mut pool = armory_types::WeightMap::new();
        pool.insert(TemplateId::from("ssh68"), 1);
        role.inventory.equipment.insert(EquipmentSlot::Headwear, pool);
        role
    }

    #[test]
    fn validation_rules() {
        assert!(validate_role(&valid_role()).is_ok());

        let mut no_chances = valid_role();
        no_chances.chances.equipment.clear();
        assert!(matches!(
            validate_role(&no_chances),
            Err(GenerationError::InvalidRoleConfig { .. })
        ));

        let mut empty_pools = valid_role();
        empty_pools
            .inventory
            .equipment
            .insert(EquipmentSlot::Headwear, armory_types::WeightMap::new());
        assert!(validate_role(&empty_pools).is_err());

        let mut inverted = valid_role();
        inverted.level = MinMax::new(20, 5);
        assert!(validate_role(&inverted).is_err());
    }

    #[test]
    fn results_are_memoized_until_raid_end() {
        let session = GenerationSession::new();
        let mut bad = valid_role();
        bad.role = String::from("broken");
        bad.chances.equipment.clear();

        assert!(session.check_role(&bad).is_err());
        assert!(session.check_role(&bad).is_err());
        assert!(session.check_role(&valid_role()).is_ok());
        assert_eq!(session.validated_roles(), 2);

        session.end_raid();
        assert_eq!(session.validated_roles(), 0);
        assert!(session.cache().is_empty());
    }
}
