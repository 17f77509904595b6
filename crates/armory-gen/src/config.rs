//! Configuration loading and typed config structures for the generator.
//!
//! The deployment configuration lives in `armory-config.yaml`. This module
//! defines strongly-typed structs mirroring the YAML structure and a
//! loader for it. Every field has a default, so an empty document yields
//! [`GeneratorConfig::default`].

use std::collections::BTreeMap;
use std::path::Path;

use armory_types::{ContainerKind, MinMax, Money, Side, TemplateId, WeightMap};
use serde::Deserialize;

use crate::catalog::base_class;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level generator configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratorConfig {
    /// Retry and abandonment tuning.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Equipment rules.
    #[serde(default)]
    pub equipment: EquipmentConfig,

    /// Per-template spawn ceilings.
    #[serde(default)]
    pub limits: SpawnLimitConfig,

    /// Loose loot quantities and budgets.
    #[serde(default)]
    pub loot: LootConfig,

    /// Weapon and ammunition rules.
    #[serde(default)]
    pub weapons: WeaponConfig,

    /// Level and experience tables.
    #[serde(default)]
    pub attributes: AttributeConfig,

    /// Roles treated as the special (PMC) class.
    #[serde(default = "default_pmc_roles")]
    pub pmc_roles: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            equipment: EquipmentConfig::default(),
            limits: SpawnLimitConfig::default(),
            loot: LootConfig::default(),
            weapons: WeaponConfig::default(),
            attributes: AttributeConfig::default(),
            pmc_roles: default_pmc_roles(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Whether `role` belongs to the special (PMC) class.
    pub fn is_special_class(&self, role: &str) -> bool {
        self.pmc_roles.iter().any(|r| r == role)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Bounds on every retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Slot selection gives up after this percentage of the pool size in
    /// rejected draws.
    #[serde(default = "default_slot_retry_fraction_pct")]
    pub slot_retry_fraction_pct: u32,

    /// Consecutive placement failures that abandon a container pass.
    #[serde(default = "default_max_placement_failures")]
    pub max_placement_failures: u32,

    /// A spawn-limit counter never exceeds its ceiling times this factor.
    #[serde(default = "default_spawn_limit_overflow_factor")]
    pub spawn_limit_overflow_factor: u32,

    /// Rejected draws the loot composer tolerates per phase.
    #[serde(default = "default_composer_rejection_budget")]
    pub composer_rejection_budget: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            slot_retry_fraction_pct: default_slot_retry_fraction_pct(),
            max_placement_failures: default_max_placement_failures(),
            spawn_limit_overflow_factor: default_spawn_limit_overflow_factor(),
            composer_rejection_budget: default_composer_rejection_budget(),
        }
    }
}

/// Equipment selection rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EquipmentConfig {
    /// With body armor worn, only unarmored rigs may be chosen.
    #[serde(default = "default_true")]
    pub no_double_armor: bool,

    /// Without body armor, only armored rigs may be chosen.
    #[serde(default = "default_true")]
    pub force_armored_rig_when_bare: bool,

    /// Spawned durability of armor, in percent of maximum.
    #[serde(default = "default_armor_durability_pct")]
    pub armor_durability_pct: MinMax,

    /// Spawned durability of weapons, in percent of maximum.
    #[serde(default = "default_weapon_durability_pct")]
    pub weapon_durability_pct: MinMax,

    /// Dog tag template per side, issued to special-class agents.
    #[serde(default = "default_dog_tags")]
    pub dog_tags: BTreeMap<Side, TemplateId>,
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            no_double_armor: true,
            force_armored_rig_when_bare: true,
            armor_durability_pct: default_armor_durability_pct(),
            weapon_durability_pct: default_weapon_durability_pct(),
            dog_tags: default_dog_tags(),
        }
    }
}

/// Spawn ceilings keyed by template id or base-class id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnLimitConfig {
    /// Ceilings for ordinary roles.
    #[serde(default = "default_spawn_limits")]
    pub default: BTreeMap<TemplateId, u32>,

    /// Ceilings for special-class roles.
    #[serde(default = "default_special_spawn_limits")]
    pub special_class: BTreeMap<TemplateId, u32>,

    /// Per-role overrides; a present entry replaces the class table.
    #[serde(default)]
    pub per_role: BTreeMap<String, BTreeMap<TemplateId, u32>>,
}

impl Default for SpawnLimitConfig {
    fn default() -> Self {
        Self {
            default: default_spawn_limits(),
            special_class: default_special_spawn_limits(),
            per_role: BTreeMap::new(),
        }
    }
}

impl SpawnLimitConfig {
    /// The ceiling table that applies to `role`.
    pub fn table_for(&self, role: &str, is_special_class: bool) -> &BTreeMap<TemplateId, u32> {
        if let Some(table) = self.per_role.get(role) {
            return table;
        }
        if is_special_class {
            &self.special_class
        } else {
            &self.default
        }
    }
}

/// Wallet contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletConfig {
    /// Template that receives currency when spawned as loot.
    #[serde(default = "default_wallet_template")]
    pub template: TemplateId,

    /// Chance in percent that a spawned wallet holds money.
    #[serde(default = "default_wallet_chance_pct")]
    pub chance_pct: u32,

    /// Number of currency stacks inside a filled wallet.
    #[serde(default = "default_wallet_stacks")]
    pub stacks: MinMax,

    /// Currencies a wallet may hold.
    #[serde(default = "default_wallet_currencies")]
    pub currencies: WeightMap,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            template: default_wallet_template(),
            chance_pct: default_wallet_chance_pct(),
            stacks: default_wallet_stacks(),
            currencies: default_wallet_currencies(),
        }
    }
}

/// Currency stack-size weights, by agent class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CurrencyStackConfig {
    /// Ordinary roles: currency template to `stack size -> weight`.
    #[serde(default)]
    pub default: BTreeMap<TemplateId, BTreeMap<u32, u32>>,

    /// Special-class roles.
    #[serde(default)]
    pub special_class: BTreeMap<TemplateId, BTreeMap<u32, u32>>,
}

impl CurrencyStackConfig {
    /// Stack-size weights for a currency, if configured for the class.
    pub fn weights_for(&self, tpl: &TemplateId, is_special_class: bool) -> Option<&BTreeMap<u32, u32>> {
        let table = if is_special_class {
            &self.special_class
        } else {
            &self.default
        };
        table.get(tpl).filter(|weights| !weights.is_empty())
    }
}

/// Loose loot configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LootConfig {
    /// Upper bound on randomized cartridge stacks.
    #[serde(default = "default_ammo_stack_cap")]
    pub ammo_stack_cap: u32,

    /// Currency stack sizes.
    #[serde(default)]
    pub currency_stacks: CurrencyStackConfig,

    /// Wallet contents.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Catalog value budget per container for loose loot. Missing or zero
    /// means unlimited.
    #[serde(default = "default_value_budgets")]
    pub value_budgets: BTreeMap<ContainerKind, Money>,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            ammo_stack_cap: default_ammo_stack_cap(),
            currency_stacks: CurrencyStackConfig::default(),
            wallet: WalletConfig::default(),
            value_budgets: default_value_budgets(),
        }
    }
}

impl LootConfig {
    /// Budget for a container, zero when unlimited.
    pub fn budget_for(&self, kind: ContainerKind) -> Money {
        self.value_budgets.get(&kind).copied().unwrap_or(Money::ZERO)
    }
}

/// Weapon and ammunition rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeaponConfig {
    /// Extra cartridge stacks stored in the secure container.
    #[serde(default = "default_secure_ammo_stacks")]
    pub secure_ammo_stacks: u32,

    /// Loose cartridge stacks given for a weapon that takes no magazine.
    #[serde(default = "default_loose_ammo_stacks")]
    pub loose_ammo_stacks: u32,

    /// Chance in percent for a weapon mod slot with no role chance.
    #[serde(default = "default_mod_chance_pct")]
    pub default_mod_chance_pct: u32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            secure_ammo_stacks: default_secure_ammo_stacks(),
            loose_ammo_stacks: default_loose_ammo_stacks(),
            default_mod_chance_pct: default_mod_chance_pct(),
        }
    }
}

/// Level and experience tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeConfig {
    /// Experience needed to advance from level `i + 1` to `i + 2`.
    #[serde(default = "default_experience_table")]
    pub experience_table: Vec<u64>,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            experience_table: default_experience_table(),
        }
    }
}

impl AttributeConfig {
    /// Highest level the table describes.
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.experience_table.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

fn default_pmc_roles() -> Vec<String> {
    vec!["pmc_usec".to_owned(), "pmc_bear".to_owned()]
}

const fn default_slot_retry_fraction_pct() -> u32 {
    75
}

const fn default_max_placement_failures() -> u32 {
    4
}

const fn default_spawn_limit_overflow_factor() -> u32 {
    10
}

const fn default_composer_rejection_budget() -> u32 {
    50
}

const fn default_armor_durability_pct() -> MinMax {
    MinMax::new(70, 100)
}

const fn default_weapon_durability_pct() -> MinMax {
    MinMax::new(80, 100)
}

fn default_dog_tags() -> BTreeMap<Side, TemplateId> {
    let mut m = BTreeMap::new();
    m.insert(Side::Usec, TemplateId::from("dogtag_usec"));
    m.insert(Side::Bear, TemplateId::from("dogtag_bear"));
    m
}

fn default_spawn_limits() -> BTreeMap<TemplateId, u32> {
    let mut m = BTreeMap::new();
    m.insert(TemplateId::from(base_class::STIMULANT), 1);
    m.insert(TemplateId::from(base_class::GRENADE), 2);
    m.insert(TemplateId::from(base_class::MONEY_HOLDER), 1);
    m
}

fn default_special_spawn_limits() -> BTreeMap<TemplateId, u32> {
    let mut m = BTreeMap::new();
    m.insert(TemplateId::from(base_class::STIMULANT), 2);
    m.insert(TemplateId::from(base_class::GRENADE), 3);
    m.insert(TemplateId::from(base_class::MONEY_HOLDER), 1);
    m
}

fn default_wallet_template() -> TemplateId {
    TemplateId::from("wallet")
}

const fn default_wallet_chance_pct() -> u32 {
    25
}

const fn default_wallet_stacks() -> MinMax {
    MinMax::new(1, 3)
}

fn default_wallet_currencies() -> WeightMap {
    let mut m = BTreeMap::new();
    m.insert(TemplateId::from("roubles"), 1);
    m
}

const fn default_ammo_stack_cap() -> u32 {
    100
}

fn default_value_budgets() -> BTreeMap<ContainerKind, Money> {
    let mut m = BTreeMap::new();
    m.insert(ContainerKind::Backpack, Money::new(150_000, 0));
    m.insert(ContainerKind::TacticalVest, Money::new(60_000, 0));
    m.insert(ContainerKind::Pockets, Money::new(40_000, 0));
    m
}

const fn default_secure_ammo_stacks() -> u32 {
    4
}

const fn default_loose_ammo_stacks() -> u32 {
    3
}

const fn default_mod_chance_pct() -> u32 {
    50
}

/// Quadratic curve: level `n` needs `1000 * n * n` experience.
fn default_experience_table() -> Vec<u64> {
    (1..=70_u64)
        .map(|n| n.saturating_mul(n).saturating_mul(1_000))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert_eq!(config.retry.slot_retry_fraction_pct, 75);
        assert_eq!(config.retry.max_placement_failures, 4);
        assert_eq!(config.retry.spawn_limit_overflow_factor, 10);
        assert_eq!(config.loot.ammo_stack_cap, 100);
        assert_eq!(config.loot.wallet.chance_pct, 25);
        assert!(config.equipment.armor_durability_pct.is_valid());
        assert_eq!(config.attributes.max_level(), 71);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "retry:\n  max_placement_failures: 7\n";
        let config = GeneratorConfig::parse(yaml).unwrap();
        assert_eq!(config.retry.max_placement_failures, 7);
        // Everything else uses defaults
        assert_eq!(config.retry.slot_retry_fraction_pct, 75);
        assert!(config.equipment.no_double_armor);
        assert!(config.is_special_class("pmc_bear"));
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GeneratorConfig::parse("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn parse_limits_and_budgets() {
        let yaml = r"
limits:
  per_role:
    boss_killa:
      class.grenade: 6
loot:
  value_budgets:
    Backpack: 5000
  currency_stacks:
    special_class:
      roubles:
        500: 3
        1000: 1
";
        let config = GeneratorConfig::parse(yaml).unwrap();
        let killa = config.limits.table_for("boss_killa", false);
        assert_eq!(killa.get("class.grenade"), Some(&6));
        assert_eq!(killa.len(), 1);
        assert_eq!(config.loot.budget_for(ContainerKind::Backpack), Money::new(5_000, 0));
        assert_eq!(config.loot.budget_for(ContainerKind::Pockets), Money::ZERO);
        let roubles = TemplateId::from("roubles");
        assert!(config.loot.currency_stacks.weights_for(&roubles, true).is_some());
        assert!(config.loot.currency_stacks.weights_for(&roubles, false).is_none());
    }

    #[test]
    fn limit_table_falls_back_by_class() {
        let limits = SpawnLimitConfig::default();
        let stim = TemplateId::from(base_class::STIMULANT);
        assert_eq!(limits.table_for("assault", false).get(&stim), Some(&1));
        assert_eq!(limits.table_for("pmc_usec", true).get(&stim), Some(&2));
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let err = GeneratorConfig::parse("retry: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("armory-config.yaml");
        if path.exists() {
            let config = GeneratorConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
