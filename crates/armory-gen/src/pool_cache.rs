//! Per-role derived loot pools.
//!
//! The first request for a `(role, is_special_class)` pair derives all
//! twelve [`LootCategory`] pools from the role's raw container pools in one
//! pass and stores them. Later requests clone the stored pool, so callers
//! can mutate what they get without affecting anyone else.
//!
//! The cache is raid-scoped: [`LootCache::clear`] drops everything and the
//! next request rebuilds.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use armory_types::{ContainerKind, ItemTemplate, LootCategory, Money, RoleTemplate, WeightMap};

use crate::catalog::{ItemCatalog, base_class, is_ammo_like, is_grenade, is_magazine, is_medical};
use crate::weighted::WeightedPool;

// ---------------------------------------------------------------------------
// Price filter
// ---------------------------------------------------------------------------

/// Inclusive price window. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceRange {
    /// Cheapest allowed price.
    pub min: Option<Money>,
    /// Most expensive allowed price.
    pub max: Option<Money>,
}

impl PriceRange {
    /// Window bounded on both sides.
    pub const fn between(min: Money, max: Money) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether a price falls inside the window.
    pub fn contains(&self, price: Money) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

// ---------------------------------------------------------------------------
// PMC loot substitution
// ---------------------------------------------------------------------------

/// Supplies the container pools of special-class agents, which are built
/// from a separate loot table instead of the role template.
pub trait PmcLootSource: Send + Sync {
    /// Replacement raw pool for one container, or `None` to keep the
    /// role's own pool.
    fn container_pool(&self, role: &RoleTemplate, kind: ContainerKind) -> Option<WeightMap>;
}

/// Keeps every role's own pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPmcLoot;

impl PmcLootSource for NoPmcLoot {
    fn container_pool(&self, _role: &RoleTemplate, _kind: ContainerKind) -> Option<WeightMap> {
        None
    }
}

/// Fixed replacement pools shared by every special-class role.
#[derive(Debug, Clone, Default)]
pub struct StaticPmcLoot {
    pools: BTreeMap<ContainerKind, WeightMap>,
}

impl StaticPmcLoot {
    /// Create from per-container pools.
    pub const fn new(pools: BTreeMap<ContainerKind, WeightMap>) -> Self {
        Self { pools }
    }
}

impl PmcLootSource for StaticPmcLoot {
    fn container_pool(&self, _role: &RoleTemplate, kind: ContainerKind) -> Option<WeightMap> {
        self.pools.get(&kind).cloned()
    }
}

// ---------------------------------------------------------------------------
// Category derivation
// ---------------------------------------------------------------------------

/// Containers whose raw pools PMC loot may replace.
const SUBSTITUTED_CONTAINERS: [ContainerKind; 3] = [
    ContainerKind::Backpack,
    ContainerKind::Pockets,
    ContainerKind::TacticalVest,
];

fn raw_pool(
    role: &RoleTemplate,
    kind: ContainerKind,
    is_special_class: bool,
    pmc: &dyn PmcLootSource,
) -> WeightedPool {
    if is_special_class && SUBSTITUTED_CONTAINERS.contains(&kind) {
        if let Some(pool) = pmc.container_pool(role, kind) {
            return WeightedPool::from_weights(&pool);
        }
    }
    role.inventory
        .items
        .get(&kind)
        .map(WeightedPool::from_weights)
        .unwrap_or_default()
}

/// Whether a template is excluded from generic container loot because a
/// dedicated category handles it.
fn has_dedicated_category(catalog: &dyn ItemCatalog, template: &ItemTemplate) -> bool {
    is_ammo_like(catalog, template)
        || is_magazine(template)
        || is_medical(template)
        || is_grenade(template)
        || catalog.is_of_any_base_class(
            &template.id,
            &[base_class::FOOD, base_class::DRINK, base_class::MONEY],
        )
}

fn classify(
    catalog: &dyn ItemCatalog,
    pool: &WeightedPool,
    mut keep: impl FnMut(&ItemTemplate) -> bool,
) -> WeightedPool {
    pool.filtered(|tpl| catalog.lookup(tpl).is_some_and(&mut keep))
}

/// Derive every loot category of a role from its raw pools.
///
/// Deterministic: the same role and catalog always produce the same pools.
pub fn derive_pools(
    role: &RoleTemplate,
    is_special_class: bool,
    catalog: &dyn ItemCatalog,
    pmc: &dyn PmcLootSource,
) -> BTreeMap<LootCategory, WeightedPool> {
    let backpack = raw_pool(role, ContainerKind::Backpack, is_special_class, pmc);
    let pockets = raw_pool(role, ContainerKind::Pockets, is_special_class, pmc);
    let vest = raw_pool(role, ContainerKind::TacticalVest, is_special_class, pmc);
    let special = raw_pool(role, ContainerKind::SpecialLoot, is_special_class, pmc);
    let secure = raw_pool(role, ContainerKind::SecuredContainer, is_special_class, pmc);

    let mut combined = WeightedPool::new();
    for pool in [&backpack, &pockets, &vest, &special] {
        combined.merge_max(pool);
    }

    let generic = |pool: &WeightedPool| {
        pool.filtered(|tpl| {
            catalog
                .lookup(tpl)
                .is_none_or(|template| !has_dedicated_category(catalog, template))
        })
    };

    let mut pools = BTreeMap::new();
    for category in LootCategory::ALL {
        let pool = match category {
            LootCategory::Special => special.clone(),
            LootCategory::Backpack => generic(&backpack),
            LootCategory::Pocket => generic(&pockets),
            LootCategory::Vest => generic(&vest),
            LootCategory::Secure => secure.clone(),
            LootCategory::Healing => classify(catalog, &combined, |t| {
                is_medical(t)
                    && !catalog.is_of_any_base_class(
                        &t.id,
                        &[base_class::STIMULANT, base_class::DRUGS],
                    )
            }),
            LootCategory::Drugs => classify(catalog, &combined, |t| {
                is_medical(t) && catalog.is_of_base_class(&t.id, base_class::DRUGS)
            }),
            LootCategory::Food => classify(catalog, &combined, |t| {
                catalog.is_of_base_class(&t.id, base_class::FOOD)
            }),
            LootCategory::Drink => classify(catalog, &combined, |t| {
                catalog.is_of_base_class(&t.id, base_class::DRINK)
            }),
            LootCategory::Currency => classify(catalog, &combined, |t| {
                catalog.is_of_base_class(&t.id, base_class::MONEY)
            }),
            LootCategory::Stimulant => classify(catalog, &combined, |t| {
                catalog.is_of_base_class(&t.id, base_class::STIMULANT)
            }),
            LootCategory::Grenade => classify(catalog, &combined, is_grenade),
        };
        let pool = match role.count_weights(category) {
            Some(table) if !table.whitelist.is_empty() => {
                WeightedPool::from_weights(&table.whitelist)
            }
            _ => pool,
        };
        pools.insert(category, pool);
    }
    pools
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

type CacheKey = (String, bool);

/// Raid-scoped cache of derived loot pools.
pub struct LootCache {
    pools: RwLock<BTreeMap<CacheKey, BTreeMap<LootCategory, WeightedPool>>>,
    builds: AtomicU64,
    pmc: Box<dyn PmcLootSource>,
}

impl core::fmt::Debug for LootCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LootCache")
            .field("builds", &self.builds())
            .finish_non_exhaustive()
    }
}

impl Default for LootCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LootCache {
    /// Empty cache using the roles' own container pools.
    pub fn new() -> Self {
        Self::with_pmc_source(Box::new(NoPmcLoot))
    }

    /// Empty cache substituting special-class container pools.
    pub fn with_pmc_source(pmc: Box<dyn PmcLootSource>) -> Self {
        Self {
            pools: RwLock::new(BTreeMap::new()),
            builds: AtomicU64::new(0),
            pmc,
        }
    }

    /// A copy of the pool for `category`, building the role's pools on
    /// first touch. With a price filter, templates priced outside it and
    /// unpriced templates are dropped from the copy.
    pub fn get(
        &self,
        role: &RoleTemplate,
        is_special_class: bool,
        category: LootCategory,
        catalog: &dyn ItemCatalog,
        price_range: Option<PriceRange>,
    ) -> WeightedPool {
        let key: CacheKey = (role.role.clone(), is_special_class);
        let pool = self
            .cached(&key, category)
            .unwrap_or_else(|| self.build_if_absent(key, role, catalog, category));

        match price_range {
            Some(range) => pool.filtered(|tpl| {
                catalog
                    .price_of(tpl)
                    .is_some_and(|price| range.contains(price))
            }),
            None => pool,
        }
    }

    fn cached(&self, key: &CacheKey, category: LootCategory) -> Option<WeightedPool> {
        let guard = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(key)
            .map(|pools| pools.get(&category).cloned().unwrap_or_default())
    }

    fn build_if_absent(
        &self,
        key: CacheKey,
        role: &RoleTemplate,
        catalog: &dyn ItemCatalog,
        category: LootCategory,
    ) -> WeightedPool {
        let is_special_class = key.1;
        let mut guard = self.pools.write().unwrap_or_else(PoisonError::into_inner);
        let pools = guard.entry(key).or_insert_with(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            let derived = derive_pools(role, is_special_class, catalog, self.pmc.as_ref());
            if derived.values().all(WeightedPool::is_empty) {
                tracing::warn!(role = role.role.as_str(), "role has no loot pools");
            } else {
                tracing::debug!(role = role.role.as_str(), is_special_class, "built loot pools");
            }
            derived
        });
        pools.get(&category).cloned().unwrap_or_default()
    }

    /// Number of role pool sets built since creation.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of role pool sets currently held.
    pub fn len(&self) -> usize {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached pool. The next request rebuilds.
    pub fn clear(&self) {
        self.pools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use armory_types::{CountWeights, MinMax, Side, TemplateId};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn tpl(id: &str, class: &str) -> ItemTemplate {
        ItemTemplate::new(id, id, class)
    }

    fn catalog() -> InMemoryCatalog {
        let mut c = InMemoryCatalog::new();
        let mut bandage = tpl("bandage", base_class::MEDS);
        bandage.med_use_time = Some(2);
        let mut propital = tpl("propital", base_class::STIMULANT);
        propital.med_use_time = Some(3);
        let mut analgin = tpl("analgin", base_class::DRUGS);
        analgin.med_use_time = Some(2);
        let mut f1 = tpl("f1", base_class::GRENADE);
        f1.throw_type = Some(String::from("frag_grenade"));
        let mut ps = tpl("ps545", base_class::AMMO);
        ps.ammo_caliber = Some(String::from("5.45x39"));
        let mut mag = tpl("mag_545", base_class::MAGAZINE);
        mag.reload_magazine = true;
        c.insert_priced(bandage, dec!(1500));
        c.insert_priced(propital, dec!(45000));
        c.insert(analgin);
        c.insert(f1);
        c.insert(ps);
        c.insert(mag);
        c.insert_priced(tpl("tushonka", base_class::FOOD), dec!(9000));
        c.insert(tpl("water", base_class::DRINK));
        c.insert(tpl("roubles", base_class::MONEY));
        c.insert_priced(tpl("bolts", "class.barter"), dec!(12000));
        c.insert(tpl("sicc", base_class::SECURE_CONTAINER));
        c.insert(tpl("keycard", "class.key"));
        c
    }

    fn weights(ids: &[&str]) -> WeightMap {
        ids.iter().map(|id| (TemplateId::from(*id), 1)).collect()
    }

    fn role() -> RoleTemplate {
        let mut role = RoleTemplate::new("assault", Side::Savage, MinMax::new(1, 10));
        role.inventory.items.insert(
            ContainerKind::Backpack,
            weights(&["bandage", "propital", "analgin", "f1", "ps545", "mag_545", "bolts"]),
        );
        role.inventory
            .items
            .insert(ContainerKind::Pockets, weights(&["tushonka", "water", "roubles", "ghost"]));
        role.inventory
            .items
            .insert(ContainerKind::SecuredContainer, weights(&["sicc", "ps545"]));
        role.inventory
            .items
            .insert(ContainerKind::SpecialLoot, weights(&["keycard"]));
        role
    }

    fn names(pool: &WeightedPool) -> Vec<&str> {
        pool.templates().map(TemplateId::as_str).collect()
    }

    #[test]
    fn categories_partition_by_predicate() {
        let c = catalog();
        let pools = derive_pools(&role(), false, &c, &NoPmcLoot);
        let get = |cat| names(pools.get(&cat).unwrap());
        assert_eq!(get(LootCategory::Healing), vec!["bandage"]);
        assert_eq!(get(LootCategory::Drugs), vec!["analgin"]);
        assert_eq!(get(LootCategory::Stimulant), vec!["propital"]);
        assert_eq!(get(LootCategory::Grenade), vec!["f1"]);
        assert_eq!(get(LootCategory::Food), vec!["tushonka"]);
        assert_eq!(get(LootCategory::Drink), vec!["water"]);
        assert_eq!(get(LootCategory::Currency), vec!["roubles"]);
        assert_eq!(get(LootCategory::Backpack), vec!["bolts"]);
        // Unknown templates stay; the filler drops them with a warning.
        assert_eq!(get(LootCategory::Pocket), vec!["ghost"]);
        assert_eq!(get(LootCategory::Secure), vec!["ps545", "sicc"]);
        assert_eq!(get(LootCategory::Special), vec!["keycard"]);
        assert!(get(LootCategory::Vest).is_empty());
    }

    #[test]
    fn derivation_is_deterministic() {
        let c = catalog();
        let first = derive_pools(&role(), false, &c, &NoPmcLoot);
        let second = derive_pools(&role(), false, &c, &NoPmcLoot);
        assert_eq!(first, second);
    }

    #[test]
    fn whitelist_replaces_derived_pool() {
        let c = catalog();
        let mut role = role();
        role.generation.items.insert(
            LootCategory::Healing,
            CountWeights {
                weights: BTreeMap::new(),
                whitelist: weights(&["propital"]),
            },
        );
        let pools = derive_pools(&role, false, &c, &NoPmcLoot);
        assert_eq!(names(pools.get(&LootCategory::Healing).unwrap()), vec!["propital"]);
    }

    #[test]
    fn pmc_source_replaces_container_pools() {
        let c = catalog();
        let mut replacement = BTreeMap::new();
        replacement.insert(ContainerKind::Backpack, weights(&["tushonka"]));
        let pmc = StaticPmcLoot::new(replacement);
        let special = derive_pools(&role(), true, &c, &pmc);
        let regular = derive_pools(&role(), false, &c, &pmc);
        assert!(special.get(&LootCategory::Backpack).unwrap().is_empty());
        assert_eq!(names(special.get(&LootCategory::Food).unwrap()), vec!["tushonka"]);
        assert_eq!(names(regular.get(&LootCategory::Backpack).unwrap()), vec!["bolts"]);
    }

    #[test]
    fn cache_returns_independent_copies() {
        let c = catalog();
        let cache = LootCache::new();
        let role = role();
        let mut first = cache.get(&role, false, LootCategory::Backpack, &c, None);
        first.remove(&TemplateId::from("bolts"));
        let second = cache.get(&role, false, LootCategory::Backpack, &c, None);
        assert_eq!(names(&second), vec!["bolts"]);
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn class_flag_is_part_of_the_key() {
        let c = catalog();
        let cache = LootCache::new();
        let role = role();
        cache.get(&role, false, LootCategory::Food, &c, None);
        cache.get(&role, true, LootCategory::Food, &c, None);
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_forces_rebuild() {
        let c = catalog();
        let cache = LootCache::new();
        let role = role();
        cache.get(&role, false, LootCategory::Food, &c, None);
        cache.clear();
        assert!(cache.is_empty());
        cache.get(&role, false, LootCategory::Food, &c, None);
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn price_filter_drops_unpriced_and_out_of_range() {
        let c = catalog();
        let cache = LootCache::new();
        let role = role();
        let range = PriceRange::between(dec!(1000), dec!(10000));
        let healing = cache.get(&role, false, LootCategory::Healing, &c, Some(range));
        assert_eq!(names(&healing), vec!["bandage"]);
        let open_max = PriceRange {
            min: Some(dec!(10000)),
            max: None,
        };
        let backpack = cache.get(&role, false, LootCategory::Backpack, &c, Some(open_max));
        assert_eq!(names(&backpack), vec!["bolts"]);
        let drugs = cache.get(&role, false, LootCategory::Drugs, &c, Some(PriceRange::default()));
        assert!(drugs.is_empty());
    }

    #[test]
    fn concurrent_first_touch_builds_once() {
        let c = Arc::new(catalog());
        let cache = Arc::new(LootCache::new());
        let role = Arc::new(role());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (c, cache, role) = (Arc::clone(&c), Arc::clone(&cache), Arc::clone(&role));
                std::thread::spawn(move || {
                    cache.get(&role, false, LootCategory::Healing, c.as_ref(), None).len()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(cache.builds(), 1);
    }
}
