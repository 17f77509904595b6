//! Flat loot lists for rewards and sealed crates.
//!
//! [`LootComposer::compose`] runs four independent phases: sealed crates,
//! generic catalog items, weapon presets and armor presets. A phase whose
//! source pool is empty produces nothing and the next phase still runs.

use std::collections::{BTreeMap, BTreeSet};

use armory_types::{ItemTemplate, LootItem, MinMax, Preset, TemplateId, WeightMap};
use rand::RngCore;

use crate::catalog::{ItemCatalog, base_class};
use crate::context::GenerationContext;
use crate::error::GenerationEvent;
use crate::item_builder::ammo_stack_size;
use crate::limits::{LimitCheck, SpawnLimitCounter};
use crate::weighted::{WeightedPool, random_between};

/// Sub-slots inspected for an armor preset's protection level, in
/// precedence order.
pub const ARMOR_LEVEL_SLOTS: [&str; 3] = ["front_plate", "helmet_top", "soft_armor_front"];

/// Role label on composer log events.
const COMPOSER: &str = "composer";

/// Source of pre-built assemblies.
pub trait PresetProvider: Send + Sync {
    /// Every default preset, one per root template.
    fn default_presets(&self) -> Box<dyn Iterator<Item = &Preset> + '_>;

    /// The default preset of `tpl`, if any.
    fn default_preset(&self, tpl: &TemplateId) -> Option<&Preset>;
}

/// Presets held in memory, keyed by root template.
#[derive(Debug, Clone, Default)]
pub struct StaticPresets {
    presets: BTreeMap<TemplateId, Preset>,
}

impl StaticPresets {
    /// No presets.
    pub const fn new() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }

    /// Add a preset. Only default presets are served.
    pub fn insert(&mut self, preset: Preset) {
        if preset.is_default {
            self.presets.insert(preset.root_tpl.clone(), preset);
        }
    }

    /// Number of presets held.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether no preset is held.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl FromIterator<Preset> for StaticPresets {
    fn from_iter<T: IntoIterator<Item = Preset>>(iter: T) -> Self {
        let mut presets = Self::new();
        for preset in iter {
            presets.insert(preset);
        }
        presets
    }
}

impl PresetProvider for StaticPresets {
    fn default_presets(&self) -> Box<dyn Iterator<Item = &Preset> + '_> {
        Box::new(self.presets.values())
    }

    fn default_preset(&self, tpl: &TemplateId) -> Option<&Preset> {
        self.presets.get(tpl)
    }
}

/// Options for [`LootComposer::compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootRequest {
    /// Sealed crate templates to draw from.
    pub crate_pool: Vec<TemplateId>,
    /// Number of sealed crates.
    pub crate_count: u32,
    /// Number of generic items.
    pub item_count: u32,
    /// Base classes generic items may come from.
    pub item_classes: Vec<TemplateId>,
    /// Templates or classes never produced.
    pub blacklist: Vec<TemplateId>,
    /// Boss-exclusive templates.
    pub boss_items: Vec<TemplateId>,
    /// Whether boss-exclusive templates may appear.
    pub allow_boss_items: bool,
    /// Most generic items per base class.
    pub class_limits: BTreeMap<TemplateId, u32>,
    /// Stack range for stackable generic items.
    pub stack_range: MinMax,
    /// Per-template stack ranges overriding `stack_range`.
    pub stack_overrides: BTreeMap<TemplateId, MinMax>,
    /// Number of weapon presets.
    pub weapon_preset_count: u32,
    /// Number of armor presets.
    pub armor_preset_count: u32,
    /// Protection levels allowed for armor presets. Empty allows all.
    pub armor_levels: Vec<u8>,
}

impl Default for LootRequest {
    fn default() -> Self {
        Self {
            crate_pool: Vec::new(),
            crate_count: 0,
            item_count: 0,
            item_classes: Vec::new(),
            blacklist: Vec::new(),
            boss_items: Vec::new(),
            allow_boss_items: false,
            class_limits: BTreeMap::new(),
            stack_range: MinMax::new(1, 1),
            stack_overrides: BTreeMap::new(),
            weapon_preset_count: 0,
            armor_preset_count: 0,
            armor_levels: Vec::new(),
        }
    }
}

/// Options for [`LootComposer::sealed_crate_contents`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrateRequest {
    /// Weapons the crate may hold. Empty allows every weapon preset.
    pub weapon_whitelist: Vec<TemplateId>,
    /// Ammunition and attachment rewards by weight.
    pub rewards: WeightMap,
    /// Number of reward draws.
    pub reward_count: MinMax,
}

/// Builds flat loot lists.
pub struct LootComposer<'a> {
    ctx: GenerationContext<'a>,
    presets: &'a dyn PresetProvider,
}

impl core::fmt::Debug for LootComposer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LootComposer").finish_non_exhaustive()
    }
}

impl<'a> LootComposer<'a> {
    /// Create a composer.
    pub const fn new(ctx: GenerationContext<'a>, presets: &'a dyn PresetProvider) -> Self {
        Self { ctx, presets }
    }

    /// Compose a loot list.
    pub fn compose(&self, request: &LootRequest, rng: &mut dyn RngCore) -> Vec<LootItem> {
        let mut out = Vec::new();
        self.crates(request, rng, &mut out);
        self.generic_items(request, rng, &mut out);
        self.weapon_presets(request.weapon_preset_count, &[], rng, &mut out);
        self.armor_presets(request, rng, &mut out);
        tracing::debug!(count = out.len(), "loot composed");
        out
    }

    /// Contents of one sealed crate: a weapon preset plus reward draws.
    pub fn sealed_crate_contents(&self, request: &CrateRequest, rng: &mut dyn RngCore) -> Vec<LootItem> {
        let mut out = Vec::new();
        self.weapon_presets(1, &request.weapon_whitelist, rng, &mut out);

        let rewards: WeightedPool = request
            .rewards
            .iter()
            .filter(|(tpl, _)| self.ctx.catalog.lookup(tpl).is_some())
            .map(|(tpl, &weight)| (tpl.clone(), weight))
            .collect();
        let draws = random_between(rng, request.reward_count.min, request.reward_count.max);
        for _ in 0..draws {
            let Some(template) = rewards.draw(rng).and_then(|tpl| self.ctx.catalog.lookup(tpl)) else {
                break;
            };
            let count = if template.is_stackable() {
                ammo_stack_size(&self.ctx, template, rng)
            } else {
                1
            };
            out.push(LootItem::stack(template.id.clone(), count));
        }
        out
    }

    fn crates(&self, request: &LootRequest, rng: &mut dyn RngCore, out: &mut Vec<LootItem>) {
        let pool: WeightedPool = request.crate_pool.iter().map(|tpl| (tpl.clone(), 1)).collect();
        for _ in 0..request.crate_count {
            let Some(tpl) = pool.draw(rng) else {
                break;
            };
            out.push(LootItem::single(tpl.clone()));
        }
    }

    /// Templates eligible as generic items. Class nodes (templates other
    /// templates inherit from) are never items themselves.
    fn item_pool(&self, request: &LootRequest) -> WeightedPool {
        let catalog = self.ctx.catalog;
        let class_nodes: BTreeSet<&TemplateId> = catalog
            .templates()
            .filter_map(|t| t.parent.as_ref())
            .collect();
        let classes: Vec<&str> = request.item_classes.iter().map(TemplateId::as_str).collect();
        let denied: Vec<&str> = request.blacklist.iter().map(TemplateId::as_str).collect();
        catalog
            .templates()
            .filter(|t| !t.quest_item && !class_nodes.contains(&t.id))
            .filter(|t| catalog.is_of_any_base_class(&t.id, &classes))
            .filter(|t| !catalog.is_of_any_base_class(&t.id, &denied))
            .filter(|t| request.allow_boss_items || !request.boss_items.contains(&t.id))
            .map(|t| (t.id.clone(), 1))
            .collect()
    }

    fn generic_items(&self, request: &LootRequest, rng: &mut dyn RngCore, out: &mut Vec<LootItem>) {
        let mut working = self.item_pool(request);
        let mut limits = SpawnLimitCounter::new(request.class_limits.clone(), 1);
        let budget = self.ctx.config.retry.composer_rejection_budget;
        let mut rejections: u32 = 0;
        let mut produced: u32 = 0;

        while produced < request.item_count {
            let Some(tpl) = working.draw(rng).cloned() else {
                break;
            };
            let Some(template) = self.ctx.catalog.lookup(&tpl) else {
                working.remove(&tpl);
                continue;
            };
            if limits.check(&tpl, self.ctx.catalog) != LimitCheck::Allowed {
                // The whole class is spent, not just this template.
                match limits.limit_key(&tpl, self.ctx.catalog) {
                    Some(key) => working.retain(|candidate| {
                        limits.limit_key(candidate, self.ctx.catalog).as_ref() != Some(&key)
                    }),
                    None => {
                        working.remove(&tpl);
                    }
                }
                rejections = rejections.saturating_add(1);
                if rejections > budget {
                    GenerationEvent::PoolExhausted {
                        context: String::from("generic loot rejection budget"),
                    }
                    .log(COMPOSER);
                    break;
                }
                continue;
            }
            let count = self.stack_count(request, template, rng);
            out.push(LootItem::stack(tpl, count));
            produced = produced.saturating_add(1);
        }
    }

    fn stack_count(&self, request: &LootRequest, template: &ItemTemplate, rng: &mut dyn RngCore) -> u32 {
        if !template.is_stackable() {
            return 1;
        }
        let range = request
            .stack_overrides
            .get(&template.id)
            .copied()
            .unwrap_or(request.stack_range);
        random_between(rng, range.min, range.max).clamp(1, template.stack_max_size)
    }

    fn weapon_presets(
        &self,
        count: u32,
        whitelist: &[TemplateId],
        rng: &mut dyn RngCore,
        out: &mut Vec<LootItem>,
    ) {
        let pool: WeightedPool = self
            .presets
            .default_presets()
            .filter(|p| self.ctx.catalog.is_of_base_class(&p.root_tpl, base_class::WEAPON))
            .filter(|p| whitelist.is_empty() || whitelist.contains(&p.root_tpl))
            .map(|p| (p.root_tpl.clone(), 1))
            .collect();
        for _ in 0..count {
            let Some(tpl) = pool.draw(rng) else {
                break;
            };
            out.push(LootItem::preset(tpl.clone()));
        }
    }

    fn armor_presets(&self, request: &LootRequest, rng: &mut dyn RngCore, out: &mut Vec<LootItem>) {
        let pool: WeightedPool = self
            .presets
            .default_presets()
            .filter(|p| {
                self.ctx.catalog.is_of_any_base_class(
                    &p.root_tpl,
                    &[base_class::ARMOR, base_class::VEST, base_class::HEADWEAR],
                )
            })
            .filter(|p| {
                request.armor_levels.is_empty()
                    || armor_level(p, self.ctx.catalog)
                        .is_some_and(|level| request.armor_levels.contains(&level))
            })
            .map(|p| (p.root_tpl.clone(), 1))
            .collect();
        for _ in 0..request.armor_preset_count {
            let Some(tpl) = pool.draw(rng) else {
                break;
            };
            out.push(LootItem::preset(tpl.clone()));
        }
    }
}

/// Protection level of an armor preset: the armor class of the first of
/// [`ARMOR_LEVEL_SLOTS`] that holds a plate or insert.
pub fn armor_level(preset: &Preset, catalog: &dyn ItemCatalog) -> Option<u8> {
    let root = preset.root()?;
    ARMOR_LEVEL_SLOTS.iter().find_map(|slot| {
        preset
            .items
            .iter()
            .find(|item| item.parent_id == Some(root.id) && item.slot_id.as_deref() == Some(*slot))
            .and_then(|item| catalog.lookup(&item.tpl))
            .and_then(|template| template.armor_class)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{InventoryItem, ItemId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::GeneratorConfig;
    use crate::ids::SequentialIds;

    fn plate(id: &str, class: u8) -> ItemTemplate {
        let mut plate = ItemTemplate::new(id, id, base_class::ARMOR_PLATE);
        plate.armor_class = Some(class);
        plate
    }

    fn catalog() -> InMemoryCatalog {
        let mut salt = ItemTemplate::new("salt", "Salt", "class.barter");
        salt.stack_max_size = 10;
        let mut quest = ItemTemplate::new("flash_drive", "Flash drive", "class.barter");
        quest.quest_item = true;
        let mut ps = ItemTemplate::new("ps545", "PS", base_class::AMMO);
        ps.stack_max_size = 60;
        ps.stack_min_random = 20;
        ps.stack_max_random = 60;
        [
            ItemTemplate::new("class.barter", "Barter", "class.item"),
            ItemTemplate::new("bolts", "Bolts", "class.barter"),
            ItemTemplate::new("screws", "Screws", "class.barter"),
            ItemTemplate::new("golden_rooster", "Rooster", "class.barter"),
            ItemTemplate::new("tank_battery", "Battery", "class.barter"),
            salt,
            quest,
            ps,
            ItemTemplate::new("crate_weapon", "Crate", base_class::SEALED_CRATE),
            ItemTemplate::new("ak74", "AK-74", base_class::WEAPON),
            ItemTemplate::new("vest_6b13", "6B13", base_class::ARMOR),
            ItemTemplate::new("vest_paca", "PACA", base_class::ARMOR),
            plate("plate_4", 4),
            plate("insert_2", 2),
            plate("insert_3", 3),
        ]
        .into_iter()
        .collect()
    }

    fn preset(root_tpl: &str, children: &[(&str, &str)]) -> Preset {
        let root = InventoryItem::new(ItemId::new(), TemplateId::from(root_tpl));
        let root_id = root.id;
        let mut items = vec![root];
        for (slot, tpl) in children {
            items.push(InventoryItem::child_of(ItemId::new(), TemplateId::from(*tpl), root_id, slot));
        }
        Preset {
            name: format!("{root_tpl} default"),
            root_tpl: TemplateId::from(root_tpl),
            is_default: true,
            items,
        }
    }

    fn presets() -> StaticPresets {
        [
            preset("ak74", &[]),
            preset("vest_6b13", &[("soft_armor_front", "insert_2"), ("front_plate", "plate_4")]),
            preset("vest_paca", &[("soft_armor_front", "insert_3")]),
        ]
        .into_iter()
        .collect()
    }

    fn compose(request: &LootRequest, seed: u64) -> Vec<LootItem> {
        let catalog = catalog();
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let presets = presets();
        let composer = LootComposer::new(GenerationContext::new(&catalog, &ids, &config), &presets);
        let mut rng = SmallRng::seed_from_u64(seed);
        composer.compose(request, &mut rng)
    }

    fn barter_request() -> LootRequest {
        LootRequest {
            item_count: 4,
            item_classes: vec![TemplateId::from("class.barter")],
            blacklist: vec![TemplateId::from("bolts")],
            boss_items: vec![TemplateId::from("golden_rooster")],
            stack_range: MinMax::new(3, 5),
            ..LootRequest::default()
        }
    }

    #[test]
    fn phases_produce_requested_counts() {
        let request = LootRequest {
            crate_pool: vec![TemplateId::from("crate_weapon")],
            crate_count: 2,
            weapon_preset_count: 1,
            armor_preset_count: 2,
            ..barter_request()
        };
        let loot = compose(&request, 1);
        assert_eq!(loot.len(), 9);
        let crates = loot.iter().filter(|l| l.tpl.as_str() == "crate_weapon").count();
        assert_eq!(crates, 2);
        let presets = loot.iter().filter(|l| l.is_preset).count();
        assert_eq!(presets, 3);
    }

    #[test]
    fn generic_items_respect_filters() {
        for seed in 0..20 {
            let loot = compose(&barter_request(), seed);
            assert_eq!(loot.len(), 4);
            for item in &loot {
                assert!(!["bolts", "golden_rooster", "flash_drive", "class.barter"].contains(&item.tpl.as_str()));
                if item.tpl.as_str() == "salt" {
                    assert!((3..=5).contains(&item.stack_count));
                } else {
                    assert_eq!(item.stack_count, 1);
                }
            }
        }
    }

    #[test]
    fn class_ceiling_caps_generic_items() {
        let mut request = barter_request();
        request.item_count = 10;
        request.class_limits.insert(TemplateId::from("class.barter"), 2);
        for seed in 0..10 {
            assert_eq!(compose(&request, seed).len(), 2);
        }
    }

    #[test]
    fn spent_class_leaves_other_classes_eligible() {
        let mut catalog: InMemoryCatalog = (0..200)
            .map(|i| ItemTemplate::new(format!("barter_{i}"), "Barter", "class.barter"))
            .collect();
        catalog.insert(ItemTemplate::new("class.barter", "Barter", "class.item"));
        catalog.insert(ItemTemplate::new("class.food", "Food", "class.item"));
        catalog.insert(ItemTemplate::new("tushonka", "Tushonka", "class.food"));
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let presets = StaticPresets::new();
        let composer = LootComposer::new(GenerationContext::new(&catalog, &ids, &config), &presets);

        let mut request = LootRequest {
            item_count: 2,
            item_classes: vec![TemplateId::from("class.barter"), TemplateId::from("class.food")],
            ..LootRequest::default()
        };
        request.class_limits.insert(TemplateId::from("class.barter"), 1);

        for seed in 0..100 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let loot = composer.compose(&request, &mut rng);
            assert_eq!(loot.len(), 2, "seed {seed}");
            let barter = loot.iter().filter(|l| l.tpl.as_str().starts_with("barter_")).count();
            assert!(barter <= 1, "seed {seed}");
        }
    }

    #[test]
    fn empty_phase_does_not_block_later_phases() {
        let request = LootRequest {
            crate_count: 3,
            weapon_preset_count: 2,
            ..LootRequest::default()
        };
        let loot = compose(&request, 3);
        assert_eq!(loot.len(), 2);
        assert!(loot.iter().all(|l| l.is_preset && l.tpl.as_str() == "ak74"));
    }

    #[test]
    fn armor_level_prefers_front_plate() {
        let catalog = catalog();
        let p = preset("vest_6b13", &[("soft_armor_front", "insert_2"), ("front_plate", "plate_4")]);
        assert_eq!(armor_level(&p, &catalog), Some(4));
        let soft = preset("vest_paca", &[("soft_armor_front", "insert_3")]);
        assert_eq!(armor_level(&soft, &catalog), Some(3));
        assert_eq!(armor_level(&preset("vest_paca", &[]), &catalog), None);
    }

    #[test]
    fn armor_presets_filter_by_level() {
        let request = LootRequest {
            armor_preset_count: 5,
            armor_levels: vec![3],
            ..LootRequest::default()
        };
        let loot = compose(&request, 4);
        assert_eq!(loot.len(), 5);
        assert!(loot.iter().all(|l| l.tpl.as_str() == "vest_paca"));
    }

    #[test]
    fn sealed_crate_holds_one_weapon_and_rewards() {
        let catalog = catalog();
        let ids = SequentialIds::starting_at(1);
        let config = GeneratorConfig::default();
        let presets = presets();
        let composer = LootComposer::new(GenerationContext::new(&catalog, &ids, &config), &presets);
        let mut rewards = WeightMap::new();
        rewards.insert(TemplateId::from("ps545"), 1);
        rewards.insert(TemplateId::from("missing_mod"), 5);
        let request = CrateRequest {
            weapon_whitelist: Vec::new(),
            rewards,
            reward_count: MinMax::new(2, 4),
        };
        let mut rng = SmallRng::seed_from_u64(6);
        let contents = composer.sealed_crate_contents(&request, &mut rng);
        let (weapons, rest): (Vec<_>, Vec<_>) = contents.iter().partition(|l| l.is_preset);
        assert_eq!(weapons.len(), 1);
        assert!((2..=4).contains(&rest.len()));
        for reward in rest {
            assert_eq!(reward.tpl.as_str(), "ps545");
            assert!((20..=60).contains(&reward.stack_count));
        }
    }
}
