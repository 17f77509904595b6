//! Materialization of loose loot items.
//!
//! Turns a drawn template into an item tree (root first) with the quantity
//! rules applied: cartridge stacks, currency stacks, filled ammo boxes,
//! built-in armor inserts and wallet contents. The root has no parent yet;
//! placement decides where it goes.

use armory_types::{Durability, InventoryItem, ItemId, ItemTemplate, MinMax, TemplateId};
use rand::RngCore;

use crate::catalog::{base_class, is_ammo_like};
use crate::context::GenerationContext;
use crate::weighted::{WeightedPool, draw_count, random_between, roll_chance};

/// Grid used for items stored inside a wallet without a declared grid.
const DEFAULT_GRID: &str = "main";

fn fresh(ctx: &GenerationContext<'_>, tpl: TemplateId) -> InventoryItem {
    let mut item = InventoryItem::new(ctx.ids.item_id(), tpl);
    item.props.spawned_in_session = true;
    item
}

/// Build a loose loot item of `template` with every quantity rule applied.
pub fn build_loot_item(
    ctx: &GenerationContext<'_>,
    template: &ItemTemplate,
    is_special_class: bool,
    rng: &mut dyn RngCore,
) -> Vec<InventoryItem> {
    let mut root = fresh(ctx, template.id.clone());
    let mut children = Vec::new();

    if let Some(slot) = template.stack_slots.first() {
        if let Some(ammo) = slot.filter.first() {
            let cartridges = InventoryItem::child_of(ctx.ids.item_id(), ammo.clone(), root.id, &slot.name)
                .with_stack(slot.max_count.max(1));
            children.push(cartridges);
        }
    } else if ctx.catalog.is_of_base_class(&template.id, base_class::MONEY) {
        root.props.stack_count = Some(currency_stack(ctx, template, is_special_class, rng));
    } else if is_ammo_like(ctx.catalog, template) {
        root.props.stack_count = Some(ammo_stack_size(ctx, template, rng));
    }

    children.extend(built_in_inserts(ctx, root.id, template));

    if template.id == ctx.config.loot.wallet.template {
        children.extend(wallet_contents(ctx, root.id, template, is_special_class, rng));
    }

    let mut items = Vec::with_capacity(children.len().saturating_add(1));
    items.push(root);
    items.extend(children);
    items
}

/// Randomized cartridge count in
/// `[stack_min_random, min(stack_max_random, ammo_stack_cap)]`.
pub fn ammo_stack_size(
    ctx: &GenerationContext<'_>,
    template: &ItemTemplate,
    rng: &mut dyn RngCore,
) -> u32 {
    let max = template
        .stack_max_random
        .min(ctx.config.loot.ammo_stack_cap)
        .max(1);
    let min = template.stack_min_random.clamp(1, max);
    random_between(rng, min, max)
}

/// A loose stack of cartridges.
pub fn ammo_stack(
    ctx: &GenerationContext<'_>,
    ammo_tpl: &TemplateId,
    rng: &mut dyn RngCore,
) -> Vec<InventoryItem> {
    let count = ctx
        .catalog
        .lookup(ammo_tpl)
        .map_or(1, |template| ammo_stack_size(ctx, template, rng));
    vec![fresh(ctx, ammo_tpl.clone()).with_stack(count)]
}

/// Stack size for a currency item, weighted by agent class when
/// configured, otherwise uniform over the template's stack range.
pub fn currency_stack(
    ctx: &GenerationContext<'_>,
    template: &ItemTemplate,
    is_special_class: bool,
    rng: &mut dyn RngCore,
) -> u32 {
    let weighted = ctx
        .config
        .loot
        .currency_stacks
        .weights_for(&template.id, is_special_class)
        .map(|weights| draw_count(weights, rng))
        .filter(|&count| count > 0);
    weighted.unwrap_or_else(|| random_between(rng, 1, template.stack_max_size.max(1)))
}

/// A magazine of `mag_tpl` loaded to capacity with `ammo_tpl`.
pub fn loaded_magazine(
    ctx: &GenerationContext<'_>,
    mag_tpl: &ItemTemplate,
    ammo_tpl: Option<&TemplateId>,
) -> Vec<InventoryItem> {
    let magazine = fresh(ctx, mag_tpl.id.clone());
    let magazine_id = magazine.id;
    let mut items = vec![magazine];
    if let (Some(slot), Some(ammo)) = (mag_tpl.cartridges.as_ref(), ammo_tpl) {
        if slot.max_count > 0 {
            let rounds = InventoryItem::child_of(ctx.ids.item_id(), ammo.clone(), magazine_id, &slot.name)
                .with_stack(slot.max_count);
            items.push(rounds);
        }
    }
    items
}

/// Whether a template is a built-in soft insert.
fn is_built_in_insert(ctx: &GenerationContext<'_>, tpl: &TemplateId) -> bool {
    ctx.catalog.is_of_base_class(tpl, base_class::BUILT_IN_INSERT)
}

/// Children for every required slot whose content is a built-in insert.
pub fn built_in_inserts(
    ctx: &GenerationContext<'_>,
    parent: ItemId,
    template: &ItemTemplate,
) -> Vec<InventoryItem> {
    template
        .slots
        .iter()
        .filter(|slot| slot.required)
        .filter_map(|slot| {
            let insert = slot.default_item.as_ref().or_else(|| slot.filter.first())?;
            is_built_in_insert(ctx, insert).then(|| {
                InventoryItem::child_of(ctx.ids.item_id(), insert.clone(), parent, &slot.name)
            })
        })
        .collect()
}

fn wallet_contents(
    ctx: &GenerationContext<'_>,
    wallet: ItemId,
    template: &ItemTemplate,
    is_special_class: bool,
    rng: &mut dyn RngCore,
) -> Vec<InventoryItem> {
    let config = &ctx.config.loot.wallet;
    if !roll_chance(rng, config.chance_pct) {
        return Vec::new();
    }
    let currencies = WeightedPool::from_weights(&config.currencies);
    let grid = template
        .grids
        .first()
        .map_or(DEFAULT_GRID, |grid| grid.name.as_str());
    let stacks = random_between(rng, config.stacks.min, config.stacks.max);
    let mut out = Vec::new();
    for _ in 0..stacks {
        let Some(currency) = currencies.draw(rng).cloned() else {
            break;
        };
        let count = ctx.catalog.lookup(&currency).map_or(1, |currency_tpl| {
            currency_stack(ctx, currency_tpl, is_special_class, rng)
        });
        let mut stack = InventoryItem::child_of(ctx.ids.item_id(), currency, wallet, grid)
            .with_stack(count);
        stack.props.spawned_in_session = true;
        out.push(stack);
    }
    out
}

/// Random durability within `range` percent of the template maximum.
/// Templates without durability are left untouched.
pub fn randomize_durability(
    item: &mut InventoryItem,
    template: &ItemTemplate,
    range: MinMax,
    rng: &mut dyn RngCore,
) {
    let Some(max) = template.max_durability else {
        return;
    };
    let pct = u64::from(random_between(rng, range.min, range.max).min(100));
    let current = u64::from(max)
        .saturating_mul(pct)
        .checked_div(100)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(max)
        .max(1);
    item.props.durability = Some(Durability { current, max });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use armory_types::{GridProps, ItemSlot, StackSlot};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::{InMemoryCatalog, ItemCatalog};
    use crate::config::GeneratorConfig;
    use crate::ids::SequentialIds;

    fn catalog() -> InMemoryCatalog {
        let mut ps = ItemTemplate::new("ps545", "PS", base_class::AMMO);
        ps.ammo_caliber = Some(String::from("5.45x39"));
        ps.stack_max_size = 60;
        ps.stack_min_random = 20;
        ps.stack_max_random = 500;
        let mut ammo_box = ItemTemplate::new("box_ps", "Box", base_class::AMMO_BOX);
        ammo_box.stack_slots.push(StackSlot {
            name: String::from("cartridges"),
            max_count: 120,
            filter: vec![TemplateId::from("ps545")],
        });
        let mut roubles = ItemTemplate::new("roubles", "Roubles", base_class::MONEY);
        roubles.stack_max_size = 500_000;
        let mut wallet = ItemTemplate::new("wallet", "Wallet", base_class::MONEY_HOLDER);
        wallet.grids.push(GridProps {
            name: String::from("main"),
            width: 2,
            height: 2,
        });
        let mut armor = ItemTemplate::new("paca", "PACA", base_class::ARMOR);
        armor.max_durability = Some(40);
        armor.slots.push(ItemSlot {
            name: String::from("soft_armor_front"),
            required: true,
            filter: vec![TemplateId::from("paca_front")],
            default_item: Some(TemplateId::from("paca_front")),
        });
        armor.slots.push(ItemSlot {
            name: String::from("front_plate"),
            required: false,
            filter: vec![TemplateId::from("plate")],
            default_item: None,
        });
        let insert = ItemTemplate::new("paca_front", "Insert", base_class::BUILT_IN_INSERT);
        let mut mag = ItemTemplate::new("mag", "Mag", base_class::MAGAZINE);
        mag.reload_magazine = true;
        mag.cartridges = Some(StackSlot {
            name: String::from("cartridges"),
            max_count: 30,
            filter: vec![TemplateId::from("ps545")],
        });
        [ps, ammo_box, roubles, wallet, armor, insert, mag].into_iter().collect()
    }

    struct Fixture {
        catalog: InMemoryCatalog,
        ids: SequentialIds,
        config: GeneratorConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: catalog(),
                ids: SequentialIds::starting_at(1),
                config: GeneratorConfig::default(),
            }
        }

        fn ctx(&self) -> GenerationContext<'_> {
            GenerationContext::new(&self.catalog, &self.ids, &self.config)
        }

        fn tpl(&self, id: &str) -> &ItemTemplate {
            self.catalog.lookup(&TemplateId::from(id)).unwrap()
        }
    }

    #[test]
    fn ammo_stack_is_capped() {
        let f = Fixture::new();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let items = build_loot_item(&f.ctx(), f.tpl("ps545"), false, &mut rng);
            let count = items.first().unwrap().stack_count();
            assert!((20..=100).contains(&count), "stack {count}");
        }
    }

    #[test]
    fn ammo_box_is_filled() {
        let f = Fixture::new();
        let mut rng = SmallRng::seed_from_u64(2);
        let items = build_loot_item(&f.ctx(), f.tpl("box_ps"), false, &mut rng);
        assert_eq!(items.len(), 2);
        let cartridges = items.get(1).unwrap();
        assert_eq!(cartridges.stack_count(), 120);
        assert_eq!(cartridges.parent_id, Some(items.first().unwrap().id));
    }

    #[test]
    fn currency_uses_class_weights() {
        let mut f = Fixture::new();
        let mut weights = BTreeMap::new();
        weights.insert(2_500, 1);
        f.config
            .loot
            .currency_stacks
            .special_class
            .insert(TemplateId::from("roubles"), weights);
        let mut rng = SmallRng::seed_from_u64(3);
        let special = build_loot_item(&f.ctx(), f.tpl("roubles"), true, &mut rng);
        assert_eq!(special.first().unwrap().stack_count(), 2_500);
        let regular = build_loot_item(&f.ctx(), f.tpl("roubles"), false, &mut rng);
        assert!((1..=500_000).contains(&regular.first().unwrap().stack_count()));
    }

    #[test]
    fn required_inserts_are_attached() {
        let f = Fixture::new();
        let mut rng = SmallRng::seed_from_u64(4);
        let items = build_loot_item(&f.ctx(), f.tpl("paca"), false, &mut rng);
        assert_eq!(items.len(), 2);
        let insert = items.get(1).unwrap();
        assert_eq!(insert.tpl.as_str(), "paca_front");
        assert_eq!(insert.slot_id.as_deref(), Some("soft_armor_front"));
    }

    #[test]
    fn wallet_sometimes_holds_money() {
        let mut f = Fixture::new();
        f.config.loot.wallet.chance_pct = 100;
        let mut rng = SmallRng::seed_from_u64(5);
        let items = build_loot_item(&f.ctx(), f.tpl("wallet"), false, &mut rng);
        let stacks = items.len().saturating_sub(1);
        assert!((1..=3).contains(&stacks));
        assert!(items.iter().skip(1).all(|i| i.tpl.as_str() == "roubles"));

        f.config.loot.wallet.chance_pct = 0;
        let empty = build_loot_item(&f.ctx(), f.tpl("wallet"), false, &mut rng);
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn magazine_loaded_to_capacity() {
        let f = Fixture::new();
        let ammo = TemplateId::from("ps545");
        let items = loaded_magazine(&f.ctx(), f.tpl("mag"), Some(&ammo));
        assert_eq!(items.len(), 2);
        assert_eq!(items.get(1).unwrap().stack_count(), 30);
    }

    #[test]
    fn durability_within_range() {
        let f = Fixture::new();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut item = InventoryItem::new(ItemId::new(), TemplateId::from("paca"));
        for _ in 0..50 {
            randomize_durability(&mut item, f.tpl("paca"), MinMax::new(50, 100), &mut rng);
            let durability = item.props.durability.unwrap();
            assert_eq!(durability.max, 40);
            assert!((20..=40).contains(&durability.current));
        }
    }
}
