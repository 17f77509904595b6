//! Item catalog adapter.
//!
//! The catalog is owned by an external service; the generator only reads
//! it through the [`ItemCatalog`] trait. [`InMemoryCatalog`] is the
//! implementation used by the engine binary and the tests.
//!
//! Class predicates walk the template `parent` chain. The walk is bounded
//! by [`MAX_CLASS_DEPTH`] so a malformed (cyclic) catalog cannot hang
//! generation.

use std::collections::BTreeMap;

use armory_types::{ItemTemplate, Money, TemplateId};

/// Maximum number of parent hops followed by class predicates.
pub const MAX_CLASS_DEPTH: usize = 32;

/// Base-class ids the generator needs to recognise.
///
/// The catalog defines the full taxonomy; these are only the classes the
/// category derivation and quantity rules branch on.
pub mod base_class {
    /// Any firearm.
    pub const WEAPON: &str = "class.weapon";
    /// Loose cartridges.
    pub const AMMO: &str = "class.ammo";
    /// Boxes of cartridges.
    pub const AMMO_BOX: &str = "class.ammo_box";
    /// Detachable magazines.
    pub const MAGAZINE: &str = "class.magazine";
    /// Currency.
    pub const MONEY: &str = "class.money";
    /// Edible items.
    pub const FOOD: &str = "class.food";
    /// Drinkable items.
    pub const DRINK: &str = "class.drink";
    /// Any medical item.
    pub const MEDS: &str = "class.meds";
    /// Injectors.
    pub const STIMULANT: &str = "class.stimulant";
    /// Painkillers.
    pub const DRUGS: &str = "class.drugs";
    /// Throwables.
    pub const GRENADE: &str = "class.grenade";
    /// Body armor.
    pub const ARMOR: &str = "class.armor";
    /// Chest rigs.
    pub const VEST: &str = "class.vest";
    /// Helmets and hats.
    pub const HEADWEAR: &str = "class.headwear";
    /// Backpacks.
    pub const BACKPACK: &str = "class.backpack";
    /// Secure containers.
    pub const SECURE_CONTAINER: &str = "class.secure_container";
    /// Pocket containers.
    pub const POCKETS: &str = "class.pockets";
    /// Dog tags.
    pub const DOGTAG: &str = "class.dogtag";
    /// Removable armor plates.
    pub const ARMOR_PLATE: &str = "class.armor_plate";
    /// Soft inserts built into armor.
    pub const BUILT_IN_INSERT: &str = "class.built_in_insert";
    /// Sealed weapon crates.
    pub const SEALED_CRATE: &str = "class.sealed_crate";
    /// Wallets and similar money holders.
    pub const MONEY_HOLDER: &str = "class.money_holder";
}

/// Read access to item templates and prices.
pub trait ItemCatalog: Send + Sync {
    /// Look up a template by id.
    fn lookup(&self, tpl: &TemplateId) -> Option<&ItemTemplate>;

    /// Catalog price of a template, if it has one.
    fn price_of(&self, tpl: &TemplateId) -> Option<Money>;

    /// Iterate every template.
    fn templates(&self) -> Box<dyn Iterator<Item = &ItemTemplate> + '_>;

    /// Whether `tpl` is `class` or inherits from it.
    fn is_of_base_class(&self, tpl: &TemplateId, class: &str) -> bool {
        let mut current = Some(tpl.clone());
        for _ in 0..MAX_CLASS_DEPTH {
            let Some(id) = current else {
                return false;
            };
            if id.as_str() == class {
                return true;
            }
            current = self.lookup(&id).and_then(|t| t.parent.clone());
        }
        false
    }

    /// Whether `tpl` inherits from any of `classes`.
    fn is_of_any_base_class(&self, tpl: &TemplateId, classes: &[&str]) -> bool {
        classes.iter().any(|class| self.is_of_base_class(tpl, class))
    }

    /// Immediate parent class of `tpl`.
    fn base_class_of(&self, tpl: &TemplateId) -> Option<&TemplateId> {
        self.lookup(tpl).and_then(|t| t.parent.as_ref())
    }
}

/// A catalog held in memory.
///
/// Prices default to the explicit price table; templates without an entry
/// are unpriced.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    templates: BTreeMap<TemplateId, ItemTemplate>,
    prices: BTreeMap<TemplateId, Money>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
            prices: BTreeMap::new(),
        }
    }

    /// Add or replace a template.
    pub fn insert(&mut self, template: ItemTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Add or replace a template together with its price.
    pub fn insert_priced(&mut self, template: ItemTemplate, price: Money) {
        self.prices.insert(template.id.clone(), price);
        self.insert(template);
    }

    /// Set the price of a template.
    pub fn set_price(&mut self, tpl: TemplateId, price: Money) {
        self.prices.insert(tpl, price);
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl ItemCatalog for InMemoryCatalog {
    fn lookup(&self, tpl: &TemplateId) -> Option<&ItemTemplate> {
        self.templates.get(tpl)
    }

    fn price_of(&self, tpl: &TemplateId) -> Option<Money> {
        self.prices.get(tpl).copied()
    }

    fn templates(&self) -> Box<dyn Iterator<Item = &ItemTemplate> + '_> {
        Box::new(self.templates.values())
    }
}

impl FromIterator<ItemTemplate> for InMemoryCatalog {
    fn from_iter<T: IntoIterator<Item = ItemTemplate>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for template in iter {
            catalog.insert(template);
        }
        catalog
    }
}

// ---------------------------------------------------------------------------
// Derived predicates
// ---------------------------------------------------------------------------

/// Cartridges and grenade rounds: anything carrying a caliber
/// that is neither a weapon nor a magazine.
pub fn is_ammo_like(catalog: &dyn ItemCatalog, template: &ItemTemplate) -> bool {
    template.ammo_caliber.is_some()
        && !template.reload_magazine
        && !catalog.is_of_base_class(&template.id, base_class::WEAPON)
}

/// Detachable magazine.
pub const fn is_magazine(template: &ItemTemplate) -> bool {
    template.reload_magazine
}

/// Medical item of any kind.
pub const fn is_medical(template: &ItemTemplate) -> bool {
    template.med_use_time.is_some()
}

/// Throwable.
pub const fn is_grenade(template: &ItemTemplate) -> bool {
    template.throw_type.is_some()
}
