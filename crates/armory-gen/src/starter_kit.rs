//! Built-in demo catalog, roles and presets.
//!
//! Enough content to run the whole pipeline stand-alone: a class
//! hierarchy, a few dozen items across every loot category, one scav role
//! and two PMC roles. Used by the engine binary and by tests.

use std::collections::BTreeMap;

use armory_types::{
    BodyPart, ContainerKind, CountWeights, EquipmentSlot, GridProps, InventoryItem, ItemId, ItemSlot,
    ItemTemplate, LootCategory, MinMax, Money, Preset, RoleTemplate, Side, StackSlot, TemplateId,
    WeightMap,
};

use crate::catalog::{InMemoryCatalog, base_class};
use crate::composer::StaticPresets;
use crate::pool_cache::StaticPmcLoot;

/// Root of the class hierarchy.
pub const ROOT_CLASS: &str = "class.item";

fn class(id: &str, parent: &str) -> ItemTemplate {
    ItemTemplate::new(id, id, parent)
}

fn item(id: &str, name: &str, parent: &str, width: u32, height: u32) -> ItemTemplate {
    let mut t = ItemTemplate::new(id, name, parent);
    t.width = width;
    t.height = height;
    t
}

fn grid(name: &str, width: u32, height: u32) -> GridProps {
    GridProps {
        name: String::from(name),
        width,
        height,
    }
}

fn grids(count: u32, width: u32, height: u32) -> Vec<GridProps> {
    (0..count)
        .map(|i| grid(&format!("cell_{i}"), width, height))
        .collect()
}

fn slot(name: &str, required: bool, filter: &[&str], default_item: Option<&str>) -> ItemSlot {
    ItemSlot {
        name: String::from(name),
        required,
        filter: filter.iter().map(|t| TemplateId::from(*t)).collect(),
        default_item: default_item.map(TemplateId::from),
    }
}

fn cartridges(max_count: u32, ammo: &str) -> StackSlot {
    StackSlot {
        name: String::from("cartridges"),
        max_count,
        filter: vec![TemplateId::from(ammo)],
    }
}

fn ammo(id: &str, name: &str, caliber: &str, stack: u32, min_random: u32) -> ItemTemplate {
    let mut t = item(id, name, base_class::AMMO, 1, 1);
    t.ammo_caliber = Some(String::from(caliber));
    t.stack_max_size = stack;
    t.stack_min_random = min_random;
    t.stack_max_random = stack;
    t
}

fn magazine(id: &str, name: &str, height: u32, capacity: u32, ammo: &str) -> ItemTemplate {
    let mut t = item(id, name, base_class::MAGAZINE, 1, height);
    t.reload_magazine = true;
    t.cartridges = Some(cartridges(capacity, ammo));
    t
}

fn weapon(id: &str, name: &str, caliber: &str, width: u32, slots: Vec<ItemSlot>) -> ItemTemplate {
    let mut t = item(id, name, base_class::WEAPON, width, 1);
    t.ammo_caliber = Some(String::from(caliber));
    t.max_durability = Some(100);
    t.slots = slots;
    t
}

fn med(id: &str, name: &str, parent: &str, use_time: u32) -> ItemTemplate {
    let mut t = item(id, name, parent, 1, 1);
    t.med_use_time = Some(use_time);
    t
}

fn stackable(mut t: ItemTemplate, max: u32) -> ItemTemplate {
    t.stack_max_size = max;
    t.stack_max_random = max;
    t
}

fn armored(mut t: ItemTemplate, class: u8, durability: u32) -> ItemTemplate {
    t.armor_class = Some(class);
    t.max_durability = Some(durability);
    t
}

fn price(rub: u32) -> Money {
    Money::from(rub)
}

/// Class nodes of the hierarchy.
fn classes() -> Vec<ItemTemplate> {
    let mut root = ItemTemplate::new(ROOT_CLASS, ROOT_CLASS, ROOT_CLASS);
    root.parent = None;
    let mut out = vec![root];
    out.extend(
        [
            (base_class::WEAPON, ROOT_CLASS),
            (base_class::AMMO, ROOT_CLASS),
            (base_class::AMMO_BOX, ROOT_CLASS),
            (base_class::MAGAZINE, "class.mod"),
            (base_class::MONEY, ROOT_CLASS),
            (base_class::FOOD, "class.provisions"),
            (base_class::DRINK, "class.provisions"),
            (base_class::MEDS, ROOT_CLASS),
            (base_class::STIMULANT, base_class::MEDS),
            (base_class::DRUGS, base_class::MEDS),
            (base_class::GRENADE, ROOT_CLASS),
            (base_class::ARMOR, "class.gear"),
            (base_class::VEST, "class.gear"),
            (base_class::HEADWEAR, "class.gear"),
            (base_class::BACKPACK, "class.gear"),
            (base_class::SECURE_CONTAINER, "class.gear"),
            (base_class::POCKETS, "class.gear"),
            (base_class::DOGTAG, ROOT_CLASS),
            (base_class::ARMOR_PLATE, ROOT_CLASS),
            (base_class::BUILT_IN_INSERT, ROOT_CLASS),
            (base_class::SEALED_CRATE, ROOT_CLASS),
            (base_class::MONEY_HOLDER, ROOT_CLASS),
            ("class.mod", ROOT_CLASS),
            ("class.gear", ROOT_CLASS),
            ("class.provisions", ROOT_CLASS),
            ("class.barter", ROOT_CLASS),
            ("class.knife", ROOT_CLASS),
            ("class.headphones", "class.gear"),
            ("class.face_cover", "class.gear"),
            ("class.eyewear", "class.gear"),
            ("class.armband", "class.gear"),
        ]
        .into_iter()
        .map(|(id, parent)| class(id, parent)),
    );
    out
}

/// The demo item catalog.
pub fn catalog() -> InMemoryCatalog {
    let mut catalog: InMemoryCatalog = classes().into_iter().collect();

    // Weapons and their parts.
    let ak_slots = vec![
        slot("mod_magazine", false, &["mag_ak_30"], Some("mag_ak_30")),
        slot("mod_muzzle", false, &["brake_ak"], None),
        slot("mod_pistol_grip", true, &["grip_ak"], Some("grip_ak")),
    ];
    catalog.insert_priced(weapon("ak74", "AK-74", "5.45x39", 4, ak_slots), price(28_000));
    catalog.insert_priced(weapon("mp133", "MP-133", "12g", 4, Vec::new()), price(12_000));
    let pm_slots = vec![slot("mod_magazine", false, &["mag_pm_8"], Some("mag_pm_8"))];
    catalog.insert_priced(weapon("pm", "PM", "9x18", 2, pm_slots), price(7_000));
    catalog.insert_priced(magazine("mag_ak_30", "AK 30-round magazine", 2, 30, "ps545"), price(2_500));
    catalog.insert_priced(magazine("mag_pm_8", "PM 8-round magazine", 1, 8, "pst918"), price(800));
    catalog.insert_priced(item("brake_ak", "AK muzzle brake", "class.mod", 1, 1), price(1_500));
    catalog.insert_priced(item("grip_ak", "AK pistol grip", "class.mod", 1, 1), price(900));

    // Ammunition.
    catalog.insert_priced(ammo("ps545", "5.45x39 PS", "5.45x39", 60, 15), price(90));
    catalog.insert_priced(ammo("bp545", "5.45x39 BP", "5.45x39", 60, 10), price(350));
    catalog.insert_priced(ammo("buck12", "12/70 buckshot", "12g", 20, 5), price(60));
    catalog.insert_priced(ammo("pst918", "9x18 PSt", "9x18", 50, 10), price(40));
    let mut ammo_box = item("box_ps545", "PS ammo box", base_class::AMMO_BOX, 1, 1);
    ammo_box.stack_slots = vec![cartridges(120, "ps545")];
    catalog.insert_priced(ammo_box, price(9_000));

    // Money.
    catalog.insert_priced(stackable(item("roubles", "Roubles", base_class::MONEY, 1, 1), 500_000), price(1));
    catalog.insert_priced(stackable(item("dollars", "Dollars", base_class::MONEY, 1, 1), 50_000), price(120));
    let mut wallet = item("wallet", "Wallet", base_class::MONEY_HOLDER, 1, 1);
    wallet.grids = vec![grid("main", 2, 2)];
    catalog.insert_priced(wallet, price(3_000));

    // Provisions and medicine.
    catalog.insert_priced(item("tushonka", "Tushonka", base_class::FOOD, 1, 1), price(6_000));
    catalog.insert_priced(item("crackers", "Crackers", base_class::FOOD, 1, 1), price(2_000));
    catalog.insert_priced(item("water", "Water bottle", base_class::DRINK, 1, 2), price(5_000));
    catalog.insert_priced(item("juice", "Apple juice", base_class::DRINK, 1, 2), price(7_000));
    catalog.insert_priced(med("ai2", "AI-2 medkit", base_class::MEDS, 2), price(3_000));
    catalog.insert_priced(med("salewa", "Salewa", base_class::MEDS, 3), price(12_000));
    catalog.insert_priced(med("bandage", "Bandage", base_class::MEDS, 4), price(1_500));
    catalog.insert_priced(med("propital", "Propital", base_class::STIMULANT, 3), price(24_000));
    catalog.insert_priced(med("etg", "eTG-change", base_class::STIMULANT, 3), price(60_000));
    catalog.insert_priced(med("analgin", "Analgin", base_class::DRUGS, 2), price(5_000));

    // Throwables.
    for (id, name) in [("f1", "F-1 grenade"), ("rgd5", "RGD-5 grenade")] {
        let mut grenade = item(id, name, base_class::GRENADE, 1, 1);
        grenade.throw_type = Some(String::from("frag"));
        catalog.insert_priced(grenade, price(14_000));
    }

    // Barter.
    catalog.insert_priced(item("bolts", "Bolts", "class.barter", 1, 1), price(4_000));
    catalog.insert_priced(item("screws", "Screws", "class.barter", 1, 1), price(3_000));
    catalog.insert_priced(item("matches", "Matches", "class.barter", 1, 1), price(1_200));
    catalog.insert_priced(item("gpu", "Graphics card", "class.barter", 2, 1), price(250_000));
    catalog.insert_priced(item("golden_rooster", "Golden rooster", "class.barter", 2, 2), price(90_000));
    let mut flash_drive = item("flash_drive", "Secure flash drive", "class.barter", 1, 1);
    flash_drive.quest_item = true;
    catalog.insert(flash_drive);

    // Armor plates and inserts.
    catalog.insert_priced(armored(item("plate_lvl4", "Level 4 plate", base_class::ARMOR_PLATE, 2, 2), 4, 45), price(30_000));
    catalog.insert(armored(item("insert_paca", "PACA soft insert", base_class::BUILT_IN_INSERT, 1, 1), 2, 40));
    catalog.insert(armored(item("insert_6b13", "6B13 soft insert", base_class::BUILT_IN_INSERT, 1, 1), 3, 50));
    catalog.insert(armored(item("insert_6b5", "6B5 soft insert", base_class::BUILT_IN_INSERT, 1, 1), 3, 50));
    catalog.insert(armored(item("insert_ssh68", "SSh-68 top", base_class::BUILT_IN_INSERT, 1, 1), 2, 30));

    // Gear.
    let mut paca = armored(item("paca", "PACA vest", base_class::ARMOR, 3, 3), 2, 40);
    paca.slots = vec![slot("soft_armor_front", true, &["insert_paca"], Some("insert_paca"))];
    catalog.insert_priced(paca, price(22_000));
    let mut armor_6b13 = armored(item("armor_6b13", "6B13 assault armor", base_class::ARMOR, 3, 3), 4, 60);
    armor_6b13.slots = vec![
        slot("front_plate", false, &["plate_lvl4"], Some("plate_lvl4")),
        slot("soft_armor_front", true, &["insert_6b13"], Some("insert_6b13")),
    ];
    catalog.insert_priced(armor_6b13, price(70_000));

    let mut scav_vest = item("scav_vest", "Scav vest", base_class::VEST, 2, 2);
    scav_vest.grids = grids(4, 1, 2);
    catalog.insert_priced(scav_vest, price(8_000));
    let mut rig_6b5 = armored(item("rig_6b5", "6B5 armored rig", base_class::VEST, 3, 3), 3, 50);
    rig_6b5.grids = grids(4, 1, 2);
    rig_6b5.slots = vec![slot("soft_armor_front", true, &["insert_6b5"], Some("insert_6b5"))];
    catalog.insert_priced(rig_6b5, price(45_000));

    let mut ssh68 = armored(item("ssh68", "SSh-68 helmet", base_class::HEADWEAR, 2, 2), 2, 30);
    ssh68.slots = vec![slot("helmet_top", true, &["insert_ssh68"], Some("insert_ssh68"))];
    catalog.insert_priced(ssh68, price(9_000));
    let mut altyn = armored(item("altyn", "Altyn helmet", base_class::HEADWEAR, 2, 2), 5, 50);
    altyn.blocks_earpiece = true;
    altyn.blocks_face_cover = true;
    catalog.insert_priced(altyn, price(120_000));
    catalog.insert_priced(item("kolpak", "Kolpak", base_class::HEADWEAR, 2, 2), price(4_000));
    catalog.insert_priced(item("comtac2", "ComTac 2", "class.headphones", 2, 2), price(25_000));
    catalog.insert_priced(item("balaclava", "Balaclava", "class.face_cover", 1, 1), price(3_000));
    let mut glasses = item("glasses", "Round glasses", "class.eyewear", 1, 1);
    glasses.conflicting_items = vec![TemplateId::from("altyn")];
    catalog.insert_priced(glasses, price(1_000));
    catalog.insert_priced(item("armband_red", "Red armband", "class.armband", 1, 1), price(500));
    catalog.insert_priced(item("knife_6h5", "6H5 bayonet", "class.knife", 1, 2), price(6_000));

    let mut scav_bp = item("scav_bp", "Scav backpack", base_class::BACKPACK, 4, 5);
    scav_bp.grids = vec![grid("main", 4, 5)];
    catalog.insert_priced(scav_bp, price(10_000));
    let mut tri_zip = item("tri_zip", "Tri-Zip backpack", base_class::BACKPACK, 5, 6);
    tri_zip.grids = vec![grid("main", 6, 6)];
    catalog.insert_priced(tri_zip, price(40_000));

    let mut pockets = item("pockets", "Pockets", base_class::POCKETS, 1, 1);
    pockets.grids = grids(4, 1, 1);
    catalog.insert(pockets);
    let mut alpha = item("alpha", "Secure container Alpha", base_class::SECURE_CONTAINER, 2, 2);
    alpha.grids = vec![grid("main", 2, 2)];
    catalog.insert(alpha);
    let mut gamma = item("gamma", "Secure container Gamma", base_class::SECURE_CONTAINER, 3, 3);
    gamma.grids = vec![grid("main", 3, 3)];
    catalog.insert(gamma);

    catalog.insert(item("dogtag_usec", "USEC dog tag", base_class::DOGTAG, 1, 1));
    catalog.insert(item("dogtag_bear", "BEAR dog tag", base_class::DOGTAG, 1, 1));
    catalog.insert_priced(item("crate_weapon", "Sealed weapon crate", base_class::SEALED_CRATE, 5, 2), price(150_000));

    catalog
}

/// `(template, weight)` pairs as a weight map.
pub fn weights(entries: &[(&str, u32)]) -> WeightMap {
    entries
        .iter()
        .map(|&(tpl, weight)| (TemplateId::from(tpl), weight))
        .collect()
}

fn counts(entries: &[(u32, u32)]) -> CountWeights {
    CountWeights {
        weights: entries.iter().copied().collect(),
        whitelist: WeightMap::new(),
    }
}

fn common_role(role: &str, side: Side, level: MinMax) -> RoleTemplate {
    let mut t = RoleTemplate::new(role, side, level);
    let calibers = &mut t.inventory.ammo;
    calibers.insert(String::from("5.45x39"), weights(&[("ps545", 5), ("bp545", 1)]));
    calibers.insert(String::from("12g"), weights(&[("buck12", 1)]));
    calibers.insert(String::from("9x18"), weights(&[("pst918", 1)]));
    t.inventory.equipment.insert(EquipmentSlot::Pockets, weights(&[("pockets", 1)]));
    t.chances.weapon_mods.insert(String::from("mod_muzzle"), 40);
    t.generation.magazines = counts(&[(1, 2), (2, 5), (3, 2)]);
    t.skills.insert(String::from("Endurance"), MinMax::new(0, 1_000));
    t.skills.insert(String::from("Strength"), MinMax::new(0, 1_000));
    t.health.body_parts.insert(BodyPart::Head, MinMax::new(35, 40));
    t
}

/// Scavenger role.
pub fn assault() -> RoleTemplate {
    let mut t = common_role("assault", Side::Savage, MinMax::new(1, 20));
    let eq = &mut t.inventory.equipment;
    eq.insert(EquipmentSlot::FirstPrimaryWeapon, weights(&[("ak74", 3), ("mp133", 5)]));
    eq.insert(EquipmentSlot::SecondPrimaryWeapon, weights(&[("mp133", 1)]));
    eq.insert(EquipmentSlot::Holster, weights(&[("pm", 1)]));
    eq.insert(EquipmentSlot::Headwear, weights(&[("ssh68", 2), ("kolpak", 5)]));
    eq.insert(EquipmentSlot::FaceCover, weights(&[("balaclava", 1)]));
    eq.insert(EquipmentSlot::Eyewear, weights(&[("glasses", 1)]));
    eq.insert(EquipmentSlot::ArmorVest, weights(&[("paca", 1)]));
    eq.insert(EquipmentSlot::TacticalVest, weights(&[("scav_vest", 5), ("rig_6b5", 1)]));
    eq.insert(EquipmentSlot::Backpack, weights(&[("scav_bp", 1)]));
    eq.insert(EquipmentSlot::Scabbard, weights(&[("knife_6h5", 1)]));
    eq.insert(EquipmentSlot::SecuredContainer, weights(&[("alpha", 1)]));

    let chances = &mut t.chances.equipment;
    for (slot, chance) in [
        (EquipmentSlot::FirstPrimaryWeapon, 90),
        (EquipmentSlot::SecondPrimaryWeapon, 5),
        (EquipmentSlot::Holster, 20),
        (EquipmentSlot::Headwear, 60),
        (EquipmentSlot::Earpiece, 0),
        (EquipmentSlot::FaceCover, 30),
        (EquipmentSlot::Eyewear, 10),
        (EquipmentSlot::ArmBand, 0),
        (EquipmentSlot::ArmorVest, 25),
        (EquipmentSlot::TacticalVest, 90),
        (EquipmentSlot::Backpack, 50),
        (EquipmentSlot::Scabbard, 100),
    ] {
        chances.insert(slot, chance);
    }

    let items = &mut t.inventory.items;
    items.insert(ContainerKind::Backpack, weights(&[("bolts", 5), ("screws", 5), ("matches", 8), ("ai2", 2), ("ps545", 2), ("tushonka", 2)]));
    items.insert(ContainerKind::Pockets, weights(&[("matches", 5), ("roubles", 3), ("bandage", 2), ("crackers", 2)]));
    items.insert(ContainerKind::TacticalVest, weights(&[("matches", 2), ("f1", 1), ("ai2", 2), ("water", 1)]));
    items.insert(ContainerKind::SecuredContainer, weights(&[("ps545", 1)]));
    items.insert(ContainerKind::SpecialLoot, weights(&[("flash_drive", 1)]));

    let generation = &mut t.generation.items;
    generation.insert(LootCategory::Backpack, counts(&[(0, 2), (2, 5), (4, 2)]));
    generation.insert(LootCategory::Pocket, counts(&[(0, 3), (1, 5), (2, 2)]));
    generation.insert(LootCategory::Vest, counts(&[(0, 3), (1, 5)]));
    generation.insert(LootCategory::Healing, counts(&[(0, 3), (1, 2)]));
    generation.insert(LootCategory::Food, counts(&[(0, 3), (1, 1)]));
    generation.insert(LootCategory::Drink, counts(&[(0, 3), (1, 1)]));
    generation.insert(LootCategory::Currency, counts(&[(0, 2), (1, 3)]));
    generation.insert(LootCategory::Grenade, counts(&[(0, 5), (1, 1)]));
    generation.insert(LootCategory::Special, counts(&[(0, 9), (1, 1)]));

    t.appearance.head = weights(&[("head_scav_1", 1), ("head_scav_2", 1)]);
    t.appearance.body = weights(&[("body_scav", 1)]);
    t.appearance.voice = weights(&[("voice_scav_1", 2), ("voice_scav_2", 1)]);
    t.names = ["Vasya", "Kolya", "Borya", "Fedya", "Tolik"]
        .into_iter()
        .map(String::from)
        .collect();
    t
}

fn pmc(role: &str, side: Side) -> RoleTemplate {
    let mut t = common_role(role, side, MinMax::new(10, 50));
    let eq = &mut t.inventory.equipment;
    eq.insert(EquipmentSlot::FirstPrimaryWeapon, weights(&[("ak74", 1)]));
    eq.insert(EquipmentSlot::SecondPrimaryWeapon, weights(&[("mp133", 1)]));
    eq.insert(EquipmentSlot::Holster, weights(&[("pm", 1)]));
    eq.insert(EquipmentSlot::Headwear, weights(&[("ssh68", 3), ("altyn", 1)]));
    eq.insert(EquipmentSlot::Earpiece, weights(&[("comtac2", 1)]));
    eq.insert(EquipmentSlot::FaceCover, weights(&[("balaclava", 1)]));
    eq.insert(EquipmentSlot::ArmBand, weights(&[("armband_red", 1)]));
    eq.insert(EquipmentSlot::ArmorVest, weights(&[("paca", 2), ("armor_6b13", 1)]));
    eq.insert(EquipmentSlot::TacticalVest, weights(&[("scav_vest", 1), ("rig_6b5", 1)]));
    eq.insert(EquipmentSlot::Backpack, weights(&[("tri_zip", 1)]));
    eq.insert(EquipmentSlot::SecuredContainer, weights(&[("gamma", 1)]));

    let chances = &mut t.chances.equipment;
    for (slot, chance) in [
        (EquipmentSlot::FirstPrimaryWeapon, 100),
        (EquipmentSlot::SecondPrimaryWeapon, 10),
        (EquipmentSlot::Holster, 30),
        (EquipmentSlot::Headwear, 80),
        (EquipmentSlot::Earpiece, 70),
        (EquipmentSlot::FaceCover, 20),
        (EquipmentSlot::Eyewear, 0),
        (EquipmentSlot::ArmBand, 100),
        (EquipmentSlot::ArmorVest, 70),
        (EquipmentSlot::TacticalVest, 100),
        (EquipmentSlot::Backpack, 60),
        (EquipmentSlot::Scabbard, 0),
    ] {
        chances.insert(slot, chance);
    }

    let items = &mut t.inventory.items;
    items.insert(ContainerKind::Backpack, weights(&[("bolts", 1), ("gpu", 1), ("salewa", 2)]));
    items.insert(ContainerKind::Pockets, weights(&[("roubles", 1)]));
    items.insert(ContainerKind::TacticalVest, weights(&[("salewa", 1)]));
    items.insert(ContainerKind::SecuredContainer, weights(&[("ps545", 1), ("bp545", 1)]));

    let generation = &mut t.generation.items;
    generation.insert(LootCategory::Backpack, counts(&[(1, 2), (3, 5)]));
    generation.insert(LootCategory::Pocket, counts(&[(1, 1), (2, 1)]));
    generation.insert(LootCategory::Vest, counts(&[(1, 1)]));
    generation.insert(LootCategory::Healing, counts(&[(1, 3), (2, 1)]));
    generation.insert(LootCategory::Drugs, counts(&[(0, 1), (1, 1)]));
    generation.insert(LootCategory::Stimulant, counts(&[(0, 2), (1, 2), (2, 1)]));
    generation.insert(LootCategory::Grenade, counts(&[(1, 2), (2, 1)]));
    generation.insert(LootCategory::Currency, counts(&[(1, 1)]));
    generation.insert(LootCategory::Secure, counts(&[(1, 1)]));

    let prefix = if side == Side::Usec { "usec" } else { "bear" };
    let look = |part: &str| weights(&[(format!("{part}_{prefix}").as_str(), 1)]);
    t.appearance.head = look("head");
    t.appearance.body = look("body");
    t.appearance.feet = look("feet");
    t.appearance.hands = look("hands");
    t.appearance.voice = look("voice");
    t.names = ["Hawk", "Viper", "Ghost", "Wolf", "Raven", "Bishop"]
        .into_iter()
        .map(|name| format!("{name}_{prefix}"))
        .collect();
    t
}

/// USEC PMC role.
pub fn pmc_usec() -> RoleTemplate {
    pmc("pmc_usec", Side::Usec)
}

/// BEAR PMC role.
pub fn pmc_bear() -> RoleTemplate {
    pmc("pmc_bear", Side::Bear)
}

/// Every demo role.
pub fn roles() -> Vec<RoleTemplate> {
    vec![assault(), pmc_usec(), pmc_bear()]
}

/// Container pools shared by PMC roles.
pub fn pmc_loot() -> StaticPmcLoot {
    let mut pools = BTreeMap::new();
    pools.insert(ContainerKind::Backpack, weights(&[("gpu", 1), ("golden_rooster", 1), ("bolts", 4), ("box_ps545", 2), ("wallet", 2)]));
    pools.insert(ContainerKind::Pockets, weights(&[("wallet", 1), ("matches", 2), ("dollars", 1)]));
    pools.insert(ContainerKind::TacticalVest, weights(&[("matches", 1), ("screws", 1)]));
    StaticPmcLoot::new(pools)
}

fn preset(root_tpl: &str, parts: &[(&str, &str)]) -> Preset {
    let root = InventoryItem::new(ItemId::new(), TemplateId::from(root_tpl));
    let root_id = root.id;
    let mut items = vec![root];
    items.extend(
        parts
            .iter()
            .map(|&(slot, tpl)| InventoryItem::child_of(ItemId::new(), TemplateId::from(tpl), root_id, slot)),
    );
    Preset {
        name: format!("{root_tpl}_default"),
        root_tpl: TemplateId::from(root_tpl),
        is_default: true,
        items,
    }
}

/// Default presets for the demo weapons and armor.
pub fn presets() -> StaticPresets {
    [
        preset("ak74", &[("mod_magazine", "mag_ak_30"), ("mod_pistol_grip", "grip_ak")]),
        preset("mp133", &[]),
        preset("pm", &[("mod_magazine", "mag_pm_8")]),
        preset("paca", &[("soft_armor_front", "insert_paca")]),
        preset("armor_6b13", &[("front_plate", "plate_lvl4"), ("soft_armor_front", "insert_6b13")]),
        preset("rig_6b5", &[("soft_armor_front", "insert_6b5")]),
        preset("ssh68", &[("helmet_top", "insert_ssh68")]),
    ]
    .into_iter()
    .collect()
}
