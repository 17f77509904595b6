//! Enumeration types shared across the generator.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Equipment slots
// ---------------------------------------------------------------------------

/// A socket on the synthetic equipment root that worn gear occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Main long gun.
    FirstPrimaryWeapon,
    /// Second long gun, slung on the back.
    SecondPrimaryWeapon,
    /// Sidearm.
    Holster,
    /// Melee weapon.
    Scabbard,
    /// Helmets and hats.
    Headwear,
    /// Headsets.
    Earpiece,
    /// Masks and balaclavas.
    FaceCover,
    /// Glasses and goggles.
    Eyewear,
    /// Identification band.
    ArmBand,
    /// Body armor.
    ArmorVest,
    /// Chest rig, armored or not.
    TacticalVest,
    /// Backpack.
    Backpack,
    /// Trouser pockets. Always present.
    Pockets,
    /// Secure container. Always present.
    SecuredContainer,
    /// Side-specific identification tag.
    Dogtag,
}

impl EquipmentSlot {
    /// Every slot, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::FirstPrimaryWeapon,
        Self::SecondPrimaryWeapon,
        Self::Holster,
        Self::Scabbard,
        Self::Headwear,
        Self::Earpiece,
        Self::FaceCover,
        Self::Eyewear,
        Self::ArmBand,
        Self::ArmorVest,
        Self::TacticalVest,
        Self::Backpack,
        Self::Pockets,
        Self::SecuredContainer,
        Self::Dogtag,
    ];

    /// The slot id written into [`InventoryItem::slot_id`](crate::InventoryItem::slot_id).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstPrimaryWeapon => "FirstPrimaryWeapon",
            Self::SecondPrimaryWeapon => "SecondPrimaryWeapon",
            Self::Holster => "Holster",
            Self::Scabbard => "Scabbard",
            Self::Headwear => "Headwear",
            Self::Earpiece => "Earpiece",
            Self::FaceCover => "FaceCover",
            Self::Eyewear => "Eyewear",
            Self::ArmBand => "ArmBand",
            Self::ArmorVest => "ArmorVest",
            Self::TacticalVest => "TacticalVest",
            Self::Backpack => "Backpack",
            Self::Pockets => "Pockets",
            Self::SecuredContainer => "SecuredContainer",
            Self::Dogtag => "Dogtag",
        }
    }

    /// Whether this slot holds a firearm handled by the weapon assembler.
    pub const fn is_weapon(self) -> bool {
        matches!(
            self,
            Self::FirstPrimaryWeapon | Self::SecondPrimaryWeapon | Self::Holster
        )
    }

    /// Whether this slot always spawns regardless of configured chance.
    pub const fn always_spawns(self) -> bool {
        matches!(self, Self::Pockets | Self::SecuredContainer)
    }
}

impl core::fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw container pools
// ---------------------------------------------------------------------------

/// Keys of the raw per-container item pools in a role template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Items that may appear in the backpack.
    Backpack,
    /// Items that may appear in pockets.
    Pockets,
    /// Items that may appear in the tactical vest.
    TacticalVest,
    /// Items that may appear in the secure container.
    SecuredContainer,
    /// Role-specific special loot.
    SpecialLoot,
}

// ---------------------------------------------------------------------------
// Loot categories
// ---------------------------------------------------------------------------

/// A named, derived pool kept per role in the loot cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootCategory {
    /// Role-specific special loot.
    Special,
    /// Generic backpack filler.
    Backpack,
    /// Generic pocket filler.
    Pocket,
    /// Generic vest filler.
    Vest,
    /// Secure container contents.
    Secure,
    /// Medical items that are neither stimulants nor drugs.
    Healing,
    /// Painkillers and similar.
    Drugs,
    /// Edible items.
    Food,
    /// Drinkable items.
    Drink,
    /// Money.
    Currency,
    /// Injectors.
    Stimulant,
    /// Throwables.
    Grenade,
}

impl LootCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Special,
        Self::Backpack,
        Self::Pocket,
        Self::Vest,
        Self::Secure,
        Self::Healing,
        Self::Drugs,
        Self::Food,
        Self::Drink,
        Self::Currency,
        Self::Stimulant,
        Self::Grenade,
    ];
}

impl core::fmt::Display for LootCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Special => "special",
            Self::Backpack => "backpack",
            Self::Pocket => "pocket",
            Self::Vest => "vest",
            Self::Secure => "secure",
            Self::Healing => "healing",
            Self::Drugs => "drugs",
            Self::Food => "food",
            Self::Drink => "drink",
            Self::Currency => "currency",
            Self::Stimulant => "stimulant",
            Self::Grenade => "grenade",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Agent attributes
// ---------------------------------------------------------------------------

/// Faction an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Contractor faction A.
    Usec,
    /// Contractor faction B.
    Bear,
    /// Local scavengers and bosses.
    Savage,
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Usec => f.write_str("Usec"),
            Self::Bear => f.write_str("Bear"),
            Self::Savage => f.write_str("Savage"),
        }
    }
}

/// Body parts with independent health pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    /// Head.
    Head,
    /// Thorax.
    Chest,
    /// Stomach.
    Stomach,
    /// Left arm.
    LeftArm,
    /// Right arm.
    RightArm,
    /// Left leg.
    LeftLeg,
    /// Right leg.
    RightLeg,
}

impl BodyPart {
    /// Every body part.
    pub const ALL: [Self; 7] = [
        Self::Head,
        Self::Chest,
        Self::Stomach,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];
}

/// AI difficulty requested by the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Normal.
    #[default]
    Normal,
    /// Hard.
    Hard,
    /// Impossible.
    Impossible,
}
