//! Item catalog oracle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::state::{EquipSlot, ItemId};

pub trait ItemOracle: Send + Sync {
    fn item(&self, id: &ItemId) -> Option<ItemDefinition>;

    /// Returns all item definitions available in this oracle.
    /// Used for building the display name indexes once at startup.
    fn all_items(&self) -> Vec<ItemDefinition>;
}

/// Broad item classification.
///
/// Equippable kinds map one-to-one onto equipment slots; everything else is
/// either consumed (`Consumable`, `Boon`) or context-gated (`Key`, `Quest`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Shield,
    Accessory,
    Aura,
    Consumable,
    Key,
    Quest,
    Boon,
}

impl ItemKind {
    /// Slot this kind equips into, if equippable.
    pub fn equip_slot(self) -> Option<EquipSlot> {
        match self {
            ItemKind::Weapon => Some(EquipSlot::Weapon),
            ItemKind::Armor => Some(EquipSlot::Armor),
            ItemKind::Shield => Some(EquipSlot::Shield),
            ItemKind::Accessory => Some(EquipSlot::Accessory),
            ItemKind::Aura => Some(EquipSlot::Aura),
            _ => None,
        }
    }
}

/// Item definition with flat stat bonuses.
///
/// Bonuses default to zero so catalog entries only spell out the fields they
/// use. `rare` marks items presented as rare/important rewards on top of the
/// kinds (`Key`, `Quest`, `Boon`) that always are.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub defense_bonus: i32,
    #[serde(default)]
    pub max_hp_bonus: i32,
    #[serde(default)]
    pub heal_amount: i32,
    #[serde(default)]
    pub skill_points_bonus: i32,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub rare: bool,
}

impl ItemDefinition {
    pub fn equip_slot(&self) -> Option<EquipSlot> {
        self.kind.equip_slot()
    }

    /// Rare-or-important presentation class (the purple tier).
    pub fn is_notable(&self) -> bool {
        self.rare || matches!(self.kind, ItemKind::Key | ItemKind::Quest | ItemKind::Boon)
    }
}
