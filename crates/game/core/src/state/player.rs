//! Mutable player state and its invariant helpers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::env::ItemOracle;
use crate::state::ItemId;

/// Equipment slots a player can fill.
///
/// Slot membership is decided by the item's [`crate::env::ItemKind`]; an
/// equipment map entry must only ever reference an item whose kind maps to
/// that slot.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Shield,
    Accessory,
    Aura,
}

/// Combat stats after gear and temporary bonuses are applied.
///
/// Floors match the base-stat floors: effective attack and max HP never drop
/// below 1, defense never below 0, regardless of negative gear bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectiveStats {
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
}

/// All mutable player state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub base_max_hp: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub hp: i32,
    pub xp: i32,
    pub level: u32,
    pub skill_points: u32,
    pub gold: i32,
    /// Item id -> owned count. Entries are removed when the count hits zero,
    /// so every stored count is >= 1.
    pub inventory: BTreeMap<ItemId, u32>,
    pub equipment: BTreeMap<EquipSlot, Option<ItemId>>,
    pub skills: BTreeSet<String>,
    /// Per-skill remaining cooldown turns.
    pub cooldowns: BTreeMap<String, u32>,
    pub titles: Vec<String>,
    /// Transient stat adjustments keyed by stat name (`attack`, `defense`,
    /// `max_hp`), e.g. the ring surge.
    pub temporary_bonuses: BTreeMap<String, i32>,
}

impl Player {
    /// Effective combat stats: base + equipped item bonuses + temporary
    /// bonuses. Unknown equipped item ids contribute nothing.
    pub fn effective_stats(&self, items: &dyn ItemOracle) -> EffectiveStats {
        let mut attack = self.base_attack;
        let mut defense = self.base_defense;
        let mut max_hp = self.base_max_hp;

        for item_id in self.equipment.values().flatten() {
            if let Some(item) = items.item(item_id) {
                attack += item.attack_bonus;
                defense += item.defense_bonus;
                max_hp += item.max_hp_bonus;
            }
        }

        attack += self.temporary_bonuses.get("attack").copied().unwrap_or(0);
        defense += self.temporary_bonuses.get("defense").copied().unwrap_or(0);
        max_hp += self.temporary_bonuses.get("max_hp").copied().unwrap_or(0);

        EffectiveStats {
            max_hp: max_hp.max(1),
            attack: attack.max(1),
            defense: defense.max(0),
        }
    }

    /// Clamp hp into `[0, effective max hp]`.
    pub fn clamp_hp(&mut self, items: &dyn ItemOracle) {
        let max_hp = self.effective_stats(items).max_hp;
        self.hp = self.hp.clamp(0, max_hp);
    }

    /// Heal and return the amount actually restored.
    pub fn heal(&mut self, amount: i32, items: &dyn ItemOracle) -> i32 {
        let before = self.hp;
        self.hp += amount.max(0);
        self.clamp_hp(items);
        self.hp - before
    }

    /// Current hp as a fraction of effective max hp, in `[0.0, 1.0]`.
    pub fn hp_ratio(&self, items: &dyn ItemOracle) -> f32 {
        let max_hp = self.effective_stats(items).max_hp.max(1);
        (self.hp.max(0) as f32 / max_hp as f32).min(1.0)
    }

    pub fn add_item(&mut self, item_id: ItemId, qty: u32) {
        if qty == 0 {
            return;
        }
        *self.inventory.entry(item_id).or_insert(0) += qty;
    }

    /// Remove `qty` of an item if owned; returns false (unchanged) otherwise.
    pub fn remove_item(&mut self, item_id: &ItemId, qty: u32) -> bool {
        if qty == 0 {
            return true;
        }
        let Some(owned) = self.inventory.get_mut(item_id) else {
            return false;
        };
        if *owned < qty {
            return false;
        }
        *owned -= qty;
        if *owned == 0 {
            self.inventory.remove(item_id);
        }
        true
    }

    pub fn has_item(&self, item_id: &ItemId) -> bool {
        self.inventory.contains_key(item_id)
    }

    /// Currently equipped item in a slot, if any.
    pub fn equipped(&self, slot: EquipSlot) -> Option<&ItemId> {
        self.equipment.get(&slot).and_then(|id| id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ItemDefinition, ItemKind};

    struct FixedItems(Vec<ItemDefinition>);

    impl ItemOracle for FixedItems {
        fn item(&self, id: &ItemId) -> Option<ItemDefinition> {
            self.0.iter().find(|def| &def.id == id).cloned()
        }

        fn all_items(&self) -> Vec<ItemDefinition> {
            self.0.clone()
        }
    }

    fn sword() -> ItemDefinition {
        ItemDefinition {
            id: ItemId::from("test_sword"),
            name: "Test Sword".to_string(),
            kind: ItemKind::Weapon,
            description: String::new(),
            attack_bonus: 4,
            defense_bonus: 0,
            max_hp_bonus: 0,
            heal_amount: 0,
            skill_points_bonus: 0,
            value: 10,
            rare: false,
        }
    }

    fn player_with_sword() -> Player {
        let mut player = Player {
            name: "Tester".to_string(),
            base_max_hp: 50,
            base_attack: 8,
            base_defense: 5,
            hp: 50,
            xp: 0,
            level: 1,
            skill_points: 0,
            gold: 0,
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
            skills: BTreeSet::new(),
            cooldowns: BTreeMap::new(),
            titles: Vec::new(),
            temporary_bonuses: BTreeMap::new(),
        };
        player
            .equipment
            .insert(EquipSlot::Weapon, Some(ItemId::from("test_sword")));
        player
    }

    #[test]
    fn effective_stats_add_gear_and_temporary_bonuses() {
        let items = FixedItems(vec![sword()]);
        let mut player = player_with_sword();
        player.temporary_bonuses.insert("defense".to_string(), 2);

        let stats = player.effective_stats(&items);
        assert_eq!(stats.attack, 12);
        assert_eq!(stats.defense, 7);
        assert_eq!(stats.max_hp, 50);
    }

    #[test]
    fn effective_stats_floor_at_minimums() {
        let items = FixedItems(vec![sword()]);
        let mut player = player_with_sword();
        player.temporary_bonuses.insert("attack".to_string(), -100);
        player.temporary_bonuses.insert("defense".to_string(), -100);
        player.temporary_bonuses.insert("max_hp".to_string(), -100);

        let stats = player.effective_stats(&items);
        assert_eq!(stats.attack, 1);
        assert_eq!(stats.defense, 0);
        assert_eq!(stats.max_hp, 1);
    }

    #[test]
    fn heal_clamps_to_effective_max() {
        let items = FixedItems(vec![sword()]);
        let mut player = player_with_sword();
        player.hp = 45;

        let restored = player.heal(100, &items);
        assert_eq!(restored, 5);
        assert_eq!(player.hp, 50);
    }

    #[test]
    fn remove_item_drops_empty_entries() {
        let items_id = ItemId::from("test_sword");
        let mut player = player_with_sword();
        player.add_item(items_id.clone(), 2);

        assert!(player.remove_item(&items_id, 2));
        assert!(!player.has_item(&items_id));
        assert!(!player.remove_item(&items_id, 1));
    }
}
