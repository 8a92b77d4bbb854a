//! Recommendation engine: priority scoring and hint derivation.
//!
//! Two cooperating algorithms over the same action list. Scoring assigns
//! every action an integer priority via an ordered rule table
//! ([`score::rank_actions`]); hint derivation builds a short ordered list of
//! recommended commands with human-readable reasons
//! ([`hints::derive_hints`]). Both branch the same way on the encounter
//! state machine (no encounter, combat, barrier, negotiation), so a hinted
//! action also carries a high priority.

pub mod hints;
pub mod score;

use game_core::{
    EquipSlot, GameEnv, ItemDefinition, ItemId, ItemKind, ItemOracle as _, RecommendParams,
    RecommendedStep, SessionState, SpecialPhase, TablesOracle as _,
};

pub use hints::derive_hints;
pub use score::rank_actions;

/// Items with one-time, context-gated effects and the barrier breaker.
pub(crate) const CRUSTY_KEY: &str = "crusty_key";
pub(crate) const VIAL_OF_TEARS: &str = "vial_of_tears";
pub(crate) const HOARD_TREASURE: &str = "hoard_treasure";
pub(crate) const GOBLIN_RIDDLE: &str = "goblin_riddle";
pub(crate) const MYSTERIOUS_RING: &str = "mysterious_ring";

/// An owned item strictly better than the currently equipped one.
#[derive(Clone, Debug)]
pub struct UpgradeCandidate {
    pub item_id: ItemId,
    pub name: String,
    pub slot: EquipSlot,
    pub value: i32,
}

/// Precomputed inputs shared by scoring and hint derivation.
pub struct RecommendContext<'a> {
    pub state: &'a SessionState,
    pub env: &'a dyn GameEnv,
    pub params: RecommendParams,
    pub step: RecommendedStep,
    pub hp_ratio: f32,
    pub upgrades: Vec<UpgradeCandidate>,
    /// Healing consumables held, strongest first.
    pub heal_items: Vec<ItemDefinition>,
    pub has_riddle: bool,
}

impl<'a> RecommendContext<'a> {
    pub fn new(state: &'a SessionState, env: &'a dyn GameEnv, step: RecommendedStep) -> Self {
        let params = env.tables().recommend();
        let hp_ratio = state.player.hp_ratio(env.items());

        let mut heal_items: Vec<ItemDefinition> = state
            .player
            .inventory
            .keys()
            .filter_map(|item_id| env.items().item(item_id))
            .filter(|def| def.kind == ItemKind::Consumable && def.heal_amount > 0)
            .collect();
        heal_items.sort_by(|a, b| b.heal_amount.cmp(&a.heal_amount).then(a.name.cmp(&b.name)));

        let has_riddle = state.player.has_item(&ItemId::from(GOBLIN_RIDDLE));

        Self {
            state,
            env,
            params,
            step,
            hp_ratio,
            upgrades: find_upgrades(state, env),
            heal_items,
            has_riddle,
        }
    }

    pub fn in_negotiation(&self) -> bool {
        self.state
            .encounter
            .as_ref()
            .is_some_and(|enc| enc.special_phase == SpecialPhase::Negotiation)
    }

    pub fn barrier_active(&self) -> bool {
        self.state
            .encounter
            .as_ref()
            .is_some_and(|enc| enc.barrier_active)
    }

    /// Resolve an action argument against the item catalog by display name
    /// or id.
    pub fn argument_item(&self, argument: &str) -> Option<ItemDefinition> {
        let needle = argument.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.env.items().all_items().into_iter().find(|def| {
            def.name.to_lowercase() == needle
                || def.id.as_str() == needle
                || def.id.as_str().replace('_', " ") == needle
        })
    }

    /// One-time quest items are only worth surfacing when their context
    /// condition currently holds.
    pub fn quest_item_ready(&self, item_id: &ItemId) -> bool {
        let state = self.state;
        let at = |location: &str| state.location_id.as_str() == location;
        match item_id.as_str() {
            CRUSTY_KEY => {
                at("witch_terrace")
                    && state.has_flag("onyx_witch_defeated")
                    && !state.has_flag("elle_freed")
            }
            VIAL_OF_TEARS => {
                at("witch_terrace")
                    && state.has_flag("elle_freed")
                    && !state.has_flag("elle_cleansed")
            }
            HOARD_TREASURE => at("old_shack") && !state.has_flag("hoard_delivered"),
            _ => false,
        }
    }
}

/// Comparable power tuple for best-in-slot decisions.
///
/// Max HP is folded into the leading component at the 3-HP-per-point
/// training convention; market value is the final tie-break.
fn power_tuple(item: Option<&ItemDefinition>) -> (i32, i32, i32, i32, i32) {
    match item {
        None => (i32::MIN, i32::MIN, i32::MIN, i32::MIN, i32::MIN),
        Some(def) => (
            def.attack_bonus * 3 + def.defense_bonus * 3 + def.max_hp_bonus,
            def.attack_bonus,
            def.defense_bonus,
            def.max_hp_bonus,
            def.value,
        ),
    }
}

fn find_upgrades(state: &SessionState, env: &dyn GameEnv) -> Vec<UpgradeCandidate> {
    let mut upgrades = Vec::new();

    for item_id in state.player.inventory.keys() {
        let Some(def) = env.items().item(item_id) else {
            continue;
        };
        let Some(slot) = def.equip_slot() else {
            continue;
        };

        let equipped = state
            .player
            .equipped(slot)
            .and_then(|id| env.items().item(id));
        if power_tuple(Some(&def)) > power_tuple(equipped.as_ref()) {
            upgrades.push(UpgradeCandidate {
                item_id: def.id.clone(),
                name: def.name.clone(),
                slot,
                value: def.value,
            });
        }
    }

    upgrades.sort_by(|a, b| b.value.cmp(&a.value).then(a.name.cmp(&b.name)));
    upgrades
}

#[cfg(test)]
pub(crate) mod test_support {
    use game_core::{GameEnv, NewGameSpec, SessionState, TablesOracle as _};

    use crate::oracle::OracleManager;

    pub fn env() -> OracleManager {
        OracleManager::from_bundle(game_content::ContentBundle::builtin().unwrap())
    }

    pub fn fresh_state(env: &OracleManager) -> SessionState {
        let spec: NewGameSpec = env.tables().new_game();
        SessionState::new_game(&spec, 1)
    }
}

#[cfg(test)]
mod tests {
    use game_core::RecommendedStep;

    use super::*;
    use test_support::{env, fresh_state};

    #[test]
    fn upgrade_detection_uses_strict_power_ordering() {
        let env = env();
        let mut state = fresh_state(&env);

        // Crusty sword (+4 atk) strictly beats the rusted blade (+1 atk).
        state.player.add_item(ItemId::from("crusty_sword"), 1);
        // A second rusted blade equals the equipped one: not an upgrade.
        state.player.add_item(ItemId::from("rusted_blade"), 1);

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        assert_eq!(ctx.upgrades.len(), 1);
        assert_eq!(ctx.upgrades[0].item_id.as_str(), "crusty_sword");
        assert_eq!(ctx.upgrades[0].slot, EquipSlot::Weapon);
    }

    #[test]
    fn heal_items_sorted_strongest_first() {
        let env = env();
        let state = fresh_state(&env);

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let heals: Vec<&str> = ctx
            .heal_items
            .iter()
            .map(|def| def.id.as_str())
            .collect();
        assert_eq!(heals, vec!["minor_potion", "sturdy_bandage"]);
    }

    #[test]
    fn quest_items_gate_on_location_and_flags() {
        let env = env();
        let mut state = fresh_state(&env);
        state.player.add_item(ItemId::from(CRUSTY_KEY), 1);

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        assert!(!ctx.quest_item_ready(&ItemId::from(CRUSTY_KEY)));

        state.location_id = "witch_terrace".into();
        state.set_flag("onyx_witch_defeated");
        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        assert!(ctx.quest_item_ready(&ItemId::from(CRUSTY_KEY)));

        state.set_flag("elle_freed");
        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        assert!(!ctx.quest_item_ready(&ItemId::from(CRUSTY_KEY)));
        assert!(ctx.quest_item_ready(&ItemId::from(VIAL_OF_TEARS)));
    }

    #[test]
    fn argument_item_resolves_names_and_ids() {
        let env = env();
        let state = fresh_state(&env);
        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());

        assert_eq!(
            ctx.argument_item("minor potion").map(|d| d.id),
            Some(ItemId::from("minor_potion"))
        );
        assert_eq!(
            ctx.argument_item("Goblin Riddle").map(|d| d.id),
            Some(ItemId::from("goblin_riddle"))
        );
        assert!(ctx.argument_item("all").is_none());
    }
}
