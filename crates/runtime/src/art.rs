//! Scene art selector: edge-triggered display asset choice.
//!
//! Art changes only on meaningful scene transitions: the first turn of a
//! new encounter, a `talk` that resolves against a visible NPC, or movement
//! onto a newly discovered location. Every other turn retains the previous
//! selection. Ids without a catalog asset fall back to small synthesized
//! category placeholders instead of failing.

use serde::{Deserialize, Serialize};

use game_core::{
    ArtAsset, ArtBody, ArtKey, EnemyCategory, EnemyOracle as _, GameEnv, LocationOracle as _,
    NpcOracle as _, SceneArtOracle as _, SessionState,
};

const GENERIC_CREATURE: &str = r#" /\_/\
( o.o )
 > ^ <"#;

const GENERIC_BOSS: &str = r#"  /\ /\
 ( O_O )
 /|---|\
  |___|"#;

const GENERIC_LOCATION: &str = r#" _______
/       \
| ? ? ? |
\_______/"#;

const GENERIC_FIGURE: &str = r#"   O
  /|\
  / \"#;

/// The current display asset handed to the presentation shell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtSelection {
    pub title: String,
    pub body: ArtBody,
}

impl From<ArtAsset> for ArtSelection {
    fn from(asset: ArtAsset) -> Self {
        Self {
            title: asset.title,
            body: asset.body,
        }
    }
}

/// Chooses and retains scene art across turns.
pub struct ArtSelector {
    current: ArtSelection,
}

impl ArtSelector {
    /// Initial selection: art for the session's current location.
    pub fn new(state: &SessionState, env: &dyn GameEnv) -> Self {
        Self {
            current: location_art(state, env),
        }
    }

    pub fn current(&self) -> &ArtSelection {
        &self.current
    }

    /// Re-key the selection after a snapshot restore or reset.
    pub fn rekey(&mut self, state: &SessionState, env: &dyn GameEnv) {
        self.current = match &state.encounter {
            Some(encounter) => enemy_art(&encounter.enemy_id, env),
            None => location_art(state, env),
        };
    }

    /// Observe one committed turn and update on transition edges only.
    ///
    /// Trigger precedence when several edges fire in one turn: a newly
    /// started encounter dominates, then an addressed NPC, then a newly
    /// discovered location.
    pub fn on_turn(
        &mut self,
        prev: &SessionState,
        current: &SessionState,
        command: &str,
        env: &dyn GameEnv,
    ) {
        let prev_enemy = prev.encounter.as_ref().map(|enc| &enc.enemy_id);
        let current_enemy = current.encounter.as_ref().map(|enc| &enc.enemy_id);

        if let Some(enemy_id) = current_enemy
            && prev_enemy != current_enemy
        {
            self.current = enemy_art(enemy_id, env);
            return;
        }

        if let Some(npc_art_selection) = talked_npc_art(current, command, env) {
            self.current = npc_art_selection;
            return;
        }

        if current.location_id != prev.location_id
            && !prev.discovered.contains(&current.location_id)
        {
            self.current = location_art(current, env);
        }
    }
}

fn enemy_art(enemy_id: &game_core::EnemyId, env: &dyn GameEnv) -> ArtSelection {
    if let Some(asset) = env.art().art(&ArtKey::Enemy(enemy_id.clone())) {
        return asset.into();
    }

    let enemy = env.enemies().enemy(enemy_id);
    let (title, glyph) = match &enemy {
        Some(def) if def.category != EnemyCategory::Normal => (def.name.clone(), GENERIC_BOSS),
        Some(def) => (def.name.clone(), GENERIC_CREATURE),
        None => (enemy_id.to_string(), GENERIC_CREATURE),
    };

    ArtSelection {
        title,
        body: ArtBody::Ascii(glyph.to_string()),
    }
}

/// Resolve a `talk <name>` command against the NPCs visible at the current
/// location.
fn talked_npc_art(state: &SessionState, command: &str, env: &dyn GameEnv) -> Option<ArtSelection> {
    let rest = command.trim().to_lowercase();
    let name = rest.strip_prefix("talk")?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let location = env.locations().location(&state.location_id)?;
    let npc = location
        .npcs
        .iter()
        .filter_map(|npc_id| env.npcs().npc(npc_id))
        .filter(|npc| {
            npc.visible_flag
                .as_deref()
                .is_none_or(|flag| state.has_flag(flag))
        })
        .find(|npc| npc.name.to_lowercase() == name)?;

    if let Some(asset) = env.art().art(&ArtKey::Npc(npc.id.clone())) {
        return Some(asset.into());
    }

    Some(ArtSelection {
        title: npc.name,
        body: ArtBody::Ascii(GENERIC_FIGURE.to_string()),
    })
}

fn location_art(state: &SessionState, env: &dyn GameEnv) -> ArtSelection {
    if let Some(asset) = env.art().art(&ArtKey::Location(state.location_id.clone())) {
        return asset.into();
    }

    let title = env
        .locations()
        .location(&state.location_id)
        .map(|def| def.name)
        .unwrap_or_else(|| state.location_id.to_string());

    ArtSelection {
        title,
        body: ArtBody::Ascii(GENERIC_LOCATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use game_core::{Encounter, TablesOracle as _};

    use super::*;
    use crate::oracle::OracleManager;

    fn env() -> OracleManager {
        OracleManager::from_bundle(game_content::ContentBundle::builtin().unwrap())
    }

    fn fresh_state(env: &OracleManager) -> SessionState {
        SessionState::new_game(&env.tables().new_game(), 1)
    }

    #[test]
    fn initial_selection_is_start_location_art() {
        let env = env();
        let state = fresh_state(&env);
        let selector = ArtSelector::new(&state, &env);
        assert_eq!(selector.current().title, "Old Shack");
    }

    #[test]
    fn encounter_start_is_edge_triggered() {
        let env = env();
        let mut selector = ArtSelector::new(&fresh_state(&env), &env);

        let before = fresh_state(&env);
        let mut fighting = fresh_state(&env);
        fighting.encounter = Some(Encounter::new("giant_frog".into(), 85));

        selector.on_turn(&before, &fighting, "hunt", &env);
        assert_eq!(selector.current().title, "Giant Frog, Prince of the Swamp");

        // Later combat turns must not re-fire the selection.
        let mut mid_fight = fighting.clone();
        mid_fight.encounter.as_mut().unwrap().enemy_hp = 40;
        selector.on_turn(&fighting, &mid_fight, "fight", &env);
        assert_eq!(selector.current().title, "Giant Frog, Prince of the Swamp");
    }

    #[test]
    fn unknown_enemy_gets_generic_placeholder() {
        let env = env();
        let mut selector = ArtSelector::new(&fresh_state(&env), &env);

        let before = fresh_state(&env);
        let mut fighting = fresh_state(&env);
        fighting.encounter = Some(Encounter::new("mystery_beast".into(), 10));

        selector.on_turn(&before, &fighting, "hunt", &env);
        let selection = selector.current().clone();
        assert_eq!(selection.title, "mystery_beast");
        assert!(matches!(selection.body, ArtBody::Ascii(_)));
    }

    #[test]
    fn talk_selects_visible_npc_art_only() {
        let env = env();
        let state = fresh_state(&env);
        let mut selector = ArtSelector::new(&state, &env);

        selector.on_turn(&state.clone(), &state, "talk wise old man", &env);
        assert_eq!(selector.current().title, "Wise Old Man");

        // Elle is flag-gated on the terrace and must not resolve yet.
        let mut terrace = fresh_state(&env);
        terrace.location_id = "witch_terrace".into();
        let mut selector = ArtSelector::new(&terrace, &env);
        let before_title = selector.current().title.clone();
        selector.on_turn(&terrace.clone(), &terrace, "talk elle", &env);
        assert_eq!(selector.current().title, before_title);
    }

    #[test]
    fn movement_fires_only_on_first_visit() {
        let env = env();
        let mut selector = ArtSelector::new(&fresh_state(&env), &env);

        let before = fresh_state(&env);
        let mut moved = fresh_state(&env);
        moved.location_id = "forest".into();
        moved.discover("forest".into());

        selector.on_turn(&before, &moved, "move east", &env);
        assert_eq!(selector.current().title, "Forest");

        // Returning to a known location keeps the current art.
        let back = moved.clone();
        let mut returned = moved.clone();
        returned.location_id = "old_shack".into();
        selector.on_turn(&back, &returned, "move west", &env);
        assert_eq!(selector.current().title, "Forest");
    }
}
