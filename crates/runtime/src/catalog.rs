//! Action catalog builder: engine hint lines to classified actions.
//!
//! The rule engine describes what the player can do as plain text lines
//! (`"<command>: <description>"` under a heading). This module parses those
//! lines into [`Action`] records, assigns each a category from an explicit
//! verb table (with one contextual override), and colors arguments against
//! name indexes built once from the content catalogs. The builder is total:
//! malformed lines are skipped with a warning, never surfaced.

use std::collections::BTreeSet;

use game_core::{
    EnemyCategory, EnemyOracle as _, GameEnv, ItemOracle as _, NpcOracle as _, SessionState,
};

use crate::ansi::TextStyle;
use crate::api::{Action, ActionCategory};

/// Combat skill and training vocabulary colored as skill terms.
const SKILL_TERMS: &[&str] = &[
    "attack",
    "defense",
    "health",
    "focus strike",
    "guard stance",
    "second wind",
];

/// Verb -> base category table.
///
/// One explicit mapping instead of string probing: anything not listed is a
/// general player action. `use`/`read` are overridden to Combat while an
/// encounter is active (combat-relevant item use).
const VERB_CATEGORIES: &[(&str, ActionCategory)] = &[
    ("move", ActionCategory::Movement),
    ("hunt", ActionCategory::Movement),
    ("fight", ActionCategory::Combat),
    ("defend", ActionCategory::Combat),
    ("skill", ActionCategory::Combat),
    ("run", ActionCategory::Combat),
    ("joke", ActionCategory::Combat),
    ("bribe", ActionCategory::Combat),
    ("talk", ActionCategory::Quest),
    ("quest", ActionCategory::Quest),
];

/// Verbs whose argument names an item.
const ITEM_VERBS: &[&str] = &["use", "read", "equip"];

/// Item-use verbs reclassified as combat while an encounter is active.
const ITEM_USE_VERBS: &[&str] = &["use", "read"];

fn base_category(verb: &str) -> ActionCategory {
    VERB_CATEGORIES
        .iter()
        .find(|(known, _)| *known == verb)
        .map(|(_, category)| *category)
        .unwrap_or(ActionCategory::Player)
}

/// Category for a verb under the given state.
pub fn categorize(verb: &str, in_encounter: bool) -> ActionCategory {
    if in_encounter && ITEM_USE_VERBS.contains(&verb) {
        return ActionCategory::Combat;
    }
    base_category(verb)
}

/// Lowercased display-name indexes built once from the content catalogs.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    npcs: BTreeSet<String>,
    normal_enemies: BTreeSet<String>,
    bosses: BTreeSet<String>,
    end_bosses: BTreeSet<String>,
    notable_items: BTreeSet<String>,
    common_items: BTreeSet<String>,
    skills: BTreeSet<String>,
}

impl NameIndex {
    pub fn from_env(env: &dyn GameEnv) -> Self {
        let mut index = Self {
            skills: SKILL_TERMS.iter().map(|term| term.to_string()).collect(),
            ..Self::default()
        };

        for npc in env.npcs().all_npcs() {
            index.npcs.insert(npc.name.to_lowercase());
        }

        for enemy in env.enemies().all_enemies() {
            let name = enemy.name.to_lowercase();
            match enemy.category {
                EnemyCategory::Normal => index.normal_enemies.insert(name),
                EnemyCategory::Boss => index.bosses.insert(name),
                EnemyCategory::EndBoss => index.end_bosses.insert(name),
            };
        }

        for item in env.items().all_items() {
            let entry = if item.is_notable() {
                &mut index.notable_items
            } else {
                &mut index.common_items
            };
            entry.insert(item.name.to_lowercase());
            entry.insert(item.id.as_str().replace('_', " "));
        }

        index
    }

    /// Color tag for an action argument.
    ///
    /// Lookup order is verb-sensitive: under `talk` the NPC index is
    /// preferred, under `fight`/`hunt` the enemy indexes, under item verbs
    /// the item indexes, under `skill`/`train` the skill terms; the general
    /// precedence (danger tiers, then NPCs, skills, items) resolves what is
    /// left.
    pub fn classify(&self, verb: &str, argument: &str) -> Option<TextStyle> {
        let needle = argument.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let npc = self.npcs.contains(&needle).then_some(TextStyle::Blue);
        let enemy = self.enemy_style(&needle);
        let item = self.item_style(&needle);
        let skill = self.skills.contains(&needle).then_some(TextStyle::Pink);

        match verb {
            "talk" => npc.or(enemy).or(skill).or(item),
            "fight" | "hunt" => enemy.or(npc).or(skill).or(item),
            "skill" | "train" => skill.or(item).or(npc).or(enemy),
            verb if ITEM_VERBS.contains(&verb) => item.or(skill).or(npc).or(enemy),
            _ => enemy.or(npc).or(skill).or(item),
        }
    }

    fn enemy_style(&self, needle: &str) -> Option<TextStyle> {
        if self.end_bosses.contains(needle) {
            Some(TextStyle::Red)
        } else if self.bosses.contains(needle) {
            Some(TextStyle::Orange)
        } else if self.normal_enemies.contains(needle) {
            Some(TextStyle::Yellow)
        } else {
            None
        }
    }

    fn item_style(&self, needle: &str) -> Option<TextStyle> {
        if self.notable_items.contains(needle) {
            Some(TextStyle::Purple)
        } else if self.common_items.contains(needle) {
            Some(TextStyle::ItemGreen)
        } else {
            None
        }
    }
}

/// Structured form of one hint-line batch.
#[derive(Clone, Debug, Default)]
pub struct ActionCatalog {
    pub heading: String,
    pub actions: Vec<Action>,
}

/// Parse engine hint lines into an action catalog.
///
/// The first line is the heading (`"Available actions (N):"`); subsequent
/// lines must contain a `:` separator. Lines without one are malformed
/// engine output: skipped and logged, never fatal.
pub fn build_catalog(lines: &[String], state: &SessionState, index: &NameIndex) -> ActionCatalog {
    let mut catalog = ActionCatalog::default();
    let mut lines = lines.iter();

    if let Some(heading) = lines.next() {
        catalog.heading = heading.trim_end_matches(':').trim().to_string();
    }

    let in_encounter = state.in_encounter();
    for line in lines {
        let Some((command, description)) = line.split_once(':') else {
            tracing::warn!(%line, "skipping malformed action hint line");
            continue;
        };

        let command = command.trim().to_string();
        if command.is_empty() {
            tracing::warn!(%line, "skipping action hint line with empty command");
            continue;
        }

        let (verb, argument) = match command.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb.to_string(), rest.trim().to_string()),
            None => (command.clone(), String::new()),
        };

        let category = categorize(&verb, in_encounter);
        let color = index.classify(&verb, &argument);

        catalog.actions.push(Action {
            command,
            verb,
            argument,
            description: description.trim().to_string(),
            category,
            color,
            priority: 0,
        });
    }

    catalog
}

#[cfg(test)]
mod tests {
    use game_core::{SessionState, TablesOracle as _};

    use super::*;
    use crate::oracle::OracleManager;

    fn env() -> OracleManager {
        OracleManager::from_bundle(game_content::ContentBundle::builtin().unwrap())
    }

    fn fresh_state(env: &OracleManager) -> SessionState {
        SessionState::new_game(&env.tables().new_game(), 1)
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn parses_heading_and_verb_argument_split() {
        let env = env();
        let index = NameIndex::from_env(&env);
        let state = fresh_state(&env);

        let catalog = build_catalog(
            &lines(&[
                "Available actions (2):",
                "  move north: Travel to Forest.",
                "  status: View your stats.",
            ]),
            &state,
            &index,
        );

        assert_eq!(catalog.heading, "Available actions (2)");
        assert_eq!(catalog.actions.len(), 2);
        assert_eq!(catalog.actions[0].verb, "move");
        assert_eq!(catalog.actions[0].argument, "north");
        assert_eq!(catalog.actions[0].category, ActionCategory::Movement);
        assert_eq!(catalog.actions[1].argument, "");
        assert_eq!(catalog.actions[1].category, ActionCategory::Player);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let env = env();
        let index = NameIndex::from_env(&env);
        let state = fresh_state(&env);

        let catalog = build_catalog(
            &lines(&[
                "Available actions (1):",
                "this line has no separator",
                "  look: Re-describe your surroundings.",
            ]),
            &state,
            &index,
        );

        assert_eq!(catalog.actions.len(), 1);
        assert_eq!(catalog.actions[0].verb, "look");
    }

    #[test]
    fn item_verbs_become_combat_during_encounter() {
        let env = env();
        let index = NameIndex::from_env(&env);
        let mut state = fresh_state(&env);

        let hint_lines = lines(&[
            "Combat actions (1):",
            "  use minor potion: Heals up to 18 HP.",
        ]);

        let field = build_catalog(&hint_lines, &state, &index);
        assert_eq!(field.actions[0].category, ActionCategory::Player);

        state.encounter = Some(game_core::Encounter::new("wolf".into(), 22));
        let combat = build_catalog(&hint_lines, &state, &index);
        assert_eq!(combat.actions[0].category, ActionCategory::Combat);
    }

    #[test]
    fn argument_coloring_uses_verb_precedence() {
        let env = env();
        let index = NameIndex::from_env(&env);

        assert_eq!(index.classify("talk", "wise old man"), Some(TextStyle::Blue));
        assert_eq!(index.classify("fight", "forest wolf"), Some(TextStyle::Yellow));
        assert_eq!(index.classify("fight", "ash dragon"), Some(TextStyle::Orange));
        assert_eq!(
            index.classify("fight", "the onyx witch"),
            Some(TextStyle::Red)
        );
        assert_eq!(
            index.classify("use", "minor potion"),
            Some(TextStyle::ItemGreen)
        );
        assert_eq!(
            index.classify("use", "goblin riddle"),
            Some(TextStyle::Purple)
        );
        assert_eq!(
            index.classify("skill", "focus strike"),
            Some(TextStyle::Pink)
        );
        assert_eq!(index.classify("train", "attack"), Some(TextStyle::Pink));
        assert_eq!(index.classify("move", "north"), None);
        assert_eq!(index.classify("equip", "all"), None);
    }
}
