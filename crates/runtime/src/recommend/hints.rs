//! Hint derivation: a bounded, ordered list of recommended commands.
//!
//! Built by sequential add-if-absent insertions branching the same way as
//! priority scoring, so a hinted action also scores high. The list length
//! is capped by [`game_core::RecommendParams::max_hints`].

use game_core::{Encounter, SpecialPhase};

use crate::api::{Action, Hint};
use crate::recommend::{CRUSTY_KEY, HOARD_TREASURE, RecommendContext, VIAL_OF_TEARS};

struct HintList {
    hints: Vec<Hint>,
    cap: usize,
}

impl HintList {
    fn new(cap: usize) -> Self {
        Self {
            hints: Vec::new(),
            cap,
        }
    }

    fn full(&self) -> bool {
        self.hints.len() >= self.cap
    }

    /// Idempotent insertion: a command is hinted at most once.
    fn push(&mut self, command: impl Into<String>, reason: impl Into<String>) {
        if self.full() {
            return;
        }
        let command = command.into();
        if self.hints.iter().any(|hint| hint.command == command) {
            return;
        }
        self.hints.push(Hint {
            command,
            reason: reason.into(),
        });
    }
}

fn find<'a>(actions: &'a [Action], pred: impl Fn(&Action) -> bool) -> Option<&'a Action> {
    actions.iter().find(|action| pred(action))
}

/// Derive the recommended-action list for the current state.
pub fn derive_hints(ctx: &RecommendContext, actions: &[Action]) -> Vec<Hint> {
    let mut list = HintList::new(ctx.params.max_hints.max(1));

    match &ctx.state.encounter {
        Some(encounter) => encounter_hints(ctx, encounter, actions, &mut list),
        None => field_hints(ctx, actions, &mut list),
    }

    list.hints
}

fn encounter_hints(
    ctx: &RecommendContext,
    encounter: &Encounter,
    actions: &[Action],
    list: &mut HintList,
) {
    // Negotiation replaces the combat action set entirely.
    if encounter.special_phase == SpecialPhase::Negotiation {
        list.push("joke", "A good joke may end this without bloodshed.");
        list.push("bribe", "Gold can buy a safe pass.");
        list.push("fight", "Fighting the whole army is the hard road.");
        return;
    }

    if encounter.barrier_active && ctx.has_riddle {
        let command = find(actions, |action| {
            matches!(action.verb.as_str(), "use" | "read")
                && action.argument.contains("riddle")
        })
        .map(|action| action.command.clone())
        .unwrap_or_else(|| "read goblin riddle".to_string());
        list.push(command, "The barrier swallows your attacks; the riddle can break it.");
    }

    if ctx.hp_ratio <= ctx.params.low_hp_ratio
        && let Some(best) = ctx.heal_items.first()
    {
        list.push(
            format!("use {}", best.name.to_lowercase()),
            "Your HP is low; heal before trading more blows.",
        );
    }

    if let Some(skill) = strongest_ready_skill(ctx, actions) {
        list.push(skill, "Your strongest skill is ready.");
    }

    list.push("fight", "Keep the pressure on with basic strikes.");

    if ctx.hp_ratio <= ctx.params.critical_hp_ratio {
        list.push("run", "HP is critical; escaping keeps the run alive.");
    }
}

/// Highest burst-ranked skill action that is off cooldown.
fn strongest_ready_skill(ctx: &RecommendContext, actions: &[Action]) -> Option<String> {
    let mut skills: Vec<&Action> = actions
        .iter()
        .filter(|action| action.verb == "skill")
        .filter(|action| {
            ctx.state
                .player
                .cooldowns
                .get(action.argument.trim())
                .copied()
                .unwrap_or(0)
                == 0
        })
        .collect();
    skills.sort_by_key(|action| match action.argument.trim() {
        "focus strike" => 0,
        "second wind" => 1,
        _ => 2,
    });
    skills.first().map(|action| action.command.clone())
}

fn field_hints(ctx: &RecommendContext, actions: &[Action], list: &mut HintList) {
    let player = &ctx.state.player;

    if player.skill_points > 0 {
        let reason = format!(
            "You have {} unspent skill point(s).",
            player.skill_points
        );
        if player.skill_points >= 3 && find(actions, |a| a.command == "train all").is_some() {
            list.push("train all", reason);
        } else if let Some(train) = find(actions, |a| a.verb == "train") {
            list.push(train.command.clone(), reason);
        } else {
            list.push("train all", reason);
        }
    }

    if !ctx.upgrades.is_empty() {
        if ctx.upgrades.len() > 1 && find(actions, |a| a.command == "equip all").is_some() {
            list.push("equip all", "Better gear is sitting in your pack.");
        } else {
            let upgrade = &ctx.upgrades[0];
            list.push(
                format!("equip {}", upgrade.name.to_lowercase()),
                format!("{} beats what is in your {} slot.", upgrade.name, upgrade.slot),
            );
        }
    }

    if !ctx.state.has_flag("met_old_man")
        && find(actions, |a| {
            a.verb == "talk" && a.argument.contains("wise old man")
        })
        .is_some()
    {
        list.push(
            "talk wise old man",
            "The Wise Old Man starts your journey and teaches core skills.",
        );
    }

    for (item_id, command, reason) in [
        (
            CRUSTY_KEY,
            "use crusty key",
            "The crusty key can open Elle's chains right here.",
        ),
        (
            VIAL_OF_TEARS,
            "use vial of tears",
            "The vial can cleanse Elle and complete the story.",
        ),
        (
            HOARD_TREASURE,
            "use hoard of treasure",
            "The Wise Old Man will reward you for the hoard.",
        ),
    ] {
        if player.has_item(&item_id.into()) && ctx.quest_item_ready(&item_id.into()) {
            list.push(command, reason);
        }
    }

    if let Some(direction) = ctx.step.direction {
        list.push(
            format!("move {direction}"),
            "Your current objective lies that way.",
        );
    }

    list.push("status", "Check your condition and gear.");
    list.push("quest", "Review your current objective.");
}

#[cfg(test)]
mod tests {
    use game_core::{Encounter, ItemId, RecommendedStep};

    use super::*;
    use crate::api::ActionCategory;
    use crate::recommend::RecommendContext;
    use crate::recommend::test_support::{env, fresh_state};

    fn action(command: &str) -> Action {
        let (verb, argument) = match command.split_once(' ') {
            Some((verb, rest)) => (verb.to_string(), rest.to_string()),
            None => (command.to_string(), String::new()),
        };
        Action {
            command: command.to_string(),
            verb,
            argument,
            description: String::new(),
            category: ActionCategory::Player,
            color: None,
            priority: 0,
        }
    }

    fn commands(hints: &[Hint]) -> Vec<&str> {
        hints.iter().map(|hint| hint.command.as_str()).collect()
    }

    #[test]
    fn negotiation_yields_exactly_its_action_set() {
        let env = env();
        let mut state = fresh_state(&env);
        state.encounter = Some(Encounter::negotiation("goblin_army".into(), 165));
        state.player.hp = 3; // extreme HP must not change the set
        state.player.skill_points = 9;

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let hints = derive_hints(&ctx, &[action("joke"), action("bribe"), action("fight")]);
        assert_eq!(commands(&hints), vec!["joke", "bribe", "fight"]);
    }

    #[test]
    fn barrier_hint_leads_when_active() {
        let env = env();
        let mut state = fresh_state(&env);
        let mut encounter = Encounter::new("onyx_witch".into(), 230);
        encounter.barrier_active = true;
        state.encounter = Some(encounter);
        state.player.add_item(ItemId::from("goblin_riddle"), 1);

        let actions = vec![
            action("fight"),
            action("defend"),
            action("read goblin riddle"),
            action("run"),
        ];
        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let hints = derive_hints(&ctx, &actions);
        assert_eq!(hints[0].command, "read goblin riddle");
    }

    #[test]
    fn low_hp_combat_leads_with_heal() {
        let env = env();
        let mut state = fresh_state(&env);
        state.encounter = Some(Encounter::new("wolf".into(), 22));
        state.player.hp = 18;

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let hints = derive_hints(&ctx, &[action("fight"), action("defend"), action("run")]);
        assert_eq!(hints[0].command, "use minor potion");
        assert!(commands(&hints).contains(&"fight"));
    }

    #[test]
    fn no_train_or_equip_hints_without_points_or_upgrades() {
        let env = env();
        let state = fresh_state(&env);

        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let hints = derive_hints(&ctx, &[action("status"), action("quest"), action("look")]);
        assert!(
            hints
                .iter()
                .all(|hint| !hint.command.starts_with("train") && !hint.command.starts_with("equip"))
        );
    }

    #[test]
    fn field_hints_follow_precedence_and_cap() {
        let env = env();
        let mut state = fresh_state(&env);
        state.player.skill_points = 4;
        state.player.add_item(ItemId::from("crusty_sword"), 1);

        let actions = vec![
            action("train all"),
            action("train attack 1"),
            action("equip crusty sword"),
            action("talk wise old man"),
            action("move east"),
            action("status"),
            action("quest"),
            action("look"),
        ];
        let step = RecommendedStep {
            target: Some("forest".into()),
            direction: Some(game_core::Direction::East),
        };
        let ctx = RecommendContext::new(&state, &env, step);
        let hints = derive_hints(&ctx, &actions);

        assert!(hints.len() <= ctx.params.max_hints);
        assert_eq!(hints[0].command, "train all");
        assert_eq!(hints[1].command, "equip crusty sword");
        assert_eq!(hints[2].command, "talk wise old man");
        assert!(commands(&hints).contains(&"move east"));
    }

    #[test]
    fn hints_are_idempotent_per_command() {
        let env = env();
        let state = fresh_state(&env);
        let ctx = RecommendContext::new(&state, &env, RecommendedStep::default());
        let hints = derive_hints(&ctx, &[action("status"), action("status")]);
        let unique: std::collections::BTreeSet<_> = commands(&hints).into_iter().collect();
        assert_eq!(unique.len(), hints.len());
    }
}
