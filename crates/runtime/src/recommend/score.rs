//! Priority scoring: an ordered rule table over derived actions.
//!
//! Rules are evaluated in fixed precedence order; the first rule that
//! claims an action decides its priority and evaluation stops. Anything no
//! rule claims gets a small non-zero baseline so every action stays
//! selectable and sortable. Final ordering is highest priority first, ties
//! broken by lexical command order.

use std::str::FromStr;

use game_core::Direction;

use crate::api::Action;
use crate::recommend::{GOBLIN_RIDDLE, MYSTERIOUS_RING, RecommendContext};

// Priority bands. Training and negotiation top their respective branches;
// the combat tree keeps healing above every non-barrier combat option and
// the boosted flee below healing.
const TRAIN_ALL: i32 = 1000;
const TRAIN_STAT: i32 = 990;
const BARRIER_BREAK: i32 = 980;
const NEGOTIATE_JOKE: i32 = 970;
const NEGOTIATE_BRIBE: i32 = 960;
const NEGOTIATE_FIGHT: i32 = 955;
const EQUIP_ALL: i32 = 950;
const EQUIP_UPGRADE: i32 = 935;
const COMBAT_HEAL: i32 = 930;
const QUEST_ITEM_READY: i32 = 920;
const FLEE_CRITICAL: i32 = 900;
const COMBAT_SKILL: i32 = 840;
const COMBAT_ATTACK: i32 = 820;
const COMBAT_DEFEND: i32 = 800;
const COMBAT_FLEE: i32 = 780;
const COMBAT_ITEM: i32 = 650;
const FIRST_MEETING: i32 = 720;
const RECOMMENDED_MOVE: i32 = 700;
const FIELD_HEAL_BASE: i32 = 200;
const FIELD_HEAL_SPAN: i32 = 480;
const INFO_STATUS: i32 = 300;
const INFO_QUEST: i32 = 290;
const INFO_LOOK: i32 = 280;
const SKILL_ON_COOLDOWN: i32 = 500;
const BASELINE: i32 = 1;

struct ScoreRule {
    name: &'static str,
    apply: fn(&RecommendContext, &Action) -> Option<i32>,
}

/// Precedence order. Encounter branches come first and are terminal: while
/// an encounter is active no field rule may claim an action.
const RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "negotiation",
        apply: negotiation_rule,
    },
    ScoreRule {
        name: "encounter",
        apply: encounter_rule,
    },
    ScoreRule {
        name: "train",
        apply: train_rule,
    },
    ScoreRule {
        name: "equip-upgrade",
        apply: equip_rule,
    },
    ScoreRule {
        name: "quest-item",
        apply: quest_item_rule,
    },
    ScoreRule {
        name: "first-meeting",
        apply: first_meeting_rule,
    },
    ScoreRule {
        name: "recommended-move",
        apply: recommended_move_rule,
    },
    ScoreRule {
        name: "field-heal",
        apply: field_heal_rule,
    },
    ScoreRule {
        name: "info",
        apply: info_rule,
    },
];

/// Score one action against the rule table.
pub fn score_action(ctx: &RecommendContext, action: &Action) -> i32 {
    for rule in RULES {
        if let Some(priority) = (rule.apply)(ctx, action) {
            tracing::trace!(rule = rule.name, command = %action.command, priority);
            return priority;
        }
    }
    BASELINE
}

/// Score every action and sort highest-first (lexical command tie-break).
pub fn rank_actions(ctx: &RecommendContext, actions: &mut [Action]) {
    for action in actions.iter_mut() {
        action.priority = score_action(ctx, action);
    }
    actions.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.command.cmp(&b.command)));
}

fn is_riddle_action(ctx: &RecommendContext, action: &Action) -> bool {
    matches!(action.verb.as_str(), "use" | "read")
        && ctx
            .argument_item(&action.argument)
            .is_some_and(|def| def.id.as_str() == GOBLIN_RIDDLE)
}

fn heal_amount(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if action.verb != "use" {
        return None;
    }
    ctx.argument_item(&action.argument)
        .filter(|def| def.heal_amount > 0 && def.equip_slot().is_none())
        .map(|def| def.heal_amount)
}

/// Negotiation short-circuits all other encounter scoring: non-violent
/// resolutions outrank starting the fight, and nothing else competes.
fn negotiation_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if !ctx.in_negotiation() {
        return None;
    }
    Some(match action.verb.as_str() {
        "joke" => NEGOTIATE_JOKE,
        "bribe" => NEGOTIATE_BRIBE,
        "fight" => NEGOTIATE_FIGHT,
        _ => BASELINE,
    })
}

/// The in-combat decision tree: barrier break, then heal when low, then
/// burst skill, attack, defend, flee (boosted when critical).
fn encounter_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    let encounter = ctx.state.encounter.as_ref()?;

    if encounter.barrier_active && is_riddle_action(ctx, action) {
        return Some(BARRIER_BREAK);
    }

    if let Some(heal) = heal_amount(ctx, action)
        && ctx.hp_ratio <= ctx.params.low_hp_ratio
    {
        // Stronger heals edge out weaker ones without leaving the band.
        return Some(COMBAT_HEAL + heal.min(40));
    }

    Some(match action.verb.as_str() {
        "skill" => {
            let on_cooldown = ctx
                .state
                .player
                .cooldowns
                .get(action.argument.trim())
                .copied()
                .unwrap_or(0)
                > 0;
            if on_cooldown {
                SKILL_ON_COOLDOWN
            } else {
                COMBAT_SKILL + skill_burst_rank(&action.argument)
            }
        }
        "fight" => COMBAT_ATTACK,
        "defend" => COMBAT_DEFEND,
        "run" => {
            if ctx.hp_ratio <= ctx.params.critical_hp_ratio {
                FLEE_CRITICAL
            } else {
                COMBAT_FLEE
            }
        }
        "use" | "read" => {
            match ctx.argument_item(&action.argument) {
                // Out-of-context riddle or unready ring stay low.
                Some(def) if def.id.as_str() == MYSTERIOUS_RING => COMBAT_ITEM,
                Some(def) if def.heal_amount > 0 => COMBAT_ITEM,
                _ => BASELINE,
            }
        }
        _ => BASELINE,
    })
}

/// Burst ranking among the core skills: the damage skill leads, the
/// emergency heal follows, the stance trails.
fn skill_burst_rank(skill: &str) -> i32 {
    match skill.trim() {
        "focus strike" => 20,
        "second wind" => 10,
        _ => 0,
    }
}

fn train_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if action.verb != "train" || ctx.state.player.skill_points == 0 {
        return None;
    }
    if action.argument.trim() == "all" {
        (ctx.state.player.skill_points >= 3).then_some(TRAIN_ALL)
    } else {
        Some(TRAIN_STAT)
    }
}

fn equip_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if action.verb != "equip" || ctx.upgrades.is_empty() {
        return None;
    }
    if action.argument.trim() == "all" {
        return Some(EQUIP_ALL);
    }
    let item = ctx.argument_item(&action.argument)?;
    let upgrade = ctx
        .upgrades
        .iter()
        .find(|candidate| candidate.item_id == item.id)?;
    // Market value settles ties between competing upgrades.
    Some(EQUIP_UPGRADE + (upgrade.value / 10).clamp(0, 14))
}

fn quest_item_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if !matches!(action.verb.as_str(), "use" | "read") {
        return None;
    }
    let item = ctx.argument_item(&action.argument)?;
    ctx.quest_item_ready(&item.id).then_some(QUEST_ITEM_READY)
}

fn first_meeting_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    (action.verb == "talk"
        && action.argument.to_lowercase().contains("wise old man")
        && !ctx.state.has_flag("met_old_man"))
    .then_some(FIRST_MEETING)
}

fn recommended_move_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    if action.verb != "move" {
        return None;
    }
    let direction = Direction::from_str(action.argument.trim()).ok()?;
    (ctx.step.direction == Some(direction)).then_some(RECOMMENDED_MOVE)
}

fn field_heal_rule(ctx: &RecommendContext, action: &Action) -> Option<i32> {
    let heal = heal_amount(ctx, action)?;
    if ctx.hp_ratio >= 1.0 {
        return None;
    }
    let missing = 1.0 - ctx.hp_ratio;
    let scaled = (FIELD_HEAL_SPAN as f32 * missing) as i32;
    Some(FIELD_HEAL_BASE + scaled + heal.min(20))
}

fn info_rule(_ctx: &RecommendContext, action: &Action) -> Option<i32> {
    match action.verb.as_str() {
        "status" => Some(INFO_STATUS),
        "quest" => Some(INFO_QUEST),
        "look" => Some(INFO_LOOK),
        _ => None,
    }
}
