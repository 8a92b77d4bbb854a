//! End-to-end session scenarios over the scripted rule engine.
//!
//! These tests drive the full turn pipeline (engine call, catalog build,
//! scoring, payload assembly, persistence) the way a presentation shell
//! would, and pin down the externally observable contract: payload shape,
//! recommendation behavior, snapshot round-trips, and failure isolation.

use std::sync::Arc;

use game_core::{
    Encounter, EngineError, GameEnv, ItemId, RecommendedStep, RuleEngine, SessionState,
    TablesOracle as _,
};
use runtime::{
    ErrorCode, InMemorySnapshotRepository, OracleManager, ScriptedEngine, Session, SessionError,
    SnapshotRepository,
};

fn env() -> Arc<OracleManager> {
    Arc::new(OracleManager::from_bundle(
        game_content::ContentBundle::builtin().expect("builtin content must load"),
    ))
}

fn session_with_repo(seed: u64) -> Session {
    Session::new(
        Box::new(ScriptedEngine::new()),
        env(),
        Some(Box::new(InMemorySnapshotRepository::new())),
        seed,
    )
}

#[test]
fn fresh_session_produces_a_complete_payload() {
    let mut session = session_with_repo(7);
    let payload = session.start().expect("start must succeed");

    assert!(!payload.game_over);
    assert!(!payload.in_combat);
    assert_eq!(payload.status_summary.name, "Wanderer");
    assert_eq!(payload.location_summary.id, "old_shack");
    assert!(payload.actions_heading.starts_with("Available actions"));
    assert!(!payload.actions.is_empty());
    assert!(!payload.hints.is_empty());
    assert!(!payload.screen_text.plain().is_empty());

    // The decoded screen must carry no residual control sequences.
    assert!(!payload.screen_text.plain().contains('\x1b'));

    // Every action got a non-zero priority and the list is sorted.
    assert!(payload.actions.iter().all(|action| action.priority >= 1));
    let priorities: Vec<i32> = payload.actions.iter().map(|a| a.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
}

#[test]
fn first_meeting_boost_disappears_after_talking() {
    let mut session = session_with_repo(7);
    session.start().unwrap();

    let before = session.submit_command("status").unwrap();
    let talk_before = before
        .actions
        .iter()
        .find(|action| action.command == "talk wise old man")
        .expect("talk action available")
        .priority;

    let after_talk = session.submit_command("talk wise old man").unwrap();
    assert!(session.state().has_flag("met_old_man"));

    let talk_after = after_talk
        .actions
        .iter()
        .find(|action| action.command == "talk wise old man")
        .expect("talk action still available")
        .priority;

    assert!(
        talk_after < talk_before,
        "introduction boost must not persist: {talk_after} vs {talk_before}"
    );
    assert!(
        after_talk
            .hints
            .iter()
            .all(|hint| hint.command != "talk wise old man"),
        "met NPC must not be hinted again"
    );
}

#[test]
fn hint_list_is_bounded_and_consistent_with_scores() {
    let mut session = session_with_repo(7);
    session.start().unwrap();
    let payload = session.submit_command("look").unwrap();

    let cap = env().tables().recommend().max_hints;
    assert!(payload.hints.len() <= cap);

    // A hinted command, when it is a real action, must score above the
    // baseline crowd.
    for hint in &payload.hints {
        if let Some(action) = payload
            .actions
            .iter()
            .find(|action| action.command == hint.command)
        {
            assert!(
                action.priority > 1,
                "hinted action `{}` should not be baseline",
                hint.command
            );
        }
    }
}

#[test]
fn barrier_fight_leads_with_the_breaking_action() {
    let environment = env();
    let mut state = SessionState::new_game(&environment.tables().new_game(), 11);
    state.location_id = "witch_terrace".into();
    state.discover("witch_terrace".into());
    state.player.add_item(ItemId::from("goblin_riddle"), 1);
    let mut encounter = Encounter::new("onyx_witch".into(), 230);
    encounter.barrier_active = true;
    state.encounter = Some(encounter);

    let mut session = Session::with_state(
        Box::new(ScriptedEngine::new()),
        environment,
        None,
        state,
    );

    let payload = session.submit_command("status").unwrap();
    assert!(payload.in_combat);
    assert!(
        payload.actions[0].argument.contains("riddle"),
        "breaking action must rank first, got {}",
        payload.actions[0].command
    );
    assert!(payload.hints[0].command.contains("riddle"));
}

#[test]
fn negotiation_hints_are_exactly_joke_bribe_fight() {
    let environment = env();
    let mut state = SessionState::new_game(&environment.tables().new_game(), 11);
    state.location_id = "desolate_road".into();
    state.encounter = Some(Encounter::negotiation("goblin_army".into(), 165));

    let mut session = Session::with_state(
        Box::new(ScriptedEngine::new()),
        environment,
        None,
        state,
    );

    let payload = session.submit_command("status").unwrap();
    let hinted: Vec<&str> = payload.hints.iter().map(|h| h.command.as_str()).collect();
    assert_eq!(hinted, vec!["joke", "bribe", "fight"]);
}

#[test]
fn exported_snapshot_resumes_an_identical_session() {
    let mut original = session_with_repo(99);
    original.start().unwrap();
    original.submit_command("talk wise old man").unwrap();
    original.submit_command("move east").unwrap();

    let document = original.export_snapshot();

    let mut resumed = session_with_repo(1);
    resumed.start().unwrap();
    resumed
        .import_snapshot(&document, 555)
        .expect("import must succeed");

    assert_eq!(resumed.state().location_id, original.state().location_id);
    assert_eq!(resumed.state().flags, original.state().flags);
    assert_eq!(resumed.state().turn, original.state().turn);

    // The same command stream must produce identical screens on both
    // sessions, random rolls included.
    for command in ["hunt", "fight", "fight", "run", "look"] {
        let a = original.submit_command(command).unwrap();
        let b = resumed.submit_command(command).unwrap();
        assert_eq!(
            a.screen_text.plain(),
            b.screen_text.plain(),
            "divergence on `{command}`"
        );
    }
}

#[test]
fn import_with_unknown_location_falls_back_to_start() {
    let mut session = session_with_repo(3);
    session.start().unwrap();

    let mut document = session.export_snapshot();
    document["state"]["location_id"] = serde_json::json!("nonexistent_place");

    let payload = session
        .import_snapshot(&document, 4)
        .expect("restore must substitute the start location");
    assert_eq!(payload.location_summary.id, "old_shack");
}

#[test]
fn import_with_string_state_fails_without_touching_the_session() {
    let mut session = session_with_repo(3);
    session.start().unwrap();
    session.submit_command("talk wise old man").unwrap();
    let flags_before = session.state().flags.clone();
    let turn_before = session.state().turn;

    let document = serde_json::json!({"version": 1, "state": "corrupted"});
    let err = session.import_snapshot(&document, 4).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingState);

    assert_eq!(session.state().flags, flags_before);
    assert_eq!(session.state().turn, turn_before);
}

#[test]
fn reset_purges_the_persisted_snapshot() {
    let repository = Arc::new(InMemorySnapshotRepository::new());

    struct SharedRepo(Arc<InMemorySnapshotRepository>);
    impl SnapshotRepository for SharedRepo {
        fn save(&self, document: &serde_json::Value) -> runtime::repository::Result<()> {
            self.0.save(document)
        }
        fn load(&self) -> runtime::repository::Result<Option<serde_json::Value>> {
            self.0.load()
        }
        fn clear(&self) -> runtime::repository::Result<()> {
            self.0.clear()
        }
    }

    let mut session = Session::new(
        Box::new(ScriptedEngine::new()),
        env(),
        Some(Box::new(SharedRepo(repository.clone()))),
        5,
    );

    session.start().unwrap();
    session.submit_command("talk wise old man").unwrap();
    assert!(repository.load().unwrap().is_some());

    let payload = session.reset(6).unwrap();
    assert!(!session.state().has_flag("met_old_man"));
    assert_eq!(payload.location_summary.id, "old_shack");

    // Reset writes the fresh session's snapshot after purging the old one.
    let stored = repository.load().unwrap().expect("fresh snapshot persisted");
    let flags = stored["state"]["flags"].as_array().unwrap();
    assert!(flags.is_empty());
}

#[test]
fn engine_failure_is_surfaced_and_leaves_the_root_untouched() {
    struct FailingEngine;

    impl RuleEngine for FailingEngine {
        fn initial_screen(
            &self,
            _state: &mut SessionState,
            _env: &dyn GameEnv,
        ) -> Result<String, EngineError> {
            Ok("welcome".to_string())
        }

        fn process_command(
            &self,
            state: &mut SessionState,
            _raw: &str,
            _env: &dyn GameEnv,
        ) -> Result<String, EngineError> {
            // Mutations before the failure must not leak into the session.
            state.player.gold = 0;
            state.set_flag("corrupted");
            Err(EngineError::Internal("dice server on fire".to_string()))
        }

        fn action_hints(&self, _state: &SessionState, _env: &dyn GameEnv) -> Vec<String> {
            vec!["Available actions (0):".to_string()]
        }

        fn recommended_step(
            &self,
            _state: &SessionState,
            _env: &dyn GameEnv,
        ) -> RecommendedStep {
            RecommendedStep::default()
        }
    }

    let mut session = Session::new(Box::new(FailingEngine), env(), None, 9);
    session.start().unwrap();
    let gold_before = session.state().player.gold;

    let err = session.submit_command("anything").unwrap_err();
    assert!(matches!(err, SessionError::Engine(_)));

    assert_eq!(session.state().player.gold, gold_before);
    assert!(!session.state().has_flag("corrupted"));
}

#[test]
fn game_over_turns_no_longer_reach_the_engine() {
    let mut session = session_with_repo(13);
    session.start().unwrap();
    session.submit_command("quit").unwrap();
    assert!(session.state().game_over);

    let turn_before = session.state().turn;
    let payload = session.submit_command("look").unwrap();
    assert!(payload.game_over);
    assert_eq!(session.state().turn, turn_before);
}
