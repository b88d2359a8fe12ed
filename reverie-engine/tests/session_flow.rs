use reverie_engine::{
    Catalog, DreamSession, EndingKind, EngineConfig, EngineError, EngineEvent, GamePhase,
    InvalidState, MetaProgress, RejectReason, RngBundle, RollStream, ScriptedRolls, SpecialEvent,
};
use std::sync::Arc;

const CROSSROADS: &str = r#"{
  "scenes": [
    {
      "id": "crossroads",
      "weight": 1.0,
      "description": [{ "kind": "text", "text": "The dream forks ahead of you." }],
      "choices": [
        {
          "text": "Gather your friends",
          "memory": "gathered_friends",
          "traits": { "kind": 20 },
          "effects": { "karma": 80, "companions": ["ava", "bram", "cole", "dara", "eli"] }
        },
        {
          "text": "Burn it all",
          "memory": "burned_everything",
          "traits": { "cruel": 30 },
          "effects": { "karma": -200 }
        },
        {
          "text": "Pay the toll",
          "memory": "paid_toll",
          "effects": { "cost": 5 }
        },
        {
          "text": "Wander on",
          "memory": "wandered_on"
        }
      ]
    }
  ],
  "temporal_loop": {
    "description": [{ "kind": "text", "text": "Again." }],
    "choices": [{ "text": "Wait", "memory": "waited" }]
  },
  "artifacts": [{ "name": "Pebble", "coherence_boost": 1 }]
}"#;

fn crossroads_session(meta: Arc<MetaProgress>) -> DreamSession {
    let catalog = Catalog::from_json(CROSSROADS).unwrap();
    DreamSession::with_parts(
        Arc::new(catalog),
        Box::new(ScriptedRolls::constant(0.0)),
        EngineConfig::default(),
        meta,
    )
}

fn first_available(session: &DreamSession) -> Option<String> {
    session
        .current_scene()
        .available_choices()
        .next()
        .map(|choice| choice.id().to_string())
}

#[test]
fn same_seed_replays_the_same_dream() {
    let play = |seed: u64| {
        let mut session = DreamSession::new(seed).unwrap();
        let mut scenes = vec![session.current_scene().id.clone()];
        for _ in 0..15 {
            if session.ending().is_some() {
                break;
            }
            let Some(choice) = first_available(&session) else {
                break;
            };
            let outcome = match session.submit_choice(&choice) {
                Ok(outcome) => outcome,
                Err(EngineError::InvalidState(InvalidState::GameOver)) => break,
                Err(err) => panic!("seed {seed}: {err}"),
            };
            scenes.push(outcome.scene.id);
            session.tick_degradation();
        }
        (scenes, session.snapshot().fingerprint())
    };
    assert_eq!(play(0x5EED), play(0x5EED));
}

#[test]
fn choices_advance_phases_without_regressing() {
    let mut session = crossroads_session(Arc::new(MetaProgress::new()));
    for step in 1..=12 {
        let outcome = session.submit_choice("wandered_on").unwrap();
        let expected = match step {
            1..=4 => GamePhase::Introduction,
            5..=11 => GamePhase::Middle,
            _ => GamePhase::Late,
        };
        assert_eq!(session.phase(), expected, "after {step} choices");
        if step == 5 || step == 12 {
            assert!(outcome
                .events
                .contains(&EngineEvent::PhaseChanged { phase: expected }));
        }
    }
    assert_eq!(session.relationships()["crossroads"].encounters, 12);
    assert_eq!(session.snapshot().memories.len(), 12);
}

#[test]
fn unaffordable_choice_is_rejected_cleanly() {
    let mut session = crossroads_session(Arc::new(MetaProgress::new()));
    let before = session.snapshot().clone();
    let err = session.submit_choice("paid_toll").unwrap_err();
    assert_eq!(
        err,
        EngineError::Rejected(RejectReason::InsufficientCurrency {
            cost: 5,
            available: 0
        })
    );
    assert_eq!(session.snapshot(), &before);
    assert!(matches!(
        session.submit_choice("no_such_path"),
        Err(EngineError::Rejected(RejectReason::UnknownChoice { .. }))
    ));
}

#[test]
fn nightmare_lord_ends_the_dream_and_allows_restart() {
    let meta = Arc::new(MetaProgress::new());
    let mut session = crossroads_session(Arc::clone(&meta));
    let outcome = session.submit_choice("burned_everything").unwrap();

    let ending = outcome.ending.unwrap();
    assert_eq!(ending.kind, EndingKind::NightmareLord);
    assert_eq!(ending.title, "NIGHTMARE INCARNATE");
    assert_eq!(session.snapshot().karma, -100);
    assert!(session.special_events().contains(&SpecialEvent::KarmaExtreme));
    assert_eq!(outcome.scene.id, "crossroads");

    assert_eq!(
        session.submit_choice("wandered_on"),
        Err(EngineError::InvalidState(InvalidState::GameOver))
    );
    assert!(session.request_deeper_dream().is_err());
    assert!(session.tick_degradation().is_none());

    session.restart().unwrap();
    assert!(session.ending().is_none());
    assert_eq!(session.snapshot().karma, 0);
    assert_eq!(meta.playthroughs(), 1);
    assert!(meta.secret_endings().is_empty());
}

#[test]
fn found_family_locks_restart_and_counts_as_secret() {
    let meta = Arc::new(MetaProgress::new());
    let mut session = crossroads_session(Arc::clone(&meta));
    let outcome = session.submit_choice("gathered_friends").unwrap();
    assert_eq!(outcome.ending.map(|e| e.kind), Some(EndingKind::DreamFamily));
    assert_eq!(
        session.restart(),
        Err(EngineError::InvalidState(InvalidState::RestartLocked))
    );

    session.new_game();
    assert!(session.ending().is_none());
    assert_eq!(meta.secret_endings(), vec![EndingKind::DreamFamily]);

    // A second session shares the same meta progress.
    let mut other = crossroads_session(Arc::clone(&meta));
    other.submit_choice("wandered_on").unwrap();
    assert_eq!(meta.total_choices(), 2);
}

#[test]
fn significant_memories_always_reach_the_journal() {
    let json = CROSSROADS.replace("wandered_on", "significant_wandering");
    let catalog = Catalog::from_json(&json).unwrap();
    let rolls = ScriptedRolls::constant(0.0).with_stream(RollStream::Journal, [0.99]);
    let mut session = DreamSession::with_parts(
        Arc::new(catalog),
        Box::new(rolls),
        EngineConfig::default(),
        Arc::new(MetaProgress::new()),
    );

    let entry = session
        .submit_choice("significant_wandering")
        .unwrap()
        .journal_entry
        .unwrap();
    assert!(entry.text.starts_with("I chose to wander on."));
    assert!((entry.coherence - 100.0).abs() < f32::EPSILON);
    assert_eq!(entry.karma, Some(0));
    assert_eq!(session.journal().len(), 2);
}

#[test]
fn memory_log_drops_the_oldest_choices_past_thirty() {
    let choices: Vec<String> = (0..35)
        .map(|i| format!(r#"{{ "text": "Step {i}", "memory": "step_{i:02}" }}"#))
        .collect();
    let json = format!(
        r#"{{
          "scenes": [
            {{ "id": "corridor", "weight": 1.0, "description": [], "choices": [{}] }}
          ],
          "temporal_loop": {{ "description": [], "choices": [] }},
          "artifacts": [{{ "name": "Pebble" }}]
        }}"#,
        choices.join(",")
    );
    let mut session = DreamSession::with_parts(
        Arc::new(Catalog::from_json(&json).unwrap()),
        Box::new(ScriptedRolls::constant(0.0)),
        EngineConfig::default(),
        Arc::new(MetaProgress::new()),
    );

    for i in 0..35 {
        session.submit_choice(&format!("step_{i:02}")).unwrap();
        assert!(session.snapshot().memories.len() <= 30);
    }
    let ids: Vec<&str> = session
        .snapshot()
        .memories
        .iter()
        .map(|memory| memory.id.as_str())
        .collect();
    assert_eq!(ids.len(), 30);
    assert_eq!(ids.first(), Some(&"step_05"));
    assert_eq!(ids.last(), Some(&"step_34"));
    assert!(!ids.contains(&"step_04"));
    assert_eq!(session.meta().total_choices(), 35);
}

#[test]
fn seeded_bundle_drives_side_actions() {
    let catalog = Catalog::builtin().unwrap();
    let mut session = DreamSession::with_parts(
        catalog,
        Box::new(RngBundle::from_user_seed(7)),
        EngineConfig::default(),
        Arc::new(MetaProgress::new()),
    );
    let found = session.request_artifact_search().unwrap();
    assert!(found.message.unwrap().starts_with("You found: "));
    assert_eq!(session.snapshot().artifacts.len(), 1);

    session.request_deeper_dream().unwrap();
    assert_eq!(session.snapshot().dream_depth, 1);
    assert!(matches!(
        session.request_power_use("timeline_sight"),
        Err(EngineError::InvalidState(InvalidState::UnownedPower(_)))
    ));
}
