#![cfg(feature = "async")]

use reverie_engine::session::driver::{DegradationTask, shared};
use reverie_engine::{Catalog, DreamSession, EngineConfig, MetaProgress, ScriptedRolls};
use std::sync::Arc;
use std::time::Duration;

fn session(period_ms: u64) -> DreamSession {
    DreamSession::with_parts(
        Catalog::builtin().unwrap(),
        Box::new(ScriptedRolls::constant(0.0)),
        EngineConfig {
            degradation_period_ms: period_ms,
            ..EngineConfig::default()
        },
        Arc::new(MetaProgress::new()),
    )
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_configured_period() {
    let shared = shared(session(2_000));
    let task = DegradationTask::spawn(Arc::clone(&shared)).await;

    tokio::time::sleep(Duration::from_millis(6_500)).await;
    let ticks = task.stop().await;
    assert_eq!(ticks, 3);

    let guard = shared.lock().await;
    assert!((guard.snapshot().coherence - 98.5).abs() < 1e-3);
}

#[tokio::test(start_paused = true)]
async fn task_exits_once_a_request_settles_the_ending() {
    let shared = shared(session(10));
    let task = DegradationTask::spawn(Arc::clone(&shared)).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!task.is_finished());
    {
        let mut guard = shared.lock().await;
        assert!(guard.snapshot().coherence.abs() < f32::EPSILON);
        assert!(guard.ending().is_none());
        assert!(guard.submit_choice("reached_for_truth").is_err());
        assert!(guard.ending().is_some());
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(task.is_finished());
    assert!(task.stop().await > 0);
}

#[tokio::test(start_paused = true)]
async fn choices_queue_behind_ticks() {
    let shared = shared(session(100));
    let task = DegradationTask::spawn(Arc::clone(&shared)).await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    {
        let mut guard = shared.lock().await;
        guard.submit_choice("reached_for_truth").unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    let ticks = task.stop().await;
    assert_eq!(ticks, 3);
    assert_eq!(shared.lock().await.snapshot().memories.len(), 1);
}
