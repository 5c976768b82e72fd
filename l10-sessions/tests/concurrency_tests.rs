//! Racing lifecycle calls against the on-disk database
//!
//! Uses the production pool from `init_database` (WAL, several connections),
//! so concurrent transactions really contend for the write lock. Of every
//! group of racers exactly one wins and the rest get the typed error.

use l10_common::config::TomlConfig;
use l10_common::Error;
use l10_sessions::{db, AppState, EndOutcome};
use std::collections::HashMap;
use tempfile::TempDir;

const RACERS: usize = 8;
const ROUNDS: usize = 5;

async fn file_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database(&dir.path().join("l10.db")).await.unwrap();
    (dir, AppState::new(pool, &TomlConfig::default()))
}

/// Tally results by outcome name
fn tally<T>(results: Vec<Result<T, Error>>) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for result in results {
        let key = match result {
            Ok(_) => "ok",
            Err(Error::InvalidState(_)) => "invalid_state",
            Err(Error::Conflict(_)) => "conflict",
            Err(e) => panic!("racer failed with an untyped error: {}", e),
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

async fn race<T, F, Fut>(make: F) -> Vec<Result<T, Error>>
where
    T: Send + 'static,
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error>> + Send + 'static,
{
    let handles: Vec<_> = (0..RACERS).map(|_| tokio::spawn(make())).collect();
    let mut results = Vec::with_capacity(RACERS);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_starts_yield_one_session_and_conflicts() {
    let (_dir, state) = file_state().await;

    for round in 0..ROUNDS {
        let team = format!("team-{}", round);
        let results = race(|| {
            let lifecycle = state.lifecycle.clone();
            let team = team.clone();
            async move { lifecycle.start("org", &team, None, None).await }
        })
        .await;

        let counts = tally(results);
        assert_eq!(counts.get("ok"), Some(&1), "round {}: {:?}", round, counts);
        assert_eq!(counts.get("conflict"), Some(&(RACERS - 1)), "round {}: {:?}", round, counts);
        assert!(state.lifecycle.get_active("org", &team, "weekly").await.unwrap().is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_pause_and_resume_lose_with_invalid_state() {
    let (_dir, state) = file_state().await;
    let session = state.lifecycle.start("org", "team", None, None).await.unwrap();
    let id = session.id;

    for round in 0..ROUNDS {
        let paused = race(|| {
            let lifecycle = state.lifecycle.clone();
            async move { lifecycle.pause(id, None, None).await }
        })
        .await;
        let counts = tally(paused);
        assert_eq!(counts.get("ok"), Some(&1), "pause round {}: {:?}", round, counts);
        assert_eq!(counts.get("invalid_state"), Some(&(RACERS - 1)));

        let resumed = race(|| {
            let lifecycle = state.lifecycle.clone();
            async move { lifecycle.resume(id, None).await }
        })
        .await;
        let counts = tally(resumed);
        assert_eq!(counts.get("ok"), Some(&1), "resume round {}: {:?}", round, counts);
        assert_eq!(counts.get("invalid_state"), Some(&(RACERS - 1)));
    }

    let status = state.lifecycle.status(id).await.unwrap();
    assert_eq!(status.pause_history.len(), ROUNDS);
    assert!(status.pause_history.iter().all(|p| p.resume_time.is_some()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_ends_conclude_once() {
    let (_dir, state) = file_state().await;
    let session = state.lifecycle.start("org", "team", None, None).await.unwrap();
    let id = session.id;

    let results = race(|| {
        let lifecycle = state.lifecycle.clone();
        async move { lifecycle.end(id).await }
    })
    .await;

    let mut concluded = 0;
    for result in results {
        match result.unwrap() {
            EndOutcome::Concluded { .. } => concluded += 1,
            EndOutcome::AlreadyConcluded => {}
        }
    }
    assert_eq!(concluded, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_section_starts_stay_consistent() {
    let (_dir, state) = file_state().await;
    let session = state.lifecycle.start("org", "team", None, None).await.unwrap();
    let id = session.id;

    let results = race(|| {
        let tracker = state.tracker.clone();
        async move { tracker.start_section(id, "scorecard").await }
    })
    .await;
    let counts = tally(results);
    assert_eq!(counts.get("ok"), Some(&RACERS), "{:?}", counts);

    let snapshot = state.tracker.snapshot(id).await.unwrap();
    let scorecard = snapshot
        .sections
        .iter()
        .find(|t| t.section_id == "scorecard")
        .unwrap();
    assert_eq!(scorecard.visits, 1);
}
