//! End-to-end tests for the async session: bot play, event log, subscribers

use std::path::PathBuf;

use blockfall::engine::{best_plan, session, EngineConfig};
use blockfall::types::{GameCommand, GameStatus};

fn temp_log(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "blockfall-session-{}-{}.jsonl",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[tokio::test]
async fn test_bot_session_writes_event_log() {
    let path = temp_log("bot");
    let config = EngineConfig::default().with_seed(2024).with_event_log(&path);
    let mut session = session::spawn(&config).await.unwrap();

    session.send(GameCommand::Start).await.unwrap();
    let mut sent = 1;
    for _ in 0..30 {
        let state = session.inspect().await.unwrap();
        assert_eq!(state.status(), GameStatus::Running);

        let plan = best_plan(&state).expect("a running game always has a placement");
        let before = state.piece_id();
        for command in plan.commands {
            session.send(command).await.unwrap();
            sent += 1;
        }
        session
            .wait_for(|s| s.piece_id != before || s.hud.status != GameStatus::Running)
            .await
            .unwrap();
    }

    let summary = session.shutdown().await.unwrap();
    assert_eq!(summary.status, GameStatus::Running);
    assert!(summary.pieces > 30);
    assert_eq!(summary.level, summary.lines / 10);

    let text = std::fs::read_to_string(&path).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(records.first().unwrap()["type"], "session_started");
    assert_eq!(records.first().unwrap()["seed"], 2024);
    assert_eq!(records.last().unwrap()["type"], "session_ended");

    let of_type = |t: &str| records.iter().filter(|r| r["type"] == t).count();
    assert_eq!(of_type("command"), sent);
    assert_eq!(of_type("lock"), 30);

    let cleared: u64 = records
        .iter()
        .filter(|r| r["type"] == "lock")
        .map(|r| r["lines_cleared"].as_u64().unwrap())
        .sum();
    assert_eq!(cleared, summary.lines as u64);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_unwritable_event_log_fails_spawn() {
    let path = temp_log("missing-dir").join("nested").join("events.jsonl");
    let config = EngineConfig::default().with_event_log(path);

    let err = session::spawn(&config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("event log"));
}

#[tokio::test]
async fn test_subscribers_see_settled_snapshot() {
    let mut session = session::spawn(&EngineConfig::default().with_seed(8))
        .await
        .unwrap();
    let mut observer = session.subscribe();

    session.send(GameCommand::Start).await.unwrap();
    session.send(GameCommand::HardDrop).await.unwrap();
    let snap = session.wait_for(|s| s.piece_id == 2).await.unwrap();

    let seen = *observer.wait_for(|s| s.piece_id == 2).await.unwrap();
    assert_eq!(seen.hud, snap.hud);
    assert_eq!(seen.grid, snap.grid);

    session.shutdown().await.unwrap();
}
