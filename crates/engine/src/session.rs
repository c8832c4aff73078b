//! Async game session.
//!
//! One tokio task owns the [`GameClock`] and serializes everything that touches
//! the game: commands arrive on a bounded mpsc channel, gravity fires from the
//! armed [`IntervalTimer`]. Each event runs to completion, then a fresh snapshot
//! is published on a watch channel, so observers only ever see settled states.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use blockfall_core::{GameSnapshot, GameState};
use blockfall_types::{GameCommand, GameStatus};

use crate::clock::{GameClock, IntervalTimer};
use crate::config::EngineConfig;
use crate::event_log::{EventLog, EventRecord};

/// Request delivered to the session task.
#[derive(Debug)]
enum Request {
    Command(GameCommand),
    Inspect(oneshot::Sender<GameState>),
}

/// Final figures of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub seed: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub pieces: u32,
    pub episode_id: u32,
    pub status: GameStatus,
}

impl SessionSummary {
    fn new(seed: u32, state: &GameState) -> Self {
        Self {
            seed,
            score: state.score(),
            lines: state.lines(),
            level: state.level(),
            pieces: state.piece_id(),
            episode_id: state.episode_id(),
            status: state.status(),
        }
    }
}

/// Client side of a running session.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) ends the session.
#[derive(Debug)]
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<GameSnapshot>,
    task: JoinHandle<Result<SessionSummary>>,
}

impl SessionHandle {
    /// Queue a command; waits only when the command buffer is full.
    pub async fn send(&self, command: GameCommand) -> Result<()> {
        self.requests
            .send(Request::Command(command))
            .await
            .map_err(|_| anyhow!("session closed"))
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> GameSnapshot {
        *self.snapshots.borrow()
    }

    /// A receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `pred`, and return it.
    pub async fn wait_for<F>(&mut self, mut pred: F) -> Result<GameSnapshot>
    where
        F: FnMut(&GameSnapshot) -> bool,
    {
        let snap = self
            .snapshots
            .wait_for(|s| pred(s))
            .await
            .context("session closed")?;
        Ok(*snap)
    }

    /// Copy of the full game state, taken between two events.
    pub async fn inspect(&self) -> Result<GameState> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Inspect(tx))
            .await
            .map_err(|_| anyhow!("session closed"))?;
        rx.await.context("session closed before replying")
    }

    /// Stop the session and collect its summary.
    pub async fn shutdown(self) -> Result<SessionSummary> {
        drop(self.requests);
        self.task.await.context("session task panicked")?
    }
}

/// Start a session on the current tokio runtime.
///
/// The game begins in NotStarted; send [`GameCommand::Start`] to play.
pub async fn spawn(config: &EngineConfig) -> Result<SessionHandle> {
    let log = match &config.event_log {
        Some(path) => Some(EventLog::open(path).await?),
        None => None,
    };

    let state = GameState::new(config.seed);
    let clock = GameClock::new(state, IntervalTimer::new());
    let (requests, rx) = mpsc::channel(config.command_buffer.max(1));
    let (snap_tx, snapshots) = watch::channel(clock.snapshot());

    println!("[Engine] session started seed={}", config.seed);
    if let Some(log) = &log {
        println!("[Engine] event log at {}", log.path().display());
        log.record(EventRecord::SessionStarted { seed: config.seed });
    }

    let task = tokio::spawn(run_session(config.seed, clock, rx, snap_tx, log));

    Ok(SessionHandle {
        requests,
        snapshots,
        task,
    })
}

async fn run_session(
    seed: u32,
    mut clock: GameClock<IntervalTimer>,
    mut requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<GameSnapshot>,
    log: Option<EventLog>,
) -> Result<SessionSummary> {
    loop {
        let status_before = clock.status();

        tokio::select! {
            request = requests.recv() => {
                match request {
                    Some(Request::Command(command)) => {
                        let applied = clock.apply(command);
                        if let Some(log) = &log {
                            log.record(EventRecord::Command { command, applied });
                        }
                    }
                    Some(Request::Inspect(reply)) => {
                        let _ = reply.send(clock.state().clone());
                        continue;
                    }
                    None => break,
                }
            }
            _ = clock.timer_mut().wait() => {
                clock.tick();
            }
        }

        if let Some(event) = clock.take_last_event() {
            if let Some(log) = &log {
                log.record(EventRecord::Lock(event));
            }
        }

        let status = clock.status();
        if status != status_before {
            if let Some(log) = &log {
                log.record(EventRecord::Status { status });
            }
            if status == GameStatus::GameOver {
                let state = clock.state();
                println!(
                    "[Engine] game over score={} lines={} level={}",
                    state.score(),
                    state.lines(),
                    state.level()
                );
            }
        }

        snapshots.send_replace(clock.snapshot());
    }

    let summary = SessionSummary::new(seed, clock.state());
    println!(
        "[Engine] session ended score={} pieces={}",
        summary.score, summary.pieces
    );

    if let Some(log) = log {
        log.record(EventRecord::SessionEnded {
            score: summary.score,
            lines: summary.lines,
            level: summary.level,
            pieces: summary.pieces,
        });
        if let Err(e) = log.close().await {
            eprintln!("[Engine] event log close failed: {:#}", e);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn started(seed: u32) -> SessionHandle {
        let mut handle = spawn(&EngineConfig::default().with_seed(seed)).await.unwrap();
        handle.send(GameCommand::Start).await.unwrap();
        handle
            .wait_for(|s| s.hud.status == GameStatus::Running)
            .await
            .unwrap();
        handle
    }

    fn active_y(handle: &SessionHandle) -> i8 {
        handle.snapshot().active.unwrap().y
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_waits_for_start() {
        let handle = spawn(&EngineConfig::default()).await.unwrap();
        sleep(Duration::from_secs(10)).await;

        let snap = handle.snapshot();
        assert_eq!(snap.hud.status, GameStatus::NotStarted);
        assert!(snap.active.is_none());

        let summary = handle.shutdown().await.unwrap();
        assert_eq!(summary.pieces, 0);
        assert_eq!(summary.status, GameStatus::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gravity_follows_interval() {
        let handle = started(3).await;
        let y0 = active_y(&handle);

        sleep(Duration::from_millis(800 * 3 + 10)).await;
        assert_eq!(active_y(&handle), y0 + 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_gravity() {
        let mut handle = started(3).await;
        handle.send(GameCommand::TogglePause).await.unwrap();
        handle
            .wait_for(|s| s.hud.status == GameStatus::Paused)
            .await
            .unwrap();
        let y0 = active_y(&handle);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(active_y(&handle), y0);

        handle.send(GameCommand::TogglePause).await.unwrap();
        handle
            .wait_for(|s| s.hud.status == GameStatus::Running)
            .await
            .unwrap();
        sleep(Duration::from_millis(810)).await;
        assert_eq!(active_y(&handle), y0 + 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_hard_drop_spawns_next_piece() {
        let mut handle = started(5).await;
        let next = handle.snapshot().hud.next[0];

        handle.send(GameCommand::HardDrop).await.unwrap();
        let snap = handle.wait_for(|s| s.piece_id == 2).await.unwrap();

        assert_eq!(snap.active.map(|a| a.kind), next);
        assert_eq!(snap.hud.score, 0);
        assert!(snap.hud.can_hold);
        let filled = snap.grid.iter().flatten().filter(|&&c| c != 0).count();
        assert!(filled >= 4);

        let summary = handle.shutdown().await.unwrap();
        assert_eq!(summary.pieces, 2);
        assert_eq!(summary.seed, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inspect_returns_full_state() {
        let handle = started(11).await;
        let state = handle.inspect().await.unwrap();

        assert_eq!(state.status(), GameStatus::Running);
        assert_eq!(state.snapshot().active, handle.snapshot().active);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_reported_in_summary() {
        let mut handle = started(2).await;
        loop {
            let before = handle.snapshot().piece_id;
            handle.send(GameCommand::HardDrop).await.unwrap();
            let snap = handle
                .wait_for(|s| s.piece_id > before || s.hud.status == GameStatus::GameOver)
                .await
                .unwrap();
            if snap.hud.status == GameStatus::GameOver {
                break;
            }
        }

        // Ticks and piece commands are ignored from here on.
        sleep(Duration::from_secs(10)).await;
        let summary = handle.shutdown().await.unwrap();
        assert_eq!(summary.status, GameStatus::GameOver);
    }
}
