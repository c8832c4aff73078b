//! Gravity clock: keeps exactly one timer armed while a game is running.
//!
//! The game itself has no notion of time. [`GameClock`] owns the state and an
//! injected [`Timer`], and after every command or tick it brings the timer in
//! line with the state: armed at the level's gravity interval while Running,
//! disarmed otherwise.

use std::future::pending;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use blockfall_core::{GameSnapshot, GameState, LockEvent};
use blockfall_types::{GameCommand, GameStatus};

/// A periodic callback source with a settable interval.
pub trait Timer {
    /// (Re)start firing every `interval`, replacing any previous schedule.
    fn arm(&mut self, interval: Duration);

    /// Stop firing.
    fn disarm(&mut self);

    /// The armed interval, or None while disarmed.
    fn interval(&self) -> Option<Duration>;
}

/// Timer lifecycle change, as recorded by [`ManualTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Armed(Duration),
    Disarmed,
}

/// Timer driven by hand: records every arm/disarm and fires when time is advanced
/// through [`GameClock::advance`].
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    interval: Option<Duration>,
    elapsed: Duration,
    history: Vec<TimerEvent>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[TimerEvent] {
        &self.history
    }

    /// Time accumulated toward the next fire
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Timer for ManualTimer {
    fn arm(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.elapsed = Duration::ZERO;
        self.history.push(TimerEvent::Armed(interval));
    }

    fn disarm(&mut self) {
        self.interval = None;
        self.elapsed = Duration::ZERO;
        self.history.push(TimerEvent::Disarmed);
    }

    fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

/// Timer backed by `tokio::time::Interval`.
///
/// Must be armed from inside a tokio runtime.
#[derive(Debug, Default)]
pub struct IntervalTimer {
    inner: Option<Interval>,
    period: Option<Duration>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve at the next fire; never resolves while disarmed.
    pub async fn wait(&mut self) {
        match self.inner.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}

impl Timer for IntervalTimer {
    fn arm(&mut self, interval: Duration) {
        // First fire one full period from now, not immediately.
        let mut timer = interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.inner = Some(timer);
        self.period = Some(interval);
    }

    fn disarm(&mut self) {
        self.inner = None;
        self.period = None;
    }

    fn interval(&self) -> Option<Duration> {
        self.period
    }
}

/// A game plus the timer that drives its gravity.
#[derive(Debug)]
pub struct GameClock<T: Timer> {
    state: GameState,
    timer: T,
}

impl<T: Timer> GameClock<T> {
    pub fn new(state: GameState, timer: T) -> Self {
        let mut clock = Self { state, timer };
        clock.sync_timer();
        clock
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    /// Gravity interval the timer should be armed at while Running
    pub fn gravity_interval(&self) -> Duration {
        Duration::from_millis(self.state.gravity_interval_ms() as u64)
    }

    /// Apply a command, then re-sync the timer
    pub fn apply(&mut self, command: GameCommand) -> bool {
        let changed = self.state.apply_command(command);
        self.sync_timer();
        changed
    }

    /// Deliver one timer fire, then re-sync the timer
    pub fn tick(&mut self) -> bool {
        let changed = self.state.tick();
        self.sync_timer();
        changed
    }

    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.state.take_last_event()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Running: armed at the current interval (re-armed only when it differs).
    /// Anything else: disarmed.
    fn sync_timer(&mut self) {
        if self.state.is_running() {
            let wanted = self.gravity_interval();
            if self.timer.interval() != Some(wanted) {
                self.timer.arm(wanted);
            }
        } else if self.timer.interval().is_some() {
            self.timer.disarm();
        }
    }
}

impl GameClock<ManualTimer> {
    /// Let `by` pass, delivering every fire that falls inside it.
    ///
    /// A fire that changes the interval (level up) or stops the game restarts
    /// the countdown. Returns the number of fires delivered.
    pub fn advance(&mut self, by: Duration) -> u32 {
        let mut remaining = by;
        let mut fired = 0;
        while let Some(interval) = self.timer.interval() {
            let until_fire = interval.saturating_sub(self.timer.elapsed);
            if remaining < until_fire {
                self.timer.elapsed += remaining;
                break;
            }
            remaining -= until_fire;
            self.timer.elapsed = Duration::ZERO;
            self.tick();
            fired += 1;
        }
        fired
    }
}
