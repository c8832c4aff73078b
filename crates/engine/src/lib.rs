//! Runtime around the pure game core.
//!
//! - [`clock`]: the gravity timer lifecycle over an injectable [`Timer`]
//! - [`session`]: a tokio task that serializes commands and gravity ticks
//! - [`config`]: `BLOCKFALL_*` environment configuration
//! - [`event_log`]: JSON-lines log of commands, locks and status changes
//! - [`place`]: placement planning used by automated players

pub mod clock;
pub mod config;
pub mod event_log;
pub mod place;
pub mod session;

pub use clock::{GameClock, IntervalTimer, ManualTimer, Timer, TimerEvent};
pub use config::EngineConfig;
pub use event_log::{EventLog, EventRecord};
pub use place::{best_plan, plan_place, PlaceError, Placement, Plan};
pub use session::{spawn, SessionHandle, SessionSummary};
