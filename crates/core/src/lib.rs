//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules and state management. It has **no
//! dependencies** on rendering, input, timers or I/O:
//!
//! - **Deterministic**: the same seed and command sequence produce the same game
//! - **Synchronous**: every operation runs to completion; no partial state is observable
//! - **Portable**: drive it from a terminal, a GUI, a test, or the async session
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of locked cells, merging and line clearing
//! - [`pieces`]: shape matrices, canonical shapes and spawn placement
//! - [`collision`]: wall/floor/occupancy checks and drop distance
//! - [`rotation`]: clockwise matrix rotation with horizontal kicks
//! - [`rng`]: 7-bag randomizer and the lookahead queue
//! - [`scoring`]: line-clear points, level and gravity interval
//! - [`game_state`]: the complete game, lock resolution and hold
//! - [`snapshot`]: read-only views for renderers
//!
//! # Game Rules
//!
//! - **7-Bag**: every batch of seven pieces contains each kind exactly once
//! - **Rotation**: clockwise only; kicks try horizontal offsets 0, -1, +1, -2, +2
//! - **Locking**: only gravity and hard drop lock; soft drop never does
//! - **Hold**: one slot, once per piece, restored after the next lock
//! - **Scoring**: 100/300/500/800 for 1-4 lines, times (level + 1)
//! - **Game over**: a piece locks with any cell above the visible board
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_core::types::{GameCommand, GameStatus, PieceKind};
//!
//! let mut game = GameState::new(12345);
//! game.start();
//! game.spawn_kind(PieceKind::O);
//!
//! game.apply_command(GameCommand::HardDrop);
//!
//! assert_eq!(game.board().filled_count(), 4);
//! assert_eq!(game.score(), 0); // drops award nothing
//! assert_eq!(game.status(), GameStatus::Running);
//! ```
//!
//! # Timing
//!
//! The core has no clock. The owner calls [`GameState::tick`] once per gravity
//! interval, which is `max(100, 800 - 80 * level)` milliseconds
//! ([`GameState::gravity_interval_ms`]).

pub mod board;
pub mod collision;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod rotation;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use collision::{collides, drop_distance};
pub use game_state::{transition, ActivePiece, GameState, LockEvent};
pub use pieces::{canonical_shape, spawn_position, HeldPiece, ShapeMatrix};
pub use rng::{BagRandomizer, PieceQueue, SimpleRng};
pub use rotation::{rotate_cw, try_rotate, KICK_OFFSETS};
pub use scoring::{calculate_level, calculate_line_score, gravity_interval_ms, ScoreResult, ScoreState};
pub use snapshot::{ActiveSnapshot, GameSnapshot, HudSnapshot};
