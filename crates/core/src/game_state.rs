//! Game state module - manages the complete game state
//!
//! This module ties together the board, pieces, bag queue and scoring.
//! It resolves player commands and the gravity tick into board mutations,
//! including the lock transition (merge, line clear, score, respawn or game over)
//! and the single-slot hold.
//!
//! Every public mutator runs to completion before returning; callers never see
//! a merged-but-not-cleared board or a locked piece without its replacement.

use crate::board::Board;
use crate::collision::{collides, drop_distance};
use crate::pieces::{canonical_shape, spawn_position, HeldPiece, ShapeMatrix};
use crate::rotation::try_rotate;
use crate::rng::PieceQueue;
use crate::scoring::ScoreState;
use crate::snapshot::{ActiveSnapshot, GameSnapshot, HudSnapshot};
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Color,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Canonical orientation, centered and fully above the board
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = canonical_shape(kind);
        let (x, y) = spawn_position(&shape);
        Self {
            kind,
            shape,
            color: kind.color(),
            x,
            y,
        }
    }

    /// Absolute (x, y) of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.cells().map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Whether the piece would collide after shifting by (dx, dy)
    pub fn collides_at(&self, board: &Board, dx: i8, dy: i8) -> bool {
        collides(&self.shape, self.x + dx, self.y + dy, board)
    }

    /// Whether any occupied cell is above the visible board
    pub fn is_above_top(&self) -> bool {
        self.cells().any(|(_, y)| y < 0)
    }
}

/// Summary of the most recent lock, consumed by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockEvent {
    pub kind: PieceKind,
    pub x: i8,
    pub y: i8,
    pub lines_cleared: u32,
    pub score_delta: u32,
    pub level_before: u32,
    pub level_after: u32,
    pub game_over: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<ActivePiece>,
    held: Option<HeldPiece>,
    can_hold: bool,
    queue: PieceQueue,
    scores: ScoreState,
    status: GameStatus,
    /// Monotonic run id (increments on reset and on restart after game over).
    episode_id: u32,
    /// Pieces drawn from the queue this run (hold swaps do not count).
    piece_id: u32,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
}

impl GameState {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self {
            board: Board::new(),
            active: None,
            held: None,
            can_hold: true,
            queue: PieceQueue::new(seed),
            scores: ScoreState::new(),
            status: GameStatus::NotStarted,
            episode_id: 0,
            piece_id: 0,
            last_event: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn score(&self) -> u32 {
        self.scores.score()
    }

    pub fn level(&self) -> u32 {
        self.scores.level()
    }

    pub fn lines(&self) -> u32 {
        self.scores.lines()
    }

    pub fn scores(&self) -> &ScoreState {
        &self.scores
    }

    pub fn held(&self) -> Option<HeldPiece> {
        self.held
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Setup only: start from a prepared stack (puzzles, replays, tests).
    ///
    /// During play cells change only through merge and compaction, so any full
    /// rows in `board` are compacted away on install; nothing is scored for them.
    pub fn with_board(mut self, mut board: Board) -> Self {
        board.clear_full_rows();
        self.board = board;
        self
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Current gravity interval in milliseconds
    pub fn gravity_interval_ms(&self) -> u32 {
        self.scores.gravity_interval_ms()
    }

    /// Begin a run.
    ///
    /// From NotStarted the first piece spawns; from GameOver everything is
    /// reinitialized first. No-op while Running or Paused.
    pub fn start(&mut self) -> bool {
        match self.status {
            GameStatus::NotStarted => {}
            GameStatus::GameOver => self.reset(),
            GameStatus::Running | GameStatus::Paused => return false,
        }
        self.status = GameStatus::Running;
        self.spawn_next();
        true
    }

    /// Toggle Running <-> Paused; no-op in any other status
    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            GameStatus::NotStarted | GameStatus::GameOver => return false,
        };
        true
    }

    /// Reinitialize every entity to its creation-time value (status NotStarted).
    ///
    /// The fresh queue is seeded from the current RNG state, so the next run
    /// gets a different piece sequence.
    pub fn reset(&mut self) {
        let seed = self.queue.seed();
        let next_episode = self.episode_id.wrapping_add(1);
        *self = Self::new(seed);
        self.episode_id = next_episode;
    }

    /// Draw the next kind from the queue and make it the active piece
    fn spawn_next(&mut self) {
        let kind = self.queue.draw();
        self.piece_id = self.piece_id.wrapping_add(1);
        self.active = Some(ActivePiece::spawn(kind));
    }

    /// Replace the active piece with a fresh spawn of `kind`, bypassing the queue.
    ///
    /// No-op unless Running: GameOver, Paused and NotStarted never gain a piece.
    pub fn spawn_kind(&mut self, kind: PieceKind) -> bool {
        if !self.is_running() {
            return false;
        }
        self.active = Some(ActivePiece::spawn(kind));
        true
    }

    /// Try to move the active piece
    fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.collides_at(&self.board, dx, dy) {
            return false;
        }
        active.x += dx;
        active.y += dy;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Move down one row. Never locks; only gravity and hard drop do.
    pub fn soft_drop(&mut self) -> bool {
        self.try_move(0, 1)
    }

    /// Rotate clockwise with wall kicks; unchanged when every kick collides
    pub fn rotate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match try_rotate(&active.shape, active.x, active.y, &self.board) {
            Some((shape, x)) => {
                active.shape = shape;
                active.x = x;
                true
            }
            None => false,
        }
    }

    /// Drop to the lowest valid row and lock immediately
    pub fn hard_drop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.y += drop_distance(&active.shape, active.x, active.y, &self.board);
        self.lock_piece();
        true
    }

    /// Set the active piece aside.
    ///
    /// First hold stores the piece and spawns from the queue; later holds swap
    /// with the held kind, which respawns in canonical orientation. Allowed once
    /// per piece: `can_hold` comes back only after the next lock.
    pub fn hold(&mut self) -> bool {
        if !self.is_running() || !self.can_hold {
            return false;
        }
        let Some(active) = self.active.take() else {
            return false;
        };

        match self.held.replace(HeldPiece::new(active.kind)) {
            Some(previous) => self.active = Some(ActivePiece::spawn(previous.kind)),
            None => self.spawn_next(),
        }
        self.can_hold = false;
        true
    }

    /// Lock the active piece onto the board and resolve the consequences.
    ///
    /// Order matters: the above-top check uses the pre-merge geometry (merging
    /// drops those cells), lines are cleared before scoring, and the score uses
    /// the post-clear level.
    fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        let locks_above_top = piece.is_above_top();
        self.board.merge(piece.shape.cells(), piece.x, piece.y, piece.kind);

        let cleared = self.board.clear_full_rows().len();
        let result = self.scores.apply_line_clear(cleared);

        if locks_above_top {
            self.status = GameStatus::GameOver;
        } else {
            self.spawn_next();
            self.can_hold = true;
        }

        self.last_event = Some(LockEvent {
            kind: piece.kind,
            x: piece.x,
            y: piece.y,
            lines_cleared: cleared as u32,
            score_delta: result.points,
            level_before: result.level_before,
            level_after: result.level_after,
            game_over: locks_above_top,
        });
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Gravity tick: move down one row, or lock when blocked.
    ///
    /// Returns false (and does nothing) unless Running with an active piece.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.collides_at(&self.board, 0, 1) {
            self.lock_piece();
        } else {
            active.y += 1;
        }
        true
    }

    /// Row the active piece would come to rest on (ghost), without moving it
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        Some(active.y + drop_distance(&active.shape, active.x, active.y, &self.board))
    }

    /// Apply a command; returns whether it changed anything
    pub fn apply_command(&mut self, command: GameCommand) -> bool {
        if command.is_piece_command() && !self.is_running() {
            return false;
        }
        match command {
            GameCommand::Start => self.start(),
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::Reset => {
                self.reset();
                true
            }
            GameCommand::MoveLeft => self.move_left(),
            GameCommand::MoveRight => self.move_right(),
            GameCommand::SoftDrop => self.soft_drop(),
            GameCommand::HardDrop => self.hard_drop(),
            GameCommand::Rotate => self.rotate(),
            GameCommand::Hold => self.hold(),
        }
    }

    /// Pure form of [`apply_command`](Self::apply_command): `self` is left untouched.
    pub fn transition(&self, command: GameCommand) -> Self {
        let mut next = self.clone();
        next.apply_command(command);
        next
    }

    /// Pure form of [`tick`](Self::tick)
    pub fn ticked(&self) -> Self {
        let mut next = self.clone();
        next.tick();
        next
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.grid);
        if let Some(active) = self.active {
            for (x, y) in active.cells() {
                if !self.board.is_out_of_bounds(x, y) {
                    out.grid[y as usize][x as usize] = active.kind.code();
                }
            }
        }

        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
        out.hud = HudSnapshot {
            score: self.score(),
            level: self.level(),
            lines: self.lines(),
            next: self.queue.peek_n::<PREVIEW_LEN>(),
            held: self.held,
            can_hold: self.can_hold,
            status: self.status,
            gravity_ms: self.gravity_interval_ms(),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

/// Next state after `command`, leaving `state` untouched.
pub fn transition(state: &GameState, command: GameCommand) -> GameState {
    state.transition(command)
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
