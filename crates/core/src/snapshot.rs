//! Read-only views of a game for renderers and observers.
//!
//! A snapshot is a plain `Copy` value; producing one never mutates the game.

use crate::game_state::ActivePiece;
use crate::pieces::{HeldPiece, ShapeMatrix};
use crate::types::{Color, GameStatus, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, PREVIEW_LEN};

pub type Grid = [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Color,
    pub x: i8,
    pub y: i8,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            color: value.color,
            x: value.x,
            y: value.y,
        }
    }
}

/// Heads-up data: score, level, lines, preview, hold and status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HudSnapshot {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub next: [Option<PieceKind>; PREVIEW_LEN],
    pub held: Option<HeldPiece>,
    pub can_hold: bool,
    pub status: GameStatus,
    pub gravity_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSnapshot {
    /// Locked cells plus the active piece overlaid; 0 = empty, else [`PieceKind::code`].
    pub grid: Grid,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hud: HudSnapshot,
    pub episode_id: u32,
    pub piece_id: u32,
}

impl GameSnapshot {
    /// Kind occupying (x, y) in the composed grid, if any
    pub fn kind_at(&self, x: usize, y: usize) -> Option<PieceKind> {
        self.grid
            .get(y)
            .and_then(|row| row.get(x))
            .and_then(|&code| PieceKind::from_code(code))
    }

    /// Rows rendered as text, `.` for empty and the uppercase kind letter otherwise.
    pub fn grid_lines(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&code| {
                        PieceKind::from_code(code)
                            .and_then(|k| k.as_str().chars().next())
                            .map_or('.', |c| c.to_ascii_uppercase())
                    })
                    .collect()
            })
            .collect()
    }
}
