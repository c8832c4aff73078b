//! Placement planning: turn "rotate n times, land at column x" into commands.
//!
//! Plans are simulated on a copy of the state with the same command path the
//! player uses, so a plan that validates here replays identically on the live
//! game (as long as no gravity tick lands in between).

use blockfall_core::{Board, GameState};
use blockfall_types::{GameCommand, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    HoldUnavailable,
    RotationBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn message(self) -> &'static str {
        match self {
            PlaceError::HoldUnavailable => "hold requested when unavailable",
            PlaceError::RotationBlocked => "could not rotate to target orientation",
            PlaceError::XOutOfBounds => "target x would place piece out of bounds",
            PlaceError::XBlocked => "could not move to target x due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
        }
    }
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

/// Target of one placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Clockwise quarter turns from the current orientation (0-3)
    pub rotations: u8,
    /// Final x of the shape's left column
    pub x: i8,
    pub use_hold: bool,
}

/// A validated placement: its commands and the state they lead to
#[derive(Debug, Clone)]
pub struct Plan {
    pub placement: Placement,
    pub commands: Vec<GameCommand>,
    pub result: GameState,
}

/// Simulate `placement` on a copy of `state`.
pub fn plan_place(state: &GameState, placement: Placement) -> Result<Plan, PlaceError> {
    if !state.is_running() {
        return Err(PlaceError::NotPlayable);
    }

    let mut sim = state.clone();
    let mut commands = Vec::with_capacity(16);
    let mut push = |sim: &mut GameState, cmd: GameCommand| {
        commands.push(cmd);
        sim.apply_command(cmd)
    };

    // Hold first if requested.
    if placement.use_hold && !push(&mut sim, GameCommand::Hold) {
        return Err(PlaceError::HoldUnavailable);
    }
    if sim.active().is_none() {
        return Err(PlaceError::NoActive);
    }

    for _ in 0..placement.rotations % 4 {
        if !push(&mut sim, GameCommand::Rotate) {
            return Err(PlaceError::RotationBlocked);
        }
    }

    let Some(active) = sim.active() else {
        return Err(PlaceError::NoActive);
    };

    // Validate x bounds based on the rotated shape.
    // Widened: a caller-supplied x near i8::MAX must not overflow.
    let right = i16::from(placement.x) + active.shape.cols() as i16;
    if placement.x < 0 || right > BOARD_WIDTH as i16 {
        return Err(PlaceError::XOutOfBounds);
    }

    let dx = placement.x - active.x;
    let step = if dx > 0 {
        GameCommand::MoveRight
    } else {
        GameCommand::MoveLeft
    };
    for _ in 0..dx.unsigned_abs() {
        if !push(&mut sim, step) {
            return Err(PlaceError::XBlocked);
        }
    }

    if !push(&mut sim, GameCommand::HardDrop) {
        return Err(PlaceError::NotPlayable);
    }

    Ok(Plan {
        placement,
        commands,
        result: sim,
    })
}

/// Shape features of a board, used to rank placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardFeatures {
    pub aggregate_height: u32,
    pub holes: u32,
    pub bumpiness: u32,
}

pub fn board_features(board: &Board) -> BoardFeatures {
    let mut heights = [0u32; BOARD_WIDTH as usize];
    let mut holes = 0;

    for x in 0..BOARD_WIDTH as i8 {
        let mut seen_block = false;
        for y in 0..BOARD_HEIGHT as i8 {
            if board.is_occupied(x, y) {
                if !seen_block {
                    heights[x as usize] = (BOARD_HEIGHT as i8 - y) as u32;
                    seen_block = true;
                }
            } else if seen_block {
                holes += 1;
            }
        }
    }

    let bumpiness = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();

    BoardFeatures {
        aggregate_height: heights.iter().sum(),
        holes,
        bumpiness,
    }
}

/// Linear evaluation of a placement result (higher is better).
pub fn evaluate(before: &GameState, after: &GameState) -> f64 {
    if after.status() != before.status() {
        return f64::NEG_INFINITY;
    }
    let f = board_features(after.board());
    let cleared = after.lines().saturating_sub(before.lines());

    -0.510066 * f.aggregate_height as f64 + 0.760666 * cleared as f64
        - 0.35663 * f.holes as f64
        - 0.184483 * f.bumpiness as f64
}

/// Best one-piece placement by [`evaluate`], considering hold when available.
///
/// Ties keep the first candidate (no hold, fewest rotations, leftmost x).
pub fn best_plan(state: &GameState) -> Option<Plan> {
    let hold_options: &[bool] = if state.can_hold() {
        &[false, true]
    } else {
        &[false]
    };

    let mut best: Option<(f64, Plan)> = None;
    for &use_hold in hold_options {
        for rotations in 0..4 {
            for x in 0..BOARD_WIDTH as i8 {
                let placement = Placement {
                    rotations,
                    x,
                    use_hold,
                };
                let Ok(plan) = plan_place(state, placement) else {
                    continue;
                };
                let score = evaluate(state, &plan.result);
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, plan));
                }
            }
        }
    }
    best.map(|(_, plan)| plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_types::{GameStatus, PieceKind};

    fn running(kind: PieceKind) -> GameState {
        let mut gs = GameState::new(1);
        gs.start();
        gs.spawn_kind(kind);
        gs
    }

    #[test]
    fn place_rejected_when_paused() {
        let mut gs = running(PieceKind::T);
        gs.toggle_pause();

        let err = plan_place(
            &gs,
            Placement {
                rotations: 0,
                x: 3,
                use_hold: false,
            },
        )
        .unwrap_err();
        assert_eq!(err, PlaceError::NotPlayable);
    }

    #[test]
    fn place_rejected_when_x_out_of_bounds() {
        let gs = running(PieceKind::T);
        for x in [-1, 8, 50, i8::MAX, i8::MIN] {
            let err = plan_place(
                &gs,
                Placement {
                    rotations: 0,
                    x,
                    use_hold: false,
                },
            )
            .unwrap_err();
            assert_eq!(err, PlaceError::XOutOfBounds, "x = {}", x);
        }
    }

    #[test]
    fn place_rejected_when_path_blocked() {
        // A wall at column 2 stops a T travelling from x = 3 to x = 0 once it is
        // on the board (rows above the top are open).
        let board = Board::from_rows(&["..#......."; 20], PieceKind::Z);
        let mut gs = running(PieceKind::T).with_board(board);
        for _ in 0..5 {
            gs.soft_drop();
        }

        let err = plan_place(
            &gs,
            Placement {
                rotations: 0,
                x: 0,
                use_hold: false,
            },
        )
        .unwrap_err();
        assert_eq!(err, PlaceError::XBlocked);
    }

    #[test]
    fn second_hold_is_rejected() {
        let mut gs = running(PieceKind::T);
        gs.hold();
        let err = plan_place(
            &gs,
            Placement {
                rotations: 0,
                x: 0,
                use_hold: true,
            },
        )
        .unwrap_err();
        assert_eq!(err, PlaceError::HoldUnavailable);
        assert_eq!(err.to_string(), "hold requested when unavailable");
    }

    #[test]
    fn plan_commands_replay_to_same_state() {
        let gs = running(PieceKind::L);
        let plan = plan_place(
            &gs,
            Placement {
                rotations: 1,
                x: 0,
                use_hold: false,
            },
        )
        .unwrap();
        assert_eq!(
            plan.commands,
            vec![
                GameCommand::Rotate,
                GameCommand::MoveLeft,
                GameCommand::MoveLeft,
                GameCommand::MoveLeft,
                GameCommand::HardDrop,
            ]
        );

        let mut live = gs.clone();
        for cmd in &plan.commands {
            assert!(live.apply_command(*cmd));
        }
        assert_eq!(live.board(), plan.result.board());
        assert_eq!(live.piece_id(), gs.piece_id() + 1);
    }

    #[test]
    fn features_of_simple_board() {
        let board = Board::from_rows(&["#.........", "..#.......", "###......."], PieceKind::O);
        let f = board_features(&board);
        // Heights: 3, 1, 2, then zeros.
        assert_eq!(f.aggregate_height, 6);
        // Column 0 has a hole at the middle row; column 1 has none.
        assert_eq!(f.holes, 1);
        assert_eq!(f.bumpiness, 2 + 1 + 2);
    }

    #[test]
    fn best_plan_completes_an_open_line() {
        let board = Board::from_rows(&["####..####"], PieceKind::J);
        let gs = running(PieceKind::O).with_board(board);
        let mut no_hold = gs.clone();
        // Force the O by spending the hold first, then respawning O.
        no_hold.hold();
        no_hold.spawn_kind(PieceKind::O);

        let plan = best_plan(&no_hold).unwrap();
        assert_eq!(plan.placement.x, 4);
        assert_eq!(plan.result.lines(), 1);
        assert_eq!(plan.result.status(), GameStatus::Running);
    }
}
