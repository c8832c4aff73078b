//! Integration tests for the game through the public facade

use blockfall::core::{transition, Board, GameState, HeldPiece};
use blockfall::engine::{GameClock, IntervalTimer, ManualTimer, Timer};
use blockfall::types::{GameCommand, GameStatus, PieceKind, QUEUE_MIN_LEN};
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready, task};

fn started(seed: u32) -> GameState {
    let mut state = GameState::new(seed);
    state.start();
    state
}

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::new(12345);
    assert_eq!(state.status(), GameStatus::NotStarted);

    assert!(state.apply_command(GameCommand::Start));
    assert_eq!(state.status(), GameStatus::Running);
    assert!(state.active().is_some());

    assert!(state.apply_command(GameCommand::TogglePause));
    assert_eq!(state.status(), GameStatus::Paused);
    assert!(state.apply_command(GameCommand::TogglePause));
    assert_eq!(state.status(), GameStatus::Running);

    assert!(state.apply_command(GameCommand::Reset));
    assert_eq!(state.status(), GameStatus::NotStarted);
    assert!(state.active().is_none());
}

#[test]
fn test_o_piece_end_to_end() {
    let mut state = started(12345);
    state.spawn_kind(PieceKind::O);

    let active = state.active().unwrap();
    assert_eq!((active.x, active.y), (4, -2));
    let front = state.queue().peek().unwrap();

    assert!(state.apply_command(GameCommand::HardDrop));

    for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
        assert!(state.board().is_occupied(x, y), "({}, {})", x, y);
    }
    assert_eq!(state.board().filled_count(), 4);
    assert_eq!(state.score(), 0);
    assert!(state.can_hold());
    assert_eq!(state.active().unwrap().kind, front);
    assert_eq!(state.queue().len(), QUEUE_MIN_LEN);
}

#[test]
fn test_same_seed_same_game() {
    let commands = [
        GameCommand::Rotate,
        GameCommand::MoveLeft,
        GameCommand::HardDrop,
        GameCommand::Hold,
        GameCommand::MoveRight,
        GameCommand::MoveRight,
        GameCommand::HardDrop,
        GameCommand::SoftDrop,
        GameCommand::HardDrop,
    ];

    let mut a = started(777);
    let mut b = started(777);
    for cmd in commands {
        assert_eq!(a.apply_command(cmd), b.apply_command(cmd));
    }
    assert_eq!(a.board(), b.board());
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_transition_leaves_input_untouched() {
    let state = started(9);
    let before = state.snapshot();

    let after = transition(&state, GameCommand::HardDrop);

    assert_eq!(state.snapshot(), before);
    assert_eq!(after.board().filled_count(), 4);
}

#[test]
fn test_hold_swap_round_trip() {
    let mut state = started(4);
    state.spawn_kind(PieceKind::I);

    assert!(state.apply_command(GameCommand::Hold));
    assert_eq!(state.held(), Some(HeldPiece::new(PieceKind::I)));
    assert!(!state.apply_command(GameCommand::Hold));

    state.apply_command(GameCommand::HardDrop);
    let current = state.active().unwrap().kind;
    assert!(state.apply_command(GameCommand::Hold));
    assert_eq!(state.active().unwrap().kind, PieceKind::I);
    assert_eq!(state.held().unwrap().kind, current);
}

#[test]
fn test_tetris_scores_800() {
    let board = Board::from_rows(&["#########."; 4], PieceKind::S);
    let mut state = started(1).with_board(board);
    state.spawn_kind(PieceKind::I);

    state.apply_command(GameCommand::Rotate);
    while state.apply_command(GameCommand::MoveRight) {}
    state.apply_command(GameCommand::HardDrop);

    assert_eq!(state.lines(), 4);
    assert_eq!(state.score(), 800);
    assert_eq!(state.board().filled_count(), 0);

    let event = state.take_last_event().unwrap();
    assert_eq!(event.lines_cleared, 4);
    assert_eq!(event.score_delta, 800);
}

#[test]
fn test_stacking_to_the_top_ends_the_game() {
    let mut state = started(31);
    let mut drops = 0;
    while state.status() == GameStatus::Running {
        state.apply_command(GameCommand::HardDrop);
        drops += 1;
        assert!(drops < 200, "game never ended");
    }

    assert_eq!(state.status(), GameStatus::GameOver);
    assert!(state.active().is_none());
    assert!(!state.apply_command(GameCommand::MoveLeft));
    assert!(!state.tick());
    assert!(!state.spawn_kind(PieceKind::T));
    assert!(state.active().is_none());

    // Start from GameOver begins a fresh run.
    assert!(state.apply_command(GameCommand::Start));
    assert_eq!(state.board().filled_count(), 0);
    assert_eq!(state.score(), 0);
    assert_eq!(state.episode_id(), 1);
}

#[test]
fn test_reset_gives_new_sequence() {
    let mut state = GameState::new(5);
    state.reset();

    assert_eq!(state.queue().len(), QUEUE_MIN_LEN);
    // Reseeded from the RNG state, not the original seed.
    assert_ne!(state.queue().seed(), GameState::new(5).queue().seed());
}

#[test]
fn test_clock_drives_gravity_to_lock() {
    let mut clock = GameClock::new(GameState::new(21), ManualTimer::new());
    clock.apply(GameCommand::Start);
    let kind = clock.state().active().unwrap().kind;

    // Twenty rows from fully above the board to the floor, then one more fire locks.
    let fires = clock.advance(Duration::from_millis(800 * 21));
    assert_eq!(fires, 21);
    assert_eq!(clock.state().board().filled_count(), 4);
    assert_eq!(clock.take_last_event().unwrap().kind, kind);
    assert_eq!(clock.timer().interval(), Some(Duration::from_millis(800)));
}

#[tokio::test(start_paused = true)]
async fn test_interval_timer_fires_only_while_armed() {
    let mut timer = IntervalTimer::new();
    timer.arm(Duration::from_millis(100));

    {
        let mut wait = task::spawn(timer.wait());
        assert_pending!(wait.poll());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_ready!(wait.poll());
    }

    timer.disarm();
    let mut wait = task::spawn(timer.wait());
    assert_pending!(wait.poll());
    tokio::time::advance(Duration::from_secs(10)).await;
    assert_pending!(wait.poll());
}
