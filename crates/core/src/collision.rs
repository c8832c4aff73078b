//! Collision detection for a shape placed at an offset.

use crate::board::Board;
use crate::pieces::ShapeMatrix;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Whether `shape` placed with its top-left at (`x`, `y`) hits a wall, the floor,
/// or an occupied cell.
///
/// Cells above the board (row < 0) are only checked against the side walls, so
/// pieces can spawn and rotate above the visible area.
pub fn collides(shape: &ShapeMatrix, x: i8, y: i8, board: &Board) -> bool {
    shape.cells().any(|(dx, dy)| {
        let col = x as i16 + dx as i16;
        let row = y as i16 + dy as i16;
        if col < 0 || col >= BOARD_WIDTH as i16 || row >= BOARD_HEIGHT as i16 {
            return true;
        }
        row >= 0 && board.is_occupied(col as i8, row as i8)
    })
}

/// Largest `d >= 0` such that the shape fits `d` rows below `y`.
///
/// Returns 0 when the piece already rests on something (or already collides).
pub fn drop_distance(shape: &ShapeMatrix, x: i8, y: i8, board: &Board) -> i8 {
    let mut distance: i8 = 0;
    while !collides(shape, x, y + distance + 1, board) {
        distance += 1;
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::canonical_shape;
    use crate::types::PieceKind;

    #[test]
    fn walls_and_floor_collide() {
        let board = Board::new();
        let o = canonical_shape(PieceKind::O);

        assert!(collides(&o, -1, 0, &board));
        assert!(collides(&o, 9, 0, &board));
        assert!(collides(&o, 4, 19, &board));
        assert!(!collides(&o, 0, 0, &board));
        assert!(!collides(&o, 8, 18, &board));
    }

    #[test]
    fn rows_above_board_are_open() {
        let mut board = Board::new();
        for x in 0..10 {
            board.set(x, 0, Some(PieceKind::Z));
        }
        let i = canonical_shape(PieceKind::I);

        assert!(!collides(&i, 3, -1, &board));
        assert!(collides(&i, 3, 0, &board));
        // Walls still apply above the board.
        assert!(collides(&i, 7, -5, &board));
    }

    #[test]
    fn occupied_cell_collides() {
        let mut board = Board::new();
        board.set(5, 10, Some(PieceKind::T));
        let t = canonical_shape(PieceKind::T);

        // T bottom row spans columns x..x+2 at row y+1.
        assert!(collides(&t, 4, 9, &board));
        assert!(!collides(&t, 6, 9, &board));
    }

    #[test]
    fn drop_distance_reaches_floor() {
        let board = Board::new();
        let o = canonical_shape(PieceKind::O);
        assert_eq!(drop_distance(&o, 4, -2, &board), 20);
        assert_eq!(drop_distance(&o, 4, 18, &board), 0);
    }
}
