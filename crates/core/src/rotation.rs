//! Rotation module - 90° matrix rotation with horizontal wall kicks
//!
//! Rotation is always clockwise. After rotating, the piece tries the horizontal
//! offsets in [`KICK_OFFSETS`] in order and keeps the first one that fits. The row
//! is never adjusted. This is the complete kick rule, not an orientation-aware
//! kick table.

use crate::board::Board;
use crate::collision::collides;
use crate::pieces::ShapeMatrix;

/// Horizontal offsets tried after a rotation, in priority order
pub const KICK_OFFSETS: [i8; 5] = [0, -1, 1, -2, 2];

/// Rotate a matrix 90° clockwise.
///
/// `out[r][c] = in[rows - 1 - c][r]`; an R x C matrix becomes C x R.
pub fn rotate_cw(shape: &ShapeMatrix) -> ShapeMatrix {
    let rows = shape.rows();
    let cols = shape.cols();
    let mut out = ShapeMatrix::empty(cols as u8, rows as u8);
    for r in 0..cols {
        for c in 0..rows {
            out.set(r, c, shape.is_set(rows - 1 - c, r));
        }
    }
    out
}

/// Try to rotate the shape at (`x`, `y`) clockwise.
///
/// Returns the rotated matrix and the accepted x, or None when every kick collides.
pub fn try_rotate(shape: &ShapeMatrix, x: i8, y: i8, board: &Board) -> Option<(ShapeMatrix, i8)> {
    let rotated = rotate_cw(shape);
    KICK_OFFSETS
        .iter()
        .map(|&dx| x + dx)
        .find(|&kx| !collides(&rotated, kx, y, board))
        .map(|kx| (rotated, kx))
}
