//! Pieces module - tetromino shape matrices
//!
//! Each kind has one canonical matrix (rows of 0/1 cells). Other orientations are
//! derived by rotating the matrix, see [`crate::rotation`].

use crate::types::{Color, PieceKind, BOARD_WIDTH};

/// Largest matrix dimension of any tetromino
pub const MAX_DIM: usize = 4;

/// A small 0/1 matrix, at most 4x4, stored inline.
///
/// `rows`/`cols` give the live extent; cells outside it are always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeMatrix {
    rows: u8,
    cols: u8,
    bits: [[u8; MAX_DIM]; MAX_DIM],
}

impl ShapeMatrix {
    /// Build from row slices. Panics on rows wider/taller than 4 or ragged rows.
    pub const fn from_rows<const R: usize, const C: usize>(rows: [[u8; C]; R]) -> Self {
        assert!(R <= MAX_DIM && C <= MAX_DIM);
        let mut bits = [[0u8; MAX_DIM]; MAX_DIM];
        let mut r = 0;
        while r < R {
            let mut c = 0;
            while c < C {
                bits[r][c] = (rows[r][c] != 0) as u8;
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: R as u8,
            cols: C as u8,
            bits,
        }
    }

    pub(crate) const fn empty(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            bits: [[0u8; MAX_DIM]; MAX_DIM],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Whether cell (r, c) is set; false outside the live extent.
    pub fn is_set(&self, r: usize, c: usize) -> bool {
        r < self.rows() && c < self.cols() && self.bits[r][c] != 0
    }

    pub(crate) fn set(&mut self, r: usize, c: usize, on: bool) {
        self.bits[r][c] = on as u8;
    }

    /// Offsets `(dx, dy)` = `(col, row)` of every set cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        (0..self.rows()).flat_map(move |r| {
            (0..self.cols())
                .filter(move |&c| self.bits[r][c] != 0)
                .map(move |c| (c as i8, r as i8))
        })
    }

    /// Rows of the live extent as 0/1 vectors (for display and debugging).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows())
            .map(|r| self.bits[r][..self.cols()].to_vec())
            .collect()
    }
}

const I_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 1, 1, 1]]);
const J_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 0, 0], [1, 1, 1]]);
const L_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 0, 1], [1, 1, 1]]);
const O_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 1], [1, 1]]);
const S_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 1, 1], [1, 1, 0]]);
const T_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 1, 0], [1, 1, 1]]);
const Z_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 1, 0], [0, 1, 1]]);

/// Canonical (spawn) matrix for a kind
pub fn canonical_shape(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::I => I_SHAPE,
        PieceKind::J => J_SHAPE,
        PieceKind::L => L_SHAPE,
        PieceKind::O => O_SHAPE,
        PieceKind::S => S_SHAPE,
        PieceKind::T => T_SHAPE,
        PieceKind::Z => Z_SHAPE,
    }
}

/// Spawn origin for a matrix: horizontally centered (floor), fully above the board.
pub fn spawn_position(shape: &ShapeMatrix) -> (i8, i8) {
    let x = (BOARD_WIDTH as i8 - shape.cols() as i8).div_euclid(2);
    let y = -(shape.rows() as i8);
    (x, y)
}

/// Kind, canonical matrix and color of a piece set aside in the hold slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeldPiece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Color,
}

impl HeldPiece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: canonical_shape(kind),
            color: kind.color(),
        }
    }
}
