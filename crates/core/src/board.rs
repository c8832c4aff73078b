//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty or holds the kind of the
//! piece that filled it (its color token).
//! Uses a flat array for cache locality and zero-allocation line clears.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Negative y is the open space above the visible board.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Upper bound on rows reported by a single scan
pub const MAX_ROWS: usize = BOARD_HEIGHT as usize;

/// Row indices, top to bottom.
pub type RowList = ArrayVec<usize, MAX_ROWS>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_none()
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    fn row(&self, y: usize) -> &[Cell] {
        let start = y * BOARD_WIDTH as usize;
        &self.cells[start..start + BOARD_WIDTH as usize]
    }

    /// Full rows, scanned top to bottom
    pub fn full_rows(&self) -> RowList {
        (0..BOARD_HEIGHT as usize)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove `rows` and compact the grid.
    ///
    /// Rows above each removed row shift down; the same number of empty rows
    /// are prepended at the top. Out-of-range and duplicate indices are ignored.
    /// Returns the new board and the number of rows removed; `self` is untouched.
    pub fn clear_and_compact(&self, rows: &[usize]) -> (Board, usize) {
        let width = BOARD_WIDTH as usize;
        let mut out = Board::new();
        let mut write_y = BOARD_HEIGHT as usize;

        // Two-pointer scan from the bottom: surviving rows are copied down.
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if rows.contains(&read_y) {
                continue;
            }
            write_y -= 1;
            let src = read_y * width;
            let dst = write_y * width;
            out.cells[dst..dst + width].copy_from_slice(&self.cells[src..src + width]);
        }

        // write_y now counts the removed rows, which are the empty rows on top.
        (out, write_y)
    }

    /// Clear all full rows in place and return their indices (top to bottom)
    pub fn clear_full_rows(&mut self) -> RowList {
        let rows = self.full_rows();
        if !rows.is_empty() {
            let (compacted, _) = self.clear_and_compact(&rows);
            *self = compacted;
        }
        rows
    }

    /// Write `kind` at every offset cell placed at origin (x, y).
    ///
    /// Cells above the board or outside it are skipped, so a piece partially
    /// above the top can still be merged.
    pub fn merge<I>(&mut self, cells: I, x: i8, y: i8, kind: PieceKind)
    where
        I: IntoIterator<Item = (i8, i8)>,
    {
        for (dx, dy) in cells {
            self.set(x + dx, y + dy, Some(kind));
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Export cells as kind codes (0 = empty)
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, code) in row.iter_mut().enumerate() {
                *code = self.cells[y * BOARD_WIDTH as usize + x].map_or(0, |k| k.code());
            }
        }
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [None; BOARD_SIZE];
    }

    /// Build a board from text rows, bottom-aligned.
    ///
    /// `.` is empty; any other character fills the cell with `kind`.
    /// Handy for setting up positions in tests and benches.
    pub fn from_rows(rows: &[&str], kind: PieceKind) -> Self {
        let mut board = Board::new();
        let offset = (BOARD_HEIGHT as usize).saturating_sub(rows.len());
        for (i, line) in rows.iter().enumerate().take(BOARD_HEIGHT as usize) {
            for (x, ch) in line.chars().enumerate().take(BOARD_WIDTH as usize) {
                if ch != '.' {
                    board.set(x as i8, (offset + i) as i8, Some(kind));
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
