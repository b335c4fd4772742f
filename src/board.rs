//! Playfield grid, collision testing and row clearing

use crate::shape::Shape;
use ratatui::style::Color;

/// Playfield dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// Outcome of writing a shape into the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Commit {
    /// Every cell was written
    Written,
    /// Some cell sits above the top row; nothing was written
    AboveBoard,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top, rows increase downward
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at (x, y). Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = Self::index(x, y)?;
        Some(self.cells[y][x])
    }

    /// Set the cell at (x, y). Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some((x, y)) => {
                self.cells[y][x] = cell;
                true
            }
            None => false,
        }
    }

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < BOARD_WIDTH && y < BOARD_HEIGHT).then_some((x, y))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }

    /// Whether `shape` placed with its top-left corner at (x, y) hits a wall,
    /// the floor, or a filled cell.
    ///
    /// Cells above the top row are never occupied, so a piece may hang partly
    /// above the board while it falls in.
    pub fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape.cells().any(|(r, c)| {
            let bx = x + c as i32;
            let by = y + r as i32;
            if bx < 0 || bx >= BOARD_WIDTH as i32 || by >= BOARD_HEIGHT as i32 {
                return true;
            }
            by >= 0 && self.cells[by as usize][bx as usize].is_filled()
        })
    }

    /// Write `shape` into the board with the given color.
    ///
    /// If any set cell lands above the top row the board is left untouched and
    /// [`Commit::AboveBoard`] is returned. Cells outside the side walls or
    /// below the floor are skipped; callers only commit positions that passed
    /// [`Board::collides`].
    pub fn commit(&mut self, shape: &Shape, x: i32, y: i32, color: Color) -> Commit {
        if shape.cells().any(|(r, _)| y + (r as i32) < 0) {
            return Commit::AboveBoard;
        }
        for (r, c) in shape.cells() {
            self.set(x + c as i32, y + r as i32, Cell::Filled(color));
        }
        Commit::Written
    }

    /// Remove every full row and return how many were removed.
    ///
    /// Rows are compacted bottom-up; the remaining rows keep their relative
    /// order and empty rows are inserted at the top.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut write_row = BOARD_HEIGHT;

        for read_row in (0..BOARD_HEIGHT).rev() {
            if !self.is_row_full(read_row) {
                write_row -= 1;
                if write_row != read_row {
                    self.cells[write_row] = self.cells[read_row];
                }
            }
        }

        // Whatever is left above the last kept row is new empty space
        for row in &mut self.cells[..write_row] {
            *row = [Cell::Empty; BOARD_WIDTH];
        }

        write_row
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(|cell| cell.is_filled()))
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }
}
