//! Active falling piece

use crate::board::{BOARD_WIDTH, Board};
use crate::shape::Shape;
use crate::tetromino::PieceKind;
use ratatui::style::Color;

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    /// The catalog entry this piece was spawned from
    pub kind: PieceKind,
    /// Current rotation of the shape
    pub shape: Shape,
    /// Column of the shape's top-left corner
    pub x: i32,
    /// Row of the shape's top-left corner, increasing downward
    pub y: i32,
}

impl ActivePiece {
    /// Create a new piece at the spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            x: BOARD_WIDTH as i32 / 2 - 1,
            y: 0,
        }
    }

    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// Absolute (x, y) board coordinates of every block
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(|(r, c)| (self.x + c as i32, self.y + r as i32))
    }

    /// This piece shifted by (dx, dy)
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// This piece with its shape turned a quarter clockwise, same corner
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..*self
        }
    }

    pub fn collides(&self, board: &Board) -> bool {
        board.collides(&self.shape, self.x, self.y)
    }

    /// Where this piece would land if dropped straight down
    pub fn landing(&self, board: &Board) -> Self {
        let mut ghost = *self;
        loop {
            let next = ghost.translated(0, 1);
            if next.collides(board) {
                return ghost;
            }
            ghost = next;
        }
    }
}
