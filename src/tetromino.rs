//! Piece catalog
//!
//! The seven tetrominoes in their spawn orientation, with display colors.

use crate::shape::Shape;
use rand::Rng;
use ratatui::style::Color;

/// The 7 piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Square,
    Line,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// Every kind, in catalog order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::Square,
        PieceKind::Line,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Draw a kind uniformly at random.
    ///
    /// Draws are independent, so the same kind can come up several times in a row.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Base (spawn) shape
    pub fn shape(&self) -> Shape {
        match self {
            PieceKind::Square => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::Line => Shape::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::T => Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]),
            PieceKind::L => Shape::from_rows(&[&[1, 1, 1], &[1, 0, 0]]),
            PieceKind::J => Shape::from_rows(&[&[1, 1, 1], &[0, 0, 1]]),
            PieceKind::S => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::Z => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PieceKind::Square => Color::Yellow,
            PieceKind::Line => Color::Cyan,
            PieceKind::T => Color::Magenta,
            PieceKind::L => Color::Rgb(255, 165, 0), // Orange
            PieceKind::J => Color::Blue,
            PieceKind::S => Color::Green,
            PieceKind::Z => Color::Red,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Square => "Square",
            PieceKind::Line => "Line",
            PieceKind::T => "T",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
        }
    }
}
