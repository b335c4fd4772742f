//! BLOCKFALL - a falling-block puzzle game
//!
//! The engine (`game` and the modules under it) is independent of the
//! terminal; `input` and `ui` adapt it to crossterm and ratatui.

pub mod board;
pub mod game;
pub mod input;
pub mod lookahead;
pub mod piece;
pub mod score;
pub mod settings;
pub mod shape;
pub mod tetromino;
pub mod ui;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, Commit};
pub use game::{Action, DropSpeed, Game, GameState, LockSummary, Rules};
pub use piece::ActivePiece;
pub use score::{Score, ScoreTable};
pub use shape::Shape;
pub use tetromino::PieceKind;
