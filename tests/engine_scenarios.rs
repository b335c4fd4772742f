//! End-to-end engine scenarios
//!
//! Test categories:
//! - Locking and scoring
//! - Line clears
//! - Game over detection
//! - Movement and rotation invariants

use blockfall::{
    ActivePiece, BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, Game, GameState, PieceKind, Rules,
};
use proptest::prelude::*;
use ratatui::style::Color;

const GREY: Color = Color::DarkGray;

fn game_on(board: Board, first: PieceKind) -> Game {
    Game::with_board(Rules::default(), 2024, board, first)
}

/// Fill row `y` except for the given columns
fn fill_row_except(board: &mut Board, y: i32, gaps: &[i32]) {
    for x in 0..BOARD_WIDTH as i32 {
        if !gaps.contains(&x) {
            board.set(x, y, Cell::Filled(GREY));
        }
    }
}

fn filled(board: &Board, x: i32, y: i32) -> bool {
    board.get(x, y).is_some_and(|c| c.is_filled())
}

// ============================================================================
// Locking and scoring
// ============================================================================

mod locking {
    use super::*;

    #[test]
    fn square_lands_on_empty_floor() {
        let mut game = game_on(Board::new(), PieceKind::Square);
        let summary = game.place_piece().expect("piece should lock");

        assert_eq!(summary.lines_cleared, 0);
        assert_eq!(game.score().points, 10);

        let bottom = BOARD_HEIGHT as i32 - 1;
        for (x, y) in [(4, bottom - 1), (5, bottom - 1), (4, bottom), (5, bottom)] {
            assert_eq!(game.board().get(x, y), Some(Cell::Filled(PieceKind::Square.color())));
        }
        let total: usize = game
            .board()
            .rows()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn next_piece_spawns_after_lock() {
        let mut game = game_on(Board::new(), PieceKind::Square);
        let upcoming = game.preview()[0];
        game.place_piece();

        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(*game.active(), ActivePiece::spawn(upcoming));
    }

    #[test]
    fn hard_drop_matches_ghost() {
        let mut board = Board::new();
        board.set(6, 12, Cell::Filled(GREY));
        let mut game = game_on(board, PieceKind::T);
        let ghost = game.ghost();
        let color = game.active().color();
        game.place_piece();

        for (x, y) in ghost.blocks() {
            assert_eq!(game.board().get(x, y), Some(Cell::Filled(color)));
        }
    }
}

// ============================================================================
// Line clears
// ============================================================================

mod line_clears {
    use super::*;

    #[test]
    fn single_line_scores_110() {
        let mut board = Board::new();
        let bottom = BOARD_HEIGHT as i32 - 1;
        fill_row_except(&mut board, bottom, &[4, 5]);
        board.set(0, bottom - 2, Cell::Filled(GREY));
        let mut game = game_on(board, PieceKind::Square);

        let summary = game.place_piece().expect("piece should lock");
        assert_eq!(summary.lines_cleared, 1);
        assert_eq!(summary.points, 110);
        assert_eq!(game.score().points, 110);
        assert_eq!(game.score().lines, 1);

        // The upper half of the square and the marker each dropped one row
        let board = game.board();
        assert!(filled(board, 4, bottom) && filled(board, 5, bottom));
        assert!(filled(board, 0, bottom - 1));
        assert!(!filled(board, 0, bottom));
        assert!(board.rows().next().is_some_and(|top| top.iter().all(|c| c.is_empty())));
    }

    #[test]
    fn four_lines_score_810() {
        let mut board = Board::new();
        for y in 16..20 {
            fill_row_except(&mut board, y, &[0]);
        }
        let mut game = game_on(board, PieceKind::Line);
        assert!(game.rotate_piece());
        while game.move_piece(-1, 0) {}
        assert_eq!(game.active().x, 0);

        let summary = game.place_piece().expect("piece should lock");
        assert_eq!(summary.lines_cleared, 4);
        assert_eq!(game.score().points, 810);
        assert!(game.board().is_empty());
    }

    #[test]
    fn partial_clear_keeps_row_order() {
        let mut board = Board::new();
        fill_row_except(&mut board, 19, &[9]);
        board.set(2, 18, Cell::Filled(Color::Red));
        fill_row_except(&mut board, 17, &[9]);
        board.set(3, 16, Cell::Filled(Color::Green));
        let mut game = game_on(board, PieceKind::Line);
        assert!(game.rotate_piece());
        while game.move_piece(1, 0) {}

        let summary = game.place_piece().expect("piece should lock");
        // Rows 17 and 19 complete; 16 and 18 only gain the line's cells
        assert_eq!(summary.lines_cleared, 2);
        assert_eq!(game.score().points, 310);
        let board = game.board();
        assert_eq!(board.get(2, 19), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.get(3, 18), Some(Cell::Filled(Color::Green)));
        assert!(filled(board, 9, 19) && filled(board, 9, 18));
    }
}

// ============================================================================
// Game over detection
// ============================================================================

mod game_over {
    use super::*;

    #[test]
    fn blocked_spawn_ends_game_without_touching_board() {
        let mut board = Board::new();
        fill_row_except(&mut board, 0, &[0]);
        fill_row_except(&mut board, 1, &[0]);
        let mut game = game_on(board.clone(), PieceKind::T);

        assert!(game.is_game_over());
        assert_eq!(*game.board(), board);
        assert!(!game.move_piece(0, 1));
        assert!(game.place_piece().is_none());
        assert_eq!(game.score().points, 0);
    }

    #[test]
    fn lock_that_buries_spawn_point_ends_game() {
        let mut board = Board::new();
        for y in 2..BOARD_HEIGHT as i32 {
            board.set(4, y, Cell::Filled(GREY));
            board.set(5, y, Cell::Filled(GREY));
        }
        let mut game = game_on(board, PieceKind::Square);
        assert_eq!(game.state(), GameState::Playing);

        game.place_piece();
        assert!(game.is_game_over());
        assert_eq!(game.score().points, 10);
    }

    #[test]
    fn reset_recovers_from_game_over() {
        let mut board = Board::new();
        fill_row_except(&mut board, 0, &[9]);
        let mut game = game_on(board, PieceKind::Square);
        assert!(game.is_game_over());

        game.reset();
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.board().is_empty());
    }
}

// ============================================================================
// Movement and rotation invariants
// ============================================================================

mod invariants {
    use super::*;

    #[test]
    fn four_rotations_in_open_space_restore_each_piece() {
        for kind in PieceKind::ALL {
            let mut game = game_on(Board::new(), kind);
            game.move_piece(0, 1);
            game.move_piece(0, 1);
            let before = *game.active();
            for _ in 0..4 {
                assert!(game.rotate_piece(), "{}", kind.name());
            }
            assert_eq!(*game.active(), before, "{}", kind.name());
        }
    }

    proptest! {
        #[test]
        fn move_then_inverse_restores_or_rejects_cleanly(
            seed in any::<u64>(),
            steps in prop::collection::vec(0u8..4, 1..60),
        ) {
            let mut game = Game::with_seed(Rules::default(), seed);
            for step in steps {
                if game.is_game_over() {
                    break;
                }
                let before = *game.active();
                match step {
                    0 | 1 => {
                        let dx = if step == 0 { -1 } else { 1 };
                        if game.move_piece(dx, 0) {
                            prop_assert!(game.move_piece(-dx, 0));
                            prop_assert_eq!(*game.active(), before);
                            game.move_piece(dx, 0);
                        } else {
                            prop_assert_eq!(*game.active(), before);
                        }
                    }
                    2 => {
                        if !game.move_piece(0, 1) {
                            prop_assert_eq!(*game.active(), before);
                        }
                    }
                    _ => {
                        if !game.rotate_piece() {
                            prop_assert_eq!(*game.active(), before);
                        }
                    }
                }
                prop_assert!(!game.active().collides(game.board()));
            }
        }
    }
}
