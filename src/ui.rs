//! Terminal UI rendering with ratatui

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Cell};
use crate::game::{DropSpeed, Game, GameState};
use crate::settings::Settings;
use crate::tetromino::PieceKind;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";

/// Total width needed: board(22) + next/stats(16) = 38
const GAME_WIDTH: u16 = 38;
/// Total height needed: next queue(17) + stats(7) = 24
const GAME_HEIGHT: u16 = 24;
/// Board plus borders
const BOARD_ROWS: u16 = BOARD_HEIGHT as u16 + 2;
/// Rows per previewed piece (two rows of blocks plus a gap)
const PREVIEW_ROWS: u16 = 3;

/// Render the start screen
pub fn render_title(frame: &mut Frame, settings: &Settings) {
    let area = center_rect(frame.area(), 40, 14);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let keys = &settings.keys;

    let lines = vec![
        Line::raw(""),
        Line::styled("B L O C K F A L L", Style::default().fg(Color::Cyan).bold()),
        Line::raw(""),
        hint("move", &[keys.move_left.join("/"), keys.move_right.join("/")]),
        hint("rotate", &keys.rotate),
        hint("place", &keys.place),
        hint("accelerate", &keys.accelerate),
        hint("pause", &keys.pause),
        Line::raw(""),
        Line::styled("Enter to start, q to quit", Style::default().fg(Color::Yellow)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// One "action  keys" line of the start screen
fn hint(label: &str, bound: &[String]) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::Gray)),
        Span::raw(bound.join(" / ")),
    ])
}

/// Render a game in progress
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
            Constraint::Length(16),
        ])
        .split(game_area);

    let board_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BOARD_ROWS), Constraint::Min(0)])
        .split(main_layout[0]);
    render_board(frame, board_area[0], game, settings);

    // Right side: next queue and stats
    let queue_rows = u16::try_from(game.preview().len())
        .unwrap_or(u16::MAX)
        .saturating_mul(PREVIEW_ROWS)
        .saturating_add(2);
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(queue_rows), Constraint::Min(7)])
        .split(main_layout[1]);

    render_next_queue(frame, right_layout[0], game.preview(), block_char);
    render_stats(frame, right_layout[1], game);

    // Overlays
    let keys = &settings.keys;
    let footer = format!("{} restart, {} quit", keys.restart.join("/"), keys.quit.join("/"));
    match game.state() {
        GameState::Paused => {
            let resume = format!("{} to resume", keys.pause.join("/"));
            render_overlay(frame, area, "PAUSED", &resume, &footer);
        }
        GameState::GameOver => {
            let score = format!("Score {}", game.score().points);
            render_overlay(frame, area, "GAME OVER", &score, &footer);
        }
        GameState::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[PieceKind], block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if queue.is_empty() {
        return;
    }

    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(PREVIEW_ROWS); queue.len()])
        .split(inner);

    for (piece_area, &kind) in piece_areas.iter().zip(queue) {
        render_mini_piece(frame, *piece_area, kind, block_char);
    }
}

/// Render a small piece preview in its spawn orientation
fn render_mini_piece(frame: &mut Frame, area: Rect, kind: PieceKind, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let shape = kind.shape();
    let style = Style::default().fg(kind.color());
    let lines: Vec<Line> = (0..shape.rows())
        .map(|r| {
            let spans: Vec<Span> = (0..shape.cols())
                .map(|c| {
                    if shape.is_set(r, c) {
                        Span::styled(block_char, style)
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let border = match game.speed() {
        DropSpeed::Normal => Color::White,
        DropSpeed::Fast => Color::Yellow,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active = game.active();
    let color = active.color();
    let active_blocks: Vec<(i32, i32)> = active.blocks().collect();
    let ghost_blocks: Vec<(i32, i32)> = if settings.visual.show_ghost {
        game.ghost().blocks().collect()
    } else {
        Vec::new()
    };

    let lines: Vec<Line> = game
        .board()
        .rows()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    let pos = (x as i32, y as i32);
                    if active_blocks.contains(&pos) {
                        Span::styled(block_char, Style::default().fg(color))
                    } else if ghost_blocks.contains(&pos) {
                        Span::styled(ghost_char, Style::default().fg(color).dim())
                    } else {
                        match cell {
                            Cell::Filled(filled) => {
                                Span::styled(block_char, Style::default().fg(*filled))
                            }
                            Cell::Empty => Span::raw(EMPTY),
                        }
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = game.score();
    let mut lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{:08}", score.points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.lines),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled("PIECES", Style::default().fg(Color::Gray))),
        Line::from(format!("{}", score.pieces)),
    ];

    if let Some(last) = game.last_lock().filter(|l| l.lines_cleared > 0) {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("+{}", last.points),
            Style::default().fg(Color::Magenta).bold(),
        ));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, footer: &str) {
    let popup_width = 28u16;
    let popup_height = 6u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
        Line::styled(footer, Style::default().fg(Color::DarkGray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
