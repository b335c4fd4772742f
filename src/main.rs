//! BLOCKFALL terminal driver

use blockfall::game::{Action, Game};
use blockfall::input::InputHandler;
use blockfall::score::Score;
use blockfall::settings::Settings;
use blockfall::ui;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Application state
enum AppState {
    Title,
    Playing(Game, InputHandler),
}

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Log to a per-session file; the terminal belongs to the UI
fn init_logging() -> WorkerGuard {
    let session_id: u32 = rand::random();
    let dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockfall=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        dir.join(&log_file).display()
    );
    guard
}

fn main() -> io::Result<()> {
    let _guard = init_logging();

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    // Ask for release events where supported; held keys otherwise time out
    let key_events = supports_keyboard_enhancement().unwrap_or(false);
    if key_events {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!("key release reporting: {}", key_events);

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    if key_events {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Write out a default settings file the first time so it can be edited
    if Settings::settings_path().is_some_and(|path| !path.exists()) {
        if let Err(e) = settings.save() {
            eprintln!("Warning: could not save settings: {:#}", e);
        }
    }

    match &result {
        Ok(Some(score)) => {
            println!("\nThanks for playing BLOCKFALL!");
            println!("Final Score: {} | Lines: {}", score.points, score.lines);
        }
        Ok(None) => println!("\nThanks for playing BLOCKFALL!"),
        Err(e) => tracing::error!("terminal error: {}", e),
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Option<Score>> {
    let mut state = AppState::Title;
    let mut last_frame = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| match &state {
            AppState::Title => ui::render_title(frame, settings),
            AppState::Playing(game, _) => ui::render_game(frame, game, settings),
        })?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                match &mut state {
                    AppState::Title => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key.code {
                            KeyCode::Enter => {
                                let game = Game::new(settings.gameplay.rules());
                                let input = InputHandler::from_settings(settings);
                                state = AppState::Playing(game, input);
                            }
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(None),
                            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(None);
                            }
                            _ => {}
                        }
                    }
                    AppState::Playing(game, input) => {
                        if handle_game_key(game, input, key) {
                            return Ok(Some(*game.score()));
                        }
                    }
                }
            }
        }

        // Update game state
        let now = Instant::now();
        let elapsed = now.duration_since(last_frame);
        last_frame = now;

        if let AppState::Playing(game, input) = &mut state {
            // Process held keys for DAS/ARR and accelerate release
            for action in input.update() {
                game.process_action(action);
            }
            game.update(elapsed);
        }
    }
}

/// Feed one key event into the game; returns true when the player quits
fn handle_game_key(game: &mut Game, input: &mut InputHandler, key: KeyEvent) -> bool {
    let actions = match key.kind {
        KeyEventKind::Release => input.key_up(key),
        _ => input.key_down(key),
    };

    for action in actions {
        match action {
            Action::Quit => return true,
            Action::Pause | Action::Restart => {
                game.process_action(action);
                // Drop held keys so nothing carries over into the paused or new game
                for release in input.clear() {
                    game.process_action(release);
                }
            }
            other => game.process_action(other),
        }
    }
    false
}
