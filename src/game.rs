//! Core game state and logic

use crate::board::{Board, Commit};
use crate::lookahead::{DEFAULT_LOOKAHEAD, Lookahead};
use crate::piece::ActivePiece;
use crate::score::{Score, ScoreTable};
use crate::tetromino::PieceKind;
use std::time::Duration;

/// Gravity interval at normal speed
pub const DROP_DELAY_NORMAL: Duration = Duration::from_millis(500);
/// Gravity interval while accelerating
pub const DROP_DELAY_FAST: Duration = Duration::from_millis(60);
/// Floor for either interval so the scheduler always makes progress
const MIN_DROP_DELAY: Duration = Duration::from_millis(1);

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Which gravity interval is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropSpeed {
    #[default]
    Normal,
    Fast,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Drop to the bottom and lock
    Place,
    /// Start (true) or stop (false) fast gravity
    Accelerate(bool),
    Pause,
    Restart,
    Quit,
}

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub drop_delay: Duration,
    pub fast_drop_delay: Duration,
    /// Number of previewed pieces
    pub lookahead: usize,
    pub scoring: ScoreTable,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            drop_delay: DROP_DELAY_NORMAL,
            fast_drop_delay: DROP_DELAY_FAST,
            lookahead: DEFAULT_LOOKAHEAD,
            scoring: ScoreTable::default(),
        }
    }
}

/// Result of locking one piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSummary {
    pub lines_cleared: usize,
    pub points: u64,
}

/// The one-shot retry scheduled after gravity fails to move the piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLock {
    due: Duration,
    /// Spawn generation of the piece the retry was scheduled for
    generation: u64,
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    active: ActivePiece,
    lookahead: Lookahead,
    score: Score,
    state: GameState,
    speed: DropSpeed,
    rules: Rules,
    /// Game time, advanced only by `update` while playing
    clock: Duration,
    /// Game time of the last gravity tick
    last_drop: Duration,
    pending_lock: Option<PendingLock>,
    /// Bumped on every spawn
    generation: u64,
    last_lock: Option<LockSummary>,
}

impl Game {
    /// Create a new game with a random seed
    pub fn new(rules: Rules) -> Self {
        Self::with_seed(rules, rand::random())
    }

    /// Create a new game whose piece stream is fixed by `seed`
    pub fn with_seed(rules: Rules, seed: u64) -> Self {
        let mut lookahead = Lookahead::new(rules.lookahead, seed);
        let first = lookahead.next();
        tracing::info!("new game, seed={:016x}, first={}", seed, first.name());
        Self::assemble(rules, Board::new(), lookahead, first)
    }

    /// Start from a prepared board with a chosen first piece.
    ///
    /// If that piece cannot spawn, the game begins already over.
    pub fn with_board(rules: Rules, seed: u64, board: Board, first: PieceKind) -> Self {
        let lookahead = Lookahead::new(rules.lookahead, seed);
        Self::assemble(rules, board, lookahead, first)
    }

    fn assemble(rules: Rules, board: Board, lookahead: Lookahead, first: PieceKind) -> Self {
        let mut game = Self {
            board,
            active: ActivePiece::spawn(first),
            lookahead,
            score: Score::new(),
            state: GameState::Playing,
            speed: DropSpeed::Normal,
            rules,
            clock: Duration::ZERO,
            last_drop: Duration::ZERO,
            pending_lock: None,
            generation: 0,
            last_lock: None,
        };
        if game.active.collides(&game.board) {
            game.end("spawn blocked");
        }
        game
    }

    /// Throw this game away and start a fresh one with the same rules
    pub fn reset(&mut self) {
        tracing::info!("reset after {} points", self.score.points);
        *self = Self::new(self.rules);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> &ActivePiece {
        &self.active
    }

    /// Landing position of the active piece, without moving it
    pub fn ghost(&self) -> ActivePiece {
        self.active.landing(&self.board)
    }

    /// Upcoming pieces, next first
    pub fn preview(&self) -> &[PieceKind] {
        self.lookahead.preview()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn speed(&self) -> DropSpeed {
        self.speed
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Most recent lock, if any
    pub fn last_lock(&self) -> Option<LockSummary> {
        self.last_lock
    }

    /// Gravity interval currently in effect
    pub fn drop_delay(&self) -> Duration {
        let delay = match self.speed {
            DropSpeed::Normal => self.rules.drop_delay,
            DropSpeed::Fast => self.rules.fast_drop_delay,
        };
        delay.max(MIN_DROP_DELAY)
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.move_piece(-1, 0);
            }
            Action::MoveRight => {
                self.move_piece(1, 0);
            }
            Action::Rotate => {
                self.rotate_piece();
            }
            Action::Place => {
                self.place_piece();
            }
            Action::Accelerate(on) => self.accelerate(on),
            Action::Pause => self.toggle_pause(),
            Action::Restart => self.reset(),
            // Leaving the game is up to the host
            Action::Quit => {}
        }
    }

    /// Shift the active piece by (dx, dy).
    ///
    /// Expected steps are left, right and down. Returns false and leaves the
    /// piece untouched if the target collides or the game is not running.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let moved = self.active.translated(dx, dy);
        if moved.collides(&self.board) {
            return false;
        }
        self.active = moved;
        true
    }

    /// Turn the active piece clockwise in place, or do nothing if that collides
    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let rotated = self.active.rotated();
        if rotated.collides(&self.board) {
            return false;
        }
        self.active = rotated;
        true
    }

    /// Drop the active piece as far as it goes and lock it
    pub fn place_piece(&mut self) -> Option<LockSummary> {
        if self.state != GameState::Playing {
            return None;
        }
        while self.move_piece(0, 1) {}
        self.lock()
    }

    /// Switch between the fast and normal gravity interval.
    ///
    /// An already scheduled lock retry keeps its due time.
    pub fn accelerate(&mut self, on: bool) {
        let speed = if on { DropSpeed::Fast } else { DropSpeed::Normal };
        if speed != self.speed {
            tracing::debug!("drop speed {:?}", speed);
            self.speed = speed;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            GameState::GameOver => GameState::GameOver,
        };
    }

    /// Advance game time by `elapsed`, running every gravity tick and lock
    /// retry that falls due, oldest first.
    pub fn update(&mut self, elapsed: Duration) {
        if self.state != GameState::Playing {
            return;
        }
        let target = self.clock + elapsed;

        while self.state == GameState::Playing {
            // A speed change can leave the next tick in the past; run it now
            let gravity_due = (self.last_drop + self.drop_delay()).max(self.clock);
            let (due, is_retry) = match self.pending_lock {
                Some(pending) if pending.due <= gravity_due => (pending.due, true),
                _ => (gravity_due, false),
            };
            if due > target {
                break;
            }

            self.clock = due;
            if is_retry {
                self.run_pending_lock();
            } else {
                self.gravity_tick();
            }
        }

        self.clock = target;
    }

    fn gravity_tick(&mut self) {
        self.last_drop = self.clock;
        if self.move_piece(0, 1) {
            return;
        }

        let scheduled = matches!(
            self.pending_lock,
            Some(pending) if pending.generation == self.generation
        );
        if !scheduled {
            self.pending_lock = Some(PendingLock {
                due: self.clock + self.drop_delay(),
                generation: self.generation,
            });
        }
    }

    fn run_pending_lock(&mut self) {
        let Some(pending) = self.pending_lock.take() else {
            return;
        };
        if pending.generation != self.generation {
            tracing::trace!("dropping stale lock retry for piece #{}", pending.generation);
            return;
        }
        if !self.move_piece(0, 1) {
            self.lock();
        }
    }

    /// Write the active piece into the board, score it and spawn the next one
    fn lock(&mut self) -> Option<LockSummary> {
        let piece = self.active;
        if self.board.commit(&piece.shape, piece.x, piece.y, piece.color()) == Commit::AboveBoard {
            self.end("piece locked above the board");
            return None;
        }

        let lines_cleared = self.board.clear_full_rows();
        let points = self.score.add_lock(&self.rules.scoring, lines_cleared);
        let summary = LockSummary {
            lines_cleared,
            points,
        };
        tracing::debug!(
            "locked {} at ({}, {}), lines={}, +{} -> {}",
            piece.kind.name(),
            piece.x,
            piece.y,
            lines_cleared,
            points,
            self.score.points
        );
        self.last_lock = Some(summary);

        self.spawn();
        Some(summary)
    }

    fn spawn(&mut self) {
        let kind = self.lookahead.next();
        self.active = ActivePiece::spawn(kind);
        self.generation += 1;
        tracing::debug!("spawned {} as piece #{}", kind.name(), self.generation);
        if self.active.collides(&self.board) {
            self.end("spawn blocked");
        }
    }

    fn end(&mut self, reason: &str) {
        tracing::info!("game over ({}), score={}", reason, self.score.points);
        self.state = GameState::GameOver;
        self.pending_lock = None;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}
