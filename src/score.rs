//! Scoring: a flat bonus per locked piece plus a ladder for cleared lines

/// Points for clearing 0, 1, 2, 3 or 4 lines with one piece
pub const SCORE_LADDER: [u64; 5] = [0, 100, 300, 500, 800];
/// Points for every locked piece
pub const LOCK_BONUS: u64 = 10;

/// Score constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTable {
    pub lock_bonus: u64,
    pub ladder: [u64; 5],
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            lock_bonus: LOCK_BONUS,
            ladder: SCORE_LADDER,
        }
    }
}

impl ScoreTable {
    /// Points for one lock that cleared `lines` rows.
    ///
    /// A single piece spans at most four rows; anything beyond is clamped to
    /// the top of the ladder.
    pub fn points_for(&self, lines: usize) -> u64 {
        let rung = self.ladder[lines.min(self.ladder.len() - 1)];
        self.lock_bonus + rung
    }
}

/// Running totals for one game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Pieces locked into the board
    pub pieces: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one lock and return the points it earned
    pub fn add_lock(&mut self, table: &ScoreTable, lines: usize) -> u64 {
        let points = table.points_for(lines);
        self.points += points;
        self.lines += lines as u32;
        self.pieces += 1;
        points
    }
}
