/// Base points by number of lines cleared at once, capped at 8 lines.
const SCORE_TABLE: [u64; 9] = [0, 100, 300, 500, 800, 1200, 1600, 2000, 3000];

/// Points per extra line when clearing several lines at once, times level.
const MULTI_LINE_BONUS: u64 = 200;

/// Flat bonus for clearing 8 or more lines at once.
const MEGA_CLEAR_BONUS: u64 = 5000;
const MEGA_CLEAR_LINES: usize = 8;

/// Game statistics tracking score, lines cleared, pieces and cards.
///
/// # Scoring
///
/// Clearing `n` lines at level `L` with score multiplier `m` awards
/// `SCORE_TABLE[min(n, 8)] * L * m`, doubled during golden touch, plus
/// `200 * (n - 1) * L` for multi-line clears and a flat 5000 for 8 lines or
/// more. The level is `lines / 10 + 1`, taken before the clear is counted.
///
/// # Example
///
/// ```
/// use cardtris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
/// let points = stats.score_line_clear(4, 1, false);
///
/// assert_eq!(points, 1400);
/// assert_eq!(stats.score(), 1400);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 9],
    best_clear: usize,
    cards_used: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 9],
            best_clear: 0,
            cards_used: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Current level: one per 10 lines cleared, starting at 1.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / 10 + 1
    }

    /// Number of pieces locked into the board.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by lines cleared; index 8 counts 8 or more.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 9] {
        &self.line_cleared_counter
    }

    /// Most lines cleared by a single lock.
    #[must_use]
    pub const fn best_clear(&self) -> usize {
        self.best_clear
    }

    #[must_use]
    pub const fn cards_used(&self) -> usize {
        self.cards_used
    }

    /// Records a locked piece and the lines it cleared.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.line_cleared_counter[cleared_lines.min(MEGA_CLEAR_LINES)] += 1;
        self.best_clear = self.best_clear.max(cleared_lines);
    }

    /// Scores a line clear and adds the lines to the total.
    ///
    /// Returns the points awarded.
    pub fn score_line_clear(&mut self, lines: usize, multiplier: u32, golden: bool) -> u64 {
        if lines == 0 {
            return 0;
        }
        let level = self.level() as u64;
        let mut points = SCORE_TABLE[lines.min(MEGA_CLEAR_LINES)] * level * u64::from(multiplier);
        if golden {
            points *= 2;
        }
        if lines >= 2 {
            points += MULTI_LINE_BONUS * (lines as u64 - 1) * level;
        }
        if lines >= MEGA_CLEAR_LINES {
            points += MEGA_CLEAR_BONUS;
        }
        self.score += points;
        self.total_cleared_lines += lines;
        points
    }

    pub fn record_card_use(&mut self) {
        self.cards_used += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut stats = GameStats::new();
        assert_eq!(stats.score_line_clear(1, 1, false), 100);
        assert_eq!(stats.total_cleared_lines(), 1);
        assert_eq!(stats.level(), 1);
    }

    #[test]
    fn test_zero_lines_score_nothing() {
        let mut stats = GameStats::new();
        assert_eq!(stats.score_line_clear(0, 10, true), 0);
        assert_eq!(stats.score(), 0);
    }

    #[test]
    fn test_multiplier_golden_and_bonus() {
        let mut stats = GameStats::new();
        // 800 * 1 * 2, doubled by golden, plus 200 * 3.
        assert_eq!(stats.score_line_clear(4, 2, true), 3800);
        assert_eq!(stats.score(), 3800);
    }

    #[test]
    fn test_level_uses_lines_before_clear() {
        let mut stats = GameStats::new();
        for _ in 0..9 {
            stats.score_line_clear(1, 1, false);
        }
        assert_eq!(stats.level(), 1);
        // Still level 1 while scoring the 10th and 11th line.
        assert_eq!(stats.score_line_clear(2, 1, false), 500);
        assert_eq!(stats.level(), 2);
        assert_eq!(stats.score_line_clear(1, 1, false), 200);
    }

    #[test]
    fn test_double_at_level_two() {
        let mut stats = GameStats::new();
        for _ in 0..10 {
            stats.score_line_clear(1, 1, false);
        }
        assert_eq!(stats.level(), 2);
        // 300 * 2, plus 200 * 1 * 2.
        assert_eq!(stats.score_line_clear(2, 1, false), 1000);
    }

    #[test]
    fn test_mega_clear_bonus() {
        let mut stats = GameStats::new();
        // 3000 + 200 * 7 + 5000
        assert_eq!(stats.score_line_clear(8, 1, false), 9400);

        let mut stats = GameStats::new();
        // Base is capped at 8 lines, the multi-line bonus is not.
        assert_eq!(stats.score_line_clear(9, 1, false), 3000 + 1600 + 5000);
    }

    #[test]
    fn test_piece_histogram() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(0);
        stats.complete_piece_drop(2);
        stats.complete_piece_drop(11);
        assert_eq!(stats.completed_pieces(), 3);
        assert_eq!(stats.line_cleared_counter(), &[1, 0, 1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(stats.best_clear(), 11);
    }
}
