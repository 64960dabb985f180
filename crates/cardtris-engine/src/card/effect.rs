use rand::{Rng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        board::{Block, Board},
        piece::{Piece, PieceKind},
    },
    engine::{ActiveEffects, FallClock, TimedEffect},
};

/// Probability that reality shift refills a given cell while blocks remain.
const REALITY_SHIFT_FILL_PROBABILITY: f64 = 0.7;
/// A row with at least this many blocks counts as almost full.
const CLEAR_LINE_MIN_BLOCKS: usize = 7;
/// Rows with at most this many blocks are swept by mega clear.
const MEGA_CLEAR_MAX_BLOCKS: usize = 3;

/// What a card does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffect {
    ClearLine,
    ScoreMultiplier,
    SlowTime,
    GhostPiece,
    PerfectLine,
    LineBomb,
    PieceTransform,
    GravityReverse,
    TimeFreeze,
    MegaClear,
    GoldenTouch,
    RealityShift,
}

/// The part of a session a card effect may change.
#[derive(Debug)]
pub struct EffectTarget<'a> {
    pub board: &'a mut Board,
    pub effects: &'a mut ActiveEffects,
    pub gravity: &'a mut FallClock,
    pub rng: &'a mut Pcg32,
}

impl CardEffect {
    /// Applies the effect. Returns `false` when its precondition does not hold,
    /// in which case nothing was changed.
    pub fn apply(self, power: u32, duration: u32, target: &mut EffectTarget<'_>) -> bool {
        let applied = match self {
            CardEffect::ClearLine => clear_line(target.board),
            CardEffect::ScoreMultiplier => {
                target.effects.start_multiplier(power, duration);
                true
            }
            CardEffect::SlowTime => {
                target.gravity.slow_down();
                target.effects.start(TimedEffect::SlowTime, duration);
                true
            }
            CardEffect::GhostPiece => {
                target.effects.start(TimedEffect::Ghost, duration);
                true
            }
            CardEffect::PerfectLine => perfect_line(target.board),
            CardEffect::LineBomb => line_bomb(target.board, power),
            CardEffect::PieceTransform => {
                let current = target.board.current_piece();
                let piece = Piece::new(PieceKind::I, current.x(), current.y());
                target.board.replace_current_piece(piece);
                true
            }
            CardEffect::GravityReverse => {
                target.effects.start(TimedEffect::GravityReverse, duration);
                true
            }
            CardEffect::TimeFreeze => {
                target.effects.start(TimedEffect::Freeze, duration);
                true
            }
            CardEffect::MegaClear => mega_clear(target.board),
            CardEffect::GoldenTouch => {
                target.effects.start(TimedEffect::Golden, duration);
                target.effects.set_multiplier(power);
                true
            }
            CardEffect::RealityShift => {
                reality_shift(target.board, target.rng);
                true
            }
        };
        if applied {
            target.board.refresh_ghost();
        }
        applied
    }
}

/// Index of the lowest row matching `pred`.
fn lowest_row(board: &Board, pred: impl Fn(usize) -> bool) -> Option<usize> {
    board
        .rows()
        .iter()
        .rposition(|row| pred(row.occupied_count()))
}

fn clear_line(board: &mut Board) -> bool {
    let Some(y) = lowest_row(board, |count| count >= CLEAR_LINE_MIN_BLOCKS) else {
        return false;
    };
    board.row_mut(y).clear();
    true
}

fn perfect_line(board: &mut Board) -> bool {
    let Some(y) = lowest_row(board, |count| count > 0) else {
        return false;
    };
    board.row_mut(y).fill_gaps(Block::Filler);
    true
}

fn line_bomb(board: &mut Board, power: u32) -> bool {
    let mut cleared = 0;
    for _ in 0..power {
        let Some(y) = lowest_row(board, |count| count > 0) else {
            break;
        };
        board.row_mut(y).clear();
        cleared += 1;
    }
    cleared > 0
}

fn mega_clear(board: &mut Board) -> bool {
    let mut cleared = false;
    for row in board.rows_mut() {
        if (1..=MEGA_CLEAR_MAX_BLOCKS).contains(&row.occupied_count()) {
            row.clear();
            cleared = true;
        }
    }
    cleared
}

/// Shuffles every locked block and drops them back row by row from the
/// bottom, skipping cells at random. Never creates blocks.
fn reality_shift(board: &mut Board, rng: &mut Pcg32) {
    let mut stock: Vec<Block> = board
        .rows()
        .iter()
        .flat_map(|row| row.cells().iter().copied())
        .filter(|block| !block.is_empty())
        .collect();
    stock.shuffle(rng);

    for row in board.rows_mut() {
        row.clear();
    }
    for row in board.rows_mut().iter_mut().rev() {
        for cell in row.cells_mut() {
            if stock.is_empty() {
                return;
            }
            if !rng.random_bool(REALITY_SHIFT_FILL_PROBABILITY) {
                continue;
            }
            if let Some(block) = stock.pop() {
                *cell = block;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::{
        core::{board::BlockRow, piece::PieceRotation},
        engine::SessionConfig,
    };

    const JUNK: Block = Block::Piece(PieceKind::S);

    struct Fixture {
        board: Board,
        effects: ActiveEffects,
        gravity: FallClock,
        rng: Pcg32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                board: Board::with_rng(10, 20, Pcg32::from_seed([1; 16])),
                effects: ActiveEffects::new(),
                gravity: FallClock::new(&SessionConfig::default()),
                rng: Pcg32::from_seed([2; 16]),
            }
        }

        fn fill(&mut self, y: usize, xs: impl IntoIterator<Item = usize>) {
            for x in xs {
                self.board.set_block(x, y, JUNK);
            }
        }

        fn apply(&mut self, effect: CardEffect, power: u32, duration: u32) -> bool {
            let mut target = EffectTarget {
                board: &mut self.board,
                effects: &mut self.effects,
                gravity: &mut self.gravity,
                rng: &mut self.rng,
            };
            effect.apply(power, duration, &mut target)
        }
    }

    #[test]
    fn test_clear_line_needs_almost_full_row() {
        let mut fx = Fixture::new();
        fx.fill(19, 0..6);
        assert!(!fx.apply(CardEffect::ClearLine, 1, 0));
        assert_eq!(fx.board.occupied_count(), 6);

        fx.fill(15, 0..7);
        fx.fill(12, 0..8);
        assert!(fx.apply(CardEffect::ClearLine, 1, 0));
        // Lowest qualifying row is emptied, not removed.
        assert!(fx.board.row(15).is_empty());
        assert_eq!(fx.board.row(12).occupied_count(), 8);
        assert_eq!(fx.board.row(19).occupied_count(), 6);
    }

    #[test]
    fn test_perfect_line_fills_lowest_row() {
        let mut fx = Fixture::new();
        assert!(!fx.apply(CardEffect::PerfectLine, 1, 0));

        fx.fill(17, [2]);
        fx.fill(10, [4]);
        assert!(fx.apply(CardEffect::PerfectLine, 1, 0));
        assert!(fx.board.row(17).is_filled());
        assert_eq!(fx.board.block(2, 17), Some(JUNK));
        assert_eq!(fx.board.block(0, 17), Some(Block::Filler));
        assert_eq!(fx.board.row(10).occupied_count(), 1);
    }

    #[test]
    fn test_line_bomb_clears_up_to_power_rows() {
        let mut fx = Fixture::new();
        assert!(!fx.apply(CardEffect::LineBomb, 3, 0));

        for y in [19, 18, 15, 11] {
            fx.fill(y, [y % 10]);
        }
        assert!(fx.apply(CardEffect::LineBomb, 3, 0));
        assert_eq!(fx.board.occupied_count(), 1);
        assert_eq!(fx.board.row(11).occupied_count(), 1);

        // Fewer rows than power is still a success.
        assert!(fx.apply(CardEffect::LineBomb, 8, 0));
        assert_eq!(fx.board.occupied_count(), 0);
    }

    #[test]
    fn test_mega_clear_sweeps_sparse_rows() {
        let mut fx = Fixture::new();
        fx.fill(19, 0..9);
        assert!(!fx.apply(CardEffect::MegaClear, 1, 0));

        fx.fill(18, 0..3);
        fx.fill(17, 0..4);
        fx.fill(16, [5]);
        assert!(fx.apply(CardEffect::MegaClear, 1, 0));
        assert!(fx.board.row(18).is_empty());
        assert!(fx.board.row(16).is_empty());
        assert_eq!(fx.board.row(17).occupied_count(), 4);
        assert_eq!(fx.board.row(19).occupied_count(), 9);
    }

    #[test]
    fn test_piece_transform() {
        let mut fx = Fixture::new();
        let piece = Piece::new(PieceKind::T, 3, 5).with_rotation(PieceRotation::from_index(2));
        fx.board.replace_current_piece(piece);

        assert!(fx.apply(CardEffect::PieceTransform, 1, 0));
        let current = fx.board.current_piece();
        assert_eq!(current.kind(), PieceKind::I);
        assert_eq!((current.x(), current.y()), (3, 5));
        assert_eq!(current.rotation(), PieceRotation::SPAWN);
        assert_eq!(fx.board.ghost_y(), 18);
    }

    #[test]
    fn test_timed_effects_start() {
        let mut fx = Fixture::new();
        assert!(fx.apply(CardEffect::ScoreMultiplier, 3, 360));
        assert_eq!(fx.effects.multiplier(), 3);
        assert_eq!(fx.effects.remaining(TimedEffect::Multiplier), 360);

        assert!(fx.apply(CardEffect::SlowTime, 1, 480));
        assert_eq!(fx.gravity.interval(), 1600);
        assert_eq!(fx.effects.remaining(TimedEffect::SlowTime), 480);

        assert!(fx.apply(CardEffect::GhostPiece, 1, 240));
        assert!(fx.apply(CardEffect::GravityReverse, 1, 480));
        assert!(fx.apply(CardEffect::TimeFreeze, 1, 300));
        assert!(fx.effects.is_active(TimedEffect::Ghost));
        assert!(fx.effects.is_active(TimedEffect::GravityReverse));
        assert!(fx.effects.is_frozen());
    }

    #[test]
    fn test_golden_touch_sets_multiplier_without_its_timer() {
        let mut fx = Fixture::new();
        assert!(fx.apply(CardEffect::GoldenTouch, 5, 600));
        assert!(fx.effects.is_golden());
        assert_eq!(fx.effects.multiplier(), 5);
        assert_eq!(fx.effects.remaining(TimedEffect::Multiplier), 0);
    }

    #[test]
    fn test_reality_shift_conserves_blocks() {
        let mut fx = Fixture::new();
        let kinds = [PieceKind::I, PieceKind::O, PieceKind::L];
        for y in 12..20 {
            for x in 0..7 {
                let block = Block::Piece(kinds[(x + y) % kinds.len()]);
                fx.board.set_block(x, y, block);
            }
        }
        fx.board.set_block(9, 3, Block::Filler);

        let count = |board: &Board, block: Block| {
            board
                .rows()
                .iter()
                .flat_map(|row| row.cells().iter())
                .filter(|b| **b == block)
                .count()
        };
        let palette = [
            Block::Piece(PieceKind::I),
            Block::Piece(PieceKind::O),
            Block::Piece(PieceKind::L),
            Block::Filler,
        ];
        let before: Vec<usize> = palette.iter().map(|b| count(&fx.board, *b)).collect();
        let total = fx.board.occupied_count();

        assert!(fx.apply(CardEffect::RealityShift, 1, 0));

        assert!(fx.board.occupied_count() <= total);
        for (block, before) in palette.iter().zip(before) {
            assert!(count(&fx.board, *block) <= before);
        }
        // Only the four known kinds of block may appear.
        assert_eq!(
            palette.iter().map(|b| count(&fx.board, *b)).sum::<usize>(),
            fx.board.occupied_count()
        );
    }

    #[test]
    fn test_reality_shift_fills_from_bottom() {
        let mut fx = Fixture::new();
        fx.fill(0, 0..3);
        assert!(fx.apply(CardEffect::RealityShift, 1, 0));
        // Three blocks at 70% per cell are used up within the bottom rows.
        assert_eq!(fx.board.occupied_count(), 3);
        assert!(fx.board.rows()[..18].iter().all(BlockRow::is_empty));
    }

    #[test]
    fn test_reality_shift_on_empty_board() {
        let mut fx = Fixture::new();
        assert!(fx.apply(CardEffect::RealityShift, 1, 0));
        assert_eq!(fx.board.occupied_count(), 0);
    }
}
