use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::piece::{Piece, PieceKind, PieceRotation};

/// Default playfield width in cells.
pub const DEFAULT_WIDTH: usize = 10;
/// Default playfield height in cells.
pub const DEFAULT_HEIGHT: usize = 20;
/// Simulated milliseconds per tick (60 Hz).
pub const TICK_MILLIS: u32 = 16;
/// Time a piece may rest on an obstruction before it locks.
pub const DEFAULT_LOCK_DELAY_MILLIS: u32 = 500;

/// Horizontal offsets tried when rotating: in place first, then the wall kicks.
const ROTATION_OFFSETS: [i32; 5] = [0, -1, 1, -2, 2];

/// An RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A single cell of the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked block of a specific piece type.
    Piece(PieceKind),
    /// Neutral block written by card effects.
    Filler,
}

impl Block {
    pub const FILLER_COLOR: Rgb = Rgb(150, 150, 150);

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Display color, `None` for an empty cell.
    #[must_use]
    pub const fn color(self) -> Option<Rgb> {
        match self {
            Block::Empty => None,
            Block::Piece(kind) => Some(kind.color()),
            Block::Filler => Some(Self::FILLER_COLOR),
        }
    }
}

/// One row of the playfield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    cells: Vec<Block>,
}

impl BlockRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Block::Empty; width],
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Block] {
        &self.cells
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|b| !b.is_empty()).count()
    }

    /// Every cell is occupied.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }

    /// No cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_empty())
    }

    pub fn clear(&mut self) {
        self.cells.fill(Block::Empty);
    }

    /// Writes `block` into every empty cell.
    pub fn fill_gaps(&mut self, block: Block) {
        for cell in self.cells.iter_mut().filter(|b| b.is_empty()) {
            *cell = block;
        }
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Block] {
        &mut self.cells
    }
}

/// Result of one gravity step, see [`Board::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GravityOutcome {
    /// The piece moved down one row.
    Fell,
    /// The piece is resting on an obstruction and its lock delay is running.
    Resting,
    /// The piece locked, lines were cleared and a new piece spawned.
    Locked { lines_cleared: usize },
    /// The piece locked but the newly spawned piece does not fit.
    GameOver,
}

/// The playfield: a grid of blocks plus the current and next piece.
///
/// # Coordinates
///
/// - `(0, 0)` is the top-left cell, rows grow downward
/// - Rows above the grid (`y < 0`) are legal for pieces but never stored
///
/// # Example
///
/// ```
/// use cardtris_engine::Board;
///
/// let mut board = Board::new(10, 20);
/// board.move_piece(-1, 0);
/// board.rotate_clockwise();
/// board.drop_piece();
/// assert_eq!(board.current_piece().y(), board.ghost_y());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<BlockRow>,
    current_piece: Piece,
    next_piece: Piece,
    ghost_y: i32,
    lock_delay: u32,
    rng: Pcg32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    /// Creates an empty board with a randomly seeded piece generator.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, Pcg32::from_seed(rand::rng().random()))
    }

    /// Like [`Self::new`], but piece generation draws from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if the board is smaller than 4×4.
    #[must_use]
    pub fn with_rng(width: usize, height: usize, mut rng: Pcg32) -> Self {
        assert!(width >= 4 && height >= 4, "board must be at least 4x4");
        let current_piece = Piece::spawn(rng.random(), width);
        let next_piece = Piece::spawn(rng.random(), width);
        let mut board = Self {
            width,
            height,
            rows: vec![BlockRow::empty(width); height],
            current_piece,
            next_piece,
            ghost_y: 0,
            lock_delay: DEFAULT_LOCK_DELAY_MILLIS,
            rng,
        };
        board.refresh_ghost();
        board
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        &self.next_piece
    }

    /// Cached landing row of the current piece.
    #[must_use]
    pub fn ghost_y(&self) -> i32 {
        self.ghost_y
    }

    /// The current piece moved to its landing row.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        self.current_piece
            .shifted(0, self.ghost_y - self.current_piece.y())
    }

    #[must_use]
    pub fn lock_delay(&self) -> u32 {
        self.lock_delay
    }

    pub fn set_lock_delay(&mut self, millis: u32) {
        self.lock_delay = millis;
    }

    #[must_use]
    pub fn rows(&self) -> &[BlockRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &BlockRow {
        &self.rows[y]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut BlockRow {
        &mut self.rows[y]
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [BlockRow] {
        &mut self.rows
    }

    /// Returns the block at `(x, y)`, `None` when outside the grid.
    #[must_use]
    pub fn block(&self, x: i32, y: i32) -> Option<Block> {
        let (x, y) = self.cell_index(x, y)?;
        Some(self.rows[y].cells[x])
    }

    pub(crate) fn set_block(&mut self, x: usize, y: usize, block: Block) {
        self.rows[y].cells[x] = block;
    }

    /// Total number of non-empty cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(BlockRow::occupied_count).sum()
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// A piece cell may go here: inside the side walls, above the floor and not
    /// on a locked block. Rows above the grid are always free.
    fn is_free(&self, x: i32, y: i32) -> bool {
        let Ok(x) = usize::try_from(x) else {
            return false;
        };
        if x >= self.width {
            return false;
        }
        match usize::try_from(y) {
            Err(_) => true,
            Ok(y) if y >= self.height => false,
            Ok(y) => self.rows[y].cells[x].is_empty(),
        }
    }

    /// Checks whether `piece`, moved by `(dx, dy)` and optionally put in
    /// `rotation`, fits on the board.
    #[must_use]
    pub fn is_valid_position(
        &self,
        piece: &Piece,
        dx: i32,
        dy: i32,
        rotation: Option<PieceRotation>,
    ) -> bool {
        let mut candidate = piece.shifted(dx, dy);
        if let Some(rotation) = rotation {
            candidate = candidate.with_rotation(rotation);
        }
        candidate
            .occupied_cells()
            .into_iter()
            .all(|(x, y)| self.is_free(x, y))
    }

    /// Recomputes the cached landing row of the current piece.
    pub fn refresh_ghost(&mut self) {
        self.ghost_y = self.current_piece.ghost_position(self);
    }

    /// Moves the current piece if the whole target position is valid.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if !self.is_valid_position(&self.current_piece, dx, dy, None) {
            return false;
        }
        self.current_piece.translate(dx, dy);
        self.refresh_ghost();
        true
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.rotate_to(self.current_piece.rotation().rotated_right())
    }

    pub fn rotate_counterclockwise(&mut self) -> bool {
        self.rotate_to(self.current_piece.rotation().rotated_left())
    }

    /// Rotates in place, or with the first horizontal kick that fits.
    fn rotate_to(&mut self, target: PieceRotation) -> bool {
        let Some(dx) = ROTATION_OFFSETS
            .into_iter()
            .find(|&dx| self.is_valid_position(&self.current_piece, dx, 0, Some(target)))
        else {
            return false;
        };
        self.current_piece.translate(dx, 0);
        self.current_piece = self.current_piece.with_rotation(target);
        self.refresh_ghost();
        true
    }

    /// Moves the current piece down as far as it goes without locking it.
    ///
    /// Returns the number of rows travelled.
    pub fn drop_piece(&mut self) -> usize {
        let mut rows = 0;
        while self.move_piece(0, 1) {
            rows += 1;
        }
        rows
    }

    /// Advances gravity by one step.
    ///
    /// A piece that cannot fall accumulates [`TICK_MILLIS`] of lock delay per
    /// call and locks once the delay is reached. After locking, full lines are
    /// cleared and the next piece is spawned; if that piece does not fit the
    /// game is over.
    pub fn update(&mut self) -> GravityOutcome {
        if self.move_piece(0, 1) {
            self.current_piece.set_lock_timer(0);
            return GravityOutcome::Fell;
        }

        let lock_timer = self.current_piece.lock_timer().saturating_add(TICK_MILLIS);
        self.current_piece.set_lock_timer(lock_timer);
        if lock_timer < self.lock_delay {
            return GravityOutcome::Resting;
        }

        let piece = self.current_piece;
        if !self.place_piece(piece) {
            log::debug!("locked piece {:?} reaches above the board", piece.kind());
        }
        let lines_cleared = self.clear_lines();
        self.generate_new_piece();

        if !self.is_valid_position(&self.current_piece, 0, 0, None) {
            return GravityOutcome::GameOver;
        }
        GravityOutcome::Locked { lines_cleared }
    }

    /// Locks the current piece on the next [`Self::update`] regardless of the
    /// time it has rested.
    pub fn force_lock(&mut self) -> GravityOutcome {
        self.current_piece.set_lock_timer(u32::MAX);
        self.update()
    }

    /// Writes `piece` into the grid.
    ///
    /// Returns `false` without writing anything if part of the piece is above
    /// the grid.
    pub fn place_piece(&mut self, piece: Piece) -> bool {
        let cells = piece.occupied_cells();
        if cells.iter().any(|&(_, y)| y < 0) {
            return false;
        }
        for (x, y) in cells {
            if let Some((x, y)) = self.cell_index(x, y) {
                self.rows[y].cells[x] = Block::Piece(piece.kind());
            }
        }
        true
    }

    /// Removes every full row, shifting the rows above down.
    ///
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            if self.rows[y - 1].is_filled() {
                self.rows.remove(y - 1);
                self.rows.insert(0, BlockRow::empty(self.width));
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Promotes the next piece to current and generates a new random next piece.
    pub fn generate_new_piece(&mut self) {
        self.promote_next_piece();
        log::trace!(
            "spawned {:?}, next {:?}",
            self.current_piece.kind(),
            self.next_piece.kind()
        );
    }

    /// Like [`Self::generate_new_piece`], returning the piece that was current.
    pub fn promote_next_piece(&mut self) -> Piece {
        let next = Piece::spawn(self.rng.random(), self.width);
        let previous = std::mem::replace(&mut self.next_piece, next);
        self.replace_current_piece(previous)
    }

    /// Swaps in a new current piece without validating its position.
    ///
    /// Returns the piece that was current.
    pub fn replace_current_piece(&mut self, piece: Piece) -> Piece {
        let previous = std::mem::replace(&mut self.current_piece, piece);
        self.refresh_ghost();
        previous
    }
}
