use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::board::{Board, Rgb};

/// A falling piece (tetromino) with position, rotation, type and lock-delay state.
///
/// `Piece` is a small `Copy` value. The board owns the current and next piece,
/// the session owns the held one.
///
/// # Coordinate System
///
/// - `(x, y)` is the top-left corner of the piece's mask box in board cells
/// - X increases rightward, Y increases downward
/// - `y` may be negative while a piece sits above the visible grid
///
/// # Example
///
/// ```
/// use cardtris_engine::{Piece, PieceKind};
///
/// let mut piece = Piece::spawn(PieceKind::T, 10);
/// piece.rotate_clockwise();
/// assert_eq!(piece.occupied_cells().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    x: i32,
    y: i32,
    rotation: PieceRotation,
    lock_timer: u32,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            rotation: PieceRotation::SPAWN,
            lock_timer: 0,
        }
    }

    /// Creates a piece at the spawn point of a board `board_width` cells wide.
    #[must_use]
    pub const fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let (x, y) = spawn_position(board_width);
        Self::new(kind, x, y)
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Milliseconds accumulated while resting on an obstruction.
    #[must_use]
    pub const fn lock_timer(&self) -> u32 {
        self.lock_timer
    }

    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.kind.color()
    }

    pub(crate) fn set_lock_timer(&mut self, millis: u32) {
        self.lock_timer = millis;
    }

    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Returns a copy moved by `(dx, dy)`.
    #[must_use]
    pub const fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Returns a copy with the given rotation state.
    #[must_use]
    pub const fn with_rotation(&self, rotation: PieceRotation) -> Self {
        Self { rotation, ..*self }
    }

    /// Moves the piece back to the spawn point with rotation 0 and a fresh lock timer.
    pub fn reset_to_spawn(&mut self, board_width: usize) {
        *self = Self::spawn(self.kind, board_width);
    }

    /// Advances the rotation state clockwise. No collision check is done here.
    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.rotated_right();
    }

    /// Advances the rotation state counterclockwise. No collision check is done here.
    pub fn rotate_counterclockwise(&mut self) {
        self.rotation = self.rotation.rotated_left();
    }

    /// Returns the absolute board coordinates covered by the piece.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.kind
            .cell_offsets(self.rotation)
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }

    /// Returns the lowest `y` this piece could fall to on `board`.
    ///
    /// Follows exactly the path of repeated one-row moves, so a hard drop ends
    /// on this row.
    #[must_use]
    pub fn ghost_position(&self, board: &Board) -> i32 {
        let mut ghost_y = self.y;
        while board.is_valid_position(self, 0, ghost_y + 1 - self.y, None) {
            ghost_y += 1;
        }
        ghost_y
    }
}

/// Spawn point for a board of the given width: centered, top row.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn spawn_position(board_width: usize) -> (i32, i32) {
    ((board_width / 2) as i32 - 1, 0)
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4 in both directions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    /// Builds a rotation state from any index, wrapping modulo 4.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_index(index: usize) -> Self {
        Self((index % 4) as u8)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The seven piece types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Display color of locked blocks of this kind.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            PieceKind::I => Rgb(0, 255, 255),
            PieceKind::O => Rgb(255, 255, 0),
            PieceKind::T => Rgb(160, 32, 240),
            PieceKind::S => Rgb(50, 255, 50),
            PieceKind::Z => Rgb(255, 50, 50),
            PieceKind::J => Rgb(50, 100, 255),
            PieceKind::L => Rgb(255, 165, 0),
        }
    }

    pub(crate) const fn mask(self, rotation: PieceRotation) -> PieceMask {
        PIECE_MASKS[self as usize][rotation.index()]
    }

    /// Returns the occupied `(dx, dy)` offsets inside the mask box for a rotation.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn cell_offsets(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        let mask = self.mask(rotation);
        (0..4usize).flat_map(move |dy| {
            (0..4usize).filter_map(move |dx| {
                (mask[dy] & (1 << dx) != 0).then_some((dx as i32, dy as i32))
            })
        })
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use cardtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }
}

/// One bit row per mask line, bit `n` set when column `n` is occupied.
pub(crate) type PieceMask = [u8; 4];

/// Builds a mask from ASCII rows where `.` is empty and anything else is a cell.
const fn mask<const W: usize, const H: usize>(rows: [&[u8; W]; H]) -> PieceMask {
    let mut mask = [0; 4];
    let mut y = 0;
    while y < H {
        let mut x = 0;
        while x < W {
            if rows[y][x] != b'.' {
                mask[y] |= 1 << x;
            }
            x += 1;
        }
        y += 1;
    }
    mask
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const I_FLAT: PieceMask = mask([b"....", b"####", b"....", b"...."]);
    const I_TALL: PieceMask = mask([b"..#.", b"..#.", b"..#.", b"..#."]);
    const O: PieceMask = mask([b"##", b"##"]);
    const S_FLAT: PieceMask = mask([b"...", b".##", b"##."]);
    const S_TALL: PieceMask = mask([b"#..", b"##.", b".#."]);
    const Z_FLAT: PieceMask = mask([b"...", b"##.", b".##"]);
    const Z_TALL: PieceMask = mask([b"..#", b".##", b".#."]);
    [
        // I-piece
        [I_FLAT, I_TALL, I_FLAT, I_TALL],
        // O-piece
        [O, O, O, O],
        // T-piece
        [
            mask([b"...", b"###", b".#."]),
            mask([b"..#", b".##", b"..#"]),
            mask([b".#.", b"###", b"..."]),
            mask([b"#..", b"##.", b"#.."]),
        ],
        // S-piece
        [S_FLAT, S_TALL, S_FLAT, S_TALL],
        // Z-piece
        [Z_FLAT, Z_TALL, Z_FLAT, Z_TALL],
        // J-piece
        [
            mask([b"...", b"###", b"..#"]),
            mask([b"..#", b"..#", b".##"]),
            mask([b"#..", b"###", b"..."]),
            mask([b"##.", b"#..", b"#.."]),
        ],
        // L-piece
        [
            mask([b"...", b"###", b"#.."]),
            mask([b".#.", b".#.", b".##"]),
            mask([b"..#", b"###", b"..."]),
            mask([b"##.", b"..#", b"..#"]),
        ],
    ]
};
