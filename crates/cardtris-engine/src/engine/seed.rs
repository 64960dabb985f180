use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for a deterministic session.
///
/// A 128-bit value from which every random choice of a session is derived:
/// the piece sequence, card draws and reality-shift shuffles. The same seed
/// and the same command sequence reproduce a session exactly.
///
/// Seeds are written as 32 lowercase hex digits, both in JSON and on the
/// command line.
///
/// # Example
///
/// ```
/// use cardtris_engine::{GameSession, SessionConfig, SessionSeed};
/// use rand::Rng as _;
///
/// let seed: SessionSeed = rand::rng().random();
/// let unlocked = [0, 1, 2];
///
/// let a = GameSession::with_seed(SessionConfig::default(), &unlocked, seed).unwrap();
/// let b = GameSession::with_seed(SessionConfig::default(), &unlocked, seed).unwrap();
/// assert_eq!(a.board().current_piece(), b.board().current_piece());
/// ```
/// Number of root draws consumed by [`SessionSeed::rngs`].
const SESSION_DRAWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SeedParseError {
    #[display("invalid seed: expected 32 hex characters, got {_0}")]
    Length(#[error(not(source))] usize),
    #[display("invalid seed: {_0:?} is not a hex digit")]
    NotHex(#[error(not(source))] char),
    #[display("invalid seed: {_0}")]
    Digits(std::num::ParseIntError),
}

impl SessionSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Derives the independent generators used by the board and the session.
    ///
    /// Returns `(board_rng, session_rng)`.
    #[must_use]
    pub fn rngs(self) -> (Pcg32, Pcg32) {
        let mut root = Pcg32::from_seed(self.0);
        let board = Pcg32::from_seed(root.random());
        let session = Pcg32::from_seed(root.random());
        (board, session)
    }

    /// Derives a generator for use outside the session, such as a scripted
    /// player.
    ///
    /// Each `index` gives its own generator, independent of the ones returned
    /// by [`Self::rngs`].
    #[must_use]
    pub fn auxiliary_rng(self, index: usize) -> Pcg32 {
        let mut root = Pcg32::from_seed(self.0);
        let mut seed = [0; 16];
        // The first draws seed the board and session generators.
        for _ in 0..=SESSION_DRAWS + index {
            seed = root.random();
        }
        Pcg32::from_seed(seed)
    }
}

impl fmt::Display for SessionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for SessionSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(SeedParseError::Length(s.len()));
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(SeedParseError::NotHex(c));
        }
        let num = u128::from_str_radix(s, 16).map_err(SeedParseError::Digits)?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SessionSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<SessionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionSeed {
        SessionSeed(rng.random())
    }
}

#[cfg(test)]
mod tests {
    use rand::{RngCore as _, SeedableRng as _};

    use super::*;

    #[test]
    fn test_seed_hex_round_trip() {
        let seed = SessionSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
            0x66, 0x77,
        ]);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"0123456789abcdef0011223344556677\"");
        let parsed: SessionSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seed);
    }

    #[test]
    fn test_seed_keeps_leading_zeros() {
        let seed = SessionSeed::from_bytes([0; 16]);
        assert_eq!(seed.to_string(), "0".repeat(32));
        assert_eq!("0".repeat(32).parse::<SessionSeed>().unwrap(), seed);
    }

    #[test]
    fn test_seed_rejects_bad_input() {
        assert!(matches!(
            "abc".parse::<SessionSeed>(),
            Err(SeedParseError::Length(3))
        ));
        assert!(matches!(
            "zz".repeat(16).parse::<SessionSeed>(),
            Err(SeedParseError::NotHex('z'))
        ));
        assert!(serde_json::from_str::<SessionSeed>("\"1234\"").is_err());
    }

    #[test]
    fn test_rngs_are_reproducible_and_distinct() {
        let seed = SessionSeed::from_bytes([9; 16]);
        let (mut board_a, mut session_a) = seed.rngs();
        let (mut board_b, mut session_b) = seed.rngs();
        let a = (board_a.next_u64(), session_a.next_u64());
        let b = (board_b.next_u64(), session_b.next_u64());
        assert_eq!(a, b);
        assert_ne!(a.0, a.1);
    }

    #[test]
    fn test_seed_rejects_sign_prefix() {
        let signed = format!("+{}", "f".repeat(31));
        assert_eq!(signed.len(), 32);
        assert!(matches!(
            signed.parse::<SessionSeed>(),
            Err(SeedParseError::NotHex('+'))
        ));
        let json = format!("\"{signed}\"");
        assert!(serde_json::from_str::<SessionSeed>(&json).is_err());
    }

    #[test]
    fn test_auxiliary_rngs_are_independent() {
        let seed = SessionSeed::from_bytes([9; 16]);
        let (mut board, mut session) = seed.rngs();
        let mut root = Pcg32::from_seed(seed.to_bytes());
        let taken = [board.next_u64(), session.next_u64(), root.next_u64()];

        let first = seed.auxiliary_rng(0).next_u64();
        let second = seed.auxiliary_rng(1).next_u64();
        assert_eq!(first, seed.auxiliary_rng(0).next_u64());
        assert_ne!(first, second);
        for value in taken {
            assert_ne!(first, value);
            assert_ne!(second, value);
        }
    }
}
