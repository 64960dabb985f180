//! Simulation core of Cardtris, a falling-block puzzle game with power cards.
//!
//! - [`core`] - Pieces and the board: movement, rotation, locking, line clears
//! - [`card`] - The card catalog, card effects and the player's hand
//! - [`engine`] - Sessions: gravity, timed effects, scoring, hold, commands

pub use self::{card::*, core::*, engine::*};

pub mod card;
pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when moving the current piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("hold already used for this piece")]
    HoldAlreadyUsed,
}
