//! Power cards.
//!
//! - [`CATALOG`] - The fixed list of [`CardTemplate`]s, indexed 0 to 17
//! - [`Card`] - A template drawn into a hand, usable once
//! - [`CardEffect`] - What a card does, applied through an [`EffectTarget`]
//! - [`CardManager`] - The player's hand of at most [`MAX_HAND_SIZE`] cards

use serde::Serialize;

pub use self::{catalog::*, effect::*, manager::*};

mod catalog;
mod effect;
mod manager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CardError {
    #[display("hand is full")]
    HandFull,
    #[display("no unlocked card to draw")]
    NoUnlockedCards,
    #[display("no card in slot {_0}")]
    InvalidSlot(#[error(not(source))] usize),
    #[display("card already used")]
    AlreadyUsed,
    #[display("card has no effect right now")]
    NoEffect,
}

/// A card in a hand: a copy of its template plus a single-use flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    template: CardTemplate,
    used: bool,
}

impl Card {
    #[must_use]
    pub const fn new(template: CardTemplate) -> Self {
        Self {
            template,
            used: false,
        }
    }

    #[must_use]
    pub const fn template(&self) -> &CardTemplate {
        &self.template
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.template.name
    }

    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }

    /// Applies the card's effect.
    ///
    /// The card is marked used before the effect runs, whether or not it
    /// succeeds, so a card can never be applied twice.
    pub fn use_on(&mut self, target: &mut EffectTarget<'_>) -> Result<(), CardError> {
        if self.used {
            return Err(CardError::AlreadyUsed);
        }
        self.used = true;
        let CardTemplate {
            effect,
            power,
            duration,
            ..
        } = self.template;
        if effect.apply(power, duration, target) {
            Ok(())
        } else {
            Err(CardError::NoEffect)
        }
    }
}
