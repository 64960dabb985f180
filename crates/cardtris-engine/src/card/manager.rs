use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};

use super::{CATALOG, CATALOG_LEN, Card, CardError, EffectTarget};

/// Maximum number of cards in a hand.
pub const MAX_HAND_SIZE: usize = 3;

/// The player's hand of cards.
///
/// Cards are drawn from a pool of unlocked catalog indices and leave the hand
/// only when used successfully. A card whose effect had nothing to act on
/// stays in the hand, marked used.
///
/// # Example
///
/// ```
/// use cardtris_engine::CardManager;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
///
/// let mut rng = Pcg32::from_seed([0; 16]);
/// let mut manager = CardManager::new();
/// manager.draw_card(&[1, 2], &mut rng).unwrap();
/// assert_eq!(manager.hand().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardManager {
    hand: ArrayVec<Card, MAX_HAND_SIZE>,
}

impl CardManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hand.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.hand.is_full()
    }

    /// Draws a uniformly chosen card from `unlocked` into the hand.
    ///
    /// Indices outside the catalog are ignored; an index listed twice is twice
    /// as likely to be drawn.
    pub fn draw_card<R>(&mut self, unlocked: &[usize], rng: &mut R) -> Result<&Card, CardError>
    where
        R: Rng + ?Sized,
    {
        if self.hand.is_full() {
            return Err(CardError::HandFull);
        }
        let candidates: Vec<usize> = unlocked
            .iter()
            .copied()
            .filter(|index| *index < CATALOG_LEN)
            .collect();
        let index = *candidates
            .choose(rng)
            .ok_or(CardError::NoUnlockedCards)?;
        self.hand.push(Card::new(CATALOG[index]));
        log::debug!("drew card {:?}", CATALOG[index].name);
        Ok(&self.hand[self.hand.len() - 1])
    }

    /// Uses the card in `slot`, removing it from the hand when its effect
    /// applied.
    ///
    /// Returns the removed card.
    pub fn use_card(&mut self, slot: usize, target: &mut EffectTarget<'_>) -> Result<Card, CardError> {
        let card = self
            .hand
            .get_mut(slot)
            .ok_or(CardError::InvalidSlot(slot))?;
        card.use_on(target)?;
        Ok(self.hand.remove(slot))
    }
}
