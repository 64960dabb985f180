use serde::{Deserialize, Serialize};

use super::effect::CardEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[display("common")]
    Common,
    #[display("epic")]
    Epic,
    #[display("legendary")]
    Legendary,
}

/// Immutable definition of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub effect: CardEffect,
    pub rarity: Rarity,
    pub power: u32,
    /// Ticks a timed effect stays active. Zero for instant effects.
    pub duration: u32,
}

impl CardTemplate {
    const fn new(
        name: &'static str,
        description: &'static str,
        effect: CardEffect,
        rarity: Rarity,
    ) -> Self {
        Self {
            name,
            description,
            effect,
            rarity,
            power: 1,
            duration: 0,
        }
    }

    const fn power(self, power: u32) -> Self {
        Self { power, ..self }
    }

    const fn duration(self, duration: u32) -> Self {
        Self { duration, ..self }
    }
}

/// Number of card templates.
pub const CATALOG_LEN: usize = 18;

/// Every card in the game. Indices 0..6 are common, 6..12 epic and 12..18
/// legendary; profiles and unlock pools refer to cards by index.
pub const CATALOG: [CardTemplate; CATALOG_LEN] = {
    use CardEffect as E;
    use Rarity::{Common, Epic, Legendary};
    [
        CardTemplate::new(
            "Perfect Line",
            "Completes the lowest line",
            E::PerfectLine,
            Common,
        ),
        CardTemplate::new(
            "Multiplier x2",
            "Doubles points for 5 seconds",
            E::ScoreMultiplier,
            Common,
        )
        .power(2)
        .duration(300),
        CardTemplate::new(
            "Extra Time",
            "Slows the fall for 8 seconds",
            E::SlowTime,
            Common,
        )
        .duration(480),
        CardTemplate::new(
            "Phantom Piece",
            "Ghost mode for 4 seconds",
            E::GhostPiece,
            Common,
        )
        .duration(240),
        CardTemplate::new(
            "Basic Cleanup",
            "Clears an almost full line",
            E::ClearLine,
            Common,
        ),
        CardTemplate::new(
            "Combo x2",
            "Doubles points for 3 seconds",
            E::ScoreMultiplier,
            Common,
        )
        .power(2)
        .duration(180),
        CardTemplate::new(
            "Line Bomb",
            "Clears the 3 lowest lines",
            E::LineBomb,
            Epic,
        )
        .power(3),
        CardTemplate::new(
            "Multiplier x3",
            "Triples points for 6 seconds",
            E::ScoreMultiplier,
            Epic,
        )
        .power(3)
        .duration(360),
        CardTemplate::new(
            "I Transform",
            "Turns the current piece into an I",
            E::PieceTransform,
            Epic,
        ),
        CardTemplate::new(
            "Frozen Time",
            "Freezes time for 5 seconds",
            E::TimeFreeze,
            Epic,
        )
        .duration(300),
        CardTemplate::new(
            "Reverse Gravity",
            "Reverses gravity for 8 seconds",
            E::GravityReverse,
            Epic,
        )
        .duration(480),
        CardTemplate::new(
            "Mega Cleanup",
            "Clears lines with 3 blocks or fewer",
            E::MegaClear,
            Epic,
        ),
        CardTemplate::new(
            "Golden Touch",
            "x5 points and golden mode for 10 seconds",
            E::GoldenTouch,
            Legendary,
        )
        .power(5)
        .duration(600),
        CardTemplate::new(
            "Reality Shift",
            "Rearranges the whole board",
            E::RealityShift,
            Legendary,
        ),
        CardTemplate::new(
            "Multiplier x10",
            "x10 points for 4 seconds",
            E::ScoreMultiplier,
            Legendary,
        )
        .power(10)
        .duration(240),
        CardTemplate::new(
            "Nuclear Bomb",
            "Clears the 8 lowest lines",
            E::LineBomb,
            Legendary,
        )
        .power(8),
        CardTemplate::new(
            "Time Master",
            "Freezes time for 15 seconds",
            E::TimeFreeze,
            Legendary,
        )
        .duration(900),
        CardTemplate::new(
            "Tetris God",
            "Every effect for 5 seconds",
            E::GoldenTouch,
            Legendary,
        )
        .power(3)
        .duration(300),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_bands() {
        for (index, card) in CATALOG.iter().enumerate() {
            let expected = match index {
                0..6 => Rarity::Common,
                6..12 => Rarity::Epic,
                _ => Rarity::Legendary,
            };
            assert_eq!(card.rarity, expected, "{}", card.name);
        }
    }

    #[test]
    fn test_catalog_entries() {
        let bomb = CATALOG[15];
        assert_eq!(bomb.name, "Nuclear Bomb");
        assert_eq!(bomb.effect, CardEffect::LineBomb);
        assert_eq!((bomb.power, bomb.duration), (8, 0));

        let god = CATALOG[17];
        assert_eq!(god.effect, CardEffect::GoldenTouch);
        assert_eq!((god.power, god.duration), (3, 300));

        assert_eq!(CATALOG[0].effect, CardEffect::PerfectLine);
        assert_eq!((CATALOG[0].power, CATALOG[0].duration), (1, 0));
    }

    #[test]
    fn test_catalog_serializes_effect_tags() {
        let json = serde_json::to_value(CATALOG[9]).unwrap();
        assert_eq!(json["effect"], "time_freeze");
        assert_eq!(json["rarity"], "epic");
        assert_eq!(json["duration"], 300);
    }
}
