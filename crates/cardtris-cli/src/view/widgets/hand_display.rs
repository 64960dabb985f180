use cardtris_engine::{ActiveEffects, Card, MAX_HAND_SIZE, Rarity, TimedEffect};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt as _, Paragraph, Widget},
};

use super::{color, style};

/// The card hand, one line per slot, followed by the active timed effects.
#[derive(Debug)]
pub struct HandDisplay<'a> {
    hand: &'a [Card],
    effects: &'a ActiveEffects,
    block: Option<BlockWidget<'a>>,
}

/// Room for the effect lines below the hand.
const EFFECT_LINES: usize = TimedEffect::LEN;

impl<'a> HandDisplay<'a> {
    pub fn new(hand: &'a [Card], effects: &'a ActiveEffects) -> Self {
        Self {
            hand,
            effects,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        26 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(MAX_HAND_SIZE + 1 + EFFECT_LINES, 1)
            + super::block_vertical_margin(self.block.as_ref())
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = (0..MAX_HAND_SIZE)
            .map(|slot| match self.hand.get(slot) {
                Some(card) => card_line(slot, card),
                None => Line::styled(format!("{}: -", slot + 1), style::DIMMED),
            })
            .collect();
        lines.push(Line::default());
        lines.extend(self.effects.active().map(|(effect, remaining)| {
            let text = match effect {
                TimedEffect::Multiplier => format!("x{} score", self.effects.multiplier()),
                _ => effect.to_string(),
            };
            // Golden touch can leave the multiplier raised with no timer.
            let time = if remaining > 0 {
                format!(" ({}s)", remaining / 60 + 1)
            } else {
                String::new()
            };
            Line::styled(format!("{text}{time}"), effect_style(effect))
        }));
        lines
    }
}

fn card_line(slot: usize, card: &Card) -> Line<'static> {
    let name_style = if card.is_used() {
        style::DIMMED
    } else {
        rarity_style(card.template().rarity)
    };
    Line::from(vec![
        Span::styled(format!("{}: ", slot + 1), style::DEFAULT),
        Span::styled(card.name(), name_style),
    ])
}

fn rarity_style(rarity: Rarity) -> Style {
    let fg = match rarity {
        Rarity::Common => color::WHITE,
        Rarity::Epic => color::MAGENTA,
        Rarity::Legendary => color::GOLD,
    };
    style::DEFAULT.fg(fg)
}

fn effect_style(effect: TimedEffect) -> Style {
    let fg = match effect {
        TimedEffect::Freeze | TimedEffect::SlowTime => color::CYAN,
        TimedEffect::Golden | TimedEffect::Multiplier => color::GOLD,
        TimedEffect::Ghost | TimedEffect::GravityReverse => color::MAGENTA,
    };
    style::DEFAULT.fg(fg)
}

impl Widget for HandDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        Paragraph::new(self.lines())
            .style(style::DEFAULT)
            .render(area, buf);
    }
}
