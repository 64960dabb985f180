use cardtris_engine::{GameSession, SessionState, TimedEffect};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use super::{BoardDisplay, HandDisplay, PieceDisplay, SessionStatsDisplay, color, style};

/// Hold and stats on the left, the board in the middle, next piece and hand
/// on the right.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    fn border_color(&self) -> Color {
        let effects = self.session.effects();
        match self.session.session_state() {
            SessionState::Playing if effects.is_frozen() => color::CYAN,
            SessionState::Playing if effects.is_golden() => color::GOLD,
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver | SessionState::Exited => color::RED,
        }
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::symmetric(
                self.horizontal_padding,
                self.vertical_padding,
            ))
            .border_style(self.border_color())
            .style(style::DEFAULT)
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        let board = session.board();
        let effects = session.effects();

        let board_title = if effects.is_active(TimedEffect::GravityReverse) {
            "BOARD (REVERSED)"
        } else {
            "BOARD"
        };
        let game_board = BoardDisplay::new(board)
            .ghost(board.ghost_piece())
            .falling_piece(*board.current_piece())
            .phantom(effects.is_active(TimedEffect::Ghost))
            .block(
                Block::bordered()
                    .title(Line::from(board_title).centered())
                    .border_style(self.border_color())
                    .style(style::DEFAULT),
            );
        let hold_panel = {
            let panel = PieceDisplay::new().block(self.panel("HOLD"));
            match session.held_piece() {
                Some(piece) => panel.piece(piece.kind()),
                None => panel,
            }
        };
        let next_panel = PieceDisplay::new()
            .piece(board.next_piece().kind())
            .block(self.panel("NEXT"));
        let session_stats = SessionStatsDisplay::new(session).block(self.panel("STATS"));
        let hand = HandDisplay::new(session.cards().hand(), effects).block(self.panel("CARDS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), session_stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(u16::max(next_panel.width(), hand.width())),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(session_stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(session_stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);

        let [next_area, hand_area] = Layout::vertical([
            Constraint::Length(next_panel.height()),
            Constraint::Length(hand.height()),
        ])
        .spacing(1)
        .areas(right_column);
        let next_area = next_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(next_panel.width())]).flex(Flex::Start),
        )[0];

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        session_stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);
        hand.render(hand_area, buf);

        let popup = match session.session_state() {
            SessionState::Playing | SessionState::Exited => None,
            SessionState::Paused => {
                Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
            }
            SessionState::GameOver => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
