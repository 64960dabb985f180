use std::time::Duration;

use rand::Rng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    HoldError, PieceCollisionError,
    card::{Card, CardError, CardManager, EffectTarget},
    core::{
        board::{Board, GravityOutcome, TICK_MILLIS},
        piece::Piece,
    },
};

use super::{
    GameStats, SessionSeed,
    config::{ConfigError, SessionConfig},
    gravity::FallClock,
    timed_effects::{ActiveEffects, TimedEffect},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
    Exited,
}

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move left once and keep auto-repeating until [`Command::ReleaseLeft`].
    MoveLeft,
    MoveRight,
    ReleaseLeft,
    ReleaseRight,
    SoftDrop,
    RotateClockwise,
    RotateCounterclockwise,
    HardDrop,
    Hold,
    /// Use the card in the given hand slot (0, 1 or 2).
    UseCard(usize),
    TogglePause,
    Exit,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CommandError {
    #[display("session is not running")]
    NotPlaying,
    #[display("{_0}")]
    Collision(PieceCollisionError),
    #[display("{_0}")]
    Hold(HoldError),
    #[display("{_0}")]
    Card(CardError),
}

/// Final numbers of a session, handed to whatever persists results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSummary {
    pub seed: SessionSeed,
    pub score: u64,
    pub lines_cleared: usize,
    pub level: usize,
    pub best_clear: usize,
    pub pieces_locked: usize,
    pub cards_used: usize,
    pub ticks: u64,
}

/// A running game: board, hand, score, timed effects and gravity.
///
/// The session is driven by [`Self::tick`] at 60 Hz and by player
/// [`Command`]s in between. Everything random is derived from the
/// [`SessionSeed`], so the same seed and inputs replay the same game.
///
/// # Example
///
/// ```
/// use cardtris_engine::{Command, GameSession, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default(), &[0, 1, 2]).unwrap();
/// assert_eq!(session.cards().hand().len(), 2);
///
/// session.handle_command(Command::MoveLeft).ok();
/// session.handle_command(Command::HardDrop).unwrap();
/// for _ in 0..60 {
///     session.tick();
/// }
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    seed: SessionSeed,
    board: Board,
    cards: CardManager,
    unlocked: Vec<usize>,
    stats: GameStats,
    effects: ActiveEffects,
    gravity: FallClock,
    rng: Pcg32,
    hold_piece: Option<Piece>,
    hold_used: bool,
    left_held: bool,
    right_held: bool,
    repeat_ticks: u32,
    session_state: SessionState,
    ticks: u64,
}

impl GameSession {
    /// Starts a session with a random seed.
    ///
    /// `unlocked` lists the catalog indices cards are drawn from.
    pub fn new(config: SessionConfig, unlocked: &[usize]) -> Result<Self, ConfigError> {
        Self::with_seed(config, unlocked, rand::rng().random())
    }

    pub fn with_seed(
        config: SessionConfig,
        unlocked: &[usize],
        seed: SessionSeed,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (board_rng, rng) = seed.rngs();
        let mut board = Board::with_rng(config.board_width, config.board_height, board_rng);
        board.set_lock_delay(config.lock_delay_millis);

        let mut session = Self {
            gravity: FallClock::new(&config),
            config,
            seed,
            board,
            cards: CardManager::new(),
            unlocked: unlocked.to_vec(),
            stats: GameStats::new(),
            effects: ActiveEffects::new(),
            rng,
            hold_piece: None,
            hold_used: false,
            left_held: false,
            right_held: false,
            repeat_ticks: 0,
            session_state: SessionState::Playing,
            ticks: 0,
        };
        for _ in 0..session.config.initial_hand_size {
            if session.draw_card().is_err() {
                break;
            }
        }
        log::debug!("session {seed} started");
        Ok(session)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> SessionSeed {
        self.seed
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn cards(&self) -> &CardManager {
        &self.cards
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    #[must_use]
    pub fn gravity(&self) -> &FallClock {
        &self.gravity
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.hold_piece.as_ref()
    }

    #[must_use]
    pub fn is_hold_used(&self) -> bool {
        self.hold_used
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated play time.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.ticks * u64::from(TICK_MILLIS))
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            score: self.stats.score(),
            lines_cleared: self.stats.total_cleared_lines(),
            level: self.stats.level(),
            best_clear: self.stats.best_clear(),
            pieces_locked: self.stats.completed_pieces(),
            cards_used: self.stats.cards_used(),
            ticks: self.ticks,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            state => state,
        };
    }

    pub fn exit(&mut self) {
        self.session_state = SessionState::Exited;
    }

    pub fn handle_command(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::TogglePause => {
                self.toggle_pause();
                return Ok(());
            }
            Command::Exit => {
                self.exit();
                return Ok(());
            }
            _ if !self.session_state.is_playing() => return Err(CommandError::NotPlaying),
            _ => {}
        }

        match command {
            Command::MoveLeft => {
                self.left_held = true;
                self.repeat_ticks = 0;
                self.try_move_left().map_err(CommandError::Collision)
            }
            Command::MoveRight => {
                self.right_held = true;
                self.repeat_ticks = 0;
                self.try_move_right().map_err(CommandError::Collision)
            }
            Command::ReleaseLeft => {
                self.left_held = false;
                Ok(())
            }
            Command::ReleaseRight => {
                self.right_held = false;
                Ok(())
            }
            Command::SoftDrop => self.try_soft_drop().map_err(CommandError::Collision),
            Command::RotateClockwise => self.try_rotate_right().map_err(CommandError::Collision),
            Command::RotateCounterclockwise => {
                self.try_rotate_left().map_err(CommandError::Collision)
            }
            Command::HardDrop => {
                self.hard_drop();
                Ok(())
            }
            Command::Hold => self.try_hold().map_err(CommandError::Hold),
            Command::UseCard(slot) => self.use_card(slot).map(|_| ()).map_err(CommandError::Card),
            Command::TogglePause | Command::Exit => Ok(()),
        }
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> Result<(), PieceCollisionError> {
        if self.board.move_piece(dx, dy) {
            Ok(())
        } else {
            Err(PieceCollisionError)
        }
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(-1, 0)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(1, 0)
    }

    /// Moves one row down. Never locks; gravity does that.
    pub fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(0, 1)
    }

    pub fn try_rotate_left(&mut self) -> Result<(), PieceCollisionError> {
        if self.board.rotate_counterclockwise() {
            Ok(())
        } else {
            Err(PieceCollisionError)
        }
    }

    pub fn try_rotate_right(&mut self) -> Result<(), PieceCollisionError> {
        if self.board.rotate_clockwise() {
            Ok(())
        } else {
            Err(PieceCollisionError)
        }
    }

    /// Puts the current piece into the hold slot.
    ///
    /// The first hold takes the next piece; later holds swap with the held
    /// piece, which restarts from the spawn point. Allowed once per piece.
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if self.hold_used {
            return Err(HoldError::HoldAlreadyUsed);
        }
        let previous = match self.hold_piece.take() {
            None => self.board.promote_next_piece(),
            Some(mut held) => {
                held.reset_to_spawn(self.board.width());
                self.board.replace_current_piece(held)
            }
        };
        log::debug!(
            "held {:?}, playing {:?}",
            previous.kind(),
            self.board.current_piece().kind()
        );
        self.hold_piece = Some(previous);
        self.hold_used = true;
        Ok(())
    }

    /// Drops the current piece to the bottom and locks it at once.
    pub fn hard_drop(&mut self) {
        let rows = self.board.drop_piece();
        log::trace!("hard drop over {rows} rows");
        let outcome = self.board.force_lock();
        self.handle_gravity(outcome);
    }

    pub fn use_card(&mut self, slot: usize) -> Result<Card, CardError> {
        let mut target = EffectTarget {
            board: &mut self.board,
            effects: &mut self.effects,
            gravity: &mut self.gravity,
            rng: &mut self.rng,
        };
        match self.cards.use_card(slot, &mut target) {
            Ok(card) => {
                self.stats.record_card_use();
                log::debug!("used card {:?}", card.name());
                Ok(card)
            }
            Err(err @ CardError::InvalidSlot(_)) => {
                log::warn!("{err}");
                Err(err)
            }
            Err(err) => {
                log::debug!("card in slot {slot} not applied: {err}");
                Err(err)
            }
        }
    }

    fn draw_card(&mut self) -> Result<(), CardError> {
        self.cards.draw_card(&self.unlocked, &mut self.rng)?;
        Ok(())
    }

    /// Advances the session by one 16 ms tick.
    ///
    /// In order: horizontal auto-repeat, timed effect countdown, gravity
    /// (skipped while time is frozen) and the speed-up schedule.
    pub fn tick(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        self.ticks += 1;

        self.auto_repeat();

        for effect in self.effects.tick() {
            log::debug!("{effect} expired");
            if effect == TimedEffect::SlowTime {
                self.gravity.restore();
            }
        }

        if !self.effects.is_frozen() && self.gravity.tick() {
            let outcome = self.board.update();
            self.handle_gravity(outcome);
            if self.session_state.is_game_over() {
                return;
            }
        }

        if let Some(interval) = self.gravity.advance_speed_up() {
            log::info!("fall interval now {interval}ms");
        }
    }

    fn auto_repeat(&mut self) {
        if !self.left_held && !self.right_held {
            self.repeat_ticks = 0;
            return;
        }
        self.repeat_ticks += 1;
        if self.repeat_ticks <= self.config.auto_repeat_delay_ticks
            || self.repeat_ticks % self.config.auto_repeat_interval_ticks != 0
        {
            return;
        }
        if self.left_held {
            self.board.move_piece(-1, 0);
        }
        if self.right_held {
            self.board.move_piece(1, 0);
        }
    }

    fn handle_gravity(&mut self, outcome: GravityOutcome) {
        match outcome {
            GravityOutcome::Fell | GravityOutcome::Resting => {}
            GravityOutcome::Locked { lines_cleared } => {
                self.stats.complete_piece_drop(lines_cleared);
                if lines_cleared > 0 {
                    self.handle_line_clear(lines_cleared);
                }
                self.hold_used = false;
            }
            GravityOutcome::GameOver => {
                self.stats.complete_piece_drop(0);
                self.session_state = SessionState::GameOver;
                log::info!(
                    "game over: score {}, {} lines",
                    self.stats.score(),
                    self.stats.total_cleared_lines()
                );
            }
        }
    }

    fn handle_line_clear(&mut self, lines: usize) {
        let points = self.stats.score_line_clear(
            lines,
            self.effects.multiplier(),
            self.effects.is_golden(),
        );
        log::debug!("cleared {lines} lines for {points} points");
        if self.cards.is_empty()
            && !self.unlocked.is_empty()
            && let Err(err) = self.draw_card()
        {
            log::debug!("no card drawn: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::Block,
        piece::{PieceKind, PieceRotation},
    };

    const SEED: SessionSeed = SessionSeed::from_bytes([11; 16]);

    fn session(unlocked: &[usize]) -> GameSession {
        GameSession::with_seed(SessionConfig::default(), unlocked, SEED).unwrap()
    }

    fn ticks(session: &mut GameSession, n: usize) {
        for _ in 0..n {
            session.tick();
        }
    }

    #[test]
    fn test_start_draws_initial_hand() {
        assert_eq!(session(&[0, 5]).cards().hand().len(), 2);
        assert!(session(&[]).cards().is_empty());
        assert_eq!(session(&[]).session_state(), SessionState::Playing);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            board_height: 2,
            ..SessionConfig::default()
        };
        assert!(GameSession::with_seed(config, &[], SEED).is_err());
    }

    #[test]
    fn test_gravity_follows_fall_interval() {
        let mut session = session(&[]);
        ticks(&mut session, 49);
        assert_eq!(session.board().current_piece().y(), 0);
        session.tick();
        assert_eq!(session.board().current_piece().y(), 1);
    }

    #[test]
    fn test_pause_blocks_commands_and_ticks() {
        let mut session = session(&[]);
        session.handle_command(Command::TogglePause).unwrap();
        assert_eq!(session.session_state(), SessionState::Paused);
        assert!(matches!(
            session.handle_command(Command::HardDrop),
            Err(CommandError::NotPlaying)
        ));
        ticks(&mut session, 100);
        assert_eq!(session.ticks(), 0);
        assert_eq!(session.board().current_piece().y(), 0);

        session.handle_command(Command::TogglePause).unwrap();
        session.tick();
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_exit() {
        let mut session = session(&[]);
        session.handle_command(Command::Exit).unwrap();
        assert_eq!(session.session_state(), SessionState::Exited);
        session.handle_command(Command::TogglePause).unwrap();
        assert_eq!(session.session_state(), SessionState::Exited);
        assert!(session.handle_command(Command::SoftDrop).is_err());
    }

    #[test]
    fn test_hard_drop_locks_immediately() {
        let mut session = session(&[]);
        let kind = session.board().current_piece().kind();
        session.handle_command(Command::HardDrop).unwrap();

        assert_eq!(session.board().occupied_count(), 4);
        assert!(
            session
                .board()
                .row(19)
                .cells()
                .contains(&Block::Piece(kind))
        );
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.board().current_piece().y(), 0);
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut session = session(&[]);
        let first = *session.board().current_piece();
        let next = *session.board().next_piece();

        session.handle_command(Command::Hold).unwrap();
        assert_eq!(session.held_piece(), Some(&first));
        assert_eq!(session.board().current_piece(), &next);
        assert!(matches!(
            session.handle_command(Command::Hold),
            Err(CommandError::Hold(HoldError::HoldAlreadyUsed))
        ));

        session.handle_command(Command::HardDrop).unwrap();
        assert!(!session.is_hold_used());

        let before_swap = *session.board().current_piece();
        session.handle_command(Command::Hold).unwrap();
        assert_eq!(session.held_piece(), Some(&before_swap));
        assert_eq!(
            *session.board().current_piece(),
            Piece::spawn(first.kind(), 10)
        );
    }

    #[test]
    fn test_held_piece_returns_to_spawn() {
        let mut session = session(&[]);
        session.handle_command(Command::RotateClockwise).ok();
        session.handle_command(Command::SoftDrop).unwrap();
        session.handle_command(Command::SoftDrop).unwrap();
        let moved = *session.board().current_piece();
        session.handle_command(Command::Hold).unwrap();
        session.handle_command(Command::HardDrop).unwrap();
        session.handle_command(Command::Hold).unwrap();

        let current = session.board().current_piece();
        assert_eq!(current.kind(), moved.kind());
        assert_eq!((current.x(), current.y()), (4, 0));
        assert_eq!(current.rotation(), PieceRotation::SPAWN);
        assert_eq!(session.board().ghost_y(), current.ghost_position(session.board()));
    }

    #[test]
    fn test_auto_repeat() {
        let mut session = session(&[]);
        let x = session.board().current_piece().x();
        session.handle_command(Command::MoveLeft).unwrap();
        assert_eq!(session.board().current_piece().x(), x - 1);

        ticks(&mut session, 11);
        assert_eq!(session.board().current_piece().x(), x - 1);
        session.tick();
        assert_eq!(session.board().current_piece().x(), x - 2);
        ticks(&mut session, 2);
        assert_eq!(session.board().current_piece().x(), x - 3);

        session.handle_command(Command::ReleaseLeft).unwrap();
        ticks(&mut session, 20);
        assert_eq!(session.board().current_piece().x(), x - 3);
    }

    #[test]
    fn test_time_freeze_stops_gravity() {
        let mut session = session(&[9]);
        session.handle_command(Command::UseCard(0)).unwrap();
        assert_eq!(session.cards().hand().len(), 1);
        assert_eq!(session.stats().cards_used(), 1);

        ticks(&mut session, 299);
        assert_eq!(session.board().current_piece().y(), 0);
        assert!(session.effects().is_frozen());

        // Unfrozen on tick 300: the accumulator starts from zero.
        ticks(&mut session, 49);
        assert_eq!(session.board().current_piece().y(), 0);
        session.tick();
        assert_eq!(session.board().current_piece().y(), 1);
    }

    #[test]
    fn test_slow_time_expiry_restores_interval() {
        let mut session = session(&[2]);
        session.handle_command(Command::UseCard(1)).unwrap();
        assert_eq!(session.gravity().interval(), 1600);
        ticks(&mut session, 479);
        assert_eq!(session.gravity().interval(), 1600);
        session.tick();
        assert_eq!(session.gravity().interval(), 800);
    }

    #[test]
    fn test_second_slow_time_doubles_again() {
        let mut session = session(&[2]);
        session.handle_command(Command::UseCard(0)).unwrap();
        session.handle_command(Command::UseCard(0)).unwrap();
        assert!(session.cards().is_empty());
        assert_eq!(session.gravity().interval(), 3200);

        // The second card restarts the timer; expiry returns to the base.
        ticks(&mut session, 480);
        assert_eq!(session.gravity().interval(), 800);
    }

    #[test]
    fn test_use_card_errors() {
        let mut session = session(&[4]);
        // Basic Cleanup has nothing to clear on an empty board.
        assert!(matches!(
            session.handle_command(Command::UseCard(0)),
            Err(CommandError::Card(CardError::NoEffect))
        ));
        assert!(matches!(
            session.handle_command(Command::UseCard(2)),
            Err(CommandError::Card(CardError::InvalidSlot(2)))
        ));
        assert_eq!(session.stats().cards_used(), 0);
    }

    #[test]
    fn test_line_clear_scores_and_redraws() {
        let mut session = session(&[1]);
        session.use_card(0).unwrap();
        session.use_card(0).unwrap();
        assert!(session.cards().is_empty());
        assert_eq!(session.effects().multiplier(), 2);

        session.handle_line_clear(1);
        assert_eq!(session.stats().score(), 200);
        assert_eq!(session.cards().hand().len(), 1);

        // No redraw while the hand still holds a card.
        session.handle_line_clear(2);
        assert_eq!(session.stats().score(), 200 + 600 + 200);
        assert_eq!(session.cards().hand().len(), 1);
    }

    #[test]
    fn test_lock_with_line_clear() {
        let mut session = session(&[]);
        session
            .board
            .replace_current_piece(Piece::new(PieceKind::O, 0, 0));
        for x in 2..10 {
            session.board.set_block(x, 18, Block::Filler);
            session.board.set_block(x, 19, Block::Filler);
        }
        session.handle_command(Command::HardDrop).unwrap();

        let summary = session.summary();
        assert_eq!(summary.lines_cleared, 2);
        assert_eq!(summary.score, 500);
        assert_eq!(summary.best_clear, 2);
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_game_over_on_blocked_spawn() {
        let mut session = session(&[]);
        for y in 1..20 {
            for x in 3..10 {
                session.board.set_block(x, y, Block::Filler);
            }
        }
        session
            .board
            .replace_current_piece(Piece::new(PieceKind::O, 0, 0));
        session.handle_command(Command::HardDrop).unwrap();

        assert_eq!(session.session_state(), SessionState::GameOver);
        assert!(matches!(
            session.handle_command(Command::MoveLeft),
            Err(CommandError::NotPlaying)
        ));
        session.tick();
        assert_eq!(session.ticks(), 0);
        session.handle_command(Command::TogglePause).unwrap();
        assert_eq!(session.session_state(), SessionState::GameOver);
    }

    #[test]
    fn test_speed_up_during_play() {
        let config = SessionConfig {
            speed_up_every_millis: 160,
            ..SessionConfig::default()
        };
        let mut session = GameSession::with_seed(config, &[], SEED).unwrap();
        ticks(&mut session, 9);
        assert_eq!(session.gravity().base_interval(), 800);
        session.tick();
        assert_eq!(session.gravity().base_interval(), 740);
    }

    #[test]
    fn test_seeded_sessions_replay_identically() {
        let script = [
            Command::MoveLeft,
            Command::RotateClockwise,
            Command::HardDrop,
            Command::MoveRight,
            Command::ReleaseLeft,
            Command::Hold,
            Command::UseCard(0),
            Command::HardDrop,
            Command::RotateCounterclockwise,
            Command::HardDrop,
        ];
        let run = || {
            let mut session = session(&[0, 6, 13]);
            for command in script {
                session.handle_command(command).ok();
                ticks(&mut session, 7);
            }
            ticks(&mut session, 500);
            session
        };
        let a = run();
        let b = run();
        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.board().rows(), b.board().rows());
        assert_eq!(a.board().current_piece(), b.board().current_piece());
        assert_eq!(a.cards().hand(), b.cards().hand());
    }

    #[test]
    fn test_summary_round_trips_through_json() {
        let session = session(&[]);
        let summary = session.summary();
        let json = serde_json::to_string(&summary).unwrap();
        let parsed: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
        assert_eq!(parsed.level, 1);
    }
}
