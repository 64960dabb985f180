//! Session logic built on the board and the cards.
//!
//! - [`GameSession`] - A running game driven by ticks and [`Command`]s
//! - [`GameStats`] - Score, level, lines and piece counters
//! - [`ActiveEffects`] - Remaining ticks of every timed card effect
//! - [`FallClock`] - Fall interval, slow-time and the speed-up schedule
//! - [`SessionConfig`] - Tunable parameters, loadable from JSON
//! - [`SessionSeed`] - Seed for reproducible sessions
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] with a config, the unlocked card pool and a seed
//! 2. Feed player [`Command`]s as they arrive
//! 3. Call [`GameSession::tick`] 60 times per second
//! 4. Stop once the state leaves [`SessionState::Playing`] for good and take
//!    the [`SessionSummary`]

pub use self::{
    config::*, game_session::*, game_stats::*, gravity::*, seed::*, timed_effects::*,
};

mod config;
mod game_session;
mod game_stats;
mod gravity;
mod seed;
mod timed_effects;
