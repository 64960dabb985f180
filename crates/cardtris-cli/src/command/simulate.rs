use std::path::PathBuf;

use cardtris_engine::{Command, GameSession, SessionConfig, SessionSeed, SessionSummary};
use chrono::Local;
use log::LevelFilter;
use rand::{Rng, seq::IndexedRandom as _};

use crate::{logging, util};

use super::{ProfileStoreArg, SessionArg};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(super) session: SessionArg,
    /// Number of sessions to run
    #[clap(long, default_value_t = 1)]
    games: usize,
    /// Stop a session after this many ticks (60 per second)
    #[clap(long, default_value_t = 36_000)]
    max_ticks: u64,
    /// Record every session to this player's profile
    #[clap(long)]
    player: Option<String>,
    #[clap(flatten)]
    store: ProfileStoreArg,
    /// Output file for the summaries (JSON); stdout when omitted
    #[clap(long, short)]
    output: Option<PathBuf>,
}

/// Chance per tick that the random player sends a command.
const INPUT_PROBABILITY: f64 = 0.15;

/// Auxiliary generator indices of a session seed.
const INPUT_RNG: usize = 0;
const SEEDER_RNG: usize = 1;

/// Commands of the random player, listed once per unit of weight.
const INPUTS: &[Command] = &[
    Command::MoveLeft,
    Command::MoveLeft,
    Command::MoveLeft,
    Command::MoveRight,
    Command::MoveRight,
    Command::MoveRight,
    Command::RotateClockwise,
    Command::RotateClockwise,
    Command::RotateCounterclockwise,
    Command::SoftDrop,
    Command::SoftDrop,
    Command::HardDrop,
    Command::Hold,
    Command::UseCard(0),
    Command::UseCard(1),
    Command::UseCard(2),
];

pub(crate) fn run(arg: &SimulateArg, level: LevelFilter) -> anyhow::Result<()> {
    let SimulateArg {
        session: session_arg,
        games,
        max_ticks,
        player,
        store: store_arg,
        output,
    } = arg;
    logging::init_stderr(level)?;

    let config = session_arg.load_config()?;
    let mut store = player.as_ref().map(|_| store_arg.open()).transpose()?;

    let first_seed = session_arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut seeder = first_seed.auxiliary_rng(SEEDER_RNG);

    let mut summaries = Vec::with_capacity(*games);
    for game in 0..*games {
        let seed = if game == 0 {
            first_seed
        } else {
            seeder.random()
        };
        if let (Some(store), Some(name)) = (&mut store, player) {
            store.get_or_create(name, Local::now());
        }
        let unlocked = super::unlocked_pool(store.as_ref(), player.as_deref());

        let summary = simulate(config.clone(), &unlocked, seed, *max_ticks)?;
        log::info!(
            "game {}: {} points, {} lines, {} ticks",
            game + 1,
            summary.score,
            summary.lines_cleared,
            summary.ticks
        );

        if let (Some(store), Some(name)) = (&mut store, player) {
            let profile = store.get_or_create(name, Local::now());
            let unlocked = profile.record_session(&summary, Local::now());
            if !unlocked.is_empty() {
                log::info!("{name} unlocked cards {unlocked:?}");
            }
        }
        summaries.push(summary);
    }

    if let Some(store) = &store {
        store.save()?;
    }
    util::save_json(&summaries, output.as_deref())?;
    Ok(())
}

/// Plays one session with random input until game over or `max_ticks`.
fn simulate(
    config: SessionConfig,
    unlocked: &[usize],
    seed: SessionSeed,
    max_ticks: u64,
) -> anyhow::Result<SessionSummary> {
    let mut session = GameSession::with_seed(config, unlocked, seed)?;
    let mut input_rng = seed.auxiliary_rng(INPUT_RNG);
    while session.session_state().is_playing() && session.ticks() < max_ticks {
        random_input(&mut session, &mut input_rng);
        session.tick();
    }
    Ok(session.summary())
}

fn random_input<R>(session: &mut GameSession, rng: &mut R)
where
    R: Rng + ?Sized,
{
    if !rng.random_bool(INPUT_PROBABILITY) {
        return;
    }
    let Some(&command) = INPUTS.choose(rng) else {
        return;
    };
    if let Err(err) = session.handle_command(command) {
        log::trace!("{command:?} rejected: {err}");
    }
    // Taps only; holding a direction would auto-repeat.
    let release = match command {
        Command::MoveLeft => Command::ReleaseLeft,
        Command::MoveRight => Command::ReleaseRight,
        _ => return,
    };
    let _ = session.handle_command(release);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_simulation_is_reproducible() {
        let seed = SessionSeed::from_bytes([3; 16]);
        let a = simulate(SessionConfig::default(), &[0, 1, 2], seed, 3000).unwrap();
        let b = simulate(SessionConfig::default(), &[0, 1, 2], seed, 3000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, seed);
        assert!(a.ticks <= 3000);
        assert!(a.pieces_locked > 0);
    }

    #[test]
    fn test_simulation_stops_at_tick_limit() {
        let seed = SessionSeed::from_bytes([4; 16]);
        let summary = simulate(SessionConfig::default(), &[], seed, 10).unwrap();
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.cards_used, 0);
    }

    #[test]
    fn test_next_seed_is_not_a_session_stream() {
        let seed = SessionSeed::from_bytes([5; 16]);
        let next: SessionSeed = seed.auxiliary_rng(SEEDER_RNG).random();
        let mut root = Pcg32::from_seed(seed.to_bytes());
        let board_seed: [u8; 16] = root.random();
        let session_seed: [u8; 16] = root.random();
        assert_ne!(next.to_bytes(), board_seed);
        assert_ne!(next.to_bytes(), session_seed);
        assert_ne!(next, seed);
    }
}
