use std::path::PathBuf;

use cardtris_engine::{CATALOG_LEN, SessionConfig, SessionSeed};
use clap::{Parser, Subcommand};

use crate::{profile::ProfileStore, util};

use self::{
    cards::CardsArg, play::PlayArg, profile::ProfileArg, simulate::SimulateArg,
};

mod cards;
mod play;
mod profile;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run sessions with random input and print their summaries
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the card catalog with unlock scores
    Cards(#[clap(flatten)] CardsArg),
    /// Inspect or delete player profiles
    Profile(#[clap(flatten)] ProfileArg),
}

/// Options shared by the commands that start sessions.
#[derive(Default, Debug, Clone, clap::Args)]
struct SessionArg {
    /// Session config file (JSON); defaults apply to missing fields
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed as 32 hex digits; random when omitted
    #[clap(long)]
    seed: Option<SessionSeed>,
}

impl SessionArg {
    fn load_config(&self) -> anyhow::Result<SessionConfig> {
        match &self.config {
            Some(path) => util::read_json_file("config", path),
            None => Ok(SessionConfig::default()),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct ProfileStoreArg {
    /// Profile store file
    #[clap(long, value_name = "PATH", default_value = DEFAULT_PROFILES)]
    profiles: PathBuf,
}

const DEFAULT_PROFILES: &str = "profiles.json";

impl Default for ProfileStoreArg {
    fn default() -> Self {
        Self {
            profiles: PathBuf::from(DEFAULT_PROFILES),
        }
    }
}

impl ProfileStoreArg {
    fn open(&self) -> anyhow::Result<ProfileStore> {
        ProfileStore::open(&self.profiles)
    }
}

/// Card pool for a session: the player's unlocked cards, or the whole
/// catalog when no player is given.
fn unlocked_pool(store: Option<&ProfileStore>, player: Option<&str>) -> Vec<usize> {
    match (store, player) {
        (Some(store), Some(name)) => store
            .get(name)
            .map(|profile| profile.unlocked_cards.clone())
            .unwrap_or_default(),
        _ => (0..CATALOG_LEN).collect(),
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let level = args.verbose.log_level_filter();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg, level)?,
        Mode::Simulate(arg) => simulate::run(&arg, level)?,
        Mode::Cards(arg) => cards::run(&arg)?,
        Mode::Profile(arg) => profile::run(&arg, level)?,
    }
    Ok(())
}
