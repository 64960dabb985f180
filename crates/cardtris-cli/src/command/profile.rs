use clap::Subcommand;
use log::LevelFilter;

use crate::{logging, util};

use super::ProfileStoreArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProfileArg {
    #[clap(flatten)]
    store: ProfileStoreArg,
    #[command(subcommand)]
    action: ProfileAction,
}

#[derive(Debug, Clone, Subcommand)]
enum ProfileAction {
    /// Print a player's profile
    Show { name: String },
    /// Print the best players by best score
    Leaderboard {
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete a player's profile
    Delete { name: String },
}

pub(crate) fn run(arg: &ProfileArg, level: LevelFilter) -> anyhow::Result<()> {
    logging::init_stderr(level)?;
    let mut store = arg.store.open()?;
    match &arg.action {
        ProfileAction::Show { name } => {
            let profile = store
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("No profile named {name:?}"))?;
            util::print_json(profile)?;
        }
        ProfileAction::Leaderboard { limit } => {
            util::print_json(&store.leaderboard(*limit))?;
        }
        ProfileAction::Delete { name } => {
            anyhow::ensure!(store.delete(name), "No profile named {name:?}");
            store.save()?;
            log::info!("deleted profile {name:?}");
        }
    }
    Ok(())
}
