use std::path::PathBuf;

use cardtris_engine::GameSession;
use chrono::Local;
use log::LevelFilter;

use crate::{logging, tui::Runtime, util};

use self::app::PlayApp;

use super::{ProfileStoreArg, SessionArg};

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    session: SessionArg,
    /// Play as this player: draw from their unlocked cards and record the result
    #[clap(long)]
    player: Option<String>,
    #[clap(flatten)]
    store: ProfileStoreArg,
    /// Write log messages to this file
    #[clap(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg, level: LevelFilter) -> anyhow::Result<()> {
    let PlayArg {
        session: session_arg,
        player,
        store: store_arg,
        log_file,
    } = arg;
    logging::init_file(level, log_file.as_deref())?;

    let config = session_arg.load_config()?;
    let mut store = player.as_ref().map(|_| store_arg.open()).transpose()?;
    if let (Some(store), Some(name)) = (&mut store, player) {
        store.get_or_create(name, Local::now());
    }
    let unlocked = super::unlocked_pool(store.as_ref(), player.as_deref());

    let session = match session_arg.seed {
        Some(seed) => GameSession::with_seed(config, &unlocked, seed)?,
        None => GameSession::new(config, &unlocked)?,
    };
    let mut app = PlayApp::new(session);
    Runtime::new().run(&mut app)?;

    let summary = app.session().summary();
    log::info!("session ended with {} points", summary.score);
    if let (Some(store), Some(name)) = (&mut store, player) {
        let profile = store.get_or_create(name, Local::now());
        let unlocked = profile.record_session(&summary, Local::now());
        if !unlocked.is_empty() {
            log::info!("{name} unlocked cards {unlocked:?}");
        }
        store.save()?;
    }
    logging::flush();

    util::print_json(&summary)?;
    Ok(())
}
