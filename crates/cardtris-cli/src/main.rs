mod command;
mod logging;
mod profile;
mod tui;
mod util;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
