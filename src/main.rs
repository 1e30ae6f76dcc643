mod app;
mod cli;
mod error;
mod logging;
mod paths;
mod settings;

use anyhow::Result;
use clap::Parser;

use crate::cli::Command;
use crate::logging::{LogTarget, init_logging};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let log_path;
    let target = match cli.command {
        Some(Command::Tui) | None => {
            log_path = paths::log_file_path()?;
            LogTarget::File(&log_path)
        }
        _ => LogTarget::Stderr,
    };
    let _log_guard = init_logging(target, cli.verbose)?;
    app::run(cli)
}
