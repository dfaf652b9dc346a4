//! Command line interface for `pen`.
//!
//! Provides argument parsing and command dispatch.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, WatchArgs};

use crate::config::Settings;

/// Run the parsed command line.
pub async fn dispatch(cli: Cli, settings: &Settings) -> anyhow::Result<()> {
    match cli.command {
        None => commands::watch::run(cli.watch, settings).await,
        Some(Commands::Add { names }) => commands::packages::run_add(&names, settings).await,
        Some(Commands::Remove { names }) => commands::packages::run_remove(&names, settings).await,
        Some(Commands::Create { dir }) => commands::create::run(&dir, settings).await,
        Some(Commands::Default { names, clear }) => {
            commands::default::run(&names, &clear, settings).await
        }
        Some(Commands::List) => commands::list::run(settings),
        Some(Commands::Config) => commands::config::run(settings),
    }
}
