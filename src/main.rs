use std::process::ExitCode;

use clap::Parser;
use console::style;

use pens::Settings;
use pens::cli::{self, Cli};
use pens::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} invalid settings: {e}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };

    let mut logging_config = settings.logging.clone();
    if cli.debug {
        logging_config.default = "debug".to_string();
    }
    logging::init_with_config(&logging_config);

    match cli::dispatch(cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
