//! CLI argument parsing using clap.
//!
//! Without a subcommand `pen` starts a watch session on the project
//! directory.

use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::registry::Category;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const AFTER_HELP: &str = "\
Examples:
  $ pen                          Watch the current directory
  $ pen --src src --dist dist    Compile src/ into dist/
  $ pen add sass pug-cli         Install preprocessors
  $ pen default marked           Use marked for new markup files
  $ pen create my-site           Start a project with the defaults";

#[derive(Parser)]
#[command(
    name = "pen",
    version,
    about = "Watch a web project, compile it with preprocessors and live-reload the browser",
    styles = clap_cargo_style(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub watch: WatchArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options of the watch session.
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Port serving the project (overrides settings)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Port serving the session status page (overrides settings)
    #[arg(short, long, value_name = "PORT")]
    pub ui_port: Option<u16>,

    /// Directory holding the sources, used together with --dist
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Directory receiving compiled and copied files, used together with --src
    #[arg(long, value_name = "DIR")]
    pub dist: Option<PathBuf>,

    /// Path prefix to leave alone, relative to the watched directory
    #[arg(long, value_name = "PATH")]
    pub ignore: Vec<PathBuf>,

    /// Project directory (defaults to the current directory)
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install preprocessors
    Add {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Uninstall preprocessors
    Remove {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Create a starter project using the default preprocessors
    Create {
        /// New project directory; must not exist or be empty
        dir: PathBuf,
    },

    /// Show or change the default preprocessor of each category
    Default {
        /// Preprocessors to make the default of their category
        #[arg(value_name = "NAME")]
        names: Vec<String>,

        /// Reset a category (markup, style, script) to none
        #[arg(long, value_name = "CATEGORY")]
        clear: Vec<Category>,
    },

    /// List supported preprocessors
    List,

    /// Display active settings
    Config,
}
