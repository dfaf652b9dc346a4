//! Config command.

use crate::config::Settings;

/// Display the settings in effect after all layers are merged.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}
