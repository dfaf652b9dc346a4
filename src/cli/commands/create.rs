//! Create command.

use std::path::Path;

use anyhow::Context;
use console::style;

use super::ToolState;
use crate::config::Settings;
use crate::scaffold;

pub async fn run(dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let state = ToolState::load(settings)?;
    let files = scaffold::plan(&state.registry, &state.config);

    let written = scaffold::create(dir, &files)
        .await
        .with_context(|| format!("Cannot create project in {}", dir.display()))?;

    println!("{} {}", style("Created").green().bold(), dir.display());
    for path in written {
        println!("  {}", path.display());
    }
    println!();
    println!("Start it with {}", style(format!("pen {}", dir.display())).green());
    Ok(())
}
