//! List command.

use console::style;

use super::ToolState;
use crate::config::Settings;

/// Print every supported preprocessor with its category and extensions.
///
/// Installed preprocessors are marked, defaults carry a `(default)` suffix.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let state = ToolState::load(settings)?;

    for descriptor in state.registry.descriptors() {
        let installed = state.installed.contains(descriptor.name);
        let is_default = state.config.default_for(descriptor.category).name() == Some(descriptor.name);

        let marker = if installed { style("*").green() } else { style(" ") };
        let name = format!("{:<14}", descriptor.name);
        let name = if installed {
            style(name).bold()
        } else {
            style(name).dim()
        };
        let suffix = if is_default { " (default)" } else { "" };

        println!(
            "{marker} {name}{:<8}{}{suffix}",
            descriptor.category.as_str(),
            descriptor.source_extensions.join(", ")
        );
    }

    if state.installed.is_empty() {
        println!();
        println!("Nothing installed yet. Try {}", style("pen add <name>").green());
    }

    Ok(())
}
