//! Default command.

use super::{ToolState, print_defaults};
use crate::config::Settings;
use crate::project::DefaultChoice;
use crate::registry::Category;

/// Set or clear category defaults, then print them.
///
/// A name that is unknown or not installed is reported and skipped; the
/// remaining names still apply.
pub async fn run(names: &[String], clear: &[Category], settings: &Settings) -> anyhow::Result<()> {
    let mut state = ToolState::load(settings)?;
    let changing = !names.is_empty() || !clear.is_empty();

    for category in clear {
        state.config.set_default(*category, DefaultChoice::None);
        crate::log_event!("config", "cleared", "{category}");
    }

    for name in names {
        match state.config.choose(&state.registry, &state.installed, name) {
            Ok(category) => crate::log_event!("config", "default", "{category} = {name}"),
            Err(e) => tracing::error!("[config] {e}"),
        }
    }

    if changing {
        state.persist().await;
    }

    print_defaults(&state.config);
    Ok(())
}
