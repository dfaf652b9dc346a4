//! Add and remove commands.

use anyhow::Context;

use super::{ToolState, print_defaults};
use crate::config::Settings;
use crate::packages::PackageManager;
use crate::project::{DefaultChoice, ProjectConfigService};
use crate::registry::{InstalledSet, Registry};

/// Names the registry recognizes. Others are logged and dropped.
fn known_names<'a>(registry: &Registry, names: &'a [String]) -> Vec<&'a str> {
    names
        .iter()
        .filter(|name| match registry.descriptor_for(name) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("[packages] {e}, skipping");
                false
            }
        })
        .map(String::as_str)
        .collect()
}

/// Install preprocessors. Each one becomes its category's default when that
/// category has none.
pub async fn run_add(names: &[String], settings: &Settings) -> anyhow::Result<()> {
    let registry = Registry::builtin();
    let names = known_names(&registry, names);
    if names.is_empty() {
        return Ok(());
    }

    PackageManager::from_settings(settings)
        .install(&names)
        .await
        .context("Failed to install preprocessors")?;

    let mut state = ToolState::load(settings)?;
    for name in names {
        let Some(descriptor) = state.installed.get(name).copied() else {
            tracing::warn!("[packages] {name} is not listed in {} after install", settings.manifest_path().display());
            continue;
        };
        if state.config.default_for(descriptor.category).is_none() {
            state
                .config
                .set_default(descriptor.category, DefaultChoice::Named(name.to_string()));
            crate::log_event!("config", "default", "{} = {name}", descriptor.category);
        }
    }

    state.persist().await;
    print_defaults(&state.config);
    Ok(())
}

/// Uninstall preprocessors. A category whose default was removed reverts to
/// none.
pub async fn run_remove(names: &[String], settings: &Settings) -> anyhow::Result<()> {
    let registry = Registry::builtin();
    let names = known_names(&registry, names);
    if names.is_empty() {
        return Ok(());
    }

    PackageManager::from_settings(settings)
        .uninstall(&names)
        .await
        .context("Failed to uninstall preprocessors")?;

    let installed = InstalledSet::load(&registry, &settings.manifest_path())
        .context("Cannot determine installed preprocessors")?;
    let mut state = ToolState {
        config: ProjectConfigService::load(settings.project_config_path()),
        registry,
        installed,
    };
    for name in names {
        if state.installed.contains(name) {
            tracing::warn!("[packages] {name} is still listed in {}", settings.manifest_path().display());
            continue;
        }
        if let Some(category) = state.config.clear_category_if_uninstalled(name) {
            crate::log_event!("config", "cleared", "{category} (was {name})");
        }
    }
    state.config.reconcile(&state.installed);

    state.persist().await;
    print_defaults(&state.config);
    Ok(())
}
