//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod config;
pub mod create;
pub mod default;
pub mod list;
pub mod packages;
pub mod watch;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::project::ProjectConfigService;
use crate::registry::{Category, InstalledSet, Registry};

/// Registry, installed set and project configuration as found on disk.
pub struct ToolState {
    pub registry: Registry,
    pub installed: InstalledSet,
    pub config: ProjectConfigService,
}

impl ToolState {
    /// Read the tool root. Defaults naming uninstalled preprocessors are reset.
    pub fn load(settings: &Settings) -> anyhow::Result<Self> {
        let registry = Registry::builtin();
        let installed = InstalledSet::load(&registry, &settings.manifest_path())
            .context("Cannot determine installed preprocessors")?;
        let config = ProjectConfigService::load_reconciled(settings.project_config_path(), &installed);

        Ok(Self {
            registry,
            installed,
            config,
        })
    }

    /// Write the configuration, logging instead of failing.
    pub async fn persist(&self) {
        if let Err(e) = self.config.persist().await {
            tracing::error!("[config] {e}");
        }
    }
}

/// Print the default preprocessor of every category.
pub fn print_defaults(config: &ProjectConfigService) {
    for category in Category::ALL {
        let choice = config.default_for(category);
        let label = format!("{:<8}", category.as_str());
        if choice.is_none() {
            println!("{}{}", style(label).cyan(), style(choice).dim());
        } else {
            println!("{}{}", style(label).cyan(), style(choice).green());
        }
    }
}
