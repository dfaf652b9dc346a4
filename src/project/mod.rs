//! Project configuration: the default preprocessor per output category.
//!
//! Persisted as `pens.json` in the tool root:
//!
//! ```json
//! { "defaultPreprocessors": { "markup": "pug-cli", "style": "none", "script": "none" } }
//! ```

mod error;

pub use error::ConfigError;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::{Category, InstalledSet, Registry, RegistryError};

/// File name of the persisted configuration inside the tool root.
pub const CONFIG_FILE_NAME: &str = "pens.json";

const NONE_SENTINEL: &str = "none";

/// A category default: either a preprocessor name or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefaultChoice {
    #[default]
    None,
    Named(String),
}

impl DefaultChoice {
    pub fn name(&self) -> Option<&str> {
        match self {
            DefaultChoice::None => None,
            DefaultChoice::Named(name) => Some(name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DefaultChoice::None)
    }
}

impl From<String> for DefaultChoice {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == NONE_SENTINEL {
            DefaultChoice::None
        } else {
            DefaultChoice::Named(trimmed.to_string())
        }
    }
}

impl From<DefaultChoice> for String {
    fn from(value: DefaultChoice) -> Self {
        match value {
            DefaultChoice::None => NONE_SENTINEL.to_string(),
            DefaultChoice::Named(name) => name,
        }
    }
}

impl fmt::Display for DefaultChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultChoice::None => f.write_str(NONE_SENTINEL),
            DefaultChoice::Named(name) => f.write_str(name),
        }
    }
}

/// Default preprocessor per category. Every key is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPreprocessors {
    #[serde(default)]
    pub markup: DefaultChoice,
    #[serde(default)]
    pub style: DefaultChoice,
    #[serde(default)]
    pub script: DefaultChoice,
}

impl DefaultPreprocessors {
    pub fn get(&self, category: Category) -> &DefaultChoice {
        match category {
            Category::Markup => &self.markup,
            Category::Style => &self.style,
            Category::Script => &self.script,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut DefaultChoice {
        match category {
            Category::Markup => &mut self.markup,
            Category::Style => &mut self.style,
            Category::Script => &mut self.script,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    #[serde(default)]
    pub default_preprocessors: DefaultPreprocessors,
}

/// Loads, mutates and persists the [`ProjectConfiguration`].
///
/// The in-memory record is authoritative for the rest of the process even
/// when a persist fails.
#[derive(Debug)]
pub struct ProjectConfigService {
    path: PathBuf,
    config: ProjectConfiguration,
}

impl ProjectConfigService {
    /// Path of the configuration file inside `tool_root`.
    pub fn path_in(tool_root: &Path) -> PathBuf {
        tool_root.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration, falling back to all-`none` defaults.
    ///
    /// Never fails: a missing file is normal, an unreadable or corrupt one
    /// is logged and replaced in memory.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        "[config] ignoring invalid {}: {e}",
                        path.display()
                    );
                    ProjectConfiguration::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                crate::debug_event!("config", "not found, using defaults", "{}", path.display());
                ProjectConfiguration::default()
            }
            Err(e) => {
                tracing::warn!("[config] cannot read {}: {e}", path.display());
                ProjectConfiguration::default()
            }
        };

        Self { path, config }
    }

    /// Load and drop defaults that are no longer installed.
    pub fn load_reconciled(path: impl Into<PathBuf>, installed: &InstalledSet) -> Self {
        let mut service = Self::load(path);
        for category in service.reconcile(installed) {
            tracing::warn!(
                "[config] default {category} preprocessor is no longer installed, reset to none"
            );
        }
        service
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn configuration(&self) -> &ProjectConfiguration {
        &self.config
    }

    pub fn default_for(&self, category: Category) -> &DefaultChoice {
        self.config.default_preprocessors.get(category)
    }

    /// Set a category default without validation.
    pub fn set_default(&mut self, category: Category, choice: DefaultChoice) {
        *self.config.default_preprocessors.get_mut(category) = choice;
    }

    /// Make `name` the default of its own category.
    ///
    /// The name must be recognized and installed.
    pub fn choose(
        &mut self,
        registry: &Registry,
        installed: &InstalledSet,
        name: &str,
    ) -> Result<Category, ConfigError> {
        let descriptor = registry.descriptor_for(name)?;
        if !installed.contains(name) {
            return Err(RegistryError::NotInstalled(name.to_string()).into());
        }
        self.set_default(descriptor.category, DefaultChoice::Named(name.to_string()));
        Ok(descriptor.category)
    }

    /// Reset any category whose default is `name`. Called after a removal.
    ///
    /// Returns the category that was cleared, if any.
    pub fn clear_category_if_uninstalled(&mut self, name: &str) -> Option<Category> {
        let cleared = Category::ALL
            .into_iter()
            .find(|c| self.default_for(*c).name() == Some(name))?;
        self.set_default(cleared, DefaultChoice::None);
        Some(cleared)
    }

    /// Reset every default that does not reference an installed preprocessor.
    pub fn reconcile(&mut self, installed: &InstalledSet) -> Vec<Category> {
        let stale: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| match self.default_for(*c).name() {
                Some(name) => !installed.contains(name),
                None => false,
            })
            .collect();

        for category in &stale {
            self.set_default(*category, DefaultChoice::None);
        }
        stale
    }

    /// Write the whole record to disk.
    ///
    /// The JSON goes to a sibling temp file that is then renamed over the
    /// target, so readers never see a partial file.
    pub async fn persist(&self) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.config)?;
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, format!("{json}\n"))
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(write_err)?;

        crate::debug_event!("config", "persisted", "{}", self.path.display());
        Ok(())
    }
}
