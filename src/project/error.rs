use std::path::PathBuf;
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors from the project configuration service.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
