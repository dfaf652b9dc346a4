//! Error types for registry lookups and installed-set discovery.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("'{0}' is not a supported preprocessor")]
    UnknownPreprocessor(String),

    #[error("Preprocessor '{0}' is not installed (run `pen add {0}`)")]
    NotInstalled(String),

    #[error("Unknown category '{0}' (expected markup, style or script)")]
    UnknownCategory(String),

    #[error("Preprocessor '{0}' is declared twice")]
    DuplicateName(String),

    #[error("Extension '{extension}' is claimed by both '{first}' and '{second}'")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },

    #[error("Cannot read package manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
