//! Error types for compilation.

use std::path::PathBuf;
use thiserror::Error;

/// Failure inside a single engine invocation.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to talk to {program}: {source}")]
    Io {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("{program} produced output that is not valid UTF-8")]
    InvalidOutput { program: PathBuf },

    #[error("{0}")]
    Render(String),
}

/// Errors returned by [`super::CompileService::compile`].
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Preprocessor '{0}' is not installed")]
    PreprocessorNotInstalled(String),

    #[error("{preprocessor} failed to compile {source_path}: {cause}")]
    Engine {
        preprocessor: String,
        source_path: PathBuf,
        #[source]
        cause: EngineError,
    },
}
