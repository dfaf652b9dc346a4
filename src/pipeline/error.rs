//! Error types for the file pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::compile::CompileError;

/// Failures while processing one file event.
///
/// All of these end the event, never the session.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid watch target, detected before a session starts.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("--src and --dist must be given together (got only {given})")]
    UnpairedRoots { given: &'static str },

    #[error("--src and --dist must be different directories (both are {path})")]
    SameRoots { path: PathBuf },
}
