//! Installing and removing preprocessor packages.
//!
//! Preprocessors are npm packages installed under the tool root, so the set of
//! installed preprocessors is whatever that root's `package.json` declares.

use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::config::Settings;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {action}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        action: &'static str,
        status: String,
        stderr: String,
    },
}

/// Runs the configured package manager against the tool root.
#[derive(Debug, Clone)]
pub struct PackageManager {
    program: String,
    prefix: PathBuf,
}

impl PackageManager {
    pub fn new(program: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.package_manager.program, &settings.tool_root)
    }

    pub async fn install(&self, names: &[&str]) -> Result<(), PackageError> {
        self.run("install", names).await
    }

    pub async fn uninstall(&self, names: &[&str]) -> Result<(), PackageError> {
        self.run("uninstall", names).await
    }

    /// Arguments passed to the package manager for `action`.
    pub fn args(&self, action: &str, names: &[&str]) -> Vec<String> {
        let mut args = vec![
            action.to_string(),
            "--prefix".to_string(),
            self.prefix.to_string_lossy().into_owned(),
        ];
        args.extend(names.iter().map(|n| n.to_string()));
        args
    }

    async fn run(&self, action: &'static str, names: &[&str]) -> Result<(), PackageError> {
        if names.is_empty() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.prefix)
            .await
            .map_err(|source| PackageError::CreateDir {
                path: self.prefix.clone(),
                source,
            })?;

        let args = self.args(action, names);
        crate::log_event!("packages", action, "{}", names.join(" "));
        crate::debug_event!("packages", "run", "{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| PackageError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PackageError::Failed {
                program: self.program.clone(),
                action,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
