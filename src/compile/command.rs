//! Engine backed by a preprocessor's command line tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Engine, EngineError, RenderOptions};
use crate::registry::{EngineCommand, PreprocessorDescriptor};

/// Runs an installed package binary, piping source text through it.
///
/// The child runs in the source file's directory so tools that resolve
/// relative imports from the working directory behave like they do when run
/// by hand.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    name: String,
    program: PathBuf,
    command: EngineCommand,
}

impl CommandEngine {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, command: EngineCommand) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            command,
        }
    }

    /// Engine for a descriptor whose binary lives in `bin_dir`.
    pub fn for_descriptor(descriptor: &PreprocessorDescriptor, bin_dir: &Path) -> Self {
        let bin = if cfg!(windows) {
            format!("{}.cmd", descriptor.command.bin)
        } else {
            descriptor.command.bin.to_string()
        };
        Self::new(descriptor.name, bin_dir.join(bin), descriptor.command)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Engine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, source: &str, options: RenderOptions<'_>) -> Result<String, EngineError> {
        let args = self.command.render_args(options.filename);
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = options.filename.parent().filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }

        crate::debug_event!(
            "engine",
            "spawn",
            "{} {}",
            self.program.display(),
            args.join(" ")
        );

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Feed stdin from its own task so a chatty child cannot block on a
        // full stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.as_bytes().to_vec();
            tokio::spawn(async move {
                let result = stdin.write_all(&input).await;
                drop(stdin);
                result
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| EngineError::Io {
                program: self.program.clone(),
                source,
            })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading all of stdin; its exit
                // status decides the outcome.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(source)) => {
                    return Err(EngineError::Io {
                        program: self.program.clone(),
                        source,
                    });
                }
                Err(join_err) => return Err(EngineError::Render(join_err.to_string())),
            }
        }

        if !output.status.success() {
            return Err(EngineError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| EngineError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const NO_ARGS: EngineCommand = EngineCommand {
        bin: "cat",
        args: &[],
    };

    #[tokio::test]
    async fn test_pipes_source_through_program() {
        let engine = CommandEngine::new("cat", "cat", NO_ARGS);
        let path = PathBuf::from("/tmp/page.tpl");

        let out = engine
            .render("<h1>hi</h1>\n", RenderOptions { filename: &path })
            .await
            .unwrap();
        assert_eq!(out, "<h1>hi</h1>\n");
    }

    #[tokio::test]
    async fn test_large_input_does_not_deadlock() {
        let engine = CommandEngine::new("cat", "cat", NO_ARGS);
        let path = PathBuf::from("/tmp/big.tpl");
        let source = "x".repeat(1024 * 1024);

        let out = engine
            .render(&source, RenderOptions { filename: &path })
            .await
            .unwrap();
        assert_eq!(out.len(), source.len());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let command = EngineCommand {
            bin: "sh",
            args: &["-c", "echo partial; echo 'syntax error' >&2; exit 3"],
        };
        let engine = CommandEngine::new("broken", "sh", command);
        let path = PathBuf::from("/tmp/a.tpl");

        let err = engine
            .render("", RenderOptions { filename: &path })
            .await
            .unwrap_err();
        match err {
            EngineError::Failed { stderr, .. } => assert_eq!(stderr, "syntax error"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let engine = CommandEngine::new("ghost", "/nonexistent/bin/ghost", NO_ARGS);
        let path = PathBuf::from("/tmp/a.tpl");

        let err = engine
            .render("x", RenderOptions { filename: &path })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_filename_placeholder_reaches_program() {
        let command = EngineCommand {
            bin: "echo",
            args: &["{filename}"],
        };
        let engine = CommandEngine::new("echo", "echo", command);
        let path = PathBuf::from("/tmp/styles/site.scss");

        let out = engine
            .render("", RenderOptions { filename: &path })
            .await
            .unwrap();
        assert_eq!(out.trim(), "/tmp/styles/site.scss");
    }

    #[test]
    fn test_for_descriptor_resolves_bin_dir() {
        let registry = crate::registry::Registry::builtin();
        let sass = registry.descriptor_for("sass").unwrap();

        let engine = CommandEngine::for_descriptor(&sass, Path::new("/tools/node_modules/.bin"));
        assert_eq!(engine.program(), Path::new("/tools/node_modules/.bin/sass"));
        assert_eq!(engine.name(), "sass");
    }
}
