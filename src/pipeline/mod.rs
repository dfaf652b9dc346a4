//! File pipeline.
//!
//! Turns one watcher event into compiled output, a copied file or a plain
//! reload:
//!
//! ```text
//! event ── ignored? ──> Ignored
//!   │
//!   ├─ known extension ──> read ─> compile ─> write ─> reload(destination)
//!   ├─ unknown, dist set ─> copy under dist ─> reload(copy)
//!   └─ unknown, no dist ──> reload(source)
//! ```
//!
//! Every event is independent. A failure is reported for that file only and
//! never stops the session.

mod error;
mod target;

pub use error::{PipelineError, TargetError};
pub use target::WatchTarget;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::compile::CompileService;
use crate::registry::ExtensionIndex;
use crate::reload::Reloader;
use crate::{debug_event, log_event};

/// Kind of filesystem change. Removals never reach the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Add,
    Change,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Change => write!(f, "change"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: EventKind,
    /// Relative to the watched root, or absolute inside it.
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Path is ignored or outside the watched root.
    Ignored,
    Compiled { destination: PathBuf },
    /// The engine produced nothing; nothing written, no reload.
    EmptyOutput { source: PathBuf },
    Copied { destination: PathBuf },
    /// Not compiled and nothing to copy; the browser reloads the source.
    Reloaded { source: PathBuf },
}

/// Per-session pipeline state. Read-only once built, shared across tasks.
pub struct FilePipeline {
    target: WatchTarget,
    index: ExtensionIndex,
    compiler: CompileService,
    reloader: Arc<dyn Reloader>,
}

impl FilePipeline {
    pub fn new(
        target: WatchTarget,
        index: ExtensionIndex,
        compiler: CompileService,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        Self {
            target,
            index,
            compiler,
            reloader,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Run one event to completion.
    pub async fn handle(&self, event: &WatchEvent) -> Result<PipelineOutcome, PipelineError> {
        let Some(relative) = self.target.relative(&event.path) else {
            debug_event!("pipeline", "outside root", "{}", event.path.display());
            return Ok(PipelineOutcome::Ignored);
        };

        if self.target.is_ignored(&relative) {
            debug_event!("pipeline", "ignored", "{}", relative.display());
            return Ok(PipelineOutcome::Ignored);
        }

        let source = self.target.source_path(&relative);
        debug_event!("pipeline", event.kind, "{}", relative.display());

        match self.index.classify(&relative) {
            Some(descriptor) => {
                let destination = self
                    .target
                    .destination(&relative, Some(descriptor.output_extension()));
                self.compile_file(descriptor.name, &source, destination).await
            }
            None => match self.target.dist_root() {
                Some(_) => {
                    let destination = self.target.destination(&relative, None);
                    self.copy_file(&source, destination).await
                }
                None => {
                    self.reloader.reload(&source);
                    Ok(PipelineOutcome::Reloaded { source })
                }
            },
        }
    }

    /// Run one event and log its result. Errors end here.
    pub async fn process(&self, event: WatchEvent) -> Option<PipelineOutcome> {
        match self.handle(&event).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("[pipeline] {}: {e}", event.path.display());
                None
            }
        }
    }

    /// Process an event on its own task so slow or failing files never hold
    /// up others.
    pub fn spawn(self: &Arc<Self>, event: WatchEvent) -> JoinHandle<Option<PipelineOutcome>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.process(event).await })
    }

    async fn compile_file(
        &self,
        preprocessor: &str,
        source: &Path,
        destination: PathBuf,
    ) -> Result<PipelineOutcome, PipelineError> {
        let text = tokio::fs::read_to_string(source)
            .await
            .map_err(|e| PipelineError::Read {
                path: source.to_path_buf(),
                source: e,
            })?;

        let output = self.compiler.compile(&text, preprocessor, source).await?;

        if output.is_empty() {
            debug_event!("pipeline", "empty output", "{}", source.display());
            return Ok(PipelineOutcome::EmptyOutput {
                source: source.to_path_buf(),
            });
        }

        create_parent(&destination).await?;
        tokio::fs::write(&destination, output)
            .await
            .map_err(|e| PipelineError::Write {
                path: destination.clone(),
                source: e,
            })?;

        log_event!(
            "pipeline",
            "compiled",
            "{} -> {}",
            source.display(),
            destination.display()
        );
        self.reloader.reload(&destination);
        Ok(PipelineOutcome::Compiled { destination })
    }

    async fn copy_file(
        &self,
        source: &Path,
        destination: PathBuf,
    ) -> Result<PipelineOutcome, PipelineError> {
        // Copying a file onto itself truncates it
        if same_file(source, &destination).await {
            debug_event!("pipeline", "copy onto itself", "{}", source.display());
            self.reloader.reload(source);
            return Ok(PipelineOutcome::Reloaded {
                source: source.to_path_buf(),
            });
        }

        create_parent(&destination).await?;
        tokio::fs::copy(source, &destination)
            .await
            .map_err(|e| PipelineError::Copy {
                from: source.to_path_buf(),
                to: destination.clone(),
                source: e,
            })?;

        log_event!(
            "pipeline",
            "copied",
            "{} -> {}",
            source.display(),
            destination.display()
        );
        self.reloader.reload(&destination);
        Ok(PipelineOutcome::Copied { destination })
    }
}

impl std::fmt::Debug for FilePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePipeline")
            .field("target", &self.target)
            .field("index", &self.index)
            .field("compiler", &self.compiler)
            .finish_non_exhaustive()
    }
}

async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

async fn create_parent(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    Ok(())
}
