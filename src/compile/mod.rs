//! Compile service.
//!
//! Dispatches source text to the engine registered under a preprocessor
//! name. Engines are chosen from a map built once at startup, so a name that
//! is not installed never reaches an engine.

mod command;
mod engine;
mod error;

pub use command::CommandEngine;
pub use engine::{Engine, RenderOptions};
pub use error::{CompileError, EngineError};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::registry::InstalledSet;

/// Turns source text into compiled text using installed engines.
#[derive(Clone, Default)]
pub struct CompileService {
    engines: HashMap<String, Arc<dyn Engine>>,
}

impl CompileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`CommandEngine`] per installed preprocessor.
    pub fn from_installed(installed: &InstalledSet, bin_dir: &Path) -> Self {
        let mut service = Self::new();
        for descriptor in installed.iter() {
            service.register(
                descriptor.name,
                Arc::new(CommandEngine::for_descriptor(descriptor, bin_dir)),
            );
        }
        service
    }

    /// Register an engine under a preprocessor name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, engine: Arc<dyn Engine>) {
        self.engines.insert(name.into(), engine);
    }

    pub fn with_engine(mut self, name: impl Into<String>, engine: Arc<dyn Engine>) -> Self {
        self.register(name, engine);
        self
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Compile `source_text` with the named preprocessor.
    ///
    /// Either returns the complete output or an error; the engine's own
    /// failure is kept as the error's cause.
    pub async fn compile(
        &self,
        source_text: &str,
        preprocessor_name: &str,
        source_path: &Path,
    ) -> Result<String, CompileError> {
        let engine = self
            .engines
            .get(preprocessor_name)
            .ok_or_else(|| CompileError::PreprocessorNotInstalled(preprocessor_name.to_string()))?;

        crate::debug_event!(
            "compile",
            "start",
            "{} with {}",
            source_path.display(),
            engine.name()
        );

        engine
            .render(
                source_text,
                RenderOptions {
                    filename: source_path,
                },
            )
            .await
            .map_err(|cause| CompileError::Engine {
                preprocessor: preprocessor_name.to_string(),
                source_path: source_path.to_path_buf(),
                cause,
            })
    }
}

impl std::fmt::Debug for CompileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.engines.keys().collect();
        names.sort();
        f.debug_struct("CompileService")
            .field("engines", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Upper-cases its input and records the filename hint.
    #[derive(Default)]
    struct Shout {
        calls: AtomicUsize,
        last_filename: std::sync::Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl Engine for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        async fn render(&self, source: &str, options: RenderOptions<'_>) -> Result<String, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_filename.lock().unwrap() = Some(options.filename.to_path_buf());
            Ok(source.to_uppercase())
        }
    }

    struct Broken;

    #[async_trait]
    impl Engine for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn render(&self, _source: &str, _options: RenderOptions<'_>) -> Result<String, EngineError> {
            Err(EngineError::Render("unexpected token at 1:4".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatches_to_named_engine_with_filename() {
        let shout = Arc::new(Shout::default());
        let service = CompileService::new().with_engine("shout", shout.clone());
        let path = PathBuf::from("/proj/src/index.tpl");

        let out = service.compile("hello", "shout", &path).await.unwrap();
        assert_eq!(out, "HELLO");
        assert_eq!(shout.calls.load(Ordering::SeqCst), 1);
        assert_eq!(shout.last_filename.lock().unwrap().as_deref(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_empty_source_is_valid_input() {
        let service = CompileService::new().with_engine("shout", Arc::new(Shout::default()));
        let out = service
            .compile("", "shout", Path::new("/proj/empty.tpl"))
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_not_installed_never_dispatches() {
        let shout = Arc::new(Shout::default());
        let service = CompileService::new().with_engine("shout", shout.clone());

        let err = service
            .compile("hello", "whisper", Path::new("/proj/a.tpl"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::PreprocessorNotInstalled(name) if name == "whisper"));
        assert_eq!(shout.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_is_wrapped() {
        let service = CompileService::new().with_engine("broken", Arc::new(Broken));
        let path = PathBuf::from("/proj/a.tpl");

        let err = service.compile("x", "broken", &path).await.unwrap_err();
        match &err {
            CompileError::Engine {
                preprocessor,
                source_path,
                cause,
            } => {
                assert_eq!(preprocessor, "broken");
                assert_eq!(source_path, &path);
                assert!(cause.to_string().contains("unexpected token"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_installed_registers_each_member() {
        let registry = Registry::builtin();
        let installed = InstalledSet::from_dependencies(&registry, ["sass", "marked"]);
        let service = CompileService::from_installed(&installed, Path::new("/tools/node_modules/.bin"));

        assert!(service.is_installed("sass"));
        assert!(service.is_installed("marked"));
        assert!(!service.is_installed("less"));
    }
}
