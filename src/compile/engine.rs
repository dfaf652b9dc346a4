//! Engine trait: the one capability the compile service depends on.

use std::path::Path;

use async_trait::async_trait;

use super::EngineError;

/// Options passed to an engine for one render.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Absolute path of the source file. Engines resolve relative
    /// includes and imports from here.
    pub filename: &'a Path,
}

/// A preprocessor engine that turns source text into compiled text.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Render `source` asynchronously.
    async fn render(&self, source: &str, options: RenderOptions<'_>) -> Result<String, EngineError>;
}
