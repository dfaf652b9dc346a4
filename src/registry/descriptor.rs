use std::path::Path;

use super::Category;

/// How a preprocessor's command line tool is invoked.
///
/// `args` may contain `{filename}`, `{dir}` and `{ext}` placeholders, which
/// are replaced with the absolute source path, its parent directory and its
/// extension. Source text goes to stdin, compiled text comes from stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCommand {
    /// Executable name under `node_modules/.bin`.
    pub bin: &'static str,
    pub args: &'static [&'static str],
}

impl EngineCommand {
    /// Expand the argument template for one source file.
    pub fn render_args(&self, source_path: &Path) -> Vec<String> {
        let filename = source_path.to_string_lossy();
        let dir = source_path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let ext = source_path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{filename}", &filename)
                    .replace("{dir}", &dir)
                    .replace("{ext}", &ext)
            })
            .collect()
    }
}

/// Immutable metadata for one supported preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessorDescriptor {
    /// Unique name, also the npm package that provides it.
    pub name: &'static str,
    pub category: Category,
    /// Accepted input extensions; the first one is canonical.
    pub source_extensions: &'static [&'static str],
    pub command: EngineCommand,
}

impl PreprocessorDescriptor {
    pub fn output_extension(&self) -> &'static str {
        self.category.output_extension()
    }

    /// Extension used when scaffolding a new file for this preprocessor.
    pub fn canonical_extension(&self) -> &'static str {
        self.source_extensions
            .first()
            .copied()
            .unwrap_or_else(|| self.output_extension())
    }
}
