//! Extension index for one watch session.

use std::collections::HashMap;
use std::path::Path;

use super::{InstalledSet, PreprocessorDescriptor, normalize_extension};

/// Maps a source extension to the installed preprocessor that owns it.
///
/// Built once at session start and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIndex {
    entries: HashMap<String, PreprocessorDescriptor>,
}

impl ExtensionIndex {
    /// Flatten the source extensions of every installed preprocessor.
    pub fn build(installed: &InstalledSet) -> Self {
        let entries = installed
            .iter()
            .flat_map(|descriptor| {
                descriptor
                    .source_extensions
                    .iter()
                    .map(move |ext| (normalize_extension(ext), *descriptor))
            })
            .collect();
        Self { entries }
    }

    /// Preprocessor name for an extension.
    pub fn lookup(&self, extension: &str) -> Option<&'static str> {
        self.descriptor(extension).map(|d| d.name)
    }

    pub fn descriptor(&self, extension: &str) -> Option<&PreprocessorDescriptor> {
        self.entries.get(&normalize_extension(extension))
    }

    /// Classify a path by its extension.
    pub fn classify(&self, path: &Path) -> Option<&PreprocessorDescriptor> {
        let ext = path.extension()?.to_str()?;
        self.descriptor(ext)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
