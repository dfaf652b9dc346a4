//! Preprocessor registry.
//!
//! Static metadata describing every supported preprocessor, plus the two
//! runtime views derived from it:
//!
//! ```text
//! Registry (all descriptors, declared)
//!     |
//!     +-- InstalledSet   (descriptors whose npm package is a dependency)
//!             |
//!             +-- ExtensionIndex (extension -> preprocessor name)
//! ```

mod builtin;
mod category;
mod descriptor;
mod error;
mod index;
mod installed;

pub use builtin::BUILTIN;
pub use category::Category;
pub use descriptor::{EngineCommand, PreprocessorDescriptor};
pub use error::RegistryError;
pub use index::ExtensionIndex;
pub use installed::InstalledSet;

use std::collections::HashMap;

/// Lookup table over a fixed set of preprocessor descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<PreprocessorDescriptor>,
    by_extension: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry, rejecting duplicate names and shared extensions.
    pub fn new(descriptors: Vec<PreprocessorDescriptor>) -> Result<Self, RegistryError> {
        let mut by_extension = HashMap::new();

        for (idx, descriptor) in descriptors.iter().enumerate() {
            if descriptors[..idx].iter().any(|d| d.name == descriptor.name) {
                return Err(RegistryError::DuplicateName(descriptor.name.to_string()));
            }

            for ext in descriptor.source_extensions {
                let ext = normalize_extension(ext);
                if let Some(&owner) = by_extension.get(&ext) {
                    let owner: &PreprocessorDescriptor = &descriptors[owner];
                    return Err(RegistryError::DuplicateExtension {
                        extension: ext,
                        first: owner.name.to_string(),
                        second: descriptor.name.to_string(),
                    });
                }
                by_extension.insert(ext, idx);
            }
        }

        Ok(Self {
            descriptors,
            by_extension,
        })
    }

    /// Registry over the built-in preprocessor table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.to_vec()).expect("built-in preprocessor table is consistent")
    }

    /// Find the preprocessor that accepts `extension` as input.
    ///
    /// Accepts `"scss"`, `".scss"` or `"SCSS"`.
    pub fn lookup(&self, extension: &str) -> Option<PreprocessorDescriptor> {
        let ext = normalize_extension(extension);
        self.by_extension
            .get(ext.as_str())
            .map(|&idx| self.descriptors[idx])
    }

    /// Descriptor for a preprocessor name.
    pub fn descriptor_for(&self, name: &str) -> Result<PreprocessorDescriptor, RegistryError> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownPreprocessor(name.to_string()))
    }

    pub fn descriptors(&self) -> &[PreprocessorDescriptor] {
        &self.descriptors
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TPL: PreprocessorDescriptor = PreprocessorDescriptor {
        name: "tpl",
        category: Category::Markup,
        source_extensions: &["tpl", "template"],
        command: EngineCommand {
            bin: "tpl",
            args: &[],
        },
    };

    const MYSTYLE: PreprocessorDescriptor = PreprocessorDescriptor {
        name: "mystyle",
        category: Category::Style,
        source_extensions: &["mystyle"],
        command: EngineCommand {
            bin: "mystyle",
            args: &[],
        },
    };

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = Registry::builtin();
        assert!(!registry.descriptors().is_empty());

        for descriptor in registry.descriptors() {
            for ext in descriptor.source_extensions {
                assert_eq!(registry.lookup(ext).unwrap().name, descriptor.name);
            }
        }
    }

    #[test]
    fn test_lookup_normalizes_extension() {
        let registry = Registry::new(vec![TPL, MYSTYLE]).unwrap();

        assert_eq!(registry.lookup("tpl").unwrap().name, "tpl");
        assert_eq!(registry.lookup(".TPL").unwrap().name, "tpl");
        assert_eq!(registry.lookup("template").unwrap().name, "tpl");
        assert!(registry.lookup("txt").is_none());
    }

    #[test]
    fn test_descriptor_for_unknown_name() {
        let registry = Registry::new(vec![TPL]).unwrap();

        let err = registry.descriptor_for("nope").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownPreprocessor(name) if name == "nope"));
        assert_eq!(registry.descriptor_for("tpl").unwrap().category, Category::Markup);
    }

    #[test]
    fn test_rejects_shared_extension() {
        let clash = PreprocessorDescriptor {
            name: "other",
            source_extensions: &["template"],
            ..TPL
        };

        let err = Registry::new(vec![TPL, clash]).unwrap_err();
        match err {
            RegistryError::DuplicateExtension {
                extension,
                first,
                second,
            } => {
                assert_eq!(extension, "template");
                assert_eq!(first, "tpl");
                assert_eq!(second, "other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extensions_are_case_insensitive() {
        let upper = PreprocessorDescriptor {
            name: "upper",
            source_extensions: &[".TPL"],
            ..TPL
        };
        let registry = Registry::new(vec![upper]).unwrap();
        assert_eq!(registry.lookup("tpl").unwrap().name, "upper");

        let shouting = PreprocessorDescriptor {
            name: "shouting",
            source_extensions: &["MYSTYLE"],
            ..MYSTYLE
        };
        let err = Registry::new(vec![MYSTYLE, shouting]).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateExtension { extension, .. } if extension == "mystyle"
        ));
    }

    #[test]
    fn test_rejects_duplicate_name() {
        let err = Registry::new(vec![TPL, TPL]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(_)));
    }
}
