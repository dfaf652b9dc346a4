//! Installed preprocessors, derived from the tool root's `package.json`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{Registry, RegistryError, PreprocessorDescriptor};

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

/// Descriptors whose package is declared as a dependency.
///
/// Recomputed on every process start; never persisted.
#[derive(Debug, Clone, Default)]
pub struct InstalledSet {
    members: Vec<PreprocessorDescriptor>,
}

impl InstalledSet {
    /// Build from an explicit list of descriptors.
    pub fn new(members: Vec<PreprocessorDescriptor>) -> Self {
        Self { members }
    }

    /// Intersect the registry with the dependencies declared in `manifest`.
    ///
    /// A missing manifest means nothing has been installed yet.
    pub fn load(registry: &Registry, manifest: &Path) -> Result<Self, RegistryError> {
        let content = match std::fs::read_to_string(manifest) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                crate::debug_event!("registry", "no manifest", "{}", manifest.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RegistryError::ManifestRead {
                    path: manifest.to_path_buf(),
                    source,
                });
            }
        };

        let parsed: PackageManifest =
            serde_json::from_str(&content).map_err(|source| RegistryError::ManifestParse {
                path: manifest.to_path_buf(),
                source,
            })?;

        Ok(Self::from_dependencies(
            registry,
            parsed.dependencies.keys().map(String::as_str),
        ))
    }

    /// Keep registry entries whose name appears in `dependencies`.
    pub fn from_dependencies<'a>(
        registry: &Registry,
        dependencies: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let declared: Vec<&str> = dependencies.into_iter().collect();
        let members = registry
            .descriptors()
            .iter()
            .filter(|d| declared.contains(&d.name))
            .copied()
            .collect();
        Self { members }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&PreprocessorDescriptor> {
        self.members.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreprocessorDescriptor> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.members.iter().map(|d| d.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::builtin();

        let installed = InstalledSet::load(&registry, &temp_dir.path().join("package.json")).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_load_filters_unsupported_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        fs::write(
            &manifest,
            r#"{
  "name": "pens-tools",
  "dependencies": {
    "sass": "^1.77.0",
    "left-pad": "^1.3.0",
    "marked": "^12.0.0"
  }
}"#,
        )
        .unwrap();

        let registry = Registry::builtin();
        let installed = InstalledSet::load(&registry, &manifest).unwrap();

        assert_eq!(installed.len(), 2);
        assert!(installed.contains("sass"));
        assert!(installed.contains("marked"));
        assert!(!installed.contains("left-pad"));
        assert!(!installed.contains("less"));
    }

    #[test]
    fn test_manifest_without_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        fs::write(&manifest, r#"{ "name": "empty" }"#).unwrap();

        let installed = InstalledSet::load(&Registry::builtin(), &manifest).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        fs::write(&manifest, "{ not json").unwrap();

        let err = InstalledSet::load(&Registry::builtin(), &manifest).unwrap_err();
        assert!(matches!(err, RegistryError::ManifestParse { .. }));
    }
}
