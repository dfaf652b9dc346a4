//! Tool settings.
//!
//! Layered configuration:
//! - Default values
//! - `settings.toml` in the tool root (or the file passed with `--config`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the commands)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PEN_` and use double
//! underscores to separate nested levels:
//! - `PEN_SERVER__PORT=4000` sets `server.port`
//! - `PEN_WATCH__DEBOUNCE_MS=100` sets `watch.debounce_ms`
//! - `PEN_TOOL_ROOT=/opt/pens` sets `tool_root`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Directory holding `package.json`, `node_modules` and `pens.json`
    #[serde(default = "default_tool_root")]
    pub tool_root: PathBuf,

    /// Live-reload server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// File watching settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// External package manager
    #[serde(default)]
    pub package_manager: PackageManagerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port serving the project with live reload
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port serving the session status page
    #[serde(default = "default_ui_port")]
    pub ui_port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet period a file must stay unchanged before it is processed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Path prefixes never watched or compiled
    #[serde(default = "default_watch_ignore")]
    pub ignore: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PackageManagerConfig {
    /// Executable used to install and remove preprocessor packages
    #[serde(default = "default_package_manager")]
    pub program: String,
}

/// Logging configuration.
///
/// `RUST_LOG` takes precedence over these settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `pipeline = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_tool_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".pens"))
        .unwrap_or_else(|| PathBuf::from(".pens"))
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_ui_port() -> u16 {
    3001
}
fn default_debounce_ms() -> u64 {
    50
}
fn default_watch_ignore() -> Vec<PathBuf> {
    vec![PathBuf::from("node_modules"), PathBuf::from(".git")]
}
fn default_package_manager() -> String {
    "npm".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool_root: default_tool_root(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
            package_manager: PackageManagerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ui_port: default_ui_port(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: default_watch_ignore(),
        }
    }
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            program: default_package_manager(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// The settings file is `<tool_root>/settings.toml`, where `tool_root`
    /// comes from `PEN_TOOL_ROOT` or its default.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let tool_root = std::env::var_os("PEN_TOOL_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_tool_root);
        Self::load_from(tool_root.join("settings.toml"))
    }

    /// Load configuration from a specific file, still honoring `PEN_` variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("PEN_").map(|key| {
                    key.as_str()
                        .to_lowercase()
                        .replace("__", ".")
                        .into()
                }),
            )
            .extract()
            .map_err(Box::new)
    }

    /// `package.json` listing installed preprocessor packages.
    pub fn manifest_path(&self) -> PathBuf {
        self.tool_root.join("package.json")
    }

    /// Directory holding the preprocessor executables.
    pub fn bin_dir(&self) -> PathBuf {
        self.tool_root.join("node_modules").join(".bin")
    }

    /// Persisted project configuration.
    pub fn project_config_path(&self) -> PathBuf {
        crate::project::ProjectConfigService::path_in(&self.tool_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.ui_port, 3001);
        assert_eq!(settings.watch.debounce_ms, 50);
        assert_eq!(settings.package_manager.program, "npm");
        assert_eq!(settings.logging.default, "info");
        assert!(settings.watch.ignore.contains(&PathBuf::from("node_modules")));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
tool_root = "/opt/pens"

[server]
port = 8080

[watch]
debounce_ms = 200
ignore = ["vendor"]

[logging]
default = "debug"

[logging.modules]
pipeline = "trace"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.tool_root, PathBuf::from("/opt/pens"));
        assert_eq!(settings.server.port, 8080);
        // Unspecified keys keep their defaults
        assert_eq!(settings.server.ui_port, 3001);
        assert_eq!(settings.watch.debounce_ms, 200);
        assert_eq!(settings.watch.ignore, vec![PathBuf::from("vendor")]);
        assert_eq!(settings.logging.default, "debug");
        assert_eq!(settings.logging.modules["pipeline"], "trace");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.package_manager.program, "npm");
    }

    #[test]
    fn test_derived_paths() {
        let settings = Settings {
            tool_root: PathBuf::from("/tools/pens"),
            ..Settings::default()
        };
        assert_eq!(settings.manifest_path(), PathBuf::from("/tools/pens/package.json"));
        assert_eq!(
            settings.bin_dir(),
            PathBuf::from("/tools/pens/node_modules/.bin")
        );
        assert_eq!(
            settings.project_config_path(),
            PathBuf::from("/tools/pens/pens.json")
        );
    }
}
