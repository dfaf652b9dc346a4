//! `pen`: watch a web project, compile changed files with installable
//! preprocessors and live-reload the browser.

pub mod cli;
pub mod compile;
pub mod config;
pub mod logging;
pub mod packages;
pub mod pipeline;
pub mod project;
pub mod registry;
pub mod reload;
pub mod scaffold;
pub mod watcher;

pub use compile::{CompileError, CompileService, Engine};
pub use config::Settings;
pub use pipeline::{FilePipeline, PipelineOutcome, WatchEvent, WatchTarget};
pub use project::ProjectConfigService;
pub use registry::{Category, ExtensionIndex, InstalledSet, PreprocessorDescriptor, Registry};
pub use reload::{LiveReloadServer, Reloader};
