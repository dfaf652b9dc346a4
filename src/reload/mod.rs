//! Live reload.
//!
//! The pipeline only knows the [`Reloader`] trait. The production
//! implementation is [`LiveReloadServer`], a static file server that injects a
//! small client script into HTML pages and pushes change notifications to it
//! over a WebSocket.

mod error;
mod inject;
mod server;

pub use error::ReloadError;
pub use server::{LiveReloadServer, ReloadOptions, reload_message};

use std::path::Path;

/// Receives "this file changed" notifications from the pipeline.
pub trait Reloader: Send + Sync {
    fn reload(&self, path: &Path);
}
