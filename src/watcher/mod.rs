//! File watching for a `pen` session.
//!
//! ```text
//! notify::RecommendedWatcher (recursive on the watched root)
//!     |  mpsc
//!     v
//! SessionWatcher -- Debouncer (per path) --> FilePipeline::spawn
//! ```

mod debouncer;
mod error;
mod session;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use session::SessionWatcher;
