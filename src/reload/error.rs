use thiserror::Error;

/// Reload server startup failures. All of them abort the session.
#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read address of {addr}: {source}")]
    LocalAddr {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
