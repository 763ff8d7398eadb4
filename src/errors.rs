//! Error taxonomy shared across the pipeline.
//!
//! Adapter-level failures for a single (champion, position) unit never reach
//! these types — they are swallowed into [`crate::models::FailureEntry`]
//! records. Everything here is either fatal to the run (metadata resolution,
//! file writes) or a collaborator-boundary failure.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP failure after retry exhaustion. `code` carries the
    /// HTTP status when one was received, otherwise the transport error kind.
    #[error("request to {url} failed ({code})")]
    Request {
        code: String,
        url: String,
        body: String,
    },

    /// The upstream responded but the expected data shape was absent.
    #[error("missing data: {0}")]
    MissingData(String),

    /// A local filesystem write failed.
    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scraped content could not be interpreted.
    #[error("could not parse {0}")]
    Parsing(String),

    /// Privilege elevation was declined or unavailable.
    #[error("elevation failed: {0}")]
    Elevate(String),

    /// A pipeline-internal invariant was violated.
    #[error("{0}")]
    Operational(String),

    /// A localization lookup failed in a way that cannot be papered over.
    #[error("translation failure: {0}")]
    Translation(String),

    /// Settings could not be persisted.
    #[error("settings update failed: {0}")]
    Update(String),

    /// Catch-all for defects surfacing at the top level.
    #[error("unexpected failure: {0}")]
    Uncaught(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::Request`] from a transport-level failure.
    pub fn request_transport(url: &str, err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout".to_string()
        } else if err.is_connect() {
            "connect".to_string()
        } else {
            "transport".to_string()
        };
        Error::Request {
            code,
            url: url.to_string(),
            body: err.to_string(),
        }
    }
}
