use thiserror::Error;

use crate::lifecycle::{Phase, WorkerState};

/// A rejected network fetch. The platform only tells us that it failed, not
/// why, so this carries whatever message it gave.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network fetch of {url} failed: {message}")]
pub struct NetworkError {
    pub url: String,
    pub message: String,
}

impl NetworkError {
    pub fn new<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid cache name {name:?}: {reason}")]
    InvalidCacheName { name: String, reason: String },
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
    #[error("Failed to resolve {path:?} against {scope}: {reason}")]
    Resolve {
        scope: String,
        path: String,
        reason: String,
    },
    #[error("Failed to open cache {name}: {message}")]
    Open { name: String, message: String },
    #[error("Failed to list caches: {message}")]
    Keys { message: String },
    #[error("Failed to delete cache {name}: {message}")]
    Delete { name: String, message: String },
    #[error("Cache lookup for {url} failed: {message}")]
    Lookup { url: String, message: String },
    #[error("Failed to populate cache {name}: {message}")]
    Populate { name: String, message: String },
    #[error("{url} returned status {status}")]
    BadStatus { url: String, status: u16 },
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("{url} is unavailable: not cached and the network fetch failed")]
    Unavailable { url: String },
    #[error("Shell document {url} is missing from cache {name}")]
    ShellMissing { name: String, url: String },
    #[error("Cannot {phase} a worker that is {state}")]
    InvalidTransition { state: WorkerState, phase: Phase },
    #[error("Host error: {0}")]
    Host(String),
}
