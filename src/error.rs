//! Unified error type.

use std::fmt;
use std::time::Duration;

/// The error type returned by sccgate's fallible operations.
///
/// Upstream failures never show up here: the proxy handler logs them and
/// answers the caller anyway. This type surfaces what reaches the process
/// boundary: bad configuration, socket and client setup, and a shutdown
/// that overran its deadline.
#[derive(Debug)]
pub enum Error {
    /// Rejected before any socket is opened, e.g. an empty bind address.
    Config(String),
    Io(std::io::Error),
    /// The outbound HTTP client could not be built.
    Client(reqwest::Error),
    /// Connections were still open when the shutdown deadline passed.
    ShutdownTimeout(Duration),
    /// The background accept task panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Client(e) => write!(f, "client: {e}"),
            Self::ShutdownTimeout(d) => write!(f, "shutdown did not finish within {d:?}"),
            Self::Join(e) => write!(f, "server task: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Client(e) => Some(e),
            Self::Join(e) => Some(e),
            Self::Config(_) | Self::ShutdownTimeout(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Client(e)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Join(e)
    }
}
