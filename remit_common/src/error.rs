//! Error types shared by every crate of the workspace.
//!
//! The `QuoteError` enum carries the comparison outcome taxonomy (validation,
//! missing providers, transport failure, cancellation) together with the
//! ambient failures of I/O, JSON handling, configuration and lock poisoning,
//! so crates can propagate a single error type through [`Result`].
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the client library and the CLI.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Amount or country failed validation. Raised before any network I/O.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The endpoint answered successfully but returned zero quotes.
    #[error("No exchange rate providers available")]
    NoProvidersAvailable,

    /// Network, timeout or HTTP error after the single retry was used up.
    #[error("API Error: {0}")]
    RequestFailed(String),

    /// A newer request superseded this one. Never shown to the end user.
    #[error("Request cancelled")]
    Cancelled,

    /// I/O error originating from the standard library (stdin, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Invalid client configuration (base URL, timeouts).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

/// `Result` whose error defaults to [`QuoteError`].
pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

impl QuoteError {
    /// Whether the error should be surfaced to the person using the UI.
    ///
    /// Cancellation only happens when a newer request takes over, so it is
    /// swallowed.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, QuoteError::Cancelled)
    }
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}

impl From<url::ParseError> for QuoteError {
    fn from(err: url::ParseError) -> Self {
        QuoteError::Config(err.to_string())
    }
}
