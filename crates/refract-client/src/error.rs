//! Error types for the refract client.
//!
//! Every failure that corresponds to a failed command carries the
//! originating RPC method name, so a caller can correlate a failed
//! keypress with a failed refactoring instead of seeing a bare
//! generic error.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A command was dispatched with no session in `Running` state.
    ///
    /// Not recoverable locally: the protocol never auto-starts a
    /// session on demand.
    #[error("cannot dispatch {method}: no engine session is running")]
    NotRunning { method: String },

    /// Connection refused/reset or any other transport-level failure.
    ///
    /// Never retried automatically: a mutating command may already
    /// have been applied on the engine side.
    #[error("transport failure during {method}: {message}")]
    Transport {
        method: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The transport-level deadline elapsed before the engine
    /// answered.
    #[error("{method} timed out after {after:?}")]
    Timeout { method: String, after: Duration },

    /// The engine responded with a structured fault (invalid offset,
    /// ambiguous rename target, ...). Surfaced verbatim.
    #[error("engine fault during {method}: {message} (code {code})")]
    RemoteFault {
        method: String,
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The engine process could not be started. Fatal to the open
    /// attempt; the session remains `Closed`.
    #[error("failed to spawn engine process '{program}': {message}")]
    Spawn {
        program: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The engine answered successfully but the result did not decode
    /// into the shape the catalog promises for this method.
    #[error("could not decode {method} result: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl EngineError {
    /// Map a reqwest error into `Timeout` or `Transport`, attaching
    /// the method name.
    pub fn transport(method: &str, after: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EngineError::Timeout {
                method: method.to_string(),
                after,
            }
        } else {
            EngineError::Transport {
                method: method.to_string(),
                message: err.to_string(),
                source: Some(err),
            }
        }
    }

    /// The RPC method this error originated from, when it has one.
    pub fn method(&self) -> Option<&str> {
        match self {
            EngineError::NotRunning { method }
            | EngineError::Transport { method, .. }
            | EngineError::Timeout { method, .. }
            | EngineError::RemoteFault { method, .. }
            | EngineError::Decode { method, .. } => Some(method),
            _ => None,
        }
    }
}
