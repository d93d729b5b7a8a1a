//! Request error taxonomy.
//!
//! Producers report failures as a [`RequestError`]. Each variant maps to at
//! most one [`ErrorKey`], which is the key handlers are registered under.
//! Classification is a plain tag comparison, so renaming a variant is a
//! compile error rather than a silent dispatch miss.
//!
//! Errors are `Clone` and serializable: the same value is stored in the
//! returned `ResultState` and handed to the registered handler on the main
//! context. For I/O errors we capture the kind and message as strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for producers and client operations.
pub type RequestResult<T> = Result<T, RequestError>;

/// Category key a handler can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKey {
    /// The request timed out.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// The host name could not be resolved.
    UnknownHost,
    /// The server answered with a non-success HTTP status.
    Http,
    /// The response body could not be decoded.
    Decode,
    /// Local I/O failed (writing a download, reading an upload).
    Io,
    /// Transport succeeded but the envelope carried an unexpected code.
    Code,
    /// Fallback for any failure without a more specific handler.
    CatchAll,
}

impl ErrorKey {
    /// All keys, in classification order.
    pub const ALL: [Self; 8] = [
        Self::Timeout,
        Self::Connect,
        Self::UnknownHost,
        Self::Http,
        Self::Decode,
        Self::Io,
        Self::Code,
        Self::CatchAll,
    ];

    /// Stable lowercase name, used in logs and CLI output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::UnknownHost => "unknown_host",
            Self::Http => "http",
            Self::Decode => "decode",
            Self::Io => "io",
            Self::Code => "code",
            Self::CatchAll => "catch_all",
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The envelope's status code did not match the configured expected code.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("unexpected response code {code}: {message}")]
pub struct CodeError {
    /// Code carried by the envelope.
    pub code: i32,
    /// Message carried by the envelope (or a configured fallback).
    pub message: String,
}

impl CodeError {
    /// Create a code error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error type for request producers.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestError {
    /// The request timed out.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Detailed error message.
        message: String,
    },

    /// Could not connect to the server.
    #[error("Connection failed: {message}")]
    Connect {
        /// Detailed error message.
        message: String,
    },

    /// DNS resolution failed.
    #[error("Unknown host: {host}")]
    UnknownHost {
        /// The host that could not be resolved.
        host: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// The body could not be decoded into the expected type.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Detailed error message.
        message: String,
    },

    /// Local I/O error.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "not found", "permission denied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Application-level code mismatch.
    #[error(transparent)]
    Code(#[from] CodeError),

    /// The task was cancelled before producing a result.
    #[error("Request cancelled")]
    Cancelled,

    /// The producer panicked.
    #[error("Request panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl RequestError {
    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create an unknown-host error.
    pub fn unknown_host(host: impl Into<String>) -> Self {
        Self::UnknownHost { host: host.into() }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a panic error.
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }

    /// Create a general error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The handler category for this error.
    ///
    /// `None` means only the catch-all handler can receive it.
    pub const fn key(&self) -> Option<ErrorKey> {
        match self {
            Self::Timeout { .. } => Some(ErrorKey::Timeout),
            Self::Connect { .. } => Some(ErrorKey::Connect),
            Self::UnknownHost { .. } => Some(ErrorKey::UnknownHost),
            Self::Http { .. } => Some(ErrorKey::Http),
            Self::Decode { .. } => Some(ErrorKey::Decode),
            Self::Io { .. } => Some(ErrorKey::Io),
            Self::Code(_) => Some(ErrorKey::Code),
            Self::Cancelled | Self::Panicked { .. } | Self::Other { .. } => None,
        }
    }

    /// Returns the code error if this is a code mismatch.
    pub const fn as_code(&self) -> Option<&CodeError> {
        match self {
            Self::Code(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RequestError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io_error(&err)
    }
}
