//! CLI-specific error types and mappings.
//!
//! Maps wiring failures and request failures to exit codes and
//! user-facing messages.

use lvhttp_client::ClientError;
use lvhttp_core::{ErrorKey, RequestError, SettingsError};
use lvhttp_launch::LaunchError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Launch machinery failed (main thread, runtime).
    #[error("Launch error: {0}")]
    Launch(String),

    /// The request failed. The registered handler has already reported it.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The request was interrupted before a result was delivered.
    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Interrupted (128 + SIGINT)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Launch(_) => 71,   // EX_OSERR
            Self::Request(err) => request_exit_code(err),
            Self::Interrupted => 130,
        }
    }

    /// Whether a registered error handler already printed this failure.
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

const fn request_exit_code(err: &RequestError) -> u8 {
    match err.key() {
        Some(ErrorKey::Timeout | ErrorKey::Connect | ErrorKey::UnknownHost) => 69, // EX_UNAVAILABLE
        Some(ErrorKey::Http) => 76,                                                 // EX_PROTOCOL
        Some(ErrorKey::Decode | ErrorKey::Code) => 65,                              // EX_DATAERR
        Some(ErrorKey::Io) => 74,                                                   // EX_IOERR
        Some(ErrorKey::CatchAll) | None => match err {
            RequestError::Cancelled => 130,
            _ => 1,
        },
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<LaunchError> for CliError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::Settings(settings_err) => settings_err.into(),
            other => Self::Launch(other.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvhttp_core::CodeError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Launch("x".into()).exit_code(), 71);
        assert_eq!(CliError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_request_exit_codes_follow_error_key() {
        let code = |err: RequestError| CliError::from(err).exit_code();
        assert_eq!(code(RequestError::timeout("t")), 69);
        assert_eq!(code(RequestError::connect("c")), 69);
        assert_eq!(code(RequestError::unknown_host("h")), 69);
        assert_eq!(code(RequestError::http(404, "/x")), 76);
        assert_eq!(code(RequestError::decode("d")), 65);
        assert_eq!(code(CodeError::new(500, "boom").into()), 65);
        assert_eq!(code(RequestError::io("NotFound", "gone")), 74);
        assert_eq!(code(RequestError::Cancelled), 130);
        assert_eq!(code(RequestError::other("misc")), 1);
    }

    #[test]
    fn test_settings_errors_are_config_errors() {
        let err = CliError::from(LaunchError::Settings(SettingsError::EmptyCodeErrorMessage));
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 78);

        let err = CliError::from(LaunchError::MainContextGone);
        assert!(matches!(err, CliError::Launch(_)));
    }

    #[test]
    fn test_request_errors_are_reported_by_handlers() {
        assert!(CliError::from(RequestError::timeout("t")).is_reported());
        assert!(!CliError::Interrupted.is_reported());
        assert_eq!(
            CliError::from(RequestError::http(502, "http://x/y")).to_string(),
            "HTTP 502: http://x/y"
        );
    }
}
