//! Launch settings.
//!
//! Process-wide values the classifier consults on every request. These are
//! plain domain types; loading them from the environment is the only
//! infrastructure concern handled here.

use serde::{Deserialize, Serialize};

/// Default expected envelope code.
pub const DEFAULT_EXPECTED_CODE: i32 = 200;

/// Environment variable overriding the expected code.
pub const EXPECTED_CODE_ENV: &str = "LVHTTP_EXPECTED_CODE";

/// Message used when a failure has no message of its own.
pub const DEFAULT_NETWORK_ERROR_MESSAGE: &str = "network error";

/// Message used when a mismatched envelope has no message.
pub const DEFAULT_CODE_ERROR_MESSAGE: &str = "code error";

/// Settings shared by every launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchSettings {
    /// Envelope code that counts as success.
    pub expected_code: i32,

    /// Fallback message for synthetic failure envelopes.
    pub network_error_message: String,

    /// Fallback message for code errors.
    pub code_error_message: String,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            expected_code: DEFAULT_EXPECTED_CODE,
            network_error_message: DEFAULT_NETWORK_ERROR_MESSAGE.to_string(),
            code_error_message: DEFAULT_CODE_ERROR_MESSAGE.to_string(),
        }
    }
}

impl LaunchSettings {
    /// Create settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the envelope code that counts as success.
    #[must_use]
    pub const fn with_expected_code(mut self, code: i32) -> Self {
        self.expected_code = code;
        self
    }

    #[must_use]
    pub fn with_network_error_message(mut self, message: impl Into<String>) -> Self {
        self.network_error_message = message.into();
        self
    }

    #[must_use]
    pub fn with_code_error_message(mut self, message: impl Into<String>) -> Self {
        self.code_error_message = message.into();
        self
    }

    /// Defaults, with the expected code taken from `LVHTTP_EXPECTED_CODE`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self::default();
        match std::env::var(EXPECTED_CODE_ENV) {
            Ok(raw) => {
                let code = parse_expected_code(&raw)?;
                Ok(settings.with_expected_code(code))
            }
            Err(_) => Ok(settings),
        }
    }
}

fn parse_expected_code(raw: &str) -> Result<i32, SettingsError> {
    raw.trim()
        .parse()
        .map_err(|_| SettingsError::InvalidExpectedCode(raw.to_string()))
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Expected code must be an integer, got '{0}'")]
    InvalidExpectedCode(String),

    #[error("Network error message cannot be empty")]
    EmptyNetworkErrorMessage,

    #[error("Code error message cannot be empty")]
    EmptyCodeErrorMessage,
}

/// Validate settings before they are handed to a launch context.
pub fn validate_settings(settings: &LaunchSettings) -> Result<(), SettingsError> {
    if settings.network_error_message.trim().is_empty() {
        return Err(SettingsError::EmptyNetworkErrorMessage);
    }
    if settings.code_error_message.trim().is_empty() {
        return Err(SettingsError::EmptyCodeErrorMessage);
    }
    Ok(())
}
