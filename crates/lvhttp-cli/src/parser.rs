//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Environment variable for the base URL.
pub const BASE_URL_ENV: &str = "LVHTTP_BASE_URL";

/// Environment variable for the bearer token.
pub const TOKEN_ENV: &str = "LVHTTP_TOKEN";

/// Command-line interface for issuing requests through the launch layer.
///
/// Global options apply to every subcommand and can also come from the
/// environment (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "lvhttp")]
#[command(about = "Issue HTTP requests with envelope verification and keyed error handling")]
#[command(version)]
pub struct Cli {
    /// Base URL relative request paths are resolved against
    #[arg(long = "base-url", env = BASE_URL_ENV, global = true)]
    pub base_url: Option<String>,

    /// Envelope code that counts as success [default: $LVHTTP_EXPECTED_CODE, else 200]
    #[arg(long = "expected-code", global = true, allow_hyphen_values = true)]
    pub expected_code: Option<i32>,

    /// Bearer token sent with every request
    #[arg(long = "token", env = TOKEN_ENV, global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", global = true)]
    pub timeout_secs: Option<u64>,

    /// Ignore HTTP(S)_PROXY from the environment
    #[arg(long = "no-proxy", global = true)]
    pub no_proxy: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
