//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - the dedicated main thread results and handlers are delivered on
//! - the error registry, with handlers that print user-facing messages
//! - the launch context
//! - the reqwest-backed HTTP client
//!
//! Command handlers receive the fully-composed [`CliContext`].

use std::sync::Arc;
use std::time::Duration;

use lvhttp_client::{ClientConfig, DEFAULT_BASE_URL, DefaultHttpClient};
use lvhttp_core::{ErrorKey, ErrorRegistry, LaunchSettings, MainDispatcher, RequestError};
use lvhttp_launch::{LaunchContext, MainThread};

use crate::error::CliError;
use crate::parser::Cli;

/// Sink for user-facing failure messages.
pub type Notify = Arc<dyn Fn(&str) + Send + Sync>;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Base URL relative paths resolve against.
    pub base_url: String,
    /// Envelope code that counts as success. `None` defers to
    /// [`LaunchSettings::from_env`].
    pub expected_code: Option<i32>,
    /// Optional bearer token.
    pub token: Option<String>,
    /// Request timeout override.
    pub timeout: Option<Duration>,
    /// Honor proxies configured in the environment.
    pub system_proxy: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            expected_code: None,
            token: None,
            timeout: None,
            system_proxy: true,
        }
    }
}

impl CliConfig {
    /// Resolve the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let defaults = Self::default();
        Self {
            base_url: cli.base_url.clone().unwrap_or(defaults.base_url),
            expected_code: cli.expected_code,
            token: cli.token.clone(),
            timeout: cli.timeout_secs.map(Duration::from_secs),
            system_proxy: !cli.no_proxy,
        }
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_base_url(self.base_url.clone())
            .with_system_proxy(self.system_proxy);
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Thread results and error handlers are delivered on.
    pub main: Arc<MainThread>,
    /// Launch context shared by every command.
    pub launch: LaunchContext,
    /// HTTP client producers borrow.
    pub client: Arc<DefaultHttpClient>,
}

impl CliContext {
    /// Access the launch context.
    pub const fn launch(&self) -> &LaunchContext {
        &self.launch
    }

    /// A clone of the shared client, for moving into producers.
    pub fn client(&self) -> Arc<DefaultHttpClient> {
        Arc::clone(&self.client)
    }

    /// Let queued main-thread jobs finish, then stop the thread.
    pub fn shutdown(&self) {
        self.main.shutdown();
    }
}

/// Bootstrap the CLI application, printing failures to stderr.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    bootstrap_with(config, Arc::new(|message: &str| eprintln!("{message}")))
}

/// Bootstrap with a custom failure sink (for testing).
pub fn bootstrap_with(config: &CliConfig, notify: Notify) -> Result<CliContext, CliError> {
    let main = Arc::new(MainThread::spawn()?);

    let registry = Arc::new(ErrorRegistry::new());
    register_error_handlers(&registry, &notify);

    let mut settings = LaunchSettings::from_env()?;
    if let Some(code) = config.expected_code {
        settings = settings.with_expected_code(code);
    }
    let expected_code = settings.expected_code;
    let launch = LaunchContext::builder()
        .registry(registry)
        .settings(settings)
        .main(Arc::clone(&main) as Arc<dyn MainDispatcher>)
        .build()?;

    let client = Arc::new(DefaultHttpClient::new(&config.client_config())?);
    tracing::debug!(base_url = %client.base_url(), expected_code, "CLI bootstrapped");

    Ok(CliContext {
        main,
        launch,
        client,
    })
}

/// Keys the CLI registers a handler for.
pub const HANDLED_KEYS: [ErrorKey; 5] = [
    ErrorKey::Timeout,
    ErrorKey::Connect,
    ErrorKey::UnknownHost,
    ErrorKey::Code,
    ErrorKey::CatchAll,
];

/// Register a message-printing handler for each of [`HANDLED_KEYS`].
pub fn register_error_handlers(registry: &ErrorRegistry, notify: &Notify) {
    for key in HANDLED_KEYS {
        let notify = Arc::clone(notify);
        registry.register(key, move |err| notify(&user_message(key, err)));
    }
}

/// The message shown for a failure dispatched under `key`.
pub fn user_message(key: ErrorKey, err: &RequestError) -> String {
    match (key, err) {
        (ErrorKey::Timeout, _) => "Request timed out. Check your connection and try again.".into(),
        (ErrorKey::Connect, _) => "Could not connect to the server. Is it running?".into(),
        (ErrorKey::UnknownHost, RequestError::UnknownHost { host }) => {
            format!("Unknown host '{host}'. Check the address or your network.")
        }
        (ErrorKey::UnknownHost, _) => "Unknown host. Check the address or your network.".into(),
        (ErrorKey::Code, RequestError::Code(code)) => {
            format!("Server rejected the request (code {}): {}", code.code, code.message)
        }
        _ => format!("Request failed: {err}"),
    }
}
