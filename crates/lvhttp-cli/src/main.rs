//! CLI entry point.
//!
//! Loads `.env`, parses arguments, bootstraps the context and dispatches
//! to a handler. Failures become process exit codes.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lvhttp_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "lvhttp_cli=debug,lvhttp_launch=debug,lvhttp_client=debug,lvhttp_core=debug";

fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(&cli);
    let ctx = bootstrap(&config)?;

    let outcome = match cli.command {
        Commands::Get { path } => handlers::get::execute(&ctx, &path).await,
        Commands::Post { path, fields } => handlers::post::execute(&ctx, &path, fields).await,
        Commands::FetchAll { paths } => handlers::fetch_all::execute(&ctx, &paths).await,
        Commands::Upload {
            path,
            files,
            field,
            text,
        } => handlers::upload::execute(&ctx, &path, files, field, text).await,
        Commands::Download { url, dir, name } => handlers::download::execute(&ctx, &url, &dir, name)
            .await
            .map(|_| ()),
    };

    ctx.shutdown();
    outcome.map_err(Into::into)
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CliError>() {
        Some(cli_err) => {
            if !cli_err.is_reported() {
                eprintln!("Error: {cli_err}");
            }
            ExitCode::from(cli_err.exit_code())
        }
        None => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code(&err),
    }
}
