use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod utils;

use commands::CommandAdapter;
use utils::{CommandExecutor, Outcome, Params, GVM_ROOT_ENV};

/// Run gvm (Go Version Manager) idempotently and report the result as JSON
#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Arguments file written by the automation engine (JSON or key=value).
    /// When given, the parameter flags are ignored.
    args_file: Option<PathBuf>,

    #[command(flatten)]
    params: Params,
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gvm_module=warn"));

    // stdout carries the JSON result, so logs go to stderr
    match std::env::var("GVM_MODULE_LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(cli: Cli) -> Outcome {
    let params = match cli.args_file {
        Some(path) => match Params::from_args_file(&path) {
            Ok(params) => params,
            Err(e) => return Outcome::from(e),
        },
        None => cli.params,
    };
    debug!(params = ?params, "loaded parameters");

    CommandAdapter::new(CommandExecutor::new())
        .with_env_root(std::env::var(GVM_ROOT_ENV).ok())
        .execute(&params)
}

/// Parse flags; bad values become a failed outcome so the caller still gets JSON.
fn parse_cli() -> std::result::Result<Cli, Outcome> {
    Cli::try_parse().map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => Outcome::failed(e.to_string().trim()),
    })
}

fn main() -> Result<ExitCode> {
    let dotenv = dotenvy::dotenv();
    init_logging();

    // A missing .env is fine; GVM_ROOT may come from the real environment.
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, "failed to load .env file"),
    }

    let outcome = match parse_cli() {
        Ok(cli) => run(cli),
        Err(outcome) => outcome,
    };
    println!("{}", outcome.to_json()?);

    Ok(if outcome.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
