//! califica - a terminal client for the professor-rating platform.
//!
//! Each command runs like a page of the web client: it has a route, protected
//! pages wait for the stored session to load before deciding access, and a
//! rejected session logs the user out.

mod app;
mod args;
mod commands;
mod render;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use califica_core::api::is_unauthorized;
use califica_core::config::Config;

use app::{App, Redirected};
use args::Cli;

/// Set to `1` to also write logs to a file in the data directory.
const LOG_FILE_ENV: &str = "CALIFICA_LOG_FILE";

const LOG_FILE_NAME: &str = "califica.log";

/// Exit status when a protected page sent the user elsewhere.
const EXIT_REDIRECTED: i32 = 3;

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file log and must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        let code = exit_code(&e);
        // A refused page has already printed where to go.
        if code != EXIT_REDIRECTED {
            if is_unauthorized(&e) {
                eprintln!("Your session has expired.");
            } else {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(code);
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<Redirected>().is_some() {
        EXIT_REDIRECTED
    } else {
        1
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    config.api_url_override = cli.api_url;

    let log_dir = match std::env::var(LOG_FILE_ENV).as_deref() {
        Ok("1") => Some(config.data_dir()?),
        _ => None,
    };
    let _guard = init_tracing(log_dir.as_deref());

    info!(api_url = %config.api_url(), "califica starting");

    let app = App::new(config)?;
    commands::run(&app, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use califica_core::api::ApiError;
    use califica_core::routes::Route;

    #[test]
    fn test_exit_code_for_refused_page() {
        let refused: anyhow::Error = Redirected {
            from: Route::Profile,
            to: Route::Login,
        }
        .into();
        assert_eq!(exit_code(&refused), EXIT_REDIRECTED);

        let expired: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(exit_code(&expired.context("Failed to fetch profile")), 1);
    }
}
