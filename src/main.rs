//! Admission thresholds — binary entrypoint.
//! Fetches every configured source and prints one report per source to stdout.

use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use admission_thresholds::report::{exit_failed, render_all};

/// Logs go to stderr so stdout carries only the reports.
/// `LOG_FORMAT=json` switches to structured output; `RUST_LOG` overrides the filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("admission_thresholds=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let reports = match admission_thresholds::run_from_env().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = ?e, "cannot start");
            return ExitCode::FAILURE;
        }
    };

    print!("{}", render_all(&reports));

    if exit_failed(&reports) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
