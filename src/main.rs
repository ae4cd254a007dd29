use std::process::ExitCode;

use openai_probe::ConnectivityChecker;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut checker = ConnectivityChecker::new();
    if checker.run_from_env().await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
