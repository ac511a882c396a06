use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use nearby::cli::Cli;

/// Environment variable holding the log filter (e.g. `NEARBY_LOG=nearby=debug`)
const LOG_ENV: &str = "NEARBY_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
