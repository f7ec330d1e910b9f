use arcmon_core::logging;
use clap::Parser;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; fall back to stderr so the CLI never crashes on it.
    if cli.log_to_stderr() {
        logging::init_logging_stderr();
    } else if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = cli.run().await {
        tracing::error!("{:#}", err);
        eprintln!("arcmon error: {:#}", err);
        std::process::exit(1);
    }
}
