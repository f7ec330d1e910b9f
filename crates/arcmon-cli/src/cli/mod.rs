//! CLI for the arcmon update monitor.

mod commands;
mod shutdown;

use anyhow::Result;
use arcmon_core::config::{self, MonitorConfig};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_check, run_completions, run_monitor, run_notify_test, run_status};

/// Top-level CLI for arcmon.
#[derive(Debug, Parser)]
#[command(name = "arcmon")]
#[command(about = "arcmon: watch a remote file's checksum and announce updates to a webhook", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/arcmon/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll until interrupted, announcing checksum changes to $DISCORD_WEBHOOK.
    Run {
        /// Log to stderr instead of the state-dir log file (for service managers).
        #[arg(long)]
        stderr: bool,
    },

    /// Fetch the remote version once and compare it with the saved state.
    Check,

    /// Show the saved state.
    Status,

    /// Send one notification for the saved version to $DISCORD_WEBHOOK (no remote check).
    NotifyTest,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn log_to_stderr(&self) -> bool {
        matches!(self.command, CliCommand::Run { stderr: true })
    }

    fn load_config(&self) -> Result<MonitorConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    pub async fn run(self) -> Result<()> {
        self.run_with_webhook(std::env::var(config::WEBHOOK_ENV).ok())
            .await
    }

    /// Dispatch with the raw `DISCORD_WEBHOOK` value. Commands that post to the
    /// webhook reject a missing or invalid URL before the config file is read
    /// or created.
    async fn run_with_webhook(self, webhook: Option<String>) -> Result<()> {
        match &self.command {
            CliCommand::Run { .. } => {
                let webhook_url = config::webhook_url_from(webhook)?;
                run_monitor(&self.load_config()?, webhook_url).await?;
            }
            CliCommand::Check => run_check(&self.load_config()?).await?,
            CliCommand::Status => run_status(&self.load_config()?)?,
            CliCommand::NotifyTest => {
                let webhook_url = config::webhook_url_from(webhook)?;
                run_notify_test(&self.load_config()?, webhook_url).await?;
            }
            CliCommand::Completions { shell } => run_completions(*shell),
        }

        Ok(())
    }
}
