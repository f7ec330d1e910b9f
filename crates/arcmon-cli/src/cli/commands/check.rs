//! `arcmon check` – fetch the remote version once and compare it with saved state.
//! Read-only: neither notifies nor writes the state file.

use anyhow::{Context, Result};
use arcmon_core::config::MonitorConfig;
use arcmon_core::http::HttpClient;
use arcmon_core::poller::{compare, Change};
use arcmon_core::remote::{format_http_date, RemoteChecker, VersionSource};
use arcmon_core::state::StateStore;

pub async fn run_check(cfg: &MonitorConfig) -> Result<()> {
    let record = StateStore::new(cfg.state_path()?)
        .load()
        .context("load state")?;

    let checker = RemoteChecker::from_config(
        cfg,
        HttpClient::new(cfg.connect_timeout(), cfg.request_timeout()),
    );
    let remote = tokio::task::spawn_blocking(move || checker.fetch())
        .await
        .context("check task join")?
        .context("version check failed")?;

    println!("checksum:      {}", remote.checksum);
    println!("last-modified: {}", format_http_date(&remote.last_modified));
    match compare(&record, &remote) {
        Change::Baseline => println!("state:         no saved version yet"),
        Change::Unchanged => println!("state:         unchanged"),
        Change::Changed => println!("state:         changed (saved {})", record.checksum),
    }
    Ok(())
}
