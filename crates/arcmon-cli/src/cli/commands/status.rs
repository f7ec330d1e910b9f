//! `arcmon status` – show the saved state.

use anyhow::{Context, Result};
use arcmon_core::config::MonitorConfig;
use arcmon_core::remote::format_http_date;
use arcmon_core::state::StateStore;

pub fn run_status(cfg: &MonitorConfig) -> Result<()> {
    let store = StateStore::new(cfg.state_path()?);
    let record = store.load().context("load state")?;

    println!("state file:    {}", store.path().display());
    println!("watching:      {}", cfg.artifact_url);
    if record.is_empty() {
        println!("checksum:      (none recorded yet)");
        return Ok(());
    }
    println!("checksum:      {}", record.checksum);
    match record.last_modified {
        Some(ts) => println!("last-modified: {}", format_http_date(&ts)),
        None => println!("last-modified: (unknown)"),
    }
    Ok(())
}
