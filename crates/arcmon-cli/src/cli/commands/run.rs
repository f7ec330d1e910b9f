//! `arcmon run` – poll until a termination signal, then persist state.

use anyhow::{Context, Result};
use arcmon_core::config::MonitorConfig;
use arcmon_core::http::HttpClient;
use arcmon_core::notify::WebhookNotifier;
use arcmon_core::poller::Poller;
use arcmon_core::remote::RemoteChecker;
use arcmon_core::state::StateStore;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

use crate::cli::shutdown;

pub async fn run_monitor(cfg: &MonitorConfig, webhook_url: String) -> Result<()> {
    run_monitor_until(cfg, webhook_url, shutdown::wait_for_signal()).await
}

/// Poll until `shutdown` resolves, then save the final record. An error from
/// `shutdown` itself is returned without saving.
pub async fn run_monitor_until<F>(
    cfg: &MonitorConfig,
    webhook_url: String,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let store = StateStore::new(cfg.state_path()?);
    let record = store.load().context("load state")?;
    if record.is_empty() {
        tracing::info!(path = %store.path().display(), "no saved version, first check sets the baseline");
    } else {
        tracing::info!(checksum = %record.checksum, "loaded saved version");
    }

    let http = HttpClient::new(cfg.connect_timeout(), cfg.request_timeout());
    let abort = http.abort_handle();
    let poller = Poller::new(
        Arc::new(RemoteChecker::from_config(cfg, http.clone())),
        Arc::new(WebhookNotifier::from_config(cfg, http, webhook_url)),
        cfg.poll_interval(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_handle = tokio::spawn(async move { poller.run(record, shutdown_rx).await });

    shutdown.await?;
    tracing::info!("shutdown requested");
    // Unblock any in-flight request so the loop can stop promptly.
    abort.store(true, Ordering::Relaxed);
    let _ = shutdown_tx.send(true);

    let record = poll_handle.await.context("poll task join")?;
    store
        .save(&record)
        .with_context(|| format!("save state to {}", store.path().display()))?;
    tracing::info!(checksum = %record.checksum, "state saved, exiting");
    Ok(())
}
