//! Termination signals: Ctrl-C everywhere, plus SIGTERM on Unix.

use anyhow::{Context, Result};

#[cfg(unix)]
pub async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("wait for Ctrl-C")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")
}
