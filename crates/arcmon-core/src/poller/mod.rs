//! Poll loop: check the remote on a fixed interval, notify on change.
//!
//! The loop owns the `VersionRecord` for its whole lifetime and hands it back
//! when shutdown is requested, so no lock is involved. Ticks never overlap:
//! the next wait starts only after the current check (and notification) is done.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::http::HttpError;
use crate::notify::{Notifier, NotifyError};
use crate::remote::{RemoteCheckResult, VersionSource};
use crate::state::VersionRecord;

/// How a fetched version relates to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Nothing stored yet; the fetched version becomes the baseline.
    Baseline,
    Unchanged,
    Changed,
}

/// Compare by checksum only; the timestamp is informational.
pub fn compare(record: &VersionRecord, remote: &RemoteCheckResult) -> Change {
    if record.is_empty() {
        Change::Baseline
    } else if record.checksum == remote.checksum {
        Change::Unchanged
    } else {
        Change::Changed
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Baseline,
    Unchanged,
    /// Record updated; `notified` is false when the webhook call failed.
    Changed { notified: bool },
    /// Change seen but the notification was aborted by shutdown; record
    /// untouched so the next run announces it.
    Interrupted,
    /// Fetch failed; record untouched.
    Failed,
}

enum Delivery {
    Sent,
    Failed,
    Cancelled,
}

pub struct Poller {
    source: Arc<dyn VersionSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        source: Arc<dyn VersionSource>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            notifier,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One check: fetch, compare, notify on change, update `record`.
    pub async fn tick(&self, record: &mut VersionRecord) -> TickOutcome {
        let source = Arc::clone(&self.source);
        let remote = match tokio::task::spawn_blocking(move || source.fetch()).await {
            Ok(Ok(remote)) => remote,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "version check failed, skipping tick");
                return TickOutcome::Failed;
            }
            Err(e) => {
                tracing::error!(error = %e, "version check task failed");
                return TickOutcome::Failed;
            }
        };

        match compare(record, &remote) {
            Change::Baseline => {
                tracing::info!(
                    checksum = %remote.checksum,
                    last_modified = %remote.last_modified,
                    "recorded baseline version"
                );
                record.adopt(&remote);
                TickOutcome::Baseline
            }
            Change::Unchanged => {
                tracing::debug!(checksum = %remote.checksum, "no change");
                TickOutcome::Unchanged
            }
            Change::Changed => {
                tracing::info!(
                    old = %record.checksum,
                    new = %remote.checksum,
                    last_modified = %remote.last_modified,
                    "remote checksum changed"
                );
                let notified = match self.deliver(&remote).await {
                    Delivery::Sent => true,
                    Delivery::Failed => false,
                    Delivery::Cancelled => {
                        tracing::info!(
                            checksum = %remote.checksum,
                            "notification aborted by shutdown, keeping previous version"
                        );
                        return TickOutcome::Interrupted;
                    }
                };
                // Best effort: a failed notification is not retried.
                record.adopt(&remote);
                TickOutcome::Changed { notified }
            }
        }
    }

    async fn deliver(&self, remote: &RemoteCheckResult) -> Delivery {
        let notifier = Arc::clone(&self.notifier);
        let update = remote.clone();
        match tokio::task::spawn_blocking(move || notifier.notify(&update)).await {
            Ok(Ok(())) => Delivery::Sent,
            Ok(Err(NotifyError::Http(HttpError::Cancelled { .. }))) => Delivery::Cancelled,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, checksum = %remote.checksum, "notification failed");
                Delivery::Failed
            }
            Err(e) => {
                tracing::error!(error = %e, "notification task failed");
                Delivery::Failed
            }
        }
    }

    /// Check immediately, then every interval, until `shutdown` turns true
    /// (or its sender is dropped). Returns the final record for persisting.
    pub async fn run(
        &self,
        mut record: VersionRecord,
        mut shutdown: watch::Receiver<bool>,
    ) -> VersionRecord {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval = ?self.interval, "poll loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            self.tick(&mut record).await;
        }

        tracing::info!(checksum = %record.checksum, "poll loop stopped");
        record
    }
}
