//! `arcmon notify-test` – send one notification for the saved version.

use anyhow::{bail, Context, Result};
use arcmon_core::config::MonitorConfig;
use arcmon_core::http::HttpClient;
use arcmon_core::notify::{Notifier, WebhookNotifier};
use arcmon_core::state::StateStore;
use std::sync::Arc;

pub async fn run_notify_test(cfg: &MonitorConfig, webhook_url: String) -> Result<()> {
    let store = StateStore::new(cfg.state_path()?);
    let http = HttpClient::new(cfg.connect_timeout(), cfg.request_timeout());
    let notifier = Arc::new(WebhookNotifier::from_config(cfg, http, webhook_url));

    let checksum = send_saved(&store, notifier).await?;
    println!("sent notification for checksum {}", checksum);
    Ok(())
}

/// Announce the record in `store`; no remote check is made.
async fn send_saved(store: &StateStore, notifier: Arc<dyn Notifier>) -> Result<String> {
    let record = store.load().context("load state")?;
    let Some(update) = record.as_update() else {
        bail!(
            "no saved version in {}; run `arcmon check` or `arcmon run` first",
            store.path().display()
        );
    };

    tokio::task::spawn_blocking(move || -> Result<String> {
        notifier.notify(&update).context("send notification")?;
        Ok(update.checksum)
    })
    .await
    .context("notify task join")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcmon_core::notify::NotifyError;
    use arcmon_core::remote::RemoteCheckResult;
    use arcmon_core::state::VersionRecord;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<RemoteCheckResult>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, update: &RemoteCheckResult) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(update.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn sends_saved_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let saved = VersionRecord {
            checksum: "abc123".to_string(),
            last_modified: Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()),
        };
        store.save(&saved).unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let checksum = send_saved(&store, notifier.clone()).await.unwrap();

        assert_eq!(checksum, "abc123");
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![saved.as_update().unwrap()]);
    }

    #[tokio::test]
    async fn empty_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let notifier = Arc::new(RecordingNotifier::default());

        let err = send_saved(&store, notifier.clone()).await.unwrap_err();
        assert!(err.to_string().contains("no saved version"));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
