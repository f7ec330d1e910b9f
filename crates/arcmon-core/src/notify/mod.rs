//! Notifier: posts an "artifact updated" embed to a webhook.
//!
//! One attempt per change; the caller logs failures and moves on.

mod payload;

use std::time::Duration;

use crate::config::{EmbedConfig, MonitorConfig};
use crate::http::{HttpClient, HttpError};
use crate::remote::RemoteCheckResult;

pub use payload::{humanize_interval, update_payload, Embed, EmbedField, EmbedFooter, WebhookPayload};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("bad response from webhook: HTTP {status} ({body})")]
    Status { status: u32, body: String },
    #[error("encode webhook payload")]
    Encode(#[from] serde_json::Error),
}

/// Sink for change notifications, one blocking call per change.
pub trait Notifier: Send + Sync {
    fn notify(&self, update: &RemoteCheckResult) -> Result<(), NotifyError>;
}

/// `Notifier` that POSTs a JSON embed to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: HttpClient,
    webhook_url: String,
    embed: EmbedConfig,
    download_url: String,
    interval: Duration,
}

impl WebhookNotifier {
    pub fn new(
        http: HttpClient,
        webhook_url: impl Into<String>,
        embed: EmbedConfig,
        download_url: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            http,
            webhook_url: webhook_url.into(),
            embed,
            download_url: download_url.into(),
            interval,
        }
    }

    pub fn from_config(cfg: &MonitorConfig, http: HttpClient, webhook_url: impl Into<String>) -> Self {
        Self::new(
            http,
            webhook_url,
            cfg.embed.clone(),
            cfg.artifact_url.clone(),
            cfg.poll_interval(),
        )
    }

    pub fn payload_for(&self, update: &RemoteCheckResult) -> WebhookPayload {
        update_payload(&self.embed, &self.download_url, self.interval, update)
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, update: &RemoteCheckResult) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&self.payload_for(update))?;
        let resp = self.http.post_json(&self.webhook_url, &body)?;
        if !resp.is_success() {
            return Err(NotifyError::Status {
                status: resp.status,
                body: resp.body_text(),
            });
        }
        tracing::info!(checksum = %update.checksum, status = resp.status, "webhook delivered");
        Ok(())
    }
}
