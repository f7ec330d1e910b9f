//! Webhook message body (Discord-compatible embed).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbedConfig;
use crate::remote::{format_http_date, RemoteCheckResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Always `null`; everything is carried by the embed.
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// "10 minutes", "1 hour", "45 seconds". Picks the largest unit that divides evenly.
pub fn humanize_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    let (n, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Build the "artifact updated" message for a changed remote version.
pub fn update_payload(
    embed: &EmbedConfig,
    download_url: &str,
    interval: Duration,
    update: &RemoteCheckResult,
) -> WebhookPayload {
    WebhookPayload {
        content: None,
        embeds: vec![Embed {
            title: embed.title.clone(),
            color: embed.color,
            fields: vec![
                EmbedField::new("CheckSum", update.checksum.clone(), false),
                EmbedField::new(
                    "Timestamp Version",
                    format_http_date(&update.last_modified),
                    true,
                ),
                EmbedField::new("Direct Download Link", download_url, true),
            ],
            footer: EmbedFooter {
                text: format!(
                    "{} | checks every {}",
                    embed.footer,
                    humanize_interval(interval)
                ),
            },
        }],
    }
}
