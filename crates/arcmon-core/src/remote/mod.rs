//! Remote checker: current checksum and `Last-Modified` of the monitored artifact.
//!
//! Two sequential requests per check: GET the checksum resource, then HEAD the
//! artifact itself.

mod parse;

use chrono::{DateTime, Utc};

use crate::config::MonitorConfig;
use crate::http::{HttpClient, HttpError, HttpResponse};

pub use parse::{format_http_date, parse_checksum, parse_last_modified};

/// What the remote currently advertises. Produced fresh on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCheckResult {
    pub checksum: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("bad response from {url}: HTTP {status} ({body})")]
    Status {
        url: String,
        status: u32,
        body: String,
    },
    #[error("malformed checksum response: {body:?}")]
    MalformedChecksum { body: String },
    #[error("{url} sent no Last-Modified header")]
    MissingLastModified { url: String },
    #[error("unable to parse Last-Modified {value:?}")]
    InvalidLastModified {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Source of the remote version, one blocking call per check.
pub trait VersionSource: Send + Sync {
    fn fetch(&self) -> Result<RemoteCheckResult, CheckError>;
}

/// `VersionSource` backed by the checksum GET and artifact HEAD.
#[derive(Debug, Clone)]
pub struct RemoteChecker {
    http: HttpClient,
    checksum_url: String,
    artifact_url: String,
}

impl RemoteChecker {
    pub fn new(http: HttpClient, checksum_url: impl Into<String>, artifact_url: impl Into<String>) -> Self {
        Self {
            http,
            checksum_url: checksum_url.into(),
            artifact_url: artifact_url.into(),
        }
    }

    pub fn from_config(cfg: &MonitorConfig, http: HttpClient) -> Self {
        Self::new(http, cfg.checksum_url.clone(), cfg.artifact_url.clone())
    }

    /// GET the checksum resource and return its first token.
    pub fn fetch_checksum(&self) -> Result<String, CheckError> {
        let resp = self.http.get(&self.checksum_url)?;
        ensure_success(&self.checksum_url, &resp)?;
        parse_checksum(&String::from_utf8_lossy(&resp.body))
    }

    /// HEAD the artifact and parse its `Last-Modified` header.
    pub fn fetch_last_modified(&self) -> Result<DateTime<Utc>, CheckError> {
        let resp = self.http.head(&self.artifact_url)?;
        ensure_success(&self.artifact_url, &resp)?;
        let value = resp
            .header("last-modified")
            .ok_or_else(|| CheckError::MissingLastModified {
                url: self.artifact_url.clone(),
            })?;
        parse_last_modified(value)
    }
}

impl VersionSource for RemoteChecker {
    fn fetch(&self) -> Result<RemoteCheckResult, CheckError> {
        let checksum = self.fetch_checksum()?;
        let last_modified = self.fetch_last_modified()?;
        tracing::debug!(checksum = %checksum, last_modified = %last_modified, "remote version fetched");
        Ok(RemoteCheckResult {
            checksum,
            last_modified,
        })
    }
}

fn ensure_success(url: &str, resp: &HttpResponse) -> Result<(), CheckError> {
    if resp.is_success() {
        return Ok(());
    }
    Err(CheckError::Status {
        url: url.to_string(),
        status: resp.status,
        body: resp.body_text(),
    })
}
