//! Persisted last-known version (JSON under the XDG state dir) so a restart
//! does not re-announce an update that was already reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::remote::RemoteCheckResult;

/// Last observed checksum and `Last-Modified` of the monitored artifact.
///
/// An empty checksum means no successful check has happened yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl VersionRecord {
    pub fn is_empty(&self) -> bool {
        self.checksum.is_empty()
    }

    /// Replace both fields with a fetched remote version.
    pub fn adopt(&mut self, remote: &RemoteCheckResult) {
        self.checksum = remote.checksum.clone();
        self.last_modified = Some(remote.last_modified);
    }

    /// The stored version as an update to announce. `None` until a check has
    /// recorded both the checksum and its timestamp.
    pub fn as_update(&self) -> Option<RemoteCheckResult> {
        if self.is_empty() {
            return None;
        }
        self.last_modified.map(|last_modified| RemoteCheckResult {
            checksum: self.checksum.clone(),
            last_modified,
        })
    }
}

impl From<&RemoteCheckResult> for VersionRecord {
    fn from(remote: &RemoteCheckResult) -> Self {
        Self {
            checksum: remote.checksum.clone(),
            last_modified: Some(remote.last_modified),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("read state file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decode state file {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode state")]
    Encode(#[source] serde_json::Error),
    #[error("write state file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed store for a single `VersionRecord`.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing or blank file yields the empty record;
    /// anything that does not decode is an error.
    pub fn load(&self) -> Result<VersionRecord, StateError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(VersionRecord::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(VersionRecord::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| StateError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file with `record`. Writes a temp file in the same
    /// directory and renames it over the target.
    pub fn save(&self, record: &VersionRecord) -> Result<(), StateError> {
        let json = serde_json::to_vec_pretty(record).map_err(StateError::Encode)?;
        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        tracing::debug!(path = %self.path.display(), checksum = %record.checksum, "state saved");
        Ok(())
    }
}
