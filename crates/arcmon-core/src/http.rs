//! Blocking HTTP plumbing over libcurl (via the `curl` crate).
//!
//! Every request is bounded by a connect timeout and a total timeout and can
//! be aborted from another thread through a shared flag, which the progress
//! callback checks. Runs in the current thread; call from `spawn_blocking`
//! if used from async code.

use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("arcmon/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("{method} {url} timed out after {timeout:?}")]
    Timeout {
        method: &'static str,
        url: String,
        timeout: Duration,
    },
    #[error("{method} {url} cancelled")]
    Cancelled { method: &'static str, url: String },
    #[error("{method} {url} failed")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: curl::Error,
    },
}

/// Status, header lines and body of a completed request.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u32,
    /// Header lines of the final response (after redirects), status line included.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// True for 1xx/2xx; anything from 300 up is treated as a failure.
    pub fn is_success(&self) -> bool {
        self.status < 300
    }

    /// Body as text for diagnostics; invalid UTF-8 is replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }

    /// First value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            if n.trim().eq_ignore_ascii_case(name) {
                Some(v.trim())
            } else {
                None
            }
        })
    }
}

enum Request<'a> {
    Get,
    Head,
    PostJson(&'a [u8]),
}

impl Request<'_> {
    fn method(&self) -> &'static str {
        match self {
            Request::Get => "GET",
            Request::Head => "HEAD",
            Request::PostJson(_) => "POST",
        }
    }
}

/// Shared client settings. Cheap to clone; clones share the abort flag.
#[derive(Debug, Clone)]
pub struct HttpClient {
    connect_timeout: Duration,
    timeout: Duration,
    abort: Arc<AtomicBool>,
}

impl HttpClient {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Abort token: once set, in-flight and future requests fail with `Cancelled`.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.execute(url, Request::Get)
    }

    pub fn head(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.execute(url, Request::Head)
    }

    pub fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, HttpError> {
        self.execute(url, Request::PostJson(body))
    }

    fn execute(&self, url: &str, request: Request<'_>) -> Result<HttpResponse, HttpError> {
        let method = request.method();
        if self.abort.load(Ordering::Relaxed) {
            return Err(HttpError::Cancelled {
                method,
                url: url.to_string(),
            });
        }
        tracing::debug!(method, url, "http request");
        self.perform(url, request).map_err(|source| {
            if source.is_operation_timedout() {
                HttpError::Timeout {
                    method,
                    url: url.to_string(),
                    timeout: self.timeout,
                }
            } else if source.is_aborted_by_callback() {
                HttpError::Cancelled {
                    method,
                    url: url.to_string(),
                }
            } else {
                HttpError::Transport {
                    method,
                    url: url.to_string(),
                    source,
                }
            }
        })
    }

    fn perform(&self, url: &str, request: Request<'_>) -> Result<HttpResponse, curl::Error> {
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.progress(true)?;

        match request {
            Request::Get => easy.get(true)?,
            Request::Head => easy.nobody(true)?,
            Request::PostJson(payload) => {
                let mut list = curl::easy::List::new();
                list.append("Content-Type: application/json")?;
                list.append("Expect:")?;
                easy.http_headers(list)?;
                easy.post(true)?;
                easy.post_fields_copy(payload)?;
            }
        }

        let abort = Arc::clone(&self.abort);
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the next response of a redirect chain.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    if !line.is_empty() {
                        headers.push(line.to_string());
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(move |_, _, _, _| !abort.load(Ordering::Relaxed))?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
