//! Metadata discovery for a remote asset without downloading it.
//!
//! Sends a HEAD (following redirects); when that fails, errors, or omits
//! `Content-Length`, falls back to a GET whose body is abandoned as soon as the
//! headers are in. Failures are returned as [`Resolution::Failed`] rather than
//! as errors so callers can keep resolving the rest of a batch.

pub mod digest;

use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::http::{request_header_list, HeaderCollector, Headers};

/// Metadata about a resolved URL.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    /// URL after following all redirects.
    pub final_url: String,
    /// Headers of the final response.
    pub headers: Headers,
    pub status_code: u32,
    pub content_length: Option<u64>,
    /// Server-asserted digest (ETag, `x-goog-hash`, `Content-MD5`), if any.
    pub server_digest: Option<String>,
}

/// A probe that could not produce any response.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of [`Resolver::resolve`]. Never an `Err`: a dead link is data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolutionResult),
    Failed(ResolveFailure),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn result(&self) -> Option<&ResolutionResult> {
        match self {
            Resolution::Resolved(r) => Some(r),
            Resolution::Failed(_) => None,
        }
    }

    pub fn server_digest(&self) -> Option<&str> {
        self.result()?.server_digest.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Failed(f) => Some(&f.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Head,
    Get,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
        }
    }
}

/// Raw response of one probe request.
struct ProbeResponse {
    final_url: String,
    status: u32,
    headers: Headers,
}

/// Blocking metadata prober. Call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct Resolver {
    timeout: Duration,
    max_redirects: u32,
}

impl Resolver {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            timeout: cfg.probe_timeout(),
            max_redirects: cfg.max_redirects,
        }
    }

    /// Resolve `url`, sending `custom_headers` with every probe request.
    pub fn resolve(&self, url: &str, custom_headers: &HashMap<String, String>) -> Resolution {
        let head = self.probe(url, custom_headers, Method::Head);
        let response = match head {
            Ok(r) if r.status < 400 && r.headers.content_length().is_some() => r,
            other => {
                match &other {
                    Ok(r) => tracing::debug!(
                        url,
                        status = r.status,
                        "HEAD unusable (error status or no Content-Length), falling back to GET"
                    ),
                    Err(e) => tracing::debug!(url, error = %e, "HEAD failed, falling back to GET"),
                }
                match self.probe(url, custom_headers, Method::Get) {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!(url, error = %e, "resolve failed");
                        return Resolution::Failed(ResolveFailure {
                            url: url.to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        };

        let server_digest = digest::server_digest(&response.headers);
        let content_length = response.headers.content_length();
        tracing::debug!(
            url,
            final_url = %response.final_url,
            status = response.status,
            ?content_length,
            ?server_digest,
            "resolved"
        );
        Resolution::Resolved(ResolutionResult {
            final_url: response.final_url,
            headers: response.headers,
            status_code: response.status,
            content_length,
            server_digest,
        })
    }

    /// Resolve each URL in turn; one failure does not stop the rest.
    pub fn resolve_all<I, S>(&self, urls: I, custom_headers: &HashMap<String, String>) -> Vec<Resolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .map(|u| self.resolve(u.as_ref(), custom_headers))
            .collect()
    }

    fn probe(
        &self,
        url: &str,
        custom_headers: &HashMap<String, String>,
        method: Method,
    ) -> Result<ProbeResponse, curl::Error> {
        let mut collector = HeaderCollector::default();
        let body_seen = Cell::new(false);

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        match method {
            Method::Head => easy.nobody(true)?,
            Method::Get => easy.get(true)?,
        }
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirects)?;
        easy.connect_timeout(self.timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(list) = request_header_list(custom_headers)? {
            easy.http_headers(list)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                collector.feed(data);
                true
            })?;
            // Refuse the first body chunk: curl aborts the transfer with a write error.
            transfer.write_function(|_data| {
                body_seen.set(true);
                Ok(0)
            })?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if !(e.is_write_error() && body_seen.get()) {
                return Err(e);
            }
            tracing::trace!(url, "abandoned {} body after headers", method.as_str());
        }

        let status = easy.response_code()?;
        let final_url = easy
            .effective_url()?
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string());
        Ok(ProbeResponse {
            final_url,
            status,
            headers: collector.into_headers(),
        })
    }
}
