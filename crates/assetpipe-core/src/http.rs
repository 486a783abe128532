//! Curl plumbing shared by the resolver and the fetcher: request header
//! lists and response header collection across redirect chains.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str;

/// Response headers keyed case-insensitively (names are stored lowercased).
///
/// Repeated headers are joined with `", "` as HTTP allows, so e.g. the two
/// `x-goog-hash` lines Cloud Storage sends read as one comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let key = name.trim().to_ascii_lowercase();
        let value = value.trim();
        self.entries
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `Content-Length` parsed as a byte count.
    pub fn content_length(&self) -> Option<u64> {
        self.get("content-length")?.parse().ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k.as_ref(), v.as_ref());
        }
        headers
    }
}

/// Collects header lines from curl's header callback.
///
/// Curl reports the headers of every response in a redirect chain (and of
/// interim `100 Continue` responses); each status line starts a new response,
/// so only the final response's headers survive.
#[derive(Debug, Default)]
pub(crate) struct HeaderCollector {
    status: Option<u32>,
    headers: Headers,
}

impl HeaderCollector {
    pub(crate) fn feed(&mut self, data: &[u8]) {
        let Ok(line) = str::from_utf8(data) else {
            return;
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            self.status = parse_status_line(line);
            self.headers = Headers::new();
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            self.headers.insert(name, value);
        }
    }

    /// Status of the most recent response seen so far.
    pub(crate) fn status(&self) -> Option<u32> {
        self.status
    }

    pub(crate) fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn into_headers(self) -> Headers {
        self.headers
    }
}

/// `HTTP/1.1 206 Partial Content` → `206`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Build a curl header list from caller-supplied request headers
/// (`None` when there are none, so curl's defaults stay untouched).
pub(crate) fn request_header_list(
    custom_headers: &HashMap<String, String>,
) -> Result<Option<curl::easy::List>, curl::Error> {
    if custom_headers.is_empty() {
        return Ok(None);
    }
    let mut list = curl::easy::List::new();
    for (k, v) in custom_headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    Ok(Some(list))
}

/// `bytes 100-999/1000` → `100`. The unsatisfied form `bytes */1000` has no start.
pub(crate) fn content_range_start(value: &str) -> Option<u64> {
    let range = value.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}

/// Parse `bytes */1234` or `bytes 0-99/1234` into the total length.
pub(crate) fn content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
