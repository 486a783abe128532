//! Server-asserted content digests pulled from response headers.
//!
//! Each provider advertises identity differently, so extraction is a list of
//! independent extractors tried in order; the first hit wins.

use crate::http::Headers;

/// Pulls a digest-like value out of response headers, if this provider style is present.
pub type DigestExtractor = fn(&Headers) -> Option<String>;

/// Extractors in priority order.
pub const EXTRACTORS: &[DigestExtractor] = &[from_etag, from_goog_hash, from_content_md5];

/// Runs [`EXTRACTORS`] in order and returns the first value found.
pub fn server_digest(headers: &Headers) -> Option<String> {
    server_digest_with(headers, EXTRACTORS)
}

/// Same as [`server_digest`] with a caller-chosen extractor list.
pub fn server_digest_with(headers: &Headers, extractors: &[DigestExtractor]) -> Option<String> {
    extractors.iter().find_map(|extract| extract(headers))
}

/// `ETag` with surrounding quotes removed.
pub fn from_etag(headers: &Headers) -> Option<String> {
    let value = headers.get("etag")?.trim_matches('"');
    non_empty(value)
}

/// `x-goog-hash: crc32c=..., md5=...`: the `md5` value if present, else the first pair verbatim.
pub fn from_goog_hash(headers: &Headers) -> Option<String> {
    let raw = headers.get("x-goog-hash")?;
    let parts: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    if let Some(md5) = parts.iter().find_map(|p| p.strip_prefix("md5=")) {
        return non_empty(md5);
    }
    parts.first().and_then(|p| non_empty(p))
}

/// `Content-MD5` verbatim.
pub fn from_content_md5(headers: &Headers) -> Option<String> {
    non_empty(headers.get("content-md5")?)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
