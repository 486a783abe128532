//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body. HEAD returns headers only; GET honours
//! `Range: bytes=N-` with 206. `/redirect/...` answers 302 to `/file.bin`,
//! `/missing/...` answers 404. Every request is recorded for assertions.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, HEAD omits Content-Length.
    pub head_content_length: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If set, the first full-body GET sends only this many bytes, then closes.
    pub truncate_first_get: Option<usize>,
    /// If set, every 206 starts at this offset regardless of the requested range.
    pub range_start_override: Option<u64>,
    /// Extra response headers on every successful response.
    pub extra_headers: Vec<(String, String)>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            head_content_length: true,
            support_ranges: true,
            truncate_first_get: None,
            range_start_override: None,
            extra_headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub range: Option<String>,
    pub headers: Vec<(String, String)>,
}

pub struct AssetServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl AssetServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }
}

pub fn start(body: Vec<u8>) -> AssetServer {
    start_with_options(body, ServerOptions::default())
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let truncated_once = Arc::new(AtomicBool::new(false));
    {
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let opts = Arc::clone(&opts);
                let requests = Arc::clone(&requests);
                let truncated_once = Arc::clone(&truncated_once);
                thread::spawn(move || handle(stream, &body, &opts, &requests, &truncated_once));
            }
        });
    }
    AssetServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.len() > 64 * 1024 {
            break;
        }
    }
    String::from_utf8(buf).ok()
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: &ServerOptions,
    requests: &Mutex<Vec<Recorded>>,
    truncated_once: &AtomicBool,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let rec = parse_request(&request);
    requests.lock().unwrap().push(rec.clone());

    let extra: String = opts
        .extra_headers
        .iter()
        .map(|(k, v)| format!("{k}: {v}\r\n"))
        .collect();
    let total = body.len() as u64;

    if rec.path.starts_with("/missing") {
        let msg = b"not found";
        let _ = write!(
            stream,
            "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            msg.len()
        );
        if rec.method != "HEAD" {
            let _ = stream.write_all(msg);
        }
        return;
    }
    if rec.path.starts_with("/redirect") {
        let _ = write!(
            stream,
            "HTTP/1.1 302 Found\r\nLocation: /file.bin\r\nETag: \"redirect-hop\"\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        return;
    }

    if rec.method == "HEAD" {
        if !opts.head_allowed {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            return;
        }
        let length = if opts.head_content_length {
            format!("Content-Length: {total}\r\n")
        } else {
            String::new()
        };
        let _ = write!(
            stream,
            "HTTP/1.1 200 OK\r\n{length}Accept-Ranges: bytes\r\n{extra}Connection: close\r\n\r\n"
        );
        return;
    }

    if rec.method != "GET" {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let start = rec
        .range
        .as_deref()
        .and_then(parse_range_start)
        .filter(|_| opts.support_ranges);
    match start {
        Some(start) if start >= total => {
            let _ = write!(
                stream,
                "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{total}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
        }
        Some(start) => {
            let start = opts.range_start_override.unwrap_or(start).min(total);
            let slice = &body[start as usize..];
            let _ = write!(
                stream,
                "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n{extra}Connection: close\r\n\r\n",
                slice.len(),
                start,
                total - 1,
                total
            );
            let _ = stream.write_all(slice);
        }
        None => {
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {total}\r\n{extra}Connection: close\r\n\r\n"
            );
            match opts.truncate_first_get {
                Some(n) if !truncated_once.swap(true, Ordering::SeqCst) => {
                    let _ = stream.write_all(&body[..n.min(body.len())]);
                    let _ = stream.flush();
                    // Dropping the stream mid-body looks like a dropped connection to the client.
                }
                _ => {
                    let _ = stream.write_all(body);
                }
            }
        }
    }
}

fn parse_request(request: &str) -> Recorded {
    let mut lines = request.lines();
    let first = lines.next().unwrap_or("");
    let mut parts = first.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();
    let mut range = None;
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let (name, value) = (name.trim().to_string(), value.trim().to_string());
            if name.eq_ignore_ascii_case("range") {
                range = Some(value.clone());
            }
            headers.push((name, value));
        }
    }
    Recorded {
        method,
        path,
        range,
        headers,
    }
}

/// `bytes=N-` → `N`.
fn parse_range_start(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (start, _) = spec.split_once('-')?;
    start.trim().parse().ok()
}
