//! Tests for resolve, fetch, checksum and header parsing.

use super::parse;
use crate::cli::{parse_header, Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_resolve_many_urls_with_headers() {
    match parse(&[
        "assetpipe",
        "resolve",
        "https://a.example/1",
        "https://b.example/2",
        "-H",
        "Authorization: Bearer t",
        "--header",
        "X-Extra:1",
    ]) {
        CliCommand::Resolve { urls, headers } => {
            assert_eq!(urls, vec!["https://a.example/1", "https://b.example/2"]);
            assert_eq!(
                headers,
                vec![
                    ("Authorization".to_string(), "Bearer t".to_string()),
                    ("X-Extra".to_string(), "1".to_string()),
                ]
            );
        }
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_requires_url() {
    assert!(Cli::try_parse_from(["assetpipe", "resolve"]).is_err());
}

#[test]
fn cli_parse_fetch() {
    match parse(&[
        "assetpipe",
        "fetch",
        "https://example.com/m.ckpt",
        "out/m.ckpt",
        "--sha256",
        "ABC",
    ]) {
        CliCommand::Fetch {
            url,
            dest,
            sha256,
            headers,
        } => {
            assert_eq!(url, "https://example.com/m.ckpt");
            assert_eq!(dest, Path::new("out/m.ckpt"));
            assert_eq!(sha256.as_deref(), Some("ABC"));
            assert!(headers.is_empty());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["assetpipe", "checksum", "/tmp/file"]) {
        CliCommand::Checksum { path } => assert_eq!(path, Path::new("/tmp/file")),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn header_parsing() {
    assert_eq!(
        parse_header("Cookie: a=b; c=d").unwrap(),
        ("Cookie".to_string(), "a=b; c=d".to_string())
    );
    assert_eq!(
        parse_header("X-Url: http://x:8080").unwrap(),
        ("X-Url".to_string(), "http://x:8080".to_string())
    );
    assert!(parse_header("no colon").is_err());
    assert!(parse_header(": value").is_err());
    assert!(Cli::try_parse_from(["assetpipe", "resolve", "u", "-H", "bad"]).is_err());
}
