//! One streaming GET into a side-file, resuming from its current length.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use super::TransferSettings;
use crate::error::FetchError;
use crate::http::{content_range_start, content_range_total, request_header_list, HeaderCollector};
use crate::storage::PartFile;

/// How the transfer ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StreamOutcome {
    /// The body was appended (or written from zero after a restart).
    Streamed,
    /// Server answered 416 for a side-file that already holds the whole resource.
    AlreadyComplete,
    /// Server answered 416 with a total shorter than the side-file. The side-file
    /// was emptied and nothing was transferred; the caller should stream again.
    Truncated,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct StreamReport {
    pub(super) outcome: StreamOutcome,
    /// Offset the side-file content actually continues from (0 after a restart).
    pub(super) started_from: u64,
}

struct StreamState {
    part: PartFile,
    collector: HeaderCollector,
    resume_from: u64,
    started_from: u64,
    started: bool,
    rejected: bool,
    aborted: bool,
    misaligned: Option<Option<u64>>,
    io_error: Option<io::Error>,
}

impl StreamState {
    /// First body chunk: decide between append, restart and reject using the response status.
    fn begin_body(&mut self, url: &str) -> bool {
        match self.collector.status() {
            Some(206) if self.resume_from > 0 => {
                let start = self
                    .collector
                    .headers()
                    .get("content-range")
                    .and_then(content_range_start);
                match start {
                    Some(start) if start == self.resume_from => true,
                    Some(0) => {
                        tracing::warn!(url, resume_from = self.resume_from, "206 restarted at byte 0");
                        self.restart()
                    }
                    other => {
                        self.misaligned = Some(other);
                        false
                    }
                }
            }
            Some(code) if (200..300).contains(&code) => {
                if self.part.is_empty() {
                    return true;
                }
                tracing::warn!(url, code, "server ignored Range request, restarting from byte 0");
                self.restart()
            }
            _ => {
                self.rejected = true;
                false
            }
        }
    }

    fn restart(&mut self) -> bool {
        match self.part.restart() {
            Ok(()) => {
                self.started_from = 0;
                true
            }
            Err(e) => {
                self.io_error = Some(e);
                false
            }
        }
    }
}

/// Streams `url` into `part`, sending `Range: bytes=<len>-` when the side-file is non-empty.
/// On every exit path the side-file keeps whatever was written.
pub(super) fn stream_to_part(
    url: &str,
    custom_headers: &HashMap<String, String>,
    part: PartFile,
    settings: &TransferSettings,
    abort: Option<&AtomicBool>,
) -> Result<(PartFile, StreamReport), FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };
    let resume_from = part.len();
    let part_path = part.path().to_path_buf();
    let aborted = || abort.is_some_and(|a| a.load(Ordering::Relaxed));

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.get(true).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.max_redirections(settings.max_redirects).map_err(transport)?;
    easy.connect_timeout(settings.timeout).map_err(transport)?;
    // Stall timeout: give up when no byte arrives for the whole window.
    easy.low_speed_limit(1).map_err(transport)?;
    easy.low_speed_time(settings.timeout).map_err(transport)?;
    easy.progress(true).map_err(transport)?;
    if resume_from > 0 {
        easy.range(&format!("{}-", resume_from)).map_err(transport)?;
        tracing::info!(url, resume_from, "resuming from existing side-file");
    }
    if let Some(list) = request_header_list(custom_headers).map_err(transport)? {
        easy.http_headers(list).map_err(transport)?;
    }

    let state = RefCell::new(StreamState {
        part,
        collector: HeaderCollector::default(),
        resume_from,
        started_from: resume_from,
        started: false,
        rejected: false,
        aborted: false,
        misaligned: None,
        io_error: None,
    });

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                state.borrow_mut().collector.feed(data);
                true
            })
            .map_err(transport)?;
        transfer
            .write_function(|data| {
                let mut st = state.borrow_mut();
                if aborted() {
                    st.aborted = true;
                    return Ok(0);
                }
                if !st.started {
                    if !st.begin_body(url) {
                        return Ok(0);
                    }
                    st.started = true;
                }
                match st.part.write(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        st.io_error = Some(e);
                        Ok(0)
                    }
                }
            })
            .map_err(transport)?;
        transfer
            .progress_function(|_, _, _, _| !aborted())
            .map_err(transport)?;
        transfer.perform()
    };

    let mut st = state.into_inner();
    // Keep partial bytes on disk whatever happens next.
    if let Err(e) = st.part.flush() {
        st.io_error.get_or_insert(e);
    }

    if let Err(e) = performed {
        if st.aborted || e.is_aborted_by_callback() {
            return Err(FetchError::Aborted {
                url: url.to_string(),
                part_path,
            });
        }
        if let Some(io_err) = st.io_error.take() {
            return Err(FetchError::storage(part_path, io_err));
        }
        if let Some(got) = st.misaligned {
            tracing::warn!(url, resume_from, ?got, "206 does not continue the side-file");
            return Err(FetchError::UnexpectedRange {
                url: url.to_string(),
                expected: resume_from,
                got,
            });
        }
        if !(e.is_write_error() && st.rejected) {
            return Err(transport(e));
        }
    }
    if let Some(io_err) = st.io_error.take() {
        return Err(FetchError::storage(part_path, io_err));
    }

    let status = easy.response_code().map_err(transport)?;
    if !(200..300).contains(&status) {
        let total = st
            .collector
            .headers()
            .get("content-range")
            .and_then(content_range_total);
        match total {
            Some(total) if status == 416 && resume_from > 0 && total == resume_from => {
                tracing::info!(url, resume_from, "side-file already holds the complete resource");
                return Ok((
                    st.part,
                    StreamReport {
                        outcome: StreamOutcome::AlreadyComplete,
                        started_from: resume_from,
                    },
                ));
            }
            Some(total) if status == 416 && total < resume_from => {
                tracing::warn!(
                    url,
                    resume_from,
                    total,
                    "side-file is longer than the remote resource, discarding it"
                );
                st.part
                    .restart()
                    .map_err(|e| FetchError::storage(&part_path, e))?;
                return Ok((
                    st.part,
                    StreamReport {
                        outcome: StreamOutcome::Truncated,
                        started_from: 0,
                    },
                ));
            }
            _ => {}
        }
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    // A full (200) response with an empty body never reaches the write callback.
    if !st.started && status != 206 && !st.part.is_empty() {
        tracing::warn!(url, status, "server ignored Range request with an empty body, restarting");
        st.part
            .restart()
            .map_err(|e| FetchError::storage(&part_path, e))?;
        st.started_from = 0;
    }

    Ok((
        st.part,
        StreamReport {
            outcome: StreamOutcome::Streamed,
            started_from: st.started_from,
        },
    ))
}
