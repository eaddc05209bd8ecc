//! SSE parser for OpenAI-compatible streaming chat completions.
//!
//! Turns the raw `reqwest` byte stream into text deltas. Bytes are buffered
//! until a full line is available, so a multi-byte character split across
//! network reads is never decoded in halves.

use adsynth_core::{CoreError, Provider};
use bytes::Bytes;
use futures::stream::Stream;
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::http::{invalid_response, transport_error};

#[derive(Debug, Deserialize)]
struct StreamChunkRaw {
    #[serde(default)]
    choices: Vec<StreamChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct StreamChoiceRaw {
    #[serde(default)]
    delta: DeltaRaw,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaRaw {
    #[serde(default)]
    content: Option<String>,
}

/// Yields the non-empty text deltas of a streamed completion and ends at
/// `data: [DONE]` or when the connection closes.
pub struct SseTextStream {
    provider: Provider,
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: Vec<u8>,
    done: bool,
}

impl SseTextStream {
    pub(crate) fn new(
        provider: Provider,
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            provider,
            inner: Box::pin(byte_stream),
            buffer: Vec::new(),
            done: false,
        }
    }
}

enum Line {
    Delta(String),
    Done,
}

impl Stream for SseTextStream {
    type Item = Result<String, CoreError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match next_line(this.provider, &mut this.buffer, false) {
                Some(Ok(Line::Delta(delta))) => return Poll::Ready(Some(Ok(delta))),
                Some(Ok(Line::Done)) => {
                    this.done = true;
                    return Poll::Ready(None);
                }
                Some(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {}
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(transport_error(this.provider, e))));
                }
                Poll::Ready(None) => {
                    // Connection closed; flush a final unterminated line if any
                    this.done = true;
                    return match next_line(this.provider, &mut this.buffer, true) {
                        Some(Ok(Line::Delta(delta))) => Poll::Ready(Some(Ok(delta))),
                        Some(Err(e)) => Poll::Ready(Some(Err(e))),
                        Some(Ok(Line::Done)) | None => Poll::Ready(None),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Pops lines off the buffer until one carries text or the end marker.
/// Returns `None` when more bytes are needed.
fn next_line(
    provider: Provider,
    buffer: &mut Vec<u8>,
    at_eof: bool,
) -> Option<Result<Line, CoreError>> {
    loop {
        let raw_line: Vec<u8> = match buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => buffer.drain(..=pos).collect(),
            None if at_eof && !buffer.is_empty() => std::mem::take(buffer),
            None => return None,
        };

        let line = match std::str::from_utf8(&raw_line) {
            Ok(line) => line.trim(),
            Err(e) => {
                return Some(Err(invalid_response(
                    provider,
                    &format!("Invalid UTF-8 in stream: {}", e),
                )))
            }
        };

        // Blank separators and `event:`/`id:`/`retry:` fields carry no text
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        if data == "[DONE]" {
            return Some(Ok(Line::Done));
        }

        match serde_json::from_str::<StreamChunkRaw>(data) {
            Ok(raw) => {
                let delta = raw
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .unwrap_or_default();
                if !delta.is_empty() {
                    return Some(Ok(Line::Delta(delta)));
                }
            }
            Err(e) => {
                return Some(Err(invalid_response(
                    provider,
                    &format!(
                        "Failed to parse stream chunk: {} (data: {})",
                        e,
                        data.chars().take(200).collect::<String>()
                    ),
                )))
            }
        }
    }
}
