use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use a2a_types::SendStreamingMessageResponse;
use bytes::Bytes;
use futures_core::Stream;

use crate::error::ClientError;
use crate::transport::EventStream;

/// Maximum length of a single line (10 MB).
const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

/// Newline-delimited JSON decoder.
///
/// Accumulates raw bytes into complete lines and decodes each line on its
/// own. Lines that fail to decode are logged and dropped; they never end the
/// stream. SSE framing (`data:` prefixes, `event:`/`id:`/`retry:` fields,
/// `:` comments) is tolerated so the decoder also reads SSE-speaking peers.
struct LineDecoder {
    url: String,
    /// Bytes of the current, not yet terminated line.
    buffer: Vec<u8>,
    /// Set when the current line blew past `MAX_LINE_SIZE`.
    overflowed: bool,
}

impl LineDecoder {
    fn new(url: String) -> Self {
        Self {
            url,
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed a raw byte chunk and return all fully decoded lines.
    fn feed(&mut self, chunk: &[u8]) -> Vec<SendStreamingMessageResponse> {
        let mut decoded = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.overflowed {
                self.overflowed = false;
                self.buffer.clear();
                continue;
            }
            self.buffer.extend_from_slice(head);
            let line = std::mem::take(&mut self.buffer);
            if let Some(response) = self.decode_line(&line) {
                decoded.push(response);
            }
        }

        if !self.overflowed {
            self.buffer.extend_from_slice(rest);
            if self.buffer.len() > MAX_LINE_SIZE {
                tracing::warn!(url = %self.url, "stream line exceeded 10 MB, dropping it");
                self.buffer.clear();
                self.overflowed = true;
            }
        }

        decoded
    }

    /// Decode whatever is left once the connection has closed.
    fn finish(&mut self) -> Option<SendStreamingMessageResponse> {
        let line = std::mem::take(&mut self.buffer);
        if self.overflowed || line.is_empty() {
            return None;
        }
        self.decode_line(&line)
    }

    fn decode_line(&self, line: &[u8]) -> Option<SendStreamingMessageResponse> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "skipping non UTF-8 stream line");
                return None;
            }
        };

        if text.is_empty() || text.starts_with(':') {
            return None;
        }
        if ["event:", "id:", "retry:"]
            .iter()
            .any(|field| text.starts_with(field))
        {
            return None;
        }
        let payload = text.strip_prefix("data:").map(str::trim).unwrap_or(text);
        if payload.is_empty() {
            return None;
        }

        match serde_json::from_str(payload) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "skipping malformed stream line");
                None
            }
        }
    }
}

/// Wraps an inner byte stream and a `LineDecoder` to produce responses.
struct NdjsonStream<S> {
    inner: Pin<Box<S>>,
    decoder: LineDecoder,
    /// Lines decoded from the current chunk that haven't been yielded yet.
    pending: VecDeque<SendStreamingMessageResponse>,
    done: bool,
}

impl<S> Stream for NdjsonStream<S>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send,
{
    type Item = Result<SendStreamingMessageResponse, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(response) = this.pending.pop_front() {
            return Poll::Ready(Some(Ok(response)));
        }
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.pending.extend(this.decoder.feed(&bytes));
                    if let Some(response) = this.pending.pop_front() {
                        return Poll::Ready(Some(Ok(response)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    let err = ClientError::network(&this.decoder.url, e);
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    return Poll::Ready(this.decoder.finish().map(Ok));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Create an [`EventStream`] that decodes newline-delimited JSON-RPC responses.
pub fn decode_stream(
    url: impl Into<String>,
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> EventStream {
    Box::pin(NdjsonStream {
        inner: Box::pin(byte_stream),
        decoder: LineDecoder::new(url.into()),
        pending: VecDeque::new(),
        done: false,
    })
}
