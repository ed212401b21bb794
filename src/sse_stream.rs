//! Stream adapter turning response body chunks into `data:` line events.

use crate::Error;
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Longest line we are willing to buffer before giving up.
const MAX_LINE_BYTES: usize = 1_000_000;

/// The payload of one `data:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub data: String,
}

impl SseEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Check if this is the `[DONE]` terminator.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// A stream adapter that yields `data:` lines from a byte stream.
/// Lines split across chunks (including split UTF-8 sequences) are buffered
/// until their newline arrives.
pub struct SseStream<S> {
    inner: S,
    /// Bytes of the current, not yet terminated line
    buffer: Vec<u8>,
    /// Parsed events ready to be yielded
    events: VecDeque<SseEvent>,
}

impl<S> SseStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Move every complete line in the buffer onto the event queue.
    fn parse_buffer(&mut self) -> Result<(), Error> {
        let mut start = 0;

        while let Some(pos) = memchr::memchr(b'\n', &self.buffer[start..]) {
            let end = start + pos;
            let line = match std::str::from_utf8(&self.buffer[start..end]) {
                Ok(line) => line,
                Err(e) => {
                    self.buffer.clear();
                    return Err(Error::stream(format!("invalid UTF-8 in event stream: {e}")));
                }
            };

            if let Some(event) = Self::parse_line(line) {
                self.events.push_back(event);
            }
            start = end + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(())
    }

    /// Blank lines, `:` comments (keep-alives) and non-data fields yield nothing.
    fn parse_line(line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);
        Some(SseEvent::new(data))
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::stream(format!(
                        "connection error: {}",
                        e.into()
                    )))));
                }
                None => {
                    // Body ended; a last line without a trailing newline still counts
                    if self.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    let rest = std::mem::take(&mut self.buffer);
                    return match std::str::from_utf8(&rest) {
                        Ok(line) => match Self::parse_line(line) {
                            Some(event) => Poll::Ready(Some(Ok(event))),
                            None => Poll::Ready(None),
                        },
                        Err(e) => Poll::Ready(Some(Err(Error::stream(format!(
                            "invalid UTF-8 in event stream: {e}"
                        ))))),
                    };
                }
            };

            self.buffer.extend_from_slice(&chunk);

            if let Err(e) = self.parse_buffer() {
                return Poll::Ready(Some(Err(e)));
            }

            if self.buffer.len() > MAX_LINE_BYTES {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::stream(
                    "event stream line exceeded maximum size",
                ))));
            }
        }
    }
}

/// Extension trait to add `data:` line parsing to byte streams.
pub trait SseStreamExt: Stream {
    fn sse_events(self) -> SseStream<Self>
    where
        Self: Sized,
    {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}
