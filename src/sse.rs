//! Stream adapter that extracts event-stream `data:` payloads from a byte
//! stream.
//!
//! The local generation server frames its token stream as blank-line
//! separated events. Payloads can arrive split across arbitrary chunk
//! boundaries; this adapter buffers until an event is complete and yields
//! the joined `data:` lines of each one.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::{Stream, StreamExt};
use memchr::memmem;

use crate::Error;

const MAX_BUFFER: usize = 1_000_000;

/// Yields the `data:` payload of each complete event in a byte stream.
pub struct EventStream<S> {
    /// The underlying byte stream
    inner: S,
    /// Raw bytes carried over from previous chunks
    buffer: Vec<u8>,
    /// Payloads parsed and not yet yielded
    payloads: VecDeque<String>,
}

impl<S> EventStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            payloads: VecDeque::new(),
        }
    }

    /// Split off every complete event currently in the buffer and queue its
    /// payload. Bytes after the last separator stay buffered.
    fn drain_complete_events(&mut self) -> Result<(), Error> {
        let finder = memmem::Finder::new(b"\n\n");
        let mut start = 0;

        while let Some(pos) = finder.find(&self.buffer[start..]) {
            let end = start + pos;
            let text = std::str::from_utf8(&self.buffer[start..end])
                .map_err(|e| Error::streaming(format!("invalid UTF-8 in event stream: {e}")))?;
            if let Some(payload) = parse_event(text) {
                self.payloads.push_back(payload);
            }
            start = end + 2;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        Ok(())
    }
}

/// Extract the data payload of one event. Comments and non-data fields are
/// skipped; multiple `data:` lines join with a newline. `None` when the
/// event carries no data at all.
fn parse_event(text: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

impl<S, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<String, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(payload) = self.payloads.pop_front() {
                return Poll::Ready(Some(Ok(payload)));
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "stream error: {}",
                        e.into()
                    )))));
                }
                None => {
                    // A server may close without a final blank line; treat
                    // whatever is left as one last event.
                    if !self.buffer.is_empty() {
                        let trailing = match std::str::from_utf8(&self.buffer) {
                            Ok(text) => parse_event(text.trim()),
                            Err(_) => None,
                        };
                        self.buffer.clear();
                        if let Some(payload) = trailing {
                            return Poll::Ready(Some(Ok(payload)));
                        }
                    }
                    return Poll::Ready(None);
                }
            };

            self.buffer.extend_from_slice(&chunk);

            if self.buffer.len() > MAX_BUFFER {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::streaming(
                    "event buffer exceeded maximum size".to_string(),
                ))));
            }

            if let Err(e) = self.drain_complete_events() {
                return Poll::Ready(Some(Err(e)));
            }
        }
    }
}

/// Extension trait to parse byte streams as event streams.
pub trait EventStreamExt: Stream {
    fn event_payloads(self) -> EventStream<Self>
    where
        Self: Sized,
    {
        EventStream::new(self)
    }
}

impl<S: Stream> EventStreamExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&[u8]]) -> Vec<Result<bytes::Bytes, std::io::Error>> {
        parts
            .iter()
            .map(|p| Ok(bytes::Bytes::copy_from_slice(p)))
            .collect()
    }

    #[tokio::test]
    async fn test_complete_events() {
        let byte_stream = stream::iter(chunks(&[b"data: one\n\ndata: two\n\n"]));
        let mut events = byte_stream.event_payloads();

        assert_eq!(events.next().await.unwrap().unwrap(), "one");
        assert_eq!(events.next().await.unwrap().unwrap(), "two");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_events_split_across_chunks() {
        let byte_stream =
            stream::iter(chunks(&[b"data: hel", b"lo world\n\ndata: ", b"second\n\n"]));
        let mut events = byte_stream.event_payloads();

        assert_eq!(events.next().await.unwrap().unwrap(), "hello world");
        assert_eq!(events.next().await.unwrap().unwrap(), "second");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_multiline_data_joins() {
        let byte_stream = stream::iter(chunks(&[b"data: line 1\ndata: line 2\n\n"]));
        let mut events = byte_stream.event_payloads();

        assert_eq!(events.next().await.unwrap().unwrap(), "line 1\nline 2");
    }

    #[tokio::test]
    async fn test_comments_and_bare_fields_skipped() {
        let byte_stream =
            stream::iter(chunks(&[b": keepalive\n\nevent: tick\n\ndata: real\n\n"]));
        let mut events = byte_stream.event_payloads();

        assert_eq!(events.next().await.unwrap().unwrap(), "real");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_trailing_event_without_final_blank_line() {
        let byte_stream = stream::iter(chunks(&[b"data: first\n\n", b"data: last"]));
        let mut events = byte_stream.event_payloads();

        assert_eq!(events.next().await.unwrap().unwrap(), "first");
        assert_eq!(events.next().await.unwrap().unwrap(), "last");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let byte_stream = stream::iter(chunks(&[b"data: bad \xff\xfe bytes\n\n"]));
        let mut events = byte_stream.event_payloads();

        assert!(events.next().await.unwrap().is_err());
    }
}
