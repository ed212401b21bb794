//! Writes answers and the metrics line.
//!
//! The answer goes to `out` and ends with exactly one newline. The blank line
//! and the metrics line go to `err`, so piping `out` yields only the answer.

use crate::metrics::Metrics;
use crate::{Completion, Error, Response};
use std::io::Write;

/// Printed instead of metrics when the answer was cut off.
pub const INCOMPLETE_MARKER: &str =
    "[incomplete response: the stream ended before the answer finished]";

pub struct Renderer<O, E> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> Renderer<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Consume `response` and print it.
    ///
    /// With `live` set every delta is written and flushed as soon as it
    /// arrives; otherwise the text is written once at the end. Both produce
    /// the same bytes on `out`. When the answer is cut off, whatever reached
    /// `out` is ended with a newline and followed by the incomplete marker.
    pub async fn render(&mut self, response: Response, live: bool) -> Result<Completion, Error> {
        let out = &mut self.out;
        let mut shown = String::new();
        let result = response
            .for_each_delta(|delta| {
                if live {
                    out.write_all(delta.as_bytes())?;
                    out.flush()?;
                    shown.push_str(delta);
                }
                Ok(())
            })
            .await;

        match result {
            Ok(completion) => {
                self.finish_text(&completion.text, live)?;
                writeln!(self.err)?;
                writeln!(self.err, "{}", Metrics::from_completion(&completion))?;
                self.err.flush()?;
                Ok(completion)
            }
            Err(error) => {
                let cut_off = if live {
                    (!shown.is_empty() || error.partial_text().is_some()).then_some(shown.as_str())
                } else {
                    error.partial_text()
                };
                if let Some(text) = cut_off {
                    self.finish_text(text, live)?;
                    writeln!(self.err)?;
                    writeln!(self.err, "{INCOMPLETE_MARKER}")?;
                    self.err.flush()?;
                }
                Err(error)
            }
        }
    }

    fn finish_text(&mut self, text: &str, already_written: bool) -> Result<(), Error> {
        if !already_written {
            self.out.write_all(text.as_bytes())?;
        }
        if !text.is_empty() && !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StreamEvent, Usage};

    fn answer(deltas: &[&str], done: bool) -> Response {
        let mut events = vec![StreamEvent::metadata(
            Some("inception/mercury-coder".to_string()),
            Some("Inception".to_string()),
        )];
        events.extend(deltas.iter().map(|d| StreamEvent::delta(*d)));
        events.push(StreamEvent::Usage {
            usage: Usage::new(10, 5),
        });
        if done {
            events.push(StreamEvent::Done);
        }
        Response::from_events(events)
    }

    async fn render(response: Response, live: bool) -> (Result<Completion, Error>, String, String) {
        let mut renderer = Renderer::new(Vec::new(), Vec::new());
        let result = renderer.render(response, live).await;
        let (out, err) = renderer.into_inner();
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_buffered_answer_then_blank_line_and_metrics() {
        let (result, out, err) = render(answer(&["4"], true), false).await;

        assert_eq!(result.unwrap().text, "4");
        assert_eq!(out, "4\n");
        assert!(err.starts_with("\n[inception/mercury-coder via Inception - "));
        assert!(err.ends_with(" tok/s]\n"));
    }

    #[tokio::test]
    async fn test_live_and_buffered_output_are_identical() {
        let deltas = ["Paris", " is the", " capital.\n"];
        let (_, live, _) = render(answer(&deltas, true), true).await;
        let (_, buffered, _) = render(answer(&deltas, true), false).await;

        assert_eq!(live, "Paris is the capital.\n");
        assert_eq!(live, buffered);
    }

    #[tokio::test]
    async fn test_live_output_is_flushed_per_delta() {
        #[derive(Default)]
        struct CountingWriter {
            bytes: Vec<u8>,
            flushes: usize,
        }
        impl Write for CountingWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                self.flushes += 1;
                Ok(())
            }
        }

        let mut renderer = Renderer::new(CountingWriter::default(), Vec::new());
        renderer.render(answer(&["a", "b", "c"], true), true).await.unwrap();
        let (out, _) = renderer.into_inner();

        // One flush per delta plus the final one
        assert_eq!(out.flushes, 4);
        assert_eq!(out.bytes, b"abc\n");
    }

    #[tokio::test]
    async fn test_incomplete_stream_is_marked_and_has_no_metrics() {
        let (result, out, err) = render(answer(&["The answer", " is"], false), true).await;

        assert_eq!(result.unwrap_err().partial_text(), Some("The answer is"));
        assert_eq!(out, "The answer is\n");
        assert_eq!(err, format!("\n{INCOMPLETE_MARKER}\n"));
        assert!(!err.contains("tok/s"));
    }

    #[tokio::test]
    async fn test_error_after_live_deltas_ends_line_and_marks_incomplete() {
        let response = Response::from_stream(futures_util::stream::iter(vec![
            Ok(StreamEvent::delta("The answer")),
            Ok(StreamEvent::delta(" is")),
            Err(Error::upstream(502, Some("Provider returned error".to_string()))),
        ]));
        let (result, out, err) = render(response, true).await;

        assert!(matches!(result, Err(Error::Upstream { status: 502, .. })));
        assert_eq!(out, "The answer is\n");
        assert_eq!(err, format!("\n{INCOMPLETE_MARKER}\n"));
    }

    #[tokio::test]
    async fn test_error_after_buffered_deltas_prints_nothing() {
        let response = Response::from_stream(futures_util::stream::iter(vec![
            Ok(StreamEvent::delta("The answer")),
            Err(Error::upstream(502, None)),
        ]));
        let (result, out, err) = render(response, false).await;

        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_print_nothing() {
        let response = Response::from_stream(futures_util::stream::iter(vec![Err(
            Error::upstream(500, None),
        )]));
        let (result, out, err) = render(response, true).await;

        assert!(matches!(result, Err(Error::Upstream { .. })));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
