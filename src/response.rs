//! Response handling for completions.

use crate::accumulator::ResponseAccumulator;
use crate::{Error, StreamEvent, Usage};
use futures_util::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Boxed event stream produced by a provider.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>;

/// A finished answer with the data needed for the metrics line.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub provider: String,
    pub usage: Option<Usage>,
    /// Wall-clock time from dispatch until the terminator arrived.
    pub elapsed: Duration,
}

/// A response in flight: a lazy, finite, non-restartable sequence of events
/// plus the instant the request was dispatched.
pub struct Response {
    stream: EventStream,
    started: Instant,
}

impl Response {
    /// Create a new response from a stream of events.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            started: Instant::now(),
        }
    }

    /// Create a response from events that are already known.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self::from_stream(futures_util::stream::iter(events.into_iter().map(Ok)))
    }

    /// Measure elapsed time from `started` instead of from construction.
    pub fn started_at(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Consume the events, handing every content delta to `on_delta` as it
    /// arrives, and return the finished answer.
    ///
    /// A transport failure or a stream that ends without the terminator
    /// yields [`Error::StreamTerminated`] carrying the text seen so far.
    pub async fn for_each_delta<F>(mut self, mut on_delta: F) -> Result<Completion, Error>
    where
        F: FnMut(&str) -> Result<(), Error>,
    {
        let mut accumulator = ResponseAccumulator::new();

        while let Some(event) = self.stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(Error::Stream(reason)) => return Err(accumulator.into_terminated(reason)),
                Err(e) => return Err(e),
            };

            if let StreamEvent::ContentDelta { delta } = &event {
                on_delta(delta)?;
            }
            accumulator.process_event(event);

            if accumulator.is_done() {
                break;
            }
        }

        accumulator.finalize(self.started.elapsed())
    }

    /// Buffer the entire response.
    pub async fn buffer(self) -> Result<Completion, Error> {
        self.for_each_delta(|_| Ok(())).await
    }
}
