//! Delta accumulation logic for streaming responses.

use crate::types::{StreamEvent, Usage};
use crate::{Completion, Error};
use std::time::Duration;

/// Folds stream events, in arrival order, into a complete answer.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text: String,
    model: Option<String>,
    provider: Option<String>,
    usage: Option<Usage>,
    done: bool,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a stream event and update the accumulation.
    pub fn process_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Metadata { model, provider } => {
                if model.is_some() {
                    self.model = model;
                }
                if provider.is_some() {
                    self.provider = provider;
                }
            }
            StreamEvent::ContentDelta { delta } => self.text.push_str(&delta),
            StreamEvent::Usage { usage } => self.usage = Some(usage),
            StreamEvent::Done => self.done = true,
        }
    }

    /// Whether the terminator event has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Turn the accumulated state into a premature-termination error.
    pub fn into_terminated(self, reason: impl Into<String>) -> Error {
        Error::StreamTerminated {
            partial: self.text,
            reason: reason.into(),
        }
    }

    /// Finalize into a complete response. Fails if the terminator never arrived.
    pub fn finalize(self, elapsed: Duration) -> Result<Completion, Error> {
        if !self.done {
            return Err(self.into_terminated("connection closed before the end of the stream"));
        }

        Ok(Completion {
            text: self.text,
            model: self.model.unwrap_or_else(|| "unknown".to_string()),
            provider: self.provider.unwrap_or_else(|| "unknown".to_string()),
            usage: self.usage,
            elapsed,
        })
    }
}
