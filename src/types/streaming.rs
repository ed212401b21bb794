//! Types for streaming responses.

use crate::types::Usage;

/// Events that can be emitted while a response is being read.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Model and/or provider reported by the backend. Later values win.
    Metadata {
        model: Option<String>,
        provider: Option<String>,
    },
    /// A chunk of answer text.
    ContentDelta { delta: String },
    /// Token counts for the whole response.
    Usage { usage: Usage },
    /// The terminator: no further content will arrive.
    Done,
}

impl StreamEvent {
    pub fn delta(delta: impl Into<String>) -> Self {
        StreamEvent::ContentDelta {
            delta: delta.into(),
        }
    }

    pub fn metadata(model: Option<String>, provider: Option<String>) -> Self {
        StreamEvent::Metadata { model, provider }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_event_constructors() {
        assert_eq!(
            StreamEvent::delta("4"),
            StreamEvent::ContentDelta {
                delta: "4".to_string()
            }
        );
        assert!(matches!(
            StreamEvent::metadata(Some("m".to_string()), None),
            StreamEvent::Metadata { provider: None, .. }
        ));
    }
}
