use crate::{CompletionRequest, Error, Response};

/// A backend that can answer a completion request.
///
/// The returned [`Response`] is always an event stream; buffered backends
/// hand back a short pre-built one so callers have a single code path.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync + 'static {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Response, Error>;
}
