use super::types::{ChatCompletion, ChatCompletionsRequest, ErrorEnvelope, ProviderPreferences};
use crate::provider::CompletionProvider;
use crate::sse_stream::SseStreamExt;
use crate::{CompletionRequest, Error, Response, StreamEvent};
use futures_util::{stream, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const PROVIDER_NAME: &str = "OpenRouter";

/// OpenRouter chat-completions client.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, DEFAULT_BASE_URL.to_string(), timeout)
    }

    /// Create a new OpenRouter provider with custom base URL.
    pub fn new_with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::config("OPENROUTER_API_KEY is set but empty"));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert our request to the wire format.
    fn convert_request(request: &CompletionRequest) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: request.model.clone(),
            messages: request.messages.clone(),
            provider: request
                .provider_order
                .as_ref()
                .map(|order| ProviderPreferences {
                    order: order.clone(),
                }),
            stream: request.stream.then_some(true),
        }
    }

    /// Build the error for a non-2xx response, preferring the body's message.
    fn upstream_error(status: u16, body: &str) -> Error {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Error::upstream(status, Some(envelope.error.message)),
            Err(_) => Error::upstream(status, None),
        }
    }

    /// Parse a buffered (non-streaming) body into the events it represents.
    fn parse_completion(body: &str, requested_model: &str) -> Result<Vec<StreamEvent>, Error> {
        let completion: ChatCompletion = serde_json::from_str(body)
            .map_err(|e| Error::parse(format!("response body is not valid JSON: {e}")))?;

        if let Some(error) = completion.error {
            return Err(Error::upstream(
                error.status().unwrap_or(200),
                Some(error.message),
            ));
        }

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| Error::parse("response has no choices[0].message.content"))?;

        let mut events = vec![
            StreamEvent::metadata(
                Some(completion.model.unwrap_or_else(|| requested_model.to_string())),
                Some(completion.provider.unwrap_or_else(|| PROVIDER_NAME.to_string())),
            ),
            StreamEvent::delta(content),
        ];
        if let Some(usage) = completion.usage {
            events.push(StreamEvent::Usage { usage });
        }
        events.push(StreamEvent::Done);

        Ok(events)
    }

    /// Convert one streamed chunk into our events.
    fn convert_chunk(data: &str) -> Result<Vec<StreamEvent>, Error> {
        let chunk: ChatCompletion = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "skipping undecodable stream chunk");
                return Ok(vec![]);
            }
        };

        if let Some(error) = chunk.error {
            return Err(Error::upstream(
                error.status().unwrap_or(200),
                Some(error.message),
            ));
        }

        let mut events = Vec::new();
        if chunk.model.is_some() || chunk.provider.is_some() {
            events.push(StreamEvent::metadata(chunk.model, chunk.provider));
        }

        let delta = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty());
        if let Some(delta) = delta {
            events.push(StreamEvent::delta(delta));
        }

        if let Some(usage) = chunk.usage {
            events.push(StreamEvent::Usage { usage });
        }

        Ok(events)
    }

    async fn send(&self, body: &ChatCompletionsRequest) -> Result<reqwest::Response, Error> {
        debug!(
            model = %body.model,
            stream = body.stream.unwrap_or(false),
            provider_order = ?body.provider.as_ref().map(|p| &p.order),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "received response headers");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::upstream_error(status.as_u16(), &body));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Response, Error> {
        let body = Self::convert_request(request);
        let response = self.send(&body).await?;

        if !request.stream {
            let text = response.text().await?;
            return Ok(Response::from_events(Self::parse_completion(
                &text,
                &request.model,
            )?));
        }

        let initial = StreamEvent::metadata(
            Some(request.model.clone()),
            Some(PROVIDER_NAME.to_string()),
        );

        let events = response.bytes_stream().sse_events().flat_map(|sse_result| {
            let events: Vec<Result<StreamEvent, Error>> = match sse_result {
                Ok(sse_event) if sse_event.is_done() => vec![Ok(StreamEvent::Done)],
                Ok(sse_event) => match Self::convert_chunk(&sse_event.data) {
                    Ok(events) => events.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                },
                Err(e) => vec![Err(e)],
            };
            stream::iter(events)
        });

        Ok(Response::from_stream(
            stream::once(async move { Ok(initial) }).chain(events),
        ))
    }
}
