use crate::types::{Message, Usage};
use serde::{Deserialize, Serialize};

/// Chat Completions API request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionsRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Upstream routing preferences.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPreferences {
    pub order: Vec<String>,
}

/// A buffered completion body or one streamed chunk; both share this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub id: Option<String>,
    pub model: Option<String>,
    /// Upstream provider that served the request (OpenRouter extension).
    pub provider: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Present in buffered responses
    pub message: Option<ChoiceContent>,
    /// Present in streamed chunks
    pub delta: Option<ChoiceContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceContent {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    /// Numeric HTTP-like code or a string such as "server_error"
    pub code: Option<serde_json::Value>,
}

impl ApiError {
    /// The code as an HTTP status, when it is one.
    pub fn status(&self) -> Option<u16> {
        self.code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .filter(|code| (100..=599).contains(code))
    }
}
