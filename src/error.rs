use thiserror::Error;

/// Errors that can occur while dispatching a prompt.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{}", upstream_message(.status, .message))]
    Upstream { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Incomplete response: {reason}")]
    StreamTerminated { partial: String, reason: String },

    #[error("{provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

fn upstream_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("API error (HTTP {status}): {message}"),
        None => format!("API returned HTTP {status}"),
    }
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn upstream(status: u16, message: Option<String>) -> Self {
        Error::Upstream { status, message }
    }

    /// Text received before the stream broke off, if this is a premature termination.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            Error::StreamTerminated { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
