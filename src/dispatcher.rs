//! Request dispatch: turns a user's question into one provider call.

use crate::provider::CompletionProvider;
use crate::types::{CompletionRequest, Prompt};
use crate::{Error, Response};
use std::time::Instant;
use tracing::debug;

/// System prompt sent unless the user supplies their own or disables it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You answer with the direct answer only.
- For a command request, output only the command.
- For a question, output only the answer.
- Do not add explanations, reasoning or commentary.
- Do not use markdown, code fences or other formatting.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SystemPrompt {
    #[default]
    Default,
    Custom(String),
    Disabled,
}

impl SystemPrompt {
    pub fn text(&self) -> Option<&str> {
        match self {
            SystemPrompt::Default => Some(DEFAULT_SYSTEM_PROMPT),
            SystemPrompt::Custom(text) => Some(text),
            SystemPrompt::Disabled => None,
        }
    }
}

/// One user invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub prompt: String,
    pub model: String,
    pub system: SystemPrompt,
    pub provider_order: Option<Vec<String>>,
    pub stream: bool,
}

impl Query {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: SystemPrompt::Default,
            provider_order: None,
            stream: false,
        }
    }

    pub fn system(mut self, system: SystemPrompt) -> Self {
        self.system = system;
        self
    }

    pub fn provider_order(mut self, order: Option<Vec<String>>) -> Self {
        self.provider_order = order;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn to_request(&self) -> CompletionRequest {
        let prompt = match self.system.text() {
            Some(system) => Prompt::system(system).with_user(&self.prompt),
            None => Prompt::user(&self.prompt),
        };

        CompletionRequest::from_prompt(&self.model, &prompt)
            .provider_order(self.provider_order.clone())
            .stream(self.stream)
    }
}

/// Sends queries to a single provider. Performs no retries: provider
/// fallback is left to the upstream service via the provider order hint.
pub struct Dispatcher {
    provider: Box<dyn CompletionProvider>,
}

impl Dispatcher {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Submit the query. Elapsed time in the finished response is measured
    /// from this call.
    pub async fn dispatch(&self, query: &Query) -> Result<Response, Error> {
        let started = Instant::now();
        let request = query.to_request();

        debug!(
            backend = self.provider.name(),
            model = %request.model,
            stream = request.stream,
            messages = request.messages.len(),
            "dispatching query"
        );

        let response = self.provider.complete(&request).await?;
        Ok(response.started_at(started))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, StreamEvent};
    use std::sync::{Arc, Mutex};

    /// Records requests and answers with a fixed text.
    struct RecordingProvider {
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    #[async_trait::async_trait]
    impl CompletionProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<Response, Error> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(Response::from_events(vec![
                StreamEvent::metadata(Some(request.model.clone()), Some("test".to_string())),
                StreamEvent::delta("4"),
                StreamEvent::Done,
            ]))
        }
    }

    #[test]
    fn test_default_system_prompt_comes_first() {
        let request = Query::new("What is 2+2?", "m").to_request();
        assert_eq!(
            request.messages,
            vec![
                Message::system(DEFAULT_SYSTEM_PROMPT),
                Message::user("What is 2+2?")
            ]
        );
    }

    #[test]
    fn test_custom_and_disabled_system_prompts() {
        let request = Query::new("hi", "m")
            .system(SystemPrompt::Custom("Be a pirate".to_string()))
            .to_request();
        assert_eq!(request.system_prompt().as_deref(), Some("Be a pirate"));

        let request = Query::new("hi", "m").system(SystemPrompt::Disabled).to_request();
        assert_eq!(request.messages, vec![Message::user("hi")]);
    }

    #[tokio::test]
    async fn test_dispatch_forwards_the_built_request() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(Box::new(RecordingProvider {
            requests: Arc::clone(&requests),
        }));

        let query = Query::new("What is 2+2?", "inception/mercury-coder")
            .provider_order(Some(vec!["Inception".to_string()]))
            .stream(true);
        let completion = dispatcher.dispatch(&query).await.unwrap().buffer().await.unwrap();

        assert_eq!(completion.text, "4");
        let recorded = requests.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], query.to_request());
        assert!(recorded[0].stream);
    }
}
