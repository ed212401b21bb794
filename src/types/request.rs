use super::message::{Message, Role};
use super::prompt::Prompt;

/// A single chat-completion request. Built fresh per invocation and not
/// modified after it is handed to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Ranked upstream providers, forwarded verbatim as a routing hint.
    pub provider_order: Option<Vec<String>>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn from_prompt(model: impl Into<String>, prompt: &Prompt) -> Self {
        Self {
            model: model.into(),
            messages: prompt.messages().to_vec(),
            provider_order: None,
            stream: false,
        }
    }

    pub fn provider_order(mut self, order: Option<Vec<String>>) -> Self {
        self.provider_order = order.filter(|order| !order.is_empty());
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// System messages joined by blank lines, if any.
    pub fn system_prompt(&self) -> Option<String> {
        let parts = self.contents(Role::System);
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// User messages joined by blank lines.
    pub fn user_prompt(&self) -> String {
        self.contents(Role::User).join("\n\n")
    }

    fn contents(&self, role: Role) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == role)
            .map(|m| m.content.as_str())
            .collect()
    }
}
