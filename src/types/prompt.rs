use super::message::Message;

/// An ordered conversation handed to a provider.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    messages: Vec<Message>,
}

impl Prompt {
    /// Create a prompt with a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(content)],
        }
    }

    /// Create a prompt with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    /// Add a user message.
    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::user(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::user(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_prompt_preserves_message_order() {
        let prompt = Prompt::system("Be brief").with_user("What is 2+2?");
        let roles: Vec<Role> = prompt.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
    }

    #[test]
    fn test_prompt_from_str_is_single_user_message() {
        let prompt: Prompt = "hello".into();
        assert_eq!(prompt.messages(), &[Message::user("hello")]);
    }
}
