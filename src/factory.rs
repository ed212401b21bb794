use crate::settings::{Settings, API_KEY_VAR};
use crate::{ClaudeCliProvider, CompletionProvider, Error, OpenRouterProvider};
use std::str::FromStr;

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    OpenRouter,
    Claude,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(Backend::OpenRouter),
            "claude" => Ok(Backend::Claude),
            other => Err(Error::config(format!(
                "Invalid backend '{other}'. Valid values are: openrouter, claude"
            ))),
        }
    }
}

/// Factory for creating providers.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider selected by `settings`.
    ///
    /// The OpenRouter credential is checked here, before any network call.
    pub fn create(settings: &Settings) -> Result<Box<dyn CompletionProvider>, Error> {
        match settings.backend {
            Backend::OpenRouter => {
                let api_key = settings.api_key.clone().ok_or_else(|| {
                    Error::config(format!("{API_KEY_VAR} environment variable is not set"))
                })?;
                let provider = OpenRouterProvider::new_with_base_url(
                    api_key,
                    settings.base_url.clone(),
                    settings.timeout,
                )?;
                Ok(Box::new(provider))
            }
            Backend::Claude => Ok(Box::new(ClaudeCliProvider::with_program(
                settings.claude_program.clone(),
                settings.timeout,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("OpenRouter".parse::<Backend>().unwrap(), Backend::OpenRouter);
        assert_eq!("claude".parse::<Backend>().unwrap(), Backend::Claude);
        assert!(matches!("gemini".parse::<Backend>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        let settings = Settings::default();
        match ProviderFactory::create(&settings) {
            Err(Error::Config(message)) => assert!(message.contains(API_KEY_VAR)),
            Err(other) => panic!("expected config error, got {other:?}"),
            Ok(_) => panic!("expected config error"),
        }
    }

    #[test]
    fn test_creates_selected_backend() {
        let settings = Settings {
            api_key: Some("sk-or-test".to_string()),
            ..Settings::default()
        };
        assert_eq!(ProviderFactory::create(&settings).unwrap().name(), "OpenRouter");

        let settings = Settings {
            backend: Backend::Claude,
            ..Settings::default()
        };
        assert_eq!(ProviderFactory::create(&settings).unwrap().name(), "Claude Code");
    }
}
