use ask::{Backend, ClaudeModel, ModelAlias, Query, Settings, SystemPrompt};
use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "ask",
    version,
    about = "Ask an LLM a question from the command line",
    long_about = "Send a prompt to OpenRouter (or the Claude Code CLI) and print the answer \
                  followed by a metrics line. The prompt is taken from the arguments; stdin is \
                  read only when no prompt arguments are given and it is piped.",
    group(
        ArgGroup::new("model_choice")
            .args(["coder", "gemini", "sonnet", "kimi", "qwen", "model"])
            .multiple(false)
    )
)]
pub struct Cli {
    /// Prompt text (quote it or pass several words)
    pub prompt: Vec<String>,

    /// Use inception/mercury-coder (the default)
    #[arg(short = ModelAlias::MercuryCoder.flag())]
    pub coder: bool,

    /// Use google/gemini-2.5-flash
    #[arg(short = ModelAlias::GeminiFlash.flag())]
    pub gemini: bool,

    /// Use anthropic/claude-sonnet-4
    #[arg(short = ModelAlias::ClaudeSonnet.flag())]
    pub sonnet: bool,

    /// Use moonshotai/kimi-k2
    #[arg(short = ModelAlias::KimiK2.flag())]
    pub kimi: bool,

    /// Use qwen/qwen3-235b-a22b-2507
    #[arg(short = ModelAlias::Qwen3.flag())]
    pub qwen: bool,

    /// Use any model id, e.g. openai/gpt-4o
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Print the answer as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Replace the default system prompt
    #[arg(long, value_name = "TEXT", conflicts_with = "no_system")]
    pub system: Option<String>,

    /// Send no system prompt at all
    #[arg(short = 'r', long = "no-system")]
    pub no_system: bool,

    /// Preferred upstream providers, in order (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub provider: Option<Vec<String>>,

    /// Answer with the Claude Code CLI instead of OpenRouter
    #[arg(long, conflicts_with_all = ["coder", "gemini", "sonnet", "kimi", "qwen"])]
    pub claude: bool,

    /// Claude model for the Claude Code CLI (implies --claude)
    #[arg(long, value_enum, conflicts_with = "model_choice")]
    pub claude_model: Option<ClaudeModel>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn model_alias(&self) -> Option<ModelAlias> {
        ModelAlias::ALL.into_iter().find(|alias| match alias {
            ModelAlias::MercuryCoder => self.coder,
            ModelAlias::GeminiFlash => self.gemini,
            ModelAlias::ClaudeSonnet => self.sonnet,
            ModelAlias::KimiK2 => self.kimi,
            ModelAlias::Qwen3 => self.qwen,
        })
    }

    /// Whether stdin has to be consulted for the prompt.
    pub fn wants_stdin(&self) -> bool {
        self.prompt.iter().all(|word| word.trim().is_empty())
    }

    /// The prompt words joined with spaces, or the piped input when no words
    /// were given. Piped input is ignored once there are words.
    pub fn prompt_text(&self, piped: Option<String>) -> Option<String> {
        let text = if self.wants_stdin() {
            piped?.trim().to_string()
        } else {
            self.prompt.join(" ").trim().to_string()
        };
        (!text.is_empty()).then_some(text)
    }

    /// Shorthand flags name OpenRouter models, so they cannot go to the
    /// Claude CLI even when the backend came from the environment.
    pub fn check_backend(&self, backend: Backend) -> Result<(), clap::Error> {
        match (backend, self.model_alias()) {
            (Backend::Claude, Some(alias)) => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                format!(
                    "-{} selects the OpenRouter model {} but the backend is claude; \
                     use --claude-model or -m instead",
                    alias.flag(),
                    alias.model_id()
                ),
            )),
            _ => Ok(()),
        }
    }

    /// Flags take priority over environment and config file values.
    pub fn apply_to(&self, settings: &mut Settings) {
        if self.claude || self.claude_model.is_some() {
            settings.backend = Backend::Claude;
        }
        if let Some(model) = self.claude_model {
            settings.claude_model = model;
        }
        if let Some(secs) = self.timeout {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(order) = &self.provider {
            settings.provider_order = Some(order.clone());
        }
    }

    fn system_prompt(&self) -> SystemPrompt {
        match (&self.system, self.no_system) {
            (_, true) => SystemPrompt::Disabled,
            (Some(text), false) => SystemPrompt::Custom(text.clone()),
            (None, false) => SystemPrompt::Default,
        }
    }

    pub fn query(&self, prompt: String, settings: &Settings) -> Query {
        let explicit = self
            .model
            .as_deref()
            .or_else(|| self.model_alias().map(ModelAlias::model_id));

        Query::new(prompt, settings.resolve_model(explicit))
            .system(self.system_prompt())
            .provider_order(settings.provider_order.clone())
            .stream(self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ask").chain(args.iter().copied()))
    }

    #[test]
    fn test_shorthand_flags_select_models() {
        let settings = Settings::default();
        let cli = parse(&["-g", "what", "is", "rust"]).unwrap();
        let query = cli.query("what is rust".into(), &settings);
        assert_eq!(query.model, "google/gemini-2.5-flash");

        let query = parse(&["hello"]).unwrap().query("hello".into(), &settings);
        assert_eq!(query.model, ask::DEFAULT_MODEL);
    }

    #[test]
    fn test_unknown_flags_are_rejected() {
        assert_eq!(parse(&["-x", "hi"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_model_flags_are_mutually_exclusive() {
        assert_eq!(
            parse(&["-g", "-s", "hi"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
        assert_eq!(
            parse(&["-m", "openai/gpt-4o", "-k", "hi"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_system_prompt_flags() {
        let settings = Settings::default();
        let query = parse(&["-r", "hi"]).unwrap().query("hi".into(), &settings);
        assert_eq!(query.system, SystemPrompt::Disabled);

        let cli = parse(&["--system", "Be terse", "hi"]).unwrap();
        let query = cli.query("hi".into(), &settings);
        assert_eq!(query.system, SystemPrompt::Custom("Be terse".to_string()));

        assert!(parse(&["--system", "x", "-r", "hi"]).is_err());
    }

    #[test]
    fn test_provider_order_and_stream() {
        let cli = parse(&["--stream", "--provider", "Groq,Cerebras", "hi"]).unwrap();
        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        let query = cli.query("hi".into(), &settings);
        assert!(query.stream);
        assert_eq!(
            query.provider_order,
            Some(vec!["Groq".to_string(), "Cerebras".to_string()])
        );
    }

    #[test]
    fn test_claude_model_implies_claude_backend() {
        let cli = parse(&["--claude-model", "opus", "hi"]).unwrap();
        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        assert_eq!(settings.backend, Backend::Claude);
        assert_eq!(cli.query("hi".into(), &settings).model, "opus");
    }

    #[test]
    fn test_claude_rejects_openrouter_shorthands() {
        assert!(parse(&["--claude", "-g", "hi"]).is_err());
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(parse(&["--timeout", "0", "hi"]).is_err());
        let cli = parse(&["--timeout", "30", "hi"]).unwrap();
        let mut settings = Settings::default();
        cli.apply_to(&mut settings);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_prompt_words_take_priority_over_piped_input() {
        let cli = parse(&["What", "is", "2+2?"]).unwrap();
        assert!(!cli.wants_stdin());
        assert_eq!(
            cli.prompt_text(Some("second\nthird\n".to_string())).as_deref(),
            Some("What is 2+2?")
        );
        assert_eq!(cli.prompt_text(None).as_deref(), Some("What is 2+2?"));
    }

    #[test]
    fn test_piped_input_is_used_without_prompt_words() {
        let cli = parse(&["-g"]).unwrap();
        assert!(cli.wants_stdin());
        assert_eq!(
            cli.prompt_text(Some("  explain this diff\n".to_string())).as_deref(),
            Some("explain this diff")
        );
        assert_eq!(cli.prompt_text(Some("\n\n".to_string())), None);
        assert_eq!(cli.prompt_text(None), None);
    }

    #[test]
    fn test_shorthand_rejected_when_backend_is_claude() {
        let cli = parse(&["-g", "hi"]).unwrap();
        assert!(cli.check_backend(Backend::OpenRouter).is_ok());

        let err = cli.check_backend(Backend::Claude).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);

        // A custom model id is passed through to the Claude CLI
        let cli = parse(&["-m", "claude-opus-4-1", "hi"]).unwrap();
        assert!(cli.check_backend(Backend::Claude).is_ok());
    }
}
