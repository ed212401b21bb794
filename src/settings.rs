//! Runtime configuration, assembled once at startup and passed down
//! explicitly.
//!
//! Sources, highest priority first: command-line flags (applied by the
//! binary), environment variables, `~/.ask/config`, built-in defaults.
//! The config file holds `key=value` lines:
//!
//! ```text
//! default_model=google/gemini-2.5-flash
//! claude_model=opus
//! backend=openrouter
//! timeout=90
//! provider_order=Groq,Cerebras
//! ```
//!
//! A `default_model` of `haiku`, `sonnet` or `opus` is taken as the Claude
//! model when `claude_model` is not set.

use crate::factory::Backend;
use crate::models::{ClaudeModel, DEFAULT_MODEL};
use crate::providers::claude_cli::DEFAULT_PROGRAM;
use crate::providers::openrouter::DEFAULT_BASE_URL;
use crate::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Only read from the environment, never from the config file.
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub claude_model: ClaudeModel,
    pub backend: Backend,
    pub timeout: Duration,
    pub provider_order: Option<Vec<String>>,
    pub claude_program: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            claude_model: ClaudeModel::default(),
            backend: Backend::default(),
            timeout: DEFAULT_TIMEOUT,
            provider_order: None,
            claude_program: PathBuf::from(DEFAULT_PROGRAM),
        }
    }
}

impl Settings {
    /// `~/.ask/config`
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".ask").join("config"))
    }

    /// Load from the process environment and the user's config file.
    pub fn load() -> Result<Self, Error> {
        let file = match Self::config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => HashMap::new(),
        };
        Self::from_sources(|key| std::env::var(key).ok(), &file)
    }

    /// Build settings from an environment lookup and parsed config entries.
    pub fn from_sources<F>(env: F, file: &HashMap<String, String>) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str, key: &str| {
            env(var)
                .or_else(|| file.get(key).cloned())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Settings {
            api_key: env(API_KEY_VAR).filter(|key| !key.is_empty()),
            ..Settings::default()
        };

        if let Some(base_url) = lookup("ASK_BASE_URL", "base_url") {
            settings.base_url = base_url;
        }
        if let Some(model) = lookup("ASK_DEFAULT_MODEL", "default_model") {
            settings.default_model = model;
        }
        match lookup("ASK_CLAUDE_MODEL", "claude_model") {
            Some(model) => match model.parse() {
                Ok(model) => settings.claude_model = model,
                Err(e) => warn!("{e}; using {}", settings.claude_model),
            },
            // `default_model=haiku` names a Claude model, not an OpenRouter one
            None => {
                if let Ok(model) = settings.default_model.parse::<ClaudeModel>() {
                    debug!(%model, "default_model names a Claude model");
                    settings.claude_model = model;
                    settings.default_model = DEFAULT_MODEL.to_string();
                }
            }
        }
        if let Some(backend) = lookup("ASK_BACKEND", "backend") {
            settings.backend = backend.parse()?;
        }
        if let Some(timeout) = lookup("ASK_TIMEOUT", "timeout") {
            settings.timeout = parse_timeout(&timeout)?;
        }
        if let Some(order) = lookup("ASK_PROVIDER_ORDER", "provider_order") {
            settings.provider_order = Some(parse_provider_order(&order));
        }
        if let Some(program) = lookup("ASK_CLAUDE_PATH", "claude_path") {
            settings.claude_program = PathBuf::from(program);
        }

        debug!(
            backend = ?settings.backend,
            default_model = %settings.default_model,
            timeout_secs = settings.timeout.as_secs(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// The model to request: an explicit choice, otherwise the backend's default.
    pub fn resolve_model(&self, explicit: Option<&str>) -> String {
        match (explicit, self.backend) {
            (Some(model), _) => model.to_string(),
            (None, Backend::OpenRouter) => self.default_model.clone(),
            (None, Backend::Claude) => self.claude_model.to_string(),
        }
    }
}

/// Read `key=value` lines; keys are case-insensitive.
pub fn read_config_file(path: &Path) -> Result<HashMap<String, String>, Error> {
    let entries = dotenvy::from_path_iter(path)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;

    entries
        .map(|entry| {
            entry
                .map(|(key, value)| (key.to_lowercase(), value))
                .map_err(|e| Error::config(format!("invalid config file {}: {e}", path.display())))
        })
        .collect()
}

pub fn parse_timeout(value: &str) -> Result<Duration, Error> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::config(format!(
            "timeout must be a positive number of seconds, got '{value}'"
        ))),
    }
}

/// Split a comma-separated provider list, dropping blanks.
pub fn parse_provider_order(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
