//! Model shorthands.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// Model used when no flag, environment variable or config entry picks one.
pub const DEFAULT_MODEL: &str = "inception/mercury-coder";

/// Single-letter OpenRouter model shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAlias {
    MercuryCoder,
    GeminiFlash,
    ClaudeSonnet,
    KimiK2,
    Qwen3,
}

impl ModelAlias {
    pub const ALL: [ModelAlias; 5] = [
        ModelAlias::MercuryCoder,
        ModelAlias::GeminiFlash,
        ModelAlias::ClaudeSonnet,
        ModelAlias::KimiK2,
        ModelAlias::Qwen3,
    ];

    pub fn flag(self) -> char {
        match self {
            ModelAlias::MercuryCoder => 'c',
            ModelAlias::GeminiFlash => 'g',
            ModelAlias::ClaudeSonnet => 's',
            ModelAlias::KimiK2 => 'k',
            ModelAlias::Qwen3 => 'q',
        }
    }

    pub fn model_id(self) -> &'static str {
        match self {
            ModelAlias::MercuryCoder => DEFAULT_MODEL,
            ModelAlias::GeminiFlash => "google/gemini-2.5-flash",
            ModelAlias::ClaudeSonnet => "anthropic/claude-sonnet-4",
            ModelAlias::KimiK2 => "moonshotai/kimi-k2",
            ModelAlias::Qwen3 => "qwen/qwen3-235b-a22b-2507",
        }
    }
}

/// Models accepted by the Claude Code CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClaudeModel {
    Haiku,
    #[default]
    Sonnet,
    Opus,
}

impl ClaudeModel {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaudeModel::Haiku => "haiku",
            ClaudeModel::Sonnet => "sonnet",
            ClaudeModel::Opus => "opus",
        }
    }
}

impl fmt::Display for ClaudeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaudeModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haiku" => Ok(ClaudeModel::Haiku),
            "sonnet" => Ok(ClaudeModel::Sonnet),
            "opus" => Ok(ClaudeModel::Opus),
            other => Err(format!(
                "unknown Claude model '{other}' (expected haiku, sonnet or opus)"
            )),
        }
    }
}
