//! Ask an LLM a question from the command line.
//!
//! A prompt is turned into one chat-completion request for OpenRouter (or one
//! run of the Claude Code CLI), the answer is read either as a stream of
//! deltas or as a single body, and printed with a short metrics line.

pub mod accumulator;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod providers;
pub mod render;
pub mod response;
pub mod safety;
pub mod settings;
pub mod sse_stream;
pub mod types;

// Re-export core types for easy usage
pub use dispatcher::{Dispatcher, Query, SystemPrompt, DEFAULT_SYSTEM_PROMPT};
pub use error::Error;
pub use factory::{Backend, ProviderFactory};
pub use metrics::Metrics;
pub use models::{ClaudeModel, ModelAlias, DEFAULT_MODEL};
pub use provider::CompletionProvider;
pub use providers::*;
pub use render::Renderer;
pub use response::{Completion, EventStream, Response};
pub use settings::Settings;
pub use sse_stream::SseEvent;
pub use types::*;
