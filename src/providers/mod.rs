//! Backend implementations.

pub mod claude_cli;
pub mod openrouter;

pub use claude_cli::ClaudeCliProvider;
pub use openrouter::OpenRouterProvider;
