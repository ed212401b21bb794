//! OpenRouter chat-completions backend.

pub mod client;
pub mod types;

pub use client::{OpenRouterProvider, DEFAULT_BASE_URL};
