//! Core types used throughout the library.

pub mod message;
pub mod prompt;
pub mod request;
pub mod streaming;
pub mod usage;

// Re-export commonly used types
pub use message::*;
pub use prompt::*;
pub use request::*;
pub use streaming::*;
pub use usage::*;
