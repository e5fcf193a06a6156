//! verse-ai: text generation client
//!
//! This crate provides a small interface for asking an OpenAI-compatible
//! chat model to turn a system instruction plus one user payload into text.

pub mod error;
pub mod models;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, FailureKind, Result};
pub use providers::TextGenerator;
pub use stream::MessageEventStream;
pub use types::*;
