//! Text generation providers

pub mod openai;

use crate::{Generation, GenerationRequest, Result};
use async_trait::async_trait;

/// Anything that turns a system instruction plus a user payload into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one generation to completion
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation>;
}
