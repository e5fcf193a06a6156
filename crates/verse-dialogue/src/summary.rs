//! One-shot article summarization.

use std::sync::Arc;
use std::time::Duration;

use verse_ai::{GenerationRequest, TextGenerator};

use crate::controller::{DEFAULT_GENERATION_TIMEOUT, generate_with_timeout};
use crate::error::{Error, Result};
use crate::prompts;

/// Turns an article into a structured summary with a single generation call.
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    instructions: String,
    timeout: Option<Duration>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            instructions: prompts::SUMMARY_INSTRUCTIONS.to_string(),
            timeout: Some(DEFAULT_GENERATION_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Summarize `article`. Blank input is rejected without calling the generator.
    pub async fn summarize(&self, article: &str) -> Result<String> {
        if article.trim().is_empty() {
            return Err(Error::InvalidInput("article text is empty".to_string()));
        }

        let request = GenerationRequest::new(
            self.instructions.clone(),
            prompts::summary_payload(article),
        );
        tracing::info!(chars = article.len(), "summarizing article");

        let generation = generate_with_timeout(self.generator.as_ref(), &request, self.timeout)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "summary generation failed"))?;
        Ok(generation.text)
    }
}
