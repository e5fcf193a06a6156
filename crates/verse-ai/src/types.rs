//! Core types for text generation requests

use serde::{Deserialize, Serialize};

/// Known OpenAI-compatible providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Groq,
    OpenRouter,
    Ollama,
    Custom,
}

impl Provider {
    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Groq => "Groq",
            Provider::OpenRouter => "OpenRouter",
            Provider::Ollama => "Ollama",
            Provider::Custom => "Custom",
        }
    }

    /// Identifier used in config files and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::Custom => "custom",
        }
    }

    /// Parse a provider identifier, falling back to `Custom`
    pub fn from_id(id: &str) -> Self {
        match id.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "groq" => Provider::Groq,
            "openrouter" => Provider::OpenRouter,
            "ollama" => Provider::Ollama,
            _ => Provider::Custom,
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
            Provider::Ollama => None,
            Provider::Custom => None,
        }
    }

    /// Default chat-completions base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Ollama => "http://localhost:11434/v1",
            Provider::Custom => "",
        }
    }

    /// Whether requests must carry a bearer token
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env_var().is_some()
    }
}

/// Model definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier (e.g., "gpt-4o-mini")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Provider
    pub provider: Provider,
    /// Base URL for API calls
    pub base_url: String,
    /// Maximum output tokens
    pub max_tokens: u32,
}

impl Model {
    /// Build a model for an id the registry does not know about
    pub fn custom(provider: Provider, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            provider,
            base_url: provider.default_base_url().to_string(),
            max_tokens: 4096,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    Stop,
    /// Maximum tokens reached
    Length,
    /// Provider content filter cut the response
    ContentFilter,
}

/// A single generation request: system instructions plus one user payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub instructions: String,
    pub payload: String,
}

impl GenerationRequest {
    pub fn new(instructions: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            payload: payload.into(),
        }
    }
}

/// Successful generation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Model that produced it, when the provider reports one
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Usage,
    pub stop_reason: Option<StopReason>,
}

impl Generation {
    /// Create a generation with only text (handy for stubs)
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            usage: Usage::default(),
            stop_reason: Some(StopReason::Stop),
        }
    }
}

/// Sampling options sent with each request
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Maximum tokens to generate (defaults to the model limit)
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids_round_trip() {
        for p in [
            Provider::OpenAI,
            Provider::Groq,
            Provider::OpenRouter,
            Provider::Ollama,
        ] {
            assert_eq!(Provider::from_id(p.id()), p);
        }
        assert_eq!(Provider::from_id("something-else"), Provider::Custom);
        assert_eq!(Provider::from_id("OpenAI"), Provider::OpenAI);
    }

    #[test]
    fn test_local_providers_need_no_key() {
        assert!(Provider::OpenAI.requires_api_key());
        assert!(!Provider::Ollama.requires_api_key());
        assert!(!Provider::Custom.requires_api_key());
    }

    #[test]
    fn test_custom_model_uses_provider_base_url() {
        let model = Model::custom(Provider::Groq, "llama-3.3-70b-versatile");
        assert_eq!(model.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(model.name, "llama-3.3-70b-versatile");
    }
}
