//! Model registry with public lookup API.

use crate::{Model, Provider};

struct ModelEntry {
    id: &'static str,
    name: &'static str,
    provider: Provider,
    max_tokens: u32,
}

const MODEL_ENTRIES: &[ModelEntry] = &[
    ModelEntry {
        id: "gpt-4o-mini",
        name: "GPT-4o mini",
        provider: Provider::OpenAI,
        max_tokens: 16384,
    },
    ModelEntry {
        id: "gpt-4o",
        name: "GPT-4o",
        provider: Provider::OpenAI,
        max_tokens: 16384,
    },
    ModelEntry {
        id: "gpt-4.1-mini",
        name: "GPT-4.1 mini",
        provider: Provider::OpenAI,
        max_tokens: 32768,
    },
    ModelEntry {
        id: "llama-3.3-70b-versatile",
        name: "Llama 3.3 70B",
        provider: Provider::Groq,
        max_tokens: 32768,
    },
    ModelEntry {
        id: "openai/gpt-4o-mini",
        name: "GPT-4o mini (OpenRouter)",
        provider: Provider::OpenRouter,
        max_tokens: 16384,
    },
    ModelEntry {
        id: "llama3.2",
        name: "Llama 3.2 (local)",
        provider: Provider::Ollama,
        max_tokens: 4096,
    },
];

/// Model used when neither flags nor config pick one
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

impl ModelEntry {
    fn to_model(&self) -> Model {
        Model {
            id: self.id.to_string(),
            name: self.name.to_string(),
            provider: self.provider,
            base_url: self.provider.default_base_url().to_string(),
            max_tokens: self.max_tokens,
        }
    }
}

/// Look up a model by provider and ID.
pub fn get_model(provider: Provider, id: &str) -> Option<Model> {
    MODEL_ENTRIES
        .iter()
        .find(|e| e.id == id && e.provider == provider)
        .map(|e| e.to_model())
}

/// Resolve a model for a provider, constructing one for unknown ids.
pub fn resolve(provider: Provider, id: &str) -> Model {
    get_model(provider, id).unwrap_or_else(|| Model::custom(provider, id))
}
