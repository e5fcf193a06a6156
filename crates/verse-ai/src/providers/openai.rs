//! OpenAI-compatible Chat Completions provider
//!
//! Works against OpenAI itself and any service exposing the same
//! `/chat/completions` streaming endpoint (Groq, OpenRouter, Ollama).

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::{
    error::{Error, FailureKind, Result, status_kind},
    stream::{MessageEvent, MessageEventStream, collect},
    types::{GenerateOptions, Generation, GenerationRequest, Model, Provider, StopReason, Usage},
};

/// OpenAI-compatible API client bound to one model
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: Model,
    options: GenerateOptions,
}

impl OpenAIProvider {
    /// Create a provider; `api_key` may be `None` for local providers
    pub fn new(api_key: Option<String>, model: Model) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            options: GenerateOptions::default(),
        }
    }

    /// Set sampling options
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Stream a completion for one request
    pub async fn stream(&self, request: &GenerationRequest) -> Result<MessageEventStream> {
        if self.model.base_url.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "no base URL configured for model {}",
                self.model.id
            )));
        }

        let body = build_request(&self.model, &self.options, request);
        let url = format!(
            "{}/chat/completions",
            self.model.base_url.trim_end_matches('/')
        );

        let mut headers = HeaderMap::new();
        match self.api_key {
            Some(ref key) => {
                let value = format!("Bearer {}", key)
                    .parse::<HeaderValue>()
                    .map_err(|e| Error::InvalidConfig(format!("invalid API key: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
            None if self.model.provider.requires_api_key() => return Err(Error::InvalidApiKey),
            None => {}
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            model = %self.model.id,
            provider = self.model.provider.name(),
            payload_chars = request.payload.chars().count(),
            "starting chat completion"
        );

        let request_builder = self.client.post(&url).headers(headers).json(&body);
        let event_source = EventSource::new(request_builder).map_err(|e| {
            Error::InvalidConfig(format!("Failed to create event source: {}", e))
        })?;

        Ok(Box::pin(create_stream(event_source, self.model.id.clone())))
    }
}

#[async_trait]
impl TextGenerator for OpenAIProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        let events = self.stream(request).await?;
        let generation = collect(events).await?;
        tracing::debug!(
            model = %self.model.id,
            input_tokens = generation.usage.input,
            output_tokens = generation.usage.output,
            "chat completion finished"
        );
        Ok(generation)
    }
}

fn build_request(
    model: &Model,
    options: &GenerateOptions,
    request: &GenerationRequest,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(2);
    if !request.instructions.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: request.instructions.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.payload.clone(),
    });

    ChatRequest {
        model: model.id.clone(),
        messages,
        stream: true,
        max_tokens: Some(options.max_tokens.unwrap_or(model.max_tokens)),
        temperature: options.temperature,
        // Only OpenAI reliably accepts stream_options
        stream_options: (model.provider == Provider::OpenAI).then_some(StreamOptions {
            include_usage: true,
        }),
    }
}

/// Pull a readable message out of an error body
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

fn create_stream(
    mut event_source: EventSource,
    model_id: String,
) -> impl futures::Stream<Item = MessageEvent> {
    stream! {
        let mut accumulated_text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut usage = Usage::default();

        yield MessageEvent::Start { model: model_id.clone() };

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data == "[DONE]" {
                        break;
                    }

                    match serde_json::from_str::<StreamChunk>(&msg.data) {
                        Ok(chunk) => {
                            for choice in &chunk.choices {
                                if let Some(ref content) = choice.delta.content {
                                    if !content.is_empty() {
                                        accumulated_text.push_str(content);
                                        yield MessageEvent::TextDelta { delta: content.clone() };
                                    }
                                }
                                if let Some(ref reason) = choice.finish_reason {
                                    finish_reason = Some(reason.clone());
                                }
                            }

                            if let Some(ref stream_usage) = chunk.usage {
                                usage.input = stream_usage.prompt_tokens;
                                usage.output = stream_usage.completion_tokens;
                            }
                        }
                        Err(e) => {
                            yield MessageEvent::Error {
                                kind: FailureKind::Provider,
                                message: format!("Failed to parse chunk: {}", e),
                            };
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(status = %status, "provider rejected chat completion");
                    yield MessageEvent::Error {
                        kind: status_kind(status.as_u16()),
                        message: format!("HTTP {}: {}", status, extract_error_message(&body)),
                    };
                    return;
                }
                Err(reqwest_eventsource::Error::Transport(e)) => {
                    let kind = if e.is_timeout() {
                        FailureKind::Timeout
                    } else {
                        FailureKind::Transport
                    };
                    yield MessageEvent::Error { kind, message: format!("Transport error: {}", e) };
                    return;
                }
                Err(e) => {
                    yield MessageEvent::Error {
                        kind: FailureKind::Provider,
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }

        yield MessageEvent::Done {
            text: accumulated_text,
            stop_reason: parse_finish_reason(finish_reason.as_deref()),
            usage,
        };
    }
}

fn parse_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("length") => StopReason::Length,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::Stop,
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// Streaming response types

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
