//! Streaming event types and utilities

use crate::error::{Error, FailureKind, Result};
use crate::types::{Generation, StopReason, Usage};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted while a completion streams in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// The provider accepted the request
    Start { model: String },
    /// Text content delta
    TextDelta { delta: String },
    /// Completion finished
    Done {
        text: String,
        stop_reason: StopReason,
        usage: Usage,
    },
    /// Error occurred; the stream ends after this
    Error { kind: FailureKind, message: String },
}

impl MessageEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageEvent::Done { .. } | MessageEvent::Error { .. })
    }
}

/// A stream of message events
pub type MessageEventStream = Pin<Box<dyn Stream<Item = MessageEvent> + Send>>;

/// Accumulates streamed deltas into a finished [`Generation`]
#[derive(Debug, Default)]
pub struct TextBuilder {
    model: Option<String>,
    text: String,
    usage: Usage,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a streaming event. Errors end the build immediately.
    pub fn process_event(&mut self, event: MessageEvent) -> Result<()> {
        match event {
            MessageEvent::Start { model } => {
                self.model = Some(model);
            }
            MessageEvent::TextDelta { delta } => {
                self.text.push_str(&delta);
            }
            MessageEvent::Done {
                text,
                stop_reason,
                usage,
            } => {
                // The final text is authoritative; deltas may have been dropped
                if !text.is_empty() {
                    self.text = text;
                }
                self.stop_reason = Some(stop_reason);
                self.usage = usage;
                self.finished = true;
            }
            MessageEvent::Error { kind, message } => {
                return Err(Error::Stream { kind, message });
            }
        }
        Ok(())
    }

    /// Finish the build
    pub fn build(self) -> Result<Generation> {
        if !self.finished {
            return Err(Error::Stream {
                kind: FailureKind::Provider,
                message: "stream ended before the completion finished".to_string(),
            });
        }
        if self.text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(Generation {
            text: self.text,
            model: self.model,
            usage: self.usage,
            stop_reason: self.stop_reason,
        })
    }
}

/// Drain a stream into a single generation
pub async fn collect(mut stream: MessageEventStream) -> Result<Generation> {
    let mut builder = TextBuilder::new();
    while let Some(event) = stream.next().await {
        let terminal = event.is_terminal();
        builder.process_event(event)?;
        if terminal {
            break;
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(events: Vec<MessageEvent>) -> MessageEventStream {
        Box::pin(futures::stream::iter(events))
    }

    fn done(text: &str) -> MessageEvent {
        MessageEvent::Done {
            text: text.to_string(),
            stop_reason: StopReason::Stop,
            usage: Usage {
                input: 10,
                output: 3,
            },
        }
    }

    #[tokio::test]
    async fn test_collect_joins_deltas() {
        let stream = stream_of(vec![
            MessageEvent::Start {
                model: "gpt-4o-mini".into(),
            },
            MessageEvent::TextDelta {
                delta: "Verse ".into(),
            },
            MessageEvent::TextDelta { delta: "1".into() },
            done(""),
        ]);

        let generation = collect(stream).await.unwrap();
        assert_eq!(generation.text, "Verse 1");
        assert_eq!(generation.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(generation.usage.output, 3);
    }

    #[tokio::test]
    async fn test_done_text_wins_over_deltas() {
        let stream = stream_of(vec![
            MessageEvent::TextDelta {
                delta: "partial".into(),
            },
            done("complete text"),
        ]);
        assert_eq!(collect(stream).await.unwrap().text, "complete text");
    }

    #[tokio::test]
    async fn test_error_event_surfaces_kind() {
        let stream = stream_of(vec![
            MessageEvent::TextDelta {
                delta: "half".into(),
            },
            MessageEvent::Error {
                kind: FailureKind::AuthRejected,
                message: "401".into(),
            },
        ]);
        let err = collect(stream).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::AuthRejected);
    }

    #[tokio::test]
    async fn test_blank_completion_is_empty_response() {
        let stream = stream_of(vec![
            MessageEvent::TextDelta { delta: "  \n".into() },
            done(""),
        ]);
        let err = collect(stream).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResponse);
    }

    #[tokio::test]
    async fn test_truncated_stream_is_provider_error() {
        let stream = stream_of(vec![MessageEvent::TextDelta {
            delta: "no done event".into(),
        }]);
        let err = collect(stream).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Provider);
    }

    #[test]
    fn test_terminal_events() {
        assert!(done("x").is_terminal());
        assert!(
            MessageEvent::Error {
                kind: FailureKind::Other,
                message: String::new()
            }
            .is_terminal()
        );
        assert!(!MessageEvent::TextDelta { delta: "x".into() }.is_terminal());
    }
}
