//! verse-dialogue: lyric collection dialogue
//!
//! This crate provides the turn-based controller that collects several
//! songs' lyrics, asks for a creative direction and has a text generator
//! merge them, plus the surface abstraction that drives it.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod prompts;
pub mod summary;
pub mod surface;

pub use controller::{
    ControllerConfig, CountRejection, DialogueController, FailurePolicy, Turn, TurnOutcome,
    parse_count,
};
pub use conversation::{ChatMessage, ConversationState, MAX_SONGS, MIN_SONGS, Role, Stage};
pub use error::{Error, Result};
pub use summary::Summarizer;
pub use surface::{InteractionSurface, SessionSummary, run_session, run_turn};
