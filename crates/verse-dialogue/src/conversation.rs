//! Conversation state: wizard stage, collected lyrics, and display history.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fewest songs a mix may combine
pub const MIN_SONGS: u8 = 2;
/// Most songs a mix may combine
pub const MAX_SONGS: u8 = 5;

/// Who said a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Step of the collection wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Start,
    AwaitingCount,
    CollectingLyrics,
    AwaitingDirection,
}

/// Per-session dialogue state, passed into and returned from every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub stage: Stage,
    /// How many lyric sets to collect; unset until a count is accepted
    #[serde(default)]
    pub target_count: Option<u8>,
    /// Lyric sets in submission order
    #[serde(default)]
    pub collected_lyrics: Vec<String>,
    /// Everything rendered so far; never read by the state machine
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the display history and return a copy of it
    pub fn record(&mut self, role: Role, content: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(role, content);
        self.history.push(message.clone());
        message
    }

    /// Drop the current cycle's data and go back to `Start`. History is kept.
    pub fn restart(&mut self) {
        self.stage = Stage::Start;
        self.target_count = None;
        self.collected_lyrics.clear();
    }

    /// Check the structural invariants that tie stage, target and lyrics together.
    pub fn check_invariants(&self) -> Result<()> {
        let collected = self.collected_lyrics.len();

        if let Some(target) = self.target_count {
            if !(MIN_SONGS..=MAX_SONGS).contains(&target) {
                return Err(Error::StateCorruption(format!(
                    "target count {} outside {}..={}",
                    target, MIN_SONGS, MAX_SONGS
                )));
            }
            if collected > target as usize {
                return Err(Error::StateCorruption(format!(
                    "{} lyric sets collected for a target of {}",
                    collected, target
                )));
            }
        }

        match (self.stage, self.target_count) {
            (Stage::Start | Stage::AwaitingCount, Some(target)) => Err(Error::StateCorruption(
                format!("{:?} stage carries a target count of {}", self.stage, target),
            )),
            (Stage::Start | Stage::AwaitingCount, None) if collected > 0 => {
                Err(Error::StateCorruption(format!(
                    "{:?} stage carries {} lyric sets",
                    self.stage, collected
                )))
            }
            (Stage::CollectingLyrics | Stage::AwaitingDirection, None) => Err(
                Error::StateCorruption(format!("{:?} stage has no target count", self.stage)),
            ),
            (Stage::CollectingLyrics, Some(target)) if collected >= target as usize => {
                Err(Error::StateCorruption(format!(
                    "still collecting with {} of {} lyric sets",
                    collected, target
                )))
            }
            (Stage::AwaitingDirection, Some(target)) if collected != target as usize => {
                Err(Error::StateCorruption(format!(
                    "awaiting direction with {} of {} lyric sets",
                    collected, target
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting(target: u8, lyrics: &[&str]) -> ConversationState {
        ConversationState {
            stage: Stage::CollectingLyrics,
            target_count: Some(target),
            collected_lyrics: lyrics.iter().map(|s| s.to_string()).collect(),
            history: vec![],
        }
    }

    #[test]
    fn test_new_state_starts_clean() {
        let state = ConversationState::new();
        assert_eq!(state.stage, Stage::Start);
        assert!(state.target_count.is_none());
        assert!(state.collected_lyrics.is_empty());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_record_appends_to_history() {
        let mut state = ConversationState::new();
        let msg = state.record(Role::Assistant, "hello");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(state.history, vec![msg]);
    }

    #[test]
    fn test_restart_keeps_history() {
        let mut state = collecting(3, &["a", "b"]);
        state.record(Role::User, "b");
        state.restart();
        assert_eq!(state.stage, Stage::Start);
        assert!(state.target_count.is_none());
        assert!(state.collected_lyrics.is_empty());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_valid_collecting_state() {
        assert!(collecting(3, &[]).check_invariants().is_ok());
        assert!(collecting(3, &["a", "b"]).check_invariants().is_ok());
    }

    #[test]
    fn test_rejects_target_out_of_range() {
        assert!(collecting(1, &[]).check_invariants().is_err());
        assert!(collecting(6, &[]).check_invariants().is_err());
    }

    #[test]
    fn test_rejects_lyrics_over_target() {
        let mut state = collecting(2, &["a", "b", "c"]);
        state.stage = Stage::AwaitingDirection;
        assert!(matches!(
            state.check_invariants(),
            Err(Error::StateCorruption(_))
        ));
    }

    #[test]
    fn test_rejects_full_collecting_stage() {
        assert!(collecting(2, &["a", "b"]).check_invariants().is_err());
    }

    #[test]
    fn test_rejects_short_awaiting_direction() {
        let mut state = collecting(3, &["a"]);
        state.stage = Stage::AwaitingDirection;
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_rejects_target_before_count_accepted() {
        let mut state = ConversationState::new();
        state.target_count = Some(3);
        assert!(state.check_invariants().is_err());

        let mut state = ConversationState::new();
        state.stage = Stage::AwaitingCount;
        state.collected_lyrics.push("stray".into());
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_rejects_missing_target() {
        let state = ConversationState {
            stage: Stage::CollectingLyrics,
            ..Default::default()
        };
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut state = collecting(3, &["first verse"]);
        state.record(Role::User, "first verse");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"stage\":\"collecting_lyrics\""));
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_unknown_stage_fails_to_deserialize() {
        let json = r#"{"stage":"mixing","target_count":null,"collected_lyrics":[],"history":[]}"#;
        assert!(serde_json::from_str::<ConversationState>(json).is_err());
    }
}
