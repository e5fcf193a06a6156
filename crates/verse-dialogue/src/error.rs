//! Error types for verse-dialogue

use thiserror::Error;

/// Result type alias using verse-dialogue Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a dialogue
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the text generation layer
    #[error(transparent)]
    Ai(#[from] verse_ai::Error),

    /// Conversation state broke one of its invariants
    #[error("State corruption: {0}")]
    StateCorruption(String),

    /// The interaction surface could not persist state
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Input rejected before reaching the generator
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Classify the failure the way the generator layer does
    pub fn failure_kind(&self) -> verse_ai::FailureKind {
        match self {
            Error::Ai(e) => e.kind(),
            _ => verse_ai::FailureKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verse_ai::FailureKind;

    #[test]
    fn test_ai_errors_keep_their_kind() {
        let e: Error = verse_ai::Error::InvalidApiKey.into();
        assert_eq!(e.failure_kind(), FailureKind::AuthRejected);
        assert_eq!(e.to_string(), "Invalid or missing API key");
    }

    #[test]
    fn test_local_errors_are_other() {
        assert_eq!(
            Error::InvalidInput("blank".into()).failure_kind(),
            FailureKind::Other
        );
    }
}
