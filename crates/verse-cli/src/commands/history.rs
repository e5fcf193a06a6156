//! /history command - replay the conversation

use super::CommandResult;
use crate::utils::truncate_chars;
use verse_dialogue::{ConversationState, Role};

const PREVIEW_CHARS: usize = 80;

pub struct HistoryCommand;

impl HistoryCommand {
    pub fn execute(state: &ConversationState) -> CommandResult {
        if state.history.is_empty() {
            return CommandResult::Message("No messages yet.".to_string());
        }

        let lines: Vec<String> = state
            .history
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let who = match message.role {
                    Role::User => "you",
                    Role::Assistant => "verseforge",
                };
                let first_line = message.content.lines().next().unwrap_or("");
                format!("[{}] {}: {}", i, who, truncate_chars(first_line, PREVIEW_CHARS))
            })
            .collect();

        CommandResult::Message(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        assert_eq!(
            HistoryCommand::execute(&ConversationState::new()),
            CommandResult::Message("No messages yet.".into())
        );
    }

    #[test]
    fn test_history_lists_first_lines_in_order() {
        let mut state = ConversationState::new();
        state.record(Role::User, "hi");
        state.record(Role::Assistant, "How many songs?\nPick 2 to 5.");

        let CommandResult::Message(text) = HistoryCommand::execute(&state) else {
            panic!("expected a message");
        };
        assert_eq!(text, "[0] you: hi\n[1] verseforge: How many songs?");
    }
}
