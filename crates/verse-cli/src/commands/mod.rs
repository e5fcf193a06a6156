//! Slash commands for interactive mode

mod history;
mod status;

pub use history::HistoryCommand;
pub use status::StatusCommand;

use verse_ai::Model;
use verse_dialogue::{ConversationState, Stage};

const COMMAND_NAMES: &[&str] = &[
    "help", "h", "?", "status", "s", "history", "reset", "r", "save", "quit", "exit", "q",
];

/// What a command needs to look at
pub struct CommandContext<'a> {
    pub state: &'a ConversationState,
    pub session_key: &'a str,
    pub model: &'a Model,
    pub last_song: Option<&'a str>,
}

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the controller)
    Message(String),
    /// Abandon the current mix and start over
    Reset,
    /// Write the last generated song to a file
    Save(Option<String>),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Whether `input` should be handled as a slash command in `stage`.
///
/// While lyrics are being collected a leading `/` may be part of a lyric, so
/// only known command names are intercepted there.
pub fn is_command(input: &str, stage: Stage) -> bool {
    let Some(rest) = input.trim().strip_prefix('/') else {
        return false;
    };
    if stage != Stage::CollectingLyrics {
        return true;
    }
    let name = rest.split_whitespace().next().unwrap_or("").to_lowercase();
    COMMAND_NAMES.contains(&name.as_str())
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, ctx: &CommandContext<'_>) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "status" | "s" => StatusCommand::execute(ctx),

        "history" => HistoryCommand::execute(ctx.state),

        "reset" | "r" => CommandResult::Reset,

        "save" => CommandResult::Save((!args.is_empty()).then(|| args.to_string())),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /status, /s          Show session, model and mix progress
  /history             Show the conversation so far
  /reset, /r           Abandon the current mix and start over
  /save [path]         Save the last song (default: mixed_song.txt)
  /quit, /exit, /q     Exit verseforge

Paste multi-line lyrics between two lines containing only """.
While collecting lyrics, a line starting with / is sent as a lyric unless it
names a command above; wrap it in """ to be sure."#
        .to_string()
}
