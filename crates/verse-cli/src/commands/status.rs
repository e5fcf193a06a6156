//! /status command - show session info and mix progress

use super::{CommandContext, CommandResult};
use verse_dialogue::{Role, Stage};

pub struct StatusCommand;

impl StatusCommand {
    pub fn execute(ctx: &CommandContext<'_>) -> CommandResult {
        let state = ctx.state;

        let mut output = String::from("Session Info\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');

        output.push_str(&format!("Session:    {}\n", ctx.session_key));
        output.push_str(&format!(
            "Model:      {} ({})\n",
            ctx.model.id,
            ctx.model.provider.name()
        ));
        output.push('\n');

        output.push_str(&format!("Stage:      {}\n", stage_label(state.stage)));
        if let Some(target) = state.target_count {
            output.push_str(&format!(
                "Lyrics:     {} of {} collected\n",
                state.collected_lyrics.len(),
                target
            ));
        }

        let user_msgs = state.history.iter().filter(|m| m.role == Role::User).count();
        output.push_str(&format!(
            "Messages:   {} total ({} from you)\n",
            state.history.len(),
            user_msgs
        ));
        output.push_str(&format!(
            "Last song:  {}\n",
            if ctx.last_song.is_some() { "ready to /save" } else { "none yet" }
        ));

        CommandResult::Message(output)
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Start => "not started",
        Stage::AwaitingCount => "choosing how many songs",
        Stage::CollectingLyrics => "collecting lyrics",
        Stage::AwaitingDirection => "waiting for creative direction",
    }
}
