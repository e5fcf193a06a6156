//! Interaction surface abstraction and the turn driver built on it

use async_trait::async_trait;

use crate::controller::{DialogueController, Turn};
use crate::conversation::{ConversationState, Role};
use crate::error::Result;

/// Whatever the user talks through: renders messages, supplies input and
/// keeps per-session state between turns.
#[async_trait]
pub trait InteractionSurface: Send {
    /// Display a message
    async fn render(&mut self, role: Role, content: &str);

    /// Next user input, or `None` when the user is done
    async fn next_input(&mut self) -> Option<String>;

    /// Load the state for `session`, or a fresh state if there is none
    async fn load(&mut self, session: &str) -> ConversationState;

    /// Persist the state for `session`
    async fn save(&mut self, session: &str, state: &ConversationState) -> Result<()>;
}

/// Totals for a finished session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    /// Every song generated during the session, in order
    pub generated: Vec<String>,
}

/// Run one turn end to end: load, echo the input, handle it, save, render replies.
///
/// A failed save is logged and does not fail the turn.
pub async fn run_turn<S>(
    controller: &DialogueController,
    surface: &mut S,
    session: &str,
    input: &str,
) -> Turn
where
    S: InteractionSurface + ?Sized,
{
    let state = surface.load(session).await;
    surface.render(Role::User, input).await;

    let turn = controller.handle_turn(state, input).await;

    if let Err(e) = surface.save(session, &turn.state).await {
        tracing::warn!(session, error = %e, "failed to save conversation state");
    }

    for message in &turn.messages {
        surface.render(message.role, &message.content).await;
    }
    turn
}

/// Pull inputs from the surface until it runs dry, running a turn for each.
pub async fn run_session<S>(
    controller: &DialogueController,
    surface: &mut S,
    session: &str,
) -> SessionSummary
where
    S: InteractionSurface + ?Sized,
{
    let mut summary = SessionSummary::default();

    while let Some(input) = surface.next_input().await {
        let turn = run_turn(controller, surface, session, &input).await;
        summary.turns += 1;
        if let Some(text) = turn.generated_text() {
            summary.generated.push(text.to_string());
        }
    }

    tracing::debug!(session, turns = summary.turns, "session finished");
    summary
}
