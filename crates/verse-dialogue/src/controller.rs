//! Dialogue controller: the lyric collection state machine

use std::sync::Arc;
use std::time::Duration;

use verse_ai::{FailureKind, Generation, GenerationRequest, TextGenerator};

use crate::conversation::{ChatMessage, ConversationState, MAX_SONGS, MIN_SONGS, Role, Stage};
use crate::prompts;

/// Upper bound on one generation call unless configured otherwise
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

const ASK_COUNT: &str = "How many songs would you like to mix? Pick a number from 2 to 5.";
const ASK_DIRECTION: &str = "All lyrics received! Any creative direction for the mix? \
     (a mood, a genre, a theme, or just press enter to skip)";
const SONG_READY: &str = "Your mixed masterpiece is ready!";
const RECOVERY_NOTICE: &str = "Something went wrong with this conversation, so let's start over.";

/// What to do with collected lyrics when generation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Discard everything and return to `Start`
    #[default]
    Reset,
    /// Keep the lyrics and stay in `AwaitingDirection` so the next input retries
    RetainLyrics,
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// System instructions sent with the mix request
    pub instructions: String,
    /// Limit on a single generation call; `None` waits indefinitely
    pub generation_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            instructions: prompts::MIX_INSTRUCTIONS.to_string(),
            generation_timeout: Some(DEFAULT_GENERATION_TIMEOUT),
            failure_policy: FailurePolicy::Reset,
        }
    }
}

/// Why a song count was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountRejection {
    /// Not an integer at all
    Unparseable,
    /// An integer outside `MIN_SONGS..=MAX_SONGS`
    OutOfRange(i64),
}

impl CountRejection {
    /// Re-prompt shown to the user
    pub fn message(&self) -> String {
        match self {
            CountRejection::Unparseable => format!(
                "Please enter a valid number between {} and {}.",
                MIN_SONGS, MAX_SONGS
            ),
            CountRejection::OutOfRange(n) => format!(
                "{} won't work. Please choose between {} and {} songs.",
                n, MIN_SONGS, MAX_SONGS
            ),
        }
    }
}

/// Parse a song count, accepting only integers in `MIN_SONGS..=MAX_SONGS`.
pub fn parse_count(input: &str) -> Result<u8, CountRejection> {
    let n: i64 = input
        .trim()
        .parse()
        .map_err(|_| CountRejection::Unparseable)?;
    if (i64::from(MIN_SONGS)..=i64::from(MAX_SONGS)).contains(&n) {
        Ok(n as u8)
    } else {
        Err(CountRejection::OutOfRange(n))
    }
}

/// What a turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Greeted the user and asked for a count
    Prompted,
    CountAccepted(u8),
    CountRejected(CountRejection),
    LyricCollected { collected: usize, target: u8 },
    Generated { text: String },
    GenerationFailed(FailureKind),
    /// State was corrupted and has been reset
    Recovered,
}

/// Result of one turn: the new state plus the messages to render, in order
#[derive(Debug, Clone)]
pub struct Turn {
    pub state: ConversationState,
    pub messages: Vec<ChatMessage>,
    pub outcome: TurnOutcome,
}

impl Turn {
    /// The generated song, if this turn produced one
    pub fn generated_text(&self) -> Option<&str> {
        match self.outcome {
            TurnOutcome::Generated { ref text } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Accumulates a turn's assistant messages, recording each in history first
struct Reply {
    state: ConversationState,
    messages: Vec<ChatMessage>,
}

impl Reply {
    fn say(&mut self, text: impl Into<String>) {
        let message = self.state.record(Role::Assistant, text);
        self.messages.push(message);
    }

    fn ask_for_count(&mut self) {
        self.say(ASK_COUNT);
        self.state.stage = Stage::AwaitingCount;
    }

    fn finish(self, outcome: TurnOutcome) -> Turn {
        Turn {
            state: self.state,
            messages: self.messages,
            outcome,
        }
    }
}

/// Drives the count → lyrics → direction → generate cycle
pub struct DialogueController {
    config: ControllerConfig,
    generator: Arc<dyn TextGenerator>,
}

impl DialogueController {
    /// Create a new controller
    pub fn new(config: ControllerConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    /// Process one user input. Malformed input never fails the turn; it
    /// re-prompts and leaves the stage unchanged.
    pub async fn handle_turn(&self, state: ConversationState, input: &str) -> Turn {
        let mut reply = Reply {
            state,
            messages: Vec::new(),
        };
        reply.state.record(Role::User, input);

        if let Err(e) = reply.state.check_invariants() {
            tracing::error!(error = %e, "conversation state corrupted, restarting");
            return recover(reply);
        }

        let outcome = match (reply.state.stage, reply.state.target_count) {
            (Stage::Start, _) => {
                reply.ask_for_count();
                TurnOutcome::Prompted
            }
            (Stage::AwaitingCount, _) => accept_count(&mut reply, input),
            (Stage::CollectingLyrics, Some(target)) => collect_lyric(&mut reply, target, input),
            (Stage::AwaitingDirection, Some(_)) => self.generate(&mut reply, input).await,
            // Excluded by check_invariants
            (Stage::CollectingLyrics | Stage::AwaitingDirection, None) => return recover(reply),
        };

        tracing::debug!(stage = ?reply.state.stage, outcome = ?outcome, "turn handled");
        reply.finish(outcome)
    }

    async fn generate(&self, reply: &mut Reply, direction: &str) -> TurnOutcome {
        let payload = prompts::mix_payload(&reply.state.collected_lyrics, direction);
        let request = GenerationRequest::new(self.config.instructions.clone(), payload);

        tracing::info!(
            songs = reply.state.collected_lyrics.len(),
            has_direction = !direction.trim().is_empty(),
            "generating mixed song"
        );

        match generate_with_timeout(
            self.generator.as_ref(),
            &request,
            self.config.generation_timeout,
        )
        .await
        {
            Ok(generation) => {
                reply.say(SONG_READY);
                reply.say(generation.text.clone());
                reply.state.restart();
                TurnOutcome::Generated {
                    text: generation.text,
                }
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(error = %e, kind = ?kind, "song generation failed");
                reply.say(failure_message(&e));
                match self.config.failure_policy {
                    FailurePolicy::Reset => {
                        reply.state.restart();
                        reply.say("Send any message to start a new mix.");
                    }
                    FailurePolicy::RetainLyrics => {
                        reply.say("Your lyrics are kept. Send a creative direction to try again.");
                    }
                }
                TurnOutcome::GenerationFailed(kind)
            }
        }
    }
}

/// Reset a corrupted state to `Start`, then treat the triggering input as a
/// `Start` turn. The turn therefore ends in `AwaitingCount` with the count
/// prompt as its last message; the input itself is not reinterpreted.
fn recover(mut reply: Reply) -> Turn {
    reply.state.restart();
    reply.say(RECOVERY_NOTICE);
    reply.ask_for_count();
    reply.finish(TurnOutcome::Recovered)
}

fn accept_count(reply: &mut Reply, input: &str) -> TurnOutcome {
    match parse_count(input) {
        Ok(n) => {
            reply.state.target_count = Some(n);
            reply.state.collected_lyrics.clear();
            reply.state.stage = Stage::CollectingLyrics;
            reply.say(format!(
                "Great, let's mix {} songs. Paste the lyrics for song 1 of {}.",
                n, n
            ));
            TurnOutcome::CountAccepted(n)
        }
        Err(rejection) => {
            tracing::debug!(rejection = ?rejection, "song count rejected");
            reply.say(rejection.message());
            TurnOutcome::CountRejected(rejection)
        }
    }
}

fn collect_lyric(reply: &mut Reply, target: u8, input: &str) -> TurnOutcome {
    reply.state.collected_lyrics.push(input.to_string());
    let collected = reply.state.collected_lyrics.len();

    if collected == target as usize {
        reply.state.stage = Stage::AwaitingDirection;
        reply.say(ASK_DIRECTION);
    } else {
        reply.say(format!(
            "Got it. Paste the lyrics for song {} of {}.",
            collected + 1,
            target
        ));
    }

    TurnOutcome::LyricCollected { collected, target }
}

/// User-facing text for a failed generation
pub fn failure_message(error: &verse_ai::Error) -> String {
    match error.kind() {
        FailureKind::AuthRejected => {
            "Invalid API key. Please check your token and try again.".to_string()
        }
        FailureKind::Timeout => "The model took too long to answer.".to_string(),
        FailureKind::EmptyResponse => "The model returned an empty response.".to_string(),
        FailureKind::Transport => format!("Could not reach the model provider: {}", error),
        FailureKind::Provider => format!("Model provider error: {}", error),
        FailureKind::Other => format!("An error occurred: {}", error),
    }
}

/// Run one generation, bounded by `timeout`, treating blank text as a failure.
pub(crate) async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    timeout: Option<Duration>,
) -> verse_ai::Result<Generation> {
    let generation = match timeout {
        Some(limit) => tokio::time::timeout(limit, generator.generate(request))
            .await
            .map_err(|_| verse_ai::Error::Timeout(limit))??,
        None => generator.generate(request).await?,
    };

    if generation.text.trim().is_empty() {
        return Err(verse_ai::Error::EmptyResponse);
    }
    Ok(generation)
}
