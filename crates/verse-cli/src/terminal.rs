//! Line-oriented terminal surface

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use verse_dialogue::{ConversationState, InteractionSurface, Role};

use crate::session::SessionStore;

/// Opens and closes a multi-line turn
pub const BLOCK_FENCE: &str = "\"\"\"";

/// Reads turns from a `BufRead`, prints replies to a `Write` and keeps state
/// in memory, writing it through to a `SessionStore`.
///
/// The in-memory copy is authoritative for the life of the surface, so a
/// store that cannot be written only costs durability, never progress.
pub struct TerminalSurface<R, W> {
    store: SessionStore,
    states: HashMap<String, ConversationState>,
    reader: R,
    writer: W,
    /// Print user input back out (script mode, where nothing was typed)
    echo_input: bool,
}

impl<R: BufRead, W: Write> TerminalSurface<R, W> {
    pub fn new(store: SessionStore, reader: R, writer: W) -> Self {
        Self {
            store,
            states: HashMap::new(),
            reader,
            writer,
            echo_input: false,
        }
    }

    pub fn with_echo(mut self, echo_input: bool) -> Self {
        self.echo_input = echo_input;
        self
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Print the input prompt
    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.writer, "> ")?;
        self.writer.flush()
    }

    /// Print a line that is not part of the conversation
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", text)?;
        self.writer.flush()
    }

    /// Read one turn: a single line, or every line between two `"""` fences.
    /// Returns `None` at end of input.
    pub fn read_turn(&mut self) -> io::Result<Option<String>> {
        let Some(first) = self.read_line()? else {
            return Ok(None);
        };
        if first.trim() != BLOCK_FENCE {
            return Ok(Some(first));
        }

        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.trim() == BLOCK_FENCE {
                break;
            }
            lines.push(line);
        }
        Ok(Some(lines.join("\n")))
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

#[async_trait]
impl<R, W> InteractionSurface for TerminalSurface<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    async fn render(&mut self, role: Role, content: &str) {
        let result = match role {
            Role::User if self.echo_input => {
                let first_line = content.lines().next().unwrap_or("");
                writeln!(self.writer, "> {}", crate::utils::truncate_chars(first_line, 60))
            }
            Role::User => Ok(()),
            Role::Assistant => writeln!(self.writer, "{}\n", content),
        };
        if let Err(e) = result.and_then(|_| self.writer.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    async fn next_input(&mut self) -> Option<String> {
        match self.read_turn() {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                None
            }
        }
    }

    async fn load(&mut self, session: &str) -> ConversationState {
        match self.states.get(session) {
            Some(state) => state.clone(),
            None => self.store.load(session),
        }
    }

    async fn save(
        &mut self,
        session: &str,
        state: &ConversationState,
    ) -> verse_dialogue::Result<()> {
        self.states.insert(session.to_string(), state.clone());
        self.store
            .save(session, state)
            .map_err(|e| verse_dialogue::Error::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use verse_ai::{Generation, GenerationRequest, TextGenerator};
    use verse_dialogue::{ControllerConfig, DialogueController, Stage, run_session};

    type TestSurface = TerminalSurface<Cursor<Vec<u8>>, Vec<u8>>;

    const THREE_SONG_MIX: &str = "hi\n3\nlyricA\nlyricB\nlyricC\nmake it upbeat\n";

    struct Fixed;

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> verse_ai::Result<Generation> {
            Ok(Generation::text("MIXED"))
        }
    }

    fn controller() -> DialogueController {
        DialogueController::new(ControllerConfig::default(), Arc::new(Fixed))
    }

    fn over(store: SessionStore, input: &str) -> TestSurface {
        TerminalSurface::new(store, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn surface(input: &str) -> (tempfile::TempDir, TestSurface) {
        let dir = tempfile::tempdir().unwrap();
        let surface = over(SessionStore::new(dir.path()), input);
        (dir, surface)
    }

    fn output(surface: &TestSurface) -> String {
        String::from_utf8(surface.writer().clone()).unwrap()
    }

    #[test]
    fn test_reads_single_lines() {
        let (_dir, mut s) = surface("hi\r\n3\n");
        assert_eq!(s.read_turn().unwrap().as_deref(), Some("hi"));
        assert_eq!(s.read_turn().unwrap().as_deref(), Some("3"));
        assert_eq!(s.read_turn().unwrap(), None);
    }

    #[test]
    fn test_blank_line_is_a_turn() {
        let (_dir, mut s) = surface("\n");
        assert_eq!(s.read_turn().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_reads_fenced_block() {
        let (_dir, mut s) = surface("\"\"\"\nverse one\n\nverse two\n\"\"\"\nnext\n");
        assert_eq!(
            s.read_turn().unwrap().as_deref(),
            Some("verse one\n\nverse two")
        );
        assert_eq!(s.read_turn().unwrap().as_deref(), Some("next"));
    }

    #[test]
    fn test_unclosed_block_ends_at_eof() {
        let (_dir, mut s) = surface("\"\"\"\nla la\n");
        assert_eq!(s.read_turn().unwrap().as_deref(), Some("la la"));
        assert_eq!(s.read_turn().unwrap(), None);
    }

    #[tokio::test]
    async fn test_render_skips_user_unless_echoing() {
        let (_dir, mut s) = surface("");
        s.render(Role::User, "typed").await;
        s.render(Role::Assistant, "reply").await;
        assert_eq!(output(&s), "reply\n\n");

        let (_dir, s) = surface("");
        let mut s = s.with_echo(true);
        s.render(Role::User, "line one\nline two").await;
        assert_eq!(output(&s), "> line one\n");
    }

    #[tokio::test]
    async fn test_state_goes_through_store() {
        let (_dir, mut s) = surface("");
        let mut state = ConversationState::new();
        state.record(Role::User, "hello");
        s.save("key", &state).await.unwrap();
        assert_eq!(s.load("key").await, state);
        assert_eq!(s.load("other").await, ConversationState::new());
    }

    #[tokio::test]
    async fn test_three_song_mix_over_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let mut s = over(store.clone(), THREE_SONG_MIX);

        let summary = run_session(&controller(), &mut s, "scenario").await;
        assert_eq!(summary.turns, 6);
        assert_eq!(summary.generated, vec!["MIXED".to_string()]);

        let out = output(&s);
        assert!(out.contains("Paste the lyrics for song 1 of 3"));
        assert!(out.trim_end().ends_with("MIXED"));

        let persisted = store.load("scenario");
        assert_eq!(persisted.stage, Stage::Start);
        assert!(persisted.collected_lyrics.is_empty());
        assert!(persisted.target_count.is_none());
        assert_eq!(persisted.history.len(), 13);
    }

    #[tokio::test]
    async fn test_unwritable_store_still_completes_mix() {
        // A regular file where the sessions directory should be
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let store = SessionStore::new(blocker.path().join("sessions"));
        assert!(store.save("k", &ConversationState::new()).is_err());

        let mut s = over(store, THREE_SONG_MIX);
        let summary = run_session(&controller(), &mut s, "k").await;

        assert_eq!(summary.generated, vec!["MIXED".to_string()]);
        assert_eq!(s.load("k").await.stage, Stage::Start);
    }

    #[tokio::test]
    async fn test_cached_state_wins_over_store() {
        let (dir, mut s) = surface("");
        let mut state = ConversationState::new();
        state.stage = Stage::AwaitingCount;
        s.save("key", &state).await.unwrap();

        // Clobber the file behind the surface's back
        std::fs::write(dir.path().join("key.json"), "{ not json").unwrap();
        assert_eq!(s.load("key").await.stage, Stage::AwaitingCount);
    }
}
