//! File-backed conversation state, one JSON document per session key

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use verse_dialogue::{ConversationState, Stage};

/// On-disk session document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    key: String,
    created_at: i64,
    updated_at: i64,
    state: ConversationState,
}

/// Stores conversation state under a directory, keyed by session
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Get the default sessions directory
    pub fn sessions_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verseforge")
            .join("sessions")
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Generate a fresh session key
    pub fn new_key() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reject keys that cannot name a session file: only ASCII letters,
    /// digits, `-` and `_` are allowed.
    pub fn check_key(key: &str) -> io::Result<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid session key: {:?}", key),
            ));
        }
        Ok(())
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        Self::check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn read_record(&self, key: &str) -> io::Result<Option<SessionRecord>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Load the state for `key`. A missing or unreadable session yields a fresh state.
    pub fn load(&self, key: &str) -> ConversationState {
        match self.read_record(key) {
            Ok(Some(record)) => record.state,
            Ok(None) => ConversationState::new(),
            Err(e) => {
                tracing::warn!(session = key, error = %e, "discarding unreadable session");
                ConversationState::new()
            }
        }
    }

    /// Persist the state for `key`, replacing the file atomically
    pub fn save(&self, key: &str, state: &ConversationState) -> io::Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let now = chrono::Utc::now().timestamp_millis();
        let created_at = match self.read_record(key) {
            Ok(Some(record)) => record.created_at,
            _ => now,
        };
        let record = SessionRecord {
            key: key.to_string(),
            created_at,
            updated_at: now,
            state: state.clone(),
        };

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(&record)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        tracing::debug!(session = key, stage = ?state.stage, "session saved");
        Ok(())
    }

    /// List all sessions, most recently updated first
    pub fn list(&self) -> io::Result<Vec<SessionInfo>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let record = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<SessionRecord>(&content).ok());
            if let Some(record) = record {
                sessions.push(SessionInfo {
                    key: record.key,
                    updated_at: record.updated_at,
                    stage: record.state.stage,
                    message_count: record.state.history.len(),
                });
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    /// Delete a session
    pub fn delete(&self, key: &str) -> io::Result<()> {
        fs::remove_file(self.path_for(key)?)
    }
}

/// Information about a saved session
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub key: String,
    pub updated_at: i64,
    pub stage: Stage,
    pub message_count: usize,
}

impl SessionInfo {
    /// Format the updated_at timestamp for display
    pub fn updated_at_display(&self) -> String {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.updated_at)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
