//! Shared utilities

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Where `/save` writes when no path is given
pub const DEFAULT_SONG_FILE: &str = "mixed_song.txt";

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Write a song to `path`, replacing any previous contents
pub fn save_song(path: &Path, text: &str) -> io::Result<()> {
    fs::write(path, format!("{}\n", text.trim_end()))
}

/// Append a song to `path`, separated from earlier entries by a timestamped header
pub fn append_song(path: &Path, text: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M");
    writeln!(file, "=== {} ===\n{}\n", stamp, text.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }

    #[test]
    fn test_save_song_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SONG_FILE);
        save_song(&path, "old").unwrap();
        save_song(&path, "new song\n\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new song\n");
    }

    #[test]
    fn test_append_song_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.txt");
        append_song(&path, "first").unwrap();
        append_song(&path, "second").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("=== ").count(), 2);
        assert!(content.find("first").unwrap() < content.find("second").unwrap());
    }
}
