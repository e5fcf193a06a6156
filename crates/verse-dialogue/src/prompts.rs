//! Model instructions and payload assembly.

/// System instructions for merging lyric sets into one song
pub const MIX_INSTRUCTIONS: &str = r#"<Role>
You are Melodia, a music mixer that combines the lyrics of several songs into one cohesive new song.
</Role>

<Instructions>
1. Read every set of input lyrics.
2. Find the themes, emotions and imagery they share.
3. Write new lyrics that draw on all of the input songs.
4. Use a clear structure: verse, chorus, verse, chorus, bridge, chorus. Label each section.
5. Keep the language poetic and singable, and avoid needless repetition.
6. Aim for roughly 200 to 250 words.
7. If a creative direction is given, let it shape tone and style.
</Instructions>

<Constraints>
- Transform the source lyrics enough that the result is a new work.
- Keep the song suitable for a general audience.
- Do not introduce themes that none of the input songs suggest.
</Constraints>"#;

/// System instructions for summarizing a news article
pub const SUMMARY_INSTRUCTIONS: &str = r#"<Role>
You are a news analyst who distills articles into short, accurate summaries.
</Role>

<Instructions>
Summarize the article you are given using this layout:

Headline: <one line>
Brief Overview: <two or three sentences>
Key Points:
- <fact>
- <fact>
Impact: <one or two sentences>
</Instructions>

<Constraints>
- Stay objective; state only what the article states.
- Keep the summary between 150 and 250 words.
- Attribute statistics and quotes to their source.
</Constraints>"#;

/// Build the user payload for a mix: every lyric set, labelled, plus an
/// optional creative direction.
pub fn mix_payload(lyrics: &[String], direction: &str) -> String {
    let songs = lyrics
        .iter()
        .enumerate()
        .map(|(i, lyric)| format!("Song {}:\n{}", i + 1, lyric.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut payload = format!("Combine these lyrics into a cohesive mixed song:\n\n{}", songs);

    let direction = direction.trim();
    if !direction.is_empty() {
        payload.push_str("\n\nCreative direction: ");
        payload.push_str(direction);
    }
    payload
}

/// Build the user payload for a summary
pub fn summary_payload(article: &str) -> String {
    format!("Summarize this article:\n\n{}", article.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lyrics(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mix_payload_labels_songs_in_order() {
        let payload = mix_payload(&lyrics(&["lyricA", "lyricB", "lyricC"]), "");
        let a = payload.find("Song 1:\nlyricA").unwrap();
        let b = payload.find("Song 2:\nlyricB").unwrap();
        let c = payload.find("Song 3:\nlyricC").unwrap();
        assert!(a < b && b < c);
        assert!(!payload.contains("Creative direction"));
    }

    #[test]
    fn test_mix_payload_appends_direction() {
        let payload = mix_payload(&lyrics(&["a", "b"]), "  make it upbeat \n");
        assert!(payload.ends_with("Creative direction: make it upbeat"));
    }

    #[test]
    fn test_mix_payload_keeps_empty_lyric_slots() {
        let payload = mix_payload(&lyrics(&["", "b"]), "");
        assert!(payload.contains("Song 1:\n\n\nSong 2:\nb"));
    }

    #[test]
    fn test_summary_payload_trims_article() {
        assert_eq!(
            summary_payload("\n  Markets fell.  \n"),
            "Summarize this article:\n\nMarkets fell."
        );
    }
}
