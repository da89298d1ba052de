//! Topic text parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Streamer on the first line, `type: game` on the second.
static TOPIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\n([^:]+): ?(.+)$").unwrap());

/// Fields of an active stream as announced by the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSnapshot {
    pub streamer: String,
    pub stream_type: String,
    pub game: String,
}

impl TopicSnapshot {
    pub fn new(
        streamer: impl Into<String>,
        stream_type: impl Into<String>,
        game: impl Into<String>,
    ) -> Self {
        Self {
            streamer: streamer.into(),
            stream_type: stream_type.into(),
            game: game.into(),
        }
    }
}

/// Last state the listeners were told about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StreamState {
    #[default]
    Inactive,
    Active(TopicSnapshot),
}

impl StreamState {
    pub fn is_active(&self) -> bool {
        matches!(self, StreamState::Active(_))
    }

    pub fn snapshot(&self) -> Option<&TopicSnapshot> {
        match self {
            StreamState::Active(snapshot) => Some(snapshot),
            StreamState::Inactive => None,
        }
    }
}

/// Parse a topic. `None` means no stream is announced.
pub fn parse_topic(raw: &str) -> Option<TopicSnapshot> {
    let text = raw.replace("\r\n", "\n");
    let caps = TOPIC_PATTERN.captures(text.trim())?;
    Some(TopicSnapshot::new(&caps[1], &caps[2], &caps[3]))
}

/// The topic on one line, for logging.
pub fn single_line(raw: &str) -> String {
    raw.trim().replace("\r\n", " ").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Bob\nGame: Doom\n", "Bob", "Game", "Doom")]
    #[case("Bob\r\nGame:Doom\r\n", "Bob", "Game", "Doom")]
    #[case("  Alice \nmusic: some playlist", "Alice ", "music", "some playlist")]
    #[case("Bob\nGame: Doom: Eternal", "Bob", "Game", "Doom: Eternal")]
    #[case("Bob\nGame:  Doom", "Bob", "Game", " Doom")]
    fn parses_active_topics(
        #[case] raw: &str,
        #[case] streamer: &str,
        #[case] stream_type: &str,
        #[case] game: &str,
    ) {
        assert_eq!(
            parse_topic(raw),
            Some(TopicSnapshot::new(streamer, stream_type, game))
        );
    }

    #[rstest]
    #[case("")]
    #[case("Nobody is streaming right now")]
    #[case("Bob\nno separator here")]
    #[case("\nGame: Doom")]
    #[case("Bob\nGame: ")]
    fn rejects_inactive_topics(#[case] raw: &str) {
        assert_eq!(parse_topic(raw), None);
    }

    #[test]
    fn extra_lines_end_up_in_the_type() {
        // `[^:]` spans line breaks, so only the first line is the streamer.
        let snapshot = parse_topic("Bob\nCo-op\nGame: Doom").unwrap();
        assert_eq!(snapshot.streamer, "Bob");
        assert_eq!(snapshot.stream_type, "Co-op\nGame");
        assert_eq!(snapshot.game, "Doom");
    }

    #[test]
    fn state_accessors() {
        let state = StreamState::Active(TopicSnapshot::new("a", "b", "c"));
        assert!(state.is_active());
        assert_eq!(state.snapshot().map(|s| s.game.as_str()), Some("c"));
        assert_eq!(StreamState::default().snapshot(), None);
    }

    #[test]
    fn single_line_joins_lines() {
        assert_eq!(single_line("Bob\r\nGame: Doom\n"), "Bob Game: Doom");
    }
}
