//! Events delivered to topic listeners.

use async_trait::async_trait;

use super::topic::TopicSnapshot;

/// A detected change of the announced stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicEvent {
    /// A stream started or its streamer, type or game changed.
    Updated(TopicSnapshot),
    /// The topic no longer announces a stream.
    Removed,
}

impl TopicEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            TopicEvent::Updated(snapshot) => format!(
                "{} is streaming {}: {}",
                snapshot.streamer, snapshot.stream_type, snapshot.game
            ),
            TopicEvent::Removed => "stream ended".to_string(),
        }
    }
}

/// Receives topic changes from the watcher.
///
/// Listeners are awaited one after another, so a listener's work is done
/// before the next listener or the next poll runs.
#[async_trait]
pub trait TopicListener: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn on_topic_event(&self, event: &TopicEvent) -> crate::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description() {
        let event = TopicEvent::Updated(TopicSnapshot::new("Bob", "game", "Doom"));
        assert_eq!(event.description(), "Bob is streaming game: Doom");
        assert_eq!(TopicEvent::Removed.description(), "stream ended");
    }
}
