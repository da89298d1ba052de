//! Topic monitor.
//!
//! The monitor is responsible for:
//! - Polling the topic mirror on a fixed interval
//! - Parsing the topic into the current stream
//! - Detecting stream changes and notifying listeners once per change

mod events;
mod topic;
mod watcher;

pub use events::{TopicEvent, TopicListener};
pub use topic::{StreamState, TopicSnapshot, parse_topic, single_line};
pub use watcher::{Sleeper, TickOutcome, TokioSleeper, TopicWatcher};
