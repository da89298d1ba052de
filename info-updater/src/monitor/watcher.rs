//! Topic polling loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use diu_platforms::{HttpRequest, Method, Transport};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use super::events::{TopicEvent, TopicListener};
use super::topic::{StreamState, parse_topic, single_line};

/// Waits between two polls.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The topic couldn't be fetched; state untouched.
    FetchFailed,
    /// Nothing changed since the last notification.
    Unchanged,
    /// A stream started or changed; listeners were told.
    Updated,
    /// The stream ended; listeners were told.
    Removed,
    /// The tick panicked and was abandoned.
    Faulted,
}

/// Polls the topic and notifies listeners of stream changes.
pub struct TopicWatcher {
    topic_url: String,
    poll_interval: Duration,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    state: StreamState,
    // last fetched topic on one line, for progress logging
    last_topic: Option<String>,
    listeners: Vec<Arc<dyn TopicListener>>,
}

impl TopicWatcher {
    pub fn new(
        topic_url: impl Into<String>,
        poll_interval: Duration,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            topic_url: topic_url.into(),
            poll_interval,
            transport,
            sleeper: Arc::new(TokioSleeper),
            state: StreamState::Inactive,
            last_topic: None,
            listeners: Vec::new(),
        }
    }

    /// Replace the timer used between polls.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn TopicListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Poll forever. Faults are contained in their tick, so this never
    /// returns.
    pub async fn run(mut self) {
        info!(
            url = %self.topic_url,
            interval_ms = self.poll_interval.as_millis() as u64,
            listeners = self.listeners.len(),
            "Start scanning for topic changes"
        );

        loop {
            self.tick().await;
            self.sleeper.sleep(self.poll_interval).await;
        }
    }

    /// Run one poll: fetch, parse, and notify on change.
    pub async fn tick(&mut self) -> TickOutcome {
        match AssertUnwindSafe(self.poll()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!(cause = %panic_message(panic.as_ref()), "Topic updater fault");
                TickOutcome::Faulted
            }
        }
    }

    async fn poll(&mut self) -> TickOutcome {
        let request = HttpRequest::new(Method::GET, self.topic_url.as_str());
        let topic = match self.transport.execute(request).await {
            Ok(topic) => topic,
            Err(e) => {
                warn!(error = %e, "Couldn't retrieve topic");
                return TickOutcome::FetchFailed;
            }
        };
        self.log_topic(single_line(&topic));

        match parse_topic(&topic) {
            Some(snapshot) => {
                if self.state.snapshot() == Some(&snapshot) {
                    return TickOutcome::Unchanged;
                }
                self.state = StreamState::Active(snapshot.clone());
                self.notify(TopicEvent::Updated(snapshot)).await;
                TickOutcome::Updated
            }
            None => {
                if !self.state.is_active() {
                    return TickOutcome::Unchanged;
                }
                self.state = StreamState::Inactive;
                self.notify(TopicEvent::Removed).await;
                TickOutcome::Removed
            }
        }
    }

    /// Log the topic at info level when it differs from the last fetch.
    fn log_topic(&mut self, line: String) {
        if self.last_topic.as_deref() == Some(line.as_str()) {
            debug!(topic = %line, "Topic fetched");
        } else {
            info!(topic = %line, "Topic");
            self.last_topic = Some(line);
        }
    }

    async fn notify(&self, event: TopicEvent) {
        info!("{}", event.description());
        for listener in &self.listeners {
            if let Err(e) = listener.on_topic_event(&event).await {
                warn!(listener = listener.name(), error = %e, "Topic listener failed");
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
