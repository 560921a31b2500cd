//! Headless publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every event without any single subscriber blocking
//! the others.  The client driver publishes connection transitions and
//! decoded server messages here; the console task consumes them.

use frcvision_types::{ConsoleEvent, VisionError};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channel.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to every subscriber.
    ///
    /// Returns the number of receivers that were handed the event, or a
    /// [`VisionError::Channel`] error when nobody is subscribed.
    pub fn publish(&self, event: ConsoleEvent) -> Result<usize, VisionError> {
        self.sender
            .send(event)
            .map_err(|e| VisionError::Channel(format!("event bus send error: {e}")))
    }

    /// Subscribe to all events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    /// Subscribe and return a [`TopicSubscriber`] filtered to events whose
    /// `source` starts with `topic`.
    pub fn subscribe_topic(&self, topic: impl Into<String>) -> TopicSubscriber {
        TopicSubscriber {
            topic: topic.into(),
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A subscriber that only delivers events whose `source` field starts with the
/// given topic prefix.
pub struct TopicSubscriber {
    topic: String,
    receiver: broadcast::Receiver<ConsoleEvent>,
}

impl TopicSubscriber {
    /// Wait for the next event that matches this subscriber's topic filter.
    ///
    /// Returns `None` when the bus is closed and no further events will arrive.
    pub async fn recv(&mut self) -> Option<ConsoleEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.source.starts_with(&self.topic) => {
                    return Some(event);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = %self.topic, lagged_by = n, "TopicSubscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
