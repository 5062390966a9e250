//! Broadcast channel for diagnostic events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The controller
//! and the history store publish [`AnalyzerEvent`]s through it; UIs and
//! tests subscribe to observe transitions and skipped entries.

use tokio::sync::broadcast;

use super::AnalyzerEvent;

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out of session and history diagnostics.
///
/// Cloning shares the channel, so the controller and the store can publish
/// onto one bus. A subscriber that falls more than `capacity` events behind
/// sees `RecvError::Lagged` and misses the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AnalyzerEvent>,
}

impl EventBus {
    /// Bus buffering up to `capacity` undelivered events (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Delivers `event` to every current subscriber and returns how many
    /// there were. With nobody listening the event is discarded.
    pub fn publish(&self, event: AnalyzerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receiver for events published from now on. Earlier events are not
    /// replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnalyzerEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
