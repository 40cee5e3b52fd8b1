//! Broadcast bus carrying core events to the presentation layer
//!
//! Publishing never blocks: when a subscriber falls behind it sees
//! `RecvError::Lagged` and the oldest events are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::errors::EventBusError;
use super::stats::{EventBusStats, EventBusStatsSnapshot};
use super::types::CoreEvent;

/// Event bus for publishing and subscribing to core events
///
/// Cloning yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct CoreEventBus {
    sender: broadcast::Sender<CoreEvent>,
    stats: Arc<EventBusStats>,
    shutdown_flag: Arc<AtomicBool>,
}

impl CoreEventBus {
    /// Create a new event bus buffering at most `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            stats: Arc::new(EventBusStats::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. Having no
    /// subscribers is reported as [`EventBusError::NoSubscribers`]; the
    /// coordinators treat that as a normal condition.
    pub fn publish(&self, event: CoreEvent) -> Result<usize, EventBusError> {
        if self.is_shutdown() {
            return Err(EventBusError::Shutdown);
        }

        let counter = self.stats.counter_for(&event);
        match self.sender.send(event) {
            Ok(subscriber_count) => {
                if let Some(counter) = counter {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                Ok(subscriber_count)
            }
            Err(_) => {
                self.stats.record_undelivered();
                log::trace!("Dropped core event, no active subscribers");
                Err(EventBusError::NoSubscribers)
            }
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    #[must_use]
    pub fn stats(&self) -> EventBusStatsSnapshot {
        self.stats.snapshot()
    }

    /// Publish a final `Shutdown` event and refuse further publishing
    pub fn shutdown(&self) {
        if self.shutdown_flag.swap(true, Ordering::SeqCst) {
            return;
        }
        // Shutdown is best-effort; nobody may be listening
        let _ = self.sender.send(CoreEvent::shutdown());
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Receive the next event from one of this bus's receivers.
    ///
    /// Broadcast errors map onto [`EventBusError`]; a lagged receiver adds
    /// the number of skipped events to the bus statistics.
    pub async fn recv(
        &self,
        receiver: &mut broadcast::Receiver<CoreEvent>,
    ) -> Result<CoreEvent, EventBusError> {
        match receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                self.stats.record_lagged(missed);
                log::debug!("Core event receiver lagged by {missed} events");
                Err(EventBusError::ReceiverLagged(missed))
            }
            Err(broadcast::error::RecvError::Closed) => Err(EventBusError::Shutdown),
        }
    }
}
