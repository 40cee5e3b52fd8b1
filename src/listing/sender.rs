//! Public API for driving a listing worker

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use super::errors::ListingError;
use super::stats::{ListingStats, ListingStatsSnapshot};
use super::types::{ListingMessage, ListingSnapshot, ListingUpdate};
use crate::repository::FilterSet;

/// Cheap, cloneable handle to a listing worker
///
/// Commands are fire-and-forget: the worker applies them in arrival order.
/// Dropping every handle stops the worker.
#[derive(Clone)]
pub struct ListingHandle {
    pub(super) listing_id: Uuid,
    pub(super) sender: mpsc::UnboundedSender<ListingMessage>,
    pub(super) updates: broadcast::Sender<ListingUpdate>,
    pub(super) stats: Arc<ListingStats>,
}

impl std::fmt::Debug for ListingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingHandle")
            .field("listing_id", &self.listing_id)
            .field("connected", &!self.sender.is_closed())
            .finish()
    }
}

impl ListingHandle {
    /// Scroll-proximity trigger. Ignored by the worker unless the listing
    /// is idle and has more pages.
    pub fn request_next_page(&self) -> Result<(), ListingError> {
        self.send(ListingMessage::RequestNextPage)
    }

    /// Filter change: discard loaded items and load the first page for
    /// `filters`, superseding any fetch in flight.
    pub fn reset_and_load(&self, filters: FilterSet) -> Result<(), ListingError> {
        self.send(ListingMessage::ResetAndLoad(filters))
    }

    /// Current items, cursor position and state
    pub async fn snapshot(&self) -> Result<ListingSnapshot, ListingError> {
        let (reply, response) = oneshot::channel();
        self.send(ListingMessage::Snapshot(reply))?;
        response.await.map_err(|_| ListingError::Disconnected)
    }

    /// Stop the worker. Fetches still in flight are discarded.
    pub fn shutdown(&self) -> Result<(), ListingError> {
        self.send(ListingMessage::Shutdown)
    }

    /// Receive updates emitted after each settled fetch
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ListingUpdate> {
        self.updates.subscribe()
    }

    #[must_use]
    pub fn stats(&self) -> ListingStatsSnapshot {
        self.stats.snapshot()
    }

    #[must_use]
    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    fn send(&self, message: ListingMessage) -> Result<(), ListingError> {
        self.sender
            .send(message)
            .map_err(|_| ListingError::Disconnected)
    }
}
