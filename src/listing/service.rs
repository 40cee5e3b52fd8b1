//! Background worker owning a listing cursor
//!
//! The worker is the only owner of the [`ListingCursor`]. Handle commands
//! and page completions from spawned fetch tasks both arrive as messages,
//! so cursor mutation never interleaves with a fetch.

use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cursor::{ListingCursor, PageApplied};
use super::sender::ListingHandle;
use super::stats::{ListingStats, ListingStatsSnapshot};
use super::types::{ListingMessage, ListingOptions, ListingUpdate, PageCompletion, PageRequest};
use crate::config::AcquireConfig;
use crate::events::{CoreEvent, CoreEventBus};
use crate::repository::{
    ContentRepository, EntityType, FilterSet, HttpBackend, PostgrestRepository, RepositoryError,
};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Incremental listing fetcher running as a tokio task
pub struct ListingService {
    listing_id: Uuid,
    entity_type: EntityType,
    is_running: Arc<AtomicBool>,
    stats: Arc<ListingStats>,
    worker: JoinHandle<()>,
}

impl std::fmt::Debug for ListingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingService")
            .field("listing_id", &self.listing_id)
            .field("entity_type", &self.entity_type)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

struct Worker {
    listing_id: Uuid,
    entity_type: EntityType,
    repository: Arc<dyn ContentRepository>,
    cursor: ListingCursor,
    completions: mpsc::UnboundedSender<PageCompletion>,
    updates: broadcast::Sender<ListingUpdate>,
    events: Option<CoreEventBus>,
    stats: Arc<ListingStats>,
}

impl ListingService {
    /// Spawn a listing worker. No page is loaded until the first
    /// `request_next_page` or `reset_and_load`.
    ///
    /// Only products and guides are listed; other entity types are
    /// rejected. Must be called within a tokio runtime.
    pub fn start(
        repository: Arc<dyn ContentRepository>,
        options: ListingOptions,
    ) -> Result<(ListingService, ListingHandle)> {
        if !options.entity_type.is_listable() {
            return Err(anyhow!(
                "listing is not supported for {}",
                options.entity_type
            ));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let listing_id = Uuid::new_v4();
        let is_running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(ListingStats::new());

        let worker = Worker {
            listing_id,
            entity_type: options.entity_type,
            repository,
            cursor: ListingCursor::new(options.page_size, options.filters),
            completions: completions_tx,
            updates: updates.clone(),
            events: options.events,
            stats: stats.clone(),
        };

        info!(
            listing_id = %listing_id,
            entity_type = %options.entity_type,
            page_size = options.page_size,
            "Starting listing worker"
        );

        let worker_running = is_running.clone();
        let task = tokio::spawn(async move {
            worker.run(receiver, completions_rx).await;
            worker_running.store(false, Ordering::Relaxed);
        });

        let service = ListingService {
            listing_id,
            entity_type: options.entity_type,
            is_running,
            stats: stats.clone(),
            worker: task,
        };

        let handle = ListingHandle {
            listing_id,
            sender,
            updates,
            stats,
        };

        Ok((service, handle))
    }

    /// Spawn a worker over the HTTP table backend described by `config`
    pub fn start_http(
        config: &AcquireConfig,
        entity_type: EntityType,
    ) -> Result<(ListingService, ListingHandle)> {
        let backend = HttpBackend::from_config(config)?;
        let repository = Arc::new(PostgrestRepository::new(backend, config.schema().clone()));
        Self::start(
            repository,
            ListingOptions::from_config(config, entity_type),
        )
    }

    #[must_use]
    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn stats(&self) -> ListingStatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait for the worker to exit
    pub async fn join(self) {
        if let Err(e) = self.worker.await {
            warn!(listing_id = %self.listing_id, error = %e, "Listing worker ended abnormally");
        }
    }
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<ListingMessage>,
        mut completions: mpsc::UnboundedReceiver<PageCompletion>,
    ) {
        loop {
            tokio::select! {
                message = commands.recv() => match message {
                    Some(ListingMessage::RequestNextPage) => self.request_next_page(),
                    Some(ListingMessage::ResetAndLoad(filters)) => self.reset_and_load(filters),
                    Some(ListingMessage::Snapshot(reply)) => {
                        let _ = reply.send(self.cursor.snapshot());
                    }
                    Some(ListingMessage::Shutdown) | None => break,
                },
                Some(completion) = completions.recv() => self.on_completion(completion),
            }
        }

        debug!(listing_id = %self.listing_id, "Listing worker stopped");
    }

    fn request_next_page(&mut self) {
        match self.cursor.begin_next_page() {
            Some(request) => self.spawn_fetch(request),
            None => {
                self.stats.gated_requests.fetch_add(1, Ordering::Relaxed);
                debug!(
                    listing_id = %self.listing_id,
                    state = ?self.cursor.state(),
                    has_more = self.cursor.has_more(),
                    "Ignoring next-page request"
                );
            }
        }
    }

    fn reset_and_load(&mut self, filters: FilterSet) {
        let request = self.cursor.reset(filters);
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        info!(
            listing_id = %self.listing_id,
            generation = request.generation,
            "Listing reset"
        );

        let _ = self.updates.send(ListingUpdate::Reset {
            generation: request.generation,
            filters: request.filters.clone(),
        });
        self.publish(CoreEvent::listing_reset(
            self.listing_id,
            self.entity_type,
            request.generation,
            request.filters.clone(),
        ));

        self.spawn_fetch(request);
    }

    fn spawn_fetch(&self, request: PageRequest) {
        self.stats.pages_requested.fetch_add(1, Ordering::Relaxed);
        debug!(
            listing_id = %self.listing_id,
            generation = request.generation,
            offset = request.offset,
            limit = request.limit,
            "Fetching page"
        );

        let repository = self.repository.clone();
        let completions = self.completions.clone();
        let entity_type = self.entity_type;
        tokio::spawn(async move {
            let result = repository
                .list_page(entity_type, &request.filters, request.offset, request.limit)
                .await;
            // The worker may have stopped; the page is simply dropped then
            let _ = completions.send(PageCompletion {
                generation: request.generation,
                offset: request.offset,
                result,
            });
        });
    }

    fn on_completion(&mut self, completion: PageCompletion) {
        let PageCompletion {
            generation,
            offset,
            result,
        } = completion;

        match result {
            Ok(page) => match self.cursor.apply_page(generation, page) {
                PageApplied::Stale => self.discard_stale(generation),
                PageApplied::Appended {
                    items,
                    has_more,
                    duplicates,
                } => {
                    self.stats.pages_applied.fetch_add(1, Ordering::Relaxed);
                    self.stats
                        .duplicates_dropped
                        .fetch_add(duplicates, Ordering::Relaxed);
                    debug!(
                        listing_id = %self.listing_id,
                        generation,
                        offset,
                        appended = items.len(),
                        duplicates,
                        has_more,
                        "Page applied"
                    );

                    let _ = self.updates.send(ListingUpdate::PageAppended {
                        generation,
                        items: items.clone(),
                        has_more,
                    });
                    self.publish(CoreEvent::page_appended(
                        self.listing_id,
                        self.entity_type,
                        generation,
                        items,
                        has_more,
                    ));
                }
            },
            Err(error) => {
                if self.cursor.apply_failure(generation) {
                    self.on_failure(generation, offset, &error);
                } else {
                    self.discard_stale(generation);
                }
            }
        }
    }

    fn on_failure(&mut self, generation: u64, offset: usize, error: &RepositoryError) {
        self.stats.failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            listing_id = %self.listing_id,
            generation,
            offset,
            error = %error,
            "Page fetch failed, listing stopped"
        );

        let _ = self.updates.send(ListingUpdate::Failed {
            generation,
            kind: error.kind(),
            message: error.to_string(),
        });
        self.publish(CoreEvent::error(error.kind(), error.to_string()));
        self.publish(CoreEvent::page_appended(
            self.listing_id,
            self.entity_type,
            generation,
            Vec::new(),
            false,
        ));
    }

    fn discard_stale(&self, generation: u64) {
        self.stats.stale_discards.fetch_add(1, Ordering::Relaxed);
        debug!(
            listing_id = %self.listing_id,
            generation,
            current = self.cursor.generation(),
            "Discarding stale page"
        );
    }

    fn publish(&self, event: CoreEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.publish(event);
        }
    }
}
