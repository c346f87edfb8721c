//! A booking session: one slot store and one selection, with a single writer.
//!
//! All mutations go through [`Session`] and run to completion under one lock,
//! including the candidate rebuild they trigger. Only after that is a new
//! immutable [`Snapshot`] published on a `watch` channel, so subscribers never
//! see a store without its matching candidates or a half-cleared cascade.
//!
//! Refreshes are split into [`Session::begin_refresh`] and
//! [`Session::complete_refresh`] so the fetch itself can run without the lock.
//! Each `begin_refresh` supersedes the previous ticket; a result arriving on a
//! superseded ticket is discarded.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::libcal::AvailabilityRequest;
use crate::matcher;
use crate::model::{AvailableSlot, CalendarDay, Instant, Reservation, RoomId, Slot};
use crate::selection::Selection;
use crate::source::SlotSource;
use crate::store::SlotStore;

/// A settled view of the session.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Bumped on every published change.
    pub revision: u64,
    pub store: SlotStore,
    pub selection: Selection,
}

/// Handle for one in-flight refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a refresh ticket does nothing until completed"]
pub struct RefreshTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetch result replaced the store.
    Applied { slots: usize },
    /// A newer refresh was started; this result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    store: SlotStore,
    selection: Selection,
    revision: u64,
    latest_ticket: u64,
}

pub struct Session {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    inner: Mutex<Inner>,
    published: watch::Sender<Arc<Snapshot>>,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let (published, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            catalog,
            config,
            inner: Mutex::new(Inner::default()),
            published,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Watch published snapshots. Only the latest one is retained.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.published.borrow().clone()
    }

    /// A grid request for `date` at this session's location and page size.
    pub fn request_for(&self, date: CalendarDay) -> AvailabilityRequest {
        AvailabilityRequest::new(self.catalog.location_id, date).with_page(0, self.config.page_size)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every write replaces whole values, so a poisoned guard still holds a
        // consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &mut Inner) -> Arc<Snapshot> {
        inner.revision += 1;
        let snapshot = Arc::new(Snapshot {
            revision: inner.revision,
            store: inner.store.clone(),
            selection: inner.selection.clone(),
        });
        self.published.send_replace(snapshot.clone());
        snapshot
    }

    pub fn set_date(&self, date: CalendarDay) -> Arc<Snapshot> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.selection = inner.selection.set_date(date, &inner.store, &self.config);
        tracing::debug!(
            %date,
            start_candidates = inner.selection.start_candidates().len(),
            "reservation date set"
        );
        self.publish(inner)
    }

    pub fn set_start_time(&self, start: Instant) -> Arc<Snapshot> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.selection = inner.selection.set_start_time(start, &inner.store, &self.config);
        tracing::debug!(
            %start,
            end_candidates = inner.selection.end_candidates().len(),
            "reservation start set"
        );
        self.publish(inner)
    }

    pub fn set_end_time(&self, end: Instant) -> Arc<Snapshot> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.selection = inner.selection.set_end_time(end);
        tracing::debug!(%end, "reservation end set");
        self.publish(inner)
    }

    /// Pick a room for the chosen window. `None` means the window was not
    /// offered or the room cannot cover it; nothing is published in that case.
    pub fn select_room(&self, room_id: RoomId) -> Option<Arc<Snapshot>> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(selection) = inner.selection.select_room(room_id, &inner.store) else {
            tracing::debug!(room_id, "room cannot cover the selected window");
            return None;
        };
        inner.selection = selection;
        tracing::debug!(room_id, "reservation room set");
        Some(self.publish(inner))
    }

    pub fn clear(&self) -> Arc<Snapshot> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.selection = inner.selection.clear();
        self.publish(inner)
    }

    /// Per-room runs covering a window, against the current store.
    pub fn find_covering_runs(
        &self,
        window_start: Instant,
        window_end: Instant,
    ) -> BTreeMap<RoomId, Vec<AvailableSlot>> {
        let snapshot = self.snapshot();
        matcher::find_covering_runs(&snapshot.store, window_start, window_end)
    }

    /// The current selection as a reservation, if it is complete and still valid.
    pub fn finalize(&self) -> Option<Reservation> {
        let snapshot = self.snapshot();
        snapshot.selection.finalize(&snapshot.store)
    }

    /// Start a refresh. Any earlier ticket that has not completed yet is now stale.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.latest_ticket += 1;
        RefreshTicket {
            generation: inner.latest_ticket,
        }
    }

    /// Apply a fetch result for `ticket`.
    ///
    /// # Errors
    /// A fetch failure is returned unchanged and the published store is kept.
    /// A stale ticket is reported as [`RefreshOutcome::Superseded`] whether its
    /// fetch succeeded or not.
    pub fn complete_refresh(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Slot>>,
    ) -> Result<RefreshOutcome> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if ticket.generation != inner.latest_ticket {
            tracing::debug!(
                ticket = ticket.generation,
                latest = inner.latest_ticket,
                "discarding superseded refresh"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "refresh failed, keeping previous slots");
                return Err(err);
            }
        };

        let store = SlotStore::refresh(&raw, &self.catalog);
        let slots = store.len();
        inner.selection = inner.selection.refreshed(&store, &self.config);
        inner.store = store;
        let snapshot = self.publish(inner);
        tracing::info!(slots, fetched = raw.len(), revision = snapshot.revision, "slot store refreshed");
        Ok(RefreshOutcome::Applied { slots })
    }

    /// Fetch from `source` and apply the result unless a newer refresh started
    /// in the meantime. The lock is not held while the fetch is pending.
    pub async fn refresh_from<S: SlotSource>(
        &self,
        source: &S,
        request: &AvailabilityRequest,
    ) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh();
        let result = source.fetch_slots(request).await;
        self.complete_refresh(ticket, result)
    }
}
