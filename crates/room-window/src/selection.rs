//! Cascading reservation selection: date, then start, then end, then room.
//!
//! Every transition takes the current slot store and returns a new
//! [`Selection`] with its candidate lists rebuilt from scratch. Changing a field
//! clears every field after it in the cascade and never touches the ones
//! before it. Nothing here fails: a choice that does not fit the store just
//! produces empty candidate lists.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::matcher;
use crate::model::{AvailableSlot, CalendarDay, Instant, Reservation, RoomId};
use crate::store::SlotStore;

/// How far along the cascade a selection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SelectionState {
    Empty,
    DateSelected,
    StartSelected,
    EndSelected,
    Complete,
}

/// The user's in-progress booking choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationIntent {
    pub date: Option<CalendarDay>,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    pub room_id: Option<RoomId>,
    pub identity_token: Option<String>,
}

impl ReservationIntent {
    /// Highest state consistent with the fields that are set.
    pub fn state(&self) -> SelectionState {
        match (self.date, self.start_time, self.end_time) {
            (None, _, _) => SelectionState::Empty,
            (Some(_), None, _) => SelectionState::DateSelected,
            (Some(_), Some(_), None) => SelectionState::StartSelected,
            (Some(_), Some(_), Some(_)) => {
                if self.room_id.is_some() && self.identity_token.is_some() {
                    SelectionState::Complete
                } else {
                    SelectionState::EndSelected
                }
            }
        }
    }

    fn clear_room(&mut self) {
        self.room_id = None;
        self.identity_token = None;
    }

    fn clear_end(&mut self) {
        self.end_time = None;
        self.clear_room();
    }

    fn clear_start(&mut self) {
        self.start_time = None;
        self.clear_end();
    }
}

/// An intent together with the candidates derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    intent: ReservationIntent,
    start_candidates: Vec<Instant>,
    end_candidates: Vec<Instant>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(&self) -> &ReservationIntent {
        &self.intent
    }

    pub fn state(&self) -> SelectionState {
        self.intent.state()
    }

    /// Distinct selectable start times, ascending.
    pub fn start_candidates(&self) -> &[Instant] {
        &self.start_candidates
    }

    /// Distinct selectable end times for the chosen start, ascending.
    pub fn end_candidates(&self) -> &[Instant] {
        &self.end_candidates
    }

    /// Pick a day. Clears start, end and room.
    pub fn set_date(&self, date: CalendarDay, store: &SlotStore, config: &EngineConfig) -> Self {
        let day_filter = config.filter_start_by_date.then_some(date);
        Self {
            intent: ReservationIntent {
                date: Some(date),
                ..ReservationIntent::default()
            },
            start_candidates: store.start_times(day_filter),
            end_candidates: Vec::new(),
        }
    }

    /// Pick a start time. Clears end and room.
    ///
    /// A start that is not among the current start candidates is recorded but
    /// yields no end candidates.
    pub fn set_start_time(&self, start: Instant, store: &SlotStore, config: &EngineConfig) -> Self {
        let mut intent = self.intent.clone();
        intent.start_time = Some(start);
        intent.clear_end();

        let end_candidates = if self.start_candidates.binary_search(&start).is_ok() {
            end_times(store, start, config)
        } else {
            Vec::new()
        };

        Self {
            intent,
            start_candidates: self.start_candidates.clone(),
            end_candidates,
        }
    }

    /// Pick an end time. Clears the room.
    pub fn set_end_time(&self, end: Instant) -> Self {
        let mut intent = self.intent.clone();
        intent.end_time = Some(end);
        intent.clear_room();
        Self {
            intent,
            ..self.clone()
        }
    }

    /// Pick a room whose slots cover the chosen window.
    ///
    /// Returns `None`, leaving the caller's selection as it was, when no end
    /// time is chosen yet, the end is not one of the end candidates, or the
    /// room cannot cover the window.
    pub fn select_room(&self, room_id: RoomId, store: &SlotStore) -> Option<Self> {
        let (start, end) = self.offered_window()?;
        let run = matcher::covering_run(store, room_id, start, end)?;
        let first = run.first()?;
        let mut intent = self.intent.clone();
        intent.room_id = Some(room_id);
        intent.identity_token = Some(first.identity_token.clone());
        Some(Self {
            intent,
            ..self.clone()
        })
    }

    /// Back to [`SelectionState::Empty`].
    pub fn clear(&self) -> Self {
        Self::default()
    }

    /// Rebuild candidates against a freshly published store.
    ///
    /// Each chosen field survives only while it is still offered by the new
    /// store; the first one that is not is cleared along with everything after it.
    pub fn refreshed(&self, store: &SlotStore, config: &EngineConfig) -> Self {
        let Some(date) = self.intent.date else {
            return Self::default();
        };
        let mut next = Self::new().set_date(date, store, config);

        let Some(start) = self.intent.start_time else {
            return next;
        };
        if next.start_candidates.binary_search(&start).is_err() {
            return next;
        }
        next = next.set_start_time(start, store, config);

        let Some(end) = self.intent.end_time else {
            return next;
        };
        if next.end_candidates.binary_search(&end).is_err() {
            return next;
        }
        next = next.set_end_time(end);

        match self.intent.room_id {
            Some(room_id) => next.select_room(room_id, store).unwrap_or(next),
            None => next,
        }
    }

    /// The chosen `[start, end)` window, once both ends are set.
    pub fn window(&self) -> Option<(Instant, Instant)> {
        Some((self.intent.start_time?, self.intent.end_time?))
    }

    /// The chosen window, only if its end is still an end candidate. End
    /// candidates exist only for an offered start and never pass the
    /// reservation ceiling, so this bounds both ends.
    fn offered_window(&self) -> Option<(Instant, Instant)> {
        let (start, end) = self.window()?;
        self.end_candidates.binary_search(&end).ok()?;
        Some((start, end))
    }

    /// Rooms that can host the chosen window, with their slot runs.
    pub fn room_options(&self, store: &SlotStore) -> BTreeMap<RoomId, Vec<AvailableSlot>> {
        match self.window() {
            Some((start, end)) => matcher::find_covering_runs(store, start, end),
            None => BTreeMap::new(),
        }
    }

    /// Resolve a complete intent into a reservation against `store`.
    ///
    /// Yields `None` unless every field is set, the end is an end candidate,
    /// and the chosen room still has a run covering the window that starts
    /// with the chosen slot.
    pub fn finalize(&self, store: &SlotStore) -> Option<Reservation> {
        let (start, end) = self.offered_window()?;
        let room_id = self.intent.room_id?;
        let token = self.intent.identity_token.as_ref()?;
        let run = matcher::covering_run(store, room_id, start, end)?;
        let first = run.first()?;
        if &first.identity_token != token {
            return None;
        }
        Some(Reservation {
            room: first.room.clone(),
            start,
            end,
            identity_token: token.clone(),
            slot_tokens: run.iter().map(|s| s.identity_token.clone()).collect(),
        })
    }
}

/// Distinct ends of slots that begin at or after `start` and finish within the
/// reservation ceiling.
fn end_times(store: &SlotStore, start: Instant, config: &EngineConfig) -> Vec<Instant> {
    let ceiling = start
        .checked_add_signed(config.max_reservation())
        .unwrap_or(NaiveDateTime::MAX);
    let mut ends: Vec<Instant> = store
        .iter()
        .filter(|slot| slot.start >= start && slot.end <= ceiling)
        .map(|slot| slot.end)
        .collect();
    ends.sort_unstable();
    ends.dedup();
    ends
}
