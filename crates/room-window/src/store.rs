//! The slot store: every bookable slot known for a location.
//!
//! A store is built in one go from a fetch result and is never patched. The
//! backing storage is shared, so cloning a store is cheap and a published store
//! can be handed to readers while the next one is being built.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::model::{AvailableSlot, CalendarDay, Instant, RoomId, Slot};

#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    slots: Arc<[AvailableSlot]>,
}

impl SlotStore {
    /// Build a store from raw grid slots.
    ///
    /// Booked slots are dropped, as are slots whose room the catalog does not
    /// know. The remainder is stably sorted by room name. Duplicate tokens are
    /// kept.
    pub fn refresh(raw: &[Slot], catalog: &Catalog) -> Self {
        let mut unresolved = 0usize;
        let mut slots: Vec<AvailableSlot> = raw
            .iter()
            .filter(|slot| slot.is_available)
            .filter_map(|slot| {
                let resolved = AvailableSlot::resolve(slot, catalog.resolve_room(slot.room_id));
                if resolved.is_none() {
                    unresolved += 1;
                }
                resolved
            })
            .collect();

        if unresolved > 0 {
            tracing::debug!(unresolved, "dropped slots for rooms missing from catalog");
        }

        slots.sort_by(|a, b| a.room.name.cmp(&b.room.name));

        Self {
            slots: slots.into(),
        }
    }

    pub fn from_slots(slots: Vec<AvailableSlot>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    pub fn slots(&self) -> &[AvailableSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &AvailableSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distinct slot start times, ascending. With `day`, only starts on that day.
    pub fn start_times(&self, day: Option<CalendarDay>) -> Vec<Instant> {
        let mut starts: Vec<Instant> = self
            .slots
            .iter()
            .map(|slot| slot.start)
            .filter(|start| day.is_none_or(|d| start.date() == d))
            .collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    pub fn slots_for_room(&self, room_id: RoomId) -> impl Iterator<Item = &AvailableSlot> {
        self.slots.iter().filter(move |slot| slot.room.id == room_id)
    }

    /// Whether two stores share the same backing storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}
