//! Find rooms whose slots tile a requested window.
//!
//! The grid only ever offers fixed 30-minute slots, so a window is bookable in a
//! room exactly when that room has a gap-free chain of slots starting at the
//! window start and reaching the window end.

use std::collections::BTreeMap;

use crate::model::{slot_quantum, AvailableSlot, Instant, RoomId, StudyRoom};
use crate::store::SlotStore;

/// Per-room runs of slots that exactly tile `[window_start, window_end)`.
///
/// Rooms without full coverage are absent from the map. An empty or inverted
/// window matches nothing.
pub fn find_covering_runs(
    store: &SlotStore,
    window_start: Instant,
    window_end: Instant,
) -> BTreeMap<RoomId, Vec<AvailableSlot>> {
    if window_end <= window_start {
        return BTreeMap::new();
    }

    // Start containment only; the walk below rejects slots that overrun.
    let mut by_room: BTreeMap<RoomId, Vec<&AvailableSlot>> = BTreeMap::new();
    for slot in store
        .iter()
        .filter(|s| s.start >= window_start && s.start < window_end)
    {
        by_room.entry(slot.room.id).or_default().push(slot);
    }

    by_room
        .into_iter()
        .filter_map(|(room_id, mut candidates)| {
            candidates.sort_by_key(|s| s.start);
            walk_run(&candidates, window_start, window_end).map(|run| (room_id, run))
        })
        .collect()
}

/// Walk start-sorted slots of one room, accepting each slot that begins at the
/// cursor and spans exactly one quantum. Slots that do not line up are skipped
/// without resetting the cursor.
///
/// A window whose length is not a whole number of quanta is never covered: the
/// cursor steps past its end instead of landing on it.
fn walk_run(
    sorted: &[&AvailableSlot],
    window_start: Instant,
    window_end: Instant,
) -> Option<Vec<AvailableSlot>> {
    let quantum = slot_quantum();
    let mut cursor = window_start;
    let mut run = Vec::new();

    for slot in sorted {
        if slot.start == cursor && slot.end == cursor + quantum {
            run.push((*slot).clone());
            cursor = slot.end;
            if cursor >= window_end {
                return (cursor == window_end).then_some(run);
            }
        }
    }

    None
}

/// The covering run for a single room, if it has one.
pub fn covering_run(
    store: &SlotStore,
    room_id: RoomId,
    window_start: Instant,
    window_end: Instant,
) -> Option<Vec<AvailableSlot>> {
    if window_end <= window_start {
        return None;
    }
    let mut candidates: Vec<&AvailableSlot> = store
        .slots_for_room(room_id)
        .filter(|s| s.start >= window_start && s.start < window_end)
        .collect();
    candidates.sort_by_key(|s| s.start);
    walk_run(&candidates, window_start, window_end)
}

/// Rooms that can host the whole window, sorted by room name.
pub fn covered_rooms(store: &SlotStore, window_start: Instant, window_end: Instant) -> Vec<StudyRoom> {
    let mut rooms: Vec<StudyRoom> = find_covering_runs(store, window_start, window_end)
        .into_values()
        .filter_map(|run| run.into_iter().next().map(|slot| slot.room))
        .collect();
    rooms.sort_by(|a, b| a.name.cmp(&b.name));
    rooms
}
