//! Tests for the date → start → end → room selection cascade.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use room_window::config::EngineConfig;
use room_window::model::{AvailableSlot, Capacity, Category, Floor, StudyRoom};
use room_window::selection::{Selection, SelectionState};
use room_window::store::SlotStore;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn on(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, minute, 0).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    on(1, hour, minute)
}

fn room(id: u32, name: &str) -> StudyRoom {
    StudyRoom {
        id,
        name: name.to_string(),
        capacity: Capacity { id: 1, minimum: 1, maximum: 4 },
        floor: Floor { id: 1, level: 1 },
        category: Category { id: 1, name: "Group Study".to_string() },
    }
}

fn slot(room: &StudyRoom, start: NaiveDateTime, token: &str) -> AvailableSlot {
    AvailableSlot {
        room: room.clone(),
        start,
        end: start + Duration::minutes(30),
        identity_token: token.to_string(),
    }
}

/// R1 free 09:00–11:00 on March 1st, R2 free 09:30–10:30, plus one R1 slot on
/// March 2nd.
fn store() -> SlotStore {
    let r1 = room(1, "R1");
    let r2 = room(2, "R2");
    SlotStore::from_slots(vec![
        slot(&r1, at(9, 0), "r1-0900"),
        slot(&r1, at(9, 30), "r1-0930"),
        slot(&r1, at(10, 0), "r1-1000"),
        slot(&r1, at(10, 30), "r1-1030"),
        slot(&r2, at(9, 30), "r2-0930"),
        slot(&r2, at(10, 0), "r2-1000"),
        slot(&r1, on(2, 8, 0), "r1-next-day"),
    ])
}

fn config() -> EngineConfig {
    EngineConfig::default()
}

// ── States ──────────────────────────────────────────────────────────────────

#[test]
fn new_selection_is_empty() {
    let selection = Selection::new();
    assert_eq!(selection.state(), SelectionState::Empty);
    assert!(selection.start_candidates().is_empty());
    assert!(selection.end_candidates().is_empty());
}

#[test]
fn states_follow_the_cascade() {
    let store = store();
    let s = Selection::new().set_date(day(1), &store, &config());
    assert_eq!(s.state(), SelectionState::DateSelected);
    let s = s.set_start_time(at(9, 30), &store, &config());
    assert_eq!(s.state(), SelectionState::StartSelected);
    let s = s.set_end_time(at(10, 30));
    assert_eq!(s.state(), SelectionState::EndSelected);
    let s = s.select_room(2, &store).unwrap();
    assert_eq!(s.state(), SelectionState::Complete);
}

// ── Date ────────────────────────────────────────────────────────────────────

#[test]
fn start_candidates_are_distinct_sorted_and_day_filtered() {
    let s = Selection::new().set_date(day(1), &store(), &config());
    assert_eq!(
        s.start_candidates(),
        &[at(9, 0), at(9, 30), at(10, 0), at(10, 30)]
    );
}

#[test]
fn start_candidates_span_all_days_when_filter_disabled() {
    let config = EngineConfig {
        filter_start_by_date: false,
        ..EngineConfig::default()
    };
    let s = Selection::new().set_date(day(1), &store(), &config);
    assert_eq!(s.start_candidates().len(), 5);
    assert_eq!(s.start_candidates().last(), Some(&on(2, 8, 0)));
}

#[test]
fn setting_date_clears_start_end_and_room() {
    let store = store();
    let complete = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config())
        .set_end_time(at(10, 0))
        .select_room(1, &store)
        .unwrap();

    let s = complete.set_date(day(2), &store, &config());

    assert_eq!(s.intent().date, Some(day(2)));
    assert_eq!(s.intent().start_time, None);
    assert_eq!(s.intent().end_time, None);
    assert_eq!(s.intent().room_id, None);
    assert_eq!(s.intent().identity_token, None);
    assert!(s.end_candidates().is_empty());
    assert_eq!(s.start_candidates(), &[on(2, 8, 0)]);
}

// ── Start ───────────────────────────────────────────────────────────────────

#[test]
fn end_candidates_stop_at_three_hours() {
    let r1 = room(1, "R1");
    let store = SlotStore::from_slots(vec![
        slot(&r1, at(9, 0), "a"),
        slot(&r1, at(10, 0), "b"),
        slot(&r1, at(12, 0), "c"),
    ]);

    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config());

    assert_eq!(s.end_candidates(), &[at(9, 30), at(10, 30)]);
}

#[test]
fn end_candidates_are_distinct_across_rooms() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config());

    assert_eq!(s.end_candidates(), &[at(10, 0), at(10, 30), at(11, 0)]);
    for end in s.end_candidates() {
        assert!(*end - at(9, 30) <= Duration::hours(3));
        assert!(*end > at(9, 30));
    }
}

#[test]
fn shorter_ceiling_from_config_is_honoured() {
    let config = EngineConfig {
        max_reservation_minutes: 60,
        ..EngineConfig::default()
    };
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config)
        .set_start_time(at(9, 0), &store, &config);

    assert_eq!(s.end_candidates(), &[at(9, 30), at(10, 0)]);
}

#[test]
fn setting_start_clears_end_and_room_but_keeps_date() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config())
        .set_end_time(at(10, 0))
        .select_room(1, &store)
        .unwrap()
        .set_start_time(at(9, 30), &store, &config());

    assert_eq!(s.intent().date, Some(day(1)));
    assert_eq!(s.intent().start_time, Some(at(9, 30)));
    assert_eq!(s.intent().end_time, None);
    assert_eq!(s.intent().room_id, None);
    assert_eq!(s.start_candidates().len(), 4);
}

#[test]
fn start_outside_candidates_yields_no_ends() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 15), &store, &config());

    assert_eq!(s.intent().start_time, Some(at(9, 15)));
    assert!(s.end_candidates().is_empty());
}

// ── End and room ────────────────────────────────────────────────────────────

#[test]
fn setting_end_keeps_candidates_and_clears_room() {
    let store = store();
    let with_room = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30))
        .select_room(2, &store)
        .unwrap();

    let s = with_room.set_end_time(at(10, 0));

    assert_eq!(s.intent().room_id, None);
    assert_eq!(s.end_candidates(), with_room.end_candidates());
}

#[test]
fn room_options_list_covering_rooms() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(11, 0));

    let options = s.room_options(&store);
    assert_eq!(options.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert!(Selection::new().room_options(&store).is_empty());
}

#[test]
fn room_that_cannot_cover_is_refused() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config())
        .set_end_time(at(10, 0));

    assert!(s.select_room(2, &store).is_none());
    assert!(Selection::new().select_room(1, &store).is_none());
}

#[test]
fn room_is_refused_for_an_end_past_the_ceiling() {
    let r1 = room(1, "R1");
    let store = SlotStore::from_slots(
        (0..10)
            .map(|i| slot(&r1, at(9, 0) + Duration::minutes(30 * i), &format!("r1-{i}")))
            .collect(),
    );
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config());
    assert_eq!(s.end_candidates().last(), Some(&at(12, 0)));

    let too_long = s.set_end_time(at(13, 0));
    assert_eq!(too_long.room_options(&store).keys().copied().collect::<Vec<_>>(), vec![1]);
    assert!(too_long.select_room(1, &store).is_none());
    assert!(too_long.finalize(&store).is_none());

    let reservation = s
        .set_end_time(at(12, 0))
        .select_room(1, &store)
        .unwrap()
        .finalize(&store)
        .unwrap();
    assert_eq!(reservation.end - reservation.start, Duration::hours(3));
    assert_eq!(reservation.slot_tokens.len(), 6);
}

#[test]
fn room_is_refused_for_a_start_outside_candidates() {
    let store = store();
    let s = Selection::new()
        .set_date(day(2), &store, &config())
        .set_start_time(at(9, 0), &store, &config())
        .set_end_time(at(10, 0));

    assert!(s.end_candidates().is_empty());
    assert!(s.select_room(1, &store).is_none());
}

#[test]
fn finalize_returns_the_whole_run() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30))
        .select_room(2, &store)
        .unwrap();

    let reservation = s.finalize(&store).unwrap();
    assert_eq!(reservation.room.id, 2);
    assert_eq!(reservation.start, at(9, 30));
    assert_eq!(reservation.end, at(10, 30));
    assert_eq!(reservation.identity_token, "r2-0930");
    assert_eq!(reservation.slot_tokens, vec!["r2-0930", "r2-1000"]);
}

#[test]
fn finalize_requires_every_field() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30));

    assert!(s.finalize(&store).is_none());
}

#[test]
fn finalize_fails_once_the_store_no_longer_covers() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30))
        .select_room(2, &store)
        .unwrap();

    let r2 = room(2, "R2");
    let shrunk = SlotStore::from_slots(vec![slot(&r2, at(9, 30), "r2-0930")]);
    assert!(s.finalize(&shrunk).is_none());
}

#[test]
fn clear_returns_to_empty() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 0), &store, &config())
        .clear();
    assert_eq!(s, Selection::new());
}

// ── Refresh ─────────────────────────────────────────────────────────────────

#[test]
fn refresh_keeps_choices_still_offered() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30))
        .select_room(2, &store)
        .unwrap();

    let refreshed = s.refreshed(&store, &config());
    assert_eq!(refreshed, s);
}

#[test]
fn refresh_clears_from_the_first_choice_no_longer_offered() {
    let store = store();
    let s = Selection::new()
        .set_date(day(1), &store, &config())
        .set_start_time(at(9, 30), &store, &config())
        .set_end_time(at(10, 30))
        .select_room(2, &store)
        .unwrap();

    // R2 loses its 10:00 slot, R1 still covers 09:30–10:30.
    let r1 = room(1, "R1");
    let r2 = room(2, "R2");
    let next = SlotStore::from_slots(vec![
        slot(&r1, at(9, 30), "r1-0930"),
        slot(&r1, at(10, 0), "r1-1000"),
        slot(&r2, at(9, 30), "r2-0930"),
    ]);
    let refreshed = s.refreshed(&next, &config());
    assert_eq!(refreshed.intent().end_time, Some(at(10, 30)));
    assert_eq!(refreshed.intent().room_id, None);
    assert_eq!(refreshed.state(), SelectionState::EndSelected);

    // Nothing starts at 09:30 any more.
    let later = SlotStore::from_slots(vec![slot(&r1, at(11, 0), "r1-1100")]);
    let refreshed = s.refreshed(&later, &config());
    assert_eq!(refreshed.intent().date, Some(day(1)));
    assert_eq!(refreshed.intent().start_time, None);
    assert_eq!(refreshed.start_candidates(), &[at(11, 0)]);
    assert!(refreshed.end_candidates().is_empty());
}

#[test]
fn refresh_of_empty_selection_stays_empty() {
    let s = Selection::new().refreshed(&store(), &config());
    assert_eq!(s.state(), SelectionState::Empty);
    assert!(s.start_candidates().is_empty());
}
