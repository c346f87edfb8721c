//! Slot and room value types.
//!
//! Timestamps are library-local wall-clock times. The upstream grid carries no
//! UTC offset, so instants are kept as [`NaiveDateTime`] and calendar days as
//! [`NaiveDate`].

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A point in library-local time.
pub type Instant = NaiveDateTime;

/// A calendar day in library-local time.
pub type CalendarDay = NaiveDate;

/// Identifier shared by the room catalog and the availability feed.
pub type RoomId = u32;

/// Length of one grid slot in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Length of one grid slot.
pub fn slot_quantum() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// One raw grid cell as issued upstream, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub room_id: RoomId,
    pub start: Instant,
    pub end: Instant,
    /// Opaque upstream checksum identifying this slot instance.
    pub identity_token: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub id: u32,
    pub minimum: u32,
    pub maximum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: u32,
    pub level: i32,
}

/// A bookable room with its floor, category and capacity joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRoom {
    pub id: RoomId,
    pub name: String,
    pub capacity: Capacity,
    pub floor: Floor,
    pub category: Category,
}

/// A [`Slot`] resolved against the room catalog.
///
/// Equality is by identity token only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub room: StudyRoom,
    pub start: Instant,
    pub end: Instant,
    pub identity_token: String,
}

impl AvailableSlot {
    /// Pair a raw slot with its room. Yields `None` when the room is unknown.
    pub fn resolve(slot: &Slot, room: Option<&StudyRoom>) -> Option<Self> {
        let room = room?;
        Some(Self {
            room: room.clone(),
            start: slot.start,
            end: slot.end,
            identity_token: slot.identity_token.clone(),
        })
    }

    pub fn room_id(&self) -> RoomId {
        self.room.id
    }
}

impl PartialEq for AvailableSlot {
    fn eq(&self, other: &Self) -> bool {
        self.identity_token == other.identity_token
    }
}

impl Eq for AvailableSlot {}

/// A fully resolved booking, ready to hand to the booking collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub room: StudyRoom,
    pub start: Instant,
    pub end: Instant,
    /// Token of the first slot in the run.
    pub identity_token: String,
    /// Tokens of every slot in the run, in start order.
    pub slot_tokens: Vec<String>,
}
