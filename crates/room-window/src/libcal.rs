//! LibCal availability-grid wire format.
//!
//! The grid endpoint takes a form-encoded POST body and answers with
//! `{"slots": [...]}`. Each slot carries `itemId`, `start`, `end` and `checksum`;
//! a slot that is already booked also carries a `className`. Timestamps are
//! library-local and formatted `yyyy-MM-dd HH:mm:ss`.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::{FetchError, Result};
use crate::model::{CalendarDay, Instant, RoomId, Slot};

/// Path of the availability grid, relative to the library's LibCal base URL.
pub const GRID_PATH: &str = "/spaces/availability/grid";

/// Content type of the grid request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

pub const DEFAULT_PAGE_SIZE: u32 = 18;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters of one availability-grid fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub location_id: u32,
    pub start: CalendarDay,
    pub end: CalendarDay,
    pub page_index: u32,
    pub page_size: u32,
}

impl AvailabilityRequest {
    /// A single-day request for the first page.
    pub fn new(location_id: u32, start: CalendarDay) -> Self {
        Self {
            location_id,
            start,
            end: start + Duration::days(1),
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_end(mut self, end: CalendarDay) -> Self {
        self.end = end;
        self
    }

    pub fn with_page(mut self, page_index: u32, page_size: u32) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Form-encoded request body.
    pub fn form_body(&self) -> String {
        format!(
            "lid={}&start={}&end={}&pageIndex={}&pageSize={}",
            self.location_id,
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.page_index,
            self.page_size,
        )
    }
}

/// Build the grid URL for a library base URL.
///
/// # Errors
/// Returns [`FetchError::InvalidEndpoint`] when the base URL is empty or is not
/// an absolute http(s) URL.
pub fn grid_endpoint(base_url: &str) -> Result<String> {
    let base = base_url.trim().trim_end_matches('/');
    let host = base
        .strip_prefix("https://")
        .or_else(|| base.strip_prefix("http://"))
        .ok_or_else(|| FetchError::InvalidEndpoint(base_url.to_string()))?;
    if host.is_empty() {
        return Err(FetchError::InvalidEndpoint(base_url.to_string()));
    }
    Ok(format!("{base}{GRID_PATH}"))
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    slots: Vec<GridSlot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridSlot {
    item_id: RoomId,
    #[serde(deserialize_with = "timestamp")]
    start: Instant,
    #[serde(deserialize_with = "timestamp")]
    end: Instant,
    checksum: String,
    #[serde(default)]
    class_name: Option<String>,
}

fn timestamp<'de, D>(deserializer: D) -> std::result::Result<Instant, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

/// Decode a grid response body into raw slots.
///
/// # Errors
/// Returns [`FetchError::Decode`] if the payload is not a well-formed grid response.
pub fn decode_grid(json: &str) -> Result<Vec<Slot>> {
    let response: GridResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(response
        .slots
        .into_iter()
        .map(|s| Slot {
            room_id: s.item_id,
            start: s.start,
            end: s.end,
            identity_token: s.checksum,
            is_available: s.class_name.is_none(),
        })
        .collect())
}
