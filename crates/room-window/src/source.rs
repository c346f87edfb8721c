//! The slot-fetch seam.
//!
//! The engine never performs network I/O. Whatever does (an HTTP client, a
//! replayed capture, a test double) implements [`SlotSource`] and the session
//! awaits it at exactly one point: [`crate::Session::refresh_from`].

use std::future::Future;

use crate::error::Result;
use crate::libcal::{self, AvailabilityRequest};
use crate::model::Slot;

/// Supplies raw grid slots for a location and date range.
pub trait SlotSource {
    fn fetch_slots(
        &self,
        request: &AvailabilityRequest,
    ) -> impl Future<Output = Result<Vec<Slot>>> + Send;
}

/// A grid response body captured earlier, decoded on every fetch.
///
/// The request is ignored; the recorded body is returned as-is.
#[derive(Debug, Clone)]
pub struct RecordedGrid {
    body: String,
}

impl RecordedGrid {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl SlotSource for RecordedGrid {
    async fn fetch_slots(&self, _request: &AvailabilityRequest) -> Result<Vec<Slot>> {
        libcal::decode_grid(&self.body)
    }
}
