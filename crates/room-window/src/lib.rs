//! # room-window
//!
//! Bookable windows and cascading reservation selection for study rooms.
//!
//! An upstream availability grid offers fixed 30-minute slots per room. This
//! crate turns that flat grid into contiguous windows a user can actually book,
//! and drives the date → start → end → room selection that narrows a booking
//! down while the grid is refreshed underneath it.
//!
//! ## Modules
//!
//! - [`model`] — slot, room and reservation value types
//! - [`catalog`] — static room catalog, joined and indexed by room id
//! - [`libcal`] — availability-grid request body and response decoding
//! - [`store`] — the wholesale-replaced set of available slots
//! - [`matcher`] — per-room slot runs that exactly tile a window
//! - [`selection`] — the cascading selection state machine
//! - [`session`] — single-writer session publishing settled snapshots
//! - [`source`] — the slot-fetch seam
//! - [`config`] — engine tunables
//! - [`error`] — error types

pub mod catalog;
pub mod config;
pub mod error;
pub mod libcal;
pub mod matcher;
pub mod model;
pub mod selection;
pub mod session;
pub mod source;
pub mod store;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use error::{CatalogError, ConfigError, FetchError};
pub use libcal::{decode_grid, grid_endpoint, AvailabilityRequest};
pub use matcher::{covered_rooms, covering_run, find_covering_runs};
pub use model::{AvailableSlot, Reservation, Slot, StudyRoom};
pub use selection::{ReservationIntent, Selection, SelectionState};
pub use session::{RefreshOutcome, RefreshTicket, Session, Snapshot};
pub use source::{RecordedGrid, SlotSource};
pub use store::SlotStore;
