//! Engine tunables.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::ops::RangeInclusive;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::libcal::DEFAULT_PAGE_SIZE;
use crate::model::{CalendarDay, SLOT_MINUTES};

pub const DEFAULT_MAX_RESERVATION_MINUTES: i64 = 180;
pub const DEFAULT_BOOKING_HORIZON_DAYS: i64 = 14;
/// Longest reservation a config may allow: one day.
pub const MAX_RESERVATION_MINUTES: i64 = 24 * 60;
/// Furthest booking horizon a config may allow.
pub const MAX_BOOKING_HORIZON_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound on the length of a reservation.
    pub max_reservation_minutes: i64,
    /// Restrict start candidates to slots on the selected day.
    pub filter_start_by_date: bool,
    /// How many days past today can be selected.
    pub booking_horizon_days: i64,
    /// Page size used for grid requests.
    pub page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reservation_minutes: DEFAULT_MAX_RESERVATION_MINUTES,
            filter_start_by_date: true,
            booking_horizon_days: DEFAULT_BOOKING_HORIZON_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(SLOT_MINUTES..=MAX_RESERVATION_MINUTES).contains(&self.max_reservation_minutes) {
            return Err(ConfigError::Invalid(format!(
                "max_reservation_minutes must be between {SLOT_MINUTES} and {MAX_RESERVATION_MINUTES}, got {}",
                self.max_reservation_minutes
            )));
        }
        if !(0..=MAX_BOOKING_HORIZON_DAYS).contains(&self.booking_horizon_days) {
            return Err(ConfigError::Invalid(format!(
                "booking_horizon_days must be between 0 and {MAX_BOOKING_HORIZON_DAYS}, got {}",
                self.booking_horizon_days
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be positive".into()));
        }
        Ok(())
    }

    /// Clamped to the range that loading accepts.
    pub fn max_reservation(&self) -> Duration {
        Duration::minutes(
            self.max_reservation_minutes
                .clamp(SLOT_MINUTES, MAX_RESERVATION_MINUTES),
        )
    }

    /// Days a user may pick, starting today.
    pub fn bookable_dates(&self, today: CalendarDay) -> RangeInclusive<CalendarDay> {
        let horizon = Duration::days(self.booking_horizon_days.clamp(0, MAX_BOOKING_HORIZON_DAYS));
        let last = today.checked_add_signed(horizon).unwrap_or(today);
        today..=last
    }
}
