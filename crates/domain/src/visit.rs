// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ClientCategory, DayType, ServiceId};
use serde::{Deserialize, Serialize};
use time::{Date, Time};

/// Minutes in a full day, used for midnight-wrapping duration arithmetic.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// A service-delivery record supplied by the booking system.
///
/// Visits are external input to the ledger engine and are immutable once
/// invoiced. Day classification (weekday name or bank holiday) is derived
/// upstream and carried on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// The canonical numeric identifier assigned by the booking store.
    pub visit_id: i64,
    /// The client this visit was delivered to.
    pub client_id: i64,
    /// The calendar date of the visit.
    pub date: Date,
    /// Day classification for rate selection.
    pub day_type: DayType,
    /// Time the visit started.
    pub start_time: Time,
    /// Time the visit ended. An end at or before the start means the
    /// visit ran past midnight into the following day.
    pub end_time: Time,
    /// The service delivered.
    pub service_id: ServiceId,
    /// The client's category for rate selection.
    pub client_category: ClientCategory,
}

impl Visit {
    /// Creates a new `Visit`.
    ///
    /// # Arguments
    ///
    /// * `visit_id` - The canonical visit identifier
    /// * `client_id` - The client the visit was delivered to
    /// * `date` - The calendar date of the visit
    /// * `day_type` - Day classification for rate selection
    /// * `start_time` - Time the visit started
    /// * `end_time` - Time the visit ended
    /// * `service_id` - The service delivered
    /// * `client_category` - The client's category
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        visit_id: i64,
        client_id: i64,
        date: Date,
        day_type: DayType,
        start_time: Time,
        end_time: Time,
        service_id: ServiceId,
        client_category: ClientCategory,
    ) -> Self {
        Self {
            visit_id,
            client_id,
            date,
            day_type,
            start_time,
            end_time,
            service_id,
            client_category,
        }
    }

    /// Returns the delivered duration in minutes.
    ///
    /// An end time at or before the start time wraps past midnight: a
    /// 22:00-01:00 sit is 180 minutes, not negative. Seconds are ignored;
    /// visit times are recorded to minute precision.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        let start: i64 = i64::from(self.start_time.hour()) * 60 + i64::from(self.start_time.minute());
        let end: i64 = i64::from(self.end_time.hour()) * 60 + i64::from(self.end_time.minute());

        let minutes: i64 = if end > start {
            end - start
        } else {
            end + MINUTES_PER_DAY - start
        };

        u32::try_from(minutes).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn make_visit(start: Time, end: Time) -> Visit {
        Visit::new(
            1,
            10,
            date!(2026 - 03 - 02),
            DayType::Monday,
            start,
            end,
            ServiceId::new("personal-care"),
            ClientCategory::Standard,
        )
    }

    #[test]
    fn test_duration_simple() {
        let visit: Visit = make_visit(time!(09:00), time!(11:00));
        assert_eq!(visit.duration_minutes(), 120);
    }

    #[test]
    fn test_duration_partial_hour() {
        let visit: Visit = make_visit(time!(14:15), time!(14:57));
        assert_eq!(visit.duration_minutes(), 42);
    }

    #[test]
    fn test_duration_wraps_midnight() {
        let visit: Visit = make_visit(time!(22:00), time!(01:00));
        assert_eq!(visit.duration_minutes(), 180);
    }

    #[test]
    fn test_duration_full_day_when_times_equal() {
        let visit: Visit = make_visit(time!(08:00), time!(08:00));
        assert_eq!(visit.duration_minutes(), 1440);
    }

    #[test]
    fn test_service_code_normalized() {
        let visit: Visit = make_visit(time!(09:00), time!(10:00));
        assert_eq!(visit.service_id.code(), "PERSONAL-CARE");
    }
}
