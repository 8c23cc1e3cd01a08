// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;
use time::Time;

/// Classification of a visit's calendar day.
///
/// Day classification (including bank-holiday detection) is derived upstream
/// by the booking system and carried on each visit record. Rate blocks list
/// the day types they fire on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DayType {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    /// A recognised public holiday, regardless of weekday.
    BankHoliday,
}

impl FromStr for DayType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(Self::Monday),
            "tuesday" => Ok(Self::Tuesday),
            "wednesday" => Ok(Self::Wednesday),
            "thursday" => Ok(Self::Thursday),
            "friday" => Ok(Self::Friday),
            "saturday" => Ok(Self::Saturday),
            "sunday" => Ok(Self::Sunday),
            "bank_holiday" => Ok(Self::BankHoliday),
            _ => Err(DomainError::InvalidDayType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DayType {
    /// Converts this day type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
            Self::BankHoliday => "bank_holiday",
        }
    }

    /// Derives the weekday day type for a calendar date.
    ///
    /// This never returns `BankHoliday`; holiday classification is an
    /// upstream concern and is applied over the weekday value.
    #[must_use]
    pub const fn from_date(date: Date) -> Self {
        match date.weekday() {
            time::Weekday::Monday => Self::Monday,
            time::Weekday::Tuesday => Self::Tuesday,
            time::Weekday::Wednesday => Self::Wednesday,
            time::Weekday::Thursday => Self::Thursday,
            time::Weekday::Friday => Self::Friday,
            time::Weekday::Saturday => Self::Saturday,
            time::Weekday::Sunday => Self::Sunday,
        }
    }

    /// Returns whether this day type is the bank-holiday classification.
    #[must_use]
    pub const fn is_bank_holiday(&self) -> bool {
        matches!(self, Self::BankHoliday)
    }
}

/// Client category a rate block is scoped to.
///
/// Mirrors the agency's commissioning categories: standard domiciliary care,
/// adult specialist care, and children & young people (CYP) services.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ClientCategory {
    Standard,
    Adult,
    Cyp,
}

impl FromStr for ClientCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "adult" => Ok(Self::Adult),
            "cyp" => Ok(Self::Cyp),
            _ => Err(DomainError::InvalidClientCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for ClientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ClientCategory {
    /// Converts this category to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Adult => "adult",
            Self::Cyp => "cyp",
        }
    }
}

/// Represents a service identifier.
///
/// Service codes are normalized to uppercase to ensure case-insensitive
/// uniqueness across rate block configuration and visit records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceId {
    /// The service code (e.g., "PERSONAL-CARE").
    code: String,
}

impl ServiceId {
    /// Creates a new `ServiceId`.
    ///
    /// # Arguments
    ///
    /// * `code` - The service code (will be normalized to uppercase)
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_uppercase(),
        }
    }

    /// Returns the service code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A time-of-day window during which a rate block is effective.
///
/// The window is half-open: a visit matches when its start time satisfies
/// `from <= start < until`. Windows never span midnight; an all-day rule is
/// expressed by omitting the window entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start of the window.
    from: Time,
    /// Exclusive end of the window.
    until: Time,
}

impl TimeWindow {
    /// Creates a new `TimeWindow`.
    ///
    /// # Arguments
    ///
    /// * `from` - Inclusive start of the window
    /// * `until` - Exclusive end of the window
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeWindow` if `from` is not strictly
    /// before `until`.
    pub fn new(from: Time, until: Time) -> Result<Self, DomainError> {
        if from >= until {
            return Err(DomainError::InvalidTimeWindow {
                reason: format!("window start {from} must be before window end {until}"),
            });
        }
        Ok(Self { from, until })
    }

    /// Returns the inclusive start of the window.
    #[must_use]
    pub const fn from(&self) -> Time {
        self.from
    }

    /// Returns the exclusive end of the window.
    #[must_use]
    pub const fn until(&self) -> Time {
        self.until
    }

    /// Checks whether a time of day falls within this window.
    #[must_use]
    pub fn contains(&self, time: Time) -> bool {
        self.from <= time && time < self.until
    }
}

/// An inclusive billing period over calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// First day of the period (inclusive).
    start_date: Date,
    /// Last day of the period (inclusive).
    end_date: Date,
}

impl BillingPeriod {
    /// Creates a new `BillingPeriod`.
    ///
    /// # Arguments
    ///
    /// * `start_date` - First day of the period (inclusive)
    /// * `end_date` - Last day of the period (inclusive)
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` if the start date is after the
    /// end date.
    pub fn new(start_date: Date, end_date: Date) -> Result<Self, DomainError> {
        if start_date > end_date {
            return Err(DomainError::InvalidPeriod {
                start_date,
                end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Returns the first day of the period.
    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the last day of the period.
    #[must_use]
    pub const fn end_date(&self) -> Date {
        self.end_date
    }

    /// Checks whether a date falls within the period (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
