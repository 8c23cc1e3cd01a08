// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur during domain validation and pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No rate block matches the visit.
    ///
    /// This is recoverable per visit: the ledger generator includes the
    /// visit as an unpriced, flagged line rather than dropping it.
    NoRateRuleFound {
        /// The visit identifier.
        visit_id: i64,
        /// The service code requested by the visit.
        service: String,
        /// The day type of the visit.
        day_type: String,
    },
    /// More than one rate block matches the visit.
    ///
    /// Overlapping blocks are a configuration error; the resolver surfaces
    /// them instead of picking one arbitrarily.
    AmbiguousRateRule {
        /// The visit identifier.
        visit_id: i64,
        /// The identifiers of all matching rate blocks.
        matching_block_ids: Vec<i64>,
    },
    /// A rate block failed validation.
    InvalidRateBlock {
        /// Description of the validation error.
        reason: String,
    },
    /// A visit record failed validation.
    InvalidVisit {
        /// The visit identifier.
        visit_id: i64,
        /// Description of the validation error.
        reason: String,
    },
    /// Day type string is not recognised.
    InvalidDayType(String),
    /// Client category string is not recognised.
    InvalidClientCategory(String),
    /// A time window is malformed.
    InvalidTimeWindow {
        /// Description of the validation error.
        reason: String,
    },
    /// A billing period has its start after its end.
    InvalidPeriod {
        /// The period start date.
        start_date: Date,
        /// The period end date.
        end_date: Date,
    },
    /// A monetary amount string could not be parsed.
    AmountParseError {
        /// The invalid amount string.
        amount_string: String,
    },
    /// Failed to parse a date or time from a string.
    DateParseError {
        /// The invalid date/time string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRateRuleFound {
                visit_id,
                service,
                day_type,
            } => {
                write!(
                    f,
                    "No rate rule found for visit {visit_id} (service '{service}', day '{day_type}')"
                )
            }
            Self::AmbiguousRateRule {
                visit_id,
                matching_block_ids,
            } => {
                write!(
                    f,
                    "Ambiguous rate configuration for visit {visit_id}: blocks {matching_block_ids:?} all match"
                )
            }
            Self::InvalidRateBlock { reason } => write!(f, "Invalid rate block: {reason}"),
            Self::InvalidVisit { visit_id, reason } => {
                write!(f, "Invalid visit {visit_id}: {reason}")
            }
            Self::InvalidDayType(value) => write!(f, "Invalid day type: {value}"),
            Self::InvalidClientCategory(value) => {
                write!(f, "Invalid client category: {value}")
            }
            Self::InvalidTimeWindow { reason } => write!(f, "Invalid time window: {reason}"),
            Self::InvalidPeriod {
                start_date,
                end_date,
            } => {
                write!(
                    f,
                    "Invalid billing period: start {start_date} is after end {end_date}"
                )
            }
            Self::AmountParseError { amount_string } => {
                write!(f, "Failed to parse amount '{amount_string}'")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
