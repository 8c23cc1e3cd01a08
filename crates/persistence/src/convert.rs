// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between stored text columns and domain values.
//!
//! `SQLite` stores dates, times, and money as text: dates as ISO 8601,
//! times as `HH:MM:SS`, and monetary values as canonical `Decimal`
//! strings. Conversions are symmetric so that every value round-trips
//! exactly.

use crate::error::PersistenceError;
use care_ledger_domain::{ClientCategory, DayType, ServiceId};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

/// Storage format for time-of-day columns.
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// Formats a date for storage.
#[must_use]
pub fn date_to_text(date: Date) -> String {
    date.to_string()
}

/// Parses a stored date column.
///
/// # Errors
///
/// Returns a reconstruction error if the column does not hold an ISO 8601
/// date.
pub fn parse_date(text: &str) -> Result<Date, PersistenceError> {
    Date::parse(text, &time::format_description::well_known::Iso8601::DEFAULT).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid stored date '{text}': {e}"))
    })
}

/// Formats a time of day for storage.
///
/// # Errors
///
/// Returns a serialization error if formatting fails.
pub fn time_to_text(time: Time) -> Result<String, PersistenceError> {
    time.format(&TIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("Invalid time value: {e}")))
}

/// Parses a stored time-of-day column.
///
/// # Errors
///
/// Returns a reconstruction error if the column does not hold `HH:MM:SS`.
pub fn parse_time(text: &str) -> Result<Time, PersistenceError> {
    Time::parse(text, &TIME_FORMAT).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid stored time '{text}': {e}"))
    })
}

/// Formats a monetary or rate value for storage.
#[must_use]
pub fn decimal_to_text(value: Decimal) -> String {
    value.to_string()
}

/// Parses a stored decimal column.
///
/// # Errors
///
/// Returns a reconstruction error if the column does not hold a decimal.
pub fn parse_decimal(text: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(text).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid stored decimal '{text}': {e}"))
    })
}

/// Parses a stored day type column.
///
/// # Errors
///
/// Returns a reconstruction error if the column holds an unknown day type.
pub fn parse_day_type(text: &str) -> Result<DayType, PersistenceError> {
    DayType::from_str(text).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid stored day type '{text}': {e}"))
    })
}

/// Parses a stored client category column.
///
/// # Errors
///
/// Returns a reconstruction error if the column holds an unknown category.
pub fn parse_client_category(text: &str) -> Result<ClientCategory, PersistenceError> {
    ClientCategory::from_str(text).map_err(|e| {
        PersistenceError::ReconstructionError(format!(
            "Invalid stored client category '{text}': {e}"
        ))
    })
}

/// Serializes a set of day types as a JSON array of day names.
///
/// # Errors
///
/// Returns a serialization error if encoding fails.
pub fn day_set_to_text(days: &BTreeSet<DayType>) -> Result<String, PersistenceError> {
    let names: Vec<&str> = days.iter().map(DayType::as_str).collect();
    Ok(serde_json::to_string(&names)?)
}

/// Parses a stored day set column.
///
/// # Errors
///
/// Returns an error if decoding fails or a day name is unknown.
pub fn parse_day_set(text: &str) -> Result<BTreeSet<DayType>, PersistenceError> {
    let names: Vec<String> = serde_json::from_str(text)?;
    names.iter().map(|name| parse_day_type(name)).collect()
}

/// Serializes a set of service identifiers as a JSON array of codes.
///
/// # Errors
///
/// Returns a serialization error if encoding fails.
pub fn service_set_to_text(services: &BTreeSet<ServiceId>) -> Result<String, PersistenceError> {
    let codes: Vec<&str> = services.iter().map(ServiceId::code).collect();
    Ok(serde_json::to_string(&codes)?)
}

/// Parses a stored service set column.
///
/// # Errors
///
/// Returns a serialization error if decoding fails.
pub fn parse_service_set(text: &str) -> Result<BTreeSet<ServiceId>, PersistenceError> {
    let codes: Vec<String> = serde_json::from_str(text)?;
    Ok(codes.iter().map(|code| ServiceId::new(code)).collect())
}
