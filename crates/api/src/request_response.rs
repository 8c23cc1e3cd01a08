// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API boundary.
//!
//! Requests arrive with primitive fields (strings for dates, times, and
//! enums) and are parsed into closed domain types before any logic runs.
//! Responses are read-only projections; every currency value is
//! pre-rounded to 2 decimal places in the exposed representation.

use crate::error::ApiError;
use care_ledger::{Invoice, LockState};
use care_ledger_audit::AuditEvent;
use care_ledger_domain::{
    BillingPeriod, BreakPointRates, CalculationMethod, ChargeBasis, ClientCategory, DayType,
    LedgerLineItem, RateBlock, ServiceId, TimeWindow, round_currency,
};
use care_ledger_persistence::AuditEventRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

/// Request time-of-day format (`HH:MM`).
const REQUEST_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]");

/// Formats a currency amount for the exposed representation.
///
/// Amounts are rounded half-up to 2 decimal places and always rendered
/// with both places.
#[must_use]
pub(crate) fn money_text(amount: Decimal) -> String {
    format!("{:.2}", round_currency(amount))
}

/// Parses an ISO 8601 date from a request field.
pub(crate) fn parse_request_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(
        value,
        &time::format_description::well_known::Iso8601::DEFAULT,
    )
    .map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Failed to parse date '{value}': {e}"),
    })
}

/// Parses an `HH:MM` time of day from a request field.
pub(crate) fn parse_request_time(field: &str, value: &str) -> Result<Time, ApiError> {
    Time::parse(value, &REQUEST_TIME_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Failed to parse time '{value}': {e}"),
    })
}

/// Errors raised while converting a calculation input into the single
/// configured calculation method.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationInputError {
    /// The method name is not recognised.
    #[error("Unknown calculation method: {0}")]
    UnknownMethod(String),

    /// The method requires a single rate value.
    #[error("Calculation method '{method}' requires a rate")]
    MissingRate { method: String },

    /// Pro-rata charging requires the four break-point rates.
    #[error("Calculation method 'pro_rata' requires break point rates")]
    MissingBreakPoints,

    /// Exactly one rate configuration may be populated.
    #[error("Calculation method '{method}' takes {expected}, but {found} was also supplied")]
    ConflictingConfiguration {
        method: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<CalculationInputError> for ApiError {
    fn from(err: CalculationInputError) -> Self {
        Self::InvalidInput {
            field: String::from("calculation"),
            message: err.to_string(),
        }
    }
}

/// The four break-point rates for pro-rata charging.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BreakPointsInput {
    /// Rate at the 15-minute break point.
    pub m15: Decimal,
    /// Rate at the 30-minute break point.
    pub m30: Decimal,
    /// Rate at the 45-minute break point.
    pub m45: Decimal,
    /// Rate at the 60-minute break point.
    pub m60: Decimal,
}

/// Calculation configuration as submitted by configuration screens.
///
/// Exactly one rate configuration must be populated: a single `rate` for
/// most methods, or `break_points` for pro-rata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalculationInput {
    /// Method name: `rate_per_hour`, `rate_per_minute_prorated`,
    /// `rate_per_minute_flat`, `flat`, `pro_rata`, or `hourly`.
    pub method: String,
    /// The single rate value, for every method except `pro_rata`.
    pub rate: Option<Decimal>,
    /// Break-point rates, for `pro_rata` only.
    pub break_points: Option<BreakPointsInput>,
    /// Consecutive-hours threshold, for tiered methods.
    pub consecutive_hours_threshold: Option<u32>,
}

impl CalculationInput {
    /// Builds the closed calculation method from this input.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is unknown, the required rate
    /// configuration is missing, or more than one is populated.
    pub fn build(&self) -> Result<CalculationMethod, CalculationInputError> {
        let single_rate = |method: &str| -> Result<Decimal, CalculationInputError> {
            if self.break_points.is_some() {
                return Err(CalculationInputError::ConflictingConfiguration {
                    method: method.to_string(),
                    expected: "a single rate",
                    found: "break points",
                });
            }
            self.rate
                .ok_or_else(|| CalculationInputError::MissingRate {
                    method: method.to_string(),
                })
        };

        match self.method.as_str() {
            "rate_per_hour" => Ok(CalculationMethod::RatePerHour {
                rate: single_rate("rate_per_hour")?,
            }),
            "rate_per_minute_prorated" => Ok(CalculationMethod::RatePerMinuteProrated {
                rate: single_rate("rate_per_minute_prorated")?,
                consecutive_hours_threshold: self.consecutive_hours_threshold,
            }),
            "rate_per_minute_flat" => Ok(CalculationMethod::RatePerMinuteFlat {
                rate: single_rate("rate_per_minute_flat")?,
            }),
            "flat" => Ok(CalculationMethod::Flat {
                rate: single_rate("flat")?,
            }),
            "hourly" => Ok(CalculationMethod::Hourly {
                rate: single_rate("hourly")?,
            }),
            "pro_rata" => {
                if self.rate.is_some() {
                    return Err(CalculationInputError::ConflictingConfiguration {
                        method: String::from("pro_rata"),
                        expected: "break points",
                        found: "a single rate",
                    });
                }
                let points: BreakPointsInput = self
                    .break_points
                    .ok_or(CalculationInputError::MissingBreakPoints)?;
                Ok(CalculationMethod::ProRata {
                    break_points: BreakPointRates {
                        m15: points.m15,
                        m30: points.m30,
                        m45: points.m45,
                        m60: points.m60,
                    },
                    consecutive_hours_threshold: self.consecutive_hours_threshold,
                })
            }
            other => Err(CalculationInputError::UnknownMethod(other.to_string())),
        }
    }
}

/// API request for creating a rate block.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRateBlockRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The cause ID for this action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// Human-readable block name.
    pub name: String,
    /// Day names this block fires on (e.g., `monday`, `bank_holiday`).
    pub applicable_days: Vec<String>,
    /// Client category: `standard`, `adult`, or `cyp`.
    pub rate_type: String,
    /// Window start (`HH:MM`); both or neither window field must be set.
    pub window_from: Option<String>,
    /// Window end (`HH:MM`, exclusive).
    pub window_until: Option<String>,
    /// Charge basis: `hours_minutes`, `services`, or `fixed_flat`.
    pub charge_basis: String,
    /// The calculation configuration.
    pub calculation: CalculationInput,
    /// Linked service codes; required for service-based blocks.
    pub linked_services: Vec<String>,
    /// Bank-holiday multiplier; must be at least 1 when present.
    pub bank_holiday_multiplier: Option<Decimal>,
    /// Whether lines priced by this block attract VAT.
    pub is_vatable: bool,
}

impl CreateRateBlockRequest {
    /// Parses this request into a domain rate block.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to parse or the window is
    /// half-configured.
    pub fn to_rate_block(&self) -> Result<RateBlock, ApiError> {
        let mut applicable_days: BTreeSet<DayType> = BTreeSet::new();
        for day in &self.applicable_days {
            let parsed: DayType = DayType::from_str(day).map_err(|_| ApiError::InvalidInput {
                field: String::from("applicable_days"),
                message: format!("Unknown day type: {day}"),
            })?;
            applicable_days.insert(parsed);
        }

        let rate_type: ClientCategory =
            ClientCategory::from_str(&self.rate_type).map_err(|_| ApiError::InvalidInput {
                field: String::from("rate_type"),
                message: format!("Unknown client category: {}", self.rate_type),
            })?;

        let charge_basis: ChargeBasis =
            ChargeBasis::from_str(&self.charge_basis).map_err(|_| ApiError::InvalidInput {
                field: String::from("charge_basis"),
                message: format!("Unknown charge basis: {}", self.charge_basis),
            })?;

        let effective_window: Option<TimeWindow> = match (&self.window_from, &self.window_until) {
            (Some(from), Some(until)) => {
                let from: Time = parse_request_time("window_from", from)?;
                let until: Time = parse_request_time("window_until", until)?;
                Some(TimeWindow::new(from, until).map_err(|e| ApiError::InvalidInput {
                    field: String::from("effective_window"),
                    message: e.to_string(),
                })?)
            }
            (None, None) => None,
            _ => {
                return Err(ApiError::InvalidInput {
                    field: String::from("effective_window"),
                    message: String::from(
                        "Both window_from and window_until must be set, or neither",
                    ),
                });
            }
        };

        let linked_services: BTreeSet<ServiceId> = self
            .linked_services
            .iter()
            .map(|code| ServiceId::new(code))
            .collect();

        Ok(RateBlock {
            rate_block_id: None,
            name: self.name.clone(),
            applicable_days,
            rate_type,
            effective_window,
            charge_basis,
            calculation: self.calculation.build()?,
            linked_services,
            bank_holiday_multiplier: self.bank_holiday_multiplier,
            is_vatable: self.is_vatable,
        })
    }
}

/// API response for rate block creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRateBlockResponse {
    /// The ID assigned to the new block.
    pub rate_block_id: i64,
    /// The block name.
    pub name: String,
}

/// API request for creating an invoice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateInvoiceRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The cause ID for this action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The client the invoice bills.
    pub client_id: i64,
    /// First day of the billing period (ISO 8601).
    pub period_start: String,
    /// Last day of the billing period (ISO 8601, inclusive).
    pub period_end: String,
    /// VAT rate applied to VAT-able lines (e.g., 0.20).
    pub vat_rate: Decimal,
}

impl CreateInvoiceRequest {
    /// Parses the billing period from this request.
    ///
    /// # Errors
    ///
    /// Returns an error if a date fails to parse or the range is
    /// inverted.
    pub fn period(&self) -> Result<BillingPeriod, ApiError> {
        let start: Date = parse_request_date("period_start", &self.period_start)?;
        let end: Date = parse_request_date("period_end", &self.period_end)?;
        BillingPeriod::new(start, end).map_err(|e| ApiError::InvalidInput {
            field: String::from("period"),
            message: e.to_string(),
        })
    }
}

/// API response for invoice creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateInvoiceResponse {
    /// The created invoice.
    pub invoice: InvoiceInfo,
}

/// API request for regenerating an invoice's ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateLedgerRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The cause ID for this action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The invoice whose ledger to regenerate.
    pub invoice_id: i64,
}

/// A per-visit pricing warning in the generation response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationWarningInfo {
    /// The visit that could not be priced.
    pub visit_id: i64,
    /// The pricing flag: `no_rate_rule` or `ambiguous_rate_rule`.
    pub flag: String,
    /// Human-readable description.
    pub message: String,
}

/// API response for ledger generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateLedgerResponse {
    /// The regenerated invoice.
    pub invoice: InvoiceInfo,
    /// Operator-facing outcome: "N of M visits priced, K flagged".
    pub summary: String,
    /// Number of successfully priced visits.
    pub priced_count: usize,
    /// Number of flagged visits.
    pub flagged_count: usize,
    /// Per-visit pricing warnings.
    pub warnings: Vec<GenerationWarningInfo>,
}

/// API request for locking or unlocking an invoice's ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockLedgerRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The cause ID for this action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The invoice to lock or unlock.
    pub invoice_id: i64,
    /// `true` to lock, `false` to unlock.
    pub locked: bool,
}

/// API response for lock and unlock operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockLedgerResponse {
    /// The invoice after the transition.
    pub invoice: InvoiceInfo,
}

/// API request for manually editing a ledger line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditLineItemRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The cause ID for this action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The invoice owning the line.
    pub invoice_id: i64,
    /// The line to edit.
    pub line_item_id: i64,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement quantity.
    pub quantity: Option<Decimal>,
    /// Replacement unit price.
    pub unit_price: Option<Decimal>,
}

/// API response for a manual line edit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditLineItemResponse {
    /// The invoice after the edit, totals recomputed.
    pub invoice: InvoiceInfo,
}

/// API response for reading one invoice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetInvoiceResponse {
    /// The requested invoice.
    pub invoice: InvoiceInfo,
}

/// API response for listing invoices.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListInvoicesResponse {
    /// All invoices, newest first.
    pub invoices: Vec<InvoiceInfo>,
}

/// API response for an invoice's audit timeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListAuditEventsResponse {
    /// The audit events, oldest first.
    pub events: Vec<AuditEventInfo>,
}

/// Read-only projection of one ledger line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItemInfo {
    /// The line identifier.
    pub line_item_id: Option<i64>,
    /// The visit this line prices.
    pub visit_id: i64,
    /// Display description.
    pub description: String,
    /// The applied client category.
    pub rate_type_applied: String,
    /// Day classification of the visit.
    pub day_type: String,
    /// Delivered minutes.
    pub duration_minutes: u32,
    /// Billed quantity.
    pub quantity: String,
    /// Unit price, rounded to 2 decimal places for display.
    pub unit_price: String,
    /// Recorded bank-holiday multiplier.
    pub bank_holiday_multiplier_applied: String,
    /// Line total, rounded to 2 decimal places.
    pub line_total: String,
    /// Whether this line attracts VAT.
    pub is_vatable: bool,
    /// Pricing outcome: `priced`, `no_rate_rule`, or `ambiguous_rate_rule`.
    pub pricing_status: String,
}

impl LineItemInfo {
    /// Builds the projection for one ledger line.
    #[must_use]
    pub fn from_line_item(line: &LedgerLineItem) -> Self {
        Self {
            line_item_id: line.line_item_id,
            visit_id: line.visit_id,
            description: line.description.clone(),
            rate_type_applied: line.rate_type_applied.as_str().to_string(),
            day_type: line.day_type.as_str().to_string(),
            duration_minutes: line.duration_minutes,
            quantity: line.quantity.to_string(),
            unit_price: money_text(line.unit_price),
            bank_holiday_multiplier_applied: line.bank_holiday_multiplier_applied.to_string(),
            line_total: money_text(line.line_total),
            is_vatable: line.is_vatable,
            pricing_status: line.pricing.as_str().to_string(),
        }
    }
}

/// Read-only projection of an invoice with its ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceInfo {
    /// The invoice identifier.
    pub invoice_id: Option<i64>,
    /// The billed client.
    pub client_id: i64,
    /// First day of the billing period (ISO 8601).
    pub period_start: String,
    /// Last day of the billing period (ISO 8601).
    pub period_end: String,
    /// VAT rate applied to VAT-able lines.
    pub vat_rate: String,
    /// Net amount, rounded to 2 decimal places.
    pub net_amount: String,
    /// VAT amount, rounded to 2 decimal places.
    pub vat_amount: String,
    /// Total amount, rounded to 2 decimal places.
    pub total_amount: String,
    /// Total invoiced minutes.
    pub total_invoiced_minutes: u32,
    /// Lock state: `unlocked` or `locked`.
    pub lock_state: String,
    /// When the lock was applied, if locked.
    pub locked_at: Option<String>,
    /// Who applied the lock, if locked.
    pub locked_by: Option<String>,
    /// Optimistic concurrency version.
    pub version: i64,
    /// The ledger lines, in canonical order.
    pub line_items: Vec<LineItemInfo>,
}

impl InvoiceInfo {
    /// Builds the projection for an invoice.
    #[must_use]
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let (locked_at, locked_by): (Option<String>, Option<String>) = match &invoice.lock {
            LockState::Locked {
                locked_at,
                locked_by,
            } => (Some(locked_at.clone()), Some(locked_by.clone())),
            LockState::Unlocked => (None, None),
        };

        Self {
            invoice_id: invoice.invoice_id,
            client_id: invoice.client_id,
            period_start: invoice.period.start_date().to_string(),
            period_end: invoice.period.end_date().to_string(),
            vat_rate: invoice.vat_rate.to_string(),
            net_amount: money_text(invoice.totals.net_amount),
            vat_amount: money_text(invoice.totals.vat_amount),
            total_amount: money_text(invoice.totals.total_amount),
            total_invoiced_minutes: invoice.totals.total_invoiced_minutes,
            lock_state: invoice.lock.as_str().to_string(),
            locked_at,
            locked_by,
            version: invoice.version,
            line_items: invoice
                .line_items
                .iter()
                .map(LineItemInfo::from_line_item)
                .collect(),
        }
    }
}

/// Read-only projection of one audit event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditEventInfo {
    /// The event identifier.
    pub event_id: i64,
    /// The invoice the event was scoped to, if any.
    pub invoice_id: Option<i64>,
    /// The acting identity.
    pub actor_id: String,
    /// The actor type.
    pub actor_type: String,
    /// The action name.
    pub action: String,
    /// Optional action details.
    pub details: Option<String>,
    /// State snapshot before the transition.
    pub before: String,
    /// State snapshot after the transition.
    pub after: String,
    /// When the event was persisted (ISO 8601, UTC).
    pub created_at: Option<String>,
}

impl AuditEventInfo {
    /// Builds the projection for a persisted audit event.
    #[must_use]
    pub fn from_record(record: &AuditEventRecord) -> Self {
        let event: &AuditEvent = &record.event;
        Self {
            event_id: record.event_id,
            invoice_id: event.invoice_id,
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
            created_at: record.created_at.clone(),
        }
    }
}
