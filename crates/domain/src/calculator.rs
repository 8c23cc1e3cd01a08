// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Line item calculation for a single visit and resolved rate block.
//!
//! This module provides pure, deterministic pricing arithmetic for every
//! configured calculation method. Currency rounds half-up to 2 decimal
//! places at the line level only, so invoice totals always reconcile
//! against their stored lines.
//!
//! ## Invariants
//!
//! - `line_total = round2(quantity x unit_price x multiplier)` for every
//!   line, including tiered charges (quantity carries billable minutes)
//! - The bank-holiday multiplier is recorded on the line, never folded
//!   into the unit price
//! - Identical `(visit, rate_block)` input always yields an identical line

use crate::line_item::{LedgerLineItem, PricingStatus};
use crate::rate_block::{CalculationMethod, RateBlock};
use crate::rounding::round_currency;
use crate::types::DayType;
use crate::visit::Visit;
use rust_decimal::Decimal;

/// Minutes per charging hour.
const MINUTES_PER_HOUR: u32 = 60;

/// Computes a priced ledger line for a visit and its resolved rate block.
///
/// # Arguments
///
/// * `visit` - The visit to price
/// * `block` - The rate block selected by the resolver
///
/// # Returns
///
/// A fully populated `LedgerLineItem` with `PricingStatus::Priced`.
#[must_use]
pub fn calculate_line_item(visit: &Visit, block: &RateBlock) -> LedgerLineItem {
    let duration: u32 = visit.duration_minutes();
    let (quantity, unit_price): (Decimal, Decimal) = charge_components(&block.calculation, duration);

    let multiplier: Decimal = match (visit.day_type, block.bank_holiday_multiplier) {
        (DayType::BankHoliday, Some(multiplier)) => multiplier,
        _ => Decimal::ONE,
    };

    let line_total: Decimal = round_currency(quantity * unit_price * multiplier);

    LedgerLineItem {
        line_item_id: None,
        visit_id: visit.visit_id,
        description: describe_visit(visit),
        rate_type_applied: block.rate_type,
        day_type: visit.day_type,
        duration_minutes: duration,
        quantity,
        unit_price,
        bank_holiday_multiplier_applied: multiplier,
        line_total,
        is_vatable: block.is_vatable,
        pricing: PricingStatus::Priced {
            rate_block_id: block.rate_block_id.unwrap_or_default(),
        },
    }
}

/// Builds the zero-valued, flagged line for a visit that could not be priced.
///
/// Unpriced visits stay in the ledger so delivered care is never silently
/// dropped; the flag tells the operator why the line carries no charge.
#[must_use]
pub fn unpriced_line_item(visit: &Visit, pricing: PricingStatus) -> LedgerLineItem {
    LedgerLineItem {
        line_item_id: None,
        visit_id: visit.visit_id,
        description: describe_visit(visit),
        rate_type_applied: visit.client_category,
        day_type: visit.day_type,
        duration_minutes: visit.duration_minutes(),
        quantity: Decimal::ZERO,
        unit_price: Decimal::ZERO,
        bank_holiday_multiplier_applied: Decimal::ONE,
        line_total: Decimal::ZERO,
        is_vatable: false,
        pricing,
    }
}

/// Computes `(quantity, unit_price)` for a calculation method and duration.
fn charge_components(method: &CalculationMethod, duration_minutes: u32) -> (Decimal, Decimal) {
    match method {
        CalculationMethod::RatePerHour { rate } | CalculationMethod::Hourly { rate } => {
            (fractional_hours(duration_minutes), *rate)
        }
        CalculationMethod::RatePerMinuteProrated {
            rate,
            consecutive_hours_threshold,
        } => {
            let billable: u32 = billable_minutes(duration_minutes, *consecutive_hours_threshold);
            (
                Decimal::from(billable),
                *rate / Decimal::from(MINUTES_PER_HOUR),
            )
        }
        CalculationMethod::RatePerMinuteFlat { rate } => {
            (Decimal::from(started_hour_blocks(duration_minutes)), *rate)
        }
        CalculationMethod::Flat { rate } => (Decimal::ONE, *rate),
        CalculationMethod::ProRata {
            break_points,
            consecutive_hours_threshold,
        } => {
            let charge: Decimal =
                if duration_minutes > MINUTES_PER_HOUR && consecutive_hours_threshold.is_some() {
                    let full_hours: u32 = duration_minutes / MINUTES_PER_HOUR;
                    let remainder: u32 = duration_minutes % MINUTES_PER_HOUR;
                    let remainder_charge: Decimal = if remainder == 0 {
                        Decimal::ZERO
                    } else {
                        break_points.rate_for(remainder)
                    };
                    Decimal::from(full_hours) * break_points.m60 + remainder_charge
                } else {
                    break_points.rate_for(duration_minutes)
                };
            (Decimal::ONE, charge)
        }
    }
}

/// Converts minutes to a fractional-hour quantity.
fn fractional_hours(duration_minutes: u32) -> Decimal {
    Decimal::from(duration_minutes) / Decimal::from(MINUTES_PER_HOUR)
}

/// Number of started hour blocks, used by flat per-block charging.
const fn started_hour_blocks(duration_minutes: u32) -> u32 {
    duration_minutes.div_ceil(MINUTES_PER_HOUR)
}

/// Billable minutes under the consecutive-hours tier rule.
///
/// Up to the threshold, every delivered minute is billable. Past the
/// threshold, charging switches from per-minute interpolation to full
/// hour blocks: each started hour beyond the threshold bills as 60
/// minutes.
const fn billable_minutes(duration_minutes: u32, threshold_hours: Option<u32>) -> u32 {
    match threshold_hours {
        Some(hours) => {
            let threshold_minutes: u32 = hours * MINUTES_PER_HOUR;
            if duration_minutes > threshold_minutes {
                let excess: u32 = duration_minutes - threshold_minutes;
                threshold_minutes + excess.div_ceil(MINUTES_PER_HOUR) * MINUTES_PER_HOUR
            } else {
                duration_minutes
            }
        }
        None => duration_minutes,
    }
}

/// Builds the display description for a visit's ledger line.
fn describe_visit(visit: &Visit) -> String {
    format!(
        "{} ({}) {:02}:{:02}-{:02}:{:02}",
        visit.service_id.code(),
        visit.day_type.as_str(),
        visit.start_time.hour(),
        visit.start_time.minute(),
        visit.end_time.hour(),
        visit.end_time.minute()
    )
}
