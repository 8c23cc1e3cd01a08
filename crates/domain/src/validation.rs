// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::rate_block::{CalculationMethod, ChargeBasis, RateBlock};
use crate::visit::Visit;
use rust_decimal::Decimal;

/// Validates a rate block's structural constraints.
///
/// This function is pure and context-free; overlap against other blocks
/// requires the full configuration and is checked by
/// [`detect_overlapping_blocks`].
///
/// # Arguments
///
/// * `block` - The rate block to validate
///
/// # Returns
///
/// * `Ok(())` if the block is well-formed
/// * `Err(DomainError::InvalidRateBlock)` otherwise
///
/// # Errors
///
/// Returns an error if:
/// - The block name is empty
/// - No applicable days are configured
/// - The calculation method is not permitted for the charge basis
/// - A service-based block has no linked services
/// - Any configured rate is negative
/// - The bank-holiday multiplier is below 1
pub fn validate_rate_block(block: &RateBlock) -> Result<(), DomainError> {
    if block.name.is_empty() {
        return Err(DomainError::InvalidRateBlock {
            reason: String::from("Name cannot be empty"),
        });
    }

    // Rule: a block must fire on at least one day
    if block.applicable_days.is_empty() {
        return Err(DomainError::InvalidRateBlock {
            reason: String::from("At least one applicable day is required"),
        });
    }

    // Rule: exactly one calculation method, compatible with the basis
    if !block.calculation.permitted_for(block.charge_basis) {
        return Err(DomainError::InvalidRateBlock {
            reason: format!(
                "Calculation method '{}' is not permitted for charge basis '{}'",
                block.calculation.as_str(),
                block.charge_basis
            ),
        });
    }

    // Rule: service-based charging must name the services it prices
    if block.charge_basis == ChargeBasis::Services && block.linked_services.is_empty() {
        return Err(DomainError::InvalidRateBlock {
            reason: String::from("Service-based blocks require at least one linked service"),
        });
    }

    validate_rates_non_negative(&block.calculation)?;

    if let Some(multiplier) = block.bank_holiday_multiplier {
        if multiplier < Decimal::ONE {
            return Err(DomainError::InvalidRateBlock {
                reason: format!("Bank-holiday multiplier must be at least 1, got {multiplier}"),
            });
        }
    }

    Ok(())
}

/// Checks that every configured rate value is non-negative.
fn validate_rates_non_negative(calculation: &CalculationMethod) -> Result<(), DomainError> {
    let rates: Vec<Decimal> = match calculation {
        CalculationMethod::RatePerHour { rate }
        | CalculationMethod::RatePerMinuteProrated { rate, .. }
        | CalculationMethod::RatePerMinuteFlat { rate }
        | CalculationMethod::Flat { rate }
        | CalculationMethod::Hourly { rate } => vec![*rate],
        CalculationMethod::ProRata { break_points, .. } => vec![
            break_points.m15,
            break_points.m30,
            break_points.m45,
            break_points.m60,
        ],
    };

    for rate in rates {
        if rate < Decimal::ZERO {
            return Err(DomainError::InvalidRateBlock {
                reason: format!("Rates must be non-negative, got {rate}"),
            });
        }
    }
    Ok(())
}

/// Validates a visit record received from the booking store.
///
/// # Arguments
///
/// * `visit` - The visit to validate
///
/// # Returns
///
/// * `Ok(())` if the visit is well-formed
/// * `Err(DomainError::InvalidVisit)` otherwise
///
/// # Errors
///
/// Returns an error if the visit's service code is empty or its duration
/// is zero.
pub fn validate_visit(visit: &Visit) -> Result<(), DomainError> {
    if visit.service_id.code().is_empty() {
        return Err(DomainError::InvalidVisit {
            visit_id: visit.visit_id,
            reason: String::from("Service code cannot be empty"),
        });
    }

    if visit.duration_minutes() == 0 {
        return Err(DomainError::InvalidVisit {
            visit_id: visit.visit_id,
            reason: String::from("Duration must be at least one minute"),
        });
    }

    Ok(())
}

/// A pair of rate blocks that can both match the same visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBlockConflict {
    /// Identifier (or name, when unpersisted) of the first block.
    pub first: String,
    /// Identifier (or name, when unpersisted) of the second block.
    pub second: String,
    /// Human-readable description of the overlap.
    pub reason: String,
}

/// Detects pairs of rate blocks whose scopes overlap.
///
/// Two blocks conflict when they share a client category, a day type, an
/// overlapping (or absent) time window, and overlapping service coverage.
/// Overlap is a configuration error: the resolver refuses to choose
/// between conflicting blocks, so configuration screens run this check
/// before saving.
///
/// # Arguments
///
/// * `blocks` - All configured rate blocks for the branch
///
/// # Returns
///
/// All conflicting pairs; empty when the configuration is unambiguous.
#[must_use]
pub fn detect_overlapping_blocks(blocks: &[RateBlock]) -> Vec<RateBlockConflict> {
    let mut conflicts: Vec<RateBlockConflict> = Vec::new();

    for (index, first) in blocks.iter().enumerate() {
        for second in blocks.iter().skip(index + 1) {
            if let Some(reason) = overlap_reason(first, second) {
                conflicts.push(RateBlockConflict {
                    first: block_label(first),
                    second: block_label(second),
                    reason,
                });
            }
        }
    }

    conflicts
}

/// Returns the overlap description for two blocks, or `None` when disjoint.
fn overlap_reason(first: &RateBlock, second: &RateBlock) -> Option<String> {
    if first.rate_type != second.rate_type {
        return None;
    }

    let shared_day = first
        .applicable_days
        .iter()
        .find(|day| second.applicable_days.contains(day))?;

    if !windows_overlap(first, second) {
        return None;
    }

    if !services_overlap(first, second) {
        return None;
    }

    Some(format!(
        "both match {} visits on {}",
        first.rate_type, shared_day
    ))
}

/// Checks whether the effective windows of two blocks can both contain a
/// visit start time. A block without a window covers the whole day.
fn windows_overlap(first: &RateBlock, second: &RateBlock) -> bool {
    match (first.effective_window, second.effective_window) {
        (Some(a), Some(b)) => a.from() < b.until() && b.from() < a.until(),
        _ => true,
    }
}

/// Checks whether two blocks can price the same service.
fn services_overlap(first: &RateBlock, second: &RateBlock) -> bool {
    match (first.charge_basis, second.charge_basis) {
        (ChargeBasis::Services, ChargeBasis::Services) => first
            .linked_services
            .iter()
            .any(|service| second.linked_services.contains(service)),
        _ => true,
    }
}

/// Display label for a block in conflict reports.
fn block_label(block: &RateBlock) -> String {
    block
        .rate_block_id
        .map_or_else(|| block.name.clone(), |id| format!("#{id}"))
}
