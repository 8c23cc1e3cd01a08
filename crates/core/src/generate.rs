// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger generation for a set of delivered visits.
//!
//! Generation is a pure fan-out of the rate resolver and line item
//! calculator over the visit set. Visits that cannot be priced are kept
//! as zero-valued, flagged lines with a collected warning; the generator
//! never drops delivered care and never aborts on a per-visit pricing
//! failure. Output ordering is canonical (date, start time, visit id) so
//! regeneration over unchanged input is byte-identical.

use care_ledger_domain::{
    DomainError, LedgerLineItem, PricingStatus, RateBlock, Visit, calculate_line_item,
    resolve_rate_block, unpriced_line_item,
};

/// A per-visit pricing problem collected during generation.
///
/// Warnings are attached to the generated ledger rather than thrown; a
/// ledger with flagged lines is still valid and savable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationWarning {
    /// The visit that could not be priced.
    pub visit_id: i64,
    /// The pricing flag recorded on the line.
    pub flag: PricingStatus,
    /// Human-readable description of the problem.
    pub message: String,
}

/// The result of one ledger generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerGeneration {
    /// The full replacement line-item set, one line per visit.
    pub line_items: Vec<LedgerLineItem>,
    /// Per-visit pricing problems, in line order.
    pub warnings: Vec<GenerationWarning>,
    /// Number of successfully priced visits.
    pub priced_count: usize,
    /// Number of flagged (unpriced or ambiguous) visits.
    pub flagged_count: usize,
}

impl LedgerGeneration {
    /// Renders the operator-facing outcome summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} of {} visits priced, {} flagged",
            self.priced_count,
            self.line_items.len(),
            self.flagged_count
        )
    }
}

/// Prices every visit against the configured rate blocks.
///
/// # Arguments
///
/// * `visits` - Visits delivered within the billing period
/// * `rate_blocks` - The branch's configured rate blocks
///
/// # Returns
///
/// A `LedgerGeneration` containing one line per visit plus collected
/// warnings. Identical input always yields identical output.
#[must_use]
pub fn generate_line_items(visits: &[Visit], rate_blocks: &[RateBlock]) -> LedgerGeneration {
    // Canonical ordering makes regeneration idempotent regardless of the
    // order the visit store returned rows in.
    let mut ordered: Vec<&Visit> = visits.iter().collect();
    ordered.sort_by_key(|visit| (visit.date, visit.start_time, visit.visit_id));

    let mut line_items: Vec<LedgerLineItem> = Vec::with_capacity(ordered.len());
    let mut warnings: Vec<GenerationWarning> = Vec::new();
    let mut priced_count: usize = 0;

    for visit in ordered {
        match resolve_rate_block(visit, rate_blocks) {
            Ok(block) => {
                line_items.push(calculate_line_item(visit, block));
                priced_count += 1;
            }
            Err(error) => {
                let flag: PricingStatus = match &error {
                    DomainError::AmbiguousRateRule { .. } => PricingStatus::AmbiguousRateRule,
                    _ => PricingStatus::NoRateRule,
                };
                warnings.push(GenerationWarning {
                    visit_id: visit.visit_id,
                    flag,
                    message: error.to_string(),
                });
                line_items.push(unpriced_line_item(visit, flag));
            }
        }
    }

    let flagged_count: usize = warnings.len();

    LedgerGeneration {
        line_items,
        warnings,
        priced_count,
        flagged_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use care_ledger_domain::{
        CalculationMethod, ChargeBasis, ClientCategory, DayType, ServiceId,
    };
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;
    use time::macros::{date, time};

    fn weekday_block(id: i64) -> RateBlock {
        RateBlock {
            rate_block_id: Some(id),
            name: format!("Block {id}"),
            applicable_days: [
                DayType::Monday,
                DayType::Tuesday,
                DayType::Wednesday,
                DayType::Thursday,
                DayType::Friday,
            ]
            .into_iter()
            .collect(),
            rate_type: ClientCategory::Standard,
            effective_window: None,
            charge_basis: ChargeBasis::HoursMinutes,
            calculation: CalculationMethod::RatePerHour {
                rate: Decimal::from(10),
            },
            linked_services: BTreeSet::new(),
            bank_holiday_multiplier: None,
            is_vatable: false,
        }
    }

    fn visit(id: i64, day: DayType, start: time::Time, end: time::Time) -> Visit {
        Visit::new(
            id,
            10,
            date!(2026 - 03 - 02),
            day,
            start,
            end,
            ServiceId::new("personal-care"),
            ClientCategory::Standard,
        )
    }

    #[test]
    fn test_generation_prices_all_matching_visits() {
        let visits: Vec<Visit> = vec![
            visit(1, DayType::Monday, time!(09:00), time!(11:00)),
            visit(2, DayType::Tuesday, time!(14:00), time!(15:00)),
        ];
        let blocks: Vec<RateBlock> = vec![weekday_block(1)];

        let generation: LedgerGeneration = generate_line_items(&visits, &blocks);

        assert_eq!(generation.line_items.len(), 2);
        assert_eq!(generation.priced_count, 2);
        assert_eq!(generation.flagged_count, 0);
        assert!(generation.warnings.is_empty());
        assert_eq!(generation.summary(), "2 of 2 visits priced, 0 flagged");
    }

    #[test]
    fn test_unmatched_visit_is_flagged_not_dropped() {
        let visits: Vec<Visit> = vec![
            visit(1, DayType::Monday, time!(09:00), time!(11:00)),
            visit(2, DayType::Sunday, time!(14:00), time!(15:00)),
        ];
        let blocks: Vec<RateBlock> = vec![weekday_block(1)];

        let generation: LedgerGeneration = generate_line_items(&visits, &blocks);

        assert_eq!(generation.line_items.len(), 2);
        assert_eq!(generation.priced_count, 1);
        assert_eq!(generation.flagged_count, 1);
        assert_eq!(generation.warnings.len(), 1);
        assert_eq!(generation.warnings[0].visit_id, 2);
        assert_eq!(generation.warnings[0].flag, PricingStatus::NoRateRule);
        assert_eq!(generation.summary(), "1 of 2 visits priced, 1 flagged");

        let flagged: &LedgerLineItem = generation
            .line_items
            .iter()
            .find(|line| line.visit_id == 2)
            .unwrap();
        assert_eq!(flagged.line_total, Decimal::ZERO);
        assert!(!flagged.is_priced());
    }

    #[test]
    fn test_ambiguous_configuration_is_flagged_loudly() {
        let visits: Vec<Visit> = vec![visit(1, DayType::Monday, time!(09:00), time!(11:00))];
        let blocks: Vec<RateBlock> = vec![weekday_block(1), weekday_block(2)];

        let generation: LedgerGeneration = generate_line_items(&visits, &blocks);

        assert_eq!(generation.flagged_count, 1);
        assert_eq!(generation.warnings[0].flag, PricingStatus::AmbiguousRateRule);
        assert!(generation.warnings[0].message.contains("Ambiguous"));
        assert_eq!(
            generation.line_items[0].pricing,
            PricingStatus::AmbiguousRateRule
        );
    }

    #[test]
    fn test_generation_is_idempotent() {
        let visits: Vec<Visit> = vec![
            visit(2, DayType::Tuesday, time!(14:00), time!(15:00)),
            visit(1, DayType::Monday, time!(09:00), time!(11:00)),
        ];
        let blocks: Vec<RateBlock> = vec![weekday_block(1)];

        let first: LedgerGeneration = generate_line_items(&visits, &blocks);
        let second: LedgerGeneration = generate_line_items(&visits, &blocks);

        assert_eq!(first, second);
    }

    #[test]
    fn test_generation_output_order_is_canonical() {
        // Same visits in a different input order must produce the same lines
        let forward: Vec<Visit> = vec![
            visit(1, DayType::Monday, time!(09:00), time!(11:00)),
            visit(2, DayType::Monday, time!(14:00), time!(15:00)),
        ];
        let reversed: Vec<Visit> = vec![forward[1].clone(), forward[0].clone()];
        let blocks: Vec<RateBlock> = vec![weekday_block(1)];

        let from_forward: LedgerGeneration = generate_line_items(&forward, &blocks);
        let from_reversed: LedgerGeneration = generate_line_items(&reversed, &blocks);

        assert_eq!(from_forward, from_reversed);
        assert_eq!(from_forward.line_items[0].visit_id, 1);
        assert_eq!(from_forward.line_items[1].visit_id, 2);
    }

    #[test]
    fn test_empty_visit_set_produces_empty_ledger() {
        let generation: LedgerGeneration = generate_line_items(&[], &[weekday_block(1)]);

        assert!(generation.line_items.is_empty());
        assert_eq!(generation.summary(), "0 of 0 visits priced, 0 flagged");
    }
}
