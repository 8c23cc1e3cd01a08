// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rate block resolution for a single visit.
//!
//! Resolution is a pure filter over the configured rate blocks: by client
//! category, service coverage, applicable day, and effective time window.
//! Exactly one block may survive the filter. Zero matches is a recoverable
//! per-visit condition; more than one is a configuration error surfaced to
//! the operator rather than resolved by a silent priority order.

use crate::error::DomainError;
use crate::rate_block::RateBlock;
use crate::visit::Visit;

/// Selects the single rate block applicable to a visit.
///
/// # Arguments
///
/// * `visit` - The visit to price
/// * `blocks` - All configured rate blocks for the branch
///
/// # Returns
///
/// The unique matching block.
///
/// # Errors
///
/// Returns an error if:
/// - No block matches (`DomainError::NoRateRuleFound`); the caller
///   includes the visit as an unpriced, flagged line
/// - More than one block matches (`DomainError::AmbiguousRateRule`);
///   overlapping configuration must be corrected, never guessed at
pub fn resolve_rate_block<'a>(
    visit: &Visit,
    blocks: &'a [RateBlock],
) -> Result<&'a RateBlock, DomainError> {
    let matches: Vec<&RateBlock> = blocks
        .iter()
        .filter(|block| block.rate_type == visit.client_category)
        .filter(|block| block.covers_service(&visit.service_id))
        .filter(|block| block.applies_on(visit.day_type))
        .filter(|block| block.effective_at(visit.start_time))
        .collect();

    match matches.as_slice() {
        [] => Err(DomainError::NoRateRuleFound {
            visit_id: visit.visit_id,
            service: visit.service_id.code().to_string(),
            day_type: visit.day_type.as_str().to_string(),
        }),
        [block] => Ok(block),
        _ => Err(DomainError::AmbiguousRateRule {
            visit_id: visit.visit_id,
            matching_block_ids: matches
                .iter()
                .filter_map(|block| block.rate_block_id)
                .collect(),
        }),
    }
}
