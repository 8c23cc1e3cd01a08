// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ClientCategory, DayType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing outcome recorded on a ledger line.
///
/// Visits that cannot be priced are still included in the ledger as
/// zero-valued lines carrying an explicit flag, so the generator never
/// silently drops delivered care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingStatus {
    /// Priced by the referenced rate block.
    Priced {
        /// The rate block that priced this line.
        rate_block_id: i64,
    },
    /// No rate block matched the visit.
    NoRateRule,
    /// More than one rate block matched the visit.
    AmbiguousRateRule,
}

impl PricingStatus {
    /// Returns whether this line was successfully priced.
    #[must_use]
    pub const fn is_priced(&self) -> bool {
        matches!(self, Self::Priced { .. })
    }

    /// Returns the flag name used in persistence and audit output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Priced { .. } => "priced",
            Self::NoRateRule => "no_rate_rule",
            Self::AmbiguousRateRule => "ambiguous_rate_rule",
        }
    }
}

/// One priced row of an invoice ledger.
///
/// Line items are exclusively owned by their invoice. Regeneration
/// destroys and rebuilds the whole set; the generator never patches a
/// line in place. Manual edits are a separate, explicit user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLineItem {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the line has not been persisted yet.
    pub line_item_id: Option<i64>,
    /// The visit this line prices.
    pub visit_id: i64,
    /// Human-readable description for display and export.
    pub description: String,
    /// The client category the applied rate was scoped to.
    pub rate_type_applied: ClientCategory,
    /// Day classification of the underlying visit.
    pub day_type: DayType,
    /// Delivered duration in minutes.
    pub duration_minutes: u32,
    /// Billed quantity: fractional hours, billable minutes, or a count,
    /// depending on the calculation method.
    pub quantity: Decimal,
    /// Price per unit of quantity.
    pub unit_price: Decimal,
    /// Bank-holiday multiplier applied to the line total; 1 when none.
    ///
    /// Recorded for auditability, never folded into `unit_price`.
    pub bank_holiday_multiplier_applied: Decimal,
    /// `quantity x unit_price x multiplier`, rounded to 2 decimal places.
    pub line_total: Decimal,
    /// Whether this line attracts VAT.
    pub is_vatable: bool,
    /// Pricing outcome for this line.
    pub pricing: PricingStatus,
}

impl LedgerLineItem {
    /// Returns whether this line was successfully priced.
    #[must_use]
    pub const fn is_priced(&self) -> bool {
        self.pricing.is_priced()
    }
}
