// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use care_ledger_domain::{BillingPeriod, RateBlock, Visit};
use rust_decimal::Decimal;

/// A manual patch to a single ledger line.
///
/// Absent fields are left unchanged. The line total is recomputed as
/// `quantity x unit_price`; the bank-holiday multiplier is not reapplied
/// on manual edits, which operate on the already-realized components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineItemPatch {
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement quantity.
    pub quantity: Option<Decimal>,
    /// Replacement unit price.
    pub unit_price: Option<Decimal>,
}

impl LineItemPatch {
    /// Returns whether the patch changes anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.quantity.is_none() && self.unit_price.is_none()
    }
}

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a rate block to the branch configuration.
    CreateRateBlock {
        /// The block to add; validated before it is accepted.
        block: RateBlock,
    },
    /// Create a new, empty, unlocked invoice for a client and period.
    CreateInvoice {
        /// The client the invoice bills.
        client_id: i64,
        /// The billing period the ledger will cover.
        period: BillingPeriod,
        /// VAT rate applied to VAT-able lines.
        vat_rate: Decimal,
    },
    /// Regenerate the invoice's ledger from delivered visits.
    ///
    /// The visit and rate block data is supplied by the caller, which
    /// fetches it from the booking store and rate configuration; the
    /// transition itself is pure.
    GenerateLedger {
        /// Visits delivered to the client within the billing period.
        visits: Vec<Visit>,
        /// The branch's configured rate blocks.
        rate_blocks: Vec<RateBlock>,
    },
    /// Freeze the invoice's ledger.
    LockInvoice {
        /// When the lock was applied (ISO 8601, UTC).
        locked_at: String,
    },
    /// Unfreeze the invoice's ledger.
    UnlockInvoice,
    /// Manually adjust a single ledger line.
    EditLineItem {
        /// The line to adjust.
        line_item_id: i64,
        /// The fields to change.
        patch: LineItemPatch,
    },
}
