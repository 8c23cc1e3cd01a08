// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::lock::LockState;
use care_ledger_audit::StateSnapshot;
use care_ledger_domain::{BillingPeriod, LedgerLineItem, round_currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate totals for an invoice.
///
/// Totals are derived exclusively from already-rounded line items so the
/// invoice always reconciles line by line; the net is never re-rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of all line totals.
    pub net_amount: Decimal,
    /// VAT over the VAT-able lines only, rounded to 2 decimal places.
    pub vat_amount: Decimal,
    /// `net_amount + vat_amount`.
    pub total_amount: Decimal,
    /// Sum of delivered minutes across all lines.
    pub total_invoiced_minutes: u32,
}

impl InvoiceTotals {
    /// The totals of an invoice with no line items.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            net_amount: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            total_invoiced_minutes: 0,
        }
    }
}

/// Computes invoice totals from a set of line items.
///
/// # Arguments
///
/// * `line_items` - The invoice's line items
/// * `vat_rate` - The VAT rate applied to VAT-able lines (e.g., 0.20)
#[must_use]
pub fn compute_totals(line_items: &[LedgerLineItem], vat_rate: Decimal) -> InvoiceTotals {
    let net_amount: Decimal = line_items.iter().map(|line| line.line_total).sum();

    let vatable_net: Decimal = line_items
        .iter()
        .filter(|line| line.is_vatable)
        .map(|line| line.line_total)
        .sum();
    let vat_amount: Decimal = round_currency(vatable_net * vat_rate);

    let total_invoiced_minutes: u32 = line_items
        .iter()
        .map(|line| line.duration_minutes)
        .sum();

    InvoiceTotals {
        net_amount,
        vat_amount,
        total_amount: net_amount + vat_amount,
        total_invoiced_minutes,
    }
}

/// The invoice aggregate: header, line items, totals, and lock state.
///
/// The aggregate owns its line items exclusively. Regeneration replaces
/// the whole set atomically and recomputes the totals; nothing outside
/// the `apply` transition functions mutates an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the invoice has not been persisted yet.
    pub invoice_id: Option<i64>,
    /// The client this invoice bills.
    pub client_id: i64,
    /// The billing period the ledger covers (inclusive on both ends).
    pub period: BillingPeriod,
    /// VAT rate applied to VAT-able lines.
    pub vat_rate: Decimal,
    /// The priced ledger, rebuilt wholesale on every regeneration.
    pub line_items: Vec<LedgerLineItem>,
    /// Aggregate totals derived from the line items.
    pub totals: InvoiceTotals,
    /// Whether the ledger is frozen.
    pub lock: LockState,
    /// Optimistic concurrency token, bumped by the persistence layer on
    /// every successful write.
    pub version: i64,
}

impl Invoice {
    /// Creates a new unlocked invoice with no line items.
    ///
    /// # Arguments
    ///
    /// * `client_id` - The client this invoice bills
    /// * `period` - The billing period
    /// * `vat_rate` - VAT rate applied to VAT-able lines
    #[must_use]
    pub const fn new(client_id: i64, period: BillingPeriod, vat_rate: Decimal) -> Self {
        Self {
            invoice_id: None,
            client_id,
            period,
            vat_rate,
            line_items: Vec::new(),
            totals: InvoiceTotals::zero(),
            lock: LockState::Unlocked,
            version: 0,
        }
    }

    /// Returns a copy of this invoice with its ledger replaced wholesale.
    ///
    /// The previous line items are discarded, never merged, and the
    /// totals are recomputed from the new set.
    #[must_use]
    pub fn with_line_items(&self, line_items: Vec<LedgerLineItem>) -> Self {
        let totals: InvoiceTotals = compute_totals(&line_items, self.vat_rate);
        Self {
            line_items,
            totals,
            ..self.clone()
        }
    }

    /// Checks the reconciliation invariant: the stored net must equal the
    /// sum of the stored line totals.
    #[must_use]
    pub fn reconciles(&self) -> bool {
        let recomputed: Decimal = self.line_items.iter().map(|line| line.line_total).sum();
        recomputed == self.totals.net_amount
    }

    /// Display identifier for error messages and audit details.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.invoice_id
            .map_or_else(|| String::from("(unsaved)"), |id| id.to_string())
    }

    /// Converts the invoice to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "invoice={},client={},lines={},net={},lock={}",
            self.display_id(),
            self.client_id,
            self.line_items.len(),
            self.totals.net_amount,
            self.lock.as_str()
        ))
    }
}
