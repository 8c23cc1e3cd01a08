// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use care_ledger_domain::DomainError;

/// Errors that can occur during invoice transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A mutation was attempted against a locked invoice.
    ///
    /// Lock violations abort the whole operation; the prior state is
    /// left untouched.
    InvoiceLocked {
        /// Display identifier of the invoice.
        invoice: String,
    },
    /// An unlock was attempted against an invoice that is not locked.
    InvoiceNotLocked {
        /// Display identifier of the invoice.
        invoice: String,
    },
    /// The referenced ledger line does not exist on the invoice.
    LineItemNotFound {
        /// The requested line item identifier.
        line_item_id: i64,
    },
    /// A manual line edit carried no changes or invalid values.
    InvalidPatch {
        /// Description of the problem.
        reason: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvoiceLocked { invoice } => {
                write!(f, "Invoice {invoice} is locked; the ledger is frozen")
            }
            Self::InvoiceNotLocked { invoice } => {
                write!(f, "Invoice {invoice} is not locked")
            }
            Self::LineItemNotFound { line_item_id } => {
                write!(f, "Line item {line_item_id} not found on this invoice")
            }
            Self::InvalidPatch { reason } => write!(f, "Invalid line item patch: {reason}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
