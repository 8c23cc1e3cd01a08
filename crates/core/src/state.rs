// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::invoice::Invoice;
use care_ledger_audit::{AuditEvent, StateSnapshot};
use care_ledger_domain::RateBlock;

/// The branch's rate configuration: every rate block the resolver may
/// select from.
///
/// This is separate from any single invoice and represents shared
/// configuration state. Rate blocks are pure data; consistency between
/// them is validated when a block is added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateConfiguration {
    /// All configured rate blocks.
    pub rate_blocks: Vec<RateBlock>,
}

impl RateConfiguration {
    /// Creates a new empty rate configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rate_blocks: Vec::new(),
        }
    }

    /// Adds a rate block.
    pub(crate) fn add_rate_block(&mut self, block: RateBlock) {
        self.rate_blocks.push(block);
    }

    /// Converts the configuration to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!("rate_blocks_count={}", self.rate_blocks.len()))
    }
}

/// The result of a successful invoice transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new invoice after the transition.
    pub new_invoice: Invoice,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of a bootstrap operation.
///
/// Bootstrap operations create configuration or new invoices rather than
/// transitioning an existing invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapResult {
    /// The new rate configuration after the operation.
    pub new_configuration: RateConfiguration,
    /// The audit event recording this operation.
    pub audit_event: AuditEvent,
    /// The created invoice for `CreateInvoice` operations.
    pub created_invoice: Option<Invoice>,
    /// The created rate block for `CreateRateBlock` operations.
    pub created_rate_block: Option<RateBlock>,
}
