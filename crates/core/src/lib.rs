// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod generate;
mod invoice;
mod lock;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, apply_bootstrap};
pub use command::{Command, LineItemPatch};
pub use error::CoreError;
pub use generate::{GenerationWarning, LedgerGeneration, generate_line_items};
pub use invoice::{Invoice, InvoiceTotals, compute_totals};
pub use lock::LockState;
pub use state::{BootstrapResult, RateConfiguration, TransitionResult};

/// Validates that an invoice accepts mutating commands.
///
/// This is a read-only validation that does not create audit events.
///
/// # Arguments
///
/// * `invoice` - The invoice to check
///
/// # Returns
///
/// * `Ok(())` if the invoice is unlocked
/// * `Err(CoreError::InvoiceLocked)` if the invoice is locked
///
/// # Errors
///
/// Returns an error if the invoice is locked.
pub fn validate_invoice_unlocked(invoice: &Invoice) -> Result<(), CoreError> {
    if invoice.lock.is_locked() {
        return Err(CoreError::InvoiceLocked {
            invoice: invoice.display_id(),
        });
    }
    Ok(())
}
