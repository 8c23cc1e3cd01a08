// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, LineItemPatch};
use crate::error::CoreError;
use crate::generate::{LedgerGeneration, generate_line_items};
use crate::invoice::Invoice;
use crate::lock::LockState;
use crate::state::{BootstrapResult, RateConfiguration, TransitionResult};
use care_ledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use care_ledger_domain::{
    DomainError, LedgerLineItem, RateBlockConflict, Visit, detect_overlapping_blocks,
    round_currency, validate_rate_block, validate_visit,
};
use rust_decimal::Decimal;

/// Applies a bootstrap command, producing new configuration and an audit
/// event.
///
/// Bootstrap commands (`CreateRateBlock`, `CreateInvoice`) create shared
/// configuration or new invoices; they never transition an existing
/// invoice.
///
/// # Arguments
///
/// * `configuration` - The current rate configuration (immutable)
/// * `command` - The bootstrap command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(BootstrapResult)` containing the new configuration and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The rate block fails validation
/// - The rate block overlaps an existing block
pub fn apply_bootstrap(
    configuration: &RateConfiguration,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<BootstrapResult, CoreError> {
    match command {
        Command::CreateRateBlock { block } => {
            validate_rate_block(&block)?;

            // Overlapping blocks are a configuration error caught at save
            // time, not left for the resolver to trip over
            let mut candidate: Vec<care_ledger_domain::RateBlock> =
                configuration.rate_blocks.clone();
            candidate.push(block.clone());
            let conflicts: Vec<RateBlockConflict> = detect_overlapping_blocks(&candidate);
            if let Some(conflict) = conflicts.first() {
                return Err(CoreError::DomainViolation(DomainError::InvalidRateBlock {
                    reason: format!(
                        "Block overlaps {}: {}",
                        conflict.first, conflict.reason
                    ),
                }));
            }

            let before: StateSnapshot = configuration.to_snapshot();
            let mut new_configuration: RateConfiguration = configuration.clone();
            new_configuration.add_rate_block(block.clone());
            let after: StateSnapshot = new_configuration.to_snapshot();

            let action: Action = Action::new(
                String::from("CreateRateBlock"),
                Some(format!(
                    "Created rate block '{}' ({}, {})",
                    block.name,
                    block.rate_type,
                    block.calculation.as_str()
                )),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, None);

            Ok(BootstrapResult {
                new_configuration,
                audit_event,
                created_invoice: None,
                created_rate_block: Some(block),
            })
        }
        Command::CreateInvoice {
            client_id,
            period,
            vat_rate,
        } => {
            let invoice: Invoice = Invoice::new(client_id, period, vat_rate);

            let before: StateSnapshot = StateSnapshot::new(String::from("invoice=(none)"));
            let after: StateSnapshot = invoice.to_snapshot();

            let action: Action = Action::new(
                String::from("CreateInvoice"),
                Some(format!(
                    "Created invoice for client {client_id} covering {} to {}",
                    period.start_date(),
                    period.end_date()
                )),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, None);

            Ok(BootstrapResult {
                new_configuration: configuration.clone(),
                audit_event,
                created_invoice: Some(invoice),
                created_rate_block: None,
            })
        }
        _ => {
            // Invoice-scoped commands should use apply() instead
            unreachable!("apply_bootstrap called with non-bootstrap command")
        }
    }
}

/// Applies a command to an invoice, producing a new invoice and audit
/// event.
///
/// The invoice is taken immutably and never modified in place: the
/// transition either yields a complete replacement or fails leaving the
/// prior state untouched. Every mutating command is rejected while the
/// invoice is locked.
///
/// # Arguments
///
/// * `invoice` - The current invoice (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new invoice and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The invoice is locked and the command mutates the ledger
/// - An unlock is requested while the invoice is not locked
/// - The command violates domain rules
#[allow(clippy::too_many_lines)]
pub fn apply(
    invoice: &Invoice,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::GenerateLedger {
            visits,
            rate_blocks,
        } => {
            crate::validate_invoice_unlocked(invoice)?;
            validate_visits_in_scope(invoice, &visits)?;

            let generation: LedgerGeneration = generate_line_items(&visits, &rate_blocks);

            let before: StateSnapshot = invoice.to_snapshot();
            let generation_summary: String = generation.summary();
            let new_invoice: Invoice = invoice.with_line_items(generation.line_items);
            let after: StateSnapshot = new_invoice.to_snapshot();

            let action: Action = Action::new(
                String::from("GenerateLedger"),
                Some(format!(
                    "Regenerated ledger for invoice {}: {}",
                    invoice.display_id(),
                    generation_summary
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                invoice.invoice_id,
            );

            Ok(TransitionResult {
                new_invoice,
                audit_event,
            })
        }
        Command::LockInvoice { locked_at } => {
            // A locked ledger rejects every mutation, including relocking
            crate::validate_invoice_unlocked(invoice)?;

            let before: StateSnapshot = invoice.to_snapshot();
            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.lock = LockState::Locked {
                locked_at: locked_at.clone(),
                locked_by: actor.id.clone(),
            };
            let after: StateSnapshot = new_invoice.to_snapshot();

            let action: Action = Action::new(
                String::from("LockInvoice"),
                Some(format!(
                    "Locked invoice {} at {locked_at}",
                    invoice.display_id()
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                invoice.invoice_id,
            );

            Ok(TransitionResult {
                new_invoice,
                audit_event,
            })
        }
        Command::UnlockInvoice => {
            if !invoice.lock.is_locked() {
                return Err(CoreError::InvoiceNotLocked {
                    invoice: invoice.display_id(),
                });
            }

            let before: StateSnapshot = invoice.to_snapshot();
            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.lock = LockState::Unlocked;
            let after: StateSnapshot = new_invoice.to_snapshot();

            let action: Action = Action::new(
                String::from("UnlockInvoice"),
                Some(format!("Unlocked invoice {}", invoice.display_id())),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                invoice.invoice_id,
            );

            Ok(TransitionResult {
                new_invoice,
                audit_event,
            })
        }
        Command::EditLineItem {
            line_item_id,
            patch,
        } => {
            crate::validate_invoice_unlocked(invoice)?;
            validate_patch(&patch)?;

            let index: usize = invoice
                .line_items
                .iter()
                .position(|line| line.line_item_id == Some(line_item_id))
                .ok_or(CoreError::LineItemNotFound { line_item_id })?;

            let before: StateSnapshot = invoice.to_snapshot();

            let mut line_items: Vec<LedgerLineItem> = invoice.line_items.clone();
            let line: &mut LedgerLineItem = &mut line_items[index];
            if let Some(description) = patch.description {
                line.description = description;
            }
            if let Some(quantity) = patch.quantity {
                line.quantity = quantity;
            }
            if let Some(unit_price) = patch.unit_price {
                line.unit_price = unit_price;
            }
            // Manual edits operate on realized components; the holiday
            // multiplier is not reapplied
            line.line_total = round_currency(line.quantity * line.unit_price);

            let new_invoice: Invoice = invoice.with_line_items(line_items);
            let after: StateSnapshot = new_invoice.to_snapshot();

            let action: Action = Action::new(
                String::from("EditLineItem"),
                Some(format!(
                    "Edited line {line_item_id} on invoice {}",
                    invoice.display_id()
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                invoice.invoice_id,
            );

            Ok(TransitionResult {
                new_invoice,
                audit_event,
            })
        }
        Command::CreateRateBlock { .. } | Command::CreateInvoice { .. } => {
            // Bootstrap commands should use apply_bootstrap() instead
            unreachable!("apply called with bootstrap command")
        }
    }
}

/// Validates that every visit belongs to the invoice's client and falls
/// within its billing period.
fn validate_visits_in_scope(invoice: &Invoice, visits: &[Visit]) -> Result<(), CoreError> {
    for visit in visits {
        validate_visit(visit)?;

        if visit.client_id != invoice.client_id {
            return Err(CoreError::DomainViolation(DomainError::InvalidVisit {
                visit_id: visit.visit_id,
                reason: format!(
                    "Visit belongs to client {}, invoice bills client {}",
                    visit.client_id, invoice.client_id
                ),
            }));
        }

        if !invoice.period.contains(visit.date) {
            return Err(CoreError::DomainViolation(DomainError::InvalidVisit {
                visit_id: visit.visit_id,
                reason: format!(
                    "Visit date {} is outside the billing period {} to {}",
                    visit.date,
                    invoice.period.start_date(),
                    invoice.period.end_date()
                ),
            }));
        }
    }
    Ok(())
}

/// Validates a manual line item patch.
fn validate_patch(patch: &LineItemPatch) -> Result<(), CoreError> {
    if patch.is_empty() {
        return Err(CoreError::InvalidPatch {
            reason: String::from("Patch carries no changes"),
        });
    }

    if let Some(description) = &patch.description {
        if description.is_empty() {
            return Err(CoreError::InvalidPatch {
                reason: String::from("Description cannot be empty"),
            });
        }
    }

    if let Some(quantity) = patch.quantity {
        if quantity < Decimal::ZERO {
            return Err(CoreError::InvalidPatch {
                reason: format!("Quantity must be non-negative, got {quantity}"),
            });
        }
    }

    if let Some(unit_price) = patch.unit_price {
        if unit_price < Decimal::ZERO {
            return Err(CoreError::InvalidPatch {
                reason: format!("Unit price must be non-negative, got {unit_price}"),
            });
        }
    }

    Ok(())
}
