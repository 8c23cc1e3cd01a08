// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side mutations: rate configuration, visits, invoices, ledger
//! replacement, and the audit trail.
//!
//! Ledger replacement is atomic. A transition persists inside a single
//! transaction that checks the invoice's optimistic version, deletes the
//! old line items, inserts the replacement set, updates the header, and
//! records the audit event. A version mismatch rolls the whole
//! transaction back with `ConcurrentModification`.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use care_ledger::{BootstrapResult, Invoice, TransitionResult};
use care_ledger_audit::AuditEvent;
use care_ledger_domain::{LedgerLineItem, PricingStatus, RateBlock, Visit};

use crate::convert::{
    date_to_text, day_set_to_text, decimal_to_text, service_set_to_text, time_to_text,
};
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::{audit_events, invoices, line_items, rate_blocks, visits};
use crate::error::PersistenceError;
use crate::queries::get_invoice_version;
use crate::sqlite::get_last_insert_rowid;

/// The result of persisting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The event ID assigned to the audit event.
    pub event_id: i64,
    /// The invoice's version after the write.
    pub new_version: i64,
}

/// The result of persisting a bootstrap operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistBootstrapResult {
    /// The event ID assigned to the audit event.
    pub event_id: i64,
    /// The ID assigned to a created rate block, if any.
    pub rate_block_id: Option<i64>,
    /// The ID assigned to a created invoice, if any.
    pub invoice_id: Option<i64>,
}

/// Persists a rate block.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `block` - The rate block to persist
///
/// # Returns
///
/// The rate block ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn save_rate_block(
    conn: &mut SqliteConnection,
    block: &RateBlock,
) -> Result<i64, PersistenceError> {
    let window_from: Option<String> = block
        .effective_window
        .map(|window| time_to_text(window.from()))
        .transpose()?;
    let window_until: Option<String> = block
        .effective_window
        .map(|window| time_to_text(window.until()))
        .transpose()?;

    diesel::insert_into(rate_blocks::table)
        .values((
            rate_blocks::name.eq(&block.name),
            rate_blocks::applicable_days.eq(day_set_to_text(&block.applicable_days)?),
            rate_blocks::rate_type.eq(block.rate_type.as_str()),
            rate_blocks::window_from.eq(window_from),
            rate_blocks::window_until.eq(window_until),
            rate_blocks::charge_basis.eq(block.charge_basis.as_str()),
            rate_blocks::calculation_json.eq(serde_json::to_string(&block.calculation)?),
            rate_blocks::linked_services.eq(service_set_to_text(&block.linked_services)?),
            rate_blocks::bank_holiday_multiplier
                .eq(block.bank_holiday_multiplier.map(decimal_to_text)),
            rate_blocks::is_vatable.eq(i32::from(block.is_vatable)),
        ))
        .execute(conn)?;

    let rate_block_id: i64 = get_last_insert_rowid(conn)?;
    debug!("Persisted rate block {} ('{}')", rate_block_id, block.name);
    Ok(rate_block_id)
}

/// Persists a visit record received from the booking system.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `visit` - The visit to persist
///
/// # Returns
///
/// The visit ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn save_visit(conn: &mut SqliteConnection, visit: &Visit) -> Result<i64, PersistenceError> {
    diesel::insert_into(visits::table)
        .values((
            visits::client_id.eq(visit.client_id),
            visits::visit_date.eq(date_to_text(visit.date)),
            visits::day_type.eq(visit.day_type.as_str()),
            visits::start_time.eq(time_to_text(visit.start_time)?),
            visits::end_time.eq(time_to_text(visit.end_time)?),
            visits::service_code.eq(visit.service_id.code()),
            visits::client_category.eq(visit.client_category.as_str()),
        ))
        .execute(conn)?;

    let visit_id: i64 = get_last_insert_rowid(conn)?;
    debug!("Persisted visit {}", visit_id);
    Ok(visit_id)
}

/// Persists a new invoice header.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice` - The invoice to persist (line items are written by
///   `persist_transition`)
///
/// # Returns
///
/// The invoice ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn create_invoice(
    conn: &mut SqliteConnection,
    invoice: &Invoice,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(invoices::table)
        .values((
            invoices::client_id.eq(invoice.client_id),
            invoices::period_start.eq(date_to_text(invoice.period.start_date())),
            invoices::period_end.eq(date_to_text(invoice.period.end_date())),
            invoices::vat_rate.eq(decimal_to_text(invoice.vat_rate)),
            invoices::net_amount.eq(decimal_to_text(invoice.totals.net_amount)),
            invoices::vat_amount.eq(decimal_to_text(invoice.totals.vat_amount)),
            invoices::total_amount.eq(decimal_to_text(invoice.totals.total_amount)),
            invoices::total_invoiced_minutes.eq(0),
            invoices::lock_state.eq(invoice.lock.as_str()),
            invoices::locked_at.eq(invoice.lock.locked_at()),
            invoices::locked_by.eq(invoice.lock.locked_by()),
            invoices::version.eq(0),
        ))
        .execute(conn)?;

    let invoice_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        "Persisted invoice {} for client {}",
        invoice_id, invoice.client_id
    );
    Ok(invoice_id)
}

/// Persists an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };
    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };
    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    let created_at: String = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::invoice_id.eq(event.invoice_id),
            audit_events::actor_json.eq(serde_json::to_string(&actor_data)?),
            audit_events::cause_json.eq(serde_json::to_string(&cause_data)?),
            audit_events::action_json.eq(serde_json::to_string(&action_data)?),
            audit_events::before_snapshot_json.eq(serde_json::to_string(&before_data)?),
            audit_events::after_snapshot_json.eq(serde_json::to_string(&after_data)?),
            audit_events::created_at.eq(Some(created_at)),
        ))
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!("Persisted audit event {} ({})", event_id, event.action.name);
    Ok(event_id)
}

/// Persists a transition result atomically.
///
/// The whole write happens in one transaction guarded by the invoice's
/// optimistic version: either the old ledger is fully replaced, the
/// header updated, the version bumped, and the audit event recorded, or
/// nothing is.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition result to persist
/// * `expected_version` - The version the transition was computed against
///
/// # Returns
///
/// A `PersistTransitionResult` with the audit event ID and new version.
///
/// # Errors
///
/// Returns an error if:
/// - The invoice does not exist
/// - The stored version differs from `expected_version`
///   (`ConcurrentModification`)
/// - Persistence or serialization fails
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    expected_version: i64,
) -> Result<PersistTransitionResult, PersistenceError> {
    let invoice: &Invoice = &result.new_invoice;
    let invoice_id: i64 = invoice
        .invoice_id
        .ok_or_else(|| PersistenceError::ReconstructionError(
            "Cannot persist a transition for an unsaved invoice".to_string(),
        ))?;

    conn.transaction::<PersistTransitionResult, PersistenceError, _>(|conn| {
        let actual: i64 = get_invoice_version(conn, invoice_id)?;
        if actual != expected_version {
            return Err(PersistenceError::ConcurrentModification {
                invoice_id,
                expected: expected_version,
                actual,
            });
        }
        let new_version: i64 = expected_version + 1;
        let total_minutes: i32 =
            i32::try_from(invoice.totals.total_invoiced_minutes).map_err(|_| {
                PersistenceError::SerializationError("Invoiced minutes out of range".to_string())
            })?;

        // Replace the ledger wholesale: old rows are discarded, never merged
        diesel::delete(line_items::table.filter(line_items::invoice_id.eq(invoice_id)))
            .execute(conn)?;

        for (index, line) in invoice.line_items.iter().enumerate() {
            insert_line_item(conn, invoice_id, index, line)?;
        }

        diesel::update(invoices::table.filter(invoices::invoice_id.eq(invoice_id)))
            .set((
                invoices::net_amount.eq(decimal_to_text(invoice.totals.net_amount)),
                invoices::vat_amount.eq(decimal_to_text(invoice.totals.vat_amount)),
                invoices::total_amount.eq(decimal_to_text(invoice.totals.total_amount)),
                invoices::total_invoiced_minutes.eq(total_minutes),
                invoices::lock_state.eq(invoice.lock.as_str()),
                invoices::locked_at.eq(invoice.lock.locked_at()),
                invoices::locked_by.eq(invoice.lock.locked_by()),
                invoices::version.eq(new_version),
            ))
            .execute(conn)?;

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        debug!(
            "Persisted transition for invoice {} (version {} -> {})",
            invoice_id, expected_version, new_version
        );

        Ok(PersistTransitionResult {
            event_id,
            new_version,
        })
    })
}

/// Persists a bootstrap result (rate block or invoice creation).
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The bootstrap result to persist
///
/// # Returns
///
/// A `PersistBootstrapResult` with the audit event ID and created IDs.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_bootstrap(
    conn: &mut SqliteConnection,
    result: &BootstrapResult,
) -> Result<PersistBootstrapResult, PersistenceError> {
    conn.transaction::<PersistBootstrapResult, PersistenceError, _>(|conn| {
        let rate_block_id: Option<i64> = result
            .created_rate_block
            .as_ref()
            .map(|block| save_rate_block(conn, block))
            .transpose()?;

        let invoice_id: Option<i64> = result
            .created_invoice
            .as_ref()
            .map(|invoice| create_invoice(conn, invoice))
            .transpose()?;

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        Ok(PersistBootstrapResult {
            event_id,
            rate_block_id,
            invoice_id,
        })
    })
}

/// Inserts one ledger line for an invoice.
fn insert_line_item(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    position: usize,
    line: &LedgerLineItem,
) -> Result<(), PersistenceError> {
    let priced_rate_block_id: Option<i64> = match line.pricing {
        PricingStatus::Priced { rate_block_id } => Some(rate_block_id),
        PricingStatus::NoRateRule | PricingStatus::AmbiguousRateRule => None,
    };

    let position: i32 = i32::try_from(position).map_err(|_| {
        PersistenceError::SerializationError("Line position out of range".to_string())
    })?;

    let duration: i32 = i32::try_from(line.duration_minutes).map_err(|_| {
        PersistenceError::SerializationError("Duration out of range".to_string())
    })?;

    diesel::insert_into(line_items::table)
        .values((
            line_items::invoice_id.eq(invoice_id),
            line_items::position.eq(position),
            line_items::visit_id.eq(line.visit_id),
            line_items::description.eq(&line.description),
            line_items::rate_type_applied.eq(line.rate_type_applied.as_str()),
            line_items::day_type.eq(line.day_type.as_str()),
            line_items::duration_minutes.eq(duration),
            line_items::quantity.eq(decimal_to_text(line.quantity)),
            line_items::unit_price.eq(decimal_to_text(line.unit_price)),
            line_items::bank_holiday_multiplier
                .eq(decimal_to_text(line.bank_holiday_multiplier_applied)),
            line_items::line_total.eq(decimal_to_text(line.line_total)),
            line_items::is_vatable.eq(i32::from(line.is_vatable)),
            line_items::pricing_status.eq(line.pricing.as_str()),
            line_items::priced_rate_block_id.eq(priced_rate_block_id),
        ))
        .execute(conn)?;

    Ok(())
}
