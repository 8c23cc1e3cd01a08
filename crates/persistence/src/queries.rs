// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side queries: invoices with their ledgers, rate configuration,
//! visits, and the audit timeline. All queries use Diesel DSL.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;

use care_ledger::{Invoice, InvoiceTotals, LockState};
use care_ledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use care_ledger_domain::{
    BillingPeriod, CalculationMethod, ChargeBasis, LedgerLineItem, PricingStatus, RateBlock,
    ServiceId, TimeWindow, Visit,
};

use crate::convert::{
    parse_client_category, parse_date, parse_day_set, parse_day_type, parse_decimal,
    parse_service_set, parse_time,
};
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::{audit_events, invoices, line_items, rate_blocks, visits};
use crate::error::PersistenceError;

/// Diesel Queryable struct for invoice header rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = invoices)]
struct InvoiceRow {
    invoice_id: i64,
    client_id: i64,
    period_start: String,
    period_end: String,
    vat_rate: String,
    net_amount: String,
    vat_amount: String,
    total_amount: String,
    total_invoiced_minutes: i32,
    lock_state: String,
    locked_at: Option<String>,
    locked_by: Option<String>,
    version: i64,
}

/// Diesel Queryable struct for ledger line rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = line_items)]
struct LineItemRow {
    line_item_id: i64,
    #[allow(dead_code)]
    invoice_id: i64,
    #[allow(dead_code)]
    position: i32,
    visit_id: i64,
    description: String,
    rate_type_applied: String,
    day_type: String,
    duration_minutes: i32,
    quantity: String,
    unit_price: String,
    bank_holiday_multiplier: String,
    line_total: String,
    is_vatable: i32,
    pricing_status: String,
    priced_rate_block_id: Option<i64>,
}

/// Diesel Queryable struct for rate block rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = rate_blocks)]
struct RateBlockRow {
    rate_block_id: i64,
    name: String,
    applicable_days: String,
    rate_type: String,
    window_from: Option<String>,
    window_until: Option<String>,
    charge_basis: String,
    calculation_json: String,
    linked_services: String,
    bank_holiday_multiplier: Option<String>,
    is_vatable: i32,
}

/// Diesel Queryable struct for visit rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = visits)]
struct VisitRow {
    visit_id: i64,
    client_id: i64,
    visit_date: String,
    day_type: String,
    start_time: String,
    end_time: String,
    service_code: String,
    client_category: String,
}

/// Diesel Queryable struct for audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    invoice_id: Option<i64>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: Option<String>,
}

/// A persisted audit event with its identifier and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEventRecord {
    /// The event ID assigned by the database.
    pub event_id: i64,
    /// The reconstructed audit event.
    pub event: AuditEvent,
    /// When the event was persisted (ISO 8601, UTC).
    pub created_at: Option<String>,
}

/// Loads an invoice with its full ledger.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `invoice_id` - The invoice to load
///
/// # Errors
///
/// Returns an error if the invoice does not exist or a stored row cannot
/// be reconstructed.
pub fn load_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Invoice, PersistenceError> {
    let result = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .select(InvoiceRow::as_select())
        .first::<InvoiceRow>(conn);

    let row: InvoiceRow = match result {
        Ok(r) => r,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::InvoiceNotFound(invoice_id));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let line_rows: Vec<LineItemRow> = line_items::table
        .filter(line_items::invoice_id.eq(invoice_id))
        .order(line_items::position.asc())
        .select(LineItemRow::as_select())
        .load::<LineItemRow>(conn)?;

    invoice_from_rows(&row, &line_rows)
}

/// Loads all invoices with their ledgers, newest first.
///
/// # Errors
///
/// Returns an error if a stored row cannot be reconstructed.
pub fn list_invoices(conn: &mut SqliteConnection) -> Result<Vec<Invoice>, PersistenceError> {
    let ids: Vec<i64> = invoices::table
        .order(invoices::invoice_id.desc())
        .select(invoices::invoice_id)
        .load::<i64>(conn)?;

    ids.into_iter().map(|id| load_invoice(conn, id)).collect()
}

/// Loads the full rate configuration.
///
/// # Errors
///
/// Returns an error if a stored row cannot be reconstructed.
pub fn list_rate_blocks(
    conn: &mut SqliteConnection,
) -> Result<Vec<RateBlock>, PersistenceError> {
    let rows: Vec<RateBlockRow> = rate_blocks::table
        .order(rate_blocks::rate_block_id.asc())
        .select(RateBlockRow::as_select())
        .load::<RateBlockRow>(conn)?;

    rows.iter().map(rate_block_from_row).collect()
}

/// Loads the visits delivered to a client within a billing period.
///
/// The range is inclusive on both ends; ISO 8601 date text compares
/// lexicographically in date order.
///
/// # Errors
///
/// Returns an error if a stored row cannot be reconstructed.
pub fn list_visits(
    conn: &mut SqliteConnection,
    client_id: i64,
    period: BillingPeriod,
) -> Result<Vec<Visit>, PersistenceError> {
    let start: String = crate::convert::date_to_text(period.start_date());
    let end: String = crate::convert::date_to_text(period.end_date());

    let rows: Vec<VisitRow> = visits::table
        .filter(visits::client_id.eq(client_id))
        .filter(visits::visit_date.ge(start))
        .filter(visits::visit_date.le(end))
        .order((visits::visit_date.asc(), visits::start_time.asc()))
        .select(VisitRow::as_select())
        .load::<VisitRow>(conn)?;

    rows.iter().map(visit_from_row).collect()
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let result = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn);

    let row: AuditEventRow = match result {
        Ok(r) => r,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::EventNotFound(event_id));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    audit_event_from_row(&row).map(|record| record.event)
}

/// Retrieves the audit timeline for an invoice, oldest first.
///
/// # Errors
///
/// Returns an error if a stored event cannot be deserialized.
pub fn list_audit_events_for_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Vec<AuditEventRecord>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::invoice_id.eq(invoice_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?;

    rows.iter().map(audit_event_from_row).collect()
}

/// Reads the stored version of an invoice.
///
/// # Errors
///
/// Returns an error if the invoice does not exist.
pub fn get_invoice_version(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<i64, PersistenceError> {
    let result = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .select(invoices::version)
        .first::<i64>(conn);

    match result {
        Ok(version) => Ok(version),
        Err(diesel::result::Error::NotFound) => {
            Err(PersistenceError::InvoiceNotFound(invoice_id))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

// ============================================================================
// Row reconstruction
// ============================================================================

fn invoice_from_rows(
    row: &InvoiceRow,
    line_rows: &[LineItemRow],
) -> Result<Invoice, PersistenceError> {
    let period: BillingPeriod =
        BillingPeriod::new(parse_date(&row.period_start)?, parse_date(&row.period_end)?)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

    let lock: LockState = match row.lock_state.as_str() {
        "unlocked" => LockState::Unlocked,
        "locked" => match (&row.locked_at, &row.locked_by) {
            (Some(locked_at), Some(locked_by)) => LockState::Locked {
                locked_at: locked_at.clone(),
                locked_by: locked_by.clone(),
            },
            _ => {
                return Err(PersistenceError::ReconstructionError(format!(
                    "Invoice {} is locked but missing lock metadata",
                    row.invoice_id
                )));
            }
        },
        other => {
            return Err(PersistenceError::ReconstructionError(format!(
                "Unknown lock state '{other}'"
            )));
        }
    };

    let line_items: Vec<LedgerLineItem> = line_rows
        .iter()
        .map(line_item_from_row)
        .collect::<Result<Vec<LedgerLineItem>, PersistenceError>>()?;

    let total_invoiced_minutes: u32 = row.total_invoiced_minutes.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError("Invoiced minutes out of range".to_string())
    })?;

    Ok(Invoice {
        invoice_id: Some(row.invoice_id),
        client_id: row.client_id,
        period,
        vat_rate: parse_decimal(&row.vat_rate)?,
        line_items,
        totals: InvoiceTotals {
            net_amount: parse_decimal(&row.net_amount)?,
            vat_amount: parse_decimal(&row.vat_amount)?,
            total_amount: parse_decimal(&row.total_amount)?,
            total_invoiced_minutes,
        },
        lock,
        version: row.version,
    })
}

fn line_item_from_row(row: &LineItemRow) -> Result<LedgerLineItem, PersistenceError> {
    let pricing: PricingStatus = match row.pricing_status.as_str() {
        "priced" => PricingStatus::Priced {
            rate_block_id: row.priced_rate_block_id.ok_or_else(|| {
                PersistenceError::ReconstructionError(format!(
                    "Line {} is priced but has no rate block reference",
                    row.line_item_id
                ))
            })?,
        },
        "no_rate_rule" => PricingStatus::NoRateRule,
        "ambiguous_rate_rule" => PricingStatus::AmbiguousRateRule,
        other => {
            return Err(PersistenceError::ReconstructionError(format!(
                "Unknown pricing status '{other}'"
            )));
        }
    };

    let duration_minutes: u32 = row.duration_minutes.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError("Duration out of range".to_string())
    })?;

    Ok(LedgerLineItem {
        line_item_id: Some(row.line_item_id),
        visit_id: row.visit_id,
        description: row.description.clone(),
        rate_type_applied: parse_client_category(&row.rate_type_applied)?,
        day_type: parse_day_type(&row.day_type)?,
        duration_minutes,
        quantity: parse_decimal(&row.quantity)?,
        unit_price: parse_decimal(&row.unit_price)?,
        bank_holiday_multiplier_applied: parse_decimal(&row.bank_holiday_multiplier)?,
        line_total: parse_decimal(&row.line_total)?,
        is_vatable: row.is_vatable != 0,
        pricing,
    })
}

fn rate_block_from_row(row: &RateBlockRow) -> Result<RateBlock, PersistenceError> {
    let effective_window: Option<TimeWindow> = match (&row.window_from, &row.window_until) {
        (Some(from), Some(until)) => Some(
            TimeWindow::new(parse_time(from)?, parse_time(until)?)
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
        ),
        (None, None) => None,
        _ => {
            return Err(PersistenceError::ReconstructionError(format!(
                "Rate block {} has a half-configured time window",
                row.rate_block_id
            )));
        }
    };

    let charge_basis: ChargeBasis = row.charge_basis.parse().map_err(
        |e: care_ledger_domain::DomainError| PersistenceError::ReconstructionError(e.to_string()),
    )?;

    let calculation: CalculationMethod = serde_json::from_str(&row.calculation_json)?;

    let bank_holiday_multiplier = row
        .bank_holiday_multiplier
        .as_deref()
        .map(parse_decimal)
        .transpose()?;

    Ok(RateBlock {
        rate_block_id: Some(row.rate_block_id),
        name: row.name.clone(),
        applicable_days: parse_day_set(&row.applicable_days)?,
        rate_type: parse_client_category(&row.rate_type)?,
        effective_window,
        charge_basis,
        calculation,
        linked_services: parse_service_set(&row.linked_services)?,
        bank_holiday_multiplier,
        is_vatable: row.is_vatable != 0,
    })
}

fn visit_from_row(row: &VisitRow) -> Result<Visit, PersistenceError> {
    Ok(Visit {
        visit_id: row.visit_id,
        client_id: row.client_id,
        date: parse_date(&row.visit_date)?,
        day_type: parse_day_type(&row.day_type)?,
        start_time: parse_time(&row.start_time)?,
        end_time: parse_time(&row.end_time)?,
        service_id: ServiceId::new(&row.service_code),
        client_category: parse_client_category(&row.client_category)?,
    })
}

fn audit_event_from_row(row: &AuditEventRow) -> Result<AuditEventRecord, PersistenceError> {
    let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
    let action_data: ActionData = serde_json::from_str(&row.action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

    let event: AuditEvent = AuditEvent::new(
        Actor::new(actor_data.id, actor_data.actor_type),
        Cause::new(cause_data.id, cause_data.description),
        Action::new(action_data.name, action_data.details),
        StateSnapshot::new(before_data.data),
        StateSnapshot::new(after_data.data),
        row.invoice_id,
    );

    Ok(AuditEventRecord {
        event_id: row.event_id,
        event,
        created_at: row.created_at.clone(),
    })
}
