// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers orchestrate the explicit persistence boundary around the
//! pure core transitions: load state, build a command, apply it, persist
//! the transition result under the optimistic version check, and project
//! the outcome. All clock access happens here; the core never reads
//! time.

use tracing::info;

use care_ledger::{
    BootstrapResult, Command, Invoice, LineItemPatch, RateConfiguration, TransitionResult, apply,
    apply_bootstrap,
};
use care_ledger_audit::Cause;
use care_ledger_domain::RateBlock;
use care_ledger_persistence::{PersistBootstrapResult, Persistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, ApiResult, translate_core_error, translate_persistence_error,
};
use crate::request_response::{
    AuditEventInfo, CreateInvoiceRequest, CreateInvoiceResponse, CreateRateBlockRequest,
    CreateRateBlockResponse, EditLineItemRequest, EditLineItemResponse, GenerateLedgerRequest,
    GenerateLedgerResponse, GenerationWarningInfo, GetInvoiceResponse, InvoiceInfo,
    ListAuditEventsResponse, ListInvoicesResponse, LockLedgerRequest, LockLedgerResponse,
};

/// Builds the audit cause from request fields.
fn request_cause(cause_id: &str, cause_description: &str) -> Cause {
    Cause::new(cause_id.to_string(), cause_description.to_string())
}

/// Current UTC timestamp in ISO 8601, for lock metadata.
fn now_utc_text() -> ApiResult<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

/// Creates a rate block.
///
/// The block is validated and checked for overlap against the existing
/// configuration before it is accepted.
///
/// # Errors
///
/// Returns an error if authorization, validation, or persistence fails.
pub fn create_rate_block(
    persistence: &mut Persistence,
    authenticated: &AuthenticatedActor,
    request: &CreateRateBlockRequest,
) -> ApiResult<CreateRateBlockResponse> {
    AuthorizationService::authorize_mutation(authenticated, "create_rate_block")?;

    let block: RateBlock = request.to_rate_block()?;
    let configuration: RateConfiguration = RateConfiguration {
        rate_blocks: persistence
            .list_rate_blocks()
            .map_err(translate_persistence_error)?,
    };

    let result: BootstrapResult = apply_bootstrap(
        &configuration,
        Command::CreateRateBlock { block },
        authenticated.actor.clone(),
        request_cause(&request.cause_id, &request.cause_description),
    )
    .map_err(translate_core_error)?;

    let persisted: PersistBootstrapResult = persistence
        .persist_bootstrap(&result)
        .map_err(translate_persistence_error)?;

    let rate_block_id: i64 = persisted.rate_block_id.ok_or_else(|| ApiError::Internal {
        message: String::from("Rate block creation produced no rate block id"),
    })?;

    info!("Created rate block {} ('{}')", rate_block_id, request.name);

    Ok(CreateRateBlockResponse {
        rate_block_id,
        name: request.name.clone(),
    })
}

/// Creates a new, empty, unlocked invoice.
///
/// # Errors
///
/// Returns an error if authorization, validation, or persistence fails.
pub fn create_invoice(
    persistence: &mut Persistence,
    authenticated: &AuthenticatedActor,
    request: &CreateInvoiceRequest,
) -> ApiResult<CreateInvoiceResponse> {
    AuthorizationService::authorize_mutation(authenticated, "create_invoice")?;

    let configuration: RateConfiguration = RateConfiguration::new();
    let result: BootstrapResult = apply_bootstrap(
        &configuration,
        Command::CreateInvoice {
            client_id: request.client_id,
            period: request.period()?,
            vat_rate: request.vat_rate,
        },
        authenticated.actor.clone(),
        request_cause(&request.cause_id, &request.cause_description),
    )
    .map_err(translate_core_error)?;

    let persisted: PersistBootstrapResult = persistence
        .persist_bootstrap(&result)
        .map_err(translate_persistence_error)?;

    let invoice_id: i64 = persisted.invoice_id.ok_or_else(|| ApiError::Internal {
        message: String::from("Invoice creation produced no invoice id"),
    })?;

    info!(
        "Created invoice {} for client {}",
        invoice_id, request.client_id
    );

    let invoice: Invoice = persistence
        .load_invoice(invoice_id)
        .map_err(translate_persistence_error)?;

    Ok(CreateInvoiceResponse {
        invoice: InvoiceInfo::from_invoice(&invoice),
    })
}

/// Regenerates an invoice's ledger from the visits delivered within its
/// billing period.
///
/// Visits that cannot be priced stay in the ledger as flagged lines; the
/// response reports "N of M visits priced, K flagged" with one warning
/// per flagged line.
///
/// # Errors
///
/// Returns an error if the invoice is locked, a write race is detected,
/// or persistence fails.
pub fn generate_ledger(
    persistence: &mut Persistence,
    authenticated: &AuthenticatedActor,
    request: &GenerateLedgerRequest,
) -> ApiResult<GenerateLedgerResponse> {
    AuthorizationService::authorize_mutation(authenticated, "generate_ledger")?;

    let invoice: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    let visits = persistence
        .list_visits(invoice.client_id, invoice.period)
        .map_err(translate_persistence_error)?;
    let rate_blocks = persistence
        .list_rate_blocks()
        .map_err(translate_persistence_error)?;

    let result: TransitionResult = apply(
        &invoice,
        Command::GenerateLedger {
            visits,
            rate_blocks,
        },
        authenticated.actor.clone(),
        request_cause(&request.cause_id, &request.cause_description),
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_transition(&result, invoice.version)
        .map_err(translate_persistence_error)?;

    let reloaded: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    let warnings: Vec<GenerationWarningInfo> = reloaded
        .line_items
        .iter()
        .filter(|line| !line.is_priced())
        .map(|line| GenerationWarningInfo {
            visit_id: line.visit_id,
            flag: line.pricing.as_str().to_string(),
            message: format!(
                "Visit {} ({}) could not be priced: {}",
                line.visit_id,
                line.description,
                line.pricing.as_str()
            ),
        })
        .collect();
    let flagged_count: usize = warnings.len();
    let priced_count: usize = reloaded.line_items.len() - flagged_count;
    let summary: String = format!(
        "{priced_count} of {} visits priced, {flagged_count} flagged",
        reloaded.line_items.len()
    );

    info!(
        "Generated ledger for invoice {}: {}",
        request.invoice_id, summary
    );

    Ok(GenerateLedgerResponse {
        invoice: InvoiceInfo::from_invoice(&reloaded),
        summary,
        priced_count,
        flagged_count,
        warnings,
    })
}

/// Locks or unlocks an invoice's ledger.
///
/// Both transitions are explicit actor decisions recorded with actor and
/// timestamp; unlocking requires the administrator role.
///
/// # Errors
///
/// Returns an error if authorization fails, the transition is invalid
/// for the current lock state, or persistence fails.
pub fn lock_ledger(
    persistence: &mut Persistence,
    authenticated: &AuthenticatedActor,
    request: &LockLedgerRequest,
) -> ApiResult<LockLedgerResponse> {
    let command: Command = if request.locked {
        AuthorizationService::authorize_mutation(authenticated, "lock_ledger")?;
        Command::LockInvoice {
            locked_at: now_utc_text()?,
        }
    } else {
        AuthorizationService::authorize_unlock(authenticated, "unlock_ledger")?;
        Command::UnlockInvoice
    };

    let invoice: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    let result: TransitionResult = apply(
        &invoice,
        command,
        authenticated.actor.clone(),
        request_cause(&request.cause_id, &request.cause_description),
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_transition(&result, invoice.version)
        .map_err(translate_persistence_error)?;

    let reloaded: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    info!(
        "Invoice {} is now {}",
        request.invoice_id,
        reloaded.lock.as_str()
    );

    Ok(LockLedgerResponse {
        invoice: InvoiceInfo::from_invoice(&reloaded),
    })
}

/// Manually edits a single ledger line and recomputes the invoice totals.
///
/// # Errors
///
/// Returns an error if the invoice is locked, the line does not exist,
/// the patch is invalid, or persistence fails.
pub fn edit_line_item(
    persistence: &mut Persistence,
    authenticated: &AuthenticatedActor,
    request: &EditLineItemRequest,
) -> ApiResult<EditLineItemResponse> {
    AuthorizationService::authorize_mutation(authenticated, "edit_line_item")?;

    let invoice: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    let result: TransitionResult = apply(
        &invoice,
        Command::EditLineItem {
            line_item_id: request.line_item_id,
            patch: LineItemPatch {
                description: request.description.clone(),
                quantity: request.quantity,
                unit_price: request.unit_price,
            },
        },
        authenticated.actor.clone(),
        request_cause(&request.cause_id, &request.cause_description),
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_transition(&result, invoice.version)
        .map_err(translate_persistence_error)?;

    let reloaded: Invoice = persistence
        .load_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    info!(
        "Edited line {} on invoice {}",
        request.line_item_id, request.invoice_id
    );

    Ok(EditLineItemResponse {
        invoice: InvoiceInfo::from_invoice(&reloaded),
    })
}

/// Reads one invoice with its ledger.
///
/// # Errors
///
/// Returns an error if the invoice does not exist.
pub fn get_invoice(
    persistence: &mut Persistence,
    invoice_id: i64,
) -> ApiResult<GetInvoiceResponse> {
    let invoice: Invoice = persistence
        .load_invoice(invoice_id)
        .map_err(translate_persistence_error)?;

    Ok(GetInvoiceResponse {
        invoice: InvoiceInfo::from_invoice(&invoice),
    })
}

/// Lists all invoices, newest first.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn list_invoices(persistence: &mut Persistence) -> ApiResult<ListInvoicesResponse> {
    let invoices = persistence
        .list_invoices()
        .map_err(translate_persistence_error)?;

    Ok(ListInvoicesResponse {
        invoices: invoices.iter().map(InvoiceInfo::from_invoice).collect(),
    })
}

/// Lists the audit timeline for an invoice, oldest first.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn list_audit_events(
    persistence: &mut Persistence,
    invoice_id: i64,
) -> ApiResult<ListAuditEventsResponse> {
    // Surface a not-found for unknown invoices rather than an empty list
    persistence
        .load_invoice(invoice_id)
        .map_err(translate_persistence_error)?;

    let records = persistence
        .list_audit_events(invoice_id)
        .map_err(translate_persistence_error)?;

    Ok(ListAuditEventsResponse {
        events: records.iter().map(AuditEventInfo::from_record).collect(),
    })
}
