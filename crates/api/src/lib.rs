// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the Care Ledger System.
//!
//! This crate exposes the ledger engine's operations as handler
//! functions over request/response types. It orchestrates the
//! persistence layer and the pure core transitions, applies the
//! authorization gate, and translates every inner error into an explicit
//! API error; domain, core, and persistence errors are never leaked
//! directly.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, ApiResult, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    create_invoice, create_rate_block, edit_line_item, generate_ledger, get_invoice,
    list_audit_events, list_invoices, lock_ledger,
};
pub use request_response::{
    AuditEventInfo, BreakPointsInput, CalculationInput, CalculationInputError,
    CreateInvoiceRequest, CreateInvoiceResponse, CreateRateBlockRequest, CreateRateBlockResponse,
    EditLineItemRequest, EditLineItemResponse, GenerateLedgerRequest, GenerateLedgerResponse,
    GenerationWarningInfo, GetInvoiceResponse, InvoiceInfo, LineItemInfo,
    ListAuditEventsResponse, ListInvoicesResponse, LockLedgerRequest, LockLedgerResponse,
};
