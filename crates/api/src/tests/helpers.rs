// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::auth::AuthenticatedActor;
use crate::request_response::{
    CalculationInput, CreateInvoiceRequest, CreateRateBlockRequest, GenerateLedgerRequest,
    LockLedgerRequest,
};
use crate::{authenticate_stub, create_invoice, create_rate_block};
use care_ledger_domain::{ClientCategory, DayType, ServiceId, Visit};
use care_ledger_persistence::Persistence;
use rust_decimal::Decimal;
use time::macros::{date, time};

pub const TEST_CLIENT: i64 = 10;

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn operator() -> AuthenticatedActor {
    authenticate_stub("op-1", "operator").unwrap()
}

pub fn administrator() -> AuthenticatedActor {
    authenticate_stub("admin-1", "administrator").unwrap()
}

pub fn viewer() -> AuthenticatedActor {
    authenticate_stub("view-1", "viewer").unwrap()
}

pub fn hourly_block_request() -> CreateRateBlockRequest {
    CreateRateBlockRequest {
        actor_id: String::from("op-1"),
        actor_role: String::from("operator"),
        cause_id: String::from("req-1"),
        cause_description: String::from("Configuration"),
        name: String::from("All week hourly"),
        applicable_days: vec![
            String::from("monday"),
            String::from("tuesday"),
            String::from("wednesday"),
            String::from("thursday"),
            String::from("friday"),
            String::from("saturday"),
            String::from("sunday"),
            String::from("bank_holiday"),
        ],
        rate_type: String::from("standard"),
        window_from: None,
        window_until: None,
        charge_basis: String::from("hours_minutes"),
        calculation: CalculationInput {
            method: String::from("rate_per_hour"),
            rate: Some(Decimal::from(10)),
            break_points: None,
            consecutive_hours_threshold: None,
        },
        linked_services: Vec::new(),
        bank_holiday_multiplier: Some(Decimal::from(2)),
        is_vatable: false,
    }
}

pub fn invoice_request() -> CreateInvoiceRequest {
    CreateInvoiceRequest {
        actor_id: String::from("op-1"),
        actor_role: String::from("operator"),
        cause_id: String::from("req-2"),
        cause_description: String::from("Month-end billing"),
        client_id: TEST_CLIENT,
        period_start: String::from("2026-03-01"),
        period_end: String::from("2026-03-31"),
        vat_rate: Decimal::new(20, 2),
    }
}

pub fn generate_request(invoice_id: i64) -> GenerateLedgerRequest {
    GenerateLedgerRequest {
        actor_id: String::from("op-1"),
        actor_role: String::from("operator"),
        cause_id: String::from("req-3"),
        cause_description: String::from("Ledger run"),
        invoice_id,
    }
}

pub fn lock_request(invoice_id: i64, locked: bool) -> LockLedgerRequest {
    LockLedgerRequest {
        actor_id: String::from("op-1"),
        actor_role: String::from("operator"),
        cause_id: String::from("req-4"),
        cause_description: String::from("Month-end close"),
        invoice_id,
        locked,
    }
}

/// Seeds the scenario data: an all-week hourly rate block plus the
/// Monday and bank-holiday visits, then creates the March invoice.
///
/// Returns the invoice id.
pub fn seed_scenario(persistence: &mut Persistence) -> i64 {
    create_rate_block(persistence, &operator(), &hourly_block_request()).unwrap();

    let monday: Visit = Visit::new(
        0,
        TEST_CLIENT,
        date!(2026 - 03 - 02),
        DayType::Monday,
        time!(09:00),
        time!(11:00),
        ServiceId::new("personal-care"),
        ClientCategory::Standard,
    );
    let holiday: Visit = Visit::new(
        0,
        TEST_CLIENT,
        date!(2026 - 03 - 09),
        DayType::BankHoliday,
        time!(14:00),
        time!(15:00),
        ServiceId::new("personal-care"),
        ClientCategory::Standard,
    );
    persistence.save_visit(&monday).unwrap();
    persistence.save_visit(&holiday).unwrap();

    let response = create_invoice(persistence, &operator(), &invoice_request()).unwrap();
    response.invoice.invoice_id.unwrap()
}
