// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the optimistic version check: a stale writer must be
//! rejected wholesale, leaving the winning write untouched.

use crate::{Persistence, PersistenceError};
use care_ledger::{Command, Invoice, LineItemPatch, TransitionResult, apply};
use care_ledger_audit::{Actor, Cause};
use care_ledger_domain::{
    BillingPeriod, CalculationMethod, ChargeBasis, ClientCategory, DayType, RateBlock, ServiceId,
    Visit,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use time::macros::{date, time};

fn actor() -> Actor {
    Actor::new(String::from("op-1"), String::from("operator"))
}

fn cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Operator request"))
}

fn all_week_block() -> RateBlock {
    RateBlock {
        rate_block_id: None,
        name: String::from("All week hourly"),
        applicable_days: [
            DayType::Monday,
            DayType::Tuesday,
            DayType::Wednesday,
            DayType::Thursday,
            DayType::Friday,
            DayType::Saturday,
            DayType::Sunday,
            DayType::BankHoliday,
        ]
        .into_iter()
        .collect(),
        rate_type: ClientCategory::Standard,
        effective_window: None,
        charge_basis: ChargeBasis::HoursMinutes,
        calculation: CalculationMethod::RatePerHour {
            rate: Decimal::from(10),
        },
        linked_services: BTreeSet::new(),
        bank_holiday_multiplier: None,
        is_vatable: false,
    }
}

/// Creates an invoice with one generated two-hour line at version 1.
fn generated_invoice(persistence: &mut Persistence) -> Invoice {
    persistence.save_rate_block(&all_week_block()).unwrap();
    let rate_blocks: Vec<RateBlock> = persistence.list_rate_blocks().unwrap();

    let visit: Visit = Visit::new(
        0,
        10,
        date!(2026 - 03 - 02),
        DayType::Monday,
        time!(09:00),
        time!(11:00),
        ServiceId::new("personal-care"),
        ClientCategory::Standard,
    );
    persistence.save_visit(&visit).unwrap();

    let period: BillingPeriod =
        BillingPeriod::new(date!(2026 - 03 - 01), date!(2026 - 03 - 31)).unwrap();
    let mut invoice: Invoice = Invoice::new(10, period, Decimal::new(20, 2));
    let invoice_id: i64 = persistence.create_invoice(&invoice).unwrap();
    invoice.invoice_id = Some(invoice_id);

    let visits: Vec<Visit> = persistence.list_visits(10, period).unwrap();
    let result: TransitionResult = apply(
        &invoice,
        Command::GenerateLedger {
            visits,
            rate_blocks,
        },
        actor(),
        cause(),
    )
    .unwrap();
    persistence.persist_transition(&result, 0).unwrap();

    persistence.load_invoice(invoice_id).unwrap()
}

#[test]
fn test_stale_writer_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let invoice: Invoice = generated_invoice(&mut persistence);
    let invoice_id: i64 = invoice.invoice_id.unwrap();

    // Two writers compute transitions from the same loaded state
    let first: TransitionResult = apply(
        &invoice,
        Command::EditLineItem {
            line_item_id: invoice.line_items[0].line_item_id.unwrap(),
            patch: LineItemPatch {
                description: Some(String::from("First writer")),
                quantity: None,
                unit_price: None,
            },
        },
        actor(),
        cause(),
    )
    .unwrap();
    let second: TransitionResult = apply(
        &invoice,
        Command::EditLineItem {
            line_item_id: invoice.line_items[0].line_item_id.unwrap(),
            patch: LineItemPatch {
                description: Some(String::from("Second writer")),
                quantity: None,
                unit_price: None,
            },
        },
        actor(),
        cause(),
    )
    .unwrap();

    // The first write wins
    persistence
        .persist_transition(&first, invoice.version)
        .unwrap();

    // The second write is stale and must be rejected atomically
    let result = persistence.persist_transition(&second, invoice.version);
    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::ConcurrentModification {
            expected: 1,
            actual: 2,
            ..
        }
    ));

    // The winning write is untouched
    let reloaded: Invoice = persistence.load_invoice(invoice_id).unwrap();
    assert_eq!(reloaded.line_items[0].description, "First writer");
    assert_eq!(reloaded.version, 2);
}

#[test]
fn test_rejected_write_applies_nothing() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let invoice: Invoice = generated_invoice(&mut persistence);
    let invoice_id: i64 = invoice.invoice_id.unwrap();

    let stale: TransitionResult = apply(
        &invoice,
        Command::GenerateLedger {
            visits: Vec::new(),
            rate_blocks: Vec::new(),
        },
        actor(),
        cause(),
    )
    .unwrap();

    // Claim a version that is already out of date
    let result = persistence.persist_transition(&stale, invoice.version - 1);
    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::ConcurrentModification { .. }
    ));

    // Ledger, totals, and audit trail are all unchanged
    let reloaded: Invoice = persistence.load_invoice(invoice_id).unwrap();
    assert_eq!(reloaded.line_items.len(), 1);
    assert_eq!(
        reloaded.totals.net_amount,
        Decimal::from_str("20.00").unwrap()
    );
    let timeline = persistence.list_audit_events(invoice_id).unwrap();
    assert_eq!(timeline.len(), 1);
}

#[test]
fn test_version_mismatch_on_missing_invoice() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let period: BillingPeriod =
        BillingPeriod::new(date!(2026 - 03 - 01), date!(2026 - 03 - 31)).unwrap();
    let mut invoice: Invoice = Invoice::new(10, period, Decimal::new(20, 2));
    invoice.invoice_id = Some(12345);

    let result_transition: TransitionResult = apply(
        &invoice,
        Command::GenerateLedger {
            visits: Vec::new(),
            rate_blocks: Vec::new(),
        },
        actor(),
        cause(),
    )
    .unwrap();

    let result = persistence.persist_transition(&result_transition, 0);
    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::InvoiceNotFound(12345)
    ));
}
