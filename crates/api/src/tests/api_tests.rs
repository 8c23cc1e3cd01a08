// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end handler tests over an in-memory database.

use crate::request_response::{CalculationInput, EditLineItemRequest};
use crate::{
    ApiError, create_rate_block, edit_line_item, generate_ledger, get_invoice,
    list_audit_events, list_invoices,
};
use care_ledger_persistence::Persistence;
use rust_decimal::Decimal;

use super::helpers::{
    generate_request, hourly_block_request, operator, persistence, seed_scenario,
};

#[test]
fn test_create_rate_block_and_invoice() {
    let mut persistence: Persistence = persistence();

    let response =
        create_rate_block(&mut persistence, &operator(), &hourly_block_request()).unwrap();
    assert_eq!(response.name, "All week hourly");
    assert!(response.rate_block_id > 0);

    let invoice_id: i64 = seed_scenario(&mut persistence);
    let invoice = get_invoice(&mut persistence, invoice_id).unwrap().invoice;
    assert_eq!(invoice.client_id, 10);
    assert_eq!(invoice.lock_state, "unlocked");
    assert_eq!(invoice.net_amount, "0.00");
    assert!(invoice.line_items.is_empty());
}

#[test]
fn test_duplicate_overlapping_rate_block_is_rejected() {
    let mut persistence: Persistence = persistence();

    create_rate_block(&mut persistence, &operator(), &hourly_block_request()).unwrap();
    let result = create_rate_block(&mut persistence, &operator(), &hourly_block_request());

    assert!(matches!(
        result.unwrap_err(),
        ApiError::InvalidInput { field, .. } if field == "rate_block"
    ));
}

#[test]
fn test_generate_ledger_scenario() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);

    let response =
        generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();

    assert_eq!(response.summary, "2 of 2 visits priced, 0 flagged");
    assert_eq!(response.priced_count, 2);
    assert_eq!(response.flagged_count, 0);
    assert!(response.warnings.is_empty());

    // Monday 2h at 10/hr plus bank holiday 1h at 10/hr doubled
    assert_eq!(response.invoice.net_amount, "40.00");
    assert_eq!(response.invoice.total_invoiced_minutes, 180);
    assert_eq!(response.invoice.line_items.len(), 2);
    assert_eq!(response.invoice.version, 1);

    let holiday_line = response
        .invoice
        .line_items
        .iter()
        .find(|line| line.day_type == "bank_holiday")
        .unwrap();
    assert_eq!(holiday_line.line_total, "20.00");
    assert_eq!(holiday_line.bank_holiday_multiplier_applied, "2");
    // Exposed currency is pre-rounded to 2 decimal places
    assert_eq!(holiday_line.unit_price, "10.00");
}

#[test]
fn test_generate_reports_flagged_visits() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);

    // A second client category visit that no block matches
    let unmatched = care_ledger_domain::Visit::new(
        0,
        super::helpers::TEST_CLIENT,
        time::macros::date!(2026 - 03 - 10),
        care_ledger_domain::DayType::Tuesday,
        time::macros::time!(10:00),
        time::macros::time!(11:00),
        care_ledger_domain::ServiceId::new("respite"),
        care_ledger_domain::ClientCategory::Cyp,
    );
    persistence.save_visit(&unmatched).unwrap();

    let response =
        generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();

    assert_eq!(response.summary, "2 of 3 visits priced, 1 flagged");
    assert_eq!(response.warnings.len(), 1);
    assert_eq!(response.warnings[0].flag, "no_rate_rule");
    // The flagged visit is still on the ledger as a zero line
    let flagged = response
        .invoice
        .line_items
        .iter()
        .find(|line| line.pricing_status == "no_rate_rule")
        .unwrap();
    assert_eq!(flagged.line_total, "0.00");
    // Unpriced lines contribute nothing to the net
    assert_eq!(response.invoice.net_amount, "40.00");
}

#[test]
fn test_generate_twice_is_idempotent() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);

    let first =
        generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();
    let second =
        generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();

    assert_eq!(first.invoice.net_amount, second.invoice.net_amount);
    assert_eq!(
        first.invoice.total_invoiced_minutes,
        second.invoice.total_invoiced_minutes
    );
    assert_eq!(
        first.invoice.line_items.len(),
        second.invoice.line_items.len()
    );
    // Old lines were replaced, not appended
    assert_eq!(second.invoice.line_items.len(), 2);
    assert_eq!(second.invoice.version, 2);
}

#[test]
fn test_edit_line_item_recomputes_totals() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);
    let generated =
        generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();

    let line_id: i64 = generated.invoice.line_items[0].line_item_id.unwrap();
    let response = edit_line_item(
        &mut persistence,
        &operator(),
        &EditLineItemRequest {
            actor_id: String::from("op-1"),
            actor_role: String::from("operator"),
            cause_id: String::from("req-5"),
            cause_description: String::from("Manual correction"),
            invoice_id,
            line_item_id: line_id,
            description: Some(String::from("Reviewed visit")),
            quantity: Some(Decimal::from(3)),
            unit_price: None,
        },
    )
    .unwrap();

    let edited = response
        .invoice
        .line_items
        .iter()
        .find(|line| line.line_item_id == Some(line_id))
        .unwrap();
    assert_eq!(edited.description, "Reviewed visit");
    assert_eq!(edited.line_total, "30.00");
    assert_eq!(response.invoice.net_amount, "50.00");
}

#[test]
fn test_get_missing_invoice_is_not_found() {
    let mut persistence: Persistence = persistence();

    let result = get_invoice(&mut persistence, 999);

    assert!(matches!(
        result.unwrap_err(),
        ApiError::ResourceNotFound { .. }
    ));
}

#[test]
fn test_list_invoices_newest_first() {
    let mut persistence: Persistence = persistence();
    let first: i64 = seed_scenario(&mut persistence);
    let second: i64 = {
        let response =
            crate::create_invoice(&mut persistence, &operator(), &super::helpers::invoice_request())
                .unwrap();
        response.invoice.invoice_id.unwrap()
    };

    let response = list_invoices(&mut persistence).unwrap();

    assert_eq!(response.invoices.len(), 2);
    assert_eq!(response.invoices[0].invoice_id, Some(second));
    assert_eq!(response.invoices[1].invoice_id, Some(first));
}

#[test]
fn test_audit_timeline_records_operations() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);
    generate_ledger(&mut persistence, &operator(), &generate_request(invoice_id)).unwrap();

    let response = list_audit_events(&mut persistence, invoice_id).unwrap();

    assert_eq!(response.events.len(), 1);
    assert_eq!(response.events[0].action, "GenerateLedger");
    assert_eq!(response.events[0].actor_id, "op-1");
    assert!(
        response.events[0]
            .details
            .as_deref()
            .unwrap()
            .contains("2 of 2 visits priced")
    );
}

#[test]
fn test_invalid_calculation_input_is_rejected() {
    let mut persistence: Persistence = persistence();

    let mut request = hourly_block_request();
    request.calculation = CalculationInput {
        method: String::from("rate_per_hour"),
        rate: None,
        break_points: None,
        consecutive_hours_threshold: None,
    };

    let result = create_rate_block(&mut persistence, &operator(), &request);

    assert!(matches!(
        result.unwrap_err(),
        ApiError::InvalidInput { field, .. } if field == "calculation"
    ));
}

#[test]
fn test_invalid_period_is_rejected() {
    let mut persistence: Persistence = persistence();

    let mut request = super::helpers::invoice_request();
    request.period_start = String::from("2026-04-01");
    request.period_end = String::from("2026-03-01");

    let result = crate::create_invoice(&mut persistence, &operator(), &request);

    assert!(matches!(result.unwrap_err(), ApiError::InvalidInput { .. }));
}
