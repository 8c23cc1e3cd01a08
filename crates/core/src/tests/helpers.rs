// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Invoice;
use care_ledger_audit::{Actor, Cause};
use care_ledger_domain::{
    BillingPeriod, CalculationMethod, ChargeBasis, ClientCategory, DayType, RateBlock, ServiceId,
    Visit,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use time::macros::{date, time};
use time::{Date, Time};

pub const TEST_CLIENT: i64 = 10;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("op-123"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Operator request"))
}

/// An unlocked March 2026 invoice for the test client, VAT at 20%.
pub fn create_test_invoice() -> Invoice {
    let period: BillingPeriod =
        BillingPeriod::new(date!(2026 - 03 - 01), date!(2026 - 03 - 31)).unwrap();
    let mut invoice: Invoice =
        Invoice::new(TEST_CLIENT, period, Decimal::new(20, 2));
    invoice.invoice_id = Some(1);
    invoice
}

/// An all-week hours/minutes block at 10/hr with a 2x holiday multiplier.
pub fn create_test_rate_block(id: i64) -> RateBlock {
    RateBlock {
        rate_block_id: Some(id),
        name: format!("Standard hourly {id}"),
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
        bank_holiday_multiplier: Some(Decimal::from(2)),
        is_vatable: false,
    }
}

pub fn create_test_visit(
    visit_id: i64,
    date: Date,
    day_type: DayType,
    start: Time,
    end: Time,
) -> Visit {
    Visit::new(
        visit_id,
        TEST_CLIENT,
        date,
        day_type,
        start,
        end,
        ServiceId::new("personal-care"),
        ClientCategory::Standard,
    )
}

/// The month-end scenario: a Monday two-hour call and a one-hour
/// bank-holiday call with a 2x multiplier, both at 10/hr.
pub fn create_scenario_visits() -> Vec<Visit> {
    vec![
        create_test_visit(
            1,
            date!(2026 - 03 - 02),
            DayType::Monday,
            time!(09:00),
            time!(11:00),
        ),
        create_test_visit(
            2,
            date!(2026 - 03 - 09),
            DayType::BankHoliday,
            time!(14:00),
            time!(15:00),
        ),
    ]
}
