// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;
use time::macros::date;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::NoRateRuleFound {
        visit_id: 7,
        service: String::from("PERSONAL-CARE"),
        day_type: String::from("monday"),
    };
    assert_eq!(
        format!("{err}"),
        "No rate rule found for visit 7 (service 'PERSONAL-CARE', day 'monday')"
    );

    let err: DomainError = DomainError::AmbiguousRateRule {
        visit_id: 7,
        matching_block_ids: vec![1, 2],
    };
    assert_eq!(
        format!("{err}"),
        "Ambiguous rate configuration for visit 7: blocks [1, 2] all match"
    );

    let err: DomainError = DomainError::InvalidRateBlock {
        reason: String::from("test"),
    };
    assert_eq!(format!("{err}"), "Invalid rate block: test");

    let err: DomainError = DomainError::InvalidVisit {
        visit_id: 7,
        reason: String::from("test"),
    };
    assert_eq!(format!("{err}"), "Invalid visit 7: test");

    let err: DomainError = DomainError::InvalidDayType(String::from("someday"));
    assert_eq!(format!("{err}"), "Invalid day type: someday");

    let err: DomainError = DomainError::InvalidClientCategory(String::from("elderly"));
    assert_eq!(format!("{err}"), "Invalid client category: elderly");

    let err: DomainError = DomainError::InvalidTimeWindow {
        reason: String::from("test"),
    };
    assert_eq!(format!("{err}"), "Invalid time window: test");

    let err: DomainError = DomainError::InvalidPeriod {
        start_date: date!(2026 - 04 - 01),
        end_date: date!(2026 - 03 - 01),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid billing period: start 2026-04-01 is after end 2026-03-01"
    );

    let err: DomainError = DomainError::AmountParseError {
        amount_string: String::from("ten"),
    };
    assert_eq!(format!("{err}"), "Failed to parse amount 'ten'");

    let err: DomainError = DomainError::DateParseError {
        date_string: String::from("not-a-date"),
        error: String::from("bad input"),
    };
    assert_eq!(
        format!("{err}"),
        "Failed to parse date 'not-a-date': bad input"
    );
}
