// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the authorization gate: viewers cannot mutate, and only
//! administrators unlock.

use crate::{ApiError, authenticate_stub, create_rate_block, generate_ledger, lock_ledger};
use care_ledger_persistence::Persistence;

use super::helpers::{
    generate_request, hourly_block_request, lock_request, operator, persistence, seed_scenario,
    viewer,
};

#[test]
fn test_viewer_cannot_create_configuration() {
    let mut persistence: Persistence = persistence();

    let result = create_rate_block(&mut persistence, &viewer(), &hourly_block_request());

    assert!(matches!(
        result.unwrap_err(),
        ApiError::Unauthorized { required_role, .. } if required_role == "operator"
    ));
}

#[test]
fn test_viewer_cannot_generate() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);

    let result = generate_ledger(&mut persistence, &viewer(), &generate_request(invoice_id));

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_operator_cannot_unlock() {
    let mut persistence: Persistence = persistence();
    let invoice_id: i64 = seed_scenario(&mut persistence);
    lock_ledger(&mut persistence, &operator(), &lock_request(invoice_id, true)).unwrap();

    let result = lock_ledger(&mut persistence, &operator(), &lock_request(invoice_id, false));

    assert!(matches!(
        result.unwrap_err(),
        ApiError::Unauthorized { required_role, .. } if required_role == "administrator"
    ));
}

#[test]
fn test_administrator_outranks_operator() {
    let mut persistence: Persistence = persistence();

    let admin = authenticate_stub("admin-1", "administrator").unwrap();
    let result = create_rate_block(&mut persistence, &admin, &hourly_block_request());

    assert!(result.is_ok());
}

#[test]
fn test_unknown_role_is_rejected() {
    let result = authenticate_stub("op-1", "superuser");

    assert!(matches!(
        result.unwrap_err(),
        ApiError::InvalidInput { field, .. } if field == "actor_role"
    ));
}

#[test]
fn test_empty_actor_id_is_rejected() {
    let result = authenticate_stub("", "operator");

    assert!(matches!(
        result.unwrap_err(),
        ApiError::InvalidInput { field, .. } if field == "actor_id"
    ));
}
