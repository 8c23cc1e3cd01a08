// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use care_ledger::CoreError;
use care_ledger_domain::DomainError;
use care_ledger_persistence::PersistenceError;

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The operation conflicted with the invoice's current state.
    ///
    /// Covers lock violations and write races; prior state is untouched.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::NoRateRuleFound {
            visit_id,
            service,
            day_type,
        } => ApiError::DomainRuleViolation {
            rule: String::from("rate_rule_required"),
            message: format!(
                "No rate rule found for visit {visit_id} (service '{service}', day '{day_type}')"
            ),
        },
        DomainError::AmbiguousRateRule {
            visit_id,
            matching_block_ids,
        } => ApiError::DomainRuleViolation {
            rule: String::from("unambiguous_rate_rules"),
            message: format!(
                "Rate blocks {matching_block_ids:?} all match visit {visit_id}; overlapping configuration must be corrected"
            ),
        },
        DomainError::InvalidRateBlock { reason } => ApiError::InvalidInput {
            field: String::from("rate_block"),
            message: reason,
        },
        DomainError::InvalidVisit { visit_id, reason } => ApiError::InvalidInput {
            field: String::from("visit"),
            message: format!("Visit {visit_id}: {reason}"),
        },
        DomainError::InvalidDayType(value) => ApiError::InvalidInput {
            field: String::from("day_type"),
            message: format!("Unknown day type: {value}"),
        },
        DomainError::InvalidClientCategory(value) => ApiError::InvalidInput {
            field: String::from("client_category"),
            message: format!("Unknown client category: {value}"),
        },
        DomainError::InvalidTimeWindow { reason } => ApiError::InvalidInput {
            field: String::from("effective_window"),
            message: reason,
        },
        DomainError::InvalidPeriod {
            start_date,
            end_date,
        } => ApiError::InvalidInput {
            field: String::from("period"),
            message: format!("Start {start_date} is after end {end_date}"),
        },
        DomainError::AmountParseError { amount_string } => ApiError::InvalidInput {
            field: String::from("amount"),
            message: format!("Failed to parse amount '{amount_string}'"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvoiceLocked { invoice } => ApiError::Conflict {
            message: format!("Invoice {invoice} is locked; the ledger is frozen"),
        },
        CoreError::InvoiceNotLocked { invoice } => ApiError::Conflict {
            message: format!("Invoice {invoice} is not locked"),
        },
        CoreError::LineItemNotFound { line_item_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Line item"),
            message: format!("Line item {line_item_id} not found on this invoice"),
        },
        CoreError::InvalidPatch { reason } => ApiError::InvalidInput {
            field: String::from("patch"),
            message: reason,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// This translation is explicit and ensures persistence errors are not leaked directly.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::InvoiceNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Invoice"),
            message: format!("Invoice {id} does not exist"),
        },
        PersistenceError::RateBlockNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Rate block"),
            message: format!("Rate block {id} does not exist"),
        },
        PersistenceError::EventNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {id} does not exist"),
        },
        PersistenceError::ConcurrentModification {
            invoice_id,
            expected,
            actual,
        } => ApiError::Conflict {
            message: format!(
                "Invoice {invoice_id} was modified by another writer (expected version {expected}, found {actual}); retry with fresh state"
            ),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
