// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization gate for ledger operations.
//!
//! Authentication itself is an external collaborator; callers arrive
//! with an already-established identity. This module only decides what a
//! role may do: read-only access, ledger mutation, or unlocking a
//! finalized invoice.

use crate::error::ApiError;
use care_ledger_audit::Actor;

/// The role an authenticated actor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// Read-only access to invoices and reports.
    Viewer,
    /// May create configuration, generate ledgers, lock invoices, and
    /// edit line items.
    Operator,
    /// May additionally unlock a finalized invoice.
    Administrator,
}

impl Role {
    /// Parses a role from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - The string to parse
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not match a valid role.
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "operator" => Ok(Self::Operator),
            "administrator" => Ok(Self::Administrator),
            _ => Err(ApiError::InvalidInput {
                field: String::from("actor_role"),
                message: format!("Unknown role: {s}"),
            }),
        }
    }

    /// Returns the string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Operator => "operator",
            Self::Administrator => "administrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An actor whose identity has been established by the (external)
/// authentication collaborator, together with their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The audit actor for this identity.
    pub actor: Actor,
    /// The role this actor holds.
    pub role: Role,
}

/// Builds an `AuthenticatedActor` from an externally verified identity.
///
/// Authentication (sessions, credentials) is out of scope for this
/// system; this stub is the seam where the real identity provider plugs
/// in.
///
/// # Arguments
///
/// * `actor_id` - The verified actor identifier
/// * `role` - The role string from the identity provider
///
/// # Errors
///
/// Returns an error if the role string is not recognised or the actor id
/// is empty.
pub fn authenticate_stub(actor_id: &str, role: &str) -> Result<AuthenticatedActor, ApiError> {
    if actor_id.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("actor_id"),
            message: String::from("Actor id cannot be empty"),
        });
    }

    let role: Role = Role::parse(role)?;
    Ok(AuthenticatedActor {
        actor: Actor::new(actor_id.to_string(), role.as_str().to_string()),
        role,
    })
}

/// Role checks for each class of ledger operation.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Authorizes a ledger mutation (configuration, generation, lock,
    /// line edits).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the actor is below `Operator`.
    pub fn authorize_mutation(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), ApiError> {
        if actor.role >= Role::Operator {
            return Ok(());
        }
        Err(ApiError::Unauthorized {
            action: action.to_string(),
            required_role: Role::Operator.as_str().to_string(),
        })
    }

    /// Authorizes unlocking a finalized invoice.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the actor is below
    /// `Administrator`.
    pub fn authorize_unlock(actor: &AuthenticatedActor, action: &str) -> Result<(), ApiError> {
        if actor.role >= Role::Administrator {
            return Ok(());
        }
        Err(ApiError::Unauthorized {
            action: action.to_string(),
            required_role: Role::Administrator.as_str().to_string(),
        })
    }
}
