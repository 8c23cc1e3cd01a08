// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Care Ledger System.
//!
//! This crate provides database persistence for rate configuration,
//! visits, invoices with their ledgers, and audit events. It is built on
//! Diesel over `SQLite` with embedded migrations; the bundled
//! `libsqlite3` means no external infrastructure is required.
//!
//! ## Write discipline
//!
//! Invoices carry an optimistic version. Every transition write runs in
//! a single transaction that checks the version, replaces the ledger
//! wholesale, updates the header, and records the audit event; a version
//! mismatch rolls everything back with `ConcurrentModification`. No
//! partially-regenerated ledger is ever observable.
//!
//! ## Testing
//!
//! Standard tests run against unique in-memory `SQLite` databases; each
//! adapter created by `new_in_memory()` receives its own database via an
//! atomic counter, ensuring deterministic isolation without time-based
//! collisions.

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

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use care_ledger::{BootstrapResult, Invoice, TransitionResult};
use care_ledger_audit::AuditEvent;
use care_ledger_domain::{BillingPeriod, RateBlock, Visit};

mod convert;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::{PersistBootstrapResult, PersistTransitionResult};
pub use queries::AuditEventRecord;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias kept for call sites that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter for the care ledger.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based
    /// collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Create a unique shared in-memory database name per call so tests are isolated.
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// This is a startup-time check required to ensure referential
    /// integrity constraints are enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Rate configuration
    // ========================================================================

    /// Persists a rate block and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn save_rate_block(&mut self, block: &RateBlock) -> Result<i64, PersistenceError> {
        mutations::save_rate_block(&mut self.conn, block)
    }

    /// Loads the full rate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored row cannot be reconstructed.
    pub fn list_rate_blocks(&mut self) -> Result<Vec<RateBlock>, PersistenceError> {
        queries::list_rate_blocks(&mut self.conn)
    }

    // ========================================================================
    // Visits
    // ========================================================================

    /// Persists a visit record and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn save_visit(&mut self, visit: &Visit) -> Result<i64, PersistenceError> {
        mutations::save_visit(&mut self.conn, visit)
    }

    /// Loads the visits delivered to a client within a billing period
    /// (inclusive on both ends).
    ///
    /// # Errors
    ///
    /// Returns an error if a stored row cannot be reconstructed.
    pub fn list_visits(
        &mut self,
        client_id: i64,
        period: BillingPeriod,
    ) -> Result<Vec<Visit>, PersistenceError> {
        queries::list_visits(&mut self.conn, client_id, period)
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Persists a new invoice header and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_invoice(&mut self, invoice: &Invoice) -> Result<i64, PersistenceError> {
        mutations::create_invoice(&mut self.conn, invoice)
    }

    /// Loads an invoice with its full ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not exist or a stored row
    /// cannot be reconstructed.
    pub fn load_invoice(&mut self, invoice_id: i64) -> Result<Invoice, PersistenceError> {
        queries::load_invoice(&mut self.conn, invoice_id)
    }

    /// Loads all invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored row cannot be reconstructed.
    pub fn list_invoices(&mut self) -> Result<Vec<Invoice>, PersistenceError> {
        queries::list_invoices(&mut self.conn)
    }

    // ========================================================================
    // Transitions & bootstrap
    // ========================================================================

    /// Persists a transition result atomically under the optimistic
    /// version check.
    ///
    /// # Arguments
    ///
    /// * `result` - The transition result to persist
    /// * `expected_version` - The version the transition was computed
    ///   against
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` if another writer got there
    /// first; nothing is applied in that case.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
        expected_version: i64,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result, expected_version)
    }

    /// Persists a bootstrap result (rate block or invoice creation).
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_bootstrap(
        &mut self,
        result: &BootstrapResult,
    ) -> Result<PersistBootstrapResult, PersistenceError> {
        mutations::persist_bootstrap(&mut self.conn, result)
    }

    // ========================================================================
    // Audit events
    // ========================================================================

    /// Persists an audit event on its own, outside a transition.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::persist_audit_event(&mut self.conn, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be
    /// deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the audit timeline for an invoice, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored event cannot be deserialized.
    pub fn list_audit_events(
        &mut self,
        invoice_id: i64,
    ) -> Result<Vec<AuditEventRecord>, PersistenceError> {
        queries::list_audit_events_for_invoice(&mut self.conn, invoice_id)
    }
}
