// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the tour booking system.
//!
//! This crate stores departures, pricing rules, bookings and the booking
//! audit trail in `SQLite` through Diesel and an r2d2 connection pool.
//!
//! ## Write Discipline
//!
//! Every write runs in a `BEGIN IMMEDIATE` transaction, so writers are
//! serialized by the database and a transaction never upgrades a read lock
//! mid-flight. Inside the transaction:
//!
//! - Seats are taken and returned with conditional `UPDATE` statements; the
//!   matched row count decides the outcome.
//! - Status changes are compare-and-set on the current status.
//! - A partial unique index admits at most one active booking per user and
//!   departure.
//! - The audit event is written with the change it records.
//!
//! Any failure rolls the whole transaction back.
//!
//! ## Backends
//!
//! - In-memory databases are uniquely named per instance and use a single
//!   pooled connection; used by unit and integration tests.
//! - File databases run in WAL mode with a configurable pool size.
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) run against in-memory `SQLite`
//! - Multi-threaded tests use a temporary file database
//! - The heavy stress test is marked `#[ignore]` and run by
//!   `cargo xtask test-stress`

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

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use time::OffsetDateTime;
use tourbook::{AdmissionContext, AdmissionPlan, CoreError, TransitionOutcome};
use tourbook_audit::AuditEvent;
use tourbook_domain::{NewTour, PricingRule, Reservation, RulePayload, Tour};
use tracing::debug;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default pool size for file databases.
pub const DEFAULT_POOL_SIZE: u32 = 8;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

use backend::sqlite::SqlitePool;

type PooledSqlite = PooledConnection<ConnectionManager<SqliteConnection>>;

/// What a transition transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transitioned {
    /// The change landed; the booking as stored afterwards.
    Applied(Reservation),
    /// Nothing applied; the booking as read.
    Unchanged {
        /// The booking as read inside the transaction.
        current: Reservation,
        /// Why nothing happened.
        reason: &'static str,
    },
}

/// Persistence adapter for the booking store.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct Persistence {
    pool: SqlitePool,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_tourbook_{db_id}?mode=memory&cache=shared");

        let pool: SqlitePool = backend::sqlite::initialize_pool(&shared_memory_url, 1, false)?;
        Ok(Self { pool })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `pool_size` - Maximum number of pooled connections
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(
        path: P,
        pool_size: u32,
    ) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let pool: SqlitePool = backend::sqlite::initialize_pool(path_str, pool_size, true)?;
        Ok(Self { pool })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)
    }

    fn conn(&self) -> Result<PooledSqlite, PersistenceError> {
        Ok(self.pool.get()?)
    }

    /// Runs `work` in a `BEGIN IMMEDIATE` transaction; any error rolls back.
    fn write<T, F>(&self, work: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    {
        let mut conn: PooledSqlite = self.conn()?;
        conn.immediate_transaction(work)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Registers a departure with an empty seat counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_tour(&self, tour: &NewTour) -> Result<Tour, PersistenceError> {
        self.write(|conn| {
            let tour_id: i64 = mutations::insert_tour(conn, tour)?;
            queries::get_tour(conn, tour_id)
        })
    }

    /// Retrieves a departure by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::TourNotFound` if no such departure exists.
    pub fn get_tour(&self, tour_id: i64) -> Result<Tour, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::get_tour(&mut conn, tour_id)
    }

    /// Lists every departure.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tours(&self) -> Result<Vec<Tour>, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::list_tours(&mut conn)
    }

    /// Adds an active pricing rule to a departure.
    ///
    /// # Errors
    ///
    /// Returns an error if the departure does not exist or the insert fails.
    pub fn create_pricing_rule(
        &self,
        tour_id: i64,
        payload: &RulePayload,
    ) -> Result<PricingRule, PersistenceError> {
        self.write(|conn| mutations::insert_pricing_rule(conn, tour_id, payload))
    }

    /// Replaces a rule's payload, bumping its version.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule does not exist or the kind would change.
    pub fn update_pricing_rule_payload(
        &self,
        rule_id: i64,
        payload: &RulePayload,
    ) -> Result<PricingRule, PersistenceError> {
        self.write(|conn| mutations::update_pricing_rule_payload(conn, rule_id, payload))
    }

    /// Activates or deactivates a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule does not exist.
    pub fn set_pricing_rule_active(
        &self,
        rule_id: i64,
        active: bool,
    ) -> Result<PricingRule, PersistenceError> {
        self.write(|conn| mutations::set_pricing_rule_active(conn, rule_id, active))
    }

    /// Lists a departure's pricing rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pricing_rules(
        &self,
        tour_id: i64,
        active_only: bool,
    ) -> Result<Vec<PricingRule>, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::list_pricing_rules(&mut conn, tour_id, active_only)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Reads what admission needs: the departure, the user's active
    /// bookings and the departure's active rules.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::TourNotFound` if the departure does not exist.
    pub fn load_admission_context(
        &self,
        user_id: &str,
        tour_id: i64,
    ) -> Result<AdmissionContext, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        load_admission_context(&mut conn, user_id, tour_id)
    }

    /// Admits a booking.
    ///
    /// The admission context is read inside the write transaction and handed
    /// to `decide`, so the checks it makes cannot go stale before the write.
    /// A rejection from `decide` is returned as `PersistenceError::Rejected`.
    ///
    /// # Errors
    ///
    /// Returns the rejection, `PersistenceError::CapacityExceeded`,
    /// `PersistenceError::ActiveBookingExists`, or a database error. Nothing
    /// is written in any of these cases.
    pub fn admit<F>(
        &self,
        user_id: &str,
        tour_id: i64,
        decide: F,
    ) -> Result<Reservation, PersistenceError>
    where
        F: FnOnce(&AdmissionContext) -> Result<AdmissionPlan, CoreError>,
    {
        self.write(|conn| {
            let context: AdmissionContext = load_admission_context(conn, user_id, tour_id)?;
            let plan: AdmissionPlan = decide(&context)?;
            mutations::admit_reservation(conn, &plan)
        })
    }

    /// Runs a status transition on a booking.
    ///
    /// The booking is read inside the write transaction and handed to
    /// `decide`. An `Apply` outcome is written as a compare-and-set.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound`, the rejection from
    /// `decide` as `PersistenceError::Rejected`,
    /// `PersistenceError::StatusConflict`, or a database error.
    pub fn transition<F>(
        &self,
        booking_id: i64,
        decide: F,
    ) -> Result<Transitioned, PersistenceError>
    where
        F: FnOnce(&Reservation) -> Result<TransitionOutcome, CoreError>,
    {
        self.write(|conn| {
            let current: Reservation = queries::get_booking(conn, booking_id)?;
            match decide(&current)? {
                TransitionOutcome::Apply(plan) => {
                    mutations::apply_transition(conn, &plan).map(Transitioned::Applied)
                }
                TransitionOutcome::NoOp { current, reason } => {
                    debug!(booking_id, reason, "Transition left booking unchanged");
                    Ok(Transitioned::Unchanged {
                        current: *current,
                        reason,
                    })
                }
            }
        })
    }

    /// Retrieves a booking by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if no such booking exists.
    pub fn get_reservation(&self, booking_id: i64) -> Result<Reservation, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::get_booking(&mut conn, booking_id)
    }

    /// Lists a user's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reservations(&self, user_id: &str) -> Result<Vec<Reservation>, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::list_bookings_for_user(&mut conn, user_id)
    }

    /// Lists pending gateway bookings created at or before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_expiry_candidates(
        &self,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<i64>, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::list_expiry_candidates(&mut conn, cutoff)
    }

    /// Sums the guests of a departure's active bookings.
    ///
    /// Always equals the departure's seat counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn held_seats(&self, tour_id: i64) -> Result<u32, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::sum_held_seats(&mut conn, tour_id)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Retrieves the audit trail of a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_booking_events(
        &self,
        booking_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        let mut conn: PooledSqlite = self.conn()?;
        queries::list_booking_events(&mut conn, booking_id)
    }
}

fn load_admission_context(
    conn: &mut SqliteConnection,
    user_id: &str,
    tour_id: i64,
) -> Result<AdmissionContext, PersistenceError> {
    Ok(AdmissionContext {
        tour: queries::get_tour(conn, tour_id)?,
        active_bookings: queries::list_active_bookings_for_user(conn, user_id)?,
        rules: queries::list_pricing_rules(conn, tour_id, true)?,
    })
}
