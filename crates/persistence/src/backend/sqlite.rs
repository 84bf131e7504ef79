// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! This module is limited to:
//! - Connection pool construction
//! - Per-connection configuration (PRAGMA statements)
//! - Migration execution
//! - SQLite-specific workarounds (e.g., `last_insert_rowid()`)
//!
//! All domain queries and mutations live in `queries/` or `mutations/`.

use std::time::Duration;

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{Builder, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sql_types::{BigInt, Integer};
use diesel::{RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::PersistenceError;

/// Embedded `SQLite` migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Pool of `SQLite` connections.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Helper row struct for PRAGMA queries.
///
/// This is a justified use of raw SQL as Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Per-connection settings applied when the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    enable_wal: bool,
    busy_timeout: Duration,
}

impl ConnectionOptions {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    fn apply(&self, conn: &mut SqliteConnection) -> QueryResult<()> {
        diesel::sql_query(format!(
            "PRAGMA busy_timeout = {}",
            self.busy_timeout.as_millis()
        ))
        .execute(conn)?;
        if self.enable_wal {
            diesel::sql_query("PRAGMA journal_mode = WAL").execute(conn)?;
            diesel::sql_query("PRAGMA synchronous = NORMAL").execute(conn)?;
        }
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(conn)?;
        Ok(())
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        self.apply(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Helper function to get the last inserted row ID.
///
/// This is a justified use of raw SQL as Diesel has no direct API for this.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Verifies that foreign key enforcement is enabled.
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running SQLite database migrations");
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Builds a connection pool for `database_url`, runs migrations and checks
/// that foreign keys are enforced.
///
/// File databases run in WAL mode so readers do not block the single writer.
/// In-memory databases keep their connections forever; the database
/// disappears when its last connection closes.
///
/// # Errors
///
/// Returns an error if the pool cannot be built or the schema cannot be
/// brought up to date.
pub fn initialize_pool(
    database_url: &str,
    pool_size: u32,
    file_backed: bool,
) -> Result<SqlitePool, PersistenceError> {
    info!(database_url, pool_size, "Initializing SQLite connection pool");

    let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(database_url);
    let options: ConnectionOptions = ConnectionOptions {
        enable_wal: file_backed,
        busy_timeout: Duration::from_millis(BUSY_TIMEOUT_MS),
    };

    let mut builder: Builder<ConnectionManager<SqliteConnection>> = Pool::builder()
        .max_size(pool_size.max(1))
        .connection_customizer(Box::new(options));
    if !file_backed {
        builder = builder.idle_timeout(None).max_lifetime(None);
    }
    let pool: SqlitePool = builder
        .build(manager)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    let mut conn: PooledConnection<ConnectionManager<SqliteConnection>> = pool.get()?;
    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    verify_foreign_key_enforcement(&mut conn)?;

    Ok(pool)
}
