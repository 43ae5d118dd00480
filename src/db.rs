//! Database connection helpers.
//!
//! Wraps the Diesel r2d2 pool for the SQLite file that stores players,
//! rounds and login sessions, and applies the embedded schema migrations.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};
use thiserror::Error;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("migration error: {0}")]
    Migration(String),
}

#[derive(Debug)]
/// Pragmas applied each time a connection is acquired from the pool.
pub struct ConnectionOptions {
    /// Enable Write Ahead Logging mode for SQLite.
    pub enable_wal: bool,
    /// Enforce foreign key checks for SQLite.
    pub enable_foreign_keys: bool,
    /// Timeout to wait for a locked database.
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_wal: true,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ConnectionOptions {
    fn pragmas(&self) -> String {
        let mut sql = String::new();
        if self.enable_wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        if self.enable_foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON;");
        }
        if let Some(timeout) = self.busy_timeout {
            sql.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let pragmas = self.pragmas();
        if pragmas.is_empty() {
            return Ok(());
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a Diesel connection pool for the given database URL.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

/// Retrieve a connection from the pool
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().inspect_err(|e| {
        error!("Failed to get connection from pool: {e}");
    })
}

/// Applies every pending migration and returns how many ran.
pub fn run_migrations(pool: &DbPool) -> Result<usize, DbError> {
    let mut conn = get_connection(pool)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;
    for version in &applied {
        info!("Applied migration {version}");
    }
    Ok(applied.len())
}

/// Opens the pool and brings the schema up to date.
pub fn connect_and_migrate(database_url: &str) -> Result<DbPool, DbError> {
    let pool = establish_connection_pool(database_url)?;
    run_migrations(&pool)?;
    Ok(pool)
}
