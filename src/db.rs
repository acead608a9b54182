use std::fs;
use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, Transaction};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};
use crate::schema::{messages, rooms};
use crate::validation::InputValidator;

/// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
/// A connection checked out of the pool
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool size used by `Database::new`
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How long `Database::new` waits for a free pooled connection
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedded migrations, applied in order. `PRAGMA user_version` records how
/// many have run.
const MIGRATIONS: &[(&str, &str)] = &[(
    "2026-10-16-000000_create_rooms_and_messages",
    include_str!("../migrations/2026-10-16-000000_create_rooms_and_messages/up.sql"),
)];

/// Where a database lives, parsed from a `sqlite:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A file on disk
    File(String),
    /// A private in-memory database
    Memory,
}

impl DatabaseLocation {
    /// Parse `sqlite://path`, `sqlite:path`, a bare path or `:memory:`
    #[must_use]
    pub fn parse(database_url: &str) -> Self {
        let path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        if path == ":memory:" {
            Self::Memory
        } else {
            Self::File(path.to_string())
        }
    }
}

/// Database manager for handling connections and operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new(database_url: &str) -> Result<Self> {
        Self::with_pool_settings(database_url, DEFAULT_MAX_CONNECTIONS, DEFAULT_CONNECTION_TIMEOUT)
    }

    /// Create a pool holding at most `max_connections` connections, waiting
    /// up to `connection_timeout` for one to become free
    pub fn with_pool_settings(
        database_url: &str,
        max_connections: u32,
        connection_timeout: Duration,
    ) -> Result<Self> {
        let location = DatabaseLocation::parse(database_url);
        let (manager, max_size) = match &location {
            DatabaseLocation::File(path) => {
                // Create parent directory if it doesn't exist
                if let Some(parent) = Path::new(&path).parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                (SqliteConnectionManager::file(path), max_connections)
            }
            // Every in-memory connection is its own database, so the pool
            // must never open a second one
            DatabaseLocation::Memory => (SqliteConnectionManager::memory(), 1),
        };

        let manager = manager.with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let mut builder = Pool::builder()
            .max_size(max_size)
            .connection_timeout(connection_timeout);
        if location == DatabaseLocation::Memory {
            // Recycling the only connection would drop the whole database
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(manager)?;

        let mut conn = pool.get()?;
        Self::run_migrations(&mut conn)?;

        info!(database_url, max_size, "Database ready");
        Ok(Self { pool })
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    /// Run database migrations
    fn run_migrations(conn: &mut Connection) -> Result<()> {
        let applied: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let applied = usize::try_from(applied).unwrap_or_default();

        let tx = conn.transaction()?;
        for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(applied) {
            debug!(migration = name, "Applying migration");
            tx.execute_batch(sql)
                .map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
            let version = i64::try_from(index + 1).map_err(|e| StoreError::Migration(e.to_string()))?;
            tx.pragma_update(None, "user_version", version)?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Run `f` inside a transaction, committing only if it succeeds
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Number of migrations recorded as applied
    pub fn schema_version(&self) -> Result<usize> {
        let conn = self.get_connection()?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(usize::try_from(version).unwrap_or_default())
    }

    /// Row counts for both tables
    pub fn get_stats(&self) -> Result<StoreStats> {
        let conn = self.get_connection()?;

        let rooms: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", rooms::TABLE), params![], |row| {
            row.get(0)
        })?;
        let messages: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", messages::TABLE),
            params![],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            rooms: usize::try_from(rooms).unwrap_or_default(),
            messages: usize::try_from(messages).unwrap_or_default(),
        })
    }
}

/// Row counts across the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of rooms
    pub rooms: usize,
    /// Number of messages across all rooms
    pub messages: usize,
}

/// Initialize the database connection from configuration
pub fn establish_connection(config: &DatabaseConfig) -> Result<Database> {
    InputValidator::validate_database_url(&config.url)?;
    Database::with_pool_settings(
        &config.url,
        config.max_connections,
        Duration::from_secs(config.connection_timeout_secs),
    )
}
