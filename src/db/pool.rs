//! Connection pool handle.

use crate::config::PoolConfig;
use crate::error::OrmError;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Placeholder syntax of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Anonymous `?` markers.
    MySql,
    /// Numbered `?1`, `?2`, ... markers.
    Sqlite,
}

impl Dialect {
    /// Native marker for the `index`-th placeholder (1-based).
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Sqlite => format!("?{}", index),
        }
    }
}

/// A bounded pool of connections to the backing store.
///
/// Create one at startup and hand clones to the executor; clones share the same
/// connections. Call [`Pool::close`] during shutdown.
#[derive(Debug, Clone)]
pub enum Pool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl Pool {
    /// Create the MySQL pool described by `config`.
    ///
    /// # Errors
    /// Returns a configuration error for invalid pool bounds, or the connection error if the
    /// warm connections cannot be opened.
    pub async fn create(config: &PoolConfig) -> Result<Self, OrmError> {
        config.validate()?;
        info!(
            host = %config.host,
            port = config.port,
            db = %config.db,
            maxsize = config.maxsize,
            minsize = config.minsize,
            "Creating database connection pool..."
        );

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.db)
            .charset(&config.charset);

        let autocommit = config.autocommit;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.maxsize)
            .min_connections(config.minsize)
            .acquire_timeout(config.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if !autocommit {
                        sqlx::query("SET autocommit = 0")
                            .execute(&mut *conn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        info!("Database connection pool created");
        Ok(Pool::MySql(pool))
    }

    /// Open (creating if needed) a SQLite database file.
    ///
    /// Callers wait at most `acquire_timeout` for a connection once `maxsize` are checked out.
    pub async fn sqlite(
        db_path: &str,
        maxsize: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, OrmError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(maxsize)
            .acquire_timeout(acquire_timeout)
            .after_connect(|conn, _meta| Box::pin(async move { configure_sqlite_conn(conn).await }))
            .connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await?;

        info!(path = db_path, maxsize, "SQLite connection pool created");
        Ok(Pool::Sqlite(pool))
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Pool::MySql(_) => Dialect::MySql,
            Pool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Connections currently open, idle or in use.
    pub fn size(&self) -> u32 {
        match self {
            Pool::MySql(pool) => pool.size(),
            Pool::Sqlite(pool) => pool.size(),
        }
    }

    pub fn num_idle(&self) -> usize {
        match self {
            Pool::MySql(pool) => pool.num_idle(),
            Pool::Sqlite(pool) => pool.num_idle(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Pool::MySql(pool) => pool.is_closed(),
            Pool::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Close every connection, waiting for checked-out ones to be returned.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        match self {
            Pool::MySql(pool) => pool.close().await,
            Pool::Sqlite(pool) => pool.close().await,
        }
    }
}

async fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    Ok(())
}
