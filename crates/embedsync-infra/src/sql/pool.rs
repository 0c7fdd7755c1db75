//! Database pool with split reader/writer connections.
//!
//! The pending-row query streams from the `reader` connection while batches
//! are inserted through the `writer` connection, so each pool holds exactly
//! one connection. SQLite databases are switched to WAL journal mode so the
//! writer can commit while the reader's statement is still open.

use std::time::Duration;

use reqwest::Url;
use secrecy::ExposeSecret;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use embedsync_types::config::{DatabaseConfig, DatabaseTarget};
use embedsync_types::error::StoreError;

/// Split read/write pool.
///
/// - `reader`: single connection for the pending-row stream and counts.
/// - `writer`: single connection for DDL and inserts.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: AnyPool,
    pub writer: AnyPool,
}

impl DatabasePool {
    /// Connect both pools using the resolved database settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = database_url(config)?;
        Self::connect_url(&url, config.connect_timeout).await
    }

    /// Connect both pools to `url` (`mysql://...` or `sqlite://...`).
    ///
    /// `sqlite::memory:` is not usable here: the two connections would see
    /// two different databases.
    pub async fn connect_url(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();

        // Open the writer first so `mode=rwc` creates a SQLite file before the reader attaches
        let writer = open_single(url, timeout).await?;
        if is_sqlite(url) {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&writer)
                .await
                .map_err(|e| StoreError::Connection(format!("failed to enable WAL: {e}")))?;
        }
        let reader = open_single(url, timeout).await?;

        tracing::debug!(backend = backend_name(url), "database pools connected");
        Ok(Self { reader, writer })
    }

    /// Close both pools, waiting for in-flight statements.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

async fn open_single(url: &str, timeout: Duration) -> Result<AnyPool, StoreError> {
    AnyPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(timeout)
        .connect(url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// Build the connection URL from the configured target.
///
/// Individual parameters become a `mysql://` URL with the username and
/// password percent-encoded. The result may carry a password; never log it.
pub fn database_url(config: &DatabaseConfig) -> Result<String, StoreError> {
    match &config.target {
        DatabaseTarget::Url(url) => Ok(url.expose_secret().to_string()),
        DatabaseTarget::Parts {
            host,
            port,
            username,
            password,
            database,
        } => {
            let mut url = Url::parse(&format!("mysql://{host}:{port}/"))
                .map_err(|e| StoreError::Connection(format!("invalid ENDPOINT '{host}': {e}")))?;
            url.set_username(username)
                .map_err(|()| StoreError::Connection("USERNAME cannot be set on URL".to_string()))?;
            url.set_password(Some(password.expose_secret()))
                .map_err(|()| StoreError::Connection("PASSWORD cannot be set on URL".to_string()))?;
            url.set_path(database);
            Ok(url.to_string())
        }
    }
}

fn is_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:")
}

fn backend_name(url: &str) -> &'static str {
    if is_sqlite(url) { "sqlite" } else { "mysql" }
}
