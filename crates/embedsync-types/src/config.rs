//! Pipeline configuration.
//!
//! `PipelineConfig` is resolved once at process start and then passed by
//! reference to every component of a run. Nothing in the workspace reads
//! the environment after that point.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_SOURCE_TABLE: &str = "reviews_yelp";
pub const DEFAULT_SOURCE_KEY_COLUMN: &str = "review_id";
pub const DEFAULT_SOURCE_TEXT_COLUMN: &str = "text";
pub const DEFAULT_DESTINATION_TABLE: &str = "reviews_yelp_embedding";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_BATCH_SIZE: usize = 2000;
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Source and destination table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Table holding the rows to embed.
    pub source_table: String,
    /// Unique key column of the source table (copied into the destination).
    pub source_key_column: String,
    /// Text column of the source table.
    pub source_text_column: String,
    /// Table receiving one row per embedded source key.
    pub destination_table: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            source_table: DEFAULT_SOURCE_TABLE.to_string(),
            source_key_column: DEFAULT_SOURCE_KEY_COLUMN.to_string(),
            source_text_column: DEFAULT_SOURCE_TEXT_COLUMN.to_string(),
            destination_table: DEFAULT_DESTINATION_TABLE.to_string(),
        }
    }
}

/// Where the relational store lives.
#[derive(Debug)]
pub enum DatabaseTarget {
    /// A complete connection URL (`mysql://...` or `sqlite://...`).
    Url(SecretString),
    /// Individual MySQL-protocol connection parameters.
    Parts {
        host: String,
        port: u16,
        username: String,
        password: SecretString,
        database: String,
    },
}

/// Relational store connection settings.
#[derive(Debug)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    /// Upper bound on establishing or acquiring a connection.
    pub connect_timeout: Duration,
}

/// Embedding provider settings.
///
/// The API key is a [`SecretString`] and never shows up in `Debug` output.
#[derive(Debug)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    /// Model identifier sent with every request and stored with every row.
    pub model: String,
    /// Full endpoint URL the batch is POSTed to.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries for transient failures (429, 5xx, timeouts). Zero disables retrying.
    pub max_retries: u32,
}

/// Sizing of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of source rows embedded by one run.
    pub limit: u64,
    /// Maximum number of rows per provider request.
    pub batch_size: usize,
    /// Presets the packing width instead of taking it from the first response.
    pub expected_dimensions: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
            expected_dimensions: None,
        }
    }
}

/// Complete, validated configuration for a run.
#[derive(Debug)]
pub struct PipelineConfig {
    pub tables: TableConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub batch: BatchConfig,
}

impl PipelineConfig {
    /// Check every required value and normalize the batch sizing.
    ///
    /// A batch size above the row limit is clamped to the limit.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.checked(true)
    }

    /// Same as [`validate`](Self::validate) without requiring the API key,
    /// for commands that only read the database.
    pub fn validate_for_status(self) -> Result<Self, ConfigError> {
        self.checked(false)
    }

    fn checked(mut self, needs_api_key: bool) -> Result<Self, ConfigError> {
        require("SOURCE_TABLE", &self.tables.source_table)?;
        require("SOURCE_TABLE_PK", &self.tables.source_key_column)?;
        require("SOURCE_TABLE_TEXT_COLUMN", &self.tables.source_text_column)?;
        require("DESTINATION_TABLE", &self.tables.destination_table)?;
        if self.tables.source_table == self.tables.destination_table {
            return Err(ConfigError::Invalid {
                name: "DESTINATION_TABLE",
                reason: "must differ from SOURCE_TABLE".to_string(),
            });
        }

        match &self.database.target {
            DatabaseTarget::Url(url) => require("DATABASE_URL", url.expose_secret())?,
            DatabaseTarget::Parts {
                host,
                username,
                password,
                database,
                ..
            } => {
                require("ENDPOINT", host)?;
                require("USERNAME", username)?;
                require("PASSWORD", password.expose_secret())?;
                require("DATABASE_NAME", database)?;
            }
        }

        if needs_api_key {
            require("OPENAPI_API_KEY", self.provider.api_key.expose_secret())?;
        }
        require("EMBEDDING_MODEL", &self.provider.model)?;
        require("URL", &self.provider.url)?;
        if !(self.provider.url.starts_with("http://") || self.provider.url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                name: "URL",
                reason: format!("'{}' is not an http(s) URL", self.provider.url),
            });
        }

        if self.batch.limit == 0 {
            return Err(ConfigError::Invalid {
                name: "LIMIT",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.batch.batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "BATCH_SIZE",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.batch.expected_dimensions == Some(0) {
            return Err(ConfigError::Invalid {
                name: "EMBEDDING_DIMENSIONS",
                reason: "must be greater than zero".to_string(),
            });
        }
        let limit = usize::try_from(self.batch.limit).unwrap_or(usize::MAX);
        self.batch.batch_size = self.batch.batch_size.min(limit);

        Ok(self)
    }
}

fn require(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Missing(name))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            tables: TableConfig::default(),
            database: DatabaseConfig {
                target: DatabaseTarget::Parts {
                    host: "svc-1234.svc.singlestore.com".to_string(),
                    port: DEFAULT_DB_PORT,
                    username: "admin".to_string(),
                    password: SecretString::from("hunter2"),
                    database: "reviews".to_string(),
                },
                connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            },
            provider: ProviderConfig {
                api_key: SecretString::from("sk-test"),
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                url: DEFAULT_EMBEDDING_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS),
                max_retries: 0,
            },
            batch: BatchConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_clamps_batch_size_to_limit() {
        let config = config().validate().unwrap();
        assert_eq!(config.batch.limit, 10);
        assert_eq!(config.batch.batch_size, 10);
    }

    #[test]
    fn test_batch_size_below_limit_is_kept() {
        let mut config = config();
        config.batch.limit = 5000;
        config.batch.batch_size = 100;
        let config = config.validate().unwrap();
        assert_eq!(config.batch.batch_size, 100);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut config = config();
        config.provider.api_key = SecretString::from("  ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPENAPI_API_KEY")));
    }

    #[test]
    fn test_status_validation_does_not_need_api_key() {
        let mut config = config();
        config.provider.api_key = SecretString::from("");
        let config = config.validate_for_status().unwrap();
        assert_eq!(config.batch.batch_size, 10);
    }

    #[test]
    fn test_status_validation_still_checks_database() {
        let mut config = config();
        if let DatabaseTarget::Parts { username, .. } = &mut config.database.target {
            username.clear();
        }
        let err = config.validate_for_status().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("USERNAME")));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let mut config = config();
        if let DatabaseTarget::Parts { host, .. } = &mut config.database.target {
            host.clear();
        }
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ENDPOINT")));
    }

    #[test]
    fn test_database_url_replaces_parts() {
        let mut config = config();
        config.database.target = DatabaseTarget::Url(SecretString::from("sqlite://test.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let mut config = config();
        config.batch.limit = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LIMIT", .. }));
    }

    #[test]
    fn test_same_source_and_destination_is_rejected() {
        let mut config = config();
        config.tables.destination_table = config.tables.source_table.clone();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "DESTINATION_TABLE",
                ..
            }
        ));
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let mut config = config();
        config.provider.url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "URL", .. }));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = config();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("sk-test"));
    }
}
