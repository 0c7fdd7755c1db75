//! CLI definitions for the `embedsync` binary.
//!
//! Every pipeline setting is a flag with an environment-variable fallback,
//! so the binary runs unchanged from a scheduler that only sets env vars.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use embedsync_types::config::{
    BatchConfig, DEFAULT_BATCH_SIZE, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_PORT,
    DEFAULT_DESTINATION_TABLE, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_TIMEOUT_SECS,
    DEFAULT_EMBEDDING_URL, DEFAULT_LIMIT, DEFAULT_SOURCE_KEY_COLUMN, DEFAULT_SOURCE_TABLE,
    DEFAULT_SOURCE_TEXT_COLUMN, DatabaseConfig, DatabaseTarget, PipelineConfig, ProviderConfig,
    TableConfig,
};
use embedsync_types::error::ConfigError;

/// Keep a table of text rows and its embedding table in sync.
#[derive(Parser)]
#[command(name = "embedsync", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed every pending row, up to the configured limit.
    Run {
        /// Invocation event as JSON; its content is logged and otherwise ignored.
        #[arg(long)]
        event: Option<String>,
    },

    /// Show how many rows are pending and how many are embedded.
    ///
    /// Only the database settings are required.
    Status,
}

/// Pipeline settings. Flags override the environment.
#[derive(Args)]
pub struct ConfigArgs {
    /// Maximum number of rows embedded per run.
    #[arg(long, env = "LIMIT", default_value_t = DEFAULT_LIMIT, global = true)]
    pub limit: u64,

    /// Table holding the text rows.
    #[arg(long, env = "SOURCE_TABLE", default_value = DEFAULT_SOURCE_TABLE, global = true)]
    pub source_table: String,

    /// Unique key column of the source table.
    #[arg(long, env = "SOURCE_TABLE_PK", default_value = DEFAULT_SOURCE_KEY_COLUMN, global = true)]
    pub source_key_column: String,

    /// Text column of the source table.
    #[arg(
        long,
        env = "SOURCE_TABLE_TEXT_COLUMN",
        default_value = DEFAULT_SOURCE_TEXT_COLUMN,
        global = true
    )]
    pub source_text_column: String,

    /// Table receiving the embeddings (created if absent).
    #[arg(long, env = "DESTINATION_TABLE", default_value = DEFAULT_DESTINATION_TABLE, global = true)]
    pub destination_table: String,

    /// Complete connection URL; replaces the individual database settings.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Database host.
    #[arg(long, env = "ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Database port.
    #[arg(long, env = "CONNECTION_PORT", default_value_t = DEFAULT_DB_PORT, global = true)]
    pub port: u16,

    /// Database user.
    #[arg(long, env = "USERNAME", global = true)]
    pub username: Option<String>,

    /// Database password.
    #[arg(long, env = "PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Database (schema) name.
    #[arg(long, env = "DATABASE_NAME", global = true)]
    pub database_name: Option<String>,

    /// Seconds to wait for a database connection.
    #[arg(
        long,
        env = "DB_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        global = true
    )]
    pub db_connect_timeout_secs: u64,

    /// Embedding provider API key.
    #[arg(long, env = "OPENAPI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Embedding model identifier.
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL, global = true)]
    pub model: String,

    /// Embeddings endpoint URL.
    #[arg(long, env = "URL", default_value = DEFAULT_EMBEDDING_URL, global = true)]
    pub url: String,

    /// Maximum rows per provider request.
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE, global = true)]
    pub batch_size: usize,

    /// Seconds before a provider request times out.
    #[arg(
        long,
        env = "EMBEDDING_TIMEOUT_SECS",
        default_value_t = DEFAULT_EMBEDDING_TIMEOUT_SECS,
        global = true
    )]
    pub embedding_timeout_secs: u64,

    /// Retries for rate-limited, 5xx or timed-out requests (0 = fail fast).
    #[arg(long, env = "EMBEDDING_MAX_RETRIES", default_value_t = 0, global = true)]
    pub max_retries: u32,

    /// Expected embedding width; checked against every vector.
    #[arg(long, env = "EMBEDDING_DIMENSIONS", global = true)]
    pub dimensions: Option<usize>,
}

impl ConfigArgs {
    /// Build and validate the pipeline configuration for `command`.
    ///
    /// `status` never calls the provider, so it does not require the API key.
    pub fn into_config(self, command: &Commands) -> Result<PipelineConfig, ConfigError> {
        let config = self.build();
        match command {
            Commands::Run { .. } => config.validate(),
            Commands::Status => config.validate_for_status(),
        }
    }

    fn build(self) -> PipelineConfig {
        let target = match self.database_url {
            Some(url) if !url.trim().is_empty() => DatabaseTarget::Url(SecretString::from(url)),
            _ => DatabaseTarget::Parts {
                host: self.endpoint.unwrap_or_default(),
                port: self.port,
                username: self.username.unwrap_or_default(),
                password: SecretString::from(self.password.unwrap_or_default()),
                database: self.database_name.unwrap_or_default(),
            },
        };

        PipelineConfig {
            tables: TableConfig {
                source_table: self.source_table,
                source_key_column: self.source_key_column,
                source_text_column: self.source_text_column,
                destination_table: self.destination_table,
            },
            database: DatabaseConfig {
                target,
                connect_timeout: Duration::from_secs(self.db_connect_timeout_secs),
            },
            provider: ProviderConfig {
                api_key: SecretString::from(self.api_key.unwrap_or_default()),
                model: self.model,
                url: self.url,
                timeout: Duration::from_secs(self.embedding_timeout_secs),
                max_retries: self.max_retries,
            },
            batch: BatchConfig {
                limit: self.limit,
                batch_size: self.batch_size,
                expected_dimensions: self.dimensions,
            },
        }
    }
}

/// Default log filter for the verbosity flags; `RUST_LOG` takes precedence.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,embedsync=debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flags are passed explicitly so ambient env vars do not leak in;
    // required values that come only from the environment are covered by
    // the validation tests in embedsync-types.
    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["embedsync"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_with_explicit_settings() {
        let cli = parse(&[
            "--database-url",
            "sqlite:///tmp/reviews.db?mode=rwc",
            "--api-key",
            "sk-test",
            "--limit",
            "5",
            "--batch-size",
            "100",
            "run",
        ]);
        assert!(matches!(cli.command, Commands::Run { event: None }));

        let config = cli.config.into_config(&cli.command).unwrap();
        assert_eq!(config.batch.limit, 5);
        // clamped to the limit
        assert_eq!(config.batch.batch_size, 5);
        assert!(matches!(config.database.target, DatabaseTarget::Url(_)));
    }

    #[test]
    fn test_database_parts_are_used_without_url() {
        let cli = parse(&[
            "--endpoint",
            "db.internal",
            "--username",
            "admin",
            "--password",
            "secret",
            "--database-name",
            "reviews",
            "--api-key",
            "sk-test",
            "status",
        ]);
        let config = cli.config.into_config(&cli.command).unwrap();
        match config.database.target {
            DatabaseTarget::Parts { host, port, .. } => {
                assert_eq!(host, "db.internal");
                assert_eq!(port, 3306);
            }
            DatabaseTarget::Url(_) => panic!("expected individual parameters"),
        }
    }

    #[test]
    fn test_status_does_not_require_api_key() {
        let cli = parse(&["--database-url", "sqlite:///tmp/reviews.db", "status"]);
        let config = cli.config.into_config(&cli.command).unwrap();
        assert!(matches!(config.database.target, DatabaseTarget::Url(_)));
    }

    #[test]
    fn test_status_still_requires_a_database() {
        let cli = parse(&["--endpoint", "", "--database-url", "", "status"]);
        let err = cli.config.into_config(&cli.command).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ENDPOINT")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["run", "--json", "-vv", "--event", "{\"source\": \"cron\"}"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run { event } => assert_eq!(event.as_deref(), Some("{\"source\": \"cron\"}")),
            Commands::Status => panic!("expected run"),
        }
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let cli = parse(&[
            "--database-url",
            "sqlite:///tmp/reviews.db",
            "--api-key",
            "sk-test",
            "--limit",
            "0",
            "run",
        ]);
        let err = cli.config.into_config(&cli.command).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LIMIT", .. }));
    }

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0, true), "error");
        assert_eq!(verbosity_filter(0, false), "warn");
        assert_eq!(verbosity_filter(1, false), "info,embedsync=debug");
        assert_eq!(verbosity_filter(3, false), "trace");
    }
}
