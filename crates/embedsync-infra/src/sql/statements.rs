//! SQL text for one source/destination table pair.
//!
//! Identifiers are backtick-quoted, which both MySQL and SQLite accept, and
//! all statements use `?` placeholders.

use embedsync_types::config::TableConfig;

/// Destination columns after the key column, in insert order.
pub const DESTINATION_COLUMNS: [&str; 5] = [
    "embedding",
    "batch_index",
    "usage_tokens_batch",
    "timestamp",
    "model",
];

/// Statements rendered once per run from the configured table names.
#[derive(Debug, Clone)]
pub struct Statements {
    pub create_destination: String,
    pub select_pending: String,
    pub count_pending: String,
    pub count_embedded: String,
    /// `INSERT INTO ... (...) ` prefix; the `VALUES` list is appended per batch.
    pub insert_prefix: String,
}

impl Statements {
    pub fn new(tables: &TableConfig) -> Self {
        let source = quote_ident(&tables.source_table);
        let destination = quote_ident(&tables.destination_table);
        let key = quote_ident(&tables.source_key_column);
        let text = quote_ident(&tables.source_text_column);

        let create_destination = format!(
            "CREATE TABLE IF NOT EXISTS {destination} (\
             {key} text, \
             `embedding` blob, \
             `batch_index` int, \
             `usage_tokens_batch` int, \
             `timestamp` datetime, \
             `model` text)"
        );

        let pending_filter = format!(
            "FROM {source} AS s \
             WHERE s.{text} IS NOT NULL \
             AND NOT EXISTS (SELECT 1 FROM {destination} AS d WHERE d.{key} = s.{key})"
        );
        let select_pending = format!("SELECT s.{key}, s.{text} {pending_filter} LIMIT ?");
        let count_pending = format!("SELECT COUNT(*) {pending_filter}");
        let count_embedded = format!("SELECT COUNT(*) FROM {destination}");

        let columns: Vec<String> = std::iter::once(key.clone())
            .chain(DESTINATION_COLUMNS.iter().map(|c| quote_ident(c)))
            .collect();
        let insert_prefix = format!("INSERT INTO {destination} ({}) ", columns.join(", "));

        Self {
            create_destination,
            select_pending,
            count_pending,
            count_embedded,
            insert_prefix,
        }
    }
}

/// Quotes an identifier with backticks, doubling embedded backticks.
pub fn quote_ident(input: &str) -> String {
    format!("`{}`", input.replace('`', "``"))
}
