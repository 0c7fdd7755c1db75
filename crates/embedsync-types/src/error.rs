use thiserror::Error;

/// Errors raised while resolving configuration. Always fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors from the relational store (used by the store port in embedsync-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors from the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("provider error: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("provider indices are not a permutation of 0..{expected}: {indices:?}")]
    IndexMismatch { expected: usize, indices: Vec<usize> },
}

impl EmbeddingError {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::RateLimited(_) | EmbeddingError::Transport(_) => true,
            EmbeddingError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors from packing or unpacking embedding blobs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("embedding dimensionality mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding vector is empty")]
    EmptyVector,

    #[error("blob length {0} is not a multiple of 4")]
    MisalignedBlob(usize),
}

/// Any failure that stops a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Pack(#[from] PackError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Missing("OPENAPI_API_KEY");
        assert_eq!(err.to_string(), "missing required setting OPENAPI_API_KEY");
    }

    #[test]
    fn test_pack_error_display() {
        let err = PackError::DimensionMismatch {
            expected: 1536,
            actual: 768,
        };
        assert!(err.to_string().contains("1536"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(EmbeddingError::RateLimited("slow down".into()).is_transient());
        assert!(
            EmbeddingError::Http {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !EmbeddingError::Http {
                status: 400,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!EmbeddingError::AuthenticationFailed.is_transient());
        assert!(!EmbeddingError::Deserialization("eof".into()).is_transient());
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: PipelineError = StoreError::Query("no such table: reviews".into()).into();
        assert_eq!(err.to_string(), "query error: no such table: reviews");
    }
}
