//! Observability setup for embedsync.

pub mod tracing_setup;
