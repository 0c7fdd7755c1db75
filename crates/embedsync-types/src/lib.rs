//! Shared domain types for embedsync.
//!
//! Configuration, source/destination rows, provider results, run reports and
//! the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, chrono, secrecy, thiserror.

pub mod config;
pub mod embedding;
pub mod error;
pub mod row;
pub mod run;
