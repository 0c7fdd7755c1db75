//! SQL persistence over `sqlx`'s `Any` driver (MySQL-protocol servers and SQLite).

pub mod pool;
pub mod statements;
pub mod store;
