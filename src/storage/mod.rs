// src/storage/mod.rs

//! Persistence layer.
//!
//! Entities are upserted by natural key into SQLite; re-running a scrape
//! overwrites rather than duplicates. The connection is opened per logical
//! operation and released when the [`Database`] handle is dropped.

mod sqlite;

pub use sqlite::{Database, DatabaseSummary, StandingsRow};
