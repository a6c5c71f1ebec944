// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! Each entity is a flat record keyed by a natural key; surrogate ids are
//! assigned by the persistence layer and remain `None` until stored.

mod driver;
mod race;
mod standings;
mod team;

// Re-export all public types
pub use driver::Driver;
pub use race::{Race, RaceResult};
pub use standings::StandingsEntry;
pub use team::Team;

/// Counts of records processed by a scraping run, for display/logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapeTotals {
    pub drivers: usize,
    pub teams: usize,
    pub races: usize,
    pub results: usize,
    pub standings: usize,
}
