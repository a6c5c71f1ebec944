// src/pipeline/mod.rs

//! Pipeline entry points for scraper operations.
//!
//! - `run_all`: Scrape drivers, races, standings and results for a season
//! - `run_drivers`: Scrape drivers and the current standings only
//! - `run_races`: Scrape a season's races and results only
//! - `run_stats`: Print a database summary
//! - `run_cleanup`: Age-based retention sweep
//! - `run_schedule`: Periodic full scrapes

pub mod schedule;
pub mod scrape;
pub mod stats;

pub use schedule::run_schedule;
pub use scrape::{run_all, run_cleanup, run_drivers, run_races};
pub use stats::run_stats;
