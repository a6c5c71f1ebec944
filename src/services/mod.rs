// src/services/mod.rs

//! Service layer for the scraper application.
//!
//! One builder per entity family:
//! - Drivers and championship standings (`DriverScraper`)
//! - Races and race results (`RaceScraper`)

mod drivers;
mod races;

pub use drivers::DriverScraper;
pub use races::RaceScraper;
