// src/pipeline/scrape.rs

//! Scraping pipeline entry points.
//!
//! Each entry point opens its own database handle, runs sequentially, and
//! returns counts of processed records. Fetch failures degrade to zero
//! counts; persistence faults abort the batch.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::models::ScrapeTotals;
use crate::services::{DriverScraper, RaceScraper};
use crate::storage::Database;
use crate::utils::current_season;

/// Scrape every entity type for a season.
pub async fn run_all(config: &Config, season: Option<i32>) -> Result<ScrapeTotals> {
    let season = season.unwrap_or_else(current_season);
    log::info!("Starting full scrape for season {}", season);

    let config = Arc::new(config.clone());
    let db = Database::open(&config.database.path)?;
    let driver_scraper = DriverScraper::new(Arc::clone(&config))?;
    let race_scraper = RaceScraper::new(Arc::clone(&config))?;

    let mut totals = ScrapeTotals::default();
    totals.drivers = driver_scraper.scrape_all(&db).await?.len();
    totals.races = race_scraper.scrape_season(&db, season).await?.len();
    totals.standings = driver_scraper.scrape_standings(&db, season).await?.len();
    totals.results = race_scraper.scrape_results(&db, season).await?.len();
    totals.teams = db.summary()?.teams;

    log::info!(
        "Full scrape complete: {} drivers, {} races, {} standings entries, {} results",
        totals.drivers,
        totals.races,
        totals.standings,
        totals.results
    );
    Ok(totals)
}

/// Scrape drivers and the current season's standings only.
pub async fn run_drivers(config: &Config) -> Result<ScrapeTotals> {
    let season = current_season();
    log::info!("Starting driver scrape");

    let config = Arc::new(config.clone());
    let db = Database::open(&config.database.path)?;
    let driver_scraper = DriverScraper::new(Arc::clone(&config))?;

    let mut totals = ScrapeTotals::default();
    totals.drivers = driver_scraper.scrape_all(&db).await?.len();
    totals.standings = driver_scraper.scrape_standings(&db, season).await?.len();
    totals.teams = db.summary()?.teams;

    log::info!(
        "Driver scrape complete: {} drivers, {} standings entries",
        totals.drivers,
        totals.standings
    );
    Ok(totals)
}

/// Scrape a season's races and their results only.
pub async fn run_races(config: &Config, season: Option<i32>) -> Result<ScrapeTotals> {
    let season = season.unwrap_or_else(current_season);
    log::info!("Starting race scrape for season {}", season);

    let config = Arc::new(config.clone());
    let db = Database::open(&config.database.path)?;
    let race_scraper = RaceScraper::new(Arc::clone(&config))?;

    let mut totals = ScrapeTotals::default();
    totals.races = race_scraper.scrape_season(&db, season).await?.len();
    totals.results = race_scraper.scrape_results(&db, season).await?.len();

    log::info!(
        "Race scrape complete: {} races, {} results",
        totals.races,
        totals.results
    );
    Ok(totals)
}

/// Delete rows older than the configured retention threshold.
pub fn run_cleanup(config: &Config) -> Result<usize> {
    let db = Database::open(&config.database.path)?;
    let deleted = db.cleanup_older_than(config.database.retention_days)?;
    log::info!(
        "Retention sweep removed {} rows older than {} days",
        deleted,
        config.database.retention_days
    );
    Ok(deleted)
}
