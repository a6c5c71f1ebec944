// src/pipeline/stats.rs

//! Database summary display.

use crate::config::Config;
use crate::error::Result;
use crate::storage::Database;
use crate::utils::current_season;

/// Print a summary of the stored data to stdout.
pub fn run_stats(config: &Config) -> Result<()> {
    let db = Database::open(&config.database.path)?;
    let season = current_season();

    let summary = db.summary()?;
    let drivers = db.drivers_ordered_by_points()?;
    let standings = db.standings(season)?;

    println!();
    println!("{}", "=".repeat(50));
    println!("DATABASE SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Drivers:          {}", summary.drivers);
    println!("Teams:            {}", summary.teams);
    println!("Races:            {}", summary.races);
    println!("Race results:     {}", summary.results);
    println!("Standings ({}): {} entries", season, summary.standings);

    if !drivers.is_empty() {
        println!();
        println!("Top 5 drivers by points:");
        for (i, driver) in drivers.iter().take(5).enumerate() {
            println!(
                "  {}. {} - {} points ({})",
                i + 1,
                driver.name,
                driver.points,
                driver.team
            );
        }
    }

    if !standings.is_empty() {
        println!();
        println!("Top 5 standings for {}:", season);
        for row in standings.iter().take(5) {
            println!(
                "  {}. {} - {} points ({})",
                row.entry.position, row.driver_name, row.entry.points, row.team_name
            );
        }
    }

    println!("{}", "=".repeat(50));
    println!();
    Ok(())
}
