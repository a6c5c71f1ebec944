// src/main.rs

//! paddock: Racing Championship Scraper CLI
//!
//! Scrapes championship pages (drivers, teams, races, results, standings)
//! into a local SQLite database.

use clap::{Parser, Subcommand};
use env_logger::Env;

use paddock::config::Config;
use paddock::error::Result;
use paddock::pipeline::{run_all, run_cleanup, run_drivers, run_races, run_schedule, run_stats};

#[derive(Parser, Debug)]
#[command(
    name = "paddock",
    version = "0.1.0",
    about = "Racing championship scraper"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape all entity types for a season
    All {
        /// Season to scrape (default: current)
        #[arg(long)]
        season: Option<i32>,
    },
    /// Scrape drivers and the current standings only
    Drivers,
    /// Scrape a season's races and results only
    Races {
        /// Season to scrape (default: current)
        #[arg(long)]
        season: Option<i32>,
    },
    /// Show database statistics
    Stats,
    /// Delete rows older than the retention threshold
    Cleanup,
    /// Run a full scrape periodically
    Schedule {
        /// Interval between scrapes in hours
        #[arg(long, default_value_t = 6)]
        interval: u64,
    },
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let mut config = Config::load_or_default(&cli.config);
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        config.database.path = path;
    }
    config.validate()?;

    match cli.command {
        Command::All { season } => {
            let totals = run_all(&config, season).await?;
            println!(
                "Processed {} drivers, {} races, {} standings entries, {} results",
                totals.drivers, totals.races, totals.standings, totals.results
            );
            run_stats(&config)?;
        }
        Command::Drivers => {
            let totals = run_drivers(&config).await?;
            println!(
                "Processed {} drivers, {} standings entries",
                totals.drivers, totals.standings
            );
            run_stats(&config)?;
        }
        Command::Races { season } => {
            let totals = run_races(&config, season).await?;
            println!(
                "Processed {} races, {} results",
                totals.races, totals.results
            );
            run_stats(&config)?;
        }
        Command::Stats => run_stats(&config)?,
        Command::Cleanup => {
            let deleted = run_cleanup(&config)?;
            println!("Removed {deleted} rows");
        }
        Command::Schedule { interval } => run_schedule(&config, interval).await?,
    }

    Ok(())
}
