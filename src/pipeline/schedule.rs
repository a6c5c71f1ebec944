// src/pipeline/schedule.rs

//! Periodic scraping loop.

use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::scrape::{run_all, run_cleanup};

/// Run a full scrape every `interval_hours`, forever.
///
/// A failed iteration is logged and the loop continues; each upsert is an
/// independent unit of work, so an interrupt between iterations leaves the
/// store consistent. The retention sweep runs after every iteration.
pub async fn run_schedule(config: &Config, interval_hours: u64) -> Result<()> {
    let interval = Duration::from_secs(interval_hours.max(1) * 3600);
    log::info!("Scheduled scraping every {} hours", interval_hours.max(1));

    loop {
        if let Err(error) = run_all(config, None).await {
            log::error!("Scheduled scrape failed: {}", error);
        }
        if let Err(error) = run_cleanup(config) {
            log::error!("Retention sweep failed: {}", error);
        }

        log::info!("Next scrape in {} hours", interval_hours.max(1));
        tokio::time::sleep(interval).await;
    }
}
