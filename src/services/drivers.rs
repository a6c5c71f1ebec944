// src/services/drivers.rs

//! Driver and standings scraper service.
//!
//! Builds [`Driver`] records from listing cards (following each card's
//! detail link for nationality, date of birth and career statistics) and
//! [`StandingsEntry`] rows from the season standings table. Locator chains
//! are declarative data so fallback behavior stays testable against
//! fixtures rather than one markup snapshot.

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::{
    self, element_text, labeled_value, parse_date, parse_number, parse_points, AttrLocator,
    Locator,
};
use crate::models::{Driver, StandingsEntry};
use crate::storage::Database;
use crate::utils::http::{DocumentSource, Fetcher};
use crate::utils::resolve_url;

/// Name: a heading shaped like two capitalized words, else an element
/// classed as name/driver.
const NAME_CHAIN: &[Locator] = &[
    Locator::Heading(r"[A-Z][a-z]+\s+[A-Z][a-z]+"),
    Locator::ClassFragment {
        tags: &["span", "div", "p"],
        pattern: "name|driver",
    },
];

const NUMBER_CHAIN: &[Locator] = &[
    Locator::ClassFragment {
        tags: &["span", "div"],
        pattern: "number",
    },
    Locator::TextPattern(r"#\d{1,2}\b"),
];

const TEAM_CHAIN: &[Locator] = &[Locator::ClassFragment {
    tags: &["span", "div"],
    pattern: "team|constructor",
}];

const DETAIL_LINK: &[AttrLocator] = &[AttrLocator {
    selector: "a",
    attr: "href",
}];

/// Driver cards on the listing page; anchors into driver pages as the
/// fallback shape.
const CARD_CLASS_PATTERN: &str = "driver.*card|listing.*item";
const CARD_HREF_PATTERN: &str = "/drivers/";

/// Standings table, else a div-based rendition of it.
const STANDINGS_CLASS_PATTERN: &str = "standings|results";

/// A standings row needs at least position, driver and points cells.
const MIN_STANDINGS_CELLS: usize = 3;

/// Scraper for driver entities and the driver championship standings.
///
/// Generic over its document source, so a rendered-HTML collaborator
/// (or a test fixture) can stand in for live HTTP.
pub struct DriverScraper<S = Fetcher> {
    config: Arc<Config>,
    source: S,
}

impl DriverScraper {
    /// Create a driver scraper backed by an HTTP fetcher.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let source = Fetcher::new(&config.scraper)?;
        Ok(Self { config, source })
    }
}

impl<S: DocumentSource> DriverScraper<S> {
    /// Create a driver scraper over an arbitrary document source.
    pub fn with_source(config: Arc<Config>, source: S) -> Self {
        Self { config, source }
    }

    /// Scrape the driver listing, upserting every driver that yields a
    /// name. Returns the persisted records.
    ///
    /// A fault while building one card is logged and that card skipped;
    /// persistence faults abort the batch.
    pub async fn scrape_all(&self, db: &Database) -> Result<Vec<Driver>> {
        let url = self.config.scraper.drivers_url();
        let document = match self.source.fetch(&url).await {
            Ok(document) => document,
            Err(error) => {
                log::error!("Failed to load driver listing: {}", error);
                return Ok(Vec::new());
            }
        };
        let base_url = Url::parse(&url)?;
        let root = document.root_element();

        let mut cards = extract::select_by_class(root, &["div"], CARD_CLASS_PATTERN);
        if cards.is_empty() {
            cards = extract::select_by_href(root, CARD_HREF_PATTERN);
        }
        log::info!("Found {} driver cards", cards.len());

        let mut drivers = Vec::new();
        for card in cards {
            let driver = match self.build_driver(card, &base_url).await {
                Ok(Some(driver)) => driver,
                Ok(None) => continue,
                Err(error) => {
                    log::warn!("Skipping driver card: {}", error);
                    continue;
                }
            };

            let id = db.upsert_driver(&driver)?;
            if !driver.team.is_empty() {
                db.ensure_team(&driver.team)?;
            }
            log::info!("Saved driver {} (id {})", driver.name, id);
            drivers.push(Driver {
                id: Some(id),
                ..driver
            });
        }
        Ok(drivers)
    }

    /// Basic record from the card, enriched from the detail page when the
    /// card links to one. Cards without a name-shaped match are dropped.
    async fn build_driver(
        &self,
        card: ElementRef<'_>,
        base_url: &Url,
    ) -> Result<Option<Driver>> {
        let Some(name) = extract::first_text(card, NAME_CHAIN) else {
            return Ok(None);
        };

        let mut driver = Driver {
            name,
            number: extract::first_text(card, NUMBER_CHAIN)
                .as_deref()
                .and_then(parse_number),
            team: extract::extract_text(card, TEAM_CHAIN, ""),
            ..Driver::default()
        };

        if let Some(href) = extract::first_attr(card, DETAIL_LINK) {
            let detail_url = resolve_url(base_url, &href);
            match self.source.fetch(&detail_url).await {
                Ok(detail) => self.enrich_from_detail(&detail, &mut driver),
                Err(error) => {
                    // Keep the basic record; detail enrichment is best-effort.
                    log::warn!("Detail fetch failed for {}: {}", driver.name, error);
                }
            }
        }

        Ok(Some(driver))
    }

    /// Pull nationality, date of birth and career statistics from a driver
    /// detail page. Statistics are scoped to a stats block when one
    /// exists, falling back to whole-document search.
    fn enrich_from_detail(&self, document: &Html, driver: &mut Driver) {
        let root = document.root_element();

        if let Some(nationality) = labeled_value(root, r"Nationality|Country") {
            driver.nationality = nationality;
        }

        if let Some(born) = extract::first_text(root, &[Locator::TextPattern(r"Date of birth|Born")])
        {
            driver.date_of_birth = parse_date(&born);
        }

        let stats_scope = extract::select_by_class(root, &["div", "section"], "stats|statistics")
            .first()
            .copied()
            .unwrap_or(root);

        let stat = |label| labeled_value(stats_scope, label).as_deref().and_then(parse_number);
        driver.wins = stat(r"Wins?").unwrap_or(0);
        driver.podiums = stat(r"Podiums?").unwrap_or(0);
        driver.championships = stat(r"Championships?|World titles?").unwrap_or(0);
        driver.points = labeled_value(stats_scope, r"Points?")
            .map(|text| parse_points(&text))
            .unwrap_or(0);
    }

    /// Scrape the driver standings for a season, persisting every row
    /// whose driver and team names resolve to existing database rows.
    pub async fn scrape_standings(
        &self,
        db: &Database,
        season: i32,
    ) -> Result<Vec<StandingsEntry>> {
        let url = self.config.scraper.standings_url(season);
        let document = match self.source.fetch(&url).await {
            Ok(document) => document,
            Err(error) => {
                log::error!("Failed to load standings for {}: {}", season, error);
                return Ok(Vec::new());
            }
        };

        let root = document.root_element();
        let table = extract::select_by_class(root, &["table"], STANDINGS_CLASS_PATTERN)
            .first()
            .copied()
            .or_else(|| {
                extract::select_by_class(root, &["div"], STANDINGS_CLASS_PATTERN)
                    .first()
                    .copied()
            });
        let Some(table) = table else {
            log::warn!("No standings table found for season {}", season);
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for row in table_rows(table)?.into_iter().skip(1) {
            match self.build_standings_entry(db, season, row) {
                Ok(Some(entry)) => {
                    db.upsert_standing(&entry)?;
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(error) => {
                    log::warn!("Skipping standings row: {}", error);
                }
            }
        }
        log::info!("Saved {} standings entries for {}", entries.len(), season);
        Ok(entries)
    }

    /// One standings row. Rows with too few cells or unresolved
    /// driver/team references yield `None`.
    fn build_standings_entry(
        &self,
        db: &Database,
        season: i32,
        row: ElementRef<'_>,
    ) -> Result<Option<StandingsEntry>> {
        let cells = row_cells(row)?;
        if cells.len() < MIN_STANDINGS_CELLS {
            return Ok(None);
        }

        let position = parse_number(&element_text(cells[0])).unwrap_or(0);
        let driver_name = element_text(cells[1]);
        let points = parse_points(&element_text(cells[cells.len() - 1]));

        let Some(driver) = db.driver_by_name(&driver_name)? else {
            log::debug!("Standings row references unknown driver {:?}", driver_name);
            return Ok(None);
        };
        let Some(driver_id) = driver.id else {
            return Ok(None);
        };

        // Team column when the table carries one, else the driver's
        // current team as scraped from the listing.
        let team_name = if cells.len() >= 4 {
            element_text(cells[2])
        } else {
            driver.team.clone()
        };
        let Some(team) = db.team_by_name(&team_name)? else {
            log::debug!("Standings row references unknown team {:?}", team_name);
            return Ok(None);
        };
        let Some(team_id) = team.id else {
            return Ok(None);
        };

        let wins = if cells.len() >= 5 {
            parse_number(&element_text(cells[cells.len() - 2])).unwrap_or(0)
        } else {
            0
        };

        Ok(Some(StandingsEntry {
            id: None,
            season,
            driver_id,
            team_id,
            position,
            points,
            wins,
        }))
    }
}

/// `tr` elements within a table-like scope.
pub(crate) fn table_rows(scope: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>> {
    let selector =
        Selector::parse("tr").map_err(|e| AppError::selector("tr", format!("{e:?}")))?;
    Ok(scope.select(&selector).collect())
}

/// `td`/`th` cells of a row.
pub(crate) fn row_cells(row: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>> {
    let selector =
        Selector::parse("td, th").map_err(|e| AppError::selector("td, th", format!("{e:?}")))?;
    Ok(row.select(&selector).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;

    fn scraper() -> DriverScraper {
        DriverScraper::new(Arc::new(Config::default())).unwrap()
    }

    fn db_with_driver_and_team() -> Database {
        let db = Database::open(":memory:").unwrap();
        db.upsert_driver(&Driver {
            name: "Max Driver".to_string(),
            nationality: "Dutch".to_string(),
            team: "Red Team".to_string(),
            ..Driver::default()
        })
        .unwrap();
        db.upsert_team(&Team {
            name: "Red Team".to_string(),
            ..Team::default()
        })
        .unwrap();
        db
    }

    #[test]
    fn enrich_from_detail_reads_stats_block() {
        let html = Html::parse_document(
            r#"<html><body>
                <p>Nationality: Dutch</p>
                <p>Date of birth: 03/04/1990</p>
                <div class="driver-statistics">
                    <p>Wins 54</p>
                    <p>Podiums 98</p>
                    <p>Points 2586.5</p>
                    <p>World titles 3</p>
                </div>
            </body></html>"#,
        );
        let mut driver = Driver {
            name: "Max Driver".to_string(),
            ..Driver::default()
        };
        scraper().enrich_from_detail(&html, &mut driver);

        assert_eq!(driver.nationality, "Dutch");
        assert_eq!(
            driver.date_of_birth.unwrap().format("%Y-%m-%d").to_string(),
            "1990-04-03"
        );
        assert_eq!(driver.wins, 54);
        assert_eq!(driver.podiums, 98);
        assert_eq!(driver.points, 2586);
        assert_eq!(driver.championships, 3);
    }

    #[test]
    fn enrich_without_stats_defaults_counters_to_zero() {
        let html = Html::parse_document("<html><body><p>bio text only</p></body></html>");
        let mut driver = Driver::default();
        scraper().enrich_from_detail(&html, &mut driver);
        assert_eq!(driver.wins, 0);
        assert_eq!(driver.podiums, 0);
        assert_eq!(driver.points, 0);
        assert!(driver.date_of_birth.is_none());
    }

    #[test]
    fn standings_row_resolves_and_persists() {
        let db = db_with_driver_and_team();
        let html = Html::parse_document(
            r#"<table class="standings">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Pts</th></tr>
                <tr><td>1</td><td>Max Driver</td><td>Red Team</td><td>250</td></tr>
            </table>"#,
        );
        let table = html.root_element();
        let rows = table_rows(table).unwrap();
        let entry = scraper()
            .build_standings_entry(&db, 2024, rows[1])
            .unwrap()
            .unwrap();
        assert_eq!(entry.position, 1);
        assert_eq!(entry.points, 250);
    }

    #[test]
    fn standings_row_with_unknown_driver_is_dropped() {
        let db = db_with_driver_and_team();
        let html = Html::parse_document(
            r#"<table>
                <tr><td>2</td><td>Ghost Racer</td><td>Red Team</td><td>100</td></tr>
            </table>"#,
        );
        let rows = table_rows(html.root_element()).unwrap();
        let entry = scraper().build_standings_entry(&db, 2024, rows[0]).unwrap();
        assert!(entry.is_none());
        assert_eq!(db.summary().unwrap().standings, 0);
    }

    #[test]
    fn short_standings_row_is_skipped() {
        let db = db_with_driver_and_team();
        let html = Html::parse_document(
            r#"<table><tr><td>1</td><td>Max Driver</td></tr></table>"#,
        );
        let rows = table_rows(html.root_element()).unwrap();
        let entry = scraper().build_standings_entry(&db, 2024, rows[0]).unwrap();
        assert!(entry.is_none());
    }

    struct FixtureSource {
        pages: Vec<(&'static str, &'static str)>,
    }

    #[async_trait::async_trait(?Send)]
    impl DocumentSource for FixtureSource {
        async fn fetch(&self, url: &str) -> Result<Html> {
            for (fragment, html) in &self.pages {
                if url.contains(fragment) {
                    return Ok(Html::parse_document(html));
                }
            }
            Err(AppError::scrape(url.to_string(), "no fixture page"))
        }
    }

    #[tokio::test]
    async fn scrape_all_accepts_injected_source() {
        let db = Database::open(":memory:").unwrap();
        let source = FixtureSource {
            pages: vec![
                (
                    "/en/drivers",
                    r#"<div class="driver-card">
                        <h3>Max Driver</h3>
                        <span class="team">Red Team</span>
                        <a href="/drivers/max.html">profile</a>
                    </div>"#,
                ),
                ("/drivers/max", r#"<p>Nationality: Dutch</p><p>Wins 54</p>"#),
            ],
        };
        let scraper = DriverScraper::with_source(Arc::new(Config::default()), source);

        let drivers = scraper.scrape_all(&db).await.unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].name, "Max Driver");
        assert_eq!(drivers[0].nationality, "Dutch");
        assert_eq!(drivers[0].wins, 54);
        assert!(db.team_by_name("Red Team").unwrap().is_some());
    }
}
