// src/services/races.rs

//! Race and race-result scraper service.
//!
//! Builds [`Race`] records from season calendar cards (round number is the
//! card's position in the listing) and [`RaceResult`] rows from per-race
//! classification tables, resolving driver and team references by name
//! against the database before anything is persisted.

use std::sync::Arc;

use scraper::{ElementRef, Html};
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::extract::{
    self, element_text, labeled_value, parse_date, parse_number, parse_points, AttrLocator,
    Locator,
};
use crate::models::{Race, RaceResult};
use crate::services::drivers::{row_cells, table_rows};
use crate::storage::Database;
use crate::utils::http::{DocumentSource, Fetcher};
use crate::utils::resolve_url;

const RACE_NAME_CHAIN: &[Locator] = &[
    Locator::Heading(r".+"),
    Locator::ClassFragment {
        tags: &["span", "div"],
        pattern: "name|title|event",
    },
];

const COUNTRY_CHAIN: &[Locator] = &[Locator::ClassFragment {
    tags: &["span", "div"],
    pattern: "country|location|circuit",
}];

const DATE_CHAIN: &[Locator] = &[Locator::TextPattern(
    r"(?i)\d{1,2}[/\-.]\d{1,2}|\d{1,2}\s+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)",
)];

const DETAIL_LINK: &[AttrLocator] = &[AttrLocator {
    selector: "a",
    attr: "href",
}];

const CARD_CLASS_PATTERN: &str = "race.*card|event.*item|listing.*item";
const CARD_HREF_PATTERN: &str = "/races/";

const RESULTS_CLASS_PATTERN: &str = "results|classification";

/// A result row needs at least position, driver, team and points cells.
const MIN_RESULT_CELLS: usize = 4;

/// Scraper for a season's calendar and its race results.
///
/// Generic over its document source, like [`super::DriverScraper`].
pub struct RaceScraper<S = Fetcher> {
    config: Arc<Config>,
    source: S,
}

impl RaceScraper {
    /// Create a race scraper backed by an HTTP fetcher.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let source = Fetcher::new(&config.scraper)?;
        Ok(Self { config, source })
    }
}

impl<S: DocumentSource> RaceScraper<S> {
    /// Create a race scraper over an arbitrary document source.
    pub fn with_source(config: Arc<Config>, source: S) -> Self {
        Self { config, source }
    }

    /// Scrape a season's race calendar, upserting every race that yields
    /// a name. Round numbers follow listing order.
    pub async fn scrape_season(&self, db: &Database, season: i32) -> Result<Vec<Race>> {
        let url = self.config.scraper.races_url(season);
        let document = match self.source.fetch(&url).await {
            Ok(document) => document,
            Err(error) => {
                log::error!("Failed to load race calendar for {}: {}", season, error);
                return Ok(Vec::new());
            }
        };
        let base_url = Url::parse(&url)?;
        let root = document.root_element();

        let mut cards = extract::select_by_class(root, &["div", "article"], CARD_CLASS_PATTERN);
        if cards.is_empty() {
            cards = extract::select_by_href(root, CARD_HREF_PATTERN);
        }
        log::info!("Found {} race cards for {}", cards.len(), season);

        let mut races = Vec::new();
        for (index, card) in cards.into_iter().enumerate() {
            let round_number = (index + 1) as i64;
            let race = match self.build_race(card, season, round_number, &base_url).await {
                Ok(Some(race)) => race,
                Ok(None) => continue,
                Err(error) => {
                    log::warn!("Skipping race card {}: {}", round_number, error);
                    continue;
                }
            };

            let id = db.upsert_race(&race)?;
            log::info!("Saved race {} (id {})", race.name, id);
            races.push(Race {
                id: Some(id),
                ..race
            });
        }
        Ok(races)
    }

    /// Basic record from the card, enriched from the event detail page
    /// when the card links to one.
    async fn build_race(
        &self,
        card: ElementRef<'_>,
        season: i32,
        round_number: i64,
        base_url: &Url,
    ) -> Result<Option<Race>> {
        let Some(name) = extract::first_text(card, RACE_NAME_CHAIN) else {
            return Ok(None);
        };

        let mut race = Race {
            season,
            round_number,
            name,
            country: extract::extract_text(card, COUNTRY_CHAIN, ""),
            date: extract::first_text(card, DATE_CHAIN)
                .as_deref()
                .and_then(parse_date),
            ..Race::default()
        };

        if let Some(href) = extract::first_attr(card, DETAIL_LINK) {
            let detail_url = resolve_url(base_url, &href);
            match self.source.fetch(&detail_url).await {
                Ok(detail) => enrich_from_detail(&detail, &mut race),
                Err(error) => {
                    log::warn!("Detail fetch failed for {}: {}", race.name, error);
                }
            }
        }

        Ok(Some(race))
    }

    /// Scrape all race results for a season: the results index is walked
    /// link by link, each linked page holding one race's classification
    /// table. Rows whose driver or team does not resolve are dropped.
    pub async fn scrape_results(&self, db: &Database, season: i32) -> Result<Vec<RaceResult>> {
        let url = self.config.scraper.results_url(season);
        let document = match self.source.fetch(&url).await {
            Ok(document) => document,
            Err(error) => {
                log::error!("Failed to load results index for {}: {}", season, error);
                return Ok(Vec::new());
            }
        };
        let base_url = Url::parse(&url)?;

        let link_pattern = format!(r"/results/.*{season}.*/races/");
        let hrefs: Vec<String> = extract::select_by_href(document.root_element(), &link_pattern)
            .iter()
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_string)
            .collect();

        let mut results = Vec::new();
        for (index, href) in hrefs.iter().enumerate() {
            let round_number = (index + 1) as i64;
            let Some(race) = db.race_by_round(season, round_number)? else {
                log::warn!(
                    "No stored race for season {} round {}; skipping results page",
                    season,
                    round_number
                );
                continue;
            };
            let Some(race_id) = race.id else { continue };

            let race_url = resolve_url(&base_url, href);
            let page = match self.source.fetch(&race_url).await {
                Ok(page) => page,
                Err(error) => {
                    log::warn!("Failed to load results page {}: {}", race_url, error);
                    continue;
                }
            };

            results.extend(self.scrape_result_table(db, &page, race_id)?);
        }
        Ok(results)
    }

    /// Parse and persist one race's classification table.
    fn scrape_result_table(
        &self,
        db: &Database,
        document: &Html,
        race_id: i64,
    ) -> Result<Vec<RaceResult>> {
        let root = document.root_element();
        let Some(table) = extract::select_by_class(root, &["table"], RESULTS_CLASS_PATTERN)
            .first()
            .copied()
        else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for row in table_rows(table)?.into_iter().skip(1) {
            match self.build_result(db, race_id, row) {
                Ok(Some(result)) => {
                    db.upsert_race_result(&result)?;
                    results.push(result);
                }
                Ok(None) => {}
                Err(error) => {
                    log::warn!("Skipping result row: {}", error);
                }
            }
        }
        Ok(results)
    }

    /// One classification row. Short rows and rows whose driver/team do
    /// not resolve yield `None`; referential integrity is enforced here,
    /// at build time.
    fn build_result(
        &self,
        db: &Database,
        race_id: i64,
        row: ElementRef<'_>,
    ) -> Result<Option<RaceResult>> {
        let cells = row_cells(row)?;
        if cells.len() < MIN_RESULT_CELLS {
            return Ok(None);
        }

        let position = parse_number(&element_text(cells[0]));
        let driver_name = element_text(cells[1]);
        let team_name = element_text(cells[2]);
        let points = parse_points(&element_text(cells[cells.len() - 1]));

        let Some(driver_id) = db.driver_by_name(&driver_name)?.and_then(|d| d.id) else {
            log::debug!("Result row references unknown driver {:?}", driver_name);
            return Ok(None);
        };
        let Some(team_id) = db.team_by_name(&team_name)?.and_then(|t| t.id) else {
            log::debug!("Result row references unknown team {:?}", team_name);
            return Ok(None);
        };

        // Wider tables carry laps / time / status between team and points.
        let (laps, time) = if cells.len() > 5 {
            (
                parse_number(&element_text(cells[3])).unwrap_or(0),
                element_text(cells[4]),
            )
        } else {
            (0, String::new())
        };
        let status = if cells.len() > 6 {
            element_text(cells[5])
        } else {
            "Finished".to_string()
        };

        Ok(Some(RaceResult {
            id: None,
            race_id,
            driver_id,
            team_id,
            position,
            points,
            laps,
            time,
            status,
        }))
    }
}

/// Pull circuit, laps, distance and timing facts from an event page.
fn enrich_from_detail(document: &Html, race: &mut Race) {
    let root = document.root_element();

    if let Some(circuit) = labeled_value(root, r"Circuit|Track") {
        race.circuit = circuit;
    }
    race.laps = labeled_value(root, r"Laps?")
        .as_deref()
        .and_then(parse_number)
        .unwrap_or(0);
    if let Some(distance) = labeled_value(root, r"Distance|Length") {
        race.distance = distance;
    }
    if let Some(race_time) = labeled_value(root, r"Race time|Duration") {
        race.race_time = race_time;
    }
    if let Some(fastest) = labeled_value(root, r"Fastest lap") {
        race.fastest_lap = fastest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Driver, Team};

    fn scraper() -> RaceScraper {
        RaceScraper::new(Arc::new(Config::default())).unwrap()
    }

    fn seeded_db() -> (Database, i64) {
        let db = Database::open(":memory:").unwrap();
        db.upsert_driver(&Driver {
            name: "Max Driver".to_string(),
            nationality: "Dutch".to_string(),
            ..Driver::default()
        })
        .unwrap();
        db.upsert_team(&Team {
            name: "Red Team".to_string(),
            ..Team::default()
        })
        .unwrap();
        let race_id = db
            .upsert_race(&Race {
                season: 2024,
                round_number: 1,
                name: "Grand Prix".to_string(),
                ..Race::default()
            })
            .unwrap();
        (db, race_id)
    }

    #[test]
    fn result_table_persists_resolved_rows() {
        let (db, race_id) = seeded_db();
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Pts</th></tr>
                <tr><td>1</td><td>Max Driver</td><td>Red Team</td><td>25</td></tr>
            </table>"#,
        );
        let results = scraper().scrape_result_table(&db, &html, race_id).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, Some(1));
        assert_eq!(results[0].points, 25);
        assert_eq!(db.summary().unwrap().results, 1);

        // Foreign keys point at the seeded rows.
        let driver = db.driver_by_name("Max Driver").unwrap().unwrap();
        let team = db.team_by_name("Red Team").unwrap().unwrap();
        assert_eq!(results[0].driver_id, driver.id.unwrap());
        assert_eq!(results[0].team_id, team.id.unwrap());
    }

    #[test]
    fn unknown_driver_row_is_not_persisted() {
        let (db, race_id) = seeded_db();
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Pts</th></tr>
                <tr><td>1</td><td>Ghost Racer</td><td>Red Team</td><td>25</td></tr>
            </table>"#,
        );
        let results = scraper().scrape_result_table(&db, &html, race_id).unwrap();
        assert!(results.is_empty());
        assert_eq!(db.summary().unwrap().results, 0);
    }

    #[test]
    fn malformed_row_is_skipped_and_rest_processed() {
        let (db, race_id) = seeded_db();
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Pts</th></tr>
                <tr><td>1</td><td>broken row</td></tr>
                <tr><td>2</td><td>Max Driver</td><td>Red Team</td><td>18</td></tr>
            </table>"#,
        );
        let results = scraper().scrape_result_table(&db, &html, race_id).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, Some(2));
        assert_eq!(results[0].points, 18);
        assert_eq!(db.summary().unwrap().results, 1);
    }

    #[test]
    fn retirement_without_position_stays_null() {
        let (db, race_id) = seeded_db();
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Laps</th><th>Time</th><th>Status</th><th>Pts</th></tr>
                <tr><td>DNF</td><td>Max Driver</td><td>Red Team</td><td>43</td><td></td><td>Retired</td><td>0</td></tr>
            </table>"#,
        );
        let results = scraper().scrape_result_table(&db, &html, race_id).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, None);
        assert_eq!(results[0].points, 0);
        assert_eq!(results[0].laps, 43);
        assert_eq!(results[0].status, "Retired");
    }

    #[test]
    fn wide_result_row_reads_laps_and_time() {
        let (db, race_id) = seeded_db();
        let html = Html::parse_document(
            r#"<table class="classification">
                <tr><th>Pos</th><th>Driver</th><th>Team</th><th>Laps</th><th>Time</th><th>Pts</th></tr>
                <tr><td>1</td><td>Max Driver</td><td>Red Team</td><td>57</td><td>1:32:07.986</td><td>25</td></tr>
            </table>"#,
        );
        let results = scraper().scrape_result_table(&db, &html, race_id).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].laps, 57);
        assert_eq!(results[0].time, "1:32:07.986");
        assert_eq!(results[0].status, "Finished");
    }

    #[test]
    fn race_detail_enrichment() {
        let html = Html::parse_document(
            r#"<html><body>
                <p>Circuit: Autodromo Nazionale</p>
                <p>Laps 53</p>
                <p>Distance: 306.720 km</p>
                <p>Race time: 1:14:40.727</p>
                <p>Fastest lap: 1:21.046</p>
            </body></html>"#,
        );
        let mut race = Race::default();
        enrich_from_detail(&html, &mut race);

        assert_eq!(race.circuit, "Autodromo Nazionale");
        assert_eq!(race.laps, 53);
        assert_eq!(race.distance, "306.720 km");
        assert_eq!(race.race_time, "1:14:40.727");
        assert_eq!(race.fastest_lap, "1:21.046");
    }
}
