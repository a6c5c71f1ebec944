// src/storage/sqlite.rs

//! SQLite-backed store for scraped championship data.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Driver, Race, RaceResult, StandingsEntry, Team};

/// Millisecond-resolution timestamp, so repeated upserts observably
/// advance `updated_at`.
const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f','now')";

/// Handle to the championship database.
///
/// Each instance owns its own connection; open one per logical operation
/// and let it drop when done.
pub struct Database {
    conn: Connection,
}

/// One row of the joined standings query, with names recovered from the
/// drivers and teams tables.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub entry: StandingsEntry,
    pub driver_name: String,
    pub team_name: String,
}

/// Row counts per table, for the stats display.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatabaseSummary {
    pub drivers: usize,
    pub teams: usize,
    pub races: usize,
    pub results: usize,
    pub standings: usize,
}

impl Database {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS drivers (
                driver_id       INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                nationality     TEXT NOT NULL DEFAULT '',
                date_of_birth   TEXT,
                number          INTEGER,
                team            TEXT NOT NULL DEFAULT '',
                points          INTEGER NOT NULL DEFAULT 0,
                wins            INTEGER NOT NULL DEFAULT 0,
                podiums         INTEGER NOT NULL DEFAULT 0,
                championships   INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT ({NOW}),
                updated_at      TEXT NOT NULL DEFAULT ({NOW}),
                UNIQUE(name, nationality)
            );

            CREATE TABLE IF NOT EXISTS teams (
                team_id             INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL UNIQUE,
                base                TEXT NOT NULL DEFAULT '',
                team_chief          TEXT NOT NULL DEFAULT '',
                technical_chief     TEXT NOT NULL DEFAULT '',
                chassis             TEXT NOT NULL DEFAULT '',
                power_unit          TEXT NOT NULL DEFAULT '',
                world_championships INTEGER NOT NULL DEFAULT 0,
                pole_positions      INTEGER NOT NULL DEFAULT 0,
                fastest_laps        INTEGER NOT NULL DEFAULT 0,
                points              INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL DEFAULT ({NOW}),
                updated_at          TEXT NOT NULL DEFAULT ({NOW})
            );

            CREATE TABLE IF NOT EXISTS races (
                race_id         INTEGER PRIMARY KEY AUTOINCREMENT,
                season          INTEGER NOT NULL,
                round_number    INTEGER NOT NULL,
                race_name       TEXT NOT NULL,
                circuit_name    TEXT NOT NULL DEFAULT '',
                country         TEXT NOT NULL DEFAULT '',
                date            TEXT,
                laps            INTEGER NOT NULL DEFAULT 0,
                distance        TEXT NOT NULL DEFAULT '',
                race_time       TEXT NOT NULL DEFAULT '',
                fastest_lap     TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL DEFAULT ({NOW}),
                updated_at      TEXT NOT NULL DEFAULT ({NOW}),
                UNIQUE(season, round_number)
            );

            CREATE TABLE IF NOT EXISTS race_results (
                result_id       INTEGER PRIMARY KEY AUTOINCREMENT,
                race_id         INTEGER NOT NULL REFERENCES races(race_id) ON DELETE CASCADE,
                driver_id       INTEGER NOT NULL REFERENCES drivers(driver_id),
                team_id         INTEGER NOT NULL REFERENCES teams(team_id),
                position        INTEGER,
                points          INTEGER NOT NULL DEFAULT 0,
                laps            INTEGER NOT NULL DEFAULT 0,
                time            TEXT NOT NULL DEFAULT '',
                status          TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL DEFAULT ({NOW}),
                updated_at      TEXT NOT NULL DEFAULT ({NOW}),
                UNIQUE(race_id, driver_id)
            );

            CREATE TABLE IF NOT EXISTS standings (
                standing_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                season          INTEGER NOT NULL,
                driver_id       INTEGER NOT NULL REFERENCES drivers(driver_id),
                team_id         INTEGER NOT NULL REFERENCES teams(team_id),
                position        INTEGER NOT NULL DEFAULT 0,
                points          INTEGER NOT NULL DEFAULT 0,
                wins            INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT ({NOW}),
                updated_at      TEXT NOT NULL DEFAULT ({NOW}),
                UNIQUE(season, driver_id)
            );
            "
        ))?;
        Ok(())
    }

    // --- Upserts ---
    //
    // Last-write-wins on natural-key conflict: every non-key field is
    // overwritten and updated_at advances; created_at is preserved.

    /// Upsert a driver by `(name, nationality)`, returning its surrogate id.
    pub fn upsert_driver(&self, driver: &Driver) -> Result<i64> {
        let dob = driver.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string());
        let id = self.conn.query_row(
            &format!(
                "INSERT INTO drivers
                     (name, nationality, date_of_birth, number, team,
                      points, wins, podiums, championships)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(name, nationality) DO UPDATE SET
                     date_of_birth = excluded.date_of_birth,
                     number        = excluded.number,
                     team          = excluded.team,
                     points        = excluded.points,
                     wins          = excluded.wins,
                     podiums       = excluded.podiums,
                     championships = excluded.championships,
                     updated_at    = {NOW}
                 RETURNING driver_id"
            ),
            params![
                driver.name,
                driver.nationality,
                dob,
                driver.number,
                driver.team,
                driver.points,
                driver.wins,
                driver.podiums,
                driver.championships,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Upsert a team by name, returning its surrogate id.
    pub fn upsert_team(&self, team: &Team) -> Result<i64> {
        let id = self.conn.query_row(
            &format!(
                "INSERT INTO teams
                     (name, base, team_chief, technical_chief, chassis, power_unit,
                      world_championships, pole_positions, fastest_laps, points)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(name) DO UPDATE SET
                     base                = excluded.base,
                     team_chief          = excluded.team_chief,
                     technical_chief     = excluded.technical_chief,
                     chassis             = excluded.chassis,
                     power_unit          = excluded.power_unit,
                     world_championships = excluded.world_championships,
                     pole_positions      = excluded.pole_positions,
                     fastest_laps        = excluded.fastest_laps,
                     points              = excluded.points,
                     updated_at          = {NOW}
                 RETURNING team_id"
            ),
            params![
                team.name,
                team.base,
                team.team_chief,
                team.technical_chief,
                team.chassis,
                team.power_unit,
                team.world_championships,
                team.pole_positions,
                team.fastest_laps,
                team.points,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Upsert a race by `(season, round_number)`, returning its surrogate id.
    pub fn upsert_race(&self, race: &Race) -> Result<i64> {
        let date = race.date.map(|d| d.format("%Y-%m-%d").to_string());
        let id = self.conn.query_row(
            &format!(
                "INSERT INTO races
                     (season, round_number, race_name, circuit_name, country,
                      date, laps, distance, race_time, fastest_lap)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(season, round_number) DO UPDATE SET
                     race_name    = excluded.race_name,
                     circuit_name = excluded.circuit_name,
                     country      = excluded.country,
                     date         = excluded.date,
                     laps         = excluded.laps,
                     distance     = excluded.distance,
                     race_time    = excluded.race_time,
                     fastest_lap  = excluded.fastest_lap,
                     updated_at   = {NOW}
                 RETURNING race_id"
            ),
            params![
                race.season,
                race.round_number,
                race.name,
                race.circuit,
                race.country,
                date,
                race.laps,
                race.distance,
                race.race_time,
                race.fastest_lap,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Upsert a race result by `(race_id, driver_id)`.
    pub fn upsert_race_result(&self, result: &RaceResult) -> Result<i64> {
        let id = self.conn.query_row(
            &format!(
                "INSERT INTO race_results
                     (race_id, driver_id, team_id, position, points, laps, time, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(race_id, driver_id) DO UPDATE SET
                     team_id    = excluded.team_id,
                     position   = excluded.position,
                     points     = excluded.points,
                     laps       = excluded.laps,
                     time       = excluded.time,
                     status     = excluded.status,
                     updated_at = {NOW}
                 RETURNING result_id"
            ),
            params![
                result.race_id,
                result.driver_id,
                result.team_id,
                result.position,
                result.points,
                result.laps,
                result.time,
                result.status,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Upsert a standings entry by `(season, driver_id)`.
    pub fn upsert_standing(&self, entry: &StandingsEntry) -> Result<i64> {
        let id = self.conn.query_row(
            &format!(
                "INSERT INTO standings
                     (season, driver_id, team_id, position, points, wins)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(season, driver_id) DO UPDATE SET
                     team_id    = excluded.team_id,
                     position   = excluded.position,
                     points     = excluded.points,
                     wins       = excluded.wins,
                     updated_at = {NOW}
                 RETURNING standing_id"
            ),
            params![
                entry.season,
                entry.driver_id,
                entry.team_id,
                entry.position,
                entry.points,
                entry.wins,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Ensure a team row exists for `name`, creating a bare one if needed,
    /// and return its surrogate id. Unlike [`Self::upsert_team`] this never
    /// overwrites an existing row's metadata.
    pub fn ensure_team(&self, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO teams (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        let id = self.conn.query_row(
            "SELECT team_id FROM teams WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    // --- Lookups (read-only, never create rows) ---

    /// Find a driver by name.
    pub fn driver_by_name(&self, name: &str) -> Result<Option<Driver>> {
        let driver = self
            .conn
            .query_row(
                "SELECT driver_id, name, nationality, date_of_birth, number, team,
                        points, wins, podiums, championships
                 FROM drivers WHERE name = ?1",
                params![name],
                driver_from_row,
            )
            .optional()?;
        Ok(driver)
    }

    /// Find a team by name.
    pub fn team_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT team_id, name, base, team_chief, technical_chief, chassis,
                        power_unit, world_championships, pole_positions, fastest_laps,
                        points
                 FROM teams WHERE name = ?1",
                params![name],
                team_from_row,
            )
            .optional()?;
        Ok(team)
    }

    /// Find a race by its natural key.
    pub fn race_by_round(&self, season: i32, round_number: i64) -> Result<Option<Race>> {
        let race = self
            .conn
            .query_row(
                "SELECT race_id, season, round_number, race_name, circuit_name,
                        country, date, laps, distance, race_time, fastest_lap
                 FROM races WHERE season = ?1 AND round_number = ?2",
                params![season, round_number],
                race_from_row,
            )
            .optional()?;
        Ok(race)
    }

    /// All drivers, highest points first.
    pub fn drivers_ordered_by_points(&self) -> Result<Vec<Driver>> {
        let mut stmt = self.conn.prepare(
            "SELECT driver_id, name, nationality, date_of_birth, number, team,
                    points, wins, podiums, championships
             FROM drivers ORDER BY points DESC",
        )?;
        let drivers = stmt
            .query_map([], driver_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(drivers)
    }

    /// All races of a season, in calendar order.
    pub fn races_by_season(&self, season: i32) -> Result<Vec<Race>> {
        let mut stmt = self.conn.prepare(
            "SELECT race_id, season, round_number, race_name, circuit_name,
                    country, date, laps, distance, race_time, fastest_lap
             FROM races WHERE season = ?1 ORDER BY round_number",
        )?;
        let races = stmt
            .query_map(params![season], race_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(races)
    }

    /// Championship standings for a season, joined to driver and team
    /// names. Rows whose driver or team is missing are excluded.
    pub fn standings(&self, season: i32) -> Result<Vec<StandingsRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.standing_id, s.season, s.driver_id, s.team_id,
                    s.position, s.points, s.wins,
                    d.name AS driver_name, t.name AS team_name
             FROM standings s
             JOIN drivers d ON s.driver_id = d.driver_id
             JOIN teams t ON s.team_id = t.team_id
             WHERE s.season = ?1
             ORDER BY s.position",
        )?;
        let rows = stmt
            .query_map(params![season], |row| {
                Ok(StandingsRow {
                    entry: StandingsEntry {
                        id: Some(row.get(0)?),
                        season: row.get(1)?,
                        driver_id: row.get(2)?,
                        team_id: row.get(3)?,
                        position: row.get(4)?,
                        points: row.get(5)?,
                        wins: row.get(6)?,
                    },
                    driver_name: row.get(7)?,
                    team_name: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // --- Maintenance ---

    /// Delete races (and their results, by cascade) and standings created
    /// more than `days` days ago. Returns the number of rows deleted.
    pub fn cleanup_older_than(&self, days: u32) -> Result<usize> {
        let cutoff = format!("-{days} days");
        let races = self.conn.execute(
            "DELETE FROM races WHERE created_at < datetime('now', ?1)",
            params![cutoff],
        )?;
        let standings = self.conn.execute(
            "DELETE FROM standings WHERE created_at < datetime('now', ?1)",
            params![cutoff],
        )?;
        Ok(races + standings)
    }

    /// Row counts per table.
    pub fn summary(&self) -> Result<DatabaseSummary> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(DatabaseSummary {
            drivers: count("drivers")?,
            teams: count("teams")?,
            races: count("races")?,
            results: count("race_results")?,
            standings: count("standings")?,
        })
    }

    /// `updated_at` for a driver row, for idempotence checks.
    pub fn driver_updated_at(&self, id: i64) -> Result<String> {
        let ts = self.conn.query_row(
            "SELECT updated_at FROM drivers WHERE driver_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(ts)
    }
}

fn driver_from_row(row: &Row<'_>) -> rusqlite::Result<Driver> {
    let dob: Option<String> = row.get(3)?;
    Ok(Driver {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        nationality: row.get(2)?,
        date_of_birth: dob.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        number: row.get(4)?,
        team: row.get(5)?,
        points: row.get(6)?,
        wins: row.get(7)?,
        podiums: row.get(8)?,
        championships: row.get(9)?,
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        base: row.get(2)?,
        team_chief: row.get(3)?,
        technical_chief: row.get(4)?,
        chassis: row.get(5)?,
        power_unit: row.get(6)?,
        world_championships: row.get(7)?,
        pole_positions: row.get(8)?,
        fastest_laps: row.get(9)?,
        points: row.get(10)?,
    })
}

fn race_from_row(row: &Row<'_>) -> rusqlite::Result<Race> {
    let date: Option<String> = row.get(6)?;
    Ok(Race {
        id: Some(row.get(0)?),
        season: row.get(1)?,
        round_number: row.get(2)?,
        name: row.get(3)?,
        circuit: row.get(4)?,
        country: row.get(5)?,
        date: date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        laps: row.get(7)?,
        distance: row.get(8)?,
        race_time: row.get(9)?,
        fastest_lap: row.get(10)?,
    })
}
