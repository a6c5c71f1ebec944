// src/models/race.rs

//! Race and race result data structures.

use chrono::NaiveDate;

/// A single round of a season's calendar.
///
/// Natural key: `(season, round_number)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Race {
    /// Surrogate id assigned by the database
    pub id: Option<i64>,

    /// Championship season (year)
    pub season: i32,

    /// Round number within the season
    pub round_number: i64,

    /// Event name
    pub name: String,

    /// Circuit name
    pub circuit: String,

    /// Host country
    pub country: String,

    /// Race date, when the card yields one
    pub date: Option<NaiveDate>,

    /// Scheduled lap count
    pub laps: i64,

    /// Race distance as printed (e.g. "305.270 km")
    pub distance: String,

    /// Winner's total race time as printed
    pub race_time: String,

    /// Fastest lap as printed
    pub fastest_lap: String,
}

/// A driver's classified result in one race.
///
/// Natural key: `(race_id, driver_id)`. Both foreign keys must resolve
/// before the row is persisted; `team_id` is a denormalized reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceResult {
    /// Surrogate id assigned by the database
    pub id: Option<i64>,

    pub race_id: i64,
    pub driver_id: i64,
    pub team_id: i64,

    /// Finishing position; `None` for retirements / non-classified
    pub position: Option<i64>,

    /// Points scored in this race
    pub points: i64,

    /// Laps completed
    pub laps: i64,

    /// Elapsed time or gap as printed
    pub time: String,

    /// Status text (e.g. "Finished", "Retired")
    pub status: String,
}
