// src/models/standings.rs

//! Championship standings entry.

/// One row of the driver championship standings.
///
/// Natural key: `(season, driver_id)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsEntry {
    /// Surrogate id assigned by the database
    pub id: Option<i64>,

    /// Championship season (year)
    pub season: i32,

    pub driver_id: i64,
    pub team_id: i64,

    /// Championship position
    pub position: i64,

    /// Cumulative season points
    pub points: i64,

    /// Season wins
    pub wins: i64,
}
