// src/models/team.rs

//! Team data structure.

/// A championship team (constructor).
///
/// Natural key: `name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    /// Surrogate id assigned by the database
    pub id: Option<i64>,

    /// Team name
    pub name: String,

    /// Home base location
    pub base: String,

    /// Team principal
    pub team_chief: String,

    /// Technical director
    pub technical_chief: String,

    /// Chassis designation
    pub chassis: String,

    /// Power unit supplier
    pub power_unit: String,

    /// World championships won
    pub world_championships: i64,

    /// Career pole positions
    pub pole_positions: i64,

    /// Career fastest laps
    pub fastest_laps: i64,

    /// Current season points
    pub points: i64,
}
