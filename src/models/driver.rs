// src/models/driver.rs

//! Driver data structure.

use chrono::NaiveDate;

/// A championship driver.
///
/// Natural key: `(name, nationality)`. Counters default to zero when the
/// source omits them; `date_of_birth` stays `None` when unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Driver {
    /// Surrogate id assigned by the database
    pub id: Option<i64>,

    /// Full driver name
    pub name: String,

    /// Nationality as printed on the detail page
    pub nationality: String,

    /// Date of birth, when the detail page yields one
    pub date_of_birth: Option<NaiveDate>,

    /// Car number
    pub number: Option<i64>,

    /// Current team as free text (not a foreign key)
    pub team: String,

    /// Cumulative career points
    pub points: i64,

    /// Career wins
    pub wins: i64,

    /// Career podiums
    pub podiums: i64,

    /// World championships won
    pub championships: i64,
}
