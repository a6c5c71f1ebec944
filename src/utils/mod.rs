// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

use chrono::{Datelike, Local};
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// The season currently being raced.
///
/// Before March the previous year's championship is still the current one.
pub fn current_season() -> i32 {
    let now = Local::now();
    if now.month() < 3 {
        now.year() - 1
    } else {
        now.year()
    }
}
