//! Route handlers, grouped by view.

pub mod analytics;
pub mod lists;
pub mod matches;
pub mod teams;

/// Split a comma-separated query value, dropping blanks.
pub(crate) fn split_csv_param(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
