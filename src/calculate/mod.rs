//! Statistics calculation engine.
//!
//! Computes derived metrics from parsed scouting data:
//! - Per-team aggregates (EPA, climbs, defense, died rate)
//! - Rankings with per-column colour scaling
//! - Capability filters and head-to-head comparisons
//! - Match predictions and scouting assignments
//!
//! Every function here is total: malformed input is treated as absent and
//! never surfaces as an error.

pub mod aggregate;
pub mod compare;
pub mod extract;
pub mod filter;
pub mod predict;
pub mod ranking;
pub mod schedule;
pub mod team_view;

pub use crate::models::parse_number;
pub use aggregate::{aggregate_teams, overview, team_statistics, LeaderboardEntry, Overview};
pub use compare::{Comparison, Slot, SlotResult};
pub use filter::{filter_teams, FilterFlag, FilterGroup, FilterResult, FilteredTeam, SortKey};
pub use predict::{
    is_full_match, match_summary, predict, predict_match, MatchSummary, Prediction, ALLIANCE_SIZE,
};
pub use ranking::{rank_teams, RankingColumn, RankingTable};
pub use schedule::{home_matches, picklist_scouting, scouting_assignments, HomeMatch, ScoutingPlan};
pub use team_view::{team_detail, TeamDetail};

/// Mean of the present values; 0 when none are present.
pub fn average_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// `part / whole` as a percentage with one decimal; 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}
