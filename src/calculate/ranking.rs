//! Ranking table with per-column red-to-green colour scaling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Dataset, TeamId, TeamStatistics, Visibility};

use super::{aggregate_teams, round_to};

/// Hue for the best value on the red (0) to green (120) scale.
const MAX_HUE: f64 = 120.0;

/// Ranking table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankingColumn {
    Epa,
    Opr,
    AutoOpr,
    AutoClimbAttempts,
    AutoClimbSuccesses,
    StuckOnBar,
    TeleOpr,
    ShootingAccuracy,
    ClimbTimePerLevel,
    AvgClimbPoints,
    ClimbAttempts,
    ClimbSuccesses,
    ClimbSuccessRate,
    DriverSkill,
    DefenseRatingCount,
    MaxDefenseRating,
    DiedRate,
}

impl RankingColumn {
    pub const ALL: [RankingColumn; 17] = [
        RankingColumn::Epa,
        RankingColumn::Opr,
        RankingColumn::AutoOpr,
        RankingColumn::AutoClimbAttempts,
        RankingColumn::AutoClimbSuccesses,
        RankingColumn::StuckOnBar,
        RankingColumn::TeleOpr,
        RankingColumn::ShootingAccuracy,
        RankingColumn::ClimbTimePerLevel,
        RankingColumn::AvgClimbPoints,
        RankingColumn::ClimbAttempts,
        RankingColumn::ClimbSuccesses,
        RankingColumn::ClimbSuccessRate,
        RankingColumn::DriverSkill,
        RankingColumn::DefenseRatingCount,
        RankingColumn::MaxDefenseRating,
        RankingColumn::DiedRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RankingColumn::Epa => "Avg EPA",
            RankingColumn::Opr => "Avg OPR",
            RankingColumn::AutoOpr => "Auto OPR",
            RankingColumn::AutoClimbAttempts => "Auto Climb Attempts",
            RankingColumn::AutoClimbSuccesses => "Auto Climb Successes",
            RankingColumn::StuckOnBar => "Stuck on Bar",
            RankingColumn::TeleOpr => "Tele OPR",
            RankingColumn::ShootingAccuracy => "Shooting Accuracy",
            RankingColumn::ClimbTimePerLevel => "Climb Time per Level",
            RankingColumn::AvgClimbPoints => "Avg Climb Points",
            RankingColumn::ClimbAttempts => "Climb Attempts",
            RankingColumn::ClimbSuccesses => "Climb Successes",
            RankingColumn::ClimbSuccessRate => "Climb Success Rate",
            RankingColumn::DriverSkill => "Driver Skill",
            RankingColumn::DefenseRatingCount => "Count Defense Ratings",
            RankingColumn::MaxDefenseRating => "Max Defense Ratings",
            RankingColumn::DiedRate => "Robot Died %",
        }
    }

    /// Token used in stored column selections.
    pub fn token(&self) -> &'static str {
        match self {
            RankingColumn::Epa => "epa",
            RankingColumn::Opr => "opr",
            RankingColumn::AutoOpr => "autoOpr",
            RankingColumn::AutoClimbAttempts => "autoClimbAttempts",
            RankingColumn::AutoClimbSuccesses => "autoClimbSuccesses",
            RankingColumn::StuckOnBar => "stuckOnBar",
            RankingColumn::TeleOpr => "teleOpr",
            RankingColumn::ShootingAccuracy => "shootingAccuracy",
            RankingColumn::ClimbTimePerLevel => "climbTimePerLevel",
            RankingColumn::AvgClimbPoints => "avgClimbPoints",
            RankingColumn::ClimbAttempts => "climbAttempts",
            RankingColumn::ClimbSuccesses => "climbSuccesses",
            RankingColumn::ClimbSuccessRate => "climbSuccessRate",
            RankingColumn::DriverSkill => "driverSkill",
            RankingColumn::DefenseRatingCount => "defenseRatingCount",
            RankingColumn::MaxDefenseRating => "maxDefenseRating",
            RankingColumn::DiedRate => "diedRate",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    /// Columns where lower values are better.
    pub fn is_inverted(&self) -> bool {
        matches!(self, RankingColumn::StuckOnBar | RankingColumn::DiedRate)
    }

    /// EPA and OPR are shown regardless of the column selection.
    pub fn is_always_visible(&self) -> bool {
        matches!(self, RankingColumn::Epa | RankingColumn::Opr)
    }

    pub fn value(&self, stats: &TeamStatistics) -> f64 {
        match self {
            RankingColumn::Epa => stats.epa,
            RankingColumn::Opr => stats.opr.total,
            RankingColumn::AutoOpr => stats.opr.auto,
            RankingColumn::AutoClimbAttempts => stats.auto_climb.attempts as f64,
            RankingColumn::AutoClimbSuccesses => stats.auto_climb.successes as f64,
            RankingColumn::StuckOnBar => stats.stuck_on_bar as f64,
            RankingColumn::TeleOpr => stats.opr.tele,
            RankingColumn::ShootingAccuracy => stats.shooting_accuracy,
            RankingColumn::ClimbTimePerLevel => stats.climb_time_per_level,
            RankingColumn::AvgClimbPoints => stats.avg_climb_points,
            RankingColumn::ClimbAttempts => stats.tele_climb.attempts as f64,
            RankingColumn::ClimbSuccesses => stats.tele_climb.successes as f64,
            RankingColumn::ClimbSuccessRate => stats.climb_success_rate,
            RankingColumn::DriverSkill => stats.driver_skill,
            RankingColumn::DefenseRatingCount => stats.defense_rating_count as f64,
            RankingColumn::MaxDefenseRating => stats.max_defense_rating,
            RankingColumn::DiedRate => stats.died_rate,
        }
    }
}

/// Parse stored column tokens, skipping unknown ones.
pub fn parse_columns<'a, I>(tokens: I) -> Vec<RankingColumn>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().filter_map(RankingColumn::parse).collect()
}

/// Columns to display for a selection: always-visible columns first, then
/// the selected ones in canonical order. `None` selects everything.
pub fn visible_columns(selection: Option<&[RankingColumn]>) -> Vec<RankingColumn> {
    match selection {
        None => RankingColumn::ALL.to_vec(),
        Some(selected) => RankingColumn::ALL
            .into_iter()
            .filter(|c| c.is_always_visible() || selected.contains(c))
            .collect(),
    }
}

/// Position of `value` within `[min, max]`, flipped for inverted columns.
/// A column with no spread sits at the midpoint.
pub fn normalize(value: f64, min: f64, max: f64, inverted: bool) -> f64 {
    if max == min {
        return 0.5;
    }
    let n = ((value - min) / (max - min)).clamp(0.0, 1.0);
    if inverted {
        1.0 - n
    } else {
        n
    }
}

pub fn hue(normalized: f64) -> f64 {
    normalized * MAX_HUE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingCell {
    pub column: RankingColumn,
    /// Display value, rounded to two decimals
    pub value: f64,
    pub hue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank: usize,
    pub team: TeamId,
    pub cells: Vec<RankingCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub columns: Vec<RankingColumn>,
    pub rows: Vec<RankingRow>,
}

/// Rank pre-aggregated statistics by EPA. Ties keep their input order.
pub fn rank_statistics(mut stats: Vec<TeamStatistics>, columns: &[RankingColumn]) -> RankingTable {
    stats.sort_by(|a, b| b.epa.total_cmp(&a.epa));

    let bounds: Vec<(f64, f64)> = columns
        .iter()
        .map(|column| {
            stats
                .iter()
                .map(|s| column.value(s))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
        })
        .collect();

    let rows = stats
        .iter()
        .enumerate()
        .map(|(i, s)| RankingRow {
            rank: i + 1,
            team: s.team.clone(),
            cells: columns
                .iter()
                .zip(&bounds)
                .map(|(column, &(min, max))| {
                    let value = column.value(s);
                    RankingCell {
                        column: *column,
                        value: round_to(value, 2),
                        hue: hue(normalize(value, min, max, column.is_inverted())),
                    }
                })
                .collect(),
        })
        .collect();

    RankingTable {
        columns: columns.to_vec(),
        rows,
    }
}

/// Build the ranking table for the currently visible teams.
pub fn rank_teams(
    data: &Dataset,
    visibility: &Visibility,
    selection: Option<&[RankingColumn]>,
) -> RankingTable {
    let columns = visible_columns(selection);
    let table = rank_statistics(aggregate_teams(data, visibility), &columns);
    debug!(
        "Ranked {} teams across {} columns",
        table.rows.len(),
        table.columns.len()
    );
    table
}
