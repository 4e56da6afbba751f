//! Match outcome prediction from alliance EPA and auto OPR.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Alliance, ClimbLevel, Dataset, LevelTimes, MatchRecord, TeamId};

use super::{extract, round1, team_statistics};

/// EPA for one team over the full match data. Unknown teams score 0.
pub fn team_epa(team: &TeamId, data: &Dataset) -> f64 {
    let records: Vec<&MatchRecord> = data.matches_for(team).collect();
    extract::avg_total_points(&records) + data.opr(team).total
}

/// Split `a` and `b` into percentages of their sum; 50/50 when the sum is 0.
fn split(a: f64, b: f64) -> (f64, f64) {
    let total = a + b;
    if total > 0.0 {
        (round1(a / total * 100.0), round1(b / total * 100.0))
    } else {
        (50.0, 50.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceForecast {
    pub alliance: Alliance,
    pub teams: Vec<TeamId>,
    pub epa: f64,
    pub auto_opr: f64,
    pub win_percentage: f64,
    pub auto_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub match_number: Option<u32>,
    pub red: AllianceForecast,
    pub blue: AllianceForecast,
    /// Higher-EPA alliance; `None` on a tie
    pub winner: Option<Alliance>,
    /// Alliance with the lower auto OPR; red on a tie
    pub first_shift: Alliance,
}

/// Teams on each side of a match.
pub const ALLIANCE_SIZE: usize = 3;

/// Both alliances hold exactly [`ALLIANCE_SIZE`] teams.
pub fn is_full_match(red: &[TeamId], blue: &[TeamId]) -> bool {
    red.len() == ALLIANCE_SIZE && blue.len() == ALLIANCE_SIZE
}

pub fn predict(red: &[TeamId], blue: &[TeamId], data: &Dataset) -> Prediction {
    let epa = |teams: &[TeamId]| teams.iter().map(|t| team_epa(t, data)).sum::<f64>();
    let auto = |teams: &[TeamId]| teams.iter().map(|t| data.opr(t).auto).sum::<f64>();

    let (red_epa, blue_epa) = (epa(red), epa(blue));
    let (red_auto, blue_auto) = (auto(red), auto(blue));
    let (red_win, blue_win) = split(red_epa, blue_epa);
    let (red_auto_pct, blue_auto_pct) = split(red_auto, blue_auto);

    let winner = if red_epa > blue_epa {
        Some(Alliance::Red)
    } else if blue_epa > red_epa {
        Some(Alliance::Blue)
    } else {
        None
    };

    let first_shift = if blue_auto < red_auto {
        Alliance::Blue
    } else {
        Alliance::Red
    };

    debug!(
        "Predicted red {:.1} vs blue {:.1} EPA",
        red_epa, blue_epa
    );

    Prediction {
        match_number: None,
        red: AllianceForecast {
            alliance: Alliance::Red,
            teams: red.to_vec(),
            epa: red_epa,
            auto_opr: red_auto,
            win_percentage: red_win,
            auto_percentage: red_auto_pct,
        },
        blue: AllianceForecast {
            alliance: Alliance::Blue,
            teams: blue.to_vec(),
            epa: blue_epa,
            auto_opr: blue_auto,
            win_percentage: blue_win,
            auto_percentage: blue_auto_pct,
        },
        winner,
        first_shift,
    }
}

/// Predict a scheduled match. `None` when the match is not in the schedule.
pub fn predict_match(match_number: u32, data: &Dataset) -> Option<Prediction> {
    let row = data.schedule_match(match_number)?;
    let mut prediction = predict(&row.red, &row.blue, data);
    prediction.match_number = Some(match_number);
    Some(prediction)
}

/// Per-team scouting snapshot shown beside a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub team: TeamId,
    pub alliance: Alliance,
    pub has_data: bool,
    pub climb_success_rate: f64,
    pub shooting_accuracy: f64,
    pub most_common_climb: Option<ClimbLevel>,
    pub climb_time_by_level: LevelTimes,
    pub died_rate: f64,
    pub death_matches: Vec<u32>,
    pub avg_defense_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub rows: Vec<SummaryRow>,
}

pub fn match_summary(red: &[TeamId], blue: &[TeamId], data: &Dataset) -> MatchSummary {
    let row = |team: &TeamId, alliance: Alliance| match team_statistics(team, data) {
        Some(stats) => SummaryRow {
            team: team.clone(),
            alliance,
            has_data: true,
            climb_success_rate: stats.climb_success_rate,
            shooting_accuracy: {
                let records: Vec<&MatchRecord> = data.matches_for(team).collect();
                round1(extract::rated_shooting_accuracy(&records))
            },
            most_common_climb: stats.most_common_climb,
            climb_time_by_level: stats.climb_time_by_level,
            died_rate: stats.died_rate,
            death_matches: stats.death_matches,
            avg_defense_rating: round1(stats.avg_defense_rating),
        },
        None => SummaryRow {
            team: team.clone(),
            alliance,
            has_data: false,
            climb_success_rate: 0.0,
            shooting_accuracy: 0.0,
            most_common_climb: None,
            climb_time_by_level: LevelTimes::default(),
            died_rate: 0.0,
            death_matches: Vec::new(),
            avg_defense_rating: 0.0,
        },
    };

    let rows = red
        .iter()
        .map(|t| row(t, Alliance::Red))
        .chain(blue.iter().map(|t| row(t, Alliance::Blue)))
        .collect();

    MatchSummary { rows }
}
