//! Single-team detail view: statistics plus per-match notes.

use serde::{Deserialize, Serialize};

use crate::models::{parse_number, Dataset, FieldPosition, MatchRecord, TeamId, TeamStatistics};

use super::team_statistics;

/// A match worth a second look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedMatch {
    pub match_number: Option<u32>,
    pub died: bool,
    pub played_defense: bool,
    pub was_defended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub match_number: Option<u32>,
    pub text: String,
}

/// Auto route notes for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoPath {
    pub match_number: Option<u32>,
    pub starting_position: Option<FieldPosition>,
    pub travel: Option<String>,
    pub fuel_collection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    pub statistics: TeamStatistics,
    pub flagged_matches: Vec<FlaggedMatch>,
    pub comments: Vec<Comment>,
    pub auto_paths: Vec<AutoPath>,
}

fn is_positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.0)
}

fn flag_match(record: &MatchRecord) -> Option<FlaggedMatch> {
    let flagged = FlaggedMatch {
        match_number: record.match_number,
        died: is_positive(record.robot_died),
        played_defense: is_positive(record.robot_defense),
        was_defended: is_positive(record.defense_on_robot.as_deref().and_then(parse_number)),
    };
    (flagged.died || flagged.played_defense || flagged.was_defended).then_some(flagged)
}

/// Build the detail view. `position` limits auto paths to one starting spot.
pub fn team_detail(
    team: &TeamId,
    data: &Dataset,
    position: Option<FieldPosition>,
) -> Option<TeamDetail> {
    let statistics = team_statistics(team, data)?;
    let records: Vec<&MatchRecord> = data.matches_for(team).collect();

    let mut flagged_matches: Vec<FlaggedMatch> =
        records.iter().filter_map(|r| flag_match(r)).collect();
    flagged_matches.sort_by_key(|m| m.match_number);

    let comments = records
        .iter()
        .filter_map(|r| {
            r.comments.as_ref().map(|text| Comment {
                match_number: r.match_number,
                text: text.clone(),
            })
        })
        .collect();

    let auto_paths = records
        .iter()
        .filter(|r| position.is_none() || r.starting_position == position)
        .filter(|r| r.travel_string.is_some() || r.fuel_collection_string.is_some())
        .map(|r| AutoPath {
            match_number: r.match_number,
            starting_position: r.starting_position,
            travel: r.travel_string.clone(),
            fuel_collection: r.fuel_collection_string.clone(),
        })
        .collect();

    Some(TeamDetail {
        statistics,
        flagged_matches,
        comments,
        auto_paths,
    })
}
