//! Scouting assignments derived from the match schedule.
//!
//! Ahead of each home-team match, scouts watch every partner and opponent in
//! that team's two most recent earlier matches. The picklist variant instead
//! lists which picklist teams play in each match.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Alliance, ScheduleRow, TeamId, TeamList};

/// Earlier matches examined per partner or opponent.
const LOOKBACK: usize = 2;

/// Teams to watch during one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutingBlock {
    pub match_number: u32,
    pub teams: Vec<TeamId>,
}

/// Scouting blocks ordered by match number, none of them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutingPlan {
    pub blocks: Vec<ScoutingBlock>,
}

impl ScoutingPlan {
    fn from_map(map: BTreeMap<u32, BTreeSet<TeamId>>, cursor: u32) -> Self {
        let blocks = map
            .into_iter()
            .filter(|(match_number, teams)| *match_number >= cursor && !teams.is_empty())
            .map(|(match_number, teams)| ScoutingBlock {
                match_number,
                teams: teams.into_iter().collect(),
            })
            .collect();
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Ascending match numbers for every team in the schedule.
pub fn team_matches(schedule: &[ScheduleRow]) -> HashMap<TeamId, Vec<u32>> {
    let mut index: HashMap<TeamId, Vec<u32>> = HashMap::new();
    for row in schedule {
        for team in row.teams() {
            index.entry(team.clone()).or_default().push(row.match_number);
        }
    }
    for matches in index.values_mut() {
        matches.sort_unstable();
    }
    index
}

/// One of the home team's own matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeMatch {
    pub match_number: u32,
    pub alliance: Alliance,
    pub partners: Vec<TeamId>,
    pub opponents: Vec<TeamId>,
}

fn home_match(row: &ScheduleRow, home: &TeamId) -> Option<HomeMatch> {
    let alliance = row.alliance_of(home)?;
    Some(HomeMatch {
        match_number: row.match_number,
        alliance,
        partners: row
            .alliance(alliance)
            .iter()
            .filter(|t| *t != home)
            .cloned()
            .collect(),
        opponents: row.alliance(alliance.opponent()).to_vec(),
    })
}

/// Home-team matches at or after `cursor`.
pub fn home_matches(schedule: &[ScheduleRow], home: &TeamId, cursor: u32) -> Vec<HomeMatch> {
    schedule
        .iter()
        .filter(|row| row.match_number >= cursor)
        .filter_map(|row| home_match(row, home))
        .collect()
}

/// Matches to scout ahead of each home-team match, limited to `cursor` onward.
pub fn scouting_assignments(schedule: &[ScheduleRow], home: &TeamId, cursor: u32) -> ScoutingPlan {
    let appearances = team_matches(schedule);
    let mut marks: BTreeMap<u32, BTreeSet<TeamId>> = BTreeMap::new();

    for upcoming in schedule.iter().filter_map(|row| home_match(row, home)) {
        for team in upcoming.partners.iter().chain(&upcoming.opponents) {
            let Some(history) = appearances.get(team) else {
                continue;
            };
            let priors = history
                .iter()
                .rev()
                .filter(|m| **m < upcoming.match_number)
                .take(LOOKBACK);
            for prior in priors {
                marks.entry(*prior).or_default().insert(team.clone());
            }
        }
    }

    let plan = ScoutingPlan::from_map(marks, cursor);
    debug!(
        "Planned scouting for {} matches from match {} for team {}",
        plan.blocks.len(),
        cursor,
        home
    );
    plan
}

/// Picklist teams playing in each match at or after `cursor`, in list order.
pub fn picklist_scouting(
    schedule: &[ScheduleRow],
    picklist: &TeamList,
    cursor: u32,
) -> ScoutingPlan {
    let blocks = schedule
        .iter()
        .filter(|row| row.match_number >= cursor)
        .filter_map(|row| {
            let present: Vec<TeamId> = picklist
                .iter()
                .filter(|team| row.teams().any(|t| t == *team))
                .cloned()
                .collect();
            (!present.is_empty()).then_some(ScoutingBlock {
                match_number: row.match_number,
                teams: present,
            })
        })
        .collect();

    ScoutingPlan { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(teams: &[&str]) -> Vec<TeamId> {
        teams.iter().map(|t| TeamId::from(*t)).collect()
    }

    fn row(n: u32, red: &[&str], blue: &[&str]) -> ScheduleRow {
        ScheduleRow {
            match_number: n,
            red: ids(red),
            blue: ids(blue),
        }
    }

    fn schedule() -> Vec<ScheduleRow> {
        vec![
            row(1, &["10", "20", "30"], &["40", "50", "60"]),
            row(2, &["10", "70", "80"], &["20", "90", "100"]),
            row(3, &["10", "40", "110"], &["120", "130", "140"]),
            row(4, &["226", "10", "20"], &["40", "150", "160"]),
        ]
    }

    fn block(plan: &ScoutingPlan, n: u32) -> Option<Vec<&str>> {
        plan.blocks
            .iter()
            .find(|b| b.match_number == n)
            .map(|b| b.teams.iter().map(|t| t.as_str()).collect())
    }

    #[test]
    fn test_two_most_recent_priors() {
        let plan = scouting_assignments(&schedule(), &"226".into(), 1);

        // Team 10 played 1, 2 and 3 before match 4; only 2 and 3 count
        assert_eq!(block(&plan, 3), Some(vec!["10", "40"]));
        assert_eq!(block(&plan, 2), Some(vec!["10", "20"]));
        assert_eq!(block(&plan, 1), Some(vec!["20", "40"]));
        assert_eq!(block(&plan, 4), None);
    }

    #[test]
    fn test_single_prior_is_all_that_counts() {
        let schedule = vec![
            row(1, &["7", "1", "2"], &["3", "4", "5"]),
            row(2, &["226", "7", "8"], &["9", "11", "12"]),
        ];
        let plan = scouting_assignments(&schedule, &"226".into(), 1);

        // Team 7 played once before match 2, so only match 1 is marked
        assert_eq!(
            plan.blocks,
            vec![ScoutingBlock {
                match_number: 1,
                teams: ids(&["7"]),
            }]
        );
    }

    #[test]
    fn test_teams_without_priors_contribute_nothing() {
        let plan = scouting_assignments(&schedule(), &"226".into(), 1);
        let all: Vec<&str> = plan
            .blocks
            .iter()
            .flat_map(|b| b.teams.iter().map(|t| t.as_str()))
            .collect();
        assert!(!all.contains(&"150"));
        assert!(!all.contains(&"160"));
    }

    #[test]
    fn test_cursor_bounds_output() {
        let plan = scouting_assignments(&schedule(), &"226".into(), 3);
        let numbers: Vec<u32> = plan.blocks.iter().map(|b| b.match_number).collect();
        assert_eq!(numbers, vec![3]);
    }

    #[test]
    fn test_deterministic() {
        let a = scouting_assignments(&schedule(), &"226".into(), 1);
        let b = scouting_assignments(&schedule(), &"226".into(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_home_team_absent() {
        assert!(scouting_assignments(&schedule(), &"9999".into(), 1).is_empty());
    }

    #[test]
    fn test_home_matches() {
        let matches = home_matches(&schedule(), &"10".into(), 2);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].match_number, 2);
        assert_eq!(matches[0].alliance, Alliance::Red);
        assert_eq!(matches[0].partners, ids(&["70", "80"]));
        assert_eq!(matches[0].opponents, ids(&["20", "90", "100"]));
    }

    #[test]
    fn test_picklist_scouting() {
        let picklist: TeamList = ids(&["40", "20"]).into_iter().collect();
        let plan = picklist_scouting(&schedule(), &picklist, 2);

        assert_eq!(block(&plan, 1), None);
        assert_eq!(block(&plan, 2), Some(vec!["20"]));
        assert_eq!(block(&plan, 3), Some(vec!["40"]));
        assert_eq!(block(&plan, 4), Some(vec!["20", "40"]));
    }
}
