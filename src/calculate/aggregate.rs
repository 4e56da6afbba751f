//! Team aggregation: one `TeamStatistics` per team in the match data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Capabilities, Dataset, MatchRecord, TeamId, TeamStatistics, Visibility};

use super::extract;

/// Group match rows by team, preserving first-appearance order.
pub fn group_by_team<'a, I>(records: I) -> Vec<(TeamId, Vec<&'a MatchRecord>)>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut index: HashMap<TeamId, usize> = HashMap::new();
    let mut groups: Vec<(TeamId, Vec<&MatchRecord>)> = Vec::new();

    for record in records {
        match index.get(&record.team) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(record.team.clone(), groups.len());
                groups.push((record.team.clone(), vec![record]));
            }
        }
    }

    groups
}

/// Run every extractor over one team's rows and join pit and OPR data.
pub fn build_statistics(team: TeamId, records: &[&MatchRecord], data: &Dataset) -> TeamStatistics {
    let opr = data.opr(&team);
    let capabilities = data.pit(&team).map(Capabilities::from).unwrap_or_default();
    let avg_total_points = extract::avg_total_points(records);

    TeamStatistics {
        match_count: records.len() as u32,
        avg_total_points,
        epa: avg_total_points + opr.total,
        opr,
        auto_climb: extract::auto_climb_counts(records),
        tele_climb: extract::tele_climb_counts(records),
        climb_success_rate: extract::climb_success_rate(records),
        most_common_climb: extract::most_common_climb(records),
        climb_time_per_level: extract::climb_time_per_level(records),
        climb_time_by_level: extract::climb_time_by_level(records),
        avg_climb_points: extract::avg_climb_points(records),
        stuck_on_bar: extract::stuck_on_bar(records),
        shooting_accuracy: extract::shooting_accuracy(records),
        driver_skill: extract::driver_skill(records),
        defense_rating_count: extract::defense_rating_count(records),
        max_defense_rating: extract::max_defense_rating(records),
        avg_defense_rating: extract::avg_defense_rating(records),
        died_rate: extract::died_rate(records),
        death_matches: extract::death_matches(records),
        capabilities,
        team,
    }
}

/// Statistics for every visible team with at least one match row.
pub fn aggregate_teams(data: &Dataset, visibility: &Visibility) -> Vec<TeamStatistics> {
    let stats: Vec<TeamStatistics> = group_by_team(&data.matches)
        .into_iter()
        .filter(|(team, _)| visibility.is_visible(team))
        .map(|(team, records)| build_statistics(team, &records, data))
        .collect();

    debug!("Aggregated statistics for {} teams", stats.len());
    stats
}

/// Statistics for one team, ignoring visibility. `None` when the team has
/// no match rows.
pub fn team_statistics(team: &TeamId, data: &Dataset) -> Option<TeamStatistics> {
    let records: Vec<&MatchRecord> = data.matches_for(team).collect();
    if records.is_empty() {
        return None;
    }
    Some(build_statistics(team.clone(), &records, data))
}

/// One row of an overview leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub team: TeamId,
    pub value: f64,
    pub is_home: bool,
    pub is_highlighted: bool,
}

/// Event-wide leaderboards, unaffected by hide/isolate state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Highest match number in the event data
    pub latest_match: Option<u32>,
    pub epa: Vec<LeaderboardEntry>,
    pub opr: Vec<LeaderboardEntry>,
}

fn sort_descending(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
}

pub fn overview(data: &Dataset, home: &TeamId, highlight: Option<&TeamId>) -> Overview {
    let entry = |team: &TeamId, value: f64| LeaderboardEntry {
        team: team.clone(),
        value,
        is_home: team == home,
        is_highlighted: highlight == Some(team),
    };

    let mut epa: Vec<LeaderboardEntry> = aggregate_teams(data, &Visibility::default())
        .iter()
        .map(|s| entry(&s.team, s.epa))
        .collect();
    sort_descending(&mut epa);

    let mut opr: Vec<LeaderboardEntry> = data
        .opr_records()
        .map(|r| entry(&r.team, r.total_opr))
        .collect();
    // Ratings come from a map; order by team first so ties are stable.
    opr.sort_by(|a, b| a.team.cmp(&b.team));
    sort_descending(&mut opr);

    Overview {
        latest_match: data.latest_match(),
        epa,
        opr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OprRecord, PitRecord, TeamList};
    use pretty_assertions::assert_eq;

    fn row(team: &str, points: Option<f64>) -> MatchRecord {
        let mut r = MatchRecord::new(team.into());
        r.total_points = points;
        r
    }

    fn opr(team: &str, total: f64) -> OprRecord {
        OprRecord {
            team: team.into(),
            auto_opr: 1.0,
            tele_opr: total - 1.0,
            total_opr: total,
        }
    }

    #[test]
    fn test_epa_ignores_missing_points() {
        let data = Dataset::new(
            vec![row("226", Some(10.0)), row("226", Some(20.0)), row("226", None)],
            Vec::new(),
            vec![opr("226", 5.0)],
            Vec::new(),
        );
        let stats = aggregate_teams(&data, &Visibility::default());

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].match_count, 3);
        assert!((stats[0].epa - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_missing_opr_and_pit_default() {
        let data = Dataset::from_matches(vec![row("254", Some(12.0))]);
        let stats = aggregate_teams(&data, &Visibility::default());

        assert_eq!(stats[0].opr.total, 0.0);
        assert_eq!(stats[0].epa, 12.0);
        assert_eq!(stats[0].capabilities, Capabilities::default());
    }

    #[test]
    fn test_pit_capabilities_joined() {
        let pit = PitRecord {
            team: "226".into(),
            trench: true,
            ground_intake: true,
            shoot_on_fly: false,
            drivetrain: Some("Swerve".to_string()),
        };
        let data = Dataset::new(vec![row("226", None)], vec![pit], Vec::new(), Vec::new());
        let stats = team_statistics(&"226".into(), &data).unwrap();

        assert!(stats.capabilities.trench);
        assert!(stats.capabilities.swerve);
    }

    #[test]
    fn test_groups_preserve_first_appearance() {
        let data = Dataset::from_matches(vec![
            row("33", None),
            row("226", None),
            row("33", None),
        ]);
        let teams: Vec<String> = aggregate_teams(&data, &Visibility::default())
            .into_iter()
            .map(|s| s.team.to_string())
            .collect();
        assert_eq!(teams, vec!["33", "226"]);
    }

    #[test]
    fn test_hidden_teams_excluded() {
        let data = Dataset::from_matches(vec![row("226", None), row("254", None)]);
        let visibility = Visibility {
            hidden: vec![TeamId::from("226")].into_iter().collect::<TeamList>(),
            ..Default::default()
        };
        let stats = aggregate_teams(&data, &visibility);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].team.as_str(), "254");
    }

    #[test]
    fn test_team_statistics_absent_team() {
        let data = Dataset::from_matches(vec![row("226", Some(1.0))]);
        assert!(team_statistics(&"9999".into(), &data).is_none());
    }

    #[test]
    fn test_overview_flags_and_order() {
        let mut m = row("226", Some(10.0));
        m.match_number = Some(12);
        let data = Dataset::new(
            vec![m, row("254", Some(40.0))],
            Vec::new(),
            vec![opr("226", 30.0), opr("254", 15.0)],
            Vec::new(),
        );
        let ov = overview(&data, &"226".into(), Some(&"254".into()));

        assert_eq!(ov.latest_match, Some(12));
        assert_eq!(ov.epa[0].team.as_str(), "254");
        assert!(ov.epa[0].is_highlighted);
        assert!(ov.epa[1].is_home);
        assert_eq!(ov.opr[0].team.as_str(), "226");
        assert_eq!(ov.opr[0].value, 30.0);
    }
}
