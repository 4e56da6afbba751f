//! Capability filter: partitions teams into matching and non-matching sets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    Capabilities, ClimbLevel, ClimbResult, Dataset, FieldPosition, MatchRecord, TeamId, TeamList,
};

use super::aggregate::{build_statistics, group_by_team};
use super::round1;

/// Groups of related filter flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterGroup {
    Auto,
    ClimbLevel,
    ClimbPosition,
    Robot,
}

impl FilterGroup {
    pub const ALL: [FilterGroup; 4] = [
        FilterGroup::Auto,
        FilterGroup::ClimbLevel,
        FilterGroup::ClimbPosition,
        FilterGroup::Robot,
    ];

    /// Robot capabilities must all hold; every other group needs any one.
    pub fn requires_all(&self) -> bool {
        matches!(self, FilterGroup::Robot)
    }
}

/// A selectable filter token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterFlag {
    AutoClimb,
    AutoCenter,
    AutoDepot,
    AutoOutpost,
    ClimbLevel1,
    ClimbLevel2,
    ClimbLevel3,
    ClimbPositionCenter,
    ClimbPositionDepot,
    ClimbPositionOutpost,
    Swerve,
    Trench,
    ShootOnFly,
    GroundIntake,
}

impl FilterFlag {
    pub const ALL: [FilterFlag; 14] = [
        FilterFlag::AutoClimb,
        FilterFlag::AutoCenter,
        FilterFlag::AutoDepot,
        FilterFlag::AutoOutpost,
        FilterFlag::ClimbLevel1,
        FilterFlag::ClimbLevel2,
        FilterFlag::ClimbLevel3,
        FilterFlag::ClimbPositionCenter,
        FilterFlag::ClimbPositionDepot,
        FilterFlag::ClimbPositionOutpost,
        FilterFlag::Swerve,
        FilterFlag::Trench,
        FilterFlag::ShootOnFly,
        FilterFlag::GroundIntake,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            FilterFlag::AutoClimb => "autoClimb",
            FilterFlag::AutoCenter => "autoCenter",
            FilterFlag::AutoDepot => "autoDepot",
            FilterFlag::AutoOutpost => "autoOutpost",
            FilterFlag::ClimbLevel1 => "climbLevel1",
            FilterFlag::ClimbLevel2 => "climbLevel2",
            FilterFlag::ClimbLevel3 => "climbLevel3",
            FilterFlag::ClimbPositionCenter => "climbPositionCenter",
            FilterFlag::ClimbPositionDepot => "climbPositionDepot",
            FilterFlag::ClimbPositionOutpost => "climbPositionOutpost",
            FilterFlag::Swerve => "swerve",
            FilterFlag::Trench => "trench",
            FilterFlag::ShootOnFly => "shootOnFly",
            FilterFlag::GroundIntake => "groundIntake",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }

    pub fn group(&self) -> FilterGroup {
        match self {
            FilterFlag::AutoClimb
            | FilterFlag::AutoCenter
            | FilterFlag::AutoDepot
            | FilterFlag::AutoOutpost => FilterGroup::Auto,
            FilterFlag::ClimbLevel1 | FilterFlag::ClimbLevel2 | FilterFlag::ClimbLevel3 => {
                FilterGroup::ClimbLevel
            }
            FilterFlag::ClimbPositionCenter
            | FilterFlag::ClimbPositionDepot
            | FilterFlag::ClimbPositionOutpost => FilterGroup::ClimbPosition,
            FilterFlag::Swerve
            | FilterFlag::Trench
            | FilterFlag::ShootOnFly
            | FilterFlag::GroundIntake => FilterGroup::Robot,
        }
    }
}

/// Parse tokens, skipping unknown ones.
pub fn parse_flags<'a, I>(tokens: I) -> Vec<FilterFlag>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(str::trim)
        .filter_map(FilterFlag::parse)
        .collect()
}

/// Which filter flags hold for one team, from its match rows and pit survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamFlags {
    pub auto_climb: bool,
    pub auto_starts: Vec<FieldPosition>,
    pub climb_levels: Vec<ClimbLevel>,
    pub climb_positions: Vec<FieldPosition>,
    pub capabilities: Capabilities,
}

impl TeamFlags {
    pub fn from_records(records: &[&MatchRecord], capabilities: Capabilities) -> Self {
        let mut flags = TeamFlags {
            capabilities,
            ..Default::default()
        };

        for record in records {
            if matches!(record.climb_auto, Some(ClimbResult::Reached(_))) {
                flags.auto_climb = true;
            }
            if let Some(pos) = record.starting_position {
                if !flags.auto_starts.contains(&pos) {
                    flags.auto_starts.push(pos);
                }
            }
            if let Some(level) = record.climb_teleop.and_then(|c| c.level()) {
                if !flags.climb_levels.contains(&level) {
                    flags.climb_levels.push(level);
                }
            }
            if let Some(pos) = record.climb_position {
                if !flags.climb_positions.contains(&pos) {
                    flags.climb_positions.push(pos);
                }
            }
        }

        flags
    }

    pub fn has(&self, flag: FilterFlag) -> bool {
        match flag {
            FilterFlag::AutoClimb => self.auto_climb,
            FilterFlag::AutoCenter => self.auto_starts.contains(&FieldPosition::Center),
            FilterFlag::AutoDepot => self.auto_starts.contains(&FieldPosition::Depot),
            FilterFlag::AutoOutpost => self.auto_starts.contains(&FieldPosition::Outpost),
            FilterFlag::ClimbLevel1 => self.climb_levels.contains(&ClimbLevel::L1),
            FilterFlag::ClimbLevel2 => self.climb_levels.contains(&ClimbLevel::L2),
            FilterFlag::ClimbLevel3 => self.climb_levels.contains(&ClimbLevel::L3),
            FilterFlag::ClimbPositionCenter => {
                self.climb_positions.contains(&FieldPosition::Center)
            }
            FilterFlag::ClimbPositionDepot => self.climb_positions.contains(&FieldPosition::Depot),
            FilterFlag::ClimbPositionOutpost => {
                self.climb_positions.contains(&FieldPosition::Outpost)
            }
            FilterFlag::Swerve => self.capabilities.swerve,
            FilterFlag::Trench => self.capabilities.trench,
            FilterFlag::ShootOnFly => self.capabilities.shoot_on_fly,
            FilterFlag::GroundIntake => self.capabilities.ground_intake,
        }
    }

    /// True when every group with a selection is satisfied.
    pub fn passes(&self, selected: &[FilterFlag]) -> bool {
        FilterGroup::ALL.iter().all(|group| {
            let mut in_group = selected.iter().filter(|f| f.group() == *group).peekable();
            if in_group.peek().is_none() {
                return true;
            }
            if group.requires_all() {
                in_group.all(|f| self.has(*f))
            } else {
                in_group.any(|f| self.has(*f))
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Epa,
    Opr,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epa" => Some(SortKey::Epa),
            "opr" => Some(SortKey::Opr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredTeam {
    pub team: TeamId,
    /// EPA rounded to one decimal
    pub epa: f64,
    pub opr: f64,
    pub is_hidden: bool,
    pub flags: TeamFlags,
}

impl FilteredTeam {
    fn sort_value(&self, key: SortKey) -> f64 {
        match key {
            SortKey::Epa => self.epa,
            SortKey::Opr => self.opr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub matching: Vec<FilteredTeam>,
    pub non_matching: Vec<FilteredTeam>,
}

/// Partition teams by the selected flags. Hidden teams are left out unless
/// `show_hidden` is set, in which case they are tagged.
pub fn filter_teams(
    data: &Dataset,
    selected: &[FilterFlag],
    hidden: &TeamList,
    show_hidden: bool,
    sort: SortKey,
) -> FilterResult {
    let mut result = FilterResult::default();

    for (team, records) in group_by_team(&data.matches) {
        let is_hidden = hidden.contains(&team);
        if is_hidden && !show_hidden {
            continue;
        }

        let stats = build_statistics(team, &records, data);
        let flags = TeamFlags::from_records(&records, stats.capabilities.clone());
        let passes = flags.passes(selected);
        let entry = FilteredTeam {
            team: stats.team,
            epa: round1(stats.epa),
            opr: stats.opr.total,
            is_hidden,
            flags,
        };

        if passes {
            result.matching.push(entry);
        } else {
            result.non_matching.push(entry);
        }
    }

    for list in [&mut result.matching, &mut result.non_matching] {
        list.sort_by(|a, b| b.sort_value(sort).total_cmp(&a.sort_value(sort)));
    }

    debug!(
        "Filter matched {} teams, {} did not match",
        result.matching.len(),
        result.non_matching.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OprRecord, PitRecord};
    use pretty_assertions::assert_eq;

    fn record(team: &str, build: impl FnOnce(&mut MatchRecord)) -> MatchRecord {
        let mut r = MatchRecord::new(team.into());
        build(&mut r);
        r
    }

    fn pit(team: &str, trench: bool) -> PitRecord {
        PitRecord {
            team: team.into(),
            trench,
            ground_intake: false,
            shoot_on_fly: false,
            drivetrain: None,
        }
    }

    fn names(teams: &[FilteredTeam]) -> Vec<&str> {
        teams.iter().map(|t| t.team.as_str()).collect()
    }

    #[test]
    fn test_groups_combine_or_and() {
        // A auto-climbs without a trench; B has a trench but never auto-climbs
        let data = Dataset::new(
            vec![
                record("A", |r| r.climb_auto = ClimbResult::parse("1")),
                record("B", |r| r.climb_auto = ClimbResult::parse("0")),
            ],
            vec![pit("A", false), pit("B", true)],
            Vec::new(),
            Vec::new(),
        );
        let selected = [FilterFlag::AutoClimb, FilterFlag::Trench];
        let result = filter_teams(&data, &selected, &TeamList::new(), false, SortKey::Epa);

        assert!(result.matching.is_empty());
        assert_eq!(result.non_matching.len(), 2);
    }

    #[test]
    fn test_or_within_group() {
        let data = Dataset::from_matches(vec![
            record("226", |r| r.climb_teleop = ClimbResult::parse("1")),
            record("254", |r| r.climb_teleop = ClimbResult::parse("3")),
            record("33", |r| r.climb_teleop = ClimbResult::parse("F")),
        ]);
        let selected = [FilterFlag::ClimbLevel1, FilterFlag::ClimbLevel3];
        let result = filter_teams(&data, &selected, &TeamList::new(), false, SortKey::Epa);

        let mut matching = names(&result.matching);
        matching.sort();
        assert_eq!(matching, vec!["226", "254"]);
        assert_eq!(names(&result.non_matching), vec!["33"]);
    }

    #[test]
    fn test_and_within_robot_group() {
        let mut full = pit("226", true);
        full.shoot_on_fly = true;
        let data = Dataset::new(
            vec![record("226", |_| {}), record("254", |_| {})],
            vec![full, pit("254", true)],
            Vec::new(),
            Vec::new(),
        );
        let selected = [FilterFlag::Trench, FilterFlag::ShootOnFly];
        let result = filter_teams(&data, &selected, &TeamList::new(), false, SortKey::Epa);

        assert_eq!(names(&result.matching), vec!["226"]);
    }

    #[test]
    fn test_no_selection_matches_everyone() {
        let data = Dataset::from_matches(vec![record("226", |_| {}), record("254", |_| {})]);
        let result = filter_teams(&data, &[], &TeamList::new(), false, SortKey::Epa);
        assert_eq!(result.matching.len(), 2);
    }

    #[test]
    fn test_hidden_excluded_unless_shown() {
        let data = Dataset::from_matches(vec![record("226", |_| {}), record("254", |_| {})]);
        let hidden: TeamList = vec![TeamId::from("226")].into_iter().collect();

        let result = filter_teams(&data, &[], &hidden, false, SortKey::Epa);
        assert_eq!(names(&result.matching), vec!["254"]);

        let result = filter_teams(&data, &[], &hidden, true, SortKey::Epa);
        let tagged = result.matching.iter().find(|t| t.team.as_str() == "226").unwrap();
        assert!(tagged.is_hidden);
    }

    #[test]
    fn test_sort_by_opr() {
        let data = Dataset::new(
            vec![
                record("226", |r| r.total_points = Some(50.0)),
                record("254", |r| r.total_points = Some(10.0)),
            ],
            Vec::new(),
            vec![
                OprRecord {
                    team: "226".into(),
                    auto_opr: 0.0,
                    tele_opr: 0.0,
                    total_opr: 1.0,
                },
                OprRecord {
                    team: "254".into(),
                    auto_opr: 0.0,
                    tele_opr: 0.0,
                    total_opr: 9.0,
                },
            ],
            Vec::new(),
        );

        let by_epa = filter_teams(&data, &[], &TeamList::new(), false, SortKey::Epa);
        assert_eq!(names(&by_epa.matching), vec!["226", "254"]);

        let by_opr = filter_teams(&data, &[], &TeamList::new(), false, SortKey::Opr);
        assert_eq!(names(&by_opr.matching), vec!["254", "226"]);
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            parse_flags("autoClimb, swerve,bogus".split(',')),
            vec![FilterFlag::AutoClimb, FilterFlag::Swerve]
        );
    }
}
