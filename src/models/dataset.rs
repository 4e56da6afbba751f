//! The parsed record set every calculation reads from.

use std::collections::HashMap;

use super::{MatchRecord, OprBreakdown, OprRecord, PitRecord, ScheduleRow, TeamId};

/// All four datasets, parsed and keyed for joins.
///
/// Built fresh from the stored CSV text on every request; nothing derived from
/// it is cached.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub matches: Vec<MatchRecord>,
    pub schedule: Vec<ScheduleRow>,
    pit: HashMap<TeamId, PitRecord>,
    opr: HashMap<TeamId, OprRecord>,
}

impl Dataset {
    /// Assemble a dataset. Duplicate pit or OPR rows keep the first occurrence.
    pub fn new(
        matches: Vec<MatchRecord>,
        pit: Vec<PitRecord>,
        opr: Vec<OprRecord>,
        schedule: Vec<ScheduleRow>,
    ) -> Self {
        let mut pit_index = HashMap::new();
        for record in pit {
            pit_index.entry(record.team.clone()).or_insert(record);
        }

        let mut opr_index = HashMap::new();
        for record in opr {
            opr_index.entry(record.team.clone()).or_insert(record);
        }

        let mut schedule = schedule;
        schedule.sort_by_key(|row| row.match_number);

        Self {
            matches,
            schedule,
            pit: pit_index,
            opr: opr_index,
        }
    }

    /// A dataset holding only match rows.
    pub fn from_matches(matches: Vec<MatchRecord>) -> Self {
        Self::new(matches, Vec::new(), Vec::new(), Vec::new())
    }

    pub fn pit(&self, team: &TeamId) -> Option<&PitRecord> {
        self.pit.get(team)
    }

    /// OPR for a team; all zero when the team has no rating row.
    pub fn opr(&self, team: &TeamId) -> OprBreakdown {
        self.opr.get(team).map(OprBreakdown::from).unwrap_or_default()
    }

    pub fn opr_records(&self) -> impl Iterator<Item = &OprRecord> {
        self.opr.values()
    }

    /// Match rows for one team, in file order.
    pub fn matches_for<'a>(&'a self, team: &'a TeamId) -> impl Iterator<Item = &'a MatchRecord> {
        self.matches.iter().filter(move |m| &m.team == team)
    }

    pub fn has_team(&self, team: &TeamId) -> bool {
        self.matches.iter().any(|m| &m.team == team)
    }

    pub fn schedule_match(&self, match_number: u32) -> Option<&ScheduleRow> {
        self.schedule
            .iter()
            .find(|row| row.match_number == match_number)
    }

    /// Highest match number present in the event data.
    pub fn latest_match(&self) -> Option<u32> {
        self.matches.iter().filter_map(|m| m.match_number).max()
    }
}
