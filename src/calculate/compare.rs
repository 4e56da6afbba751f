//! Head-to-head comparison with two independent slots.

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, TeamId, TeamStatistics};

use super::team_statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Right,
}

/// What a comparison slot currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotResult {
    #[default]
    Empty,
    Found(Box<TeamStatistics>),
    /// The team has no rows in the loaded match data
    NoData { team: TeamId },
}

impl SlotResult {
    /// Look up one team over the full, unfiltered match data.
    pub fn lookup(team: &TeamId, data: &Dataset) -> Self {
        match team_statistics(team, data) {
            Some(stats) => SlotResult::Found(Box::new(stats)),
            None => SlotResult::NoData { team: team.clone() },
        }
    }

    pub fn statistics(&self) -> Option<&TeamStatistics> {
        match self {
            SlotResult::Found(stats) => Some(&**stats),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: SlotResult,
    pub right: SlotResult,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one slot's result; the other slot is untouched.
    pub fn search(&mut self, slot: Slot, team: &TeamId, data: &Dataset) -> &SlotResult {
        let result = SlotResult::lookup(team, data);
        let target = match slot {
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        };
        *target = result;
        target
    }

    pub fn slot(&self, slot: Slot) -> &SlotResult {
        match slot {
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }
}
