//! Derived per-team statistics.

use serde::{Deserialize, Serialize};

use super::{ClimbLevel, OprRecord, PitRecord, TeamId};

/// OPR components as ingested from the ratings CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OprBreakdown {
    pub auto: f64,
    pub tele: f64,
    pub total: f64,
}

impl From<&OprRecord> for OprBreakdown {
    fn from(record: &OprRecord) -> Self {
        Self {
            auto: record.auto_opr,
            tele: record.tele_opr,
            total: record.total_opr,
        }
    }
}

/// Pit-survey capabilities. Teams without a survey report everything false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub trench: bool,
    pub ground_intake: bool,
    pub shoot_on_fly: bool,
    pub swerve: bool,
    pub drivetrain: Option<String>,
}

impl From<&PitRecord> for Capabilities {
    fn from(pit: &PitRecord) -> Self {
        Self {
            trench: pit.trench,
            ground_intake: pit.ground_intake,
            shoot_on_fly: pit.shoot_on_fly,
            swerve: pit.has_swerve(),
            drivetrain: pit.drivetrain.clone(),
        }
    }
}

/// Attempt/success counts for one phase's climbs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimbCounts {
    pub attempts: u32,
    pub successes: u32,
}

/// Average climb duration per level; `None` when the level was never timed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTimes {
    pub l1: Option<f64>,
    pub l2: Option<f64>,
    pub l3: Option<f64>,
}

impl LevelTimes {
    pub fn get(&self, level: ClimbLevel) -> Option<f64> {
        match level {
            ClimbLevel::L1 => self.l1,
            ClimbLevel::L2 => self.l2,
            ClimbLevel::L3 => self.l3,
        }
    }
}

/// Aggregated statistics for one team.
///
/// Averages only cover matches where the underlying value was present;
/// counts cover every match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team: TeamId,

    /// Number of scouted match rows
    pub match_count: u32,

    /// Average of Total Points over rows that recorded it
    pub avg_total_points: f64,

    /// Average points plus Total OPR
    pub epa: f64,

    pub opr: OprBreakdown,

    pub auto_climb: ClimbCounts,
    pub tele_climb: ClimbCounts,

    /// Teleop climb success percentage (0-100, one decimal)
    pub climb_success_rate: f64,

    pub most_common_climb: Option<ClimbLevel>,

    /// Mean positive climb time per level (one decimal)
    pub climb_time_per_level: f64,

    pub climb_time_by_level: LevelTimes,

    /// Average auto climb points plus average teleop climb points
    pub avg_climb_points: f64,

    pub stuck_on_bar: u32,

    pub shooting_accuracy: f64,

    /// Mean of non-zero driver ratings (one decimal)
    pub driver_skill: f64,

    pub defense_rating_count: u32,
    pub max_defense_rating: f64,
    pub avg_defense_rating: f64,

    /// Percentage of matches the robot died or was immobilized (one decimal)
    pub died_rate: f64,

    /// Match numbers the robot died in, ascending
    pub death_matches: Vec<u32>,

    pub capabilities: Capabilities,
}
