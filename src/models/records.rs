//! Typed rows for the four CSV datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::{
    field, parse_flag, parse_number, parse_rating, ClimbResult, CsvRow, FieldPosition,
};
use super::TeamId;

/// Header spellings accepted for the team number column.
pub const TEAM_HEADERS: &[&str] = &["Team Number", "Team No."];
const MATCH: &[&str] = &["Match Number", "Match"];
const TOTAL_POINTS: &[&str] = &["Total Points", "Total Score"];
const CLIMB_TELEOP: &[&str] = &["Climb Teleop", "Climb Score"];
const CLIMB_TIME: &[&str] = &["Climb Time", "Climb Time per Level"];
const ROBOT_DIED: &[&str] = &["Robot Died", "Died or Immobilized"];
const ROBOT_DEFENSE: &[&str] = &["Robot Defense", "Defense Rating"];

/// One row of event scouting: a single robot in a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub team: TeamId,
    pub match_number: Option<u32>,
    pub total_points: Option<f64>,
    pub climb_auto: Option<ClimbResult>,
    pub climb_teleop: Option<ClimbResult>,
    /// Time to complete the recorded teleop climb
    pub climb_time: Option<f64>,
    pub climb_time_per_level: Option<f64>,
    pub climb_position: Option<FieldPosition>,
    pub starting_position: Option<FieldPosition>,
    pub auto_climb_points: Option<f64>,
    pub tele_climb_points: Option<f64>,
    /// 1 = died, 0.5 = immobilized for part of the match
    pub robot_died: Option<f64>,
    pub robot_defense: Option<f64>,
    /// Raw cell; a non-blank value means a defense rating was recorded
    pub defense_on_robot: Option<String>,
    pub shooting_accuracy: Option<f64>,
    pub stuck_on_bar: Option<f64>,
    pub driver_skill: Option<f64>,
    pub travel_string: Option<String>,
    pub fuel_collection_string: Option<String>,
    pub comments: Option<String>,
}

impl MatchRecord {
    /// A record for `team` with every measurement absent.
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            match_number: None,
            total_points: None,
            climb_auto: None,
            climb_teleop: None,
            climb_time: None,
            climb_time_per_level: None,
            climb_position: None,
            starting_position: None,
            auto_climb_points: None,
            tele_climb_points: None,
            robot_died: None,
            robot_defense: None,
            defense_on_robot: None,
            shooting_accuracy: None,
            stuck_on_bar: None,
            driver_skill: None,
            travel_string: None,
            fuel_collection_string: None,
            comments: None,
        }
    }

    /// Rows without a team number carry nothing to aggregate and are dropped.
    pub fn from_row(row: &CsvRow) -> Option<Self> {
        let number = |aliases: &[&str]| field(row, aliases).and_then(parse_number);
        let text = |aliases: &[&str]| field(row, aliases).map(str::to_string);

        Some(Self {
            team: field(row, TEAM_HEADERS).and_then(TeamId::normalize)?,
            match_number: field(row, MATCH).and_then(parse_match_number),
            total_points: number(TOTAL_POINTS),
            climb_auto: field(row, &["Climb Auto"]).and_then(ClimbResult::parse),
            climb_teleop: field(row, CLIMB_TELEOP).and_then(ClimbResult::parse),
            climb_time: number(CLIMB_TIME),
            climb_time_per_level: number(&["Climb Time per Level"]),
            climb_position: field(row, &["Climb Position"]).and_then(FieldPosition::parse),
            starting_position: field(row, &["Starting Position"]).and_then(FieldPosition::parse),
            auto_climb_points: number(&["Auto Climb Points"]),
            tele_climb_points: number(&["Tele Climb Points"]),
            robot_died: field(row, ROBOT_DIED).and_then(parse_died),
            robot_defense: number(ROBOT_DEFENSE),
            defense_on_robot: text(&["Defense On Robot"]),
            shooting_accuracy: number(&["Shooting Accuracy"]),
            stuck_on_bar: number(&["Stuck On Bar"]),
            driver_skill: number(&["Driver Skill"]),
            travel_string: text(&["Travel String"]),
            fuel_collection_string: text(&["Fuel Collection String"]),
            comments: text(&["Comments"]),
        })
    }

    /// True when the died indicator is exactly 0.5 or 1.
    pub fn died(&self) -> bool {
        matches!(self.robot_died, Some(v) if v == 0.5 || v == 1.0)
    }
}

/// Match numbers are sometimes prefixed (`Q12`); keep the digits only.
pub fn parse_match_number(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn parse_died(raw: &str) -> Option<f64> {
    if raw.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else {
        parse_number(raw)
    }
}

/// Pit scouting survey for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitRecord {
    pub team: TeamId,
    pub trench: bool,
    pub ground_intake: bool,
    pub shoot_on_fly: bool,
    pub drivetrain: Option<String>,
}

impl PitRecord {
    pub fn from_row(row: &CsvRow) -> Option<Self> {
        let flag = |key: &str| field(row, &[key]).map(parse_flag).unwrap_or(false);
        Some(Self {
            team: field(row, TEAM_HEADERS).and_then(TeamId::normalize)?,
            trench: flag("Trench"),
            ground_intake: flag("Ground Intake"),
            shoot_on_fly: flag("Shoot on Fly"),
            drivetrain: field(row, &["Drivetrain"]).map(str::to_string),
        })
    }

    pub fn has_swerve(&self) -> bool {
        self.drivetrain
            .as_deref()
            .is_some_and(|d| d.to_ascii_lowercase().contains("swerve"))
    }
}

/// Externally computed offensive power ratings for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OprRecord {
    pub team: TeamId,
    pub auto_opr: f64,
    pub tele_opr: f64,
    pub total_opr: f64,
}

impl OprRecord {
    pub fn from_row(row: &CsvRow) -> Option<Self> {
        let rating = |key: &str| field(row, &[key]).map(parse_rating).unwrap_or(0.0);
        Some(Self {
            team: field(row, TEAM_HEADERS).and_then(TeamId::normalize)?,
            auto_opr: rating("Auto OPR"),
            tele_opr: rating("Tele OPR"),
            total_opr: rating("Total OPR"),
        })
    }
}

/// Alliance colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub fn opponent(&self) -> Alliance {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alliance::Red => write!(f, "RED"),
            Alliance::Blue => write!(f, "BLUE"),
        }
    }
}

/// One qualification match in the published schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub match_number: u32,
    pub red: Vec<TeamId>,
    pub blue: Vec<TeamId>,
}

impl ScheduleRow {
    /// Rows without a numeric match number are dropped; blank slots are skipped.
    pub fn from_row(row: &CsvRow) -> Option<Self> {
        let match_number = field(row, &["Match Number"])?.parse().ok()?;
        let slots = |prefix: &str| -> Vec<TeamId> {
            (1..=3)
                .filter_map(|i| {
                    let key = format!("{prefix} {i}");
                    field(row, &[key.as_str()]).and_then(TeamId::normalize)
                })
                .collect()
        };
        Some(Self {
            match_number,
            red: slots("Red"),
            blue: slots("Blue"),
        })
    }

    pub fn alliance(&self, color: Alliance) -> &[TeamId] {
        match color {
            Alliance::Red => &self.red,
            Alliance::Blue => &self.blue,
        }
    }

    /// Which alliance a team plays on, if it is in this match.
    pub fn alliance_of(&self, team: &TeamId) -> Option<Alliance> {
        if self.red.contains(team) {
            Some(Alliance::Red)
        } else if self.blue.contains(team) {
            Some(Alliance::Blue)
        } else {
            None
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamId> {
        self.red.iter().chain(self.blue.iter())
    }
}
