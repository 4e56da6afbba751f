//! Metric extractors over one team's match rows.

use crate::models::{ClimbCounts, ClimbLevel, ClimbResult, LevelTimes, MatchRecord};

use super::{average_present, percentage, round1};

/// Average Total Points over rows that recorded it.
pub fn avg_total_points(records: &[&MatchRecord]) -> f64 {
    average_present(records.iter().map(|r| r.total_points))
}

fn climb_counts<F>(records: &[&MatchRecord], phase: F) -> ClimbCounts
where
    F: Fn(&MatchRecord) -> Option<ClimbResult>,
{
    let mut counts = ClimbCounts::default();
    for result in records.iter().filter_map(|r| phase(r)) {
        if result.is_attempt() {
            counts.attempts += 1;
        }
        if result.level().is_some() {
            counts.successes += 1;
        }
    }
    counts
}

pub fn auto_climb_counts(records: &[&MatchRecord]) -> ClimbCounts {
    climb_counts(records, |r| r.climb_auto)
}

pub fn tele_climb_counts(records: &[&MatchRecord]) -> ClimbCounts {
    climb_counts(records, |r| r.climb_teleop)
}

/// Teleop climb successes over attempts, as a percentage.
pub fn climb_success_rate(records: &[&MatchRecord]) -> f64 {
    let counts = tele_climb_counts(records);
    percentage(counts.successes, counts.attempts)
}

/// Share of all rows where the robot died or was immobilized.
pub fn died_rate(records: &[&MatchRecord]) -> f64 {
    let died = records.iter().filter(|r| r.died()).count() as u32;
    percentage(died, records.len() as u32)
}

/// Match numbers the robot died in, ascending and deduplicated.
pub fn death_matches(records: &[&MatchRecord]) -> Vec<u32> {
    let mut matches: Vec<u32> = records
        .iter()
        .filter(|r| r.died())
        .filter_map(|r| r.match_number)
        .collect();
    matches.sort_unstable();
    matches.dedup();
    matches
}

/// Most frequently reached teleop level. Ties go to the higher level.
pub fn most_common_climb(records: &[&MatchRecord]) -> Option<ClimbLevel> {
    let count = |level: ClimbLevel| {
        records
            .iter()
            .filter(|r| r.climb_teleop.and_then(|c| c.level()) == Some(level))
            .count()
    };

    let mut best = None;
    let mut best_count = 0;
    for level in ClimbLevel::ALL {
        let n = count(level);
        if n > 0 && n >= best_count {
            best = Some(level);
            best_count = n;
        }
    }
    best
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// Mean of positive "Climb Time per Level" values.
pub fn climb_time_per_level(records: &[&MatchRecord]) -> f64 {
    round1(average_present(
        records.iter().map(|r| positive(r.climb_time_per_level)),
    ))
}

/// Mean positive climb time for rows whose teleop climb reached each level.
pub fn climb_time_by_level(records: &[&MatchRecord]) -> LevelTimes {
    let level_time = |level: ClimbLevel| {
        let times: Vec<f64> = records
            .iter()
            .filter(|r| r.climb_teleop.and_then(|c| c.level()) == Some(level))
            .filter_map(|r| positive(r.climb_time))
            .collect();
        if times.is_empty() {
            None
        } else {
            Some(round1(times.iter().sum::<f64>() / times.len() as f64))
        }
    };

    LevelTimes {
        l1: level_time(ClimbLevel::L1),
        l2: level_time(ClimbLevel::L2),
        l3: level_time(ClimbLevel::L3),
    }
}

/// Average auto climb points plus average teleop climb points.
pub fn avg_climb_points(records: &[&MatchRecord]) -> f64 {
    average_present(records.iter().map(|r| r.auto_climb_points))
        + average_present(records.iter().map(|r| r.tele_climb_points))
}

/// Total times stuck on the bar; fractional cells are truncated and the
/// total saturates at `u32::MAX`.
pub fn stuck_on_bar(records: &[&MatchRecord]) -> u32 {
    records
        .iter()
        .filter_map(|r| r.stuck_on_bar)
        .filter(|v| *v > 0.0)
        .map(|v| v.trunc() as u32)
        .fold(0, u32::saturating_add)
}

pub fn shooting_accuracy(records: &[&MatchRecord]) -> f64 {
    average_present(records.iter().map(|r| r.shooting_accuracy))
}

/// Shooting accuracy over cells on the 0-3 rating scale only.
pub fn rated_shooting_accuracy(records: &[&MatchRecord]) -> f64 {
    average_present(records.iter().map(|r| {
        r.shooting_accuracy
            .filter(|v| [0.0, 1.0, 2.0, 3.0].contains(v))
    }))
}

/// Mean of non-zero driver ratings.
pub fn driver_skill(records: &[&MatchRecord]) -> f64 {
    round1(average_present(
        records.iter().map(|r| r.driver_skill.filter(|v| *v != 0.0)),
    ))
}

/// Rows where a defense-on-robot rating was recorded.
pub fn defense_rating_count(records: &[&MatchRecord]) -> u32 {
    records
        .iter()
        .filter(|r| r.defense_on_robot.is_some())
        .count() as u32
}

pub fn max_defense_rating(records: &[&MatchRecord]) -> f64 {
    records
        .iter()
        .filter_map(|r| r.robot_defense)
        .fold(0.0, f64::max)
}

/// Mean of positive defense ratings.
pub fn avg_defense_rating(records: &[&MatchRecord]) -> f64 {
    average_present(records.iter().map(|r| positive(r.robot_defense)))
}
