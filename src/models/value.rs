//! Cell-level parsing shared by every record type.
//!
//! CSV cells arrive as loosely-typed strings. These helpers are the single
//! place where a cell becomes a number, a flag or an enum; anything that does
//! not parse is reported as absent rather than zero.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One parsed CSV row: header name to trimmed cell text.
pub type CsvRow = HashMap<String, String>;

/// First non-blank value among `aliases`, in order.
pub fn field<'a>(row: &'a CsvRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|key| row.get(*key))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

/// Parse a cell as a finite number. Blank or malformed cells are absent.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a rating cell, discarding everything except digits, `.` and `-`.
/// Ratings exported from spreadsheets often carry stray symbols; a cell that
/// is still unparsable after cleanup counts as 0.
pub fn parse_rating(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    parse_number(&cleaned).unwrap_or(0.0)
}

/// Parse a yes/no capability cell (`1`/`true`).
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true")
}

/// Achievable climb levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimbLevel {
    L1,
    L2,
    L3,
}

impl ClimbLevel {
    pub const ALL: [ClimbLevel; 3] = [ClimbLevel::L1, ClimbLevel::L2, ClimbLevel::L3];

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(ClimbLevel::L1),
            2 => Some(ClimbLevel::L2),
            3 => Some(ClimbLevel::L3),
            _ => None,
        }
    }
}

impl fmt::Display for ClimbLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClimbLevel::L1 => write!(f, "L1"),
            ClimbLevel::L2 => write!(f, "L2"),
            ClimbLevel::L3 => write!(f, "L3"),
        }
    }
}

/// Outcome of one climb as recorded by a scouter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimbResult {
    /// `0`: no climb attempted.
    NotAttempted,
    /// `F`: attempted and failed.
    Failed,
    /// `1`..`3`: reached that level.
    Reached(ClimbLevel),
}

impl ClimbResult {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" => Some(ClimbResult::NotAttempted),
            "F" | "f" => Some(ClimbResult::Failed),
            "1" => Some(ClimbResult::Reached(ClimbLevel::L1)),
            "2" => Some(ClimbResult::Reached(ClimbLevel::L2)),
            "3" => Some(ClimbResult::Reached(ClimbLevel::L3)),
            _ => None,
        }
    }

    /// Failures and successes both count as attempts.
    pub fn is_attempt(&self) -> bool {
        !matches!(self, ClimbResult::NotAttempted)
    }

    pub fn level(&self) -> Option<ClimbLevel> {
        match self {
            ClimbResult::Reached(level) => Some(*level),
            _ => None,
        }
    }
}

/// Field positions used for auto starts and endgame climbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPosition {
    Center,
    Depot,
    Outpost,
}

impl FieldPosition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "C" => Some(FieldPosition::Center),
            "D" => Some(FieldPosition::Depot),
            "O" => Some(FieldPosition::Outpost),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FieldPosition::Center => "C",
            FieldPosition::Depot => "D",
            FieldPosition::Outpost => "O",
        }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPosition::Center => write!(f, "Center"),
            FieldPosition::Depot => write!(f, "Depot"),
            FieldPosition::Outpost => write!(f, "Outpost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number(" 7 "), Some(7.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_rating_strips_symbols() {
        assert_eq!(parse_rating("12.5*"), 12.5);
        assert_eq!(parse_rating("-3.25 pts"), -3.25);
        assert_eq!(parse_rating("n/a"), 0.0);
        assert_eq!(parse_rating(""), 0.0);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_field_alias_fallback() {
        let r = row(&[("Total Points", ""), ("Total Score", "42")]);
        assert_eq!(field(&r, &["Total Points", "Total Score"]), Some("42"));
        assert_eq!(field(&r, &["Missing"]), None);
    }

    #[test]
    fn test_climb_result_parse() {
        assert_eq!(ClimbResult::parse("0"), Some(ClimbResult::NotAttempted));
        assert_eq!(ClimbResult::parse("F"), Some(ClimbResult::Failed));
        assert_eq!(
            ClimbResult::parse("2"),
            Some(ClimbResult::Reached(ClimbLevel::L2))
        );
        assert_eq!(ClimbResult::parse("4"), None);
        assert_eq!(ClimbResult::parse(""), None);
    }

    #[test]
    fn test_climb_attempts() {
        assert!(ClimbResult::Failed.is_attempt());
        assert!(ClimbResult::Reached(ClimbLevel::L1).is_attempt());
        assert!(!ClimbResult::NotAttempted.is_attempt());
    }

    #[test]
    fn test_field_position_parse() {
        assert_eq!(FieldPosition::parse("c"), Some(FieldPosition::Center));
        assert_eq!(FieldPosition::parse("O"), Some(FieldPosition::Outpost));
        assert_eq!(FieldPosition::parse("X"), None);
    }
}
