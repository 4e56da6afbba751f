//! Canonical team identifiers.
//!
//! Every CSV source (event, pit, schedule, OPR) spells team numbers as free
//! text. All of them pass through [`TeamId::normalize`] at ingestion so joins
//! across datasets are plain equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A normalized team identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Normalize a raw cell value. Returns `None` for blank cells.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the team number, if it is one.
    pub fn number(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

// Numeric team numbers sort numerically; anything else falls back to text.
// Ties on the number ("0226" vs "226") are broken by the string so the
// ordering stays consistent with `Eq`.
impl Ord for TeamId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number(), other.number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TeamId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TeamId({})", self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for TeamId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

/// Parse a comma-separated team list (`"226, 1678,254"`), dropping blanks.
pub fn parse_team_list(s: &str) -> Vec<TeamId> {
    s.split(',').filter_map(TeamId::normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(TeamId::normalize("  226 ").unwrap().as_str(), "226");
    }

    #[test]
    fn test_normalize_blank() {
        assert!(TeamId::normalize("").is_none());
        assert!(TeamId::normalize("   ").is_none());
    }

    #[test]
    fn test_numeric_ordering() {
        let mut teams: Vec<TeamId> = vec!["1678".into(), "33".into(), "226".into()];
        teams.sort();
        let sorted: Vec<&str> = teams.iter().map(|t| t.as_str()).collect();
        assert_eq!(sorted, vec!["33", "226", "1678"]);
    }

    #[test]
    fn test_non_numeric_sorts_last() {
        let mut teams: Vec<TeamId> = vec!["226B".into(), "9999".into()];
        teams.sort();
        assert_eq!(teams[0].as_str(), "9999");
    }

    #[test]
    fn test_leading_zero_distinct() {
        let a = TeamId::from("0226");
        let b = TeamId::from("226");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_parse_team_list() {
        let teams = parse_team_list("226, 1678,,254 ");
        assert_eq!(teams, vec![TeamId::from("226"), "1678".into(), "254".into()]);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&TeamId::from("226")).unwrap();
        assert_eq!(json, "\"226\"");
    }
}
