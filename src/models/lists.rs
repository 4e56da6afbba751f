//! User-curated team lists (hidden, isolated, picklist).

use serde::{Deserialize, Serialize};

use super::TeamId;

/// A set of teams kept in numeric order for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamList(Vec<TeamId>);

impl TeamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a team. Returns `false` if it was already present.
    pub fn add(&mut self, team: TeamId) -> bool {
        match self.0.binary_search(&team) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, team);
                true
            }
        }
    }

    /// Remove a team. Returns `false` if it was not present.
    pub fn remove(&mut self, team: &TeamId) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != team);
        self.0.len() != before
    }

    pub fn reset(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, team: &TeamId) -> bool {
        self.0.contains(team)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamId> {
        self.0.iter()
    }
}

impl FromIterator<TeamId> for TeamList {
    fn from_iter<I: IntoIterator<Item = TeamId>>(iter: I) -> Self {
        let mut list = TeamList::new();
        for team in iter {
            list.add(team);
        }
        list
    }
}

/// Which persisted list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Hidden,
    Isolated,
    Picklist,
}

impl ListKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hidden" | "hide" => Some(ListKind::Hidden),
            "isolated" | "isolate" => Some(ListKind::Isolated),
            "picklist" => Some(ListKind::Picklist),
            _ => None,
        }
    }
}

/// Hide/isolate state applied to rankings and filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    pub hidden: TeamList,
    pub isolated: TeamList,
    pub isolate_mode: bool,
    pub show_hidden: bool,
}

impl Visibility {
    /// Isolation wins when it is on and non-empty; otherwise hidden teams
    /// are excluded unless the override is set.
    pub fn is_visible(&self, team: &TeamId) -> bool {
        if self.isolate_mode && !self.isolated.is_empty() {
            return self.isolated.contains(team);
        }
        self.show_hidden || !self.hidden.contains(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sorted_and_deduped() {
        let mut list = TeamList::new();
        assert!(list.add("1678".into()));
        assert!(list.add("226".into()));
        assert!(!list.add("226".into()));
        let teams: Vec<&str> = list.iter().map(|t| t.as_str()).collect();
        assert_eq!(teams, vec!["226", "1678"]);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut list: TeamList = vec!["226".into(), "254".into()].into_iter().collect();
        assert!(list.remove(&"226".into()));
        assert!(!list.remove(&"226".into()));
        assert_eq!(list.len(), 1);
        list.reset();
        assert!(list.is_empty());
    }

    #[test]
    fn test_serde_round_trip_as_array() {
        let list: TeamList = vec!["254".into(), "33".into()].into_iter().collect();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["33","254"]"#);
    }

    #[test]
    fn test_visibility_hidden() {
        let vis = Visibility {
            hidden: vec!["226".into()].into_iter().collect(),
            ..Default::default()
        };
        assert!(!vis.is_visible(&"226".into()));
        assert!(vis.is_visible(&"254".into()));
    }

    #[test]
    fn test_visibility_show_hidden_override() {
        let vis = Visibility {
            hidden: vec!["226".into()].into_iter().collect(),
            show_hidden: true,
            ..Default::default()
        };
        assert!(vis.is_visible(&"226".into()));
    }

    #[test]
    fn test_visibility_isolation_wins() {
        let vis = Visibility {
            hidden: vec!["226".into()].into_iter().collect(),
            isolated: vec!["226".into()].into_iter().collect(),
            isolate_mode: true,
            show_hidden: false,
        };
        assert!(vis.is_visible(&"226".into()));
        assert!(!vis.is_visible(&"254".into()));
    }

    #[test]
    fn test_visibility_empty_isolation_falls_back() {
        let vis = Visibility {
            isolate_mode: true,
            ..Default::default()
        };
        assert!(vis.is_visible(&"254".into()));
    }

    #[test]
    fn test_list_kind_parse() {
        assert_eq!(ListKind::parse("hide"), Some(ListKind::Hidden));
        assert_eq!(ListKind::parse("Picklist"), Some(ListKind::Picklist));
        assert_eq!(ListKind::parse("other"), None);
    }
}
