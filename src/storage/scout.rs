//! Typed accessors over a [`KeyValueStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, warn};

use super::{FileStore, KeyValueStore, MemoryStore, StorageConfig, StorageError};
use crate::calculate::filter::{parse_flags, FilterFlag};
use crate::calculate::ranking::{parse_columns, RankingColumn};
use crate::ingest::{validate_upload, DatasetKind, RawDatasets};
use crate::models::{Dataset, ListKind, TeamId, TeamList, Visibility};

const ISOLATE_MODE: &str = "isolateMode";
const RANKING_COLUMNS: &str = "rankingColumns";
const FILTER_SELECTIONS: &str = "filterSelections";

fn list_key(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Hidden => "hiddenTeams",
        ListKind::Isolated => "isolatedTeams",
        ListKind::Picklist => "picklist",
    }
}

fn meta_key(kind: DatasetKind) -> String {
    format!("{}Meta", kind.storage_key())
}

/// The two independent scouting cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorKind {
    Home,
    Picklist,
}

impl CursorKind {
    fn key(&self) -> &'static str {
        match self {
            CursorKind::Home => "currentQualMatch",
            CursorKind::Picklist => "currentQualMatchPicklist",
        }
    }
}

/// Bookkeeping recorded alongside each uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub kind: DatasetKind,
    pub file_name: String,
    pub rows: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Everything a calculation needs, read from the store in one pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub dataset: Dataset,
    pub hidden: TeamList,
    pub isolated: TeamList,
    pub picklist: TeamList,
    pub isolate_mode: bool,
}

impl Snapshot {
    pub fn visibility(&self, show_hidden: bool) -> Visibility {
        Visibility {
            hidden: self.hidden.clone(),
            isolated: self.isolated.clone(),
            isolate_mode: self.isolate_mode,
            show_hidden,
        }
    }
}

/// Scouting state persisted through a key-value backend.
#[derive(Clone)]
pub struct ScoutStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ScoutStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// File-backed store under the configured data directory.
    pub fn open(config: &StorageConfig) -> Self {
        Self::new(Arc::new(FileStore::new(config)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read a JSON value, treating corrupt entries as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring unreadable value for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    // Datasets

    /// Validate and store an upload, replacing any previous one of that kind.
    /// A rejected upload leaves the stored dataset untouched.
    pub fn save_dataset(
        &self,
        kind: DatasetKind,
        file_name: &str,
        text: &str,
    ) -> Result<DatasetMeta, StorageError> {
        let rows = validate_upload(kind, file_name, text)?;
        let meta = DatasetMeta {
            kind,
            file_name: file_name.to_string(),
            rows,
            uploaded_at: Utc::now(),
        };

        self.backend.set(kind.storage_key(), text)?;
        self.set_json(&meta_key(kind), &meta)?;

        info!("Stored {} dataset from {} ({} rows)", kind, file_name, rows);
        Ok(meta)
    }

    /// Stored CSV text; empty when nothing was uploaded.
    pub fn dataset_text(&self, kind: DatasetKind) -> Result<String, StorageError> {
        Ok(self.backend.get(kind.storage_key())?.unwrap_or_default())
    }

    pub fn dataset_meta(&self, kind: DatasetKind) -> Result<Option<DatasetMeta>, StorageError> {
        self.get_json(&meta_key(kind))
    }

    pub fn delete_dataset(&self, kind: DatasetKind) -> Result<(), StorageError> {
        self.backend.remove(kind.storage_key())?;
        self.backend.remove(&meta_key(kind))?;
        info!("Deleted {} dataset", kind);
        Ok(())
    }

    pub fn raw_datasets(&self) -> Result<RawDatasets, StorageError> {
        Ok(RawDatasets {
            event: self.dataset_text(DatasetKind::Event)?,
            pit: self.dataset_text(DatasetKind::Pit)?,
            schedule: self.dataset_text(DatasetKind::Schedule)?,
            opr: self.dataset_text(DatasetKind::Opr)?,
        })
    }

    // Team lists

    pub fn list(&self, kind: ListKind) -> Result<TeamList, StorageError> {
        let raw: Vec<String> = self.get_json(list_key(kind))?.unwrap_or_default();
        Ok(raw.iter().filter_map(|t| TeamId::normalize(t)).collect())
    }

    pub fn save_list(&self, kind: ListKind, list: &TeamList) -> Result<(), StorageError> {
        self.set_json(list_key(kind), list)
    }

    pub fn add_to_list(&self, kind: ListKind, teams: &[TeamId]) -> Result<TeamList, StorageError> {
        let mut list = self.list(kind)?;
        for team in teams {
            list.add(team.clone());
        }
        self.save_list(kind, &list)?;
        Ok(list)
    }

    pub fn remove_from_list(
        &self,
        kind: ListKind,
        teams: &[TeamId],
    ) -> Result<TeamList, StorageError> {
        let mut list = self.list(kind)?;
        for team in teams {
            list.remove(team);
        }
        self.save_list(kind, &list)?;
        Ok(list)
    }

    pub fn reset_list(&self, kind: ListKind) -> Result<(), StorageError> {
        self.save_list(kind, &TeamList::new())
    }

    // Preferences

    pub fn isolate_mode(&self) -> Result<bool, StorageError> {
        Ok(self.get_json(ISOLATE_MODE)?.unwrap_or(false))
    }

    pub fn set_isolate_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.set_json(ISOLATE_MODE, &enabled)
    }

    /// Flip isolate mode and return the new state.
    pub fn toggle_isolate_mode(&self) -> Result<bool, StorageError> {
        let enabled = !self.isolate_mode()?;
        self.set_isolate_mode(enabled)?;
        Ok(enabled)
    }

    /// Stored cursor, `None` when unset or unparsable.
    pub fn cursor(&self, kind: CursorKind) -> Result<Option<u32>, StorageError> {
        Ok(self
            .backend
            .get(kind.key())?
            .and_then(|raw| raw.trim().parse().ok()))
    }

    pub fn set_cursor(&self, kind: CursorKind, match_number: u32) -> Result<(), StorageError> {
        self.backend.set(kind.key(), &match_number.to_string())
    }

    /// Selected ranking columns; `None` means every column.
    pub fn ranking_columns(&self) -> Result<Option<Vec<RankingColumn>>, StorageError> {
        let tokens: Option<Vec<String>> = self.get_json(RANKING_COLUMNS)?;
        Ok(tokens.map(|t| parse_columns(t.iter().map(String::as_str))))
    }

    pub fn set_ranking_columns(&self, columns: &[RankingColumn]) -> Result<(), StorageError> {
        let tokens: Vec<&str> = columns.iter().map(|c| c.token()).collect();
        self.set_json(RANKING_COLUMNS, &tokens)
    }

    pub fn filter_selections(&self) -> Result<Vec<FilterFlag>, StorageError> {
        let tokens: Vec<String> = self.get_json(FILTER_SELECTIONS)?.unwrap_or_default();
        Ok(parse_flags(tokens.iter().map(String::as_str)))
    }

    pub fn set_filter_selections(&self, flags: &[FilterFlag]) -> Result<(), StorageError> {
        let tokens: Vec<&str> = flags.iter().map(|f| f.token()).collect();
        self.set_json(FILTER_SELECTIONS, &tokens)
    }

    /// Parse every dataset and read the team lists.
    pub fn snapshot(&self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot {
            dataset: self.raw_datasets()?.parse(),
            hidden: self.list(ListKind::Hidden)?,
            isolated: self.list(ListKind::Isolated)?,
            picklist: self.list(ListKind::Picklist)?,
            isolate_mode: self.isolate_mode()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const EVENT_CSV: &str = "Team Number,Match Number,Total Points\n226,1,10\n254,1,20\n";

    fn ids(teams: &[&str]) -> Vec<TeamId> {
        teams.iter().map(|t| TeamId::from(*t)).collect()
    }

    #[test]
    fn test_save_dataset_records_meta() {
        let store = ScoutStore::in_memory();
        let meta = store
            .save_dataset(DatasetKind::Event, "event.csv", EVENT_CSV)
            .unwrap();

        assert_eq!(meta.rows, 2);
        assert_eq!(store.dataset_text(DatasetKind::Event).unwrap(), EVENT_CSV);
        assert_eq!(store.dataset_meta(DatasetKind::Event).unwrap(), Some(meta));
    }

    #[test]
    fn test_rejected_upload_keeps_previous() {
        let store = ScoutStore::in_memory();
        store
            .save_dataset(DatasetKind::Event, "event.csv", EVENT_CSV)
            .unwrap();

        let err = store
            .save_dataset(DatasetKind::Event, "event.csv", "Team Number\n")
            .unwrap_err();
        assert!(matches!(err, StorageError::Rejected(IngestError::EmptyFile)));
        assert_eq!(store.dataset_text(DatasetKind::Event).unwrap(), EVENT_CSV);
    }

    #[test]
    fn test_delete_dataset() {
        let store = ScoutStore::in_memory();
        store
            .save_dataset(DatasetKind::Event, "event.csv", EVENT_CSV)
            .unwrap();
        store.delete_dataset(DatasetKind::Event).unwrap();

        assert_eq!(store.dataset_text(DatasetKind::Event).unwrap(), "");
        assert_eq!(store.dataset_meta(DatasetKind::Event).unwrap(), None);
    }

    #[test]
    fn test_list_add_remove_reset() {
        let store = ScoutStore::in_memory();
        store
            .add_to_list(ListKind::Hidden, &ids(&["1678", "226", "226"]))
            .unwrap();
        let list = store.list(ListKind::Hidden).unwrap();
        let teams: Vec<&str> = list.iter().map(|t| t.as_str()).collect();
        assert_eq!(teams, vec!["226", "1678"]);

        store.remove_from_list(ListKind::Hidden, &ids(&["226"])).unwrap();
        assert_eq!(store.list(ListKind::Hidden).unwrap().len(), 1);

        store.reset_list(ListKind::Hidden).unwrap();
        assert!(store.list(ListKind::Hidden).unwrap().is_empty());
        assert!(store.list(ListKind::Picklist).unwrap().is_empty());
    }

    #[test]
    fn test_list_stored_as_json_array() {
        let backend = Arc::new(MemoryStore::new());
        let store = ScoutStore::new(backend.clone());
        store.add_to_list(ListKind::Picklist, &ids(&["254", "33"])).unwrap();

        assert_eq!(
            backend.get("picklist").unwrap().as_deref(),
            Some(r#"["33","254"]"#)
        );
    }

    #[test]
    fn test_corrupt_list_reads_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("hiddenTeams", "not json").unwrap();
        let store = ScoutStore::new(backend);
        assert!(store.list(ListKind::Hidden).unwrap().is_empty());
    }

    #[test]
    fn test_cursor_parsing() {
        let backend = Arc::new(MemoryStore::new());
        let store = ScoutStore::new(backend.clone());
        assert_eq!(store.cursor(CursorKind::Home).unwrap(), None);

        store.set_cursor(CursorKind::Home, 14).unwrap();
        assert_eq!(store.cursor(CursorKind::Home).unwrap(), Some(14));
        assert_eq!(store.cursor(CursorKind::Picklist).unwrap(), None);

        backend.set("currentQualMatchPicklist", "abc").unwrap();
        assert_eq!(store.cursor(CursorKind::Picklist).unwrap(), None);
    }

    #[test]
    fn test_isolate_toggle() {
        let store = ScoutStore::in_memory();
        assert!(!store.isolate_mode().unwrap());
        assert!(store.toggle_isolate_mode().unwrap());
        assert!(store.isolate_mode().unwrap());
    }

    #[test]
    fn test_column_and_filter_selections() {
        let store = ScoutStore::in_memory();
        assert_eq!(store.ranking_columns().unwrap(), None);

        store
            .set_ranking_columns(&[RankingColumn::DiedRate, RankingColumn::AutoOpr])
            .unwrap();
        assert_eq!(
            store.ranking_columns().unwrap(),
            Some(vec![RankingColumn::DiedRate, RankingColumn::AutoOpr])
        );

        store
            .set_filter_selections(&[FilterFlag::Trench, FilterFlag::ClimbLevel2])
            .unwrap();
        assert_eq!(
            store.filter_selections().unwrap(),
            vec![FilterFlag::Trench, FilterFlag::ClimbLevel2]
        );
    }

    #[test]
    fn test_snapshot_from_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let store = ScoutStore::open(&config);

        store
            .save_dataset(DatasetKind::Event, "event.csv", EVENT_CSV)
            .unwrap();
        store.add_to_list(ListKind::Hidden, &ids(&["254"])).unwrap();

        let reopened = ScoutStore::open(&config);
        let snapshot = reopened.snapshot().unwrap();
        assert_eq!(snapshot.dataset.matches.len(), 2);
        assert!(!snapshot.visibility(false).is_visible(&"254".into()));
        assert!(snapshot.visibility(true).is_visible(&"254".into()));
    }
}
