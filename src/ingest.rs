//! CSV ingestion: upload validation and typed record parsing.
//!
//! Raw text is kept as uploaded; every consumer re-parses it through the
//! functions here. Parsing never fails outward: malformed text yields an
//! empty record set and a warning.

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CsvRow, Dataset, MatchRecord, OprRecord, PitRecord, ScheduleRow, TEAM_HEADERS,
};

/// Errors reported to the user when an upload is rejected.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid file type: {0} (expected a .csv file)")]
    InvalidFileType(String),

    #[error("CSV file is empty")]
    EmptyFile,

    #[error("Missing headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// The four uploadable datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Event,
    Pit,
    Schedule,
    Opr,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Event,
        DatasetKind::Pit,
        DatasetKind::Schedule,
        DatasetKind::Opr,
    ];

    /// Parse a CLI name or an upload-type discriminator.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" | "csvData" => Some(DatasetKind::Event),
            "pit" | "csvPitScouting" => Some(DatasetKind::Pit),
            "schedule" | "csvSchedule" => Some(DatasetKind::Schedule),
            "opr" | "csvOpr" => Some(DatasetKind::Opr),
            _ => None,
        }
    }

    /// Store key holding this dataset's raw text.
    pub fn storage_key(&self) -> &'static str {
        match self {
            DatasetKind::Event => "csvText",
            DatasetKind::Pit => "pitCsvText",
            DatasetKind::Schedule => "scheduleCsvText",
            DatasetKind::Opr => "oprCsvText",
        }
    }

    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Event => &["Team Number"],
            DatasetKind::Pit => &["Team Number", "Trench", "Ground Intake", "Shoot on Fly"],
            DatasetKind::Schedule => &[
                "Match Number",
                "Red 1",
                "Red 2",
                "Red 3",
                "Blue 1",
                "Blue 2",
                "Blue 3",
            ],
            DatasetKind::Opr => &["Team Number", "Auto OPR", "Tele OPR", "Total OPR"],
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Event => write!(f, "event"),
            DatasetKind::Pit => write!(f, "pit"),
            DatasetKind::Schedule => write!(f, "schedule"),
            DatasetKind::Opr => write!(f, "opr"),
        }
    }
}

/// Parsed CSV: trimmed headers plus one map per non-blank row.
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

/// Parse CSV text with a header row. Short rows leave trailing columns absent.
pub fn parse_csv(text: &str) -> Result<ParsedCsv, csv::Error> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    debug!("Parsed {} CSV rows", rows.len());
    Ok(ParsedCsv { headers, rows })
}

/// Parse rows, swallowing errors into an empty set.
pub fn parse_rows(text: &str) -> Vec<CsvRow> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match parse_csv(text) {
        Ok(parsed) => parsed.rows,
        Err(e) => {
            warn!("Failed to parse CSV text: {}", e);
            Vec::new()
        }
    }
}

/// Spellings that satisfy a required header.
fn accepted_spellings(required: &'static &'static str) -> &'static [&'static str] {
    if *required == TEAM_HEADERS[0] {
        TEAM_HEADERS
    } else {
        std::slice::from_ref(required)
    }
}

/// Required headers absent from `headers`, in declaration order.
pub fn missing_headers(kind: DatasetKind, headers: &[String]) -> Vec<String> {
    kind.required_headers()
        .iter()
        .filter(|required| {
            !accepted_spellings(required)
                .iter()
                .any(|name| headers.iter().any(|h| h == name))
        })
        .map(|h| h.to_string())
        .collect()
}

/// Check an upload before it is stored. Returns the number of data rows.
pub fn validate_upload(
    kind: DatasetKind,
    file_name: &str,
    text: &str,
) -> Result<usize, IngestError> {
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(IngestError::InvalidFileType(file_name.to_string()));
    }

    let parsed = parse_csv(text)?;
    if parsed.rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let missing = missing_headers(kind, &parsed.headers);
    if !missing.is_empty() {
        return Err(IngestError::MissingHeaders(missing));
    }

    Ok(parsed.rows.len())
}

pub fn parse_matches(text: &str) -> Vec<MatchRecord> {
    parse_rows(text).iter().filter_map(MatchRecord::from_row).collect()
}

pub fn parse_pit(text: &str) -> Vec<PitRecord> {
    parse_rows(text).iter().filter_map(PitRecord::from_row).collect()
}

pub fn parse_opr(text: &str) -> Vec<OprRecord> {
    parse_rows(text).iter().filter_map(OprRecord::from_row).collect()
}

/// Parse a schedule. A schedule missing any required column is left empty
/// rather than partially applied.
pub fn parse_schedule(text: &str) -> Vec<ScheduleRow> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let parsed = match parse_csv(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse schedule CSV: {}", e);
            return Vec::new();
        }
    };

    let missing = missing_headers(DatasetKind::Schedule, &parsed.headers);
    if !missing.is_empty() {
        warn!("Schedule is missing headers: {}", missing.join(", "));
        return Vec::new();
    }

    parsed.rows.iter().filter_map(ScheduleRow::from_row).collect()
}

/// Raw text for each dataset; absent datasets are empty strings.
#[derive(Debug, Clone, Default)]
pub struct RawDatasets {
    pub event: String,
    pub pit: String,
    pub schedule: String,
    pub opr: String,
}

impl RawDatasets {
    /// Parse every dataset independently; a bad file only empties itself.
    pub fn parse(&self) -> Dataset {
        Dataset::new(
            parse_matches(&self.event),
            parse_pit(&self.pit),
            parse_opr(&self.opr),
            parse_schedule(&self.schedule),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_CSV: &str = "Team Number,Match Number,Total Points\n226,1,10\n226,2,20\n254,1,\n";

    #[test]
    fn test_parse_csv_trims_headers_and_values() {
        let parsed = parse_csv(" Team Number , Total Points \n 226 , 15 \n").unwrap();
        assert_eq!(parsed.headers, vec!["Team Number", "Total Points"]);
        assert_eq!(parsed.rows[0]["Team Number"], "226");
        assert_eq!(parsed.rows[0]["Total Points"], "15");
    }

    #[test]
    fn test_parse_csv_ragged_rows() {
        let parsed = parse_csv("A,B,C\n1,2\n").unwrap();
        assert_eq!(parsed.rows[0].get("B").map(String::as_str), Some("2"));
        assert!(parsed.rows[0].get("C").is_none());
    }

    #[test]
    fn test_parse_csv_skips_blank_rows() {
        let parsed = parse_csv("A,B\n1,2\n,\n\n3,4\n").unwrap();
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_parse_csv_strips_bom() {
        let parsed = parse_csv("\u{feff}Team Number\n226\n").unwrap();
        assert_eq!(parsed.headers[0], "Team Number");
    }

    #[test]
    fn test_parse_rows_empty_text() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("   \n").is_empty());
    }

    #[test]
    fn test_parse_matches() {
        let matches = parse_matches(EVENT_CSV);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[2].total_points, None);
    }

    #[test]
    fn test_validate_upload_ok() {
        assert_eq!(validate_upload(DatasetKind::Event, "event.CSV", EVENT_CSV).unwrap(), 3);
    }

    #[test]
    fn test_validate_upload_wrong_extension() {
        let err = validate_upload(DatasetKind::Event, "event.xlsx", EVENT_CSV).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFileType(_)));
    }

    #[test]
    fn test_validate_upload_empty() {
        let err = validate_upload(DatasetKind::Event, "event.csv", "Team Number\n").unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile));
    }

    #[test]
    fn test_validate_upload_missing_headers() {
        let text = "Team Number,Trench\n226,1\n";
        let err = validate_upload(DatasetKind::Pit, "pit.csv", text).unwrap_err();
        match err {
            IngestError::MissingHeaders(missing) => {
                assert_eq!(missing, vec!["Ground Intake", "Shoot on Fly"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_upload_accepts_team_no_header() {
        let text = "Team No.,Match Number,Total Score\n226,1,10\n";
        assert_eq!(validate_upload(DatasetKind::Event, "event.csv", text).unwrap(), 1);
        assert_eq!(parse_matches(text).len(), 1);

        let opr = "Team No.,Auto OPR,Tele OPR,Total OPR\n254,1,2,3\n";
        assert_eq!(validate_upload(DatasetKind::Opr, "opr.csv", opr).unwrap(), 1);
        assert_eq!(parse_opr(opr)[0].team.as_str(), "254");
    }

    #[test]
    fn test_validate_upload_reports_primary_team_header() {
        let err =
            validate_upload(DatasetKind::Event, "event.csv", "Team,Match\n226,1\n").unwrap_err();
        match err {
            IngestError::MissingHeaders(missing) => assert_eq!(missing, vec!["Team Number"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_headers_message() {
        let err = IngestError::MissingHeaders(vec!["Red 1".into(), "Blue 3".into()]);
        assert_eq!(err.to_string(), "Missing headers: Red 1, Blue 3");
    }

    #[test]
    fn test_parse_schedule_missing_headers_is_empty() {
        let text = "Match Number,Red 1,Red 2\n1,226,254\n";
        assert!(parse_schedule(text).is_empty());
    }

    #[test]
    fn test_parse_schedule() {
        let text = "Match Number,Red 1,Red 2,Red 3,Blue 1,Blue 2,Blue 3\n\
                    1,226,254,33,1678,118,148\n\
                    x,1,2,3,4,5,6\n";
        let schedule = parse_schedule(text);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].blue[0].as_str(), "1678");
    }

    #[test]
    fn test_dataset_kind_parse() {
        assert_eq!(DatasetKind::parse("csvPitScouting"), Some(DatasetKind::Pit));
        assert_eq!(DatasetKind::parse("opr"), Some(DatasetKind::Opr));
        assert_eq!(DatasetKind::parse("unknown"), None);
    }

    #[test]
    fn test_raw_datasets_isolates_failures() {
        let raw = RawDatasets {
            event: EVENT_CSV.to_string(),
            schedule: "Match Number\n1\n".to_string(),
            ..Default::default()
        };
        let data = raw.parse();
        assert_eq!(data.matches.len(), 3);
        assert!(data.schedule.is_empty());
    }
}
