//! # FRC Scout
//!
//! Scouting analytics for an FRC competition, computed from four CSV exports:
//! event scouting, pit scouting, the qualification schedule and OPR ratings.
//!
//! ## Architecture
//!
//! - **models**: Typed records, team identifiers, lists and derived statistics
//! - **ingest**: CSV parsing and upload validation
//! - **calculate**: Aggregation, rankings, filters, predictions and scouting plans
//! - **storage**: Key-value persistence for raw CSV text and user preferences
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;
