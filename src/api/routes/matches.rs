use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{load_snapshot, with_store, ApiError};
use crate::calculate::{
    home_matches, is_full_match, match_summary, picklist_scouting, predict, predict_match,
    scouting_assignments, HomeMatch, MatchSummary, Prediction, ScoutingPlan, ALLIANCE_SIZE,
};
use crate::models::parse_team_list;
use crate::storage::CursorKind;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/predict", get(prediction))
        .route("/api/scouting", get(scouting))
        .route("/api/picklist-scouting", get(picklist))
}

/// Explicit cursor, else the saved one, else the configured default.
async fn resolve_cursor(
    state: &AppState,
    kind: CursorKind,
    requested: Option<u32>,
) -> Result<u32, ApiError> {
    if let Some(cursor) = requested {
        return Ok(cursor);
    }
    let saved = with_store(state, move |store| store.cursor(kind)).await?;
    Ok(saved.unwrap_or(state.config.default_cursor))
}

// ── Prediction Endpoint ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    #[serde(rename = "match")]
    pub match_number: Option<u32>,
    pub red: Option<String>,
    pub blue: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Prediction,
    pub summary: MatchSummary,
}

pub async fn prediction(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> Result<Json<PredictResponse>, ApiError> {
    let snapshot = load_snapshot(&state).await?;
    let data = &snapshot.dataset;

    let prediction = match (params.match_number, &params.red, &params.blue) {
        (Some(number), _, _) => predict_match(number, data)
            .ok_or_else(|| ApiError::NotFound(format!("Match {} is not in the schedule", number)))?,
        (None, Some(red), Some(blue)) => {
            let (red, blue) = (parse_team_list(red), parse_team_list(blue));
            if !is_full_match(&red, &blue) {
                return Err(ApiError::BadRequest(format!(
                    "Each alliance needs exactly {} teams",
                    ALLIANCE_SIZE
                )));
            }
            predict(&red, &blue, data)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Provide either match or both red and blue".to_string(),
            ))
        }
    };

    let summary = match_summary(&prediction.red.teams, &prediction.blue.teams, data);
    Ok(Json(PredictResponse {
        prediction,
        summary,
    }))
}

// ── Scouting Endpoints ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoutingParams {
    pub cursor: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScoutingResponse {
    pub home_team: String,
    pub cursor: u32,
    pub plan: ScoutingPlan,
    pub home_matches: Vec<HomeMatch>,
}

pub async fn scouting(
    State(state): State<AppState>,
    Query(params): Query<ScoutingParams>,
) -> Result<Json<ScoutingResponse>, ApiError> {
    let cursor = resolve_cursor(&state, CursorKind::Home, params.cursor).await?;
    let snapshot = load_snapshot(&state).await?;
    let home = state.home_team();
    let schedule = &snapshot.dataset.schedule;

    Ok(Json(ScoutingResponse {
        home_team: home.as_str().to_string(),
        cursor,
        plan: scouting_assignments(schedule, &home, cursor),
        home_matches: home_matches(schedule, &home, cursor),
    }))
}

#[derive(Debug, Serialize)]
pub struct PicklistScoutingResponse {
    pub cursor: u32,
    pub plan: ScoutingPlan,
}

pub async fn picklist(
    State(state): State<AppState>,
    Query(params): Query<ScoutingParams>,
) -> Result<Json<PicklistScoutingResponse>, ApiError> {
    let cursor = resolve_cursor(&state, CursorKind::Picklist, params.cursor).await?;
    let snapshot = load_snapshot(&state).await?;

    Ok(Json(PicklistScoutingResponse {
        cursor,
        plan: picklist_scouting(&snapshot.dataset.schedule, &snapshot.picklist, cursor),
    }))
}
