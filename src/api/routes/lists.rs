use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{with_store, ApiError};
use crate::models::{ListKind, TeamId, TeamList};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/lists/:name", get(show_list).put(replace_list))
}

// ── Team Lists Endpoint ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub name: ListKind,
    pub teams: TeamList,
}

fn parse_list_kind(name: &str) -> Result<ListKind, ApiError> {
    ListKind::parse(name).ok_or_else(|| ApiError::NotFound(format!("List {}", name)))
}

pub async fn show_list(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ListResponse>, ApiError> {
    let kind = parse_list_kind(&name)?;
    let teams = with_store(&state, move |store| store.list(kind)).await?;
    Ok(Json(ListResponse { name: kind, teams }))
}

/// Replace a list wholesale. Blank entries are dropped and duplicates merged.
pub async fn replace_list(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Vec<String>>,
) -> Result<Json<ListResponse>, ApiError> {
    let kind = parse_list_kind(&name)?;
    let teams: TeamList = body.iter().filter_map(|raw| TeamId::normalize(raw)).collect();

    let saved = teams.clone();
    with_store(&state, move |store| store.save_list(kind, &saved)).await?;
    info!("Replaced {:?} list with {} teams", kind, teams.len());

    Ok(Json(ListResponse { name: kind, teams }))
}
