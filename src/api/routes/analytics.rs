use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::{load_snapshot, parse_team, with_store, ApiError};
use crate::calculate::filter::parse_flags;
use crate::calculate::ranking::parse_columns;
use crate::calculate::{filter_teams, overview as build_overview, rank_teams, FilterFlag};
use crate::calculate::{FilterResult, Overview, RankingTable, SortKey};
use crate::ingest::DatasetKind;
use crate::storage::DatasetMeta;

use super::split_csv_param;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rankings", get(rankings))
        .route("/api/filter", get(filter))
        .route("/api/overview", get(overview))
}

// ── Rankings Endpoint ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankingsParams {
    #[serde(default)]
    pub show_hidden: bool,
    /// Comma-separated column tokens; falls back to the saved selection
    pub columns: Option<String>,
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingsParams>,
) -> Result<Json<RankingTable>, ApiError> {
    let snapshot = load_snapshot(&state).await?;

    let selection = match params.columns.as_deref() {
        Some(raw) => Some(parse_columns(split_csv_param(raw))),
        None => with_store(&state, |store| store.ranking_columns()).await?,
    };

    let table = rank_teams(
        &snapshot.dataset,
        &snapshot.visibility(params.show_hidden),
        selection.as_deref(),
    );
    Ok(Json(table))
}

// ── Filter Endpoint ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    /// Comma-separated filter tokens; falls back to the saved selection
    pub flags: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub show_hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub selected: Vec<FilterFlag>,
    pub sort: SortKey,
    #[serde(flatten)]
    pub result: FilterResult,
}

pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<FilterResponse>, ApiError> {
    let sort = match params.sort.as_deref() {
        None => SortKey::default(),
        Some(raw) => SortKey::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort key: {}", raw)))?,
    };

    let selected = match params.flags.as_deref() {
        Some(raw) => parse_flags(split_csv_param(raw)),
        None => with_store(&state, |store| store.filter_selections()).await?,
    };

    let snapshot = load_snapshot(&state).await?;
    let result = filter_teams(
        &snapshot.dataset,
        &selected,
        &snapshot.hidden,
        params.show_hidden,
        sort,
    );
    debug!(
        "Filter matched {} of {} teams",
        result.matching.len(),
        result.matching.len() + result.non_matching.len()
    );

    Ok(Json(FilterResponse {
        selected,
        sort,
        result,
    }))
}

// ── Overview Endpoint ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    pub highlight: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub home_team: String,
    #[serde(flatten)]
    pub overview: Overview,
    pub datasets: Vec<DatasetMeta>,
}

pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let highlight = match params.highlight.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_team(raw)?),
        _ => None,
    };

    let snapshot = load_snapshot(&state).await?;
    let home = state.home_team();
    let overview = build_overview(&snapshot.dataset, &home, highlight.as_ref());

    let datasets = with_store(&state, |store| {
        let mut datasets = Vec::new();
        for kind in DatasetKind::ALL {
            if let Some(meta) = store.dataset_meta(kind)? {
                datasets.push(meta);
            }
        }
        Ok(datasets)
    })
    .await?;

    Ok(Json(OverviewResponse {
        home_team: home.as_str().to_string(),
        overview,
        datasets,
    }))
}
