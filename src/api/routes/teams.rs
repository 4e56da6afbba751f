use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::{load_snapshot, parse_team, ApiError};
use crate::calculate::{team_detail, Comparison, Slot, TeamDetail};
use crate::models::FieldPosition;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/teams/:id", get(team))
        .route("/api/compare", get(compare))
}

// ── Team Detail Endpoint ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TeamParams {
    /// Starting position filter for auto paths: C, D or O
    pub position: Option<String>,
}

pub async fn team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<TeamParams>,
) -> Result<Json<TeamDetail>, ApiError> {
    let team = parse_team(&id)?;
    let position = match params.position.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            FieldPosition::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown position: {}", raw)))?,
        ),
    };

    let snapshot = load_snapshot(&state).await?;
    team_detail(&team, &snapshot.dataset, position)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No match data for team {}", team)))
}

// ── Compare Endpoint ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub left: Option<String>,
    pub right: Option<String>,
}

/// Each slot is looked up independently; an absent parameter leaves that
/// slot empty.
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Comparison>, ApiError> {
    let snapshot = load_snapshot(&state).await?;
    let mut comparison = Comparison::new();

    for (slot, raw) in [(Slot::Left, &params.left), (Slot::Right, &params.right)] {
        if let Some(raw) = raw.as_deref().filter(|r| !r.trim().is_empty()) {
            let team = parse_team(raw)?;
            comparison.search(slot, &team, &snapshot.dataset);
        }
    }

    Ok(Json(comparison))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get_json};
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_team_detail() {
        let (app, _) = app();
        let (status, json) = get_json(app, "/api/teams/226").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["statistics"]["team"], "226");
        assert_eq!(json["statistics"]["match_count"], 3);
        assert_eq!(json["flagged_matches"].as_array().unwrap().len(), 1);
        assert_eq!(json["flagged_matches"][0]["match_number"], 2);
        assert_eq!(json["comments"][0]["text"], "solid");
    }

    #[tokio::test]
    async fn test_team_detail_position_filter() {
        let (app, _) = app();
        let (_, json) = get_json(app, "/api/teams/226?position=C").await;

        let matches: Vec<u64> = json["auto_paths"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["match_number"].as_u64().unwrap())
            .collect();
        assert_eq!(matches, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_team_detail_bad_position() {
        let (app, _) = app();
        let (status, _) = get_json(app, "/api/teams/226?position=X").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_team_detail_unknown_team() {
        let (app, _) = app();
        let (status, json) = get_json(app, "/api/teams/9999").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_compare_slots_are_independent() {
        let (app, _) = app();
        let (status, json) = get_json(app, "/api/compare?left=254&right=9999").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["left"]["state"], "found");
        assert_eq!(json["left"]["team"], "254");
        assert_eq!(json["right"]["state"], "no_data");
        assert_eq!(json["right"]["team"], "9999");
    }

    #[tokio::test]
    async fn test_compare_empty_slot() {
        let (app, _) = app();
        let (_, json) = get_json(app, "/api/compare?left=226").await;

        assert_eq!(json["left"]["state"], "found");
        assert_eq!(json["right"]["state"], "empty");
    }
}
