use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::value::RawValue;
use tracing::error;

use crate::models::{ErrorResponse, Issue};
use crate::routes::AppState;

/// List issues, filtered and sorted for the index view.
///
/// The full set comes from `bd list --json`; search, status and priority
/// filtering happen in-process on the decoded issues (status and priority
/// arrive as repeated checkbox params). Sorted by `updated_at` descending,
/// capped at 100.
pub async fn list_issues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Issue>>, (StatusCode, Json<ErrorResponse>)> {
    let raw = state.bd.run_json(vec!["list".to_string()]).await.map_err(|e| {
        error!("Error listing issues: {}", e);
        ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to list issues: {}", e))
    })?;

    let issues: Vec<Issue> = serde_json::from_str(raw.get()).map_err(|e| {
        error!("Error decoding issue list: {}", e);
        ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to decode issue list: {}", e))
    })?;

    let search = params
        .iter()
        .find(|(k, _)| k == "search")
        .map(|(_, v)| v.as_str())
        .unwrap_or("");
    let statuses: Vec<&str> = params.iter().filter(|(k, _)| k == "status").map(|(_, v)| v.as_str()).collect();
    let priorities: Vec<i64> = params
        .iter()
        .filter(|(k, _)| k == "priority")
        .filter_map(|(_, v)| v.parse().ok())
        .collect();

    let mut issues = filter_issues(issues, search, &statuses, &priorities);

    // Most recently modified first
    issues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    issues.truncate(100);

    Ok(Json(issues))
}

pub(crate) fn filter_issues(issues: Vec<Issue>, search: &str, statuses: &[&str], priorities: &[i64]) -> Vec<Issue> {
    let search = search.to_lowercase();
    issues
        .into_iter()
        .filter(|issue| {
            search.is_empty()
                || issue.title.to_lowercase().contains(&search)
                || issue.id.to_lowercase().contains(&search)
        })
        .filter(|issue| statuses.is_empty() || statuses.iter().any(|s| issue.has_status(s)))
        .filter(|issue| priorities.is_empty() || priorities.contains(&issue.priority))
        .collect()
}

/// Fetch one issue by id, passed through from `bd show` unmodified.
pub async fn get_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Box<RawValue>>, (StatusCode, Json<ErrorResponse>)> {
    if id.is_empty() {
        return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Issue ID required"));
    }
    let raw = state
        .bd
        .run_json(vec!["show".to_string(), id.clone()])
        .await
        .map_err(|e| {
            error!("Error fetching issue '{}': {}", id, e);
            ErrorResponse::with_status(StatusCode::NOT_FOUND, format!("Issue not found: {}", e))
        })?;
    Ok(Json(raw))
}

/// Overall issue statistics, passed through from `bd stats` unmodified.
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Box<RawValue>>, (StatusCode, Json<ErrorResponse>)> {
    let raw = state.bd.run_json(vec!["stats".to_string()]).await.map_err(|e| {
        error!("Error fetching stats: {}", e);
        ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to fetch stats: {}", e))
    })?;
    Ok(Json(raw))
}

/// Detected username for mutation attribution in the front end.
pub async fn whoami(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "username": state.username }))
}
