use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::value::RawValue;
use serde_json::{json, Value};
use tracing::error;

use crate::models::{
    AddCommentRequest, AddDependencyRequest, AddLabelsRequest, CloseIssueRequest, CreateIssueRequest,
    ErrorResponse, UpdateNotesRequest, UpdatePriorityRequest, UpdateStatusRequest,
};
use crate::routes::AppState;
use crate::services::bd::BdError;

type JsonResult = Result<Json<Box<RawValue>>, (StatusCode, Json<ErrorResponse>)>;
type WrappedResult = Result<Json<Value>, (StatusCode, Json<ErrorResponse>)>;

fn bd_failure(action: &str, e: BdError) -> (StatusCode, Json<ErrorResponse>) {
    error!("Error {}: {}", action, e);
    ErrorResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed {}: {}", action, e))
}

/// Create a new issue via `bd create`.
pub async fn create_issue(State(state): State<Arc<AppState>>, Json(req): Json<CreateIssueRequest>) -> JsonResult {
    if req.title.is_empty() {
        return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Title is required"));
    }
    let args = create_args(&req);
    let raw = state.bd.run_json(args).await.map_err(|e| bd_failure("creating issue", e))?;
    Ok(Json(raw))
}

pub(crate) fn create_args(req: &CreateIssueRequest) -> Vec<String> {
    let mut args = vec!["create".to_string(), req.title.clone()];
    if let Some(t) = req.issue_type.as_deref().filter(|t| !t.is_empty()) {
        args.push("-t".to_string());
        args.push(t.to_string());
    }
    if let Some(p) = req.priority.filter(|p| *p > 0) {
        args.push("-p".to_string());
        args.push(p.to_string());
    }
    if let Some(d) = req.description.as_deref().filter(|d| !d.is_empty()) {
        args.push("-d".to_string());
        args.push(d.to_string());
    }
    if let Some(d) = req.design.as_deref().filter(|d| !d.is_empty()) {
        args.push("--design".to_string());
        args.push(d.to_string());
    }
    if let Some(a) = req.acceptance.as_deref().filter(|a| !a.is_empty()) {
        args.push("--acceptance".to_string());
        args.push(a.to_string());
    }
    // Explicit assignee wins; otherwise attribute to the requesting user.
    if let Some(a) = req.assignee.as_deref().filter(|a| !a.is_empty()) {
        args.push("-a".to_string());
        args.push(a.to_string());
    } else if let Some(u) = req.username.as_deref().filter(|u| !u.is_empty()) {
        args.push("-a".to_string());
        args.push(u.to_string());
    }
    if !req.labels.is_empty() {
        args.push("-l".to_string());
        args.push(req.labels.join(","));
    }
    args
}

/// Update an issue's status via `bd update -s`.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> JsonResult {
    if req.status.is_empty() {
        return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Status is required"));
    }
    let mut args = vec!["update".to_string(), id, "-s".to_string(), req.status];
    push_attribution(&mut args, req.username.as_deref());
    let raw = state.bd.run_json(args).await.map_err(|e| bd_failure("updating status", e))?;
    Ok(Json(raw))
}

/// Update an issue's priority via `bd update -p`.
pub async fn update_priority(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePriorityRequest>,
) -> JsonResult {
    let mut args = vec!["update".to_string(), id, "-p".to_string(), req.priority.to_string()];
    push_attribution(&mut args, req.username.as_deref());
    let raw = state.bd.run_json(args).await.map_err(|e| bd_failure("updating priority", e))?;
    Ok(Json(raw))
}

/// Close an issue via `bd close`. The close subcommand does not speak JSON,
/// so its output is wrapped.
pub async fn close_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CloseIssueRequest>,
) -> WrappedResult {
    let mut args = vec!["close".to_string(), id.clone()];
    if let Some(reason) = req.reason.as_deref().filter(|r| !r.is_empty()) {
        args.push("-r".to_string());
        args.push(reason.to_string());
    }
    let output = state.bd.run(&args).await.map_err(|e| bd_failure("closing issue", e))?;
    Ok(Json(json!({
        "success": true,
        "message": output,
        "issue_id": id,
    })))
}

/// Add a comment via `bd comments add`.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> JsonResult {
    if req.text.is_empty() {
        return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Comment text is required"));
    }
    let args = vec!["comments".to_string(), "add".to_string(), id, req.text];
    let raw = state.bd.run_json(args).await.map_err(|e| bd_failure("adding comment", e))?;
    Ok(Json(raw))
}

/// Update an issue's notes via `bd update --notes`.
pub async fn update_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotesRequest>,
) -> JsonResult {
    let mut args = vec!["update".to_string(), id, "--notes".to_string(), req.notes];
    push_attribution(&mut args, req.username.as_deref());
    let raw = state.bd.run_json(args).await.map_err(|e| bd_failure("updating notes", e))?;
    Ok(Json(raw))
}

/// Add labels via `bd label add`.
pub async fn add_labels(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddLabelsRequest>,
) -> WrappedResult {
    if req.labels.is_empty() {
        return Err(ErrorResponse::with_status(
            StatusCode::BAD_REQUEST,
            "At least one label is required",
        ));
    }
    let mut args = vec!["label".to_string(), "add".to_string(), id];
    args.extend(req.labels.iter().cloned());
    let output = state.bd.run(&args).await.map_err(|e| bd_failure("adding labels", e))?;
    Ok(Json(json!({
        "success": true,
        "message": output,
        "labels": req.labels,
    })))
}

/// Remove one label via `bd label remove`.
pub async fn remove_label(
    State(state): State<Arc<AppState>>,
    Path((id, label)): Path<(String, String)>,
) -> WrappedResult {
    let args = vec!["label".to_string(), "remove".to_string(), id, label];
    let output = state.bd.run(&args).await.map_err(|e| bd_failure("removing label", e))?;
    Ok(Json(json!({
        "success": true,
        "message": output,
    })))
}

/// Add a dependency via `bd dep add`, with a `type:target` spec.
pub async fn add_dependency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddDependencyRequest>,
) -> WrappedResult {
    if req.dependency_type.is_empty() || req.target_id.is_empty() {
        return Err(ErrorResponse::with_status(
            StatusCode::BAD_REQUEST,
            "Dependency type and target ID are required",
        ));
    }
    let spec = format!("{}:{}", req.dependency_type, req.target_id);
    let args = vec!["dep".to_string(), "add".to_string(), id, spec.clone()];
    let output = state.bd.run(&args).await.map_err(|e| bd_failure("adding dependency", e))?;
    Ok(Json(json!({
        "success": true,
        "message": output,
        "dependency": spec,
    })))
}

/// Remove a dependency via `bd dep remove`. The `dep` path segment carries
/// the `type:target` spec, e.g. `blocks:bd-123`.
pub async fn remove_dependency(
    State(state): State<Arc<AppState>>,
    Path((id, dep)): Path<(String, String)>,
) -> WrappedResult {
    let args = vec!["dep".to_string(), "remove".to_string(), id, dep];
    let output = state.bd.run(&args).await.map_err(|e| bd_failure("removing dependency", e))?;
    Ok(Json(json!({
        "success": true,
        "message": output,
    })))
}

fn push_attribution(args: &mut Vec<String>, username: Option<&str>) {
    if let Some(u) = username.filter(|u| !u.is_empty()) {
        args.push("-a".to_string());
        args.push(u.to_string());
    }
}
