use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::models::ErrorResponse;
use crate::routes::AppState;

/// Index page, served from the current template snapshot.
pub async fn index_page(State(state): State<Arc<AppState>>) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    serve_template(&state, "index.html")
}

/// Issue detail page. The id is resolved client-side against the API; the
/// server only hands out the artifact.
pub async fn issue_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    if id.is_empty() {
        return Err(ErrorResponse::with_status(StatusCode::BAD_REQUEST, "Issue ID required"));
    }
    serve_template(&state, "detail.html")
}

fn serve_template(state: &AppState, name: &str) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    match state.templates.get(name) {
        Some(tmpl) => Ok((
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            tmpl.source,
        )
            .into_response()),
        None => {
            error!("Template '{}' not found in cache", name);
            Err(ErrorResponse::with_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template '{}' not found", name),
            ))
        }
    }
}
