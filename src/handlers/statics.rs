use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::routes::AppState;

/// Serve a file from the static root, falling back to the template root.
pub async fn static_file(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    // No path traversal out of the asset roots.
    if path.split('/').any(|seg| seg == "..") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let candidates = [
        FsPath::new(&state.config.static_dir).join(&path),
        state.templates.root().join(&path),
    ];

    for candidate in &candidates {
        if let Ok(content) = tokio::fs::read(candidate).await {
            debug!("Serving static file {}", candidate.display());
            let mut response = content.into_response();
            if let Some(ct) = content_type(&path) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(ct));
            }
            return response;
        }
    }

    StatusCode::NOT_FOUND.into_response()
}

fn content_type(path: &str) -> Option<&'static str> {
    if path.ends_with(".css") {
        Some("text/css; charset=utf-8")
    } else if path.ends_with(".js") {
        Some("application/javascript; charset=utf-8")
    } else if path.ends_with(".html") {
        Some("text/html; charset=utf-8")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type("app.js"), Some("application/javascript; charset=utf-8"));
        assert_eq!(content_type("style.css"), Some("text/css; charset=utf-8"));
        assert_eq!(content_type("logo.png"), None);
    }
}
