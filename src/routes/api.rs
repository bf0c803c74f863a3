use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::config::Config;
use crate::handlers;
use crate::livereload::{self, ClientRegistry};
use crate::services::bd::BdClient;
use crate::tmpl::FileTemplateSet;

/// Everything the handlers need, injected rather than ambient.
pub struct AppState {
    pub config: Config,
    pub templates: Arc<FileTemplateSet>,
    pub registry: Arc<ClientRegistry>,
    pub bd: BdClient,
    pub username: String,
}

/// Create the application routes. The live-reload socket is only mounted in
/// development mode.
pub fn create_routes(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index_page))
        .route("/issue/:id", get(handlers::issue_page))
        .route("/healthz", get(handlers::health_check))
        .route("/readyz", get(handlers::ready_check))
        .route("/static/*path", get(handlers::static_file))
        .route("/api/whoami", get(handlers::whoami))
        .route("/api/issues", get(handlers::list_issues))
        .route("/api/issues/create", post(handlers::create_issue))
        .route("/api/issue/:id", get(handlers::get_issue))
        .route("/api/stats", get(handlers::stats))
        .route("/api/issue/status/:id", post(handlers::update_status))
        .route("/api/issue/priority/:id", post(handlers::update_priority))
        .route("/api/issue/close/:id", post(handlers::close_issue))
        .route("/api/issue/comments/:id", post(handlers::add_comment))
        .route("/api/issue/notes/:id", post(handlers::update_notes))
        .route("/api/issue/labels/:id", post(handlers::add_labels))
        .route("/api/issue/labels/:id/:label", delete(handlers::remove_label))
        .route("/api/issue/dependencies/:id", post(handlers::add_dependency))
        .route("/api/issue/dependencies/:id/:dep", delete(handlers::remove_dependency));

    if state.config.is_development() {
        router = router.route("/ws", get(livereload::ws::websocket_handler));
    }

    router.with_state(state)
}
