use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use beadview::config::Config;
use beadview::livereload::{coordinator, watcher, ClientRegistry};
use beadview::routes::{create_routes, AppState};
use beadview::services::{bd::BdClient, whoami};
use beadview::tmpl::FileTemplateSet;

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "beadview=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Detect username for attribution
    let username = whoami::detect_username().await;
    info!("Detected username: {}", username);

    // A broken template must not run silently: initial parse is fatal.
    let templates = match FileTemplateSet::load(&config.templates_dir) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            error!("Failed to parse templates: {}", e);
            std::process::exit(1);
        }
    };

    let registry = ClientRegistry::new(Duration::from_secs(config.shutdown_grace_secs));
    let bd = BdClient::new(config.bd_bin.clone());

    let dev = config.is_development();
    let templates_root = PathBuf::from(&config.templates_dir);
    let static_root = PathBuf::from(&config.static_dir);
    let addr = config.server_address();

    let state = Arc::new(AppState {
        config,
        templates: templates.clone(),
        registry: registry.clone(),
        bd,
        username,
    });

    if dev {
        info!("Development mode enabled with live reload");

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let roots = vec![templates_root.clone(), static_root];

        // The watch loop is blocking and long-lived; it gets its own thread.
        std::thread::spawn(move || {
            if let Err(e) = watcher::watch_files(&roots, tx) {
                error!("Failed to start file watcher: {}", e);
                std::process::exit(1);
            }
        });

        let coord_templates = templates.clone();
        let coord_registry = registry.clone();
        tokio::spawn(async move {
            if let Err(e) =
                coordinator::run(rx, coord_templates.as_ref(), &coord_registry, &templates_root).await
            {
                error!("Template re-parse failed: {}", e);
                std::process::exit(1);
            }
        });
    }

    // Combine all routes with a tracing layer
    let app = create_routes(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", addr));

    info!("Server running on http://{}", addr);
    if dev {
        info!("Live reload available at ws://{}/ws", addr);
    }

    axum::serve(listener, app).await.expect("Server failed to start");
}
