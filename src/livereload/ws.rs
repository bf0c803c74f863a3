use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::info;

use crate::routes::AppState;

/// Live-reload WebSocket handler
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("New live-reload WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry.clone()))
}

/// Handle one live-reload connection
async fn handle_socket(socket: WebSocket, registry: Arc<crate::livereload::ClientRegistry>) {
    let (mut sender, mut receiver) = socket.split();

    // The registry holds the channel half; this task does the actual socket
    // writes, so a slow peer never stalls a broadcast pass.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let id = registry.register(tx).await;
    info!("Live-reload client connected: {}", id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Read loop exists only to notice the peer going away; incoming payloads
    // are not interpreted.
    let mut recv_task = tokio::spawn(async move { while let Some(Ok(_)) = receiver.next().await {} });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    registry.unregister(id).await;
    info!("Live-reload client disconnected: {}", id);
}
