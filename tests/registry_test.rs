use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use beadview::livereload::ClientRegistry;
use tokio::sync::mpsc;
use uuid::Uuid;

fn client() -> (mpsc::UnboundedSender<Message>, mpsc::UnboundedReceiver<Message>) {
    mpsc::unbounded_channel()
}

fn counting_registry(grace: Duration) -> (Arc<ClientRegistry>, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    let registry = ClientRegistry::with_idle_action(grace, move || {
        f.fetch_add(1, Ordering::SeqCst);
    });
    (registry, fired)
}

#[tokio::test]
async fn broadcast_reaches_every_client_exactly_once() {
    let (registry, _) = counting_registry(Duration::from_secs(5));
    let (tx_a, mut rx_a) = client();
    let (tx_b, mut rx_b) = client();
    registry.register(tx_a).await;
    registry.register(tx_b).await;

    registry.broadcast("reload").await;

    for rx in [&mut rx_a, &mut rx_b] {
        assert_eq!(rx.recv().await.unwrap(), Message::Text("reload".to_string()));
        assert!(rx.try_recv().is_err(), "client received the message twice");
    }
}

#[tokio::test]
async fn failed_send_evicts_only_the_broken_client() {
    let (registry, _) = counting_registry(Duration::from_secs(5));
    let (tx_a, mut rx_a) = client();
    let (tx_b, rx_b) = client();
    registry.register(tx_a).await;
    registry.register(tx_b).await;

    // B's receiving side is gone, so the next send to it fails.
    drop(rx_b);

    registry.broadcast("reload").await;
    assert_eq!(registry.client_count().await, 1);
    assert_eq!(rx_a.recv().await.unwrap(), Message::Text("reload".to_string()));

    // B stays gone; A keeps receiving.
    registry.broadcast("reload").await;
    assert_eq!(rx_a.recv().await.unwrap(), Message::Text("reload".to_string()));
    assert_eq!(registry.client_count().await, 1);
}

#[tokio::test]
async fn broadcast_never_arms_the_shutdown_timer() {
    let (registry, fired) = counting_registry(Duration::from_millis(20));
    let (tx, rx) = client();
    registry.register(tx).await;
    drop(rx);

    // Eviction via broadcast empties the set, but only unregister arms.
    registry.broadcast("reload").await;
    assert_eq!(registry.client_count().await, 0);
    assert!(!registry.shutdown_pending().await);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn idle_timer_fires_exactly_once_after_grace() {
    let (registry, fired) = counting_registry(Duration::from_millis(40));
    let (tx, _rx) = client();
    let id = registry.register(tx).await;
    registry.unregister(id).await;

    assert!(registry.shutdown_pending().await);
    assert_eq!(fired.load(Ordering::SeqCst), 0, "fired before the grace period");

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reconnect_within_grace_cancels_shutdown() {
    let (registry, fired) = counting_registry(Duration::from_millis(80));
    let (tx_a, _rx_a) = client();
    let id = registry.register(tx_a).await;
    registry.unregister(id).await;
    assert!(registry.shutdown_pending().await);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let (tx_b, _rx_b) = client();
    registry.register(tx_b).await;
    assert!(!registry.shutdown_pending().await);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn register_racing_a_firing_timer_prevents_exit() {
    // Zero grace: the countdown is already due when the new client arrives,
    // so cancellation has lost the race and only the fire-time re-check can
    // keep the process alive.
    let (registry, fired) = counting_registry(Duration::from_millis(0));
    let (tx_a, _rx_a) = client();
    let id = registry.register(tx_a).await;
    registry.unregister(id).await;

    let (tx_b, _rx_b) = client();
    registry.register(tx_b).await;

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(registry.client_count().await, 1);
}

#[tokio::test]
async fn unregister_is_idempotent() {
    let (registry, _) = counting_registry(Duration::from_secs(5));
    let (tx_a, _rx_a) = client();
    let (tx_b, _rx_b) = client();
    let a = registry.register(tx_a).await;
    registry.register(tx_b).await;

    registry.unregister(a).await;
    registry.unregister(a).await;
    registry.unregister(Uuid::new_v4()).await;

    // B is still there, so nothing was armed by the redundant calls.
    assert_eq!(registry.client_count().await, 1);
    assert!(!registry.shutdown_pending().await);
}

#[tokio::test]
async fn double_unregister_after_empty_does_not_rearm() {
    let (registry, fired) = counting_registry(Duration::from_millis(40));
    let (tx, _rx) = client();
    let id = registry.register(tx).await;

    registry.unregister(id).await;
    assert!(registry.shutdown_pending().await);
    registry.unregister(id).await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
