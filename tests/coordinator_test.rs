use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use beadview::livereload::{coordinator, ChangeEvent, ChangeKind, ClientRegistry};
use beadview::tmpl::{TemplateError, TemplateStore};
use tokio::sync::mpsc;

#[derive(Default)]
struct CountingStore {
    reparses: AtomicUsize,
    fail: bool,
}

impl TemplateStore for CountingStore {
    fn reparse_all(&self) -> Result<(), TemplateError> {
        self.reparses.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TemplateError::Parse {
                name: "index.html".to_string(),
                reason: "unclosed '{{' action".to_string(),
            });
        }
        Ok(())
    }
}

fn quiet_registry() -> Arc<ClientRegistry> {
    ClientRegistry::with_idle_action(Duration::from_secs(5), || {})
}

fn event(path: &str, kind: ChangeKind) -> ChangeEvent {
    ChangeEvent {
        path: PathBuf::from(path),
        kind,
    }
}

#[tokio::test]
async fn template_write_reparses_and_notifies_all_clients() {
    let registry = quiet_registry();
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    registry.register(tx_a).await;
    registry.register(tx_b).await;

    let store = CountingStore::default();
    let (etx, erx) = mpsc::unbounded_channel();
    etx.send(event("templates/index.html", ChangeKind::Write)).unwrap();
    drop(etx);

    coordinator::run(erx, &store, &registry, Path::new("templates"))
        .await
        .unwrap();

    assert_eq!(store.reparses.load(Ordering::SeqCst), 1);
    assert_eq!(rx_a.recv().await.unwrap(), Message::Text("reload".to_string()));
    assert_eq!(rx_b.recv().await.unwrap(), Message::Text("reload".to_string()));
}

#[tokio::test]
async fn static_asset_change_broadcasts_without_reparse() {
    let registry = quiet_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register(tx).await;

    let store = CountingStore::default();
    let (etx, erx) = mpsc::unbounded_channel();
    etx.send(event("static/app.js", ChangeKind::Write)).unwrap();
    drop(etx);

    coordinator::run(erx, &store, &registry, Path::new("templates"))
        .await
        .unwrap();

    assert_eq!(store.reparses.load(Ordering::SeqCst), 0);
    assert_eq!(rx.recv().await.unwrap(), Message::Text("reload".to_string()));
}

#[tokio::test]
async fn created_template_also_triggers_reparse() {
    let registry = quiet_registry();
    let store = CountingStore::default();
    let (etx, erx) = mpsc::unbounded_channel();
    etx.send(event("templates/new_view.html", ChangeKind::Create)).unwrap();
    drop(etx);

    coordinator::run(erx, &store, &registry, Path::new("templates"))
        .await
        .unwrap();

    assert_eq!(store.reparses.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_are_not_coalesced() {
    let registry = quiet_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register(tx).await;

    let store = CountingStore::default();
    let (etx, erx) = mpsc::unbounded_channel();
    for _ in 0..3 {
        etx.send(event("templates/index.html", ChangeKind::Write)).unwrap();
    }
    drop(etx);

    coordinator::run(erx, &store, &registry, Path::new("templates"))
        .await
        .unwrap();

    assert_eq!(store.reparses.load(Ordering::SeqCst), 3);
    for _ in 0..3 {
        assert_eq!(rx.recv().await.unwrap(), Message::Text("reload".to_string()));
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn reparse_failure_stops_the_coordinator_before_broadcasting() {
    let registry = quiet_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register(tx).await;

    let store = CountingStore {
        reparses: AtomicUsize::new(0),
        fail: true,
    };
    let (etx, erx) = mpsc::unbounded_channel();
    etx.send(event("templates/index.html", ChangeKind::Write)).unwrap();
    drop(etx);

    let err = coordinator::run(erx, &store, &registry, Path::new("templates"))
        .await
        .unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }));
    assert!(rx.try_recv().is_err(), "broadcast went out despite a broken template");
}
