use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity handed back by [`ClientRegistry::register`]; used to address the
/// connection in `unregister`.
pub type ClientId = Uuid;

/// Outbound half of a live-reload connection. The socket-forwarding task owns
/// the receiver end, so sending here never blocks on network I/O.
pub type ClientSender = mpsc::UnboundedSender<Message>;

struct RegistryState {
    clients: HashMap<ClientId, ClientSender>,
    /// `Some` while an idle-shutdown countdown is pending, `None` otherwise.
    /// Lives under the same lock as `clients`; they are always read together.
    shutdown_timer: Option<JoinHandle<()>>,
    /// Bumped on every register and every arm. A fired timer whose epoch is
    /// stale belongs to an earlier countdown and must not shut anything down.
    timer_epoch: u64,
}

/// Guarded set of live-reload clients plus the idle-shutdown timer.
///
/// Register, unregister and broadcast all serialize on one lock, so the timer
/// arm/disarm logic always observes a consistent client set. When the last
/// client disconnects a one-shot countdown is armed; if it elapses with the
/// set still empty the idle action runs (by default, process exit).
pub struct ClientRegistry {
    state: Arc<Mutex<RegistryState>>,
    grace: Duration,
    on_idle: Arc<dyn Fn() + Send + Sync>,
}

impl ClientRegistry {
    /// Registry whose idle action ends the process, the behavior the dev
    /// server wants: once the last browser tab closes and stays closed for
    /// the grace period, there is nobody left to serve.
    pub fn new(grace: Duration) -> Arc<Self> {
        Self::with_idle_action(grace, || std::process::exit(0))
    }

    /// Registry with an injected idle action, for callers (and tests) that
    /// need to observe the terminal transition instead of dying with it.
    pub fn with_idle_action(grace: Duration, on_idle: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(RegistryState {
                clients: HashMap::new(),
                shutdown_timer: None,
                timer_epoch: 0,
            })),
            grace,
            on_idle: Arc::new(on_idle),
        })
    }

    /// Add a client. A newly arrived client revokes any pending shutdown:
    /// the countdown is cancelled (best-effort) and its epoch invalidated in
    /// the same critical section, so a concurrently firing timer backs off.
    pub async fn register(&self, sender: ClientSender) -> ClientId {
        let id = Uuid::new_v4();
        let mut state = self.state.lock().await;
        state.clients.insert(id, sender);
        state.timer_epoch += 1;
        if let Some(timer) = state.shutdown_timer.take() {
            timer.abort();
            debug!("Cancelled pending idle shutdown");
        }
        id
    }

    /// Remove a client. Idempotent: removing an unknown or already-removed
    /// id is a no-op. If the set becomes empty, arms the idle-shutdown
    /// countdown.
    pub async fn unregister(&self, id: ClientId) {
        let mut state = self.state.lock().await;
        if state.clients.remove(&id).is_none() {
            return;
        }
        if !state.clients.is_empty() {
            return;
        }

        state.timer_epoch += 1;
        let epoch = state.timer_epoch;
        let shared = Arc::clone(&self.state);
        let on_idle = Arc::clone(&self.on_idle);
        let grace = self.grace;
        state.shutdown_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = shared.lock().await;
            // abort() in register is best-effort and can lose the race with
            // this task waking up. The re-check under the lock is what
            // actually decides: a client that arrived in the meantime, or a
            // newer countdown, means this one must not fire.
            if state.timer_epoch != epoch || !state.clients.is_empty() {
                return;
            }
            state.shutdown_timer = None;
            info!("No live-reload clients for {}s, shutting down", grace.as_secs_f64());
            // Still inside the critical section: a register landing now
            // blocks on the lock and cannot slip in before the idle action.
            on_idle();
        }));
    }

    /// Send `message` to every registered client. A client whose channel is
    /// gone is removed in the same pass; its failure never affects delivery
    /// to the others and is not an error of the broadcast.
    pub async fn broadcast(&self, message: &str) {
        let mut state = self.state.lock().await;
        let mut dead: Vec<ClientId> = Vec::new();
        for (id, sender) in state.clients.iter() {
            if sender.send(Message::Text(message.to_owned())).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            warn!("Dropping live-reload client {}: send failed", id);
            state.clients.remove(&id);
        }
    }

    /// Number of currently registered clients.
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    /// Whether an idle-shutdown countdown is currently pending.
    pub async fn shutdown_pending(&self) -> bool {
        self.state.lock().await.shutdown_timer.is_some()
    }
}
