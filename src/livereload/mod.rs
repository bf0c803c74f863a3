pub mod coordinator;
pub mod registry;
pub mod watcher;
pub mod ws;

pub use registry::{ClientId, ClientRegistry, ClientSender};
pub use watcher::{ChangeEvent, ChangeKind, WatchError};
