use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::livereload::registry::ClientRegistry;
use crate::livereload::watcher::ChangeEvent;
use crate::tmpl::{TemplateError, TemplateStore};

/// Consume change events from the watcher: template changes trigger a full
/// re-parse, and every event ends in a `"reload"` broadcast so connected
/// browsers refresh.
///
/// Events are handled one at a time with no coalescing; a burst of N events
/// is N re-parse/broadcast cycles. Returns only when the event source closes
/// (`Ok`) or a re-parse fails (`Err`, fatal to the caller: a broken template
/// must not keep serving silently).
pub async fn run<S: TemplateStore>(
    mut events: UnboundedReceiver<ChangeEvent>,
    store: &S,
    registry: &Arc<ClientRegistry>,
    templates_root: &Path,
) -> Result<(), TemplateError> {
    while let Some(event) = events.recv().await {
        info!("File changed: {}", event.path.display());
        if is_template(&event.path, templates_root) {
            info!("Re-parsing templates");
            store.reparse_all()?;
        }
        debug!("Broadcasting reload to clients");
        registry.broadcast("reload").await;
    }
    Ok(())
}

/// A change qualifies for re-parse when it is under the template root and
/// carries the template extension.
fn is_template(path: &Path, templates_root: &Path) -> bool {
    path.starts_with(templates_root) && path.extension().is_some_and(|ext| ext == "html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn template_html_under_root_qualifies() {
        let root = PathBuf::from("assets/templates");
        assert!(is_template(&root.join("index.html"), &root));
        assert!(is_template(&root.join("sub/detail.html"), &root));
    }

    #[test]
    fn static_assets_and_foreign_paths_do_not_qualify() {
        let root = PathBuf::from("assets/templates");
        assert!(!is_template(&PathBuf::from("assets/static/app.js"), &root));
        assert!(!is_template(&root.join("notes.txt"), &root));
        assert!(!is_template(&PathBuf::from("index.html"), &root));
    }
}
