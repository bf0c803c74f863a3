use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::info;

/// One template, parsed and ready to serve.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub name: String,
    pub source: String,
}

/// The parsed form of every template file, keyed by file name.
pub type TemplateSet = HashMap<String, ParsedTemplate>;

/// Seam between the reload coordinator and whatever holds the parsed
/// templates. The coordinator only ever asks for a full rebuild.
pub trait TemplateStore: Send + Sync {
    fn reparse_all(&self) -> Result<(), TemplateError>;
}

/// Template cache backed by a directory of `.html` files.
///
/// Request handlers read a snapshot (`Arc<TemplateSet>`) while the reload
/// coordinator rebuilds: the replacement set is built fully aside and then
/// swapped in, so a reader never observes a half-rebuilt cache. The lock is
/// only ever held to clone or replace the `Arc`, never across I/O.
#[derive(Debug)]
pub struct FileTemplateSet {
    root: PathBuf,
    current: RwLock<Arc<TemplateSet>>,
}

impl FileTemplateSet {
    /// Parse every template under `root`. An unreadable or malformed file,
    /// or an empty template directory, fails the whole load.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        let root = root.into();
        let set = parse_dir(&root)?;
        Ok(Self {
            root,
            current: RwLock::new(Arc::new(set)),
        })
    }

    /// Directory the templates are loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current immutable snapshot of the parsed templates.
    pub fn snapshot(&self) -> Arc<TemplateSet> {
        self.current.read().expect("template set lock poisoned").clone()
    }

    /// Look up one template by file name in the current snapshot.
    pub fn get(&self, name: &str) -> Option<ParsedTemplate> {
        self.snapshot().get(name).cloned()
    }
}

impl TemplateStore for FileTemplateSet {
    fn reparse_all(&self) -> Result<(), TemplateError> {
        let set = parse_dir(&self.root)?;
        *self.current.write().expect("template set lock poisoned") = Arc::new(set);
        Ok(())
    }
}

fn parse_dir(root: &Path) -> Result<TemplateSet, TemplateError> {
    let entries = fs::read_dir(root).map_err(|e| TemplateError::Io(root.to_path_buf(), e))?;

    let mut set = TemplateSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| TemplateError::Io(root.to_path_buf(), e))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".html") {
            continue;
        }
        let source = fs::read_to_string(&path).map_err(|e| TemplateError::Io(path.clone(), e))?;
        check_actions(name, &source)?;
        set.insert(
            name.to_string(),
            ParsedTemplate {
                name: name.to_string(),
                source,
            },
        );
    }

    if set.is_empty() {
        return Err(TemplateError::Empty(root.to_path_buf()));
    }

    let mut names: Vec<&str> = set.keys().map(String::as_str).collect();
    names.sort_unstable();
    info!("Parsed {} templates: {}", set.len(), names.join(", "));
    Ok(set)
}

/// Validate that `{{`/`}}` action delimiters pair up. Rendering is out of
/// this crate's hands; this is the structural check that makes a saved-but-
/// broken template fail loudly instead of serving garbage.
fn check_actions(name: &str, source: &str) -> Result<(), TemplateError> {
    let bytes = source.as_bytes();
    let mut depth = 0u32;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if &bytes[i..i + 2] == b"{{" {
            depth += 1;
            i += 2;
        } else if &bytes[i..i + 2] == b"}}" {
            if depth == 0 {
                return Err(TemplateError::Parse {
                    name: name.to_string(),
                    reason: "unexpected '}}' with no open action".to_string(),
                });
            }
            depth -= 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    if depth != 0 {
        return Err(TemplateError::Parse {
            name: name.to_string(),
            reason: "unclosed '{{' action".to_string(),
        });
    }
    Ok(())
}

#[derive(Debug)]
pub enum TemplateError {
    Io(PathBuf, io::Error),
    Parse { name: String, reason: String },
    Empty(PathBuf),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Io(path, e) => write!(f, "error reading template '{}': {}", path.display(), e),
            TemplateError::Parse { name, reason } => {
                write!(f, "error parsing template '{}': {}", name, reason)
            }
            TemplateError::Empty(root) => {
                write!(f, "no templates found in '{}'", root.display())
            }
        }
    }
}

impl std::error::Error for TemplateError {}
