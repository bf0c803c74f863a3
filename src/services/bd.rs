use std::io;
use std::path::PathBuf;

use serde_json::value::RawValue;
use tokio::process::Command;
use tracing::debug;

/// Thin wrapper around the external `bd` command-line tool. All issue reads
/// and mutations go through it; this service only builds argument vectors,
/// runs the binary and hands the output back.
#[derive(Debug, Clone)]
pub struct BdClient {
    bin: PathBuf,
}

impl BdClient {
    /// Use the configured binary path, or fall back to `bd` on PATH.
    pub fn new(bin: Option<String>) -> Self {
        Self {
            bin: bin.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("bd")),
        }
    }

    /// Run `bd` with the given arguments and return its combined
    /// stdout/stderr output. A non-zero exit carries the output along so the
    /// caller can surface the tool's own diagnostic.
    pub async fn run(&self, args: &[String]) -> Result<String, BdError> {
        debug!("Running {} {}", self.bin.display(), args.join(" "));
        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|e| BdError::Spawn(self.bin.clone(), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(BdError::Failed {
                status: output.status.code(),
                output: combined,
            });
        }
        Ok(combined)
    }

    /// Run a `bd` subcommand that speaks JSON: appends `--json` when absent
    /// and validates the output, returned raw for flexible downstream
    /// handling.
    pub async fn run_json(&self, mut args: Vec<String>) -> Result<Box<RawValue>, BdError> {
        if !args.iter().any(|a| a == "--json") {
            args.push("--json".to_string());
        }
        let output = self.run(&args).await?;
        serde_json::from_str::<Box<RawValue>>(&output).map_err(|e| BdError::Json(e, output))
    }
}

#[derive(Debug)]
pub enum BdError {
    Spawn(PathBuf, io::Error),
    Failed { status: Option<i32>, output: String },
    Json(serde_json::Error, String),
}

impl std::fmt::Display for BdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BdError::Spawn(bin, e) => write!(f, "cannot run '{}': {}", bin.display(), e),
            BdError::Failed { status, output } => match status {
                Some(code) => write!(f, "bd exited with status {}: {}", code, output.trim_end()),
                None => write!(f, "bd terminated by signal: {}", output.trim_end()),
            },
            BdError::Json(e, output) => {
                write!(f, "failed to parse bd JSON output: {} (output: {})", e, output.trim_end())
            }
        }
    }
}

impl std::error::Error for BdError {}
