use tokio::process::Command;

/// Determine the current user's name for mutation attribution.
///
/// Tries `git config --global user.name` first, then the usual environment
/// variables, and falls back to `"web-user"`.
pub async fn detect_username() -> String {
    if let Ok(output) = Command::new("git")
        .args(["config", "--global", "user.name"])
        .output()
        .await
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    for var in ["USER", "USERNAME", "LOGNAME"] {
        if let Ok(name) = std::env::var(var) {
            if !name.is_empty() {
                return name;
            }
        }
    }

    "web-user".to_string()
}
