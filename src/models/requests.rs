use serde::{Deserialize, Serialize};

/// Request body for creating a new issue
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub design: Option<String>,
    #[serde(default)]
    pub acceptance: Option<String>,
    /// For attribution when no explicit assignee is given
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for updating issue status
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for updating issue priority
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for closing an issue
#[derive(Debug, Serialize, Deserialize)]
pub struct CloseIssueRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for adding a comment
#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

/// Request body for updating issue notes
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for adding labels
#[derive(Debug, Serialize, Deserialize)]
pub struct AddLabelsRequest {
    pub labels: Vec<String>,
}

/// Request body for adding a dependency, e.g. `blocks:bd-123`
#[derive(Debug, Serialize, Deserialize)]
pub struct AddDependencyRequest {
    pub dependency_type: String,
    pub target_id: String,
}
