use serde::{Deserialize, Serialize};

/// Response for the health and readiness endpoints
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
