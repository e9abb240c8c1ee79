use serde::{Deserialize, Serialize};

/// Outcome flag of an update request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Success,
    Error,
}

/// Update counts response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCountsResponse {
    pub status: UpdateStatus,
    pub message: String,
}

impl UpdateCountsResponse {
    /// Wraps the `(ok, message)` pair returned by the scheduler.
    pub fn from_report((ok, message): (bool, String)) -> Self {
        let status = if ok {
            UpdateStatus::Success
        } else {
            UpdateStatus::Error
        };
        Self { status, message }
    }

    pub fn is_success(&self) -> bool {
        self.status == UpdateStatus::Success
    }
}

/// Body of any failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
