use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use super::UserId;

pub type TaskId = String;

pub const DEFAULT_STATUS: &str = "pending";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a fresh task; a blank status falls back to `"pending"`.
    pub fn new(owner_id: &str, title: String, description: String, status: String) -> Self {
        let status = if status.trim().is_empty() {
            DEFAULT_STATUS.to_string()
        } else {
            status
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title,
            description,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        // status is never blank
        if let Some(status) = update.status.filter(|s| !s.trim().is_empty()) {
            self.status = status;
        }
    }
}

/// Partial update: `None` leaves the field untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}
