use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::patch::CvPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Whether the user has acted on a proposed patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Pending,
    Applied,
    Skipped,
}

impl ChangeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChangeStatus::Applied | ChangeStatus::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_changes: Option<CvPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_status: Option<ChangeStatus>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            proposed_changes: None,
            change_status: None,
            created_at: Utc::now(),
        }
    }

    /// An assistant reply. A patch, when present, starts out pending.
    pub fn assistant(content: impl Into<String>, proposed_changes: Option<CvPatch>) -> Self {
        let change_status = proposed_changes.as_ref().map(|_| ChangeStatus::Pending);
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            proposed_changes,
            change_status,
            created_at: Utc::now(),
        }
    }
}
