use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation not tied to any relationship.
pub const GENERAL_CONVERSATION: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Sona,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Set when `text` is a canned failure message rather than a model reply.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(id: String, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            sender: Sender::User,
            timestamp,
            is_error: false,
        }
    }

    pub fn sona(id: String, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            sender: Sender::Sona,
            timestamp,
            is_error: false,
        }
    }
}
