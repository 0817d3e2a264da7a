//! Load chat messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::de::opt_id;
use crate::utils::validation::validate_not_empty;

/// Message in a load's chat panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub load_id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub user: Option<i64>,
    pub message: Option<String>,
    pub file: Option<String>,
    pub field_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Free-text message posted to a load's chat
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewChatMessage {
    pub load_id: i64,
    #[validate(
        length(max = 2000, message = "message is too long"),
        custom = "validate_not_empty"
    )]
    pub message: String,
    pub user: Option<i64>,
}
