//! Error handling
//!
//! Every fallible operation of the client returns `AppResult<T>`. Backend
//! failures keep the backend's own message when it is shaped the way the API
//! usually answers, and fall back to a generic message otherwise.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::models::load::LoadStage;

/// Generic message used when the backend error body carries nothing usable
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again";

/// Main client error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not authenticated, run `fleet-admin login` first")]
    NotAuthenticated,

    #[error("Please fill the {label} field ({stage} stage)", label = field_label(.field))]
    MissingField {
        stage: LoadStage,
        field: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Typed result for fallible client operations
pub type AppResult<T> = Result<T, AppError>;

/// Human label of a record field: `total_miles` -> `total miles`
pub fn field_label(field: &str) -> String {
    field.replace('_', " ")
}

/// Build an `AppError::Api` from a non-2xx status and its raw body
pub fn api_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| backend_message(&value))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

    AppError::Api { status, message }
}

/// Extract the backend's error message from a JSON error body.
///
/// Recognised shapes: `{"detail": ".."}`, `{"message": ".."}`,
/// `{"error": ".."}` and field errors `{"field": [".."]}`.
pub fn backend_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    for key in ["detail", "message", "error"] {
        if let Some(Value::String(message)) = object.get(key) {
            return Some(message.clone());
        }
    }

    object.iter().find_map(|(field, value)| match value {
        Value::Array(messages) => messages
            .first()
            .and_then(Value::as_str)
            .map(|message| format!("{}: {}", field, message)),
        Value::String(message) => Some(format!("{}: {}", field, message)),
        _ => None,
    })
}

/// Helper for missing records
pub fn not_found_error(resource: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}
