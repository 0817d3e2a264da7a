//! CLI commands
//!
//! Each subcommand owns its clap `Args` and an `execute` entry point taking
//! the shared API client.

pub mod auth;
pub mod dashboard;
pub mod ledger;
pub mod load;
pub mod prompt;
pub mod records;

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::utils::errors::{AppError, AppResult};

/// Read a JSON object (form state) from a file
pub fn read_form_file(path: &Path) -> AppResult<Map<String, Value>> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str(&raw)? {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::Config(format!(
            "{} must hold a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `name=value` where the value is JSON when it parses, a string otherwise
pub fn parse_assignment(raw: &str) -> Option<(String, Value)> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Some((name.to_string(), value))
}
