//! Utilities
//!
//! Error types and validation helpers shared across the client.

pub mod errors;
pub mod validation;

pub use errors::{AppError, AppResult};
