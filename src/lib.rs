//! Fleet back-office client
//!
//! Library behind the `fleet-admin` CLI: an authenticated client for the
//! trucking back-office REST API, the load stage workflow, list filtering,
//! form submission and dashboard aggregation.

pub mod client;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use client::{ApiClient, FormPayload, FormValue};
pub use config::EnvironmentConfig;
pub use state::{Session, SessionHandle};
pub use utils::errors::{AppError, AppResult};
