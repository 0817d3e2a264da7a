//! Configuration
//!
//! Environment-driven settings for the API client and the CLI.

pub mod environment;

pub use environment::*;
