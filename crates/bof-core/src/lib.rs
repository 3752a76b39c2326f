//! Core types and utilities for the bird-or-forest training pipeline.
//!
//! This crate provides the error type, the YAML configuration schema,
//! metrics records and shared CLI helpers used across the workspace.

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use cli::{load_yaml_config, setup_cli_logging};
pub use config::*;
pub use error::{Error, Result};
pub use metrics::*;
pub use types::*;
