//! Shared types, error model, and configuration for the prospect brief generator.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`BriefError`]: the unified error type
//! - Domain types ([`AccountRecord`], [`CaseStudyRecord`], [`RunResult`])
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnthropicConfig, AppConfig, ClientSettings, DefaultsConfig, RenderConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{BriefError, Result};
pub use types::{AccountRecord, CaseStudyRecord, RunResult, RunStatus};
