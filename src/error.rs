//! Structured error types for configuration operations.
//!
//! Every error carries a stable code string (see [`ConfigError::code`]) so
//! callers can branch on the kind of failure without string-matching the
//! message.

use crate::parser::ConfigFormat;
use thiserror::Error;

/// Maximum number of characters of raw content embedded in a parse error.
const EXCERPT_LIMIT: usize = 200;

/// Errors produced by the configuration core.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A requested key does not exist in the aggregate configuration.
    #[error("Configuration not found: {key}")]
    NotFound { key: String },

    /// A remote configuration unit could not be loaded.
    ///
    /// Wraps remote-fetch failures and empty-content responses, carrying
    /// the descriptor identity and the underlying cause message.
    #[error("Failed to load configuration: {data_id}@{group}: {reason}")]
    Load {
        data_id: String,
        group: String,
        reason: String,
    },

    /// A mandatory construction option is missing or empty.
    #[error("Required option is missing: {option}")]
    MissingOption { option: &'static str },

    /// Raw content could not be parsed in the attempted format.
    ///
    /// Internal to the load pipeline: the aggregator always absorbs parse
    /// failures into the YAML/raw-text fallback chain.
    #[error("Failed to parse configuration as {format}: {message}")]
    Parse {
        format: ConfigFormat,
        message: String,
        excerpt: String,
    },
}

impl ConfigError {
    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::Load { .. } => "CONFIG_LOAD_ERROR",
            ConfigError::MissingOption { .. } => "VALIDATION_ERROR",
            ConfigError::Parse { .. } => "PARSE_ERROR",
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        ConfigError::NotFound { key: key.into() }
    }

    pub fn load_error(
        data_id: impl Into<String>,
        group: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        ConfigError::Load {
            data_id: data_id.into(),
            group: group.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing_option(option: &'static str) -> Self {
        ConfigError::MissingOption { option }
    }

    /// Build a parse error with a truncated excerpt of the offending content.
    pub fn parse_error(
        format: ConfigFormat,
        content: &str,
        message: impl std::fmt::Display,
    ) -> Self {
        ConfigError::Parse {
            format,
            message: message.to_string(),
            excerpt: truncate_excerpt(content),
        }
    }
}

fn truncate_excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_LIMIT) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
