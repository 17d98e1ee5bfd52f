//! Error types for loading definitions and configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to parse definitions: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{kind} definition has an empty id")]
    EmptyId { kind: &'static str },

    #[error("definition `{id}` is invalid: {reason}")]
    Invalid { id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config field `{field}` is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
