//! Core error types for habitquest-core.
//!
//! Validation and stage errors are user-correctable and are returned to the
//! caller without being logged as failures. Store and auth errors come from
//! the external collaborators.

use std::path::PathBuf;
use thiserror::Error;

use crate::setup::Stage;

/// Core error type for habitquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected by an onboarding or editing rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Action invoked at a stage that does not allow it
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Persistence collaborator errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity collaborator errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors raised by the setup machine and the tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fewer than five goals filled in
    #[error("Please input all five goals ({filled} of 5 filled)")]
    IncompleteGoals { filled: usize },

    /// The same goal text appears more than once
    #[error("Goals must be unique: '{goal}' appears more than once")]
    DuplicateGoal { goal: String },

    /// Selection does not contain exactly two goals
    #[error("Please choose exactly 2 goals ({selected} selected)")]
    SelectionCount { selected: usize },

    /// Goal is not part of the goal set
    #[error("Unknown goal: '{goal}'")]
    UnknownGoal { goal: String },

    /// A selected goal is missing habits
    #[error("Please fill in all 3 habits for selected goal {goal_index}")]
    IncompleteHabits { goal_index: usize },

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Stage gating errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("'{action}' is not permitted at stage '{stage}'")]
    NotPermitted { action: &'static str, stage: Stage },
}

/// Errors surfaced by a [`crate::store::DocumentStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend-reported failure
    #[error("Store backend failure: {0}")]
    Backend(String),

    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Document could not be encoded or decoded
    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored document is not a JSON object
    #[error("Stored document for '{user_id}' is corrupt: {message}")]
    Corrupt { user_id: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identity errors.
///
/// `EmailNotVerified` is a distinct recoverable condition: callers should
/// route it to a verification prompt, see [`AuthError::needs_verification`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email ({email}) before continuing")]
    EmailNotVerified { email: String },

    #[error("No user is signed in")]
    SignedOut,
}

impl AuthError {
    pub fn needs_verification(&self) -> bool {
        matches!(self, AuthError::EmailNotVerified { .. })
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl CoreError {
    /// Whether the error is a user-correctable input problem.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::Stage(_))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_is_distinct_from_bad_credentials() {
        let unverified = AuthError::EmailNotVerified {
            email: "a@b.c".into(),
        };
        assert!(unverified.needs_verification());
        assert!(!AuthError::InvalidCredentials.needs_verification());
    }

    #[test]
    fn validation_errors_are_user_correctable() {
        let err: CoreError = ValidationError::SelectionCount { selected: 1 }.into();
        assert!(err.is_user_correctable());
        let err: CoreError = StoreError::Backend("down".into()).into();
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn stage_error_names_stage() {
        let err = StageError::NotPermitted {
            action: "editGoal",
            stage: Stage::Habits,
        };
        assert_eq!(err.to_string(), "'editGoal' is not permitted at stage 'habits'");
    }
}
