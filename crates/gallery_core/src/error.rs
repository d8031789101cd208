//! Core error types

use gallery_api::ApiError;
use thiserror::Error;

/// Errors surfaced by the gallery state machines
#[derive(Error, Debug)]
pub enum CoreError {
    /// A partial rescan was requested with every eligible leaf excluded.
    /// No network call is made.
    #[error("No folders selected for rescan")]
    EmptySelection,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Every error in this core is recoverable by user retry or
    /// navigation; this distinguishes the ones worth a retry button.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::EmptySelection => false,
            CoreError::Api(e) => e.is_retryable(),
            CoreError::Config(_) => false,
        }
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::EmptySelection => {
                "All folders are excluded; select at least one folder to rescan".to_string()
            }
            CoreError::Api(ApiError::NotFound(what)) => format!("Not found: {}", what),
            CoreError::Api(ApiError::Persistence(_)) => {
                "Saving failed; your changes are kept locally, try again".to_string()
            }
            _ => self.to_string(),
        }
    }
}
