//! API error taxonomy
//!
//! Read paths are best-effort in this application: callers usually degrade
//! to an empty result on `Transport`. Write paths surface the error and
//! keep prior state so the action can be retried. Nothing here is fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid root folder, missing photo, or any other 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write (settings, exclusion set, tag mutation) was rejected or
    /// failed in transit; in-memory working state is left untouched
    #[error("Save failed: {0}")]
    Persistence(String),

    /// Generic network or server failure on a read path
    #[error("Backend request failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when retrying the same action may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::NotFound(_))
    }
}
