//! PicStream backend HTTP client
//!
//! Thin request/response plumbing over `reqwest`. The state machines that
//! consume this live in `gallery_core`; this crate knows nothing about
//! pagination epochs or tri-state checkboxes.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;
