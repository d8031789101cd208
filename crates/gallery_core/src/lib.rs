//! PicStream Gallery Core Domain Logic
//!
//! This crate contains:
//! - Folder selection tree (tri-state exclusion over a folder hierarchy)
//! - Gallery pagination state (filtered, epoch-guarded page loading)
//! - Scan submission and status polling
//! - Debounced folder/file search
//! - Viewer state (neighbors, favorites, random pick)
//! - Configuration
//!
//! Stores are dependency-injected handles, not ambient singletons: build
//! them around an `ApiClient` (or any implementation of the traits in
//! [`backend`]) and share them via `Arc`. Change notification goes through
//! `tokio::sync::watch`.

pub mod backend;
pub mod config;
pub mod error;
pub mod gallery;
pub mod scan;
pub mod search;
pub mod selection;
pub mod viewer;

pub use backend::{FolderSource, PhotoAccess, PhotoListing, ScanControl, SearchSource};
pub use config::{GalleryConfig, GallerySettings, ScanSettings, SearchSettings, ServerConfig};
pub use error::CoreError;
pub use gallery::{FilterState, GallerySnapshot, GalleryStore, GridView};
pub use scan::{ScanMonitor, ScanOutcome, ScanPhase};
pub use search::SearchDebouncer;
pub use selection::{check_state, leaf_paths, subtree_paths, CheckState, SelectionTree};
pub use viewer::{Viewer, ViewerState};
