//! Backend seams consumed by the state machines
//!
//! The stores talk to these traits instead of `ApiClient` directly so tests
//! can drive them with in-memory fakes. `ApiClient` implements all of them
//! by delegation.

use async_trait::async_trait;
use gallery_api::{ApiClient, ApiError};
use gallery_proto::{
    FolderNode, ListQuery, Neighbors, Photo, PhotoListResponse, ScanStatus, SearchResponse,
    SortBy, SortOrder,
};

/// Paged photo listings for the gallery grid
#[async_trait]
pub trait PhotoListing: Send + Sync {
    async fn list_photos(&self, query: &ListQuery) -> Result<PhotoListResponse, ApiError>;
}

/// Folder hierarchy plus the persisted exclusion set
#[async_trait]
pub trait FolderSource: Send + Sync {
    async fn browse_folders(
        &self,
        root: &str,
        extensions: &str,
    ) -> Result<Vec<FolderNode>, ApiError>;

    async fn excluded_folders(&self) -> Result<Vec<String>, ApiError>;

    async fn save_excluded_folders(&self, excluded: Vec<String>) -> Result<(), ApiError>;
}

/// Scan triggers and progress
#[async_trait]
pub trait ScanControl: Send + Sync {
    async fn start_scan(&self) -> Result<(), ApiError>;

    async fn start_partial_scan(&self, folders: Vec<String>) -> Result<(), ApiError>;

    async fn scan_status(&self) -> Result<ScanStatus, ApiError>;
}

/// Folder/file name search
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError>;
}

/// Single-photo access for the viewer
#[async_trait]
pub trait PhotoAccess: Send + Sync {
    async fn photo(&self, id: i64) -> Result<Photo, ApiError>;

    async fn neighbors(
        &self,
        id: i64,
        sort_by: SortBy,
        sort_order: SortOrder,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Neighbors, ApiError>;

    async fn random_photo(
        &self,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Photo, ApiError>;

    async fn set_favorite(&self, id: i64, is_favorite: bool) -> Result<Photo, ApiError>;
}

#[async_trait]
impl PhotoListing for ApiClient {
    async fn list_photos(&self, query: &ListQuery) -> Result<PhotoListResponse, ApiError> {
        ApiClient::list_photos(self, query).await
    }
}

#[async_trait]
impl FolderSource for ApiClient {
    async fn browse_folders(
        &self,
        root: &str,
        extensions: &str,
    ) -> Result<Vec<FolderNode>, ApiError> {
        ApiClient::browse_folders(self, root, extensions).await
    }

    async fn excluded_folders(&self) -> Result<Vec<String>, ApiError> {
        ApiClient::excluded_folders(self).await
    }

    async fn save_excluded_folders(&self, excluded: Vec<String>) -> Result<(), ApiError> {
        ApiClient::save_excluded_folders(self, excluded).await
    }
}

#[async_trait]
impl ScanControl for ApiClient {
    async fn start_scan(&self) -> Result<(), ApiError> {
        ApiClient::start_scan(self).await
    }

    async fn start_partial_scan(&self, folders: Vec<String>) -> Result<(), ApiError> {
        ApiClient::start_partial_scan(self, folders).await
    }

    async fn scan_status(&self) -> Result<ScanStatus, ApiError> {
        ApiClient::scan_status(self).await
    }
}

#[async_trait]
impl SearchSource for ApiClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
        ApiClient::search(self, query).await
    }
}

#[async_trait]
impl PhotoAccess for ApiClient {
    async fn photo(&self, id: i64) -> Result<Photo, ApiError> {
        ApiClient::photo(self, id).await
    }

    async fn neighbors(
        &self,
        id: i64,
        sort_by: SortBy,
        sort_order: SortOrder,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Neighbors, ApiError> {
        ApiClient::neighbors(self, id, sort_by, sort_order, favorite_only, folder_path).await
    }

    async fn random_photo(
        &self,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Photo, ApiError> {
        ApiClient::random_photo(self, favorite_only, folder_path).await
    }

    async fn set_favorite(&self, id: i64, is_favorite: bool) -> Result<Photo, ApiError> {
        ApiClient::set_favorite(self, id, is_favorite).await
    }
}
