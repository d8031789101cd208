//! Async HTTP client for the PicStream backend
//!
//! One method per endpoint. GET/PUT endpoints are idempotent; POST actions
//! that start background work return immediately and are polled through
//! `scan_status`.

use crate::ApiError;
use gallery_proto::{
    ExcludedFolders, FavoriteUpdate, FolderBrowseResponse, FolderNode, FolderTreeResponse,
    ListQuery, Neighbors, PartialScanRequest, PersonTag, Photo, PhotoListResponse, ScanStatus,
    SearchResponse, Settings, SettingsUpdate, SortBy, SortOrder,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Backend HTTP client. Cheap to clone; all methods take `&self`.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://127.0.0.1:8000/api`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound(format!("GET {}", path)));
        }
        if !status.is_success() {
            tracing::warn!(%status, path, "GET failed");
            return Err(ApiError::Transport(format!("GET {} -> {}", path, status)));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("GET {}: {}", path, e)))
    }

    /// PUT/POST with a JSON body; failures map to `Persistence` since
    /// every non-GET in this contract is a write or an action trigger.
    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .request(method.clone(), self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound(format!("{} {}", method, path)));
        }
        if !status.is_success() {
            tracing::warn!(%status, %method, path, "write request rejected");
            return Err(ApiError::Persistence(format!(
                "{} {} -> {}",
                method, path, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Persistence(format!("{} {}: {}", method, path, e)))
    }

    /// Fire-and-forget variant for endpoints with empty/uninteresting bodies
    async fn send_empty<B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ApiError::NotFound(format!("{} {}", method, path)));
        }
        if !status.is_success() {
            tracing::warn!(%status, %method, path, "write request rejected");
            return Err(ApiError::Persistence(format!(
                "{} {} -> {}",
                method, path, status
            )));
        }
        Ok(())
    }

    // ===== Folders =====

    /// Browse the folder hierarchy under `root`, restricted to folders that
    /// (transitively) contain files with the given extensions.
    /// `NotFound` when the root is invalid or unreachable on the backend.
    pub async fn browse_folders(
        &self,
        root: &str,
        extensions: &str,
    ) -> Result<Vec<FolderNode>, ApiError> {
        let query = [
            ("path", root.to_string()),
            ("extensions", extensions.to_string()),
        ];
        let resp: FolderBrowseResponse = self.get_json("/folders/browse", &query).await?;
        Ok(resp.folders)
    }

    /// Scope tree for the sidebar (root folder + its hierarchy)
    pub async fn folder_tree(&self) -> Result<FolderTreeResponse, ApiError> {
        self.get_json("/folders", &[]).await
    }

    /// Folder/file name search
    pub async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
        self.get_json("/folders/search", &[("q", query.to_string())])
            .await
    }

    // ===== Exclusion set =====

    pub async fn excluded_folders(&self) -> Result<Vec<String>, ApiError> {
        let resp: ExcludedFolders = self.get_json("/settings/excluded-folders", &[]).await?;
        Ok(resp.excluded_folders)
    }

    /// Persist the exclusion set verbatim; no normalization happens on
    /// either side.
    pub async fn save_excluded_folders(&self, excluded: Vec<String>) -> Result<(), ApiError> {
        let body = ExcludedFolders {
            excluded_folders: excluded,
        };
        self.send_empty(reqwest::Method::PUT, "/settings/excluded-folders", Some(&body))
            .await
    }

    // ===== Scan =====

    /// Start a full-library scan; returns immediately, poll `scan_status`
    pub async fn start_scan(&self) -> Result<(), ApiError> {
        self.send_empty::<()>(reqwest::Method::POST, "/scan", None)
            .await
    }

    /// Start a partial rescan of the given leaf folders
    pub async fn start_partial_scan(&self, folders: Vec<String>) -> Result<(), ApiError> {
        let body = PartialScanRequest { folders };
        self.send_empty(reqwest::Method::POST, "/scan/partial", Some(&body))
            .await
    }

    pub async fn scan_status(&self) -> Result<ScanStatus, ApiError> {
        self.get_json("/scan/status", &[]).await
    }

    // ===== Photos =====

    pub async fn list_photos(&self, query: &ListQuery) -> Result<PhotoListResponse, ApiError> {
        self.get_json("/photos", &query.to_pairs()).await
    }

    /// Total photo count, probed with a minimal one-item page
    pub async fn photo_count(&self) -> Result<u64, ApiError> {
        let resp: PhotoListResponse = self
            .get_json("/photos", &[("per_page", "1".to_string())])
            .await?;
        Ok(resp.total)
    }

    pub async fn photo(&self, id: i64) -> Result<Photo, ApiError> {
        self.get_json(&format!("/photos/{}", id), &[]).await
    }

    /// Previous/next ids for `id` under the given sort, scope and
    /// favorite filter
    pub async fn neighbors(
        &self,
        id: i64,
        sort_by: SortBy,
        sort_order: SortOrder,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Neighbors, ApiError> {
        let mut query = vec![
            ("sort_by", sort_by.as_str().to_string()),
            ("sort_order", sort_order.as_str().to_string()),
        ];
        if favorite_only {
            query.push(("favorite_only", "true".to_string()));
        }
        if let Some(path) = folder_path {
            query.push(("folder_path", path.to_string()));
        }
        self.get_json(&format!("/photos/{}/neighbors", id), &query)
            .await
    }

    pub async fn random_photo(
        &self,
        favorite_only: bool,
        folder_path: Option<&str>,
    ) -> Result<Photo, ApiError> {
        let mut query = Vec::new();
        if favorite_only {
            query.push(("favorite_only", "true".to_string()));
        }
        if let Some(path) = folder_path {
            query.push(("folder_path", path.to_string()));
        }
        self.get_json("/photos/random", &query).await
    }

    /// Set the favorite flag; returns the updated photo for patch-in-place
    pub async fn set_favorite(&self, id: i64, is_favorite: bool) -> Result<Photo, ApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/photos/{}/favorite", id),
            &FavoriteUpdate { is_favorite },
        )
        .await
    }

    // ===== Settings =====

    pub async fn settings(&self) -> Result<Settings, ApiError> {
        self.get_json("/settings", &[]).await
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ApiError> {
        self.send_json(reqwest::Method::PUT, "/settings", update)
            .await
    }

    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        self.send_empty::<()>(reqwest::Method::POST, "/settings/clear-cache", None)
            .await
    }

    pub async fn reset_db(&self) -> Result<(), ApiError> {
        self.send_empty::<()>(reqwest::Method::POST, "/settings/reset-db", None)
            .await
    }

    // ===== Person tags =====

    pub async fn tags(&self) -> Result<Vec<PersonTag>, ApiError> {
        self.get_json("/tags", &[]).await
    }

    pub async fn create_tag(&self, name: &str) -> Result<PersonTag, ApiError> {
        self.send_json(reqwest::Method::POST, "/tags", &json!({ "name": name }))
            .await
    }

    pub async fn rename_tag(&self, id: i64, name: &str) -> Result<PersonTag, ApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/tags/{}", id),
            &json!({ "name": name }),
        )
        .await
    }

    pub async fn delete_tag(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty::<()>(reqwest::Method::DELETE, &format!("/tags/{}", id), None)
            .await
    }

    pub async fn add_photo_tag(&self, photo_id: i64, tag_id: i64) -> Result<(), ApiError> {
        self.send_empty(
            reqwest::Method::POST,
            &format!("/photos/{}/tags", photo_id),
            Some(&json!({ "person_tag_id": tag_id })),
        )
        .await
    }

    pub async fn remove_photo_tag(&self, photo_id: i64, tag_id: i64) -> Result<(), ApiError> {
        self.send_empty::<()>(
            reqwest::Method::DELETE,
            &format!("/photos/{}/tags/{}", photo_id, tag_id),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/photos"), "http://localhost:8000/api/photos");
    }
}
