//! Wire types for the PicStream backend HTTP contract
//!
//! This crate defines the JSON request/response shapes shared between the
//! gallery frontend and the scan/listing backend, plus small pure helpers
//! for assembling listing queries. No I/O happens here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sort key for photo listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    CreatedAt,
    ModifiedAt,
    TakenAt,
    FileName,
    Random,
}

impl SortBy {
    /// Wire name used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::ModifiedAt => "modified_at",
            SortBy::TakenAt => "taken_at",
            SortBy::FileName => "file_name",
            SortBy::Random => "random",
        }
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::CreatedAt
    }
}

/// Sort direction (ignored by the backend when sorting randomly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Minimal tag reference embedded in a photo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonTagBrief {
    pub id: i64,
    pub name: String,
}

/// Full tag record as returned by the tags endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonTag {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub photo_count: u64,
}

/// A photo record. Created and mutated only by the backend; the frontend
/// treats it as read-mostly and patches it in place after favorite/tag
/// mutations round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub file_path: String,
    pub file_name: String,
    #[serde(default)]
    pub extension: String,
    pub file_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
    pub taken_at: Option<NaiveDateTime>,
    pub is_favorite: bool,
    pub thumbnail_url: String,
    #[serde(default)]
    pub person_tags: Vec<PersonTagBrief>,
}

/// One page of a photo listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoListResponse {
    pub items: Vec<Photo>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Previous/next photo ids under the current sort and scope
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Neighbors {
    pub prev_id: Option<i64>,
    pub next_id: Option<i64>,
}

/// A node in the folder hierarchy. `path` is the unique key; children are
/// ordered and empty for leaves. Trees are re-fetched wholesale, never
/// patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

/// Response of `GET /folders/browse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderBrowseResponse {
    pub folders: Vec<FolderNode>,
}

/// Response of `GET /folders` (sidebar scope tree)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTreeResponse {
    pub root: String,
    pub folders: Vec<FolderNode>,
}

/// Excluded-folder set, persisted verbatim (no normalization)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludedFolders {
    pub excluded_folders: Vec<String>,
}

/// Partial rescan request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialScanRequest {
    pub folders: Vec<String>,
}

/// Backend scan progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStatus {
    pub is_scanning: bool,
    pub processed: u64,
    pub total: u64,
    #[serde(default)]
    pub current_file: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Kind of a folder/file search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Folder,
    File,
}

/// One hit from `GET /folders/search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub photo_id: Option<i64>,
}

/// Response of `GET /folders/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Application settings stored on the backend. All values travel as
/// strings; the backend owns parsing and validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root_folder: String,
    pub extensions: String,
    pub slideshow_interval: String,
    pub thumbnail_size: String,
}

/// Partial settings update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slideshow_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_size: Option<String>,
}

/// Favorite toggle request body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FavoriteUpdate {
    pub is_favorite: bool,
}

/// Query parameters for `GET /photos`.
///
/// `random_key` is a cache-busting counter: bumping it makes a repeated
/// request under `sort_by=random` come back in a fresh order.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Restrict the listing to favorites
    pub favorite_only: bool,
    pub folder_path: Option<String>,
    pub random_key: Option<u64>,
}

impl ListQuery {
    /// Flatten into key/value pairs for the query string. `sort_order` is
    /// omitted for random listings, `folder_path` when no scope is set and
    /// `favorite_only` when false (the backend default).
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("sort_by", self.sort_by.as_str().to_string()),
        ];
        if self.sort_by != SortBy::Random {
            pairs.push(("sort_order", self.sort_order.as_str().to_string()));
        }
        if self.favorite_only {
            pairs.push(("favorite_only", "true".to_string()));
        }
        if let Some(path) = &self.folder_path {
            pairs.push(("folder_path", path.clone()));
        }
        if let Some(key) = self.random_key {
            pairs.push(("random_key", key.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_list_deserializes_backend_shape() {
        let json = r#"{
            "items": [{
                "id": 7,
                "file_path": "/photos/2024/trip/IMG_0007.jpg",
                "file_name": "IMG_0007.jpg",
                "extension": "jpg",
                "file_size": 2048576,
                "width": 4032,
                "height": 3024,
                "created_at": "2024-03-01T09:15:00",
                "modified_at": "2024-03-02T10:00:00.123456",
                "taken_at": null,
                "is_favorite": true,
                "thumbnail_url": "/thumbnails/7.webp",
                "person_tags": [{"id": 1, "name": "Alice"}]
            }],
            "total": 120,
            "page": 1,
            "per_page": 50,
            "total_pages": 3
        }"#;

        let page: PhotoListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].id, 7);
        assert!(page.items[0].taken_at.is_none());
        assert_eq!(page.items[0].person_tags[0].name, "Alice");
    }

    #[test]
    fn search_result_maps_type_field() {
        let json = r#"{"results": [
            {"type": "folder", "name": "trip", "path": "/photos/2024/trip"},
            {"type": "file", "name": "a.jpg", "path": "/photos/a.jpg", "photo_id": 3}
        ]}"#;

        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results[0].kind, SearchKind::Folder);
        assert_eq!(resp.results[1].photo_id, Some(3));
    }

    #[test]
    fn list_query_omits_order_for_random() {
        let query = ListQuery {
            page: 2,
            per_page: 50,
            sort_by: SortBy::Random,
            sort_order: SortOrder::Desc,
            favorite_only: false,
            folder_path: None,
            random_key: Some(4),
        };

        let pairs = query.to_pairs();
        assert!(pairs.iter().any(|(k, v)| *k == "sort_by" && v == "random"));
        assert!(!pairs.iter().any(|(k, _)| *k == "sort_order"));
        assert!(!pairs.iter().any(|(k, _)| *k == "favorite_only"));
        assert!(pairs.iter().any(|(k, v)| *k == "random_key" && v == "4"));
    }

    #[test]
    fn list_query_emits_favorite_only_when_set() {
        let query = ListQuery {
            page: 1,
            per_page: 50,
            sort_by: SortBy::CreatedAt,
            sort_order: SortOrder::Desc,
            favorite_only: true,
            folder_path: None,
            random_key: None,
        };

        let pairs = query.to_pairs();
        assert!(pairs
            .iter()
            .any(|(k, v)| *k == "favorite_only" && v == "true"));
    }

    #[test]
    fn list_query_includes_scope_when_set() {
        let query = ListQuery {
            page: 1,
            per_page: 50,
            sort_by: SortBy::FileName,
            sort_order: SortOrder::Asc,
            favorite_only: false,
            folder_path: Some("/photos/2024".into()),
            random_key: None,
        };

        let pairs = query.to_pairs();
        assert!(pairs
            .iter()
            .any(|(k, v)| *k == "folder_path" && v == "/photos/2024"));
        assert!(pairs.iter().any(|(k, v)| *k == "sort_order" && v == "asc"));
    }

    #[test]
    fn settings_update_skips_absent_fields() {
        let update = SettingsUpdate {
            root_folder: Some("/photos".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"root_folder":"/photos"}"#);
    }
}
