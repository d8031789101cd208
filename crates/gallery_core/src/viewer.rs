//! Single-photo viewer state
//!
//! Loads a photo together with its prev/next neighbors under the current
//! filter, toggles favorites with optimistic patch-in-place, and picks
//! random photos within the active folder scope.

use crate::{CoreError, FilterState, GalleryStore, PhotoAccess};
use gallery_proto::{Neighbors, Photo};
use std::sync::Arc;

/// What the viewer shows for one photo
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub photo: Photo,
    pub neighbors: Neighbors,
}

impl ViewerState {
    pub fn has_prev(&self) -> bool {
        self.neighbors.prev_id.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.neighbors.next_id.is_some()
    }
}

pub struct Viewer {
    access: Arc<dyn PhotoAccess>,
}

impl Viewer {
    pub fn new(access: Arc<dyn PhotoAccess>) -> Self {
        Self { access }
    }

    /// Load photo and neighbors concurrently. `NotFound` propagates so the
    /// caller can navigate back to the grid.
    pub async fn open(&self, id: i64, filter: &FilterState) -> Result<ViewerState, CoreError> {
        let (photo, neighbors) = tokio::try_join!(
            self.access.photo(id),
            self.access.neighbors(
                id,
                filter.sort_by,
                filter.sort_order,
                filter.favorite_only,
                filter.selected_folder_path.as_deref(),
            )
        )?;

        Ok(ViewerState { photo, neighbors })
    }

    /// Flip the favorite flag on the server, then patch the returned
    /// record into both the viewer and the gallery sequence. On failure
    /// nothing is patched and the prior state stands for retry.
    pub async fn toggle_favorite(
        &self,
        state: &mut ViewerState,
        gallery: &GalleryStore,
    ) -> Result<(), CoreError> {
        let updated = self
            .access
            .set_favorite(state.photo.id, !state.photo.is_favorite)
            .await?;

        gallery.patch_photo(updated.clone());
        state.photo = updated;
        Ok(())
    }

    /// A random photo within the current folder scope and favorite filter
    pub async fn random(&self, filter: &FilterState) -> Result<Photo, CoreError> {
        let photo = self
            .access
            .random_photo(filter.favorite_only, filter.selected_folder_path.as_deref())
            .await?;
        Ok(photo)
    }
}
