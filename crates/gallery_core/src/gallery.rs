//! Gallery pagination state
//!
//! An ordered, appendable collection of photo records fetched in pages
//! under the current filter. Any filter-dimension change atomically resets
//! the collection and restarts pagination; each change bumps an epoch and
//! in-flight responses issued under an older epoch are discarded instead of
//! being merged into the new state.

use crate::{CoreError, PhotoListing};
use gallery_proto::{ListQuery, Photo, SortBy, SortOrder};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// The filter tuple driving a photo listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Show only favorites
    pub favorite_only: bool,
    /// Optional folder scope restriction (sidebar selection)
    pub selected_folder_path: Option<String>,
    /// Monotonic counter forcing a fresh shuffle under random sort
    pub random_key: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            sort_by: SortBy::CreatedAt,
            sort_order: SortOrder::Desc,
            favorite_only: false,
            selected_folder_path: None,
            random_key: 0,
        }
    }
}

/// What the grid should render right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridView {
    /// Nothing fetched yet and no fetch running
    Initial,
    /// No photos on screen, a fetch is in flight
    Loading,
    /// The backend confirmed an empty result set
    Empty,
    /// Photos to show (more may still be loading)
    Photos,
}

/// Point-in-time copy of the gallery state handed to view layers
#[derive(Debug, Clone)]
pub struct GallerySnapshot {
    pub photos: Vec<Photo>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    /// Distinguishes "never loaded" from "confirmed empty"
    pub has_loaded: bool,
    pub filter: FilterState,
}

impl Default for GallerySnapshot {
    fn default() -> Self {
        Self {
            photos: Vec::new(),
            total: 0,
            page: 1,
            per_page: 0,
            total_pages: 0,
            loading: false,
            has_loaded: false,
            filter: FilterState::default(),
        }
    }
}

impl GallerySnapshot {
    pub fn view(&self) -> GridView {
        if !self.photos.is_empty() {
            GridView::Photos
        } else if self.loading {
            GridView::Loading
        } else if self.has_loaded {
            GridView::Empty
        } else {
            GridView::Initial
        }
    }
}

struct Inner {
    snap: GallerySnapshot,
    /// Bumped on every filter-resetting mutation; fetches snapshot it at
    /// dispatch time and their merge is a no-op once it moves on
    epoch: u64,
    /// Id of the fetch that currently owns the loading flag
    fetch_seq: u64,
    active_fetch: u64,
}

/// Store handle for the gallery grid. Dependency-injected (no globals);
/// share via `Arc`, observe via `subscribe`.
pub struct GalleryStore {
    listing: Arc<dyn PhotoListing>,
    per_page: u32,
    inner: RwLock<Inner>,
    revision: watch::Sender<u64>,
}

impl GalleryStore {
    pub fn new(listing: Arc<dyn PhotoListing>, per_page: u32) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            listing,
            per_page,
            inner: RwLock::new(Inner {
                snap: GallerySnapshot::default(),
                epoch: 0,
                fetch_seq: 0,
                active_fetch: 0,
            }),
            revision,
        }
    }

    /// Change-notification channel; the value is an opaque revision
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.inner.read().snap.clone()
    }

    pub fn filter(&self) -> FilterState {
        self.inner.read().snap.filter.clone()
    }

    fn notify(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Clear the sequence, rewind to page 1 and advance the epoch.
    /// Called with the write lock held.
    fn reset_locked(inner: &mut Inner) {
        inner.snap.photos.clear();
        inner.snap.page = 1;
        inner.snap.has_loaded = false;
        inner.epoch += 1;
    }

    /// Name sort reads A→Z by default, date sorts newest-first; switching
    /// to `file_name` therefore forces ascending order.
    pub fn set_sort_by(&self, sort_by: SortBy) {
        {
            let mut inner = self.inner.write();
            inner.snap.filter.sort_by = sort_by;
            if sort_by == SortBy::FileName {
                inner.snap.filter.sort_order = SortOrder::Asc;
            }
            Self::reset_locked(&mut inner);
        }
        self.notify();
    }

    pub fn set_sort_order(&self, sort_order: SortOrder) {
        {
            let mut inner = self.inner.write();
            inner.snap.filter.sort_order = sort_order;
            Self::reset_locked(&mut inner);
        }
        self.notify();
    }

    /// Restrict the listing to favorites (or lift the restriction). A
    /// filter dimension like the sorts: flips reset pagination.
    pub fn set_favorite_only(&self, favorite_only: bool) {
        {
            let mut inner = self.inner.write();
            inner.snap.filter.favorite_only = favorite_only;
            Self::reset_locked(&mut inner);
        }
        self.notify();
    }

    /// Restrict (or clear) the folder scope
    pub fn set_folder_scope(&self, path: Option<String>) {
        {
            let mut inner = self.inner.write();
            inner.snap.filter.selected_folder_path = path;
            Self::reset_locked(&mut inner);
        }
        self.notify();
    }

    /// Bump the random key so a random-ordered listing reshuffles
    pub fn refresh_random(&self) {
        {
            let mut inner = self.inner.write();
            inner.snap.filter.random_key += 1;
            Self::reset_locked(&mut inner);
        }
        self.notify();
    }

    /// Fetch one page. `append = false` replaces the sequence wholesale,
    /// `append = true` concatenates onto it. Returns Ok(false) when the
    /// fetch was skipped (append while already loading) or its response
    /// was discarded as stale.
    pub async fn fetch_page(&self, page: u32, append: bool) -> Result<bool, CoreError> {
        let (query, epoch, fetch_id) = {
            let mut inner = self.inner.write();
            // Check-and-set under one lock acquisition: at most one
            // in-flight load-more at a time.
            if append && inner.snap.loading {
                return Ok(false);
            }
            inner.fetch_seq += 1;
            let fetch_id = inner.fetch_seq;
            inner.active_fetch = fetch_id;
            inner.snap.loading = true;

            let filter = &inner.snap.filter;
            let query = ListQuery {
                page,
                per_page: self.per_page,
                sort_by: filter.sort_by,
                sort_order: filter.sort_order,
                favorite_only: filter.favorite_only,
                folder_path: filter.selected_folder_path.clone(),
                random_key: (filter.sort_by == SortBy::Random).then_some(filter.random_key),
            };
            (query, inner.epoch, fetch_id)
        };
        self.notify();

        // Clears the loading flag on every exit path, including errors
        let _guard = LoadingGuard {
            store: self,
            fetch_id,
        };

        let response = self.listing.list_photos(&query).await?;

        let mut inner = self.inner.write();
        if inner.epoch != epoch {
            tracing::debug!(
                issued = epoch,
                current = inner.epoch,
                page,
                "discarding page response from a superseded filter"
            );
            return Ok(false);
        }

        let snap = &mut inner.snap;
        if append {
            snap.photos.extend(response.items);
            snap.total = response.total;
            snap.page = response.page;
            snap.total_pages = response.total_pages;
        } else {
            snap.photos = response.items;
            snap.total = response.total;
            snap.page = response.page;
            snap.per_page = response.per_page;
            snap.total_pages = response.total_pages;
        }
        snap.has_loaded = true;
        drop(inner);
        self.notify();
        Ok(true)
    }

    /// Append the next page unless a request is already in flight
    pub async fn load_more(&self) -> Result<bool, CoreError> {
        let next = {
            let inner = self.inner.read();
            if inner.snap.loading {
                return Ok(false);
            }
            inner.snap.page + 1
        };
        self.fetch_page(next, true).await
    }

    /// Visibility-triggered continuation: the scroll sentinel calls this on
    /// every intersection, the gate keeps a fast-scrolling trigger from
    /// producing a fetch storm.
    pub async fn maybe_load_more(&self) -> Result<bool, CoreError> {
        {
            let inner = self.inner.read();
            let snap = &inner.snap;
            if snap.loading || !snap.has_loaded || snap.page >= snap.total_pages {
                return Ok(false);
            }
        }
        self.load_more().await
    }

    /// Patch an updated photo record in place (favorite/tag mutation
    /// responses). Photos not currently in the sequence are ignored.
    pub fn patch_photo(&self, photo: Photo) {
        let patched = {
            let mut inner = self.inner.write();
            match inner.snap.photos.iter_mut().find(|p| p.id == photo.id) {
                Some(slot) => {
                    *slot = photo;
                    true
                }
                None => false,
            }
        };
        if patched {
            self.notify();
        }
    }
}

struct LoadingGuard<'a> {
    store: &'a GalleryStore,
    fetch_id: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        {
            let mut inner = self.store.inner.write();
            // A newer fetch may have taken over the flag in the meantime
            if inner.active_fetch == self.fetch_id {
                inner.snap.loading = false;
            }
        }
        self.store.notify();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use gallery_api::ApiError;
    use gallery_proto::PhotoListResponse;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use tokio::sync::Semaphore;

    fn photo(id: i64) -> Photo {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Photo {
            id,
            file_path: format!("/photos/{}.jpg", id),
            file_name: format!("{}.jpg", id),
            extension: "jpg".into(),
            file_size: 1024,
            width: None,
            height: None,
            created_at: ts,
            modified_at: ts,
            taken_at: None,
            is_favorite: false,
            thumbnail_url: format!("/thumbnails/{}.webp", id),
            person_tags: Vec::new(),
        }
    }

    /// Serves pages of a fixed 10-photo library; can be gated so calls
    /// block until released.
    struct FakeListing {
        calls: AtomicU64,
        blocking: AtomicBool,
        gate: Semaphore,
        total: u64,
        queries: Mutex<Vec<ListQuery>>,
    }

    impl FakeListing {
        fn new(total: u64) -> Self {
            Self {
                calls: AtomicU64::new(0),
                blocking: AtomicBool::new(false),
                gate: Semaphore::new(0),
                total,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }

        fn release(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait]
    impl PhotoListing for FakeListing {
        async fn list_photos(&self, query: &ListQuery) -> Result<PhotoListResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.clone());

            if self.blocking.load(Ordering::SeqCst) {
                let permit = self.gate.acquire().await.unwrap();
                permit.forget();
            }

            let per_page = query.per_page as u64;
            let start = (query.page as u64 - 1) * per_page;
            let items: Vec<Photo> = (start..self.total.min(start + per_page))
                .map(|i| photo(i as i64 + 1))
                .collect();

            Ok(PhotoListResponse {
                items,
                total: self.total,
                page: query.page,
                per_page: query.per_page,
                total_pages: (self.total as f64 / per_page as f64).ceil() as u32,
            })
        }
    }

    fn store_with(total: u64, per_page: u32) -> (Arc<GalleryStore>, Arc<FakeListing>) {
        let fake = Arc::new(FakeListing::new(total));
        let store = Arc::new(GalleryStore::new(fake.clone(), per_page));
        (store, fake)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn replace_then_append() {
        let (store, _) = store_with(10, 2);

        assert!(store.fetch_page(1, false).await.unwrap());
        let snap = store.snapshot();
        assert_eq!(
            snap.photos.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!((snap.total, snap.page, snap.per_page, snap.total_pages), (10, 1, 2, 5));

        assert!(store.fetch_page(2, true).await.unwrap());
        let snap = store.snapshot();
        assert_eq!(
            snap.photos.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!((snap.total, snap.page, snap.total_pages), (10, 2, 5));
    }

    #[tokio::test]
    async fn filter_change_resets_before_any_fetch() {
        let (store, _) = store_with(10, 2);
        store.fetch_page(1, false).await.unwrap();

        store.set_folder_scope(Some("/a".into()));

        let snap = store.snapshot();
        assert!(snap.photos.is_empty());
        assert_eq!(snap.page, 1);
        assert!(!snap.has_loaded);
    }

    #[tokio::test]
    async fn file_name_sort_forces_ascending() {
        let (store, fake) = store_with(4, 2);
        store.set_sort_order(SortOrder::Desc);
        store.set_sort_by(SortBy::FileName);

        assert_eq!(store.filter().sort_order, SortOrder::Asc);

        store.fetch_page(1, false).await.unwrap();
        let queries = fake.queries.lock();
        let last = queries.last().unwrap();
        assert_eq!(last.sort_by, SortBy::FileName);
        assert_eq!(last.sort_order, SortOrder::Asc);
    }

    #[tokio::test]
    async fn favorite_filter_resets_pagination_and_rides_the_query() {
        let (store, fake) = store_with(10, 2);
        store.fetch_page(1, false).await.unwrap();
        store.fetch_page(2, true).await.unwrap();
        assert_eq!(store.snapshot().page, 2);

        store.set_favorite_only(true);

        let snap = store.snapshot();
        assert!(snap.photos.is_empty());
        assert_eq!(snap.page, 1);
        assert!(!snap.has_loaded);

        store.fetch_page(1, false).await.unwrap();
        let queries = fake.queries.lock();
        assert!(queries.last().unwrap().favorite_only);

        drop(queries);
        store.set_favorite_only(false);
        store.fetch_page(1, false).await.unwrap();
        assert!(!fake.queries.lock().last().unwrap().favorite_only);
    }

    #[tokio::test]
    async fn random_refresh_bumps_key_and_resets() {
        let (store, fake) = store_with(4, 2);
        store.set_sort_by(SortBy::Random);
        store.refresh_random();
        store.fetch_page(1, false).await.unwrap();

        let queries = fake.queries.lock();
        assert_eq!(queries.last().unwrap().random_key, Some(1));
    }

    #[tokio::test]
    async fn concurrent_load_more_dispatches_once() {
        let (store, fake) = store_with(10, 2);
        store.fetch_page(1, false).await.unwrap();
        assert_eq!(fake.calls(), 1);

        fake.blocking.store(true, Ordering::SeqCst);

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.load_more().await })
        };
        settle().await;
        assert_eq!(fake.calls(), 2); // first load_more dispatched and blocked

        // second invocation while the first is pending: no network call
        assert!(!store.load_more().await.unwrap());
        assert_eq!(fake.calls(), 2);

        fake.release();
        assert!(first.await.unwrap().unwrap());
        assert_eq!(store.snapshot().photos.len(), 4);
    }

    #[tokio::test]
    async fn stale_response_is_discarded_after_filter_change() {
        let (store, fake) = store_with(10, 2);
        fake.blocking.store(true, Ordering::SeqCst);

        let stale = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_page(1, false).await })
        };
        settle().await;
        assert_eq!(fake.calls(), 1);

        // Filter changes while the old fetch is still in flight
        store.set_sort_by(SortBy::ModifiedAt);
        fake.release();

        assert!(!stale.await.unwrap().unwrap());
        let snap = store.snapshot();
        assert!(snap.photos.is_empty());
        assert!(!snap.has_loaded);
        assert!(!snap.loading);

        // A fetch under the new filter still lands
        fake.blocking.store(false, Ordering::SeqCst);
        assert!(store.fetch_page(1, false).await.unwrap());
        assert_eq!(store.snapshot().photos.len(), 2);
    }

    #[tokio::test]
    async fn view_distinguishes_initial_loading_empty_and_photos() {
        let (store, fake) = store_with(0, 2);
        assert_eq!(store.snapshot().view(), GridView::Initial);

        fake.blocking.store(true, Ordering::SeqCst);
        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_page(1, false).await })
        };
        settle().await;
        assert_eq!(store.snapshot().view(), GridView::Loading);

        fake.release();
        pending.await.unwrap().unwrap();
        assert_eq!(store.snapshot().view(), GridView::Empty);

        let (store, _) = store_with(3, 2);
        store.fetch_page(1, false).await.unwrap();
        assert_eq!(store.snapshot().view(), GridView::Photos);
    }

    #[tokio::test]
    async fn sentinel_stops_at_the_last_page() {
        let (store, fake) = store_with(4, 2);
        store.fetch_page(1, false).await.unwrap();

        assert!(store.maybe_load_more().await.unwrap());
        assert_eq!(store.snapshot().page, 2);

        // page == total_pages: the trigger is a no-op no matter how often
        // it fires
        assert!(!store.maybe_load_more().await.unwrap());
        assert!(!store.maybe_load_more().await.unwrap());
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn sentinel_is_inert_before_the_initial_fetch() {
        let (store, fake) = store_with(4, 2);
        assert!(!store.maybe_load_more().await.unwrap());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn patch_photo_updates_in_place() {
        let (store, _) = store_with(4, 2);
        store.fetch_page(1, false).await.unwrap();

        let mut updated = photo(2);
        updated.is_favorite = true;
        store.patch_photo(updated);

        let snap = store.snapshot();
        assert_eq!(snap.photos.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(snap.photos[1].is_favorite);
    }

    #[tokio::test]
    async fn subscribers_see_revisions() {
        let (store, _) = store_with(4, 2);
        let mut rx = store.subscribe();
        let before = *rx.borrow_and_update();

        store.set_sort_by(SortBy::TakenAt);
        store.fetch_page(1, false).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update() > before);
    }
}
