//! Debounced folder/file search
//!
//! Search-as-you-type input is coalesced into one request per idle gap.
//! Every call bumps a generation counter; a call whose generation has been
//! superseded — during the idle wait or while its request is in flight —
//! returns `None` and its result is never shown.

use crate::SearchSource;
use gallery_proto::SearchResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct SearchDebouncer {
    source: Arc<dyn SearchSource>,
    debounce: Duration,
    generation: AtomicU64,
}

impl SearchDebouncer {
    pub fn new(source: Arc<dyn SearchSource>, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// Submit one keystroke's worth of query text.
    ///
    /// Returns `Some(results)` when this call survived the debounce window,
    /// `None` when a newer keystroke superseded it. An empty query resolves
    /// immediately to no results without a request. Transport failures
    /// degrade to an empty result list; search is a best-effort read path.
    pub async fn query(&self, text: &str) -> Option<Vec<SearchResult>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if text.trim().is_empty() {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return None;
        }

        let results = match self.source.search(text).await {
            Ok(resp) => resp.results,
            Err(e) => {
                tracing::warn!("search failed, showing no results: {}", e);
                Vec::new()
            }
        };

        // The query may have moved on while the request was in flight
        if self.generation.load(Ordering::SeqCst) != generation {
            return None;
        }
        Some(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gallery_api::ApiError;
    use gallery_proto::{SearchKind, SearchResponse};
    use std::sync::atomic::AtomicU64;

    struct FakeSearch {
        calls: AtomicU64,
    }

    #[async_trait]
    impl SearchSource for FakeSearch {
        async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResponse {
                results: vec![SearchResult {
                    kind: SearchKind::Folder,
                    name: query.to_string(),
                    path: format!("/photos/{}", query),
                    photo_id: None,
                }],
            })
        }
    }

    fn debouncer() -> (Arc<SearchDebouncer>, Arc<FakeSearch>) {
        let fake = Arc::new(FakeSearch {
            calls: AtomicU64::new(0),
        });
        let deb = Arc::new(SearchDebouncer::new(
            fake.clone(),
            Duration::from_millis(300),
        ));
        (deb, fake)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_coalesce_into_one_request() {
        let (deb, fake) = debouncer();

        let first = {
            let deb = deb.clone();
            tokio::spawn(async move { deb.query("tr").await })
        };
        // Let the first call park in its debounce sleep before superseding
        tokio::task::yield_now().await;

        let second = deb.query("trip").await;
        assert_eq!(second.unwrap()[0].name, "trip");

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_short_circuits() {
        let (deb, fake) = debouncer();
        assert_eq!(deb.query("   ").await, Some(Vec::new()));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn surviving_query_returns_results() {
        let (deb, fake) = debouncer();
        let results = deb.query("cats").await.unwrap();
        assert_eq!(results[0].path, "/photos/cats");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_degrades_to_no_results() {
        struct FailingSearch;

        #[async_trait]
        impl SearchSource for FailingSearch {
            async fn search(&self, _query: &str) -> Result<SearchResponse, ApiError> {
                Err(ApiError::Transport("backend down".into()))
            }
        }

        let deb = SearchDebouncer::new(Arc::new(FailingSearch), Duration::from_millis(300));
        assert_eq!(deb.query("trip").await, Some(Vec::new()));
    }
}
