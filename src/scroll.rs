//! Binds the infinite-scroll state machine to one cached list.

use crate::cache::ListView;
use crate::fetcher::FetchOutcome;
use crate::request::ApiError;
use feedcore::scroll::{ScrollCommand, ScrollController, SentinelEvent};
use feedcore::{Keyed, QueryIdentity};
use futures_util::future::BoxFuture;
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Loads the next page of the list the scroll is bound to.
pub type LoadMore =
    Arc<dyn Fn() -> BoxFuture<'static, Result<FetchOutcome, ApiError>> + Send + Sync>;

/// Controller state plus the list epoch it was built against.
struct Bound {
    controller: ScrollController,
    generation: Option<u64>,
}

impl Bound {
    fn read<T: Keyed + Clone>(view: &ListView<T>) -> Self {
        Self {
            controller: ScrollController::new(view.item_count(), view.has_more()),
            generation: view.generation(),
        }
    }
}

pub struct InfiniteScroll<T: Keyed + Clone> {
    view: ListView<T>,
    state: Mutex<Bound>,
    load_more: LoadMore,
}

impl<T: Keyed + Clone> InfiniteScroll<T> {
    pub fn new(view: ListView<T>, load_more: LoadMore) -> Self {
        let state = Bound::read(&view);
        Self {
            view,
            state: Mutex::new(state),
            load_more,
        }
    }

    fn state(&self) -> MutexGuard<'_, Bound> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuilds the controller when the list was reset since it was last
    /// read, so a terminal scroll starts over from page 0.
    fn sync(&self) {
        let mut state = self.state();
        if state.controller.is_loading() || state.generation == self.view.generation() {
            return;
        }
        debug!(target: "Scroll", "{} was reset, rearming", self.identity());
        *state = Bound::read(&self.view);
    }

    pub fn identity(&self) -> &QueryIdentity {
        self.view.identity()
    }

    /// Feeds a sentinel visibility change. Returns the fetch outcome when a
    /// load was triggered, `None` otherwise.
    pub async fn on_sentinel(
        &self,
        event: SentinelEvent,
    ) -> Result<Option<FetchOutcome>, ApiError> {
        self.sync();
        let command = self.state().controller.on_sentinel(event);
        if command == ScrollCommand::Idle {
            return Ok(None);
        }

        debug!(target: "Scroll", "Loading more for {}", self.identity());
        match (self.load_more)().await {
            Ok(outcome) => {
                let mut state = self.state();
                let controller = &mut state.controller;
                controller.on_load_finished(outcome.snapshot());
                controller.set_item_count(self.view.item_count());
                if controller.is_terminal() {
                    debug!(target: "Scroll", "Reached the end of {}", self.identity());
                }
                Ok(Some(outcome))
            }
            Err(error) => {
                warn!(target: "Scroll", "Load for {} failed: {error}", self.identity());
                self.state().controller.on_load_failed();
                Err(error)
            }
        }
    }

    pub fn show_loader(&self) -> bool {
        self.state().controller.show_loader()
    }

    pub fn is_terminal(&self) -> bool {
        self.sync();
        self.state().controller.is_terminal()
    }

    pub fn is_loading(&self) -> bool {
        self.state().controller.is_loading()
    }

    pub fn item_count(&self) -> usize {
        self.view.item_count()
    }

    pub fn items(&self) -> Vec<T> {
        self.view.items()
    }

    /// Re-reads count and "has more" from the cache unconditionally.
    pub fn refresh(&self) {
        *self.state() = Bound::read(&self.view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RemoteListCache;
    use crate::fetcher::PaginatedFetcher;
    use crate::types::events::EventBus;
    use feedcore::{ItemId, Page};
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(i64);

    impl Keyed for Row {
        fn item_id(&self) -> ItemId {
            ItemId(self.0)
        }
    }

    /// Two pages of two rows each, served through a real fetcher.
    fn scroll(cache: Arc<RemoteListCache<Row>>, calls: Arc<AtomicUsize>) -> InfiniteScroll<Row> {
        let bus = Arc::new(EventBus::new());
        let fetcher = Arc::new(PaginatedFetcher::new(cache.clone(), bus));
        let identity = QueryIdentity::user_chats(1);
        let view = ListView::new(cache, identity.clone());

        let load_more: LoadMore = Arc::new(move || {
            let fetcher = fetcher.clone();
            let identity = identity.clone();
            let calls = calls.clone();
            async move {
                fetcher
                    .ensure_next_page(&identity, |n| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let first = i64::from(n) * 2;
                        async move { Ok(Page::new(vec![Row(first), Row(first + 1)], n, 2)) }
                    })
                    .await
            }
            .boxed()
        });
        InfiniteScroll::new(view, load_more)
    }

    #[tokio::test]
    async fn test_scrolls_to_the_end_then_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scroll = scroll(rows(), calls.clone());
        assert!(!scroll.is_terminal());

        let first = scroll.on_sentinel(SentinelEvent::Visible).await.unwrap();
        assert!(matches!(first, Some(FetchOutcome::Appended { page_no: 0, .. })));
        // still visible: no new transition
        assert_eq!(scroll.on_sentinel(SentinelEvent::Visible).await.unwrap(), None);

        scroll.on_sentinel(SentinelEvent::Hidden).await.unwrap();
        scroll.on_sentinel(SentinelEvent::Visible).await.unwrap();
        assert_eq!(scroll.items(), vec![Row(0), Row(1), Row(2), Row(3)]);
        assert!(scroll.is_terminal());
        assert!(!scroll.show_loader());

        scroll.on_sentinel(SentinelEvent::Hidden).await.unwrap();
        assert_eq!(scroll.on_sentinel(SentinelEvent::Visible).await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    fn rows() -> Arc<RemoteListCache<Row>> {
        Arc::new(RemoteListCache::new(Arc::new(EventBus::new())))
    }

    #[tokio::test]
    async fn test_invalidated_list_loads_again_from_first_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = rows();
        let scroll = scroll(cache.clone(), calls.clone());
        for _ in 0..2 {
            scroll.on_sentinel(SentinelEvent::Visible).await.unwrap();
            scroll.on_sentinel(SentinelEvent::Hidden).await.unwrap();
        }
        assert!(scroll.is_terminal());

        cache.invalidate(scroll.identity());
        assert!(!scroll.is_terminal());
        assert_eq!(scroll.item_count(), 0);

        let outcome = scroll.on_sentinel(SentinelEvent::Visible).await.unwrap();
        assert!(matches!(outcome, Some(FetchOutcome::Appended { page_no: 0, .. })));
        assert_eq!(scroll.items(), vec![Row(0), Row(1)]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_load_rearms_on_next_transition() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let bus = Arc::new(EventBus::new());
        let cache: Arc<RemoteListCache<Row>> = Arc::new(RemoteListCache::new(bus));
        let view = ListView::new(cache, QueryIdentity::all_posts());
        let counter = attempts.clone();
        let load_more: LoadMore = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::Timeout(std::time::Duration::from_secs(30))) }.boxed()
        });
        let scroll = InfiniteScroll::new(view, load_more);

        assert!(scroll.on_sentinel(SentinelEvent::Visible).await.is_err());
        assert!(!scroll.is_terminal());
        assert!(!scroll.is_loading());
        scroll.on_sentinel(SentinelEvent::Hidden).await.unwrap();
        assert!(scroll.on_sentinel(SentinelEvent::Visible).await.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
