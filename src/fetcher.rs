//! In-order page fetching with a per-list single-flight guard.

use crate::cache::RemoteListCache;
use crate::request::ApiError;
use crate::types::events::{EventBus, FetchFailed};
use dashmap::{DashMap, DashSet};
use feedcore::{AppendOutcome, Keyed, Page, QueryIdentity};
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new page was stored.
    Appended {
        page_no: u32,
        has_more: bool,
        total_items: usize,
    },
    /// Another fetch for the same list is already running; nothing was sent.
    InFlight,
    /// The last page is already cached; nothing was sent.
    Exhausted { total_items: usize },
    /// The list was reset or its last view went away while the request was
    /// outstanding; the answer was dropped.
    Discarded,
    /// The server answered with a page number other than the one requested.
    OutOfOrder { expected: u32, received: u32 },
}

impl FetchOutcome {
    /// Item count and "has more" after the fetch, when known.
    pub fn snapshot(&self) -> Option<(usize, bool)> {
        match *self {
            FetchOutcome::Appended {
                has_more,
                total_items,
                ..
            } => Some((total_items, has_more)),
            FetchOutcome::Exhausted { total_items } => Some((total_items, false)),
            _ => None,
        }
    }
}

pub struct PaginatedFetcher<T> {
    cache: Arc<RemoteListCache<T>>,
    in_flight: DashSet<QueryIdentity>,
    failures: DashMap<QueryIdentity, FetchFailed>,
    event_bus: Arc<EventBus>,
}

impl<T: Keyed + Clone> PaginatedFetcher<T> {
    pub fn new(cache: Arc<RemoteListCache<T>>, event_bus: Arc<EventBus>) -> Self {
        Self {
            cache,
            in_flight: DashSet::new(),
            failures: DashMap::new(),
            event_bus,
        }
    }

    pub fn cache(&self) -> &Arc<RemoteListCache<T>> {
        &self.cache
    }

    pub fn is_fetching(&self, identity: &QueryIdentity) -> bool {
        self.in_flight.contains(identity)
    }

    /// The most recent failure for `identity`, cleared by the next page that
    /// arrives successfully.
    pub fn last_error(&self, identity: &QueryIdentity) -> Option<FetchFailed> {
        self.failures.get(identity).map(|f| f.value().clone())
    }

    pub fn has_more(&self, identity: &QueryIdentity) -> bool {
        self.cache.has_more(identity)
    }

    pub fn total_items(&self, identity: &QueryIdentity) -> usize {
        self.cache.item_count(identity)
    }

    /// Fetches the next page of `identity` unless a fetch for it is already
    /// running or the list is complete.
    ///
    /// A failed request leaves the cursor where it was, so calling this
    /// again asks for the same page.
    pub async fn ensure_next_page<F, Fut>(
        &self,
        identity: &QueryIdentity,
        fetch_page: F,
    ) -> Result<FetchOutcome, ApiError>
    where
        F: FnOnce(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, ApiError>>,
    {
        if !self.in_flight.insert(identity.clone()) {
            debug!(target: "Fetcher", "Fetch for {identity} already in flight");
            return Ok(FetchOutcome::InFlight);
        }
        let _in_flight = scopeguard::guard((), |_| {
            self.in_flight.remove(identity);
        });

        let ticket = self.cache.begin_fetch(identity);
        if !ticket.has_more {
            return Ok(FetchOutcome::Exhausted {
                total_items: ticket.total_items,
            });
        }

        debug!(target: "Fetcher", "Requesting page {} of {identity}", ticket.page_no);
        let result = fetch_page(ticket.page_no).await;

        if !self.cache.is_current(identity, ticket.epoch) {
            debug!(
                target: "Fetcher",
                "Dropping page {} of {identity}: list was reset or released",
                ticket.page_no
            );
            return Ok(FetchOutcome::Discarded);
        }

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                warn!(
                    target: "Fetcher",
                    "Page {} of {identity} failed: {error}",
                    ticket.page_no
                );
                let failure = FetchFailed {
                    identity: identity.clone(),
                    page_no: ticket.page_no,
                    message: error.to_string(),
                    retryable: error.is_retryable(),
                };
                self.failures.insert(identity.clone(), failure.clone());
                self.event_bus.publish_fetch_failed(failure);
                return Err(error);
            }
        };

        let Some(report) = self.cache.append_fetched(identity, page, ticket.epoch) else {
            return Ok(FetchOutcome::Discarded);
        };
        match report.outcome {
            AppendOutcome::Appended { page_no, .. } => {
                self.failures.remove(identity);
                Ok(FetchOutcome::Appended {
                    page_no,
                    has_more: report.has_more,
                    total_items: report.total_items,
                })
            }
            AppendOutcome::Rejected { expected, received } => {
                warn!(
                    target: "Fetcher",
                    "Server answered page {received} for {identity}, expected {expected}"
                );
                Ok(FetchOutcome::OutOfOrder { expected, received })
            }
        }
    }
}
