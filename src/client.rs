use crate::auth::{AuthProvider, TokenStore};
use crate::cache::{ListView, RemoteListCache};
use crate::config::ClientConfig;
use crate::fetcher::{FetchOutcome, PaginatedFetcher};
use crate::mutator::OptimisticMutator;
use crate::request::ApiError;
use crate::scroll::{InfiniteScroll, LoadMore};
use crate::types::events::EventBus;
use anyhow::{Result, anyhow};
use feedcore::api::ListSpec;
use feedcore::net::HttpClient;
use feedcore::{CachedList, FeedItem, QueryIdentity};
use futures_util::FutureExt;
use log::info;
use std::sync::Arc;

/// Entry point of the library: owns the shared list cache, the fetcher and
/// the mutator, and the transport they all go through.
pub struct Client {
    pub(crate) http_client: Arc<dyn HttpClient>,
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) config: ClientConfig,

    pub(crate) cache: Arc<RemoteListCache<FeedItem>>,
    pub(crate) fetcher: PaginatedFetcher<FeedItem>,
    pub(crate) mutator: OptimisticMutator<FeedItem>,

    pub event_bus: Arc<EventBus>,
}

impl Client {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        auth: Arc<dyn AuthProvider>,
        config: ClientConfig,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let cache = Arc::new(RemoteListCache::new(event_bus.clone()));
        Self {
            http_client,
            auth,
            config,
            fetcher: PaginatedFetcher::new(cache.clone(), event_bus.clone()),
            mutator: OptimisticMutator::new(cache.clone(), event_bus.clone()),
            cache,
            event_bus,
        }
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RemoteListCache<FeedItem>> {
        &self.cache
    }

    pub fn fetcher(&self) -> &PaginatedFetcher<FeedItem> {
        &self.fetcher
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.token().is_some()
    }

    /// Fetches the next page of any list resource into the cache.
    pub async fn fetch_next_page(&self, identity: &QueryIdentity) -> Result<FetchOutcome, ApiError> {
        let page_size = self.config.page_size;
        self.fetcher
            .ensure_next_page(identity, |page_no| {
                self.execute(ListSpec::new(identity.clone(), page_no, page_size))
            })
            .await
    }

    /// Snapshot of a cached list.
    pub fn list(&self, identity: &QueryIdentity) -> Option<CachedList<FeedItem>> {
        self.cache.get(identity)
    }

    /// Registers a view on `identity`. The list stays cached until every
    /// view on it is dropped.
    pub fn watch(&self, identity: QueryIdentity) -> ListView<FeedItem> {
        ListView::new(self.cache.clone(), identity)
    }

    /// Infinite scroll over `identity`, loading pages through this client.
    pub fn infinite_scroll(self: &Arc<Self>, identity: QueryIdentity) -> InfiniteScroll<FeedItem> {
        let client = Arc::clone(self);
        let target = identity.clone();
        let load_more: LoadMore = Arc::new(move || {
            let client = client.clone();
            let target = target.clone();
            async move { client.fetch_next_page(&target).await }.boxed()
        });
        InfiniteScroll::new(self.watch(identity), load_more)
    }

    /// Drops every cached list, e.g. on logout.
    pub fn reset_cache(&self) {
        info!(target: "Cache", "Clearing {} cached list(s)", self.cache.len());
        self.cache.clear();
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    auth: Option<Arc<dyn AuthProvider>>,
    config: Option<ClientConfig>,
}

impl ClientBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_auth_provider(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Shorthand for an in-memory [`TokenStore`] holding `token`.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_auth_provider(Arc::new(TokenStore::with_token(token)))
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Client> {
        let http_client = self
            .http_client
            .ok_or_else(|| anyhow!("HTTP client is required, call with_http_client()"))?;
        let auth = self
            .auth
            .unwrap_or_else(|| Arc::new(TokenStore::new()));
        let config = self.config.unwrap_or_default();
        if config.base_url.is_empty() {
            return Err(anyhow!("base URL must not be empty"));
        }
        Ok(Client::new(http_client, auth, config))
    }
}
