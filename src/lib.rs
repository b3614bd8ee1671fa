// Re-export the IO-free layer
pub use feedcore::{api, list, mutation, net, page, query};

// Core types are re-exported, but events (with EventBus) remain here for runtime-specific functionality
pub mod types {
    pub use feedcore::types::*;
    pub mod events;
}

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod features;
pub mod fetcher;
pub mod mutator;
pub mod request;
pub mod scroll;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::{AuthProvider, TokenStore};
pub use cache::{ListView, RemoteListCache};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use features::RequestOrigin;
pub use feedcore::scroll::SentinelEvent;
pub use feedcore::{CachedList, FeedItem, ItemId, Page, QueryIdentity, Resource};
pub use fetcher::{FetchOutcome, PaginatedFetcher};
pub use mutator::{MutationError, MutationOutcome, OptimisticMutator};
pub use request::{ApiError, ErrorKind};
pub use scroll::{InfiniteScroll, LoadMore};
