//! IO-free building blocks for the feed client.
//!
//! Everything in here is plain data and pure functions: query identities,
//! item models, the page wire format, endpoint specs, the paginated list
//! structure, optimistic mutation apply/undo and the infinite-scroll state
//! machine. Scheduling, shared state and the network live in `feedsync`.

pub mod api;
pub mod list;
pub mod mutation;
pub mod net;
pub mod page;
pub mod query;
pub mod request;
pub mod scroll;
pub mod types;

pub use list::{Anchor, AppendOutcome, CachedList, Position};
pub use page::Page;
pub use query::{QueryIdentity, QueryParam, Resource};
pub use types::item::{FeedItem, Item, ItemId, Keyed, LikeState};
