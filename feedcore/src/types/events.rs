use crate::mutation::MutationIntent;
use crate::query::QueryIdentity;
use crate::types::item::ItemId;

/// What happened to a cached list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEventKind {
    PageAppended { page_no: u32, items: usize },
    ItemPatched(ItemId),
    ItemRemoved(ItemId),
    ItemInserted(ItemId),
    Invalidated,
    Evicted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEvent {
    pub identity: QueryIdentity,
    pub kind: ListEventKind,
}

/// A page request that failed. The cursor did not move, so retrying asks
/// for the same page again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailed {
    pub identity: QueryIdentity,
    pub page_no: u32,
    pub message: String,
    pub retryable: bool,
}

/// A mutation the server rejected; its optimistic change was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailed {
    pub intent: MutationIntent,
    pub message: String,
}
