//! Process-wide store of paginated remote lists.
//!
//! Lists are keyed by [`QueryIdentity`]. An entry is created on the first
//! fetch and lives until it is invalidated, the last view watching it is
//! dropped, or the whole cache is cleared. All mutation goes through the
//! methods here; consumers only ever get snapshots.

use crate::types::events::{EventBus, ListEvent, ListEventKind};
use dashmap::DashMap;
use feedcore::mutation::{self, Applied, MutationIntent, Undo};
use feedcore::{
    Anchor, AppendOutcome, CachedList, Item, ItemId, Keyed, Page, Position, QueryIdentity,
};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct Slot<T> {
    list: CachedList<T>,
    /// Changes whenever the list is reset; fetches started under an older
    /// epoch are discarded on arrival.
    epoch: u64,
    views: usize,
}

/// Where the next fetch for a list should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    pub page_no: u32,
    pub epoch: u64,
    pub has_more: bool,
    pub total_items: usize,
}

/// Result of storing a fetched page, with the list state right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AppendReport {
    pub outcome: AppendOutcome,
    pub total_items: usize,
    pub has_more: bool,
}

pub struct RemoteListCache<T> {
    slots: DashMap<QueryIdentity, Slot<T>>,
    next_epoch: AtomicU64,
    event_bus: Arc<EventBus>,
}

impl<T: Keyed + Clone> RemoteListCache<T> {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            slots: DashMap::new(),
            next_epoch: AtomicU64::new(1),
            event_bus,
        }
    }

    fn fresh_epoch(&self) -> u64 {
        self.next_epoch.fetch_add(1, Ordering::Relaxed)
    }

    fn new_slot(&self) -> Slot<T> {
        Slot {
            list: CachedList::new(),
            epoch: self.fresh_epoch(),
            views: 0,
        }
    }

    fn publish(&self, identity: &QueryIdentity, kind: ListEventKind) {
        self.event_bus.publish_list(ListEvent {
            identity: identity.clone(),
            kind,
        });
    }

    /// Snapshot of the list, if one is cached.
    pub fn get(&self, identity: &QueryIdentity) -> Option<CachedList<T>> {
        self.slots.get(identity).map(|slot| slot.list.clone())
    }

    /// Runs `f` against the cached list without cloning it.
    pub fn with_list<R>(
        &self,
        identity: &QueryIdentity,
        f: impl FnOnce(&CachedList<T>) -> R,
    ) -> Option<R> {
        self.slots.get(identity).map(|slot| f(&slot.list))
    }

    /// Flattened items in server order; empty when nothing is cached.
    pub fn items(&self, identity: &QueryIdentity) -> Vec<T> {
        self.with_list(identity, CachedList::to_vec)
            .unwrap_or_default()
    }

    pub fn item_count(&self, identity: &QueryIdentity) -> usize {
        self.with_list(identity, CachedList::len).unwrap_or(0)
    }

    /// Whether another page can be fetched. Unknown lists always can.
    pub fn has_more(&self, identity: &QueryIdentity) -> bool {
        self.with_list(identity, CachedList::has_more)
            .unwrap_or(true)
    }

    /// Stores `page` if it carries the next expected page number.
    pub fn append_page(&self, identity: &QueryIdentity, page: Page<T>) -> AppendOutcome {
        let outcome = {
            let mut slot = self
                .slots
                .entry(identity.clone())
                .or_insert_with(|| self.new_slot());
            slot.list.append(page)
        };
        self.report_append(identity, outcome);
        outcome
    }

    fn report_append(&self, identity: &QueryIdentity, outcome: AppendOutcome) {
        match outcome {
            AppendOutcome::Appended { page_no, added, .. } => self.publish(
                identity,
                ListEventKind::PageAppended {
                    page_no,
                    items: added,
                },
            ),
            AppendOutcome::Rejected { expected, received } => debug!(
                target: "Cache",
                "Rejected page {received} for {identity}, expected {expected}"
            ),
        }
    }

    /// Reserves the next page number for a fetch, creating the entry if
    /// this is the first fetch.
    pub(crate) fn begin_fetch(&self, identity: &QueryIdentity) -> FetchTicket {
        let slot = self
            .slots
            .entry(identity.clone())
            .or_insert_with(|| self.new_slot());
        FetchTicket {
            page_no: slot.list.next_page_no(),
            epoch: slot.epoch,
            has_more: slot.list.has_more(),
            total_items: slot.list.len(),
        }
    }

    /// Current epoch of the entry. Invalidation and eviction both move it
    /// forward.
    pub fn generation(&self, identity: &QueryIdentity) -> Option<u64> {
        self.slots.get(identity).map(|slot| slot.epoch)
    }

    pub(crate) fn is_current(&self, identity: &QueryIdentity, epoch: u64) -> bool {
        self.slots
            .get(identity)
            .is_some_and(|slot| slot.epoch == epoch)
    }

    /// Stores a page fetched under `epoch`. Returns `None` when the list was
    /// reset or evicted since the fetch started.
    pub(crate) fn append_fetched(
        &self,
        identity: &QueryIdentity,
        page: Page<T>,
        epoch: u64,
    ) -> Option<AppendReport> {
        let report = {
            let mut slot = self.slots.get_mut(identity)?;
            if slot.epoch != epoch {
                return None;
            }
            let outcome = slot.list.append(page);
            AppendReport {
                outcome,
                total_items: slot.list.len(),
                has_more: slot.list.has_more(),
            }
        };
        self.report_append(identity, report.outcome);
        Some(report)
    }

    /// Drops every page of the list so the next fetch restarts at page 0.
    /// Views keep watching the (now empty) entry.
    pub fn invalidate(&self, identity: &QueryIdentity) -> bool {
        let epoch = self.fresh_epoch();
        let found = match self.slots.get_mut(identity) {
            Some(mut slot) => {
                slot.list = CachedList::new();
                slot.epoch = epoch;
                true
            }
            None => false,
        };
        if found {
            debug!(target: "Cache", "Invalidated {identity}");
            self.publish(identity, ListEventKind::Invalidated);
        }
        found
    }

    /// Replaces the item with `updater(&item)`; returns the previous value.
    pub fn patch_item(
        &self,
        identity: &QueryIdentity,
        item_id: ItemId,
        updater: impl FnOnce(&T) -> T,
    ) -> Option<T> {
        let previous = self
            .slots
            .get_mut(identity)
            .and_then(|mut slot| slot.list.patch(item_id, updater));
        if previous.is_some() {
            self.publish(identity, ListEventKind::ItemPatched(item_id));
        }
        previous
    }

    pub fn remove_item(&self, identity: &QueryIdentity, item_id: ItemId) -> Option<(Anchor, T)> {
        let removed = self
            .slots
            .get_mut(identity)
            .and_then(|mut slot| slot.list.remove(item_id));
        if removed.is_some() {
            self.publish(identity, ListEventKind::ItemRemoved(item_id));
        }
        removed
    }

    pub fn insert_item(&self, identity: &QueryIdentity, position: Position, item: T) -> bool {
        let item_id = item.item_id();
        let inserted = self
            .slots
            .get_mut(identity)
            .is_some_and(|mut slot| slot.list.insert_at(position, item));
        if inserted {
            self.publish(identity, ListEventKind::ItemInserted(item_id));
        }
        inserted
    }

    /// Puts back an item taken out by [`Self::remove_item`].
    pub fn reinsert_item(&self, identity: &QueryIdentity, anchor: &Anchor, item: T) -> bool {
        let item_id = item.item_id();
        let inserted = self
            .slots
            .get_mut(identity)
            .is_some_and(|mut slot| slot.list.reinsert(anchor, item));
        if inserted {
            self.publish(identity, ListEventKind::ItemInserted(item_id));
        }
        inserted
    }

    /// Registers a view watching `identity`. Returns the number of views.
    pub fn retain(&self, identity: &QueryIdentity) -> usize {
        let mut slot = self
            .slots
            .entry(identity.clone())
            .or_insert_with(|| self.new_slot());
        slot.views += 1;
        slot.views
    }

    /// Unregisters a view. The entry is evicted when no view is left, and
    /// any fetch still in flight for it is discarded on arrival.
    pub fn release(&self, identity: &QueryIdentity) {
        let evicted = self
            .slots
            .remove_if_mut(identity, |_, slot| {
                slot.views = slot.views.saturating_sub(1);
                slot.views == 0
            })
            .is_some();
        if evicted {
            debug!(target: "Cache", "Evicted {identity}");
            self.publish(identity, ListEventKind::Evicted);
        }
    }

    pub fn views(&self, identity: &QueryIdentity) -> usize {
        self.slots.get(identity).map_or(0, |slot| slot.views)
    }

    pub fn identities(&self) -> Vec<QueryIdentity> {
        self.slots.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of cached lists.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drops every list, e.g. at the end of a session.
    pub fn clear(&self) {
        for identity in self.identities() {
            if self.slots.remove(&identity).is_some() {
                self.publish(&identity, ListEventKind::Evicted);
            }
        }
    }
}

impl<T: Item> RemoteListCache<T> {
    /// Applies the local half of a mutation to its target list.
    pub(crate) fn apply_intent(&self, intent: &MutationIntent) -> Applied<T> {
        let applied = {
            let mut slot = self.slots.get_mut(&intent.target);
            mutation::apply(intent, slot.as_mut().map(|s| &mut s.list))
        };
        if let Applied::Changed(undo) = &applied {
            self.publish(&intent.target, change_event(undo, false));
        }
        applied
    }

    /// Rolls back a change made by [`Self::apply_intent`].
    pub(crate) fn revert(&self, identity: &QueryIdentity, undo: Undo<T>) -> bool {
        let event = change_event(&undo, true);
        let reverted = self
            .slots
            .get_mut(identity)
            .is_some_and(|mut slot| mutation::revert(undo, &mut slot.list));
        if reverted {
            self.publish(identity, event);
        }
        reverted
    }
}

fn change_event<T: Keyed>(undo: &Undo<T>, reverting: bool) -> ListEventKind {
    let item_id = undo.item_id();
    match undo {
        Undo::Reinsert { .. } if reverting => ListEventKind::ItemInserted(item_id),
        Undo::Reinsert { .. } => ListEventKind::ItemRemoved(item_id),
        Undo::RestoreLike { .. } | Undo::RestoreRead { .. } => ListEventKind::ItemPatched(item_id),
    }
}

/// A view's registration on a cached list. Dropping the last view of a list
/// evicts it.
pub struct ListView<T: Keyed + Clone> {
    cache: Arc<RemoteListCache<T>>,
    identity: QueryIdentity,
}

impl<T: Keyed + Clone> ListView<T> {
    pub fn new(cache: Arc<RemoteListCache<T>>, identity: QueryIdentity) -> Self {
        cache.retain(&identity);
        Self { cache, identity }
    }

    pub fn identity(&self) -> &QueryIdentity {
        &self.identity
    }

    pub fn snapshot(&self) -> Option<CachedList<T>> {
        self.cache.get(&self.identity)
    }

    pub fn items(&self) -> Vec<T> {
        self.cache.items(&self.identity)
    }

    pub fn item_count(&self) -> usize {
        self.cache.item_count(&self.identity)
    }

    pub fn has_more(&self) -> bool {
        self.cache.has_more(&self.identity)
    }

    pub fn generation(&self) -> Option<u64> {
        self.cache.generation(&self.identity)
    }
}

impl<T: Keyed + Clone> Drop for ListView<T> {
    fn drop(&mut self) {
        self.cache.release(&self.identity);
    }
}
