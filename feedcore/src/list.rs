//! Paginated accumulation of one remote list.
//!
//! Pages are kept in the order they were fetched, which is always ascending
//! page number starting at 0, so the flattened item sequence is exactly the
//! server order. No client-side sorting happens here.

use crate::page::Page;
use crate::types::item::{ItemId, Keyed};
use log::warn;
use std::collections::HashSet;

/// Where an item sits: page number plus offset inside that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub page: u32,
    pub offset: usize,
}

/// Where a removed item sat, remembered relative to the items that preceded
/// it on its page so the spot survives other removals from that page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub position: Position,
    pub preceding: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The page was stored. `duplicates` items were dropped because their id
    /// was already present.
    Appended {
        page_no: u32,
        added: usize,
        duplicates: usize,
    },
    /// The page number was not the next expected one; nothing changed.
    Rejected { expected: u32, received: u32 },
}

impl AppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, AppendOutcome::Appended { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedList<T> {
    pages: Vec<Page<T>>,
}

impl<T> Default for CachedList<T> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<T> CachedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total items across all pages.
    pub fn len(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items in server order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    pub fn last_page_no(&self) -> Option<u32> {
        self.pages.last().map(|p| p.page_no)
    }

    /// The page number the next fetch must request.
    pub fn next_page_no(&self) -> u32 {
        self.last_page_no().map_or(0, |n| n + 1)
    }

    /// Whether another page can be requested. A list that has not fetched
    /// anything yet always has more.
    pub fn has_more(&self) -> bool {
        self.pages.last().is_none_or(Page::has_more)
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.pages.last().map(|p| p.total_pages)
    }

    /// Flattened index of a position.
    pub fn flat_index(&self, position: Position) -> usize {
        self.pages
            .iter()
            .take(position.page as usize)
            .map(Page::len)
            .sum::<usize>()
            + position.offset
    }
}

impl<T: Clone> CachedList<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: Keyed> CachedList<T> {
    /// Stores `page` if it is the next expected one.
    ///
    /// Items whose id already appears in the list (or earlier in the same
    /// page) are dropped so an id never shows up twice.
    pub fn append(&mut self, page: Page<T>) -> AppendOutcome {
        let expected = self.next_page_no();
        if page.page_no != expected {
            return AppendOutcome::Rejected {
                expected,
                received: page.page_no,
            };
        }

        let mut seen: HashSet<ItemId> = self.iter().map(Keyed::item_id).collect();
        let Page {
            items,
            page_no,
            total_pages,
        } = page;
        let incoming = items.len();
        let items: Vec<T> = items
            .into_iter()
            .filter(|item| seen.insert(item.item_id()))
            .collect();
        let duplicates = incoming - items.len();
        if duplicates > 0 {
            warn!(
                target: "Cache",
                "Dropped {duplicates} duplicate item(s) from page {page_no}"
            );
        }

        let added = items.len();
        self.pages.push(Page::new(items, page_no, total_pages));
        AppendOutcome::Appended {
            page_no,
            added,
            duplicates,
        }
    }

    pub fn position_of(&self, id: ItemId) -> Option<Position> {
        self.pages.iter().find_map(|page| {
            page.items
                .iter()
                .position(|item| item.item_id() == id)
                .map(|offset| Position {
                    page: page.page_no,
                    offset,
                })
        })
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.iter().find(|item| item.item_id() == id)
    }

    /// Replaces the item with `id` by `updater(&item)`, returning the
    /// previous value.
    pub fn patch(&mut self, id: ItemId, updater: impl FnOnce(&T) -> T) -> Option<T> {
        let slot = self
            .pages
            .iter_mut()
            .flat_map(|p| p.items.iter_mut())
            .find(|item| item.item_id() == id)?;
        let updated = updater(slot);
        Some(std::mem::replace(slot, updated))
    }

    /// Mutates the item with `id` in place. Returns whatever `f` returns, or
    /// `None` when the item is absent.
    pub fn update<R>(&mut self, id: ItemId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.pages
            .iter_mut()
            .flat_map(|p| p.items.iter_mut())
            .find(|item| item.item_id() == id)
            .map(f)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<(Anchor, T)> {
        let position = self.position_of(id)?;
        let page = self.pages.get_mut(position.page as usize)?;
        let preceding = page.items[..position.offset]
            .iter()
            .map(Keyed::item_id)
            .collect();
        let item = page.items.remove(position.offset);
        Some((
            Anchor {
                position,
                preceding,
            },
            item,
        ))
    }

    /// Puts a removed item back right after the closest of its former
    /// predecessors still on the page, or at the page start when none is
    /// left. Fails under the same conditions as [`Self::insert_at`].
    pub fn reinsert(&mut self, anchor: &Anchor, item: T) -> bool {
        if self.contains(item.item_id()) {
            return false;
        }
        let Some(page) = self.pages.get_mut(anchor.position.page as usize) else {
            return false;
        };
        let offset = anchor
            .preceding
            .iter()
            .rev()
            .find_map(|id| page.items.iter().position(|i| i.item_id() == *id))
            .map_or(0, |at| at + 1);
        page.items.insert(offset, item);
        true
    }

    /// Puts an item back at `position`. Offsets past the end of the page
    /// append to it. Fails if the page is no longer stored (the list was
    /// invalidated in the meantime) or the id is already present.
    pub fn insert_at(&mut self, position: Position, item: T) -> bool {
        if self.contains(item.item_id()) {
            return false;
        }
        let Some(page) = self.pages.get_mut(position.page as usize) else {
            return false;
        };
        let offset = position.offset.min(page.items.len());
        page.items.insert(offset, item);
        true
    }
}
