//! Infinite-scroll state machine.
//!
//! The presentation layer reports visibility changes of the sentinel element
//! placed after the last rendered item. The controller answers with a
//! [`ScrollCommand`] telling it whether to load the next page. It fires at
//! most once per hidden→visible transition and never while a load is
//! pending; once the list reports no more pages it stays terminal.

/// Visibility change of the scroll sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelEvent {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    LoadMore,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollController {
    item_count: usize,
    has_more: bool,
    loading: bool,
    sentinel_visible: bool,
}

impl ScrollController {
    pub fn new(item_count: usize, has_more: bool) -> Self {
        Self {
            item_count,
            has_more,
            loading: false,
            sentinel_visible: false,
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// No further loads will ever be issued for this list.
    pub fn is_terminal(&self) -> bool {
        !self.has_more
    }

    /// Whether the loading indicator should be rendered.
    pub fn show_loader(&self) -> bool {
        self.has_more && self.loading
    }

    pub fn on_sentinel(&mut self, event: SentinelEvent) -> ScrollCommand {
        match event {
            SentinelEvent::Hidden => {
                self.sentinel_visible = false;
                ScrollCommand::Idle
            }
            SentinelEvent::Visible => {
                let transition = !self.sentinel_visible;
                self.sentinel_visible = true;
                if !transition || self.loading || !self.has_more {
                    return ScrollCommand::Idle;
                }
                self.loading = true;
                ScrollCommand::LoadMore
            }
        }
    }

    /// A load finished. `snapshot` carries the new item count and whether
    /// more pages exist, when the load produced that information.
    pub fn on_load_finished(&mut self, snapshot: Option<(usize, bool)>) {
        self.loading = false;
        if let Some((item_count, has_more)) = snapshot {
            self.item_count = item_count;
            self.has_more = self.has_more && has_more;
        }
    }

    /// A load failed. The controller stays armed; the next visibility
    /// transition retries.
    pub fn on_load_failed(&mut self) {
        self.loading = false;
    }

    /// Syncs the item count after a local change (optimistic delete, ...).
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
    }
}
