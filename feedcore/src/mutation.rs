//! Optimistic mutation intents and their local apply/undo.
//!
//! A user gesture becomes a [`MutationIntent`]. [`apply`] performs the local
//! half against a cached list synchronously and hands back the [`Undo`]
//! record needed to roll it back if the server rejects the change.

use crate::list::{Anchor, CachedList};
use crate::query::QueryIdentity;
use crate::types::item::{Item, ItemId, LikeState};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    LikeToggle,
    MarkRead,
    Delete,
    AcceptRequest,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::LikeToggle => "like-toggle",
            MutationKind::MarkRead => "mark-read",
            MutationKind::Delete => "delete",
            MutationKind::AcceptRequest => "accept-request",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending change to one item of one cached list.
///
/// `dependents` are other lists whose membership the change affects; they
/// are invalidated once the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationIntent {
    pub kind: MutationKind,
    pub item_id: ItemId,
    pub target: QueryIdentity,
    pub dependents: Vec<QueryIdentity>,
}

impl MutationIntent {
    pub fn new(kind: MutationKind, item_id: impl Into<ItemId>, target: QueryIdentity) -> Self {
        Self {
            kind,
            item_id: item_id.into(),
            target,
            dependents: Vec::new(),
        }
    }

    pub fn like_toggle(item_id: impl Into<ItemId>, target: QueryIdentity) -> Self {
        Self::new(MutationKind::LikeToggle, item_id, target)
    }

    pub fn mark_read(item_id: impl Into<ItemId>, target: QueryIdentity) -> Self {
        Self::new(MutationKind::MarkRead, item_id, target)
    }

    pub fn delete(item_id: impl Into<ItemId>, target: QueryIdentity) -> Self {
        Self::new(MutationKind::Delete, item_id, target)
    }

    pub fn accept_request(item_id: impl Into<ItemId>, target: QueryIdentity) -> Self {
        Self::new(MutationKind::AcceptRequest, item_id, target)
    }

    pub fn with_dependent(mut self, identity: QueryIdentity) -> Self {
        if identity != self.target && !self.dependents.contains(&identity) {
            self.dependents.push(identity);
        }
        self
    }

    pub fn with_dependents(self, identities: impl IntoIterator<Item = QueryIdentity>) -> Self {
        identities
            .into_iter()
            .fold(self, |intent, identity| intent.with_dependent(identity))
    }
}

impl fmt::Display for MutationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} on {}", self.kind, self.item_id, self.target)
    }
}

/// What it takes to revert an applied change.
#[derive(Debug, Clone, PartialEq)]
pub enum Undo<T> {
    RestoreLike {
        item_id: ItemId,
        previous: LikeState,
        applied: LikeState,
    },
    RestoreRead { item_id: ItemId, previous: bool },
    Reinsert { anchor: Anchor, item: T },
}

/// Result of applying an intent locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    Changed(Undo<T>),
    /// The item already reflects the change (mark-read on a read item).
    AlreadyApplied,
    /// Nothing is applied before the server answers.
    Deferred,
    /// The target list does not hold the item.
    NotCached,
    /// The item does not support this kind of mutation.
    Unsupported,
}

/// Applies the local half of `intent` to `list`.
pub fn apply<T: Item>(intent: &MutationIntent, list: Option<&mut CachedList<T>>) -> Applied<T> {
    if intent.kind == MutationKind::AcceptRequest {
        return Applied::Deferred;
    }
    let Some(list) = list else {
        return Applied::NotCached;
    };
    let id = intent.item_id;

    match intent.kind {
        MutationKind::LikeToggle => list
            .update(id, |item| {
                let Some(previous) = item.like_state() else {
                    return Applied::Unsupported;
                };
                let applied = previous.toggled();
                item.set_like_state(applied);
                Applied::Changed(Undo::RestoreLike {
                    item_id: id,
                    previous,
                    applied,
                })
            })
            .unwrap_or(Applied::NotCached),
        MutationKind::MarkRead => list
            .update(id, |item| match item.is_read() {
                None => Applied::Unsupported,
                Some(true) => Applied::AlreadyApplied,
                Some(false) => {
                    item.set_read(true);
                    Applied::Changed(Undo::RestoreRead {
                        item_id: id,
                        previous: false,
                    })
                }
            })
            .unwrap_or(Applied::NotCached),
        MutationKind::Delete => match list.remove(id) {
            Some((anchor, item)) => Applied::Changed(Undo::Reinsert { anchor, item }),
            None => Applied::NotCached,
        },
        MutationKind::AcceptRequest => Applied::Deferred,
    }
}

/// Reverts a previously applied change. Returns `false` if the list no
/// longer has room for it (for example it was invalidated meanwhile).
///
/// A like is only restored verbatim while the item still holds the state
/// this change put there; if a later toggle moved it on, this change is
/// undone by toggling once more.
pub fn revert<T: Item>(undo: Undo<T>, list: &mut CachedList<T>) -> bool {
    match undo {
        Undo::RestoreLike {
            item_id,
            previous,
            applied,
        } => list
            .update(item_id, |item| match item.like_state() {
                Some(current) if current == applied => item.set_like_state(previous),
                Some(current) => item.set_like_state(current.toggled()),
                None => false,
            })
            .unwrap_or(false),
        Undo::RestoreRead { item_id, previous } => list
            .update(item_id, |item| item.set_read(previous))
            .unwrap_or(false),
        Undo::Reinsert { anchor, item } => list.reinsert(&anchor, item),
    }
}

impl<T> Undo<T> {
    pub fn item_id(&self) -> ItemId
    where
        T: crate::types::item::Keyed,
    {
        match self {
            Undo::RestoreLike { item_id, .. } | Undo::RestoreRead { item_id, .. } => *item_id,
            Undo::Reinsert { item, .. } => item.item_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::types::item::{FeedItem, Keyed};
    use crate::types::models::{Notification, NotificationType, Post, UserSummary};

    fn post(id: i64, liked: bool, like_count: u64) -> FeedItem {
        FeedItem::Post(Post {
            post_id: id,
            user_id: 1,
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            profile_picture: None,
            content: Some("hello".into()),
            timestamp: None,
            liked,
            like_count,
            comment_count: 0,
            post_images: Vec::new(),
        })
    }

    fn notification(id: i64, read: bool) -> FeedItem {
        FeedItem::Notification(Notification {
            notification_id: id,
            notification_type: NotificationType::PostLiked,
            sender: UserSummary {
                user_id: 2,
                first_name: "Alan".into(),
                last_name: "Turing".into(),
                profile_picture: None,
            },
            message: "liked your post".into(),
            content: None,
            post_id: Some(10),
            read,
            timestamp: None,
        })
    }

    fn list_of(items: Vec<FeedItem>) -> CachedList<FeedItem> {
        let mut list = CachedList::new();
        list.append(Page::new(items, 0, 1));
        list
    }

    #[test]
    fn test_like_toggle_apply_then_revert() {
        let target = QueryIdentity::all_posts();
        let mut list = list_of(vec![post(1, false, 5)]);
        let intent = MutationIntent::like_toggle(1, target);

        let Applied::Changed(undo) = apply(&intent, Some(&mut list)) else {
            panic!("expected a change");
        };
        let state = list.get(ItemId(1)).and_then(Item::like_state).unwrap();
        assert_eq!(
            state,
            LikeState {
                liked: true,
                count: 6
            }
        );

        assert!(revert(undo, &mut list));
        let state = list.get(ItemId(1)).and_then(Item::like_state).unwrap();
        assert_eq!(
            state,
            LikeState {
                liked: false,
                count: 5
            }
        );
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let target = QueryIdentity::notifications(2);
        let mut list = list_of(vec![notification(4, false)]);
        let intent = MutationIntent::mark_read(4, target);

        assert!(matches!(
            apply(&intent, Some(&mut list)),
            Applied::Changed(Undo::RestoreRead { .. })
        ));
        let after_once = list.clone();
        assert_eq!(apply(&intent, Some(&mut list)), Applied::AlreadyApplied);
        assert_eq!(list, after_once);
    }

    #[test]
    fn test_delete_revert_restores_index() {
        let target = QueryIdentity::notifications(2);
        let mut list = list_of(vec![
            notification(1, false),
            notification(2, false),
            notification(3, true),
        ]);
        let intent = MutationIntent::delete(2, target);

        let Applied::Changed(undo) = apply(&intent, Some(&mut list)) else {
            panic!("expected a change");
        };
        assert_eq!(list.len(), 2);
        assert!(!list.contains(ItemId(2)));

        assert!(revert(undo, &mut list));
        assert_eq!(list.position_of(ItemId(2)).map(|p| list.flat_index(p)), Some(1));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_overlapping_deletes_restore_server_order() {
        let target = QueryIdentity::notifications(2);
        let mut list = list_of((0..4).map(|id| notification(id, false)).collect());

        let first = MutationIntent::delete(2, target.clone());
        let Applied::Changed(pending) = apply(&first, Some(&mut list)) else {
            panic!("expected a change");
        };
        // a second delete on the same page is confirmed while the first is pending
        assert!(matches!(
            apply(&MutationIntent::delete(0, target), Some(&mut list)),
            Applied::Changed(_)
        ));

        assert!(revert(pending, &mut list));
        let ids: Vec<i64> = list.iter().map(|item| item.item_id().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_toggle_does_not_clobber_later_toggle() {
        let target = QueryIdentity::all_posts();
        let mut list = list_of(vec![post(1, false, 5)]);
        let intent = MutationIntent::like_toggle(1, target);

        let Applied::Changed(first) = apply(&intent, Some(&mut list)) else {
            panic!("expected a change");
        };
        let Applied::Changed(_second) = apply(&intent, Some(&mut list)) else {
            panic!("expected a change");
        };

        // only the first toggle is rejected; the second one still stands
        assert!(revert(first, &mut list));
        let state = list.get(ItemId(1)).and_then(Item::like_state).unwrap();
        assert_eq!(
            state,
            LikeState {
                liked: true,
                count: 6
            }
        );
    }

    #[test]
    fn test_unsupported_and_missing_items() {
        let target = QueryIdentity::notifications(2);
        let mut list = list_of(vec![notification(1, false)]);

        assert_eq!(
            apply(&MutationIntent::like_toggle(1, target.clone()), Some(&mut list)),
            Applied::Unsupported
        );
        assert_eq!(
            apply(&MutationIntent::mark_read(99, target.clone()), Some(&mut list)),
            Applied::NotCached
        );
        assert_eq!(
            apply::<FeedItem>(&MutationIntent::delete(1, target.clone()), None),
            Applied::NotCached
        );
        assert_eq!(
            apply(&MutationIntent::accept_request(1, target), Some(&mut list)),
            Applied::Deferred
        );
    }

    #[test]
    fn test_dependents_skip_target_and_duplicates() {
        let target = QueryIdentity::friend_requests(1);
        let intent = MutationIntent::accept_request(5, target.clone())
            .with_dependent(target)
            .with_dependents([QueryIdentity::friend_list(1), QueryIdentity::friend_list(1)]);
        assert_eq!(intent.dependents, vec![QueryIdentity::friend_list(1)]);
    }
}
