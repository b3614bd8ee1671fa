use crate::types::models::{Chat, Comment, Notification, Post, UserSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a list item, stable across fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The one capability every cached item has.
pub trait Keyed {
    fn item_id(&self) -> ItemId;
}

/// Liked flag together with its counter. The two always move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: u64,
}

impl LikeState {
    pub fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                count: self.count + 1,
            }
        }
    }
}

/// Optional capabilities the optimistic mutator relies on.
///
/// Items that do not support a capability keep the defaults, which report
/// it as absent.
pub trait Item: Keyed + Clone + Send + Sync + 'static {
    fn like_state(&self) -> Option<LikeState> {
        None
    }

    /// Returns `false` if the item cannot be liked.
    fn set_like_state(&mut self, _state: LikeState) -> bool {
        false
    }

    fn is_read(&self) -> Option<bool> {
        None
    }

    /// Returns `false` if the item has no read flag.
    fn set_read(&mut self, _read: bool) -> bool {
        false
    }
}

/// Any payload a remote list can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    Post(Post),
    Comment(Comment),
    Chat(Chat),
    Notification(Notification),
    User(UserSummary),
}

impl FeedItem {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedItem::Post(_) => "post",
            FeedItem::Comment(_) => "comment",
            FeedItem::Chat(_) => "chat",
            FeedItem::Notification(_) => "notification",
            FeedItem::User(_) => "user",
        }
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            FeedItem::Post(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            FeedItem::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_chat(&self) -> Option<&Chat> {
        match self {
            FeedItem::Chat(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            FeedItem::Notification(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserSummary> {
        match self {
            FeedItem::User(u) => Some(u),
            _ => None,
        }
    }
}

impl Keyed for FeedItem {
    fn item_id(&self) -> ItemId {
        let id = match self {
            FeedItem::Post(p) => p.post_id,
            FeedItem::Comment(c) => c.post_comment_id,
            FeedItem::Chat(c) => c.chat_id,
            FeedItem::Notification(n) => n.notification_id,
            FeedItem::User(u) => u.user_id,
        };
        ItemId(id)
    }
}

impl Item for FeedItem {
    fn like_state(&self) -> Option<LikeState> {
        match self {
            FeedItem::Post(p) => Some(LikeState {
                liked: p.liked,
                count: p.like_count,
            }),
            _ => None,
        }
    }

    fn set_like_state(&mut self, state: LikeState) -> bool {
        match self {
            FeedItem::Post(p) => {
                p.liked = state.liked;
                p.like_count = state.count;
                true
            }
            _ => false,
        }
    }

    fn is_read(&self) -> Option<bool> {
        match self {
            FeedItem::Notification(n) => Some(n.read),
            _ => None,
        }
    }

    fn set_read(&mut self, read: bool) -> bool {
        match self {
            FeedItem::Notification(n) => {
                n.read = read;
                true
            }
            _ => false,
        }
    }
}
