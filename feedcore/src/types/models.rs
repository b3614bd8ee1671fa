//! Resource payloads as the backend serializes them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The short user card used for friends, friend requests, post likers and
/// notification senders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl UserSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub post_image_id: i64,
    pub post_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub post_images: Vec<PostImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_comment_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub comment_image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatType {
    PrivateChat,
    GroupChat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub chat_id: i64,
    pub chat_type: ChatType,
    #[serde(default)]
    pub group_chat_name: Option<String>,
    #[serde(default)]
    pub group_chat_image: Option<String>,
    #[serde(default)]
    pub private_chat_user: Option<UserSummary>,
    #[serde(default)]
    pub latest_message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl Chat {
    /// Name shown in a chat list row.
    pub fn display_name(&self) -> String {
        match self.chat_type {
            ChatType::GroupChat => self
                .group_chat_name
                .clone()
                .unwrap_or_else(|| "Group chat".to_string()),
            ChatType::PrivateChat => self
                .private_chat_user
                .as_ref()
                .map(UserSummary::full_name)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    PostLiked,
    PostComment,
    FriendRequest,
    FriendRequestAccepted,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: i64,
    pub notification_type: NotificationType,
    pub sender: UserSummary,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl Notification {
    pub fn is_friend_request(&self) -> bool {
        self.notification_type == NotificationType::FriendRequest
    }
}

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Friends,
    Pending,
    NotFriend,
}
