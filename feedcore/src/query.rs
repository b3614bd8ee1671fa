//! Cache keys for remote lists.
//!
//! A [`QueryIdentity`] names one paginated list on the server: the resource
//! tag plus the scalar filters that select it (owner user id, post id, ...).
//! Two identities address the same cached list iff the tag and every
//! parameter match.

use std::fmt;
use thiserror::Error;

/// The kinds of remote lists the client knows how to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    AllPostList,
    UserPostList,
    PostComments,
    PostLikeUserList,
    UserFriendList,
    FriendRequestList,
    UserChats,
    UserNotifications,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resource tag: {0}")]
pub struct UnknownResource(pub String);

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::AllPostList,
        Resource::UserPostList,
        Resource::PostComments,
        Resource::PostLikeUserList,
        Resource::UserFriendList,
        Resource::FriendRequestList,
        Resource::UserChats,
        Resource::UserNotifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::AllPostList => "allPostList",
            Resource::UserPostList => "userPostList",
            Resource::PostComments => "postComments",
            Resource::PostLikeUserList => "postLikeUserList",
            Resource::UserFriendList => "userFriendList",
            Resource::FriendRequestList => "friendRequestList",
            Resource::UserChats => "userChats",
            Resource::UserNotifications => "userNotifications",
        }
    }

    /// Number of scalar parameters a query for this resource carries.
    pub fn arity(&self) -> usize {
        match self {
            Resource::AllPostList => 0,
            _ => 1,
        }
    }

    /// Whether lists of this resource hold posts.
    pub fn is_post_list(&self) -> bool {
        matches!(self, Resource::AllPostList | Resource::UserPostList)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Resource {
    type Error = UnknownResource;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == value)
            .ok_or_else(|| UnknownResource(value.to_string()))
    }
}

/// A single filter value of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryParam {
    Int(i64),
    Str(String),
}

impl QueryParam {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            QueryParam::Int(v) => Some(*v),
            QueryParam::Str(_) => None,
        }
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        QueryParam::Int(value)
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Str(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        QueryParam::Str(value)
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Int(v) => write!(f, "{v}"),
            QueryParam::Str(s) => f.write_str(s),
        }
    }
}

/// Key of one cached remote list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryIdentity {
    resource: Resource,
    params: Vec<QueryParam>,
}

impl QueryIdentity {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<QueryParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// The first parameter as an integer id, if there is one.
    pub fn id_param(&self) -> Option<i64> {
        self.params.first().and_then(QueryParam::as_int)
    }

    pub fn all_posts() -> Self {
        Self::new(Resource::AllPostList)
    }

    pub fn user_posts(user_id: i64) -> Self {
        Self::new(Resource::UserPostList).with_param(user_id)
    }

    pub fn post_comments(post_id: i64) -> Self {
        Self::new(Resource::PostComments).with_param(post_id)
    }

    pub fn post_likers(post_id: i64) -> Self {
        Self::new(Resource::PostLikeUserList).with_param(post_id)
    }

    pub fn friend_list(user_id: i64) -> Self {
        Self::new(Resource::UserFriendList).with_param(user_id)
    }

    pub fn friend_requests(user_id: i64) -> Self {
        Self::new(Resource::FriendRequestList).with_param(user_id)
    }

    pub fn user_chats(user_id: i64) -> Self {
        Self::new(Resource::UserChats).with_param(user_id)
    }

    pub fn notifications(user_id: i64) -> Self {
        Self::new(Resource::UserNotifications).with_param(user_id)
    }
}

impl fmt::Display for QueryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource.as_str())?;
        if !self.params.is_empty() {
            f.write_str("[")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{p}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
