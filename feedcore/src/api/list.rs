//! Paged list endpoints.
//!
//! Every list resource shares one request shape (`?pageNo=&pageSize=`) and
//! one response envelope; only the path, the list field name and the item
//! type differ.

use crate::api::spec::EndpointSpec;
use crate::page::{Page, parse_page};
use crate::query::{QueryIdentity, Resource};
use crate::request::ApiRequest;
use crate::types::item::FeedItem;
use crate::types::models::{Chat, Comment, Notification, Post, UserSummary};
use anyhow::{Result, anyhow};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Route of a list resource: path and the name of the JSON array field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRoute {
    pub path: String,
    pub list_field: &'static str,
}

pub fn route(identity: &QueryIdentity) -> Result<ListRoute> {
    let resource = identity.resource();
    if identity.params().len() != resource.arity() {
        return Err(anyhow!(
            "{resource} expects {} parameter(s), got {}",
            resource.arity(),
            identity.params().len()
        ));
    }
    let id = || {
        identity
            .id_param()
            .ok_or_else(|| anyhow!("{resource} expects an integer id"))
    };

    let (path, list_field) = match resource {
        Resource::AllPostList => ("/post/get/all".to_string(), "postList"),
        Resource::UserPostList => (format!("/post/get/{}", id()?), "postList"),
        Resource::PostComments => (format!("/post/{}/comment", id()?), "postCommentList"),
        Resource::PostLikeUserList => (format!("/post/{}/like/users", id()?), "userList"),
        Resource::UserFriendList => (format!("/friends/list/{}", id()?), "userList"),
        Resource::FriendRequestList => (format!("/friends/request/{}", id()?), "userList"),
        Resource::UserChats => (format!("/chat/{}", id()?), "chatModels"),
        Resource::UserNotifications => (format!("/notifications/{}", id()?), "notificationModels"),
    };
    Ok(ListRoute { path, list_field })
}

/// Fetches one page of the list named by `identity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpec {
    pub identity: QueryIdentity,
    pub page_no: u32,
    pub page_size: u32,
}

impl ListSpec {
    pub fn new(identity: QueryIdentity, page_no: u32, page_size: u32) -> Self {
        Self {
            identity,
            page_no,
            page_size,
        }
    }
}

impl EndpointSpec for ListSpec {
    type Response = Page<FeedItem>;

    fn build_request(&self) -> Result<ApiRequest> {
        let route = route(&self.identity)?;
        Ok(ApiRequest::get(route.path)
            .with_query("pageNo", self.page_no)
            .with_query("pageSize", self.page_size))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        let field = route(&self.identity)?.list_field;
        let page = match self.identity.resource() {
            Resource::AllPostList | Resource::UserPostList => {
                parse_page::<Post>(body, field)?.map(FeedItem::Post)
            }
            Resource::PostComments => parse_page::<Comment>(body, field)?.map(FeedItem::Comment),
            Resource::UserChats => parse_page::<Chat>(body, field)?.map(FeedItem::Chat),
            Resource::UserNotifications => {
                parse_page::<Notification>(body, field)?.map(FeedItem::Notification)
            }
            Resource::PostLikeUserList | Resource::UserFriendList | Resource::FriendRequestList => {
                parse_page::<UserSummary>(body, field)?.map(FeedItem::User)
            }
        };
        Ok(page)
    }
}
