use crate::api::spec::{EndpointSpec, json_field};
use crate::request::ApiRequest;
use anyhow::Result;
use serde::Serialize;

/// Toggles the caller's like on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleLikeSpec {
    pub post_id: i64,
}

impl EndpointSpec for ToggleLikeSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::post(format!("/post/{}/like", self.post_id)))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

/// Whether the caller likes a post. Answers `{ "liked": bool }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPostLikeSpec {
    pub post_id: i64,
}

impl EndpointSpec for GetPostLikeSpec {
    type Response = bool;

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::get(format!("/post/{}/like", self.post_id)))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        json_field(body, "liked")
    }
}

/// Answers `{ "postLikeCount": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPostLikeCountSpec {
    pub post_id: i64,
}

impl EndpointSpec for GetPostLikeCountSpec {
    type Response = u64;

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::get(format!("/post/{}/like/count", self.post_id)))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        json_field(body, "postLikeCount")
    }
}

/// Answers `{ "postCommentCount": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCommentCountSpec {
    pub post_id: i64,
}

impl EndpointSpec for GetCommentCountSpec {
    type Response = u64;

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::get(format!("/post/{}/comment/count", self.post_id)))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        json_field(body, "postCommentCount")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletePostSpec {
    pub post_id: i64,
}

impl EndpointSpec for DeletePostSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::delete(format!("/post/delete/{}", self.post_id)))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentBody<'a> {
    comment: &'a str,
}

/// Adds a text comment to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCommentSpec {
    pub post_id: i64,
    pub comment: String,
}

impl EndpointSpec for WriteCommentSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        ApiRequest::post(format!("/post/{}/comment", self.post_id)).with_json(&CommentBody {
            comment: &self.comment,
        })
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}
