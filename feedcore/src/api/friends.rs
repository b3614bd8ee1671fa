use crate::api::spec::{EndpointSpec, json_field};
use crate::request::ApiRequest;
use crate::types::models::FriendshipStatus;
use anyhow::Result;

/// Accepts the friend request sent by `requester_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptFriendRequestSpec {
    pub requester_id: i64,
}

impl EndpointSpec for AcceptFriendRequestSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::post(format!("/friends/accept/{}", self.requester_id)))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

/// Declines (deletes) the friend request sent by `requester_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteFriendRequestSpec {
    pub requester_id: i64,
}

impl EndpointSpec for DeleteFriendRequestSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::delete(format!(
            "/friends/request/delete/{}",
            self.requester_id
        )))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnfriendSpec {
    pub friend_id: i64,
}

impl EndpointSpec for UnfriendSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::delete(format!("/friends/unfriend/{}", self.friend_id)))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

/// Sends a friend request, or cancels it when one is already pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddFriendSpec {
    pub user_id: i64,
}

impl EndpointSpec for AddFriendSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::post(format!("/friends/add/{}", self.user_id)))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

/// Answers `{ "status": "FRIENDS" | "PENDING" | "NOT_FRIEND" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendshipStatusSpec {
    pub user_id: i64,
}

impl EndpointSpec for FriendshipStatusSpec {
    type Response = FriendshipStatus;

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::get(format!("/friends/status/{}", self.user_id)))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        json_field(body, "status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Method;

    #[test]
    fn test_request_paths() {
        let accept = AcceptFriendRequestSpec { requester_id: 8 }
            .build_request()
            .unwrap();
        assert_eq!((accept.method, accept.path.as_str()), (Method::Post, "/friends/accept/8"));

        let decline = DeleteFriendRequestSpec { requester_id: 8 }
            .build_request()
            .unwrap();
        assert_eq!(decline.method, Method::Delete);
        assert_eq!(decline.path, "/friends/request/delete/8");
    }

    #[test]
    fn test_parse_friendship_status() {
        let spec = FriendshipStatusSpec { user_id: 2 };
        assert_eq!(
            spec.parse_response(br#"{"status":"PENDING"}"#).unwrap(),
            FriendshipStatus::Pending
        );
        assert!(spec.parse_response(br#"{"status":"ENEMIES"}"#).is_err());
    }
}
