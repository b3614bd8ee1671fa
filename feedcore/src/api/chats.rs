use crate::api::spec::EndpointSpec;
use crate::request::ApiRequest;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupChatBody<'a> {
    friend_id: &'a [i64],
    text: &'a str,
}

/// Creates a group chat owned by `user_id` with an opening message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupChatSpec {
    pub user_id: i64,
    pub friend_ids: Vec<i64>,
    pub text: String,
}

impl EndpointSpec for CreateGroupChatSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        ApiRequest::post(format!("/chat/group/create/{}", self.user_id)).with_json(
            &CreateGroupChatBody {
                friend_id: &self.friend_ids,
                text: &self.text,
            },
        )
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}
