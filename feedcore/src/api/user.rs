use crate::api::spec::EndpointSpec;
use crate::request::ApiRequest;
use crate::types::models::CurrentUser;
use anyhow::Result;

/// Profile of the token's owner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUserSpec;

impl EndpointSpec for CurrentUserSpec {
    type Response = CurrentUser;

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::get("/user"))
    }

    fn parse_response(&self, body: &[u8]) -> Result<Self::Response> {
        Ok(serde_json::from_slice(body)?)
    }
}
