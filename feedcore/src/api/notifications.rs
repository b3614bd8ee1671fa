use crate::api::spec::EndpointSpec;
use crate::request::ApiRequest;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkAsReadSpec {
    pub notification_id: i64,
}

impl EndpointSpec for MarkAsReadSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::put(format!(
            "/notifications/read/{}",
            self.notification_id
        )))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteNotificationSpec {
    pub notification_id: i64,
}

impl EndpointSpec for DeleteNotificationSpec {
    type Response = ();

    fn build_request(&self) -> Result<ApiRequest> {
        Ok(ApiRequest::delete(format!(
            "/notifications/delete/{}",
            self.notification_id
        )))
    }

    fn parse_response(&self, _body: &[u8]) -> Result<Self::Response> {
        Ok(())
    }
}
