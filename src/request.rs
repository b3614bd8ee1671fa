use crate::client::Client;
use feedcore::api::EndpointSpec;
use feedcore::net::HttpResponse;
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Coarse classification of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport-level trouble: connection, timeout, 5xx.
    Network,
    /// Missing or rejected token.
    Auth,
    /// The backend refused the change (already friended, bad input, ...).
    Conflict,
}

/// Custom error types for REST operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no auth token available; request not sent")]
    Unauthenticated,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Network(#[source] anyhow::Error),
    #[error("server rejected credentials (status {status})")]
    Unauthorized { status: u16 },
    #[error("request rejected: status={status}, message='{message}'")]
    Conflict { status: u16, message: String },
    #[error("server error: status={status}, message='{message}'")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[source] anyhow::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated | ApiError::Unauthorized { .. } => ErrorKind::Auth,
            ApiError::Conflict { .. } | ApiError::InvalidRequest(_) => ErrorKind::Conflict,
            ApiError::Timeout(_)
            | ApiError::Network(_)
            | ApiError::Server { .. }
            | ApiError::Decode(_) => ErrorKind::Network,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout(_) | ApiError::Network(_) | ApiError::Server { .. }
        )
    }

    pub(crate) fn from_status(response: &HttpResponse) -> Self {
        let status = response.status_code;
        let message = response.body_text();
        match status {
            401 | 403 => ApiError::Unauthorized { status },
            400 | 404 | 409 | 422 => ApiError::Conflict { status, message },
            _ => ApiError::Server { status, message },
        }
    }
}

impl Client {
    /// Sends the request described by `spec` and parses the answer.
    ///
    /// Nothing is sent when no auth token is available.
    pub async fn execute<S: EndpointSpec>(&self, spec: S) -> Result<S::Response, ApiError> {
        let token = self.auth.token().ok_or(ApiError::Unauthenticated)?;
        let request = spec
            .build_request()
            .and_then(|r| r.into_http(&self.config.base_url, &token))
            .map_err(ApiError::InvalidRequest)?;

        debug!(target: "Http", "{} {}", request.method, request.url);
        let request_timeout = self.config.request_timeout;
        let response = match timeout(request_timeout, self.http_client.execute(request)).await {
            Err(_) => return Err(ApiError::Timeout(request_timeout)),
            Ok(Err(e)) => return Err(ApiError::Network(e)),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            let error = ApiError::from_status(&response);
            warn!(target: "Http", "Request failed: {error}");
            return Err(error);
        }

        spec.parse_response(&response.body)
            .map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status_code: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status_code,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ApiError::from_status(&response(401, "")),
            ApiError::Unauthorized { status: 401 }
        ));
        let conflict = ApiError::from_status(&response(409, "already friends"));
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(!conflict.is_retryable());
        assert!(conflict.to_string().contains("already friends"));

        let server = ApiError::from_status(&response(503, "down"));
        assert_eq!(server.kind(), ErrorKind::Network);
        assert!(server.is_retryable());
    }

    #[test]
    fn test_unauthenticated_is_auth_failure() {
        assert_eq!(ApiError::Unauthenticated.kind(), ErrorKind::Auth);
        assert!(!ApiError::Unauthenticated.is_retryable());
    }
}
