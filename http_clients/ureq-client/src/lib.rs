use anyhow::Result;
use async_trait::async_trait;
use feedcore::net::{HttpClient, HttpRequest, HttpResponse, Method};
use std::collections::HashMap;

/// HTTP client implementation using `ureq` for synchronous HTTP requests.
/// Since `ureq` is blocking, all requests are wrapped in `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct UreqHttpClient;

impl UreqHttpClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UreqHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn prepare<B>(
    request: ureq::RequestBuilder<B>,
    headers: &HashMap<String, String>,
) -> ureq::RequestBuilder<B> {
    // Status codes are classified by the caller, not turned into errors here.
    let mut request = request.config().http_status_as_error(false).build();
    for (key, value) in headers {
        request = request.header(key.as_str(), value.as_str());
    }
    request
}

fn execute_blocking(request: HttpRequest) -> Result<HttpResponse> {
    log::trace!(target: "Http", "{} {}", request.method, request.url);
    let HttpRequest {
        url,
        method,
        headers,
        body,
    } = request;

    let response = match method {
        Method::Get => prepare(ureq::get(&url), &headers).call()?,
        Method::Delete => prepare(ureq::delete(&url), &headers).call()?,
        Method::Post | Method::Put => {
            let builder = if method == Method::Post {
                ureq::post(&url)
            } else {
                ureq::put(&url)
            };
            let builder = prepare(builder, &headers);
            match body {
                Some(body) => builder.send(&body[..])?,
                None => builder.send_empty()?,
            }
        }
    };

    let status_code = response.status().as_u16();

    // Read the response body
    let mut body = response.into_body();
    let body_bytes = body.read_to_vec()?;

    Ok(HttpResponse {
        status_code,
        body: body_bytes,
    })
}

#[async_trait]
impl HttpClient for UreqHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        // Since ureq is blocking, we must use spawn_blocking
        tokio::task::spawn_blocking(move || execute_blocking(request)).await?
    }
}
