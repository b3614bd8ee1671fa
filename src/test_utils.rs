use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::Client;
use crate::config::ClientConfig;
use feedcore::net::{HttpClient, HttpRequest, HttpResponse, Method};
use serde_json::Value;

#[derive(Debug, Clone)]
enum Reply {
    Respond(u16, Vec<u8>),
    Fail(String),
}

/// Scripted HTTP transport.
///
/// Replies are registered per method and path suffix and handed out in
/// order; the last one for a route keeps being repeated. Unscripted routes
/// answer 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn path_of(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Reply::Respond(status, body.to_string().into_bytes()));
        self
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.respond(method, path, 200, body)
    }

    /// Makes the transport itself fail for this route.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::Fail(message.to_string()));
        self
    }

    /// Delays every answer, to keep requests in flight.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of requests sent to `method` + `path` suffix.
    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && path_of(&r.url).ends_with(path))
            .count()
    }

    fn next_reply(&self, method: Method, url: &str) -> Option<Reply> {
        let path = path_of(url);
        let mut routes = lock(&self.routes);
        let queue = routes
            .iter_mut()
            .filter(|((m, suffix), _)| *m == method && path.ends_with(suffix.as_str()))
            .max_by_key(|((_, suffix), _)| suffix.len())
            .map(|(_, queue)| queue)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, anyhow::Error> {
        let reply = self.next_reply(request.method, &request.url);
        lock(&self.requests).push(request);

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Reply::Respond(status_code, body)) => Ok(HttpResponse { status_code, body }),
            Some(Reply::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(HttpResponse {
                status_code: 404,
                body: b"no route".to_vec(),
            }),
        }
    }
}

/// A JSON list page in the server's envelope.
pub fn page_body(list_field: &str, items: Value, page_no: u32, total_pages: u32) -> Value {
    let mut body = serde_json::json!({
        "pageResponse": { "pageNo": page_no, "totalPages": total_pages },
    });
    body[list_field] = items;
    body
}

pub fn create_test_client(http: Arc<MockHttpClient>) -> Arc<Client> {
    create_test_client_with_config(http, ClientConfig::default())
}

pub fn create_test_client_with_config(http: Arc<MockHttpClient>, config: ClientConfig) -> Arc<Client> {
    Arc::new(
        Client::builder()
            .with_http_client(http)
            .with_token("test-token")
            .with_config(config)
            .build()
            .expect("test client should build"),
    )
}
