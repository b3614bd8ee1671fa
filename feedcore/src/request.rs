use crate::net::{HttpRequest, Method};
use anyhow::Result;
use serde::Serialize;

/// A REST call relative to the API base url.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path plus encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }

    /// Builds the transport request, attaching the bearer token.
    pub fn into_http(self, base_url: &str, token: &str) -> Result<HttpRequest> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query());
        let mut request = HttpRequest::new(self.method, url)
            .with_header("Authorization", format!("Bearer {token}"))
            .with_header("Accept", "application/json");
        if let Some(body) = self.body {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(serde_json::to_vec(&body)?);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_is_encoded() {
        let req = ApiRequest::get("/search")
            .with_query("keyword", "ada lovelace")
            .with_query("pageNo", 0);
        assert_eq!(req.path_and_query(), "/search?keyword=ada%20lovelace&pageNo=0");
    }

    #[test]
    fn test_into_http_sets_auth_and_body() {
        let req = ApiRequest::post("/chat/group/create/3")
            .with_json(&json!({ "friendId": [4, 5], "text": "hi" }))
            .unwrap()
            .into_http("http://localhost:8080/api/", "tok")
            .unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/chat/group/create/3");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["friendId"], json!([4, 5]));
    }
}
