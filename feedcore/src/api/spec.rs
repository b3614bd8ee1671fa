use crate::request::ApiRequest;
use anyhow::Result;

/// A reusable endpoint specification that pairs a request builder with a
/// response parser.
pub trait EndpointSpec {
    /// The output type produced by parsing the response body.
    type Response;

    /// Build the request for this spec.
    fn build_request(&self) -> Result<ApiRequest>;

    /// Parse a successful (2xx) response body into the typed response.
    fn parse_response(&self, body: &[u8]) -> Result<Self::Response>;
}

/// Parses a JSON object body and pulls out a single field.
pub(crate) fn json_field<T: serde::de::DeserializeOwned>(body: &[u8], field: &str) -> Result<T> {
    let mut value: serde_json::Value = serde_json::from_slice(body)?;
    let field_value = value
        .get_mut(field)
        .map(serde_json::Value::take)
        .ok_or_else(|| anyhow::anyhow!("missing field {field}"))?;
    Ok(serde_json::from_value(field_value)?)
}
