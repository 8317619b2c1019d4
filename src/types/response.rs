//! Response payloads returned by the transport and the cache.

use serde::de::DeserializeOwned;

use crate::Result;

/// A successful response from the geocoding service.
///
/// The body is kept as text: the service already renders the requested
/// output format, so the client passes it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Response {
    /// A `200 OK` response with the given body and content type.
    pub fn ok(body: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(str::to_owned),
            body: body.into(),
        }
    }

    /// Whether the payload is JSON (plain JSON or a GeoJSON flavour).
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("json"))
            .unwrap_or(false)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Re-indent a JSON body for terminal display; other bodies are returned as-is.
    pub fn pretty_body(&self) -> Result<String> {
        if !self.is_json() {
            return Ok(self.body.clone());
        }
        let value: serde_json::Value = self.json()?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
