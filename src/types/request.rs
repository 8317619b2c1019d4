//! Request descriptors and cache key derivation.

use std::collections::BTreeMap;

use reqwest::Method;

/// Immutable description of one logical API call.
///
/// Holds the endpoint path, the HTTP method and the query parameters in
/// insertion order (the order they go on the wire). Parameter names are
/// unique: setting a name twice replaces the earlier value in place.
///
/// ```rust
/// # use nominatim_cli::RequestDescriptor;
/// let a = RequestDescriptor::get("/reverse")
///     .param("lat", "48.85")
///     .param("lon", "2.29");
/// let b = RequestDescriptor::get("/reverse")
///     .param("lon", "2.29")
///     .param("lat", "48.85");
/// assert_eq!(a.cache_key(), b.cache_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Create a descriptor for an arbitrary method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Create a `GET` descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Set a query parameter, replacing any existing value for `name`.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Set a query parameter only when `value` is present.
    pub fn param_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up a single parameter value.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Deterministic cache key over method, path and name-sorted parameters.
    ///
    /// The key is a canonical JSON rendering, so separators inside values
    /// cannot make two different requests collide.
    pub fn cache_key(&self) -> String {
        let sorted: BTreeMap<&str, &str> = self
            .params
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        serde_json::json!([self.method.as_str(), self.path, sorted]).to_string()
    }
}
