//! Request abstraction
//!
//! The binder reads five locations off a request: path-captured arguments,
//! query parameters, headers, the parsed body and the current user.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use hintbind_validation::Value;

use crate::principal::Principal;

/// Inbound request as seen by the binder
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    path: String,
    path_params: HashMap<String, String>,
    /// Query pairs in arrival order; repeated keys are kept
    query: Vec<(String, String)>,
    /// Lowercased header names, last value wins
    headers: Vec<(String, String)>,
    body: Option<Value>,
    user: Option<Arc<dyn Principal>>,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Shorthand for a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Add a router-captured path argument
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Parse and append a raw query string (`a=1&b=two%20words`)
    pub fn with_query_string(mut self, query_string: &str) -> Self {
        let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
        for pair in query_string.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.query.push((decode_query_component(key), decode_query_component(value)));
        }
        self
    }

    /// Set a header (name is case-insensitive)
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let name = name.as_ref().to_lowercase();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Set the parsed body payload
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the body from JSON
    pub fn with_json(self, body: serde_json::Value) -> Self {
        self.with_body(Value::from(body))
    }

    /// Attach the current user
    pub fn with_user(mut self, user: impl Principal + 'static) -> Self {
        self.user = Some(Arc::new(user));
        self
    }

    /// Attach a shared current user
    pub fn with_shared_user(mut self, user: Arc<dyn Principal>) -> Self {
        self.user = Some(user);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Router-captured path arguments
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Query value for `name`; the last occurrence wins
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All query values for `name`, in order
    pub fn query_params_all(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Query parameters as an object (last occurrence per key)
    pub fn query_dict(&self) -> Value {
        let mut pairs: Vec<(String, Value)> = Vec::new();
        for (key, value) in &self.query {
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = Value::str(value),
                None => pairs.push((key.clone(), Value::str(value))),
            }
        }
        Value::Object(pairs)
    }

    /// Header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Headers as an object with lowercased keys
    pub fn header_dict(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::str(v)))
                .collect(),
        )
    }

    /// Parsed body, if any
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Current user, if any
    pub fn user(&self) -> Option<&dyn Principal> {
        self.user.as_deref()
    }
}

/// Decode one query component: `+` is a space, then percent-decoding
///
/// Invalid UTF-8 escapes are kept verbatim.
fn decode_query_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::User;

    #[test]
    fn test_query_string_parsing() {
        let req = Request::get("/search").with_query_string("?q=two+words&tag=a%2Cb&flag&q=last");
        assert_eq!(req.query_param("q"), Some("last"));
        assert_eq!(req.query_params_all("q"), vec!["two words", "last"]);
        assert_eq!(req.query_param("tag"), Some("a,b"));
        assert_eq!(req.query_param("flag"), Some(""));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_query_dict_keeps_last_value() {
        let req = Request::get("/").with_query_param("a", "1").with_query_param("a", "2");
        assert_eq!(req.query_dict(), Value::object([("a", Value::str("2"))]));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let req = Request::get("/")
            .with_header("X-Request-Id", "abc")
            .with_header("x-request-id", "def");
        assert_eq!(req.header("X-REQUEST-ID"), Some("def"));
        assert_eq!(req.header_dict(), Value::object([("x-request-id", Value::str("def"))]));
    }

    #[test]
    fn test_body_and_user() {
        let req = Request::post("/books")
            .with_json(serde_json::json!({"title": "Dune"}))
            .with_user(User::new([("username", Value::str("alice"))]));
        assert_eq!(req.body().unwrap().get("title"), Some(&Value::str("Dune")));
        assert!(req.user().unwrap().is_authenticated());
        assert_eq!(req.method(), &Method::POST);
    }
}
