use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// Per-call deadline used unless the client is configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// A logical request before it reaches the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/api/customers/`
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl OutboundCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as returned by the transport, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON; `Value::String` for non-JSON bodies, `Value::Null` when empty
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// 2xx and 3xx responses pass through the pipeline untouched.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_builders() {
        let call = OutboundCall::post("/api/customers/", json!({"first_name": "Ada"}))
            .with_header("X-Trace", "1");
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "/api/customers/");
        assert_eq!(call.body, Some(json!({"first_name": "Ada"})));
        assert_eq!(call.timeout, DEFAULT_TIMEOUT);
        assert_eq!(call.header("x-trace"), Some("1"));
        assert_eq!(call.header("Authorization"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(Response::new(200, Value::Null).is_success());
        assert!(Response::new(204, Value::Null).is_success());
        assert!(Response::new(302, Value::Null).is_success());
        assert!(!Response::new(401, Value::Null).is_success());
        assert!(!Response::new(500, Value::Null).is_success());
        assert!(!Response::new(101, Value::Null).is_success());
    }
}
