use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::{OutboundCall, RequestFailure, Response};

/// Performs a call and reports the response, whatever its status.
///
/// Only failures to obtain a response are errors here; turning a non-2xx
/// status into a failure is the pipeline's job.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        call: OutboundCall,
    ) -> impl Future<Output = Result<Response, RequestFailure>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(
        &self,
        call: OutboundCall,
    ) -> impl Future<Output = Result<Response, RequestFailure>> + Send {
        (**self).execute(call)
    }
}

/// HTTP transport over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport for the given API base URL.
    /// `timeout` is the fallback deadline; each call carries its own.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base path ends with `/` so joins append rather than replace.
    fn normalize_base(base_url: &str) -> Result<Url> {
        let mut url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn url_for(&self, path: &str) -> Result<Url, RequestFailure> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RequestFailure::RequestConstruction(format!("Invalid path {}: {}", path, e)))
    }

    fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, RequestFailure> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RequestFailure::RequestConstruction(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                RequestFailure::RequestConstruction(format!("Invalid value for header {}: {}", name, e))
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn classify_send_error(error: reqwest::Error) -> RequestFailure {
        if error.is_builder() {
            RequestFailure::RequestConstruction(error.to_string())
        } else {
            RequestFailure::Network(error.to_string())
        }
    }
}

/// Decode a body as JSON, keeping non-JSON text as a string
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

impl Transport for ReqwestTransport {
    async fn execute(&self, call: OutboundCall) -> Result<Response, RequestFailure> {
        let url = self.url_for(&call.path)?;
        let headers = Self::header_map(&call.headers)?;

        let mut request = self
            .client
            .request(call.method.clone(), url.clone())
            .headers(headers)
            .timeout(call.timeout);
        if let Some(ref body) = call.body {
            request = request.json(body);
        }

        debug!(method = %call.method, url = %url, "Sending request");
        let response = request.send().await.map_err(Self::classify_send_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // A connection dropped mid-body still means no usable response
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestFailure::Network(e.to_string()))?;

        debug!(status, url = %url, "Response received");
        Ok(Response {
            status,
            headers,
            body: parse_body(&bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_base_appends_slash() {
        let transport = ReqwestTransport::new("http://localhost:8000", Duration::from_secs(1))
            .expect("Failed to build transport");
        assert_eq!(transport.base_url().as_str(), "http://localhost:8000/");

        let transport = ReqwestTransport::new("http://example.com/v1", Duration::from_secs(1))
            .expect("Failed to build transport");
        assert_eq!(
            transport.url_for("/api/customers/").unwrap().as_str(),
            "http://example.com/v1/api/customers/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ReqwestTransport::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_invalid_header_is_construction_failure() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer bad\nvalue".to_string());
        assert!(matches!(
            ReqwestTransport::header_map(&headers),
            Err(RequestFailure::RequestConstruction(_))
        ));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_body(b"<html>oops</html>"), Value::String("<html>oops</html>".into()));
    }
}
