use serde_json::Value;
use thiserror::Error;

use super::Response;

/// A classified failure of a single call. Every variant reaches the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestFailure {
    #[error("No response from server: {0}")]
    Network(String),

    #[error("Request could not be sent: {0}")]
    RequestConstruction(String),

    #[error("Server responded with status {status}")]
    Server { status: u16, body: Value },
}

/// Result of sending a call through the pipeline.
pub type Outcome = Result<Response, RequestFailure>;

impl RequestFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestFailure::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestFailure),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Session(anyhow::Error),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn invalid_response(error: serde_json::Error, body: &Value) -> Self {
        let body = Self::truncate_body(&body.to_string());
        ApiError::InvalidResponse(format!("{}: {}", error, body))
    }

    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            ApiError::Request(failure) => Some(failure),
            ApiError::InvalidResponse(_) | ApiError::Session(_) => None,
        }
    }
}
