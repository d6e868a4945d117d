//! Mapping from a failed call to the user-visible reaction.

use serde_json::Value;

use super::RequestFailure;
use crate::notify::Notice;

pub const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";
pub const ACCESS_DENIED: &str = "Access denied";
pub const NOT_FOUND: &str = "Resource not found";
pub const VALIDATION_FAILED: &str = "Validation failed";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const OPERATION_FAILED: &str = "An error occurred. Please try again.";
pub const NO_RESPONSE: &str = "No response from server. Please check your connection.";
pub const REQUEST_FAILED: &str = "Request failed. Please try again.";

/// What the pipeline does about a failure before returning it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Show these notices, in order
    Notify(Vec<Notice>),
    /// The credential was rejected: end the session
    ExpireSession,
}

pub fn classify(failure: &RequestFailure) -> Reaction {
    match failure {
        RequestFailure::Server { status: 401, .. } => Reaction::ExpireSession,
        RequestFailure::Server { status, body } => Reaction::Notify(server_notices(*status, body)),
        RequestFailure::Network(_) => Reaction::Notify(vec![Notice::error(NO_RESPONSE)]),
        RequestFailure::RequestConstruction(_) => {
            Reaction::Notify(vec![Notice::error(REQUEST_FAILED)])
        }
    }
}

fn server_notices(status: u16, body: &Value) -> Vec<Notice> {
    match status {
        403 => vec![Notice::error(ACCESS_DENIED)],
        404 => vec![Notice::error(NOT_FOUND)],
        422 => {
            let messages = validation_messages(body);
            if messages.is_empty() {
                vec![Notice::error(VALIDATION_FAILED)]
            } else {
                messages.into_iter().map(Notice::error).collect()
            }
        }
        500 => vec![Notice::error(INTERNAL_SERVER_ERROR)],
        _ => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(OPERATION_FAILED);
            vec![Notice::error(message)]
        }
    }
}

/// Flatten `errors` into messages: fields in the order the server sent
/// them, each field's messages in array order.
fn validation_messages(body: &Value) -> Vec<String> {
    let mut messages = Vec::new();
    match body.get("errors") {
        Some(Value::Object(fields)) => {
            for value in fields.values() {
                collect_messages(value, &mut messages);
            }
        }
        Some(other) => collect_messages(other, &mut messages),
        None => {}
    }
    messages
}

fn collect_messages(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(message) => out.push(message.clone()),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(message) => out.push(message.clone()),
                    Value::Null => {}
                    other => out.push(other.to_string()),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use serde_json::json;

    fn server(status: u16, body: Value) -> RequestFailure {
        RequestFailure::Server { status, body }
    }

    fn messages(reaction: Reaction) -> Vec<String> {
        match reaction {
            Reaction::Notify(notices) => notices.into_iter().map(|n| n.message).collect(),
            Reaction::ExpireSession => panic!("unexpected session expiry"),
        }
    }

    #[test]
    fn test_401_expires_session() {
        assert_eq!(classify(&server(401, Value::Null)), Reaction::ExpireSession);
        assert_eq!(
            classify(&server(401, json!({"message": "Token expired"}))),
            Reaction::ExpireSession
        );
    }

    #[test]
    fn test_fixed_status_messages() {
        assert_eq!(messages(classify(&server(403, Value::Null))), vec![ACCESS_DENIED]);
        assert_eq!(messages(classify(&server(404, Value::Null))), vec![NOT_FOUND]);
        assert_eq!(
            messages(classify(&server(500, json!({"message": "boom"})))),
            vec![INTERNAL_SERVER_ERROR]
        );
    }

    #[test]
    fn test_422_fan_out_keeps_server_order() {
        // "phone" before "email" so that alphabetical order would be wrong
        let body: Value = serde_json::from_str(
            r#"{"errors": {"phone": ["invalid", "too short"], "email": ["required"]}}"#,
        )
        .unwrap();
        assert_eq!(
            messages(classify(&server(422, body))),
            vec!["invalid", "too short", "required"]
        );

        let body = json!({"errors": {"email": ["required"], "phone": ["invalid", "too short"]}});
        let reaction = classify(&server(422, body));
        match &reaction {
            Reaction::Notify(notices) => {
                assert!(notices.iter().all(|n| n.severity == Severity::Error));
            }
            Reaction::ExpireSession => panic!("unexpected session expiry"),
        }
        assert_eq!(messages(reaction), vec!["required", "invalid", "too short"]);
    }

    #[test]
    fn test_422_without_errors() {
        assert_eq!(messages(classify(&server(422, json!({})))), vec![VALIDATION_FAILED]);
        assert_eq!(messages(classify(&server(422, Value::Null))), vec![VALIDATION_FAILED]);
        assert_eq!(
            messages(classify(&server(422, json!({"errors": {}})))),
            vec![VALIDATION_FAILED]
        );
    }

    #[test]
    fn test_422_single_string_field() {
        let body = json!({"errors": {"name": "required"}});
        assert_eq!(messages(classify(&server(422, body))), vec!["required"]);
    }

    #[test]
    fn test_other_status_uses_server_message() {
        let body = json!({"message": "Quota exceeded"});
        assert_eq!(messages(classify(&server(429, body))), vec!["Quota exceeded"]);
        assert_eq!(messages(classify(&server(400, json!({"error": "x"})))), vec![OPERATION_FAILED]);
        assert_eq!(
            messages(classify(&server(502, Value::String("Bad Gateway".into())))),
            vec![OPERATION_FAILED]
        );
    }

    #[test]
    fn test_transport_failures() {
        let reaction = classify(&RequestFailure::Network("connection refused".into()));
        assert_eq!(reaction, Reaction::Notify(vec![Notice::error(NO_RESPONSE)]));

        let reaction = classify(&RequestFailure::RequestConstruction("bad header".into()));
        assert_eq!(reaction, Reaction::Notify(vec![Notice::error(REQUEST_FAILED)]));
    }
}
