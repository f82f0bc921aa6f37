//! Reply handed back to the host for one request.

use serde_json::{json, Value};

/// Well-known key under which the host delivers a reply to the extension.
pub const MESSAGE_KEY: &str = "message";

/// The single reply for one request.
///
/// An empty reply still completes the request; the extension just receives
/// no payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    message: Option<Value>,
}

impl Reply {
    /// Reply that completes the request without a payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self { message: None }
    }

    /// Reply carrying `message` under [`MESSAGE_KEY`].
    #[must_use]
    pub const fn with_message(message: Value) -> Self {
        Self {
            message: Some(message),
        }
    }

    /// Whether the reply carries no payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.message.is_none()
    }

    /// The payload, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&Value> {
        self.message.as_ref()
    }

    /// Host-facing user info object: `{"message": <payload>}`, or `None`
    /// for an empty reply.
    #[must_use]
    pub fn into_user_info(self) -> Option<Value> {
        self.message.map(|message| json!({ MESSAGE_KEY: message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_has_no_user_info() {
        let reply = Reply::empty();
        assert!(reply.is_empty());
        assert_eq!(reply.into_user_info(), None);
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(Reply::default(), Reply::empty());
    }

    #[test]
    fn payload_is_wrapped_under_message_key() {
        let reply = Reply::with_message(json!("clip"));
        assert!(!reply.is_empty());
        assert_eq!(reply.message(), Some(&json!("clip")));
        assert_eq!(reply.into_user_info(), Some(json!({"message": "clip"})));
    }

    #[test]
    fn null_payload_is_not_empty() {
        let reply = Reply::with_message(Value::Null);
        assert!(!reply.is_empty());
        assert_eq!(reply.into_user_info(), Some(json!({"message": null})));
    }
}
