//! Reply envelope for the `biometricUnlock` command.
//!
//! ```text
//! {"message": {"message": {"command": "biometricUnlock",
//!                          "response": "unlocked",
//!                          "timestamp": 1700000000000,
//!                          "userKeyB64": "..."}}}
//! ```
//!
//! The outer key is added by [`Reply::into_user_info`]; this module builds
//! the inner `{"message": {...}}` object.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroize;

use crate::reply::{Reply, MESSAGE_KEY};

/// Command name echoed in every unlock envelope.
pub const UNLOCK_COMMAND: &str = "biometricUnlock";

const STATUS_UNLOCKED: &str = "unlocked";
const STATUS_NOT_SUPPORTED: &str = "not supported";
const STATUS_NOT_ENABLED: &str = "not enabled";

/// Outcome reported to the extension for a biometric unlock.
///
/// Only [`UnlockResponse::Unlocked`] can carry key material, so a
/// "not enabled" or "not supported" envelope with a key is unrepresentable.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub enum UnlockResponse {
    /// The challenge passed and a key was found.
    Unlocked {
        /// Key material as stored; quotes are stripped when the envelope is built.
        user_key: String,
    },
    /// Device-owner authentication cannot be used on this device.
    NotSupported,
    /// No key was found under any candidate account.
    NotEnabled,
}

impl UnlockResponse {
    /// Wire status string.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Unlocked { .. } => STATUS_UNLOCKED,
            Self::NotSupported => STATUS_NOT_SUPPORTED,
            Self::NotEnabled => STATUS_NOT_ENABLED,
        }
    }

    /// Build the reply stamped with the current time.
    #[must_use]
    pub fn build(self) -> Reply {
        self.build_at(now_millis())
    }

    /// Build the reply with an explicit timestamp.
    #[must_use]
    pub fn build_at(self, timestamp: i64) -> Reply {
        let mut message = self.into_message(timestamp);
        let reply = Reply::with_message(json!({ MESSAGE_KEY: &message }));
        message.zeroize();
        reply
    }

    fn into_message(mut self, timestamp: i64) -> UnlockMessage {
        let user_key_b64 = match &self {
            Self::Unlocked { user_key } => Some(strip_quotes(user_key)),
            Self::NotSupported | Self::NotEnabled => None,
        };
        let message = UnlockMessage {
            command: UNLOCK_COMMAND.to_owned(),
            response: self.status().to_owned(),
            timestamp,
            user_key_b64,
        };
        self.zeroize();
        message
    }
}

impl std::fmt::Debug for UnlockResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlocked { .. } => f.write_str("Unlocked(***)"),
            Self::NotSupported => f.write_str("NotSupported"),
            Self::NotEnabled => f.write_str("NotEnabled"),
        }
    }
}

/// Inner unlock message as serialized on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct UnlockMessage {
    /// Always [`UNLOCK_COMMAND`].
    pub command: String,
    /// Status string.
    pub response: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Recovered key with `"` removed; only present when unlocked.
    #[serde(rename = "userKeyB64", default, skip_serializing_if = "Option::is_none")]
    pub user_key_b64: Option<String>,
}

/// Remove every `"` from key material before embedding it.
fn strip_quotes(raw: &str) -> String {
    raw.chars().filter(|c| *c != '"').collect()
}

/// Current time in milliseconds since the Unix epoch.
///
/// Saturates instead of failing: a clock before 1970 yields `0`.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn inner(reply: &Reply) -> &Value {
        &reply.message().unwrap()["message"]
    }

    #[test]
    fn unlocked_strips_quotes() {
        let reply = UnlockResponse::Unlocked {
            user_key: "ab\"cd\"".into(),
        }
        .build();
        let message = inner(&reply);
        assert_eq!(message["userKeyB64"], "abcd");
        assert_eq!(message["response"], "unlocked");
        assert_eq!(message["command"], "biometricUnlock");
    }

    #[test]
    fn not_enabled_has_no_key_field() {
        let reply = UnlockResponse::NotEnabled.build();
        let message = inner(&reply);
        assert_eq!(message["response"], "not enabled");
        assert!(message.get("userKeyB64").is_none());
    }

    #[test]
    fn not_supported_has_no_key_field() {
        let reply = UnlockResponse::NotSupported.build();
        let message = inner(&reply);
        assert_eq!(message["response"], "not supported");
        assert!(message.get("userKeyB64").is_none());
    }

    #[test]
    fn timestamp_is_current_millis() {
        let before = now_millis();
        let reply = UnlockResponse::NotEnabled.build();
        let after = now_millis();
        let stamp = inner(&reply)["timestamp"].as_i64().unwrap();
        assert!(stamp >= before && stamp <= after);
    }

    #[test]
    fn build_at_uses_given_timestamp() {
        let reply = UnlockResponse::NotSupported.build_at(1_700_000_000_000);
        assert_eq!(inner(&reply)["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn envelope_shape_snapshot() {
        let reply = UnlockResponse::Unlocked {
            user_key: "\"c2VjcmV0\"".into(),
        }
        .build_at(1_700_000_000_000);
        insta::assert_json_snapshot!(reply.into_user_info().unwrap(), @r###"
        {
          "message": {
            "message": {
              "command": "biometricUnlock",
              "response": "unlocked",
              "timestamp": 1700000000000,
              "userKeyB64": "c2VjcmV0"
            }
          }
        }
        "###);
    }

    #[test]
    fn message_deserializes_without_key() {
        let message: UnlockMessage = serde_json::from_value(serde_json::json!({
            "command": "biometricUnlock",
            "response": "not enabled",
            "timestamp": 5
        }))
        .unwrap();
        assert_eq!(message.user_key_b64, None);
    }

    #[test]
    fn debug_masks_key() {
        let response = UnlockResponse::Unlocked {
            user_key: "topsecret".into(),
        };
        assert_eq!(format!("{response:?}"), "Unlocked(***)");
    }
}
