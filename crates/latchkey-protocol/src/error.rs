//! Protocol error types for `latchkey-protocol`.

use thiserror::Error;

/// Errors produced while decoding inbound messages and payloads.
///
/// None of these ever reach the extension: the dispatcher treats every
/// variant as "malformed input" and drops the request or the side effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The inbound message is not a JSON object.
    #[error("message is not an object")]
    NotAnObject,

    /// The `command` field is absent or not a string.
    #[error("message has no string `command` field")]
    MissingCommand,

    /// A field the command requires is absent or not a string.
    #[error("command `{command}` is missing string field `{field}`")]
    MissingField {
        /// Wire name of the command.
        command: &'static str,
        /// Wire name of the missing field.
        field: &'static str,
    },

    /// The `downloadFile` payload is not valid JSON for the expected shape.
    #[error("invalid download payload: {0}")]
    InvalidDownload(String),

    /// The download declared no blob data.
    #[error("download payload carries no blob data")]
    EmptyBlob,

    /// The download blob is not valid padded Base64.
    #[error("download blob is not valid base64: {0}")]
    InvalidBase64(String),
}
