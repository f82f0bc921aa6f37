//! Inbound command decoding.
//!
//! A command message is a JSON object with a string `command` field plus
//! command-specific fields. It is decoded exactly once, at the boundary,
//! into [`Command`]. Names the bridge does not know become
//! [`Command::Unknown`] so "ignore unknown commands" is an explicit match
//! arm rather than a fallthrough.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Key holding the command name.
pub const COMMAND_KEY: &str = "command";

/// Key holding the string payload of `copyToClipboard` / `downloadFile`.
pub const DATA_KEY: &str = "data";

/// Key holding the user identifier of `biometricUnlock`.
pub const USER_ID_KEY: &str = "userId";

const READ_FROM_CLIPBOARD: &str = "readFromClipboard";
const COPY_TO_CLIPBOARD: &str = "copyToClipboard";
const SHOW_POPOVER: &str = "showPopover";
const DOWNLOAD_FILE: &str = "downloadFile";
const SLEEP: &str = "sleep";
const BIOMETRIC_UNLOCK: &str = "biometricUnlock";

/// Closed set of commands understood by the bridge.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// Return the current plain-text clipboard contents.
    ReadFromClipboard,
    /// Replace the clipboard with `data`. `None` when the field is absent
    /// or not a string: the request still completes, nothing is written.
    CopyToClipboard {
        /// Text to place on the clipboard.
        data: Option<String>,
    },
    /// Show the extension popover.
    ShowPopover,
    /// Save a file chosen through a save dialog. `data` is itself a JSON
    /// document, see [`crate::download::DownloadFileMessage`].
    DownloadFile {
        /// JSON-encoded download description.
        data: Option<String>,
    },
    /// Complete with an empty reply after a fixed delay.
    Sleep,
    /// Authenticate the device owner, then look up the user's key.
    BiometricUnlock {
        /// Account owner whose key is looked up.
        user_id: String,
    },
    /// Any command name outside the closed set.
    Unknown(String),
}

impl Command {
    /// Decode an inbound message.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::NotAnObject`] if `message` is not a JSON object.
    /// - [`ProtocolError::MissingCommand`] if `command` is absent or not a string.
    /// - [`ProtocolError::MissingField`] if `biometricUnlock` has no string `userId`.
    pub fn decode(message: &Value) -> Result<Self, ProtocolError> {
        let fields = message.as_object().ok_or(ProtocolError::NotAnObject)?;
        let name = string_field(fields, COMMAND_KEY).ok_or(ProtocolError::MissingCommand)?;

        let command = match name.as_str() {
            READ_FROM_CLIPBOARD => Self::ReadFromClipboard,
            COPY_TO_CLIPBOARD => Self::CopyToClipboard {
                data: string_field(fields, DATA_KEY),
            },
            SHOW_POPOVER => Self::ShowPopover,
            DOWNLOAD_FILE => Self::DownloadFile {
                data: string_field(fields, DATA_KEY),
            },
            SLEEP => Self::Sleep,
            BIOMETRIC_UNLOCK => Self::BiometricUnlock {
                user_id: string_field(fields, USER_ID_KEY).ok_or(
                    ProtocolError::MissingField {
                        command: BIOMETRIC_UNLOCK,
                        field: USER_ID_KEY,
                    },
                )?,
            },
            _ => Self::Unknown(name),
        };

        Ok(command)
    }

    /// Wire name of the command.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ReadFromClipboard => READ_FROM_CLIPBOARD,
            Self::CopyToClipboard { .. } => COPY_TO_CLIPBOARD,
            Self::ShowPopover => SHOW_POPOVER,
            Self::DownloadFile { .. } => DOWNLOAD_FILE,
            Self::Sleep => SLEEP,
            Self::BiometricUnlock { .. } => BIOMETRIC_UNLOCK,
            Self::Unknown(name) => name,
        }
    }

    /// Whether the handler, not the dispatcher, completes the request.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Sleep | Self::BiometricUnlock { .. })
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

// Clipboard text and download blobs may hold credentials.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CopyToClipboard { data } | Self::DownloadFile { data } => f
                .debug_struct(self.name())
                .field("data", &data.as_ref().map(|_| "***"))
                .finish(),
            Self::BiometricUnlock { user_id } => f
                .debug_struct(BIOMETRIC_UNLOCK)
                .field("user_id", user_id)
                .finish(),
            Self::Unknown(name) => f.debug_tuple("Unknown").field(name).finish(),
            _ => f.write_str(self.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
