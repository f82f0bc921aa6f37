//! `latchkey-protocol`: wire types for the Latchkey extension bridge.
//!
//! This crate owns everything that crosses the boundary with the browser
//! extension: decoding inbound command messages into a closed [`Command`]
//! enum, the [`Reply`] handed back to the host, the biometric unlock
//! envelope, and the `downloadFile` payload format.
//!
//! Zero async, zero Tauri, zero platform code.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod command;
pub mod download;
pub mod envelope;
pub mod error;
pub mod reply;

pub use command::{Command, COMMAND_KEY, DATA_KEY, USER_ID_KEY};
pub use download::{BlobOptions, DownloadFileMessage, TEXT_PLAIN};
pub use envelope::{now_millis, UnlockMessage, UnlockResponse, UNLOCK_COMMAND};
pub use error::ProtocolError;
pub use reply::{Reply, MESSAGE_KEY};
