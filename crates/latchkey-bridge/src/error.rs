//! Bridge error types for `latchkey-bridge`.

use latchkey_protocol::ProtocolError;
use thiserror::Error;

/// Errors produced inside bridge handlers and configuration.
///
/// Handlers never surface these to the extension; the dispatcher logs them
/// and completes the request per the command's reply policy.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed payload (delegated from the protocol crate).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The account fallback chain has no entries.
    #[error("account fallback chain must not be empty")]
    EmptyFallbackChain,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}
