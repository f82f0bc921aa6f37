//! IPC command handlers.
//!
//! The extension's messages arrive through a single command; everything
//! after decoding lives in `latchkey-bridge`.

pub mod native;
