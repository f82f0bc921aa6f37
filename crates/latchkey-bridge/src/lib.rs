//! `latchkey-bridge`: command dispatch and biometric-gated key lookup.
//!
//! Receives decoded extension messages, routes them to handlers, and for
//! `biometricUnlock` runs the device-owner challenge before probing the
//! credential store through an ordered chain of legacy account names.
//!
//! Everything platform-specific (clipboard, popover, save dialog, keychain,
//! biometric hardware) is injected through the traits in [`host`],
//! [`keychain`] and [`biometric`], so the whole flow runs against fakes in
//! tests.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod biometric;
pub mod completion;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fallback;
pub mod host;
pub mod keychain;
pub mod unlock;

pub use biometric::{
    AccessPolicy, BiometricGate, Capability, GateError, NullBiometricGate, Protection,
};
pub use completion::{channel, PendingReply, PendingState, Responder};
pub use config::{BridgeConfig, ChallengeFailurePolicy};
pub use dispatcher::{Dispatched, Dispatcher, HostServices};
pub use error::BridgeError;
pub use fallback::{AccountTemplate, FallbackChain};
pub use host::{Clipboard, FileSink, HostError, LocalFileSink, Popover, SaveDialog};
pub use keychain::{
    CredentialStore, MemoryCredentialStore, NullCredentialStore, SecretRecord, StoreError,
};
pub use unlock::{UnlockFlow, UnlockOutcome};
