//! Biometric gate abstraction: capability check and device-owner challenge.
//!
//! ```text
//! BiometricGate (trait)
//! ├── MacOsBiometricGate  (host crate, LAContext + SecAccessControl)
//! └── NullBiometricGate   (always Unsupported, fallback)
//! ```
//!
//! A lockout after repeated failures is reported as [`Capability::LockedOut`]
//! and still permits the challenge: the challenge evaluates an
//! [`AccessPolicy`] requiring user presence, which the system prompt can
//! satisfy with the device password. Only a genuinely unsupported device
//! blocks the flow.

use std::fmt;

use thiserror::Error;

/// `LAError.biometryLockout`.
pub const LA_ERROR_BIOMETRY_LOCKOUT: i64 = -8;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the biometric gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// No usable device-owner authentication on this device.
    #[error("device-owner authentication not available")]
    NotAvailable,
    /// The access-control policy could not be created.
    #[error("access control policy unavailable: {0}")]
    PolicyUnavailable(String),
    /// User dismissed the prompt.
    #[error("authentication cancelled")]
    UserCancelled,
    /// Authentication ran and failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Platform-specific error.
    #[error("platform error: {0}")]
    PlatformError(String),
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Result of the pre-challenge capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Authentication can be evaluated.
    Available,
    /// Biometry is locked out after failed attempts; the challenge may still run.
    LockedOut,
    /// Authentication cannot be used.
    Unsupported {
        /// Platform reason, for diagnostics.
        reason: String,
    },
}

impl Capability {
    /// Map an `LAContext.canEvaluatePolicy` error code.
    #[must_use]
    pub fn from_error_code(code: i64, reason: impl Into<String>) -> Self {
        if code == LA_ERROR_BIOMETRY_LOCKOUT {
            Self::LockedOut
        } else {
            Self::Unsupported {
                reason: reason.into(),
            }
        }
    }

    /// Whether authentication is currently usable without a lockout.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the flow may go on to the interactive challenge.
    #[must_use]
    pub const fn permits_challenge(&self) -> bool {
        matches!(self, Self::Available | Self::LockedOut)
    }

    /// Diagnostic reason when not available.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available => None,
            Self::LockedOut => Some("biometry locked out"),
            Self::Unsupported { reason } => Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Access policy
// ---------------------------------------------------------------------------

/// When the protected item may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Only while the device is unlocked, never migrated to another device.
    WhenUnlockedThisDeviceOnly,
}

/// Access-control policy the challenge is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Accessibility class.
    pub protection: Protection,
    /// Require the private-key-usage constraint.
    pub private_key_usage: bool,
    /// Require device-owner presence (biometry or device password).
    pub user_presence: bool,
}

impl AccessPolicy {
    /// Policy requiring device-owner presence for a key-signing operation.
    #[must_use]
    pub const fn device_owner_presence() -> Self {
        Self {
            protection: Protection::WhenUnlockedThisDeviceOnly,
            private_key_usage: true,
            user_presence: true,
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} private_key_usage={} user_presence={}",
            self.protection, self.private_key_usage, self.user_presence
        )
    }
}

// ---------------------------------------------------------------------------
// Gate trait
// ---------------------------------------------------------------------------

/// Platform device-owner authentication.
///
/// [`BiometricGate::challenge`] blocks until the user answers the system
/// prompt; the bridge runs it on the blocking pool.
pub trait BiometricGate: Send + Sync {
    /// Human-readable provider name (e.g., "Touch ID").
    fn provider_name(&self) -> &'static str;

    /// Check whether device-owner authentication can be evaluated.
    fn can_authenticate(&self) -> Capability;

    /// Build the access-control policy for the challenge.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PolicyUnavailable`] if the platform cannot
    /// construct the policy; the flow then reports "not supported" without
    /// prompting.
    fn access_policy(&self) -> Result<AccessPolicy, GateError>;

    /// Prompt the user and wait for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the user cancels or authentication fails.
    fn challenge(&self, policy: &AccessPolicy, reason: &str) -> Result<(), GateError>;
}

// ---------------------------------------------------------------------------
// Null gate (fallback)
// ---------------------------------------------------------------------------

/// Fallback gate when no device-owner authentication exists.
pub struct NullBiometricGate;

impl BiometricGate for NullBiometricGate {
    fn provider_name(&self) -> &'static str {
        "None"
    }

    fn can_authenticate(&self) -> Capability {
        Capability::Unsupported {
            reason: "no biometric provider on this platform".into(),
        }
    }

    fn access_policy(&self) -> Result<AccessPolicy, GateError> {
        Err(GateError::NotAvailable)
    }

    fn challenge(&self, _policy: &AccessPolicy, _reason: &str) -> Result<(), GateError> {
        Err(GateError::NotAvailable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
