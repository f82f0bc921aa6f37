//! Platform device-owner authentication for `biometricUnlock`.
//!
//! ```text
//! BiometricGate (trait, latchkey-bridge)
//! ├── MacOsBiometricGate  (LAContext + SecAccessControl)
//! └── NullBiometricGate   (Windows, Linux, others: always unsupported)
//! ```
//!
//! The capability check asks about biometrics (or a paired watch) so a
//! lockout is reported as such. The challenge itself evaluates the
//! access-control object built from the [`AccessPolicy`]; with user
//! presence required, the system prompt accepts the device password, so a
//! locked-out sensor does not block the unlock.

use std::os::raw::c_ulong;
use std::sync::Arc;

use latchkey_bridge::{AccessPolicy, BiometricGate, GateError};
#[cfg(not(target_os = "macos"))]
use latchkey_bridge::NullBiometricGate;

/// `LAPolicyDeviceOwnerAuthenticationWithBiometricsOrWatch`, used only for
/// the capability check.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
const CAPABILITY_CHECK_POLICY: i64 = 4;

/// `LAAccessControlOperationUseKeySign`, the operation the challenge
/// authorizes.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
const CHALLENGE_OPERATION_USE_KEY_SIGN: i64 = 3;

/// `kSecAccessControlUserPresence`.
const ACCESS_CONTROL_USER_PRESENCE: c_ulong = 1 << 0;

/// `kSecAccessControlPrivateKeyUsage`.
const ACCESS_CONTROL_PRIVATE_KEY_USAGE: c_ulong = 1 << 30;

/// `SecAccessControlCreateFlags` for `policy`.
#[must_use]
pub const fn access_control_flags(policy: &AccessPolicy) -> c_ulong {
    let mut flags = 0;
    if policy.user_presence {
        flags |= ACCESS_CONTROL_USER_PRESENCE;
    }
    if policy.private_key_usage {
        flags |= ACCESS_CONTROL_PRIVATE_KEY_USAGE;
    }
    flags
}

/// Map an `LAError` code from a failed evaluation.
#[must_use]
pub fn evaluation_error(code: i64) -> GateError {
    match code {
        // userCancel, systemCancel, appCancel
        -2 | -4 | -9 => GateError::UserCancelled,
        -1 => GateError::AuthenticationFailed("authentication failed".into()),
        latchkey_bridge::biometric::LA_ERROR_BIOMETRY_LOCKOUT => {
            GateError::AuthenticationFailed("biometry locked out".into())
        }
        -3 => GateError::AuthenticationFailed("user chose fallback".into()),
        _ => GateError::PlatformError(format!("LAError {code}")),
    }
}

// ---------------------------------------------------------------------------
// macOS gate
// ---------------------------------------------------------------------------

#[cfg(target_os = "macos")]
mod macos {
    use std::sync::mpsc;

    use block2::RcBlock;
    use core_foundation::base::TCFType;
    use latchkey_bridge::{AccessPolicy, BiometricGate, Capability, GateError, Protection};
    use objc2::encode::{Encoding, RefEncode};
    use objc2::msg_send;
    use objc2::rc::Retained;
    use objc2::runtime::{AnyClass, AnyObject, Bool};
    use objc2_foundation::NSString;
    use security_framework::access_control::{ProtectionMode, SecAccessControl};

    use super::{
        access_control_flags, evaluation_error, CAPABILITY_CHECK_POLICY,
        CHALLENGE_OPERATION_USE_KEY_SIGN,
    };

    /// Opaque `struct __SecAccessControl`, for passing the ref to LAContext.
    #[repr(C)]
    struct OpaqueAccessControl {
        _private: [u8; 0],
    }

    // SAFETY: matches the `SecAccessControlRef` encoding LAContext declares.
    unsafe impl RefEncode for OpaqueAccessControl {
        const ENCODING_REF: Encoding =
            Encoding::Pointer(&Encoding::Struct("__SecAccessControl", &[]));
    }

    /// Touch ID / Apple Watch / device password via `LocalAuthentication`.
    pub struct MacOsBiometricGate;

    fn new_context() -> Option<Retained<AnyObject>> {
        let cls = AnyClass::get(c"LAContext")?;
        // SAFETY: `+[LAContext new]` returns a retained instance or nil.
        unsafe { msg_send![cls, new] }
    }

    /// Read `-[NSError code]`, or `None` for a nil error.
    unsafe fn error_code(error: *mut AnyObject) -> Option<i64> {
        if error.is_null() {
            return None;
        }
        let code: i64 = msg_send![&*error, code];
        Some(code)
    }

    fn create_access_control(policy: &AccessPolicy) -> Result<SecAccessControl, GateError> {
        let protection = match policy.protection {
            Protection::WhenUnlockedThisDeviceOnly => {
                ProtectionMode::AccessibleWhenUnlockedThisDeviceOnly
            }
        };
        SecAccessControl::create_with_protection(Some(protection), access_control_flags(policy))
            .map_err(|e| GateError::PolicyUnavailable(format!("code {}: {e}", e.code())))
    }

    impl BiometricGate for MacOsBiometricGate {
        fn provider_name(&self) -> &'static str {
            "Touch ID"
        }

        fn can_authenticate(&self) -> Capability {
            let Some(ctx) = new_context() else {
                return Capability::Unsupported {
                    reason: "LocalAuthentication unavailable".into(),
                };
            };

            let mut error: *mut AnyObject = std::ptr::null_mut();
            // SAFETY: `error` is an out-parameter the callee may fill with an
            // autoreleased NSError.
            let can_evaluate: bool = unsafe {
                msg_send![&*ctx, canEvaluatePolicy: CAPABILITY_CHECK_POLICY, error: &mut error]
            };
            if can_evaluate {
                return Capability::Available;
            }

            // SAFETY: `error` is nil or a valid NSError.
            match unsafe { error_code(error) } {
                Some(code) => Capability::from_error_code(code, format!("LAError {code}")),
                None => Capability::Unsupported {
                    reason: "policy cannot be evaluated".into(),
                },
            }
        }

        fn access_policy(&self) -> Result<AccessPolicy, GateError> {
            let policy = AccessPolicy::device_owner_presence();
            create_access_control(&policy)?;
            Ok(policy)
        }

        fn challenge(&self, policy: &AccessPolicy, reason: &str) -> Result<(), GateError> {
            let access_control = create_access_control(policy)?;
            tracing::debug!(%policy, "presenting device-owner challenge");
            let ctx = new_context().ok_or(GateError::NotAvailable)?;

            let (tx, rx) = mpsc::channel::<Result<(), GateError>>();
            let reply = RcBlock::new(move |success: Bool, error: *mut AnyObject| {
                let result = if success.as_bool() {
                    Ok(())
                } else {
                    // SAFETY: the reply block receives nil or a valid NSError.
                    Err(unsafe { error_code(error) }.map_or_else(
                        || GateError::AuthenticationFailed("no error reported".into()),
                        evaluation_error,
                    ))
                };
                let _ = tx.send(result);
            });

            let reason = NSString::from_str(reason);
            let access_control_ref = access_control
                .as_concrete_TypeRef()
                .cast::<OpaqueAccessControl>()
                .cast_const();
            // SAFETY: `ctx` and `access_control` outlive the call; the reply
            // block is copied by the callee and invoked once on a private queue.
            unsafe {
                let _: () = msg_send![
                    &*ctx,
                    evaluateAccessControl: access_control_ref,
                    operation: CHALLENGE_OPERATION_USE_KEY_SIGN,
                    localizedReason: &*reason,
                    reply: &*reply
                ];
            }

            let result = rx
                .recv()
                .map_err(|_| GateError::PlatformError("evaluation reply dropped".into()))?;
            drop(ctx);
            drop(access_control);
            result
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create the device-owner gate for the current platform.
#[must_use]
pub fn create_biometric_gate() -> Arc<dyn BiometricGate> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOsBiometricGate)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(NullBiometricGate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
