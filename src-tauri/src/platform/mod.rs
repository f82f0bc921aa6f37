//! Platform integrations: popover, clipboard, save panel, keychain, biometric.

pub mod biometric;
pub mod clipboard;
pub mod keychain;
pub mod popover;
pub mod save_dialog;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use latchkey_bridge::{BiometricGate, Capability, HostServices, LocalFileSink};
use tauri::AppHandle;

pub use biometric::create_biometric_gate;
pub use keychain::create_credential_store;

// ---------------------------------------------------------------------------
// OsType
// ---------------------------------------------------------------------------

/// Detected operating system type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    MacOS,
    Windows,
    Linux,
    Unknown,
}

impl OsType {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MacOS => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
const fn detect_os_type() -> OsType {
    #[cfg(target_os = "macos")]
    {
        OsType::MacOS
    }
    #[cfg(target_os = "windows")]
    {
        OsType::Windows
    }
    #[cfg(target_os = "linux")]
    {
        OsType::Linux
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        OsType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Startup capability check
// ---------------------------------------------------------------------------

/// Log what the device offers for `biometricUnlock`.
///
/// Diagnostic only: every unlock re-checks the capability itself, since
/// enrollment and lockout change during a session. An FFI panic (stripped
/// OS images, VMs) is treated as unsupported.
pub fn log_platform_capabilities(gate: &Arc<dyn BiometricGate>) -> Capability {
    let os_type = detect_os_type();
    let capability = std::panic::catch_unwind(AssertUnwindSafe(|| gate.can_authenticate()))
        .unwrap_or_else(|_| {
            tracing::warn!("biometric capability check panicked; treating as unsupported");
            Capability::Unsupported {
                reason: "capability check panicked".into(),
            }
        });

    tracing::info!(
        os = %os_type,
        provider = gate.provider_name(),
        available = capability.is_available(),
        reason = capability.reason().unwrap_or("none"),
        "platform capabilities detected"
    );
    capability
}

// ---------------------------------------------------------------------------
// Host services
// ---------------------------------------------------------------------------

/// Real host capabilities for the dispatcher.
#[must_use]
pub fn host_services(app: &AppHandle) -> HostServices {
    HostServices {
        clipboard: Arc::new(clipboard::SystemClipboard::new(app.clone())),
        popover: Arc::new(popover::TrayPopover::new(app.clone())),
        save_dialog: Arc::new(save_dialog::NativeSaveDialog::new(app.clone())),
        files: Arc::new(LocalFileSink),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
