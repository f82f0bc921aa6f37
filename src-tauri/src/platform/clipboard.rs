//! Plain-text system clipboard.
//!
//! - **macOS**: `NSPasteboard` general pasteboard, `public.utf8-plain-text`.
//! - **Windows**: `clipboard-win` Unicode text.
//! - **Linux**: `tauri-plugin-clipboard-manager`.

use latchkey_bridge::{Clipboard, HostError};
use tauri::AppHandle;

/// Clipboard adapter backed by the running app.
pub struct SystemClipboard {
    app: AppHandle,
}

impl SystemClipboard {
    /// Create the adapter.
    #[must_use]
    pub const fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>, HostError> {
        platform_read(&self.app)
    }

    fn write_text(&self, text: &str) -> Result<(), HostError> {
        platform_write(text, &self.app)
    }
}

// ── macOS ────────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
const PLAIN_TEXT_TYPE: &str = "public.utf8-plain-text";

#[cfg(target_os = "macos")]
#[allow(clippy::unnecessary_wraps)]
fn platform_read(_app: &AppHandle) -> Result<Option<String>, HostError> {
    use objc2_app_kit::NSPasteboard;
    use objc2_foundation::NSString;

    let pasteboard = NSPasteboard::generalPasteboard();
    let text_type = NSString::from_str(PLAIN_TEXT_TYPE);
    Ok(pasteboard
        .stringForType(&text_type)
        .map(|text| text.to_string()))
}

#[cfg(target_os = "macos")]
fn platform_write(text: &str, _app: &AppHandle) -> Result<(), HostError> {
    use objc2_app_kit::NSPasteboard;
    use objc2_foundation::NSString;

    let pasteboard = NSPasteboard::generalPasteboard();
    pasteboard.clearContents();

    let ns_text = NSString::from_str(text);
    let text_type = NSString::from_str(PLAIN_TEXT_TYPE);
    if pasteboard.setString_forType(&ns_text, &text_type) {
        Ok(())
    } else {
        Err(HostError::Clipboard(
            "NSPasteboard rejected the string".into(),
        ))
    }
}

// ── Windows ──────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
#[allow(clippy::unnecessary_wraps)]
fn platform_read(_app: &AppHandle) -> Result<Option<String>, HostError> {
    // An empty clipboard or one without text reports an error here.
    Ok(clipboard_win::get_clipboard_string().ok())
}

#[cfg(target_os = "windows")]
fn platform_write(text: &str, _app: &AppHandle) -> Result<(), HostError> {
    clipboard_win::set_clipboard_string(text)
        .map_err(|e| HostError::Clipboard(format!("failed to write clipboard: {e}")))
}

// ── Linux and others ─────────────────────────────────────────────────

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
#[allow(clippy::unnecessary_wraps)]
fn platform_read(app: &AppHandle) -> Result<Option<String>, HostError> {
    use tauri_plugin_clipboard_manager::ClipboardExt;

    Ok(app.clipboard().read_text().ok())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_write(text: &str, app: &AppHandle) -> Result<(), HostError> {
    use tauri_plugin_clipboard_manager::ClipboardExt;

    app.clipboard()
        .write_text(text)
        .map_err(|e| HostError::Clipboard(format!("clipboard write failed: {e}")))
}
