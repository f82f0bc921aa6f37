//! Menu bar item and the extension popover anchored to it.
//!
//! - macOS: menu bar icon (top-right)
//! - Windows: notification area (bottom-right)
//! - Linux: `StatusNotifierItem` (context menu only; click events not emitted)
//!
//! The popover window is created lazily on first use and positioned under
//! the tray icon by `tauri-plugin-positioner`.

use latchkey_bridge::{HostError, Popover};
use tauri::{
    include_image,
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager, Runtime, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};
use tauri_plugin_positioner::{Position, WindowExt};

const TRAY_ID: &str = "latchkey-tray";

/// Window label for the popover.
pub const POPOVER_LABEL: &str = "popover";

const MENU_SHOW: &str = "show-popover";
const MENU_QUIT: &str = "quit";

/// Create and register the tray icon.
///
/// # Errors
///
/// Returns a Tauri error if menu items or the tray icon fail to build.
pub fn create_tray<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    let show_i = MenuItem::with_id(app, MENU_SHOW, "Show Latchkey", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;
    let quit_i = MenuItem::with_id(app, MENU_QUIT, "Quit", true, None::<&str>)?;
    let menu = Menu::with_items(app, &[&show_i, &sep, &quit_i])?;

    TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("Latchkey")
        .icon(include_image!("icons/tray.png"))
        .icon_as_template(cfg!(target_os = "macos"))
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| match event.id.as_ref() {
            MENU_SHOW => {
                if let Err(e) = show_popover(app) {
                    tracing::warn!("failed to show popover: {e}");
                }
            }
            MENU_QUIT => app.exit(0),
            _ => {}
        })
        .on_tray_icon_event(|tray, event| {
            tauri_plugin_positioner::on_tray_event(tray.app_handle(), &event);

            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                toggle_popover(tray.app_handle());
            }
        })
        .build(app)?;

    Ok(())
}

fn popover_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<WebviewWindow<R>> {
    if let Some(popover) = app.get_webview_window(POPOVER_LABEL) {
        return Ok(popover);
    }
    WebviewWindowBuilder::new(app, POPOVER_LABEL, WebviewUrl::App("index.html".into()))
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .inner_size(375.0, 600.0)
        .resizable(false)
        .visible(false)
        .focused(true)
        .build()
}

/// Show the popover under the tray icon, creating it on first use.
///
/// # Errors
///
/// Returns a Tauri error if the window cannot be created or shown.
pub fn show_popover<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    let popover = popover_window(app)?;
    // Fails before the tray has reported a position; the window still shows.
    let _ = popover
        .as_ref()
        .window()
        .move_window(Position::TrayBottomCenter);
    popover.show()?;
    popover.set_focus()
}

/// Tray left-click: hide a visible popover, show a hidden one.
pub fn toggle_popover<R: Runtime>(app: &AppHandle<R>) {
    if let Some(popover) = app.get_webview_window(POPOVER_LABEL) {
        if popover.is_visible().unwrap_or_default() {
            let _ = popover.hide();
            return;
        }
    }
    if let Err(e) = show_popover(app) {
        tracing::warn!("failed to show popover: {e}");
    }
}

/// [`Popover`] adapter for the dispatcher.
pub struct TrayPopover<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TrayPopover<R> {
    /// Create the adapter.
    #[must_use]
    pub const fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> Popover for TrayPopover<R> {
    fn show_popover(&self) -> Result<(), HostError> {
        show_popover(&self.app).map_err(|e| HostError::Popover(e.to_string()))
    }
}
