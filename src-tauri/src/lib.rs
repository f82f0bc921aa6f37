//! Latchkey Tauri application: native host for the browser extension.
//!
//! Wires the platform adapters in [`platform`] into the
//! `latchkey-bridge` dispatcher and exposes it to the extension through
//! the `native_message` IPC command.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod commands;
pub mod logging;
pub mod platform;
pub mod state;

use std::sync::Arc;

use latchkey_bridge::{BridgeConfig, Dispatcher};
use tauri::Manager;

use state::{BridgeState, ManagedBridgeState, ManagedLogGuard};

/// Run the Tauri application.
///
/// # Panics
///
/// Panics if the Tauri runtime fails to initialize (missing system
/// dependencies, invalid configuration, or resource allocation failure).
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_positioner::init())
        .setup(|app| {
            // ── Logging ───────────────────────────────────────────
            let log_dir = app.path().app_log_dir()?;
            std::fs::create_dir_all(&log_dir)?;
            let log_guard: ManagedLogGuard = logging::init(&log_dir);
            app.manage(log_guard);

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                build = env!("LATCHKEY_BUILD_HASH"),
                "latchkey starting"
            );

            // ── Menu bar only, no Dock icon ──────────────────────
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            // ── Configuration ─────────────────────────────────────
            let data_dir = app.path().app_data_dir()?;
            if !data_dir.exists() {
                std::fs::create_dir_all(&data_dir)?;
            }
            let config = BridgeConfig::load_or_init(&data_dir);

            // ── Dispatcher ────────────────────────────────────────
            let gate = platform::create_biometric_gate();
            platform::log_platform_capabilities(&gate);
            let store = platform::create_credential_store();
            let host = platform::host_services(app.handle());
            let dispatcher = Dispatcher::new(host, gate, store, &config);

            let bridge: ManagedBridgeState = Arc::new(BridgeState::new(dispatcher, config));
            tracing::info!(
                service = %bridge.config.keychain_service,
                fallbacks = bridge.config.account_fallbacks.templates().len(),
                sleep_delay_ms = bridge.config.sleep_delay_ms,
                on_challenge_failure = ?bridge.config.on_challenge_failure,
                "bridge ready"
            );
            app.manage(bridge);

            // ── System tray ──────────────────────────────────────
            platform::popover::create_tray(app.handle())?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![commands::native::native_message])
        .build(tauri::generate_context!())
        .expect("error building Latchkey")
        .run(|_app, event| {
            // Stay in the menu bar when the popover closes.
            if let tauri::RunEvent::ExitRequested { api, code, .. } = event {
                if code.is_none() {
                    api.prevent_exit();
                }
            }
        });
}
