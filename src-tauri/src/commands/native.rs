//! Entry point for extension messages.

use latchkey_bridge::{channel, Dispatched};
use serde_json::Value;
use tauri::State;

use crate::state::ManagedBridgeState;

/// Dispatch one extension message and wait for its reply.
///
/// Resolves to the user-info object `{"message": ...}`, or `null` when the
/// request completed without a payload or was never completed (malformed
/// or unknown input, a silent unlock failure).
///
/// # Errors
///
/// Returns a string error only if the dispatch task itself panicked.
#[tauri::command]
pub async fn native_message(
    message: Value,
    bridge: State<'_, ManagedBridgeState>,
) -> Result<Option<Value>, String> {
    let dispatcher = std::sync::Arc::clone(&bridge.dispatcher);
    let (responder, pending) = channel();

    // Handlers may block on the clipboard or the save panel.
    let dispatched =
        tauri::async_runtime::spawn_blocking(move || dispatcher.dispatch(&message, responder))
            .await
            .map_err(|e| {
                tracing::error!("dispatch task failed: {e}");
                "internal error".to_string()
            })?;

    let reply = pending.wait().await;
    if reply.is_none() && dispatched != Dispatched::Ignored {
        tracing::debug!(?dispatched, "request finished without a reply");
    }
    Ok(reply.and_then(latchkey_protocol::Reply::into_user_info))
}
