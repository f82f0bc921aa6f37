//! Managed application state.
//!
//! Built once in `setup` and never replaced: the dispatcher holds the
//! platform adapters and the configuration it was created with.

use std::sync::Arc;

use latchkey_bridge::{BridgeConfig, Dispatcher};

use crate::logging::LogGuard;

/// The command dispatcher and the configuration it was built from.
pub struct BridgeState {
    /// Shared with in-flight `native_message` calls.
    pub dispatcher: Arc<Dispatcher>,
    /// Effective configuration after defaults were applied.
    pub config: BridgeConfig,
}

impl BridgeState {
    /// Wrap a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: BridgeConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }
}

/// Managed Tauri state for the bridge.
pub type ManagedBridgeState = Arc<BridgeState>;

/// Keeps the file log writer alive; `None` if logging was already set up.
pub type ManagedLogGuard = Option<LogGuard>;
