//! Command dispatcher.
//!
//! Decodes each inbound message once and routes it:
//!
//! | Command             | Completion                         |
//! |---------------------|------------------------------------|
//! | `readFromClipboard` | immediate, clipboard text          |
//! | `copyToClipboard`   | immediate, empty                   |
//! | `showPopover`       | immediate, empty                   |
//! | `downloadFile`      | immediate, empty (after the dialog)|
//! | `sleep`             | deferred, empty after the delay    |
//! | `biometricUnlock`   | deferred, unlock envelope          |
//! | malformed / unknown | never                              |
//!
//! Deferred handlers run on the Tokio runtime, so [`Dispatcher::dispatch`]
//! must be called from within one.

use std::sync::Arc;
use std::time::Duration;

use latchkey_protocol::{Command, DownloadFileMessage, Reply};
use serde_json::Value;

use crate::biometric::BiometricGate;
use crate::completion::Responder;
use crate::config::{BridgeConfig, ChallengeFailurePolicy};
use crate::error::BridgeError;
use crate::host::{Clipboard, FileSink, Popover, SaveDialog};
use crate::keychain::CredentialStore;
use crate::unlock::UnlockFlow;

/// Host capabilities injected into the dispatcher.
#[derive(Clone)]
pub struct HostServices {
    /// System clipboard.
    pub clipboard: Arc<dyn Clipboard>,
    /// Extension popover.
    pub popover: Arc<dyn Popover>,
    /// Save dialog for downloads.
    pub save_dialog: Arc<dyn SaveDialog>,
    /// Download destination writer.
    pub files: Arc<dyn FileSink>,
}

/// How a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Malformed or unknown: no side effect, never completed.
    Ignored,
    /// Handled and completed before `dispatch` returned.
    Completed,
    /// Handed to a task that completes it later.
    Deferred,
}

/// Routes decoded commands to their handlers.
pub struct Dispatcher {
    host: HostServices,
    unlock: UnlockFlow,
    sleep_delay: Duration,
    on_challenge_failure: ChallengeFailurePolicy,
}

impl Dispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(
        host: HostServices,
        gate: Arc<dyn BiometricGate>,
        store: Arc<dyn CredentialStore>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            host,
            unlock: UnlockFlow::new(gate, store, config),
            sleep_delay: config.sleep_delay(),
            on_challenge_failure: config.on_challenge_failure,
        }
    }

    /// Handle one inbound message.
    ///
    /// `responder` is completed here for synchronous commands, moved into a
    /// task for deferred ones, and dropped uncompleted for malformed or
    /// unknown messages.
    pub fn dispatch(&self, message: &Value, responder: Responder) -> Dispatched {
        let command = match Command::decode(message) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed message");
                return Dispatched::Ignored;
            }
        };
        tracing::debug!(
            command = command.name(),
            deferred = command.is_deferred(),
            "received extension message"
        );

        match command {
            Command::Unknown(name) => {
                tracing::debug!(command = %name, "ignoring unknown command");
                Dispatched::Ignored
            }
            Command::ReadFromClipboard => {
                let _ = responder.complete(self.read_from_clipboard());
                Dispatched::Completed
            }
            Command::CopyToClipboard { data } => {
                self.copy_to_clipboard(data.as_deref());
                let _ = responder.complete(Reply::empty());
                Dispatched::Completed
            }
            Command::ShowPopover => {
                if let Err(e) = self.host.popover.show_popover() {
                    tracing::warn!(error = %e, "failed to show popover");
                }
                let _ = responder.complete(Reply::empty());
                Dispatched::Completed
            }
            Command::DownloadFile { data } => {
                if let Some(data) = data {
                    if let Err(e) = self.download_file(&data) {
                        tracing::error!(error = %e, "downloadFile failed");
                    }
                }
                let _ = responder.complete(Reply::empty());
                Dispatched::Completed
            }
            Command::Sleep => {
                self.spawn_sleep(responder);
                Dispatched::Deferred
            }
            Command::BiometricUnlock { user_id } => {
                self.spawn_unlock(user_id, responder);
                Dispatched::Deferred
            }
        }
    }

    fn read_from_clipboard(&self) -> Reply {
        match self.host.clipboard.read_text() {
            Ok(text) => Reply::with_message(text.map_or(Value::Null, Value::String)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read clipboard");
                Reply::with_message(Value::Null)
            }
        }
    }

    fn copy_to_clipboard(&self, data: Option<&str>) {
        let Some(text) = data else {
            tracing::debug!("copyToClipboard without string data; clipboard untouched");
            return;
        };
        if let Err(e) = self.host.clipboard.write_text(text) {
            tracing::warn!(error = %e, "failed to write clipboard");
        }
    }

    fn download_file(&self, data: &str) -> Result<(), BridgeError> {
        let download = DownloadFileMessage::parse(data)?;
        let bytes = download.blob_bytes()?;

        let Some(path) = self.host.save_dialog.choose_destination(&download.file_name) else {
            tracing::debug!("save dialog cancelled");
            return Ok(());
        };

        self.host.files.write_file(&path, &bytes)?;
        tracing::info!(path = %path.display(), size = bytes.len(), "download saved");
        Ok(())
    }

    fn spawn_sleep(&self, mut responder: Responder) {
        let delay = self.sleep_delay;
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    let _ = responder.complete(Reply::empty());
                }
                () = responder.closed() => {
                    tracing::debug!("sleep cancelled, requester went away");
                }
            }
        });
    }

    fn spawn_unlock(&self, user_id: String, responder: Responder) {
        let flow = self.unlock.clone();
        let on_failure = self.on_challenge_failure;
        tokio::spawn(async move {
            let outcome = flow.run(&user_id).await;
            let label = outcome.label();
            match outcome.into_reply(on_failure) {
                Some(reply) => {
                    tracing::info!(outcome = label, "biometric unlock finished");
                    let _ = responder.complete(reply);
                }
                None => {
                    tracing::info!(outcome = label, "biometric unlock finished without reply");
                    drop(responder);
                }
            }
        });
    }
}
