//! Bridge configuration, stored as plain JSON next to the app data.
//!
//! Nothing here is secret. Every field has a default so a missing or
//! corrupt file still yields a working bridge that matches what existing
//! extension builds expect.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::fallback::FallbackChain;

/// What to do when the user fails or dismisses the biometric prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeFailurePolicy {
    /// Leave the request uncompleted. Existing extension builds rely on
    /// this; the requester sees no reply.
    #[default]
    Silent,
    /// Complete the request with an empty reply.
    EmptyReply,
    /// Complete with the "not supported" envelope.
    NotSupported,
}

/// Bridge configuration.
///
/// Persisted to `{data_dir}/bridge.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Keychain service the biometric keys are stored under.
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,

    /// Account-name templates tried in order.
    #[serde(default)]
    pub account_fallbacks: FallbackChain,

    /// Delay before `sleep` completes, in milliseconds.
    #[serde(default = "default_sleep_delay")]
    pub sleep_delay_ms: u64,

    /// Reason shown in the system authentication prompt.
    #[serde(default = "default_challenge_reason")]
    pub challenge_reason: String,

    /// Reply policy when the challenge fails.
    #[serde(default)]
    pub on_challenge_failure: ChallengeFailurePolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            keychain_service: default_keychain_service(),
            account_fallbacks: FallbackChain::default(),
            sleep_delay_ms: default_sleep_delay(),
            challenge_reason: default_challenge_reason(),
            on_challenge_failure: ChallengeFailurePolicy::default(),
        }
    }
}

fn default_keychain_service() -> String {
    "Bitwarden_biometric".into()
}
const fn default_sleep_delay() -> u64 {
    10_000
}
fn default_challenge_reason() -> String {
    "Bitwarden Safari Extension".into()
}

// ── File I/O ───────────────────────────────────────────────────────

const CONFIG_FILE: &str = "bridge.json";

impl BridgeConfig {
    /// Delay before `sleep` completes.
    #[must_use]
    pub const fn sleep_delay(&self) -> Duration {
        Duration::from_millis(self.sleep_delay_ms)
    }

    /// Check values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] for an empty keychain service or
    /// challenge reason.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.keychain_service.trim().is_empty() {
            return Err(BridgeError::Config("keychainService must not be empty".into()));
        }
        if self.challenge_reason.trim().is_empty() {
            return Err(BridgeError::Config("challengeReason must not be empty".into()));
        }
        Ok(())
    }

    /// Location of the configuration file inside `data_dir`.
    #[must_use]
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load configuration, writing the defaults out on first run so the
    /// file can be edited.
    ///
    /// An existing file is never rewritten, even when it fails to parse.
    #[must_use]
    pub fn load_or_init(data_dir: &Path) -> Self {
        if Self::path(data_dir).exists() {
            return Self::load(data_dir);
        }
        let config = Self::default();
        match config.save(data_dir) {
            Ok(()) => tracing::info!(path = %Self::path(data_dir).display(), "wrote default bridge config"),
            Err(e) => tracing::warn!(error = %e, "could not write default bridge config"),
        }
        config
    }

    /// Load configuration from `{data_dir}/bridge.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing, is not
    /// valid JSON, or fails validation (an empty fallback list included).
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match Self::parse(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid bridge config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] for malformed JSON or invalid values.
    pub fn parse(contents: &str) -> Result<Self, BridgeError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist configuration to `{data_dir}/bridge.json`.
    ///
    /// Writes to a temporary file, then renames over the target.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write/rename.
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let path = Self::path(data_dir);
        let tmp = data_dir.join(".bridge.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
