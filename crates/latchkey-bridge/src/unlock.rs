//! Biometric unlock flow.
//!
//! ```text
//! Start → CapabilityChecked ─┬─ Unsupported                  → "not supported"
//!                            └─ Available | LockedOut
//!       → policy built ──────┬─ policy unavailable           → "not supported"
//!                            └─ ChallengeIssued
//!       → challenge ─────────┬─ ChallengeFailed              → per ChallengeFailurePolicy
//!                            └─ ChallengeSucceeded
//!       → Searching ─────────┬─ Found                        → "unlocked"
//!                            └─ ExhaustedFallbacks           → "not enabled"
//! ```

use std::sync::Arc;

use latchkey_protocol::{Reply, UnlockResponse};

use crate::biometric::{BiometricGate, Capability, GateError};
use crate::config::{BridgeConfig, ChallengeFailurePolicy};
use crate::fallback::FallbackChain;
use crate::keychain::{CredentialStore, SecretRecord};

/// Terminal state of one unlock attempt.
#[derive(Debug)]
pub enum UnlockOutcome {
    /// Capability check or policy construction failed; no prompt was shown.
    Unsupported(String),
    /// The user failed or dismissed the prompt.
    ChallengeFailed(GateError),
    /// A key was found under the candidate at `candidate` (0-based).
    Found {
        /// Index into the resolved candidate list.
        candidate: usize,
        /// The recovered key.
        secret: SecretRecord,
    },
    /// Every candidate missed.
    ExhaustedFallbacks,
}

impl UnlockOutcome {
    /// Reply to send, or `None` to leave the request uncompleted.
    #[must_use]
    pub fn into_reply(self, on_failure: ChallengeFailurePolicy) -> Option<Reply> {
        match self {
            Self::Unsupported(_) => Some(UnlockResponse::NotSupported.build()),
            Self::ChallengeFailed(_) => match on_failure {
                ChallengeFailurePolicy::Silent => None,
                ChallengeFailurePolicy::EmptyReply => Some(Reply::empty()),
                ChallengeFailurePolicy::NotSupported => Some(UnlockResponse::NotSupported.build()),
            },
            Self::Found { secret, .. } => Some(
                UnlockResponse::Unlocked {
                    user_key: secret.expose().to_owned(),
                }
                .build(),
            ),
            Self::ExhaustedFallbacks => Some(UnlockResponse::NotEnabled.build()),
        }
    }

    /// Short state name for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unsupported(_) => "unsupported",
            Self::ChallengeFailed(_) => "challenge_failed",
            Self::Found { .. } => "found",
            Self::ExhaustedFallbacks => "exhausted_fallbacks",
        }
    }
}

/// Runs the unlock state machine against an injected gate and store.
#[derive(Clone)]
pub struct UnlockFlow {
    gate: Arc<dyn BiometricGate>,
    store: Arc<dyn CredentialStore>,
    service: String,
    chain: FallbackChain,
    reason: String,
}

impl UnlockFlow {
    /// Create a flow from the bridge configuration.
    #[must_use]
    pub fn new(
        gate: Arc<dyn BiometricGate>,
        store: Arc<dyn CredentialStore>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            gate,
            store,
            service: config.keychain_service.clone(),
            chain: config.account_fallbacks.clone(),
            reason: config.challenge_reason.clone(),
        }
    }

    /// Run one unlock attempt for `user_id`.
    ///
    /// The challenge and the keychain search run on the blocking pool.
    pub async fn run(&self, user_id: &str) -> UnlockOutcome {
        let capability = self.gate.can_authenticate();
        if !capability.permits_challenge() {
            let reason = capability.reason().unwrap_or("unsupported").to_owned();
            tracing::info!(provider = self.gate.provider_name(), %reason, "biometric unlock not supported");
            return UnlockOutcome::Unsupported(reason);
        }
        if capability == Capability::LockedOut {
            tracing::info!(
                provider = self.gate.provider_name(),
                "biometry locked out, continuing to challenge"
            );
        }

        let policy = match self.gate.access_policy() {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!(error = %e, "cannot build access control policy");
                return UnlockOutcome::Unsupported(e.to_string());
            }
        };

        let gate = Arc::clone(&self.gate);
        let reason = self.reason.clone();
        let challenge =
            tokio::task::spawn_blocking(move || gate.challenge(&policy, &reason)).await;
        match challenge {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::info!(error = %e, "biometric challenge failed");
                return UnlockOutcome::ChallengeFailed(e);
            }
            Err(e) => {
                tracing::error!("biometric challenge task failed: {e}");
                return UnlockOutcome::ChallengeFailed(GateError::PlatformError(e.to_string()));
            }
        }

        let store = Arc::clone(&self.store);
        let service = self.service.clone();
        let candidates = self.chain.resolve(user_id);
        let search =
            tokio::task::spawn_blocking(move || search(store.as_ref(), &service, &candidates))
                .await;
        match search {
            Ok(Some((candidate, secret))) => UnlockOutcome::Found { candidate, secret },
            Ok(None) => UnlockOutcome::ExhaustedFallbacks,
            Err(e) => {
                tracing::error!("keychain search task failed: {e}");
                UnlockOutcome::ExhaustedFallbacks
            }
        }
    }
}

/// Look up `candidates` in order and return the first hit with its index.
///
/// Store errors and undecodable payloads count as a miss for that candidate.
#[must_use]
pub fn search(
    store: &dyn CredentialStore,
    service: &str,
    candidates: &[String],
) -> Option<(usize, SecretRecord)> {
    for (index, account) in candidates.iter().enumerate() {
        match store.lookup(service, account) {
            Ok(Some(secret)) => {
                tracing::info!(candidate = index, %account, "biometric key found");
                return Some((index, secret));
            }
            Ok(None) => {
                tracing::debug!(candidate = index, %account, "no keychain entry");
            }
            Err(e) => {
                tracing::warn!(candidate = index, %account, error = %e, "keychain lookup failed, trying next candidate");
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
