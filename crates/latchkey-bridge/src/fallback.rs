//! Ordered account-name fallback chain for keychain lookups.
//!
//! Keys written by successive client releases live under different account
//! names. The chain lists them newest first; lookups try each candidate in
//! order and stop at the first hit. Extending the chain for a future
//! migration is a configuration change, not a code change.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Placeholder substituted with the user identifier.
pub const USER_ID_PLACEHOLDER: &str = "{userId}";

/// Current account name.
pub const USER_BIOMETRIC: &str = "{userId}_user_biometric";

/// Generic account name used before per-user keys.
pub const LEGACY_KEY: &str = "key";

/// Deprecated master-key account name.
pub const LEGACY_MASTERKEY_BIOMETRIC: &str = "{userId}_masterkey_biometric";

/// Account name template; every `{userId}` is replaced on resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountTemplate(String);

impl AccountTemplate {
    /// Create a template from its text form.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Account name for `user_id`.
    #[must_use]
    pub fn render(&self, user_id: &str) -> String {
        self.0.replace(USER_ID_PLACEHOLDER, user_id)
    }
}

/// Non-empty, ordered list of account templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AccountTemplate>", into = "Vec<AccountTemplate>")]
pub struct FallbackChain {
    templates: Vec<AccountTemplate>,
}

impl FallbackChain {
    /// Build a chain from templates in lookup order.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EmptyFallbackChain`] if `templates` is empty.
    pub fn new(templates: Vec<AccountTemplate>) -> Result<Self, BridgeError> {
        if templates.is_empty() {
            return Err(BridgeError::EmptyFallbackChain);
        }
        Ok(Self { templates })
    }

    /// Templates in lookup order.
    #[must_use]
    pub fn templates(&self) -> &[AccountTemplate] {
        &self.templates
    }

    /// Candidate account names for `user_id`, earliest preferred.
    #[must_use]
    pub fn resolve(&self, user_id: &str) -> Vec<String> {
        self.templates.iter().map(|t| t.render(user_id)).collect()
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self {
            templates: vec![
                AccountTemplate::new(USER_BIOMETRIC),
                AccountTemplate::new(LEGACY_KEY),
                AccountTemplate::new(LEGACY_MASTERKEY_BIOMETRIC),
            ],
        }
    }
}

impl TryFrom<Vec<AccountTemplate>> for FallbackChain {
    type Error = BridgeError;

    fn try_from(templates: Vec<AccountTemplate>) -> Result<Self, Self::Error> {
        Self::new(templates)
    }
}

impl From<FallbackChain> for Vec<AccountTemplate> {
    fn from(chain: FallbackChain) -> Self {
        chain.templates
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
