//! Credential store abstraction: keyed lookup by (service, account).
//!
//! ```text
//! CredentialStore (trait)
//! ├── MacOsKeychainStore   (host crate, login keychain generic passwords)
//! ├── MemoryCredentialStore (in-process map, tests and previews)
//! └── NullCredentialStore  (always misses, platforms without a keychain)
//! ```
//!
//! "Not found" is `Ok(None)`, never an error, so callers can tell a missing
//! entry apart from a failing store.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from credential store lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The stored payload is not UTF-8 text.
    #[error("stored secret is not valid UTF-8")]
    InvalidUtf8,

    /// Platform keychain error other than "item not found".
    #[error("keychain error (code {code}): {message}")]
    Platform {
        /// Native status code.
        code: i32,
        /// Platform description.
        message: String,
    },

    /// Internal lock poisoned by a panicking writer.
    #[error("credential store lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// Secret record
// ---------------------------------------------------------------------------

/// Secret text copied out of the store. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretRecord {
    text: String,
}

impl SecretRecord {
    /// Wrap already-decoded secret text.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self { text }
    }

    /// Decode a raw store payload as UTF-8, copying it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUtf8`] if `bytes` is not UTF-8.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, StoreError> {
        std::str::from_utf8(bytes)
            .map(|text| Self::new(text.to_owned()))
            .map_err(|_| StoreError::InvalidUtf8)
    }

    /// Expose the secret text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretRecord(***)")
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Read-only credential store keyed by service and account.
///
/// Implementations must be safe for concurrent reads; the bridge takes no
/// lock of its own around lookups.
pub trait CredentialStore: Send + Sync {
    /// Look up the secret stored for `(service, account)`.
    ///
    /// Any native buffer holding the secret is released before returning;
    /// the returned [`SecretRecord`] is the only surviving copy.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for store failures. A missing entry is
    /// `Ok(None)`.
    fn lookup(&self, service: &str, account: &str) -> Result<Option<SecretRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// Null store
// ---------------------------------------------------------------------------

/// Store for platforms without a keychain: every lookup misses.
pub struct NullCredentialStore;

impl CredentialStore for NullCredentialStore {
    fn lookup(&self, _service: &str, _account: &str) -> Result<Option<SecretRecord>, StoreError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

type EntryKey = (String, String);

/// In-process store backed by a map of raw payloads.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<EntryKey, Zeroizing<Vec<u8>>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under `(service, account)`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the map lock is poisoned.
    pub fn insert(
        &self,
        service: &str,
        account: &str,
        payload: impl AsRef<[u8]>,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(
            (service.to_owned(), account.to_owned()),
            Zeroizing::new(payload.as_ref().to_vec()),
        );
        drop(entries);
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn lookup(&self, service: &str, account: &str) -> Result<Option<SecretRecord>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        entries
            .get(&(service.to_owned(), account.to_owned()))
            .map(|payload| SecretRecord::from_utf8(payload))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
