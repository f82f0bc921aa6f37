//! Login keychain lookups for biometric keys.
//!
//! Keys are generic-password items. macOS reads them through
//! Security.framework; other platforms have no compatible store and every
//! lookup misses.

use std::sync::Arc;

use latchkey_bridge::CredentialStore;
#[cfg(not(target_os = "macos"))]
use latchkey_bridge::NullCredentialStore;

/// `errSecItemNotFound`.
pub const ERR_SEC_ITEM_NOT_FOUND: i32 = -25300;

#[cfg(target_os = "macos")]
mod macos {
    use latchkey_bridge::{CredentialStore, SecretRecord, StoreError};
    use security_framework::passwords::get_generic_password;
    use zeroize::Zeroizing;

    use super::ERR_SEC_ITEM_NOT_FOUND;

    /// Generic-password items in the user's default keychain.
    pub struct MacOsKeychainStore;

    impl CredentialStore for MacOsKeychainStore {
        fn lookup(
            &self,
            service: &str,
            account: &str,
        ) -> Result<Option<SecretRecord>, StoreError> {
            match get_generic_password(service, account) {
                Ok(payload) => {
                    let payload = Zeroizing::new(payload);
                    SecretRecord::from_utf8(&payload).map(Some)
                }
                Err(e) if e.code() == ERR_SEC_ITEM_NOT_FOUND => Ok(None),
                Err(e) => Err(StoreError::Platform {
                    code: e.code(),
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// Create the credential store for the current platform.
#[must_use]
pub fn create_credential_store() -> Arc<dyn CredentialStore> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOsKeychainStore)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(NullCredentialStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn non_macos_store_always_misses() {
        let store = create_credential_store();
        assert!(store
            .lookup("Bitwarden_biometric", "key")
            .unwrap()
            .is_none());
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn missing_item_is_none() {
        let store = create_credential_store();
        let result = store.lookup(
            "latchkey-test-service-that-does-not-exist",
            "latchkey-test-account",
        );
        assert!(matches!(result, Ok(None)));
    }
}
