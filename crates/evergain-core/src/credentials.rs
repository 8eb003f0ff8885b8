//! Credential storage for the auth token and the signed-in user profile.
//!
//! [`KeyringStore`] keeps them in the OS keyring; [`MemoryStore`] keeps them
//! in process memory for tests and for environments without a keyring.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::CredentialError;
use crate::models::User;

pub const TOKEN_KEY: &str = "user_token";
pub const USER_KEY: &str = "user_data";

/// Opaque key-value secret storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CredentialError>;
}

/// Thin wrapper around the OS keyring.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub const SERVICE: &'static str = "evergain";

    pub fn new() -> Self {
        Self::with_service(Self::SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entry = keyring::Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Token + user profile persistence on top of any [`CredentialStore`].
pub struct AuthVault<'a> {
    store: &'a dyn CredentialStore,
}

impl<'a> AuthVault<'a> {
    pub fn new(store: &'a dyn CredentialStore) -> Self {
        Self { store }
    }

    pub fn save(&self, token: &str, user: &User) -> Result<(), CredentialError> {
        let json = serde_json::to_string(user).map_err(|e| CredentialError::Malformed {
            key: USER_KEY.into(),
            message: e.to_string(),
        })?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &json)?;
        Ok(())
    }

    pub fn token(&self) -> Result<Option<String>, CredentialError> {
        self.store.get(TOKEN_KEY)
    }

    /// The stored user, or `None` when absent or unreadable.
    pub fn user(&self) -> Result<Option<User>, CredentialError> {
        let Some(json) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "stored user profile is malformed; treating as signed out");
                Ok(None)
            }
        }
    }

    /// A signed-in user requires both a token and a readable profile.
    pub fn signed_in_user(&self) -> Result<Option<User>, CredentialError> {
        if self.token()?.is_none() {
            return Ok(None);
        }
        self.user()
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        self.store.delete(TOKEN_KEY)?;
        self.store.delete(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u-1".into(),
            email: "lifter@example.com".into(),
            full_name: "Test Lifter".into(),
            created_at: None,
        }
    }

    #[test]
    fn memory_store_get_set_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn vault_roundtrip_and_clear() {
        let store = MemoryStore::new();
        let vault = AuthVault::new(&store);
        vault.save("jwt-token", &user()).unwrap();
        assert_eq!(vault.token().unwrap().as_deref(), Some("jwt-token"));
        assert_eq!(vault.signed_in_user().unwrap(), Some(user()));

        vault.clear().unwrap();
        assert_eq!(vault.token().unwrap(), None);
        assert_eq!(vault.signed_in_user().unwrap(), None);
    }

    #[test]
    fn user_without_token_is_signed_out() {
        let store = MemoryStore::new();
        store
            .set(USER_KEY, &serde_json::to_string(&user()).unwrap())
            .unwrap();
        let vault = AuthVault::new(&store);
        assert!(vault.user().unwrap().is_some());
        assert_eq!(vault.signed_in_user().unwrap(), None);
    }

    #[test]
    fn malformed_profile_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "t").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        let vault = AuthVault::new(&store);
        assert_eq!(vault.signed_in_user().unwrap(), None);
    }
}
