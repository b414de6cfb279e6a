//! Key provider trait and implementations.
//!
//! This module defines the [`KeyProvider`] trait for resolving shared secrets
//! from key identifiers, along with a [`StaticKeyProvider`] for tests and
//! single-tenant deployments.

use std::collections::HashMap;
use std::fmt;

use hmacsign_core::KeyId;

use crate::error::AuthError;

/// Trait for looking up shared secrets by key identifier.
pub trait KeyProvider: Send + Sync {
    /// Retrieve the secret for the given key identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownKey`] if the key identifier is not recognized.
    fn get_secret(&self, key_id: &KeyId) -> Result<Vec<u8>, AuthError>;
}

/// An in-memory key provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use hmacsign_auth::keys::{KeyProvider, StaticKeyProvider};
/// use hmacsign_core::KeyId;
///
/// let provider = StaticKeyProvider::new(vec![("app".to_owned(), "s3cr3t".to_owned())]);
///
/// let secret = provider.get_secret(&KeyId::new("app")).unwrap();
/// assert_eq!(secret, b"s3cr3t");
/// ```
#[derive(Clone)]
pub struct StaticKeyProvider {
    keys: HashMap<String, Vec<u8>>,
}

impl StaticKeyProvider {
    /// Create a provider from an iterable of (key_id, secret) pairs.
    pub fn new(keys: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(id, secret)| (id, secret.into_bytes()))
                .collect(),
        }
    }
}

impl fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeyProvider")
            .field("key_ids", &self.keys.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl KeyProvider for StaticKeyProvider {
    fn get_secret(&self, key_id: &KeyId) -> Result<Vec<u8>, AuthError> {
        self.keys
            .get(key_id.as_str())
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(key_id.to_string()))
    }
}
