//! Process-local shared-map SSO storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::SsoStorage;
use crate::auth::Authentication;
use crate::error::StoreError;
use crate::principal::Principal;

/// Concurrent in-process token store.
///
/// Safe for concurrent `find`/`store`/`remove` from request-handling tasks;
/// operations on the same token are linearized by the internal lock. State
/// is scoped to this process, so it provides SSO only across applications
/// mounted in the same process.
#[derive(Debug, Default)]
pub struct SharedMapSsoStorage {
    map: Mutex<HashMap<String, Principal>>,
}

impl SharedMapSsoStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, Principal>>, StoreError> {
        self.map
            .lock()
            .map_err(|_| StoreError::Corrupt("sso map lock poisoned".to_string()))
    }
}

impl SsoStorage for SharedMapSsoStorage {
    fn find(&self, token: &str) -> Result<Option<Principal>, StoreError> {
        Ok(self.guard()?.get(token).cloned())
    }

    fn store(&self, token: &str, auth: &Authentication) -> Result<(), StoreError> {
        if !auth.is_authenticated() {
            return Ok(());
        }
        let mut map = self.guard()?;
        if map.contains_key(token) {
            return Err(StoreError::DuplicateToken(token.to_string()));
        }
        map.insert(token.to_string(), auth.principal().clone());
        Ok(())
    }

    fn remove(&self, token: &str) -> Result<(), StoreError> {
        self.guard()?.remove(token);
        Ok(())
    }
}
