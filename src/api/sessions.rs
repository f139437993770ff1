//! In-process session registry.
//!
//! Stands in for container-managed sessions: the local artifact that the
//! liveness check invalidates when the shared SSO entry disappears.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::principal::Principal;

/// Name of the local session cookie.
pub const SESSION_COOKIE_NAME: &str = "ensaluto_session";

/// Registry of local sessions keyed by an opaque session id.
///
/// Only a hash of the id is kept, so a dump of process memory never shows
/// the raw cookie values.
#[derive(Debug, Clone, Default)]
pub struct LocalSessions {
    inner: Arc<Mutex<HashMap<Vec<u8>, Principal>>>,
}

/// Hash a session id for use as the registry key.
fn hash_session_id(id: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.finalize().to_vec()
}

impl LocalSessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `principal`, returning the new session id. The
    /// raw id only goes to the cookie; the registry stores its hash.
    #[must_use]
    pub fn create(&self, principal: Principal) -> String {
        let id = Uuid::new_v4().to_string();
        if let Ok(mut sessions) = self.inner.lock() {
            sessions.insert(hash_session_id(&id), principal);
        }
        id
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<Principal> {
        self.inner.lock().ok()?.get(&hash_session_id(id)).cloned()
    }

    /// Drop the session; unknown ids are ignored.
    pub fn invalidate(&self, id: &str) {
        if let Ok(mut sessions) = self.inner.lock() {
            sessions.remove(&hash_session_id(id));
        }
    }
}
