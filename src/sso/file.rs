//! File-backed SSO storage for development and single-process deployments.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::trace;

use super::SsoStorage;
use crate::auth::Authentication;
use crate::error::StoreError;
use crate::principal::Principal;

/// File name used under the platform temp directory by default.
const DEFAULT_FILE_NAME: &str = "ensaluto-logins";

/// Flat-file token store: one `token=snapshot` line per login, where the
/// snapshot is base64 of the JSON-serialized principal.
///
/// The whole file is read before every lookup and rewritten after every
/// mutation. Not safe under concurrent writers: deployments sharing the
/// file across processes must serialize access externally. Meant for
/// development and testing, not as a production consistency guarantee.
pub struct FileSsoStorage {
    path: PathBuf,
}

impl Default for FileSsoStorage {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join(DEFAULT_FILE_NAME),
        }
    }
}

impl FileSsoStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        let mut entries = BTreeMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((token, snapshot)) = line.split_once('=') {
                entries.insert(token.to_string(), snapshot.to_string());
            }
        }
        Ok(entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let mut out = String::from("# ensaluto logins\n");
        for (token, snapshot) in entries {
            out.push_str(token);
            out.push('=');
            out.push_str(snapshot);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }

    fn encode(principal: &Principal) -> Result<String, StoreError> {
        let bytes =
            serde_json::to_vec(principal).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }

    fn decode(snapshot: &str) -> Result<Principal, StoreError> {
        let bytes = STANDARD
            .decode(snapshot)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| StoreError::Corrupt(err.to_string()))
    }
}

impl SsoStorage for FileSsoStorage {
    fn find(&self, token: &str) -> Result<Option<Principal>, StoreError> {
        trace!("restoring logins from {}", self.path.display());
        let entries = self.load()?;
        entries.get(token).map(|snapshot| Self::decode(snapshot)).transpose()
    }

    fn store(&self, token: &str, auth: &Authentication) -> Result<(), StoreError> {
        if !auth.is_authenticated() {
            return Ok(());
        }
        trace!("storing login to {}", self.path.display());
        let mut entries = self.load()?;
        if entries.contains_key(token) {
            return Err(StoreError::DuplicateToken(token.to_string()));
        }
        entries.insert(token.to_string(), Self::encode(auth.principal())?);
        self.persist(&entries)
    }

    fn remove(&self, token: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(token).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileSsoStorage;
    use crate::auth::Authentication;
    use crate::error::StoreError;
    use crate::principal::Principal;
    use crate::sso::SsoStorage;
    use std::collections::BTreeSet;

    fn alice() -> Authentication {
        let principal = Principal::new(7, "alice")
            .with_names("Alice", "Q", "Smith")
            .with_email("alice@example.com")
            .with_groups(["A", "B"].iter().map(ToString::to_string).collect());
        Authentication::authenticated(principal, BTreeSet::new())
    }

    #[test]
    fn store_then_find_round_trips_the_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileSsoStorage::new(dir.path().join("logins"));

        storage.store("t1", &alice()).expect("store");
        let found = storage.find("t1").expect("find").expect("present");
        assert_eq!(&found, alice().principal());
    }

    #[test]
    fn snapshots_survive_a_new_storage_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logins");

        FileSsoStorage::new(&path).store("t1", &alice()).expect("store");
        let reopened = FileSsoStorage::new(&path);
        assert!(reopened.find("t1").expect("find").is_some());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileSsoStorage::new(dir.path().join("never-written"));
        assert!(storage.find("t1").expect("find").is_none());
    }

    #[test]
    fn remove_then_find_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileSsoStorage::new(dir.path().join("logins"));

        storage.store("t1", &alice()).expect("store");
        storage.remove("t1").expect("remove");
        assert!(storage.find("t1").expect("find").is_none());
        // removing again stays fine
        storage.remove("t1").expect("remove");
    }

    #[test]
    fn duplicate_store_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileSsoStorage::new(dir.path().join("logins"));

        storage.store("t1", &alice()).expect("store");
        assert!(matches!(
            storage.store("t1", &alice()),
            Err(StoreError::DuplicateToken(token)) if token == "t1"
        ));
    }

    #[test]
    fn unauthenticated_store_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileSsoStorage::new(dir.path().join("logins"));

        let auth = Authentication::unauthenticated(Principal::new(1, "alice"));
        storage.store("t1", &auth).expect("store");
        assert!(storage.find("t1").expect("find").is_none());
        assert!(!storage.path().exists());
    }

    #[test]
    fn comment_and_blank_lines_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logins");
        std::fs::write(&path, "# comment\n\n").expect("write");

        let storage = FileSsoStorage::new(&path);
        assert!(storage.find("t1").expect("find").is_none());
    }

    #[test]
    fn corrupt_snapshots_surface_as_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logins");
        std::fs::write(&path, "t1=!!not-base64!!\n").expect("write");

        let storage = FileSsoStorage::new(&path);
        assert!(matches!(storage.find("t1"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn default_location_is_under_the_temp_dir() {
        let storage = FileSsoStorage::default();
        assert!(storage.path().starts_with(std::env::temp_dir()));
    }
}
