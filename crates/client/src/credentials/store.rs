//! Single source of truth for the current authentication credential.

use parking_lot::RwLock;
use tracing::{debug, info};

use super::substrate::CredentialSubstrate;
use super::types::{Credential, UserIdentity};

/// Owns the credential and keeps every substrate in sync with it.
///
/// Substrate writes happen while the in-memory write lock is held, so a
/// concurrent reader can never observe one substrate on the new value and
/// another on the old one. No operation here fails observably: substrate
/// trouble degrades to a logged warning inside the substrate itself.
pub struct CredentialStore {
    current: RwLock<Credential>,
    substrates: Vec<Box<dyn CredentialSubstrate>>,
}

impl CredentialStore {
    pub fn new(substrates: Vec<Box<dyn CredentialSubstrate>>) -> Self {
        Self {
            current: RwLock::new(Credential::empty()),
            substrates,
        }
    }

    /// Restore a persisted session at startup, if any substrate has one.
    ///
    /// The first substrate that returns a credential wins (registration
    /// order: state file before cookie jar, since only the file carries the
    /// user identity); the result is fanned back out so both substrates
    /// agree again.
    pub fn rehydrate(&self) -> bool {
        let restored = self.substrates.iter().find_map(|s| s.load());

        match restored {
            Some(credential) => {
                debug!(
                    user = ?credential.user.as_ref().map(|u| u.email.as_str()),
                    "Restored persisted session"
                );
                let mut current = self.current.write();
                for substrate in &self.substrates {
                    substrate.persist(&credential);
                }
                *current = credential;
                true
            }
            None => false,
        }
    }

    /// Current credential snapshot. Never blocks on I/O.
    pub fn get(&self) -> Credential {
        self.current.read().clone()
    }

    #[inline]
    pub fn authenticated(&self) -> bool {
        self.current.read().authenticated()
    }

    /// Store a freshly issued credential (login or full rotation).
    pub fn set(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        user: Option<UserIdentity>,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) {
        let credential = Credential {
            access_token: Some(access_token),
            refresh_token,
            user,
            expires_at,
        };

        let mut current = self.current.write();
        for substrate in &self.substrates {
            substrate.persist(&credential);
        }
        *current = credential;
    }

    /// Replace the access token after a refresh.
    ///
    /// The user identity stays untouched; the refresh token is replaced only
    /// when the backend rotated it (rotation is optional on this backend).
    pub fn update_access_token(&self, access_token: String, new_refresh_token: Option<String>) {
        let mut current = self.current.write();
        current.access_token = Some(access_token);
        if let Some(refresh) = new_refresh_token {
            current.refresh_token = Some(refresh);
        }
        for substrate in &self.substrates {
            substrate.persist(&current);
        }
    }

    /// Drop the credential everywhere. Safe to call when already empty.
    pub fn clear(&self) {
        let mut current = self.current.write();
        if current.authenticated() {
            info!("Clearing stored session");
        }
        for substrate in &self.substrates {
            substrate.clear();
        }
        *current = Credential::empty();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::credentials::types::Role;

    /// Spy substrate recording every persisted snapshot.
    struct SpySubstrate {
        persisted: Mutex<Vec<Credential>>,
        clear_calls: AtomicUsize,
        stored: Mutex<Option<Credential>>,
    }

    impl SpySubstrate {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                persisted: Mutex::new(Vec::new()),
                clear_calls: AtomicUsize::new(0),
                stored: Mutex::new(None),
            })
        }
    }

    impl CredentialSubstrate for Arc<SpySubstrate> {
        fn persist(&self, credential: &Credential) {
            self.persisted.lock().push(credential.clone());
            *self.stored.lock() = Some(credential.clone());
        }

        fn clear(&self) {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            *self.stored.lock() = None;
        }

        fn load(&self) -> Option<Credential> {
            self.stored.lock().clone()
        }
    }

    fn user() -> UserIdentity {
        UserIdentity {
            id: "u-1".into(),
            email: "admin@example.com".into(),
            display_name: "Admin".into(),
            role: Role::Admin,
        }
    }

    fn store_with_spies() -> (CredentialStore, Arc<SpySubstrate>, Arc<SpySubstrate>) {
        let a = SpySubstrate::new();
        let b = SpySubstrate::new();
        let store = CredentialStore::new(vec![Box::new(Arc::clone(&a)), Box::new(Arc::clone(&b))]);
        (store, a, b)
    }

    #[test]
    fn set_fans_out_to_every_substrate() {
        let (store, a, b) = store_with_spies();

        store.set("tok".into(), Some("ref".into()), Some(user()), None);

        assert!(store.authenticated());
        assert_eq!(a.persisted.lock().len(), 1);
        assert_eq!(b.persisted.lock().len(), 1);
        assert_eq!(store.get().bearer(), Some("tok"));
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, a, _) = store_with_spies();
        store.set("tok".into(), Some("ref".into()), None, None);

        store.clear();
        let snapshot_once = store.get();

        store.clear();
        let snapshot_twice = store.get();

        assert_eq!(snapshot_once, snapshot_twice);
        assert_eq!(snapshot_twice, Credential::empty());
        assert_eq!(a.clear_calls.load(Ordering::SeqCst), 2);
        assert!(!store.authenticated());
    }

    #[test]
    fn update_access_token_keeps_identity_and_refresh() {
        let (store, _, _) = store_with_spies();
        store.set("old".into(), Some("ref".into()), Some(user()), None);

        store.update_access_token("new".into(), None);

        let cred = store.get();
        assert_eq!(cred.bearer(), Some("new"));
        assert_eq!(cred.refresh_token.as_deref(), Some("ref"));
        assert_eq!(cred.user.unwrap().email, "admin@example.com");
    }

    #[test]
    fn update_access_token_applies_rotation_when_present() {
        let (store, _, _) = store_with_spies();
        store.set("old".into(), Some("ref-1".into()), None, None);

        store.update_access_token("new".into(), Some("ref-2".into()));

        assert_eq!(store.get().refresh_token.as_deref(), Some("ref-2"));
    }

    #[test]
    fn rehydrate_prefers_first_substrate_and_resyncs() {
        let (store, a, b) = store_with_spies();

        // Seed only the first substrate (the state file in production wiring).
        a.persist(&Credential {
            access_token: Some("persisted".into()),
            refresh_token: Some("ref".into()),
            user: Some(user()),
            expires_at: None,
        });
        a.persisted.lock().clear();

        assert!(store.rehydrate());
        assert_eq!(store.get().bearer(), Some("persisted"));
        // Both substrates were re-synced from the restored value.
        assert_eq!(a.persisted.lock().len(), 1);
        assert_eq!(b.persisted.lock().len(), 1);
    }

    #[test]
    fn rehydrate_without_persisted_session_is_a_noop() {
        let (store, _, _) = store_with_spies();
        assert!(!store.rehydrate());
        assert!(!store.authenticated());
    }
}
