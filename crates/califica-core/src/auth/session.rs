use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::DurableStorage;
use crate::models::{User, UserRole};

/// Storage key holding the persisted session envelope.
pub const SNAPSHOT_KEY: &str = "califica-auth-storage";

/// Storage key duplicating the bearer token for synchronous reads.
pub const TOKEN_KEY: &str = "token";

/// Version written into every snapshot. Snapshots with another version are discarded.
pub const SNAPSHOT_VERSION: u32 = 0;

/// The client's belief about the current user and credential.
///
/// `is_authenticated` is true exactly when both `user` and `token` are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
    #[serde(rename = "isAuthenticated", default)]
    is_authenticated: bool,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            is_authenticated: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.role() == Some(UserRole::Admin)
    }

    fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Restore the invariant on a session read from storage.
    ///
    /// A half-present session (token without user or the reverse) is dropped
    /// entirely so no later mutation can promote it to authenticated.
    fn normalized(self) -> Self {
        match (self.user, self.token) {
            (Some(user), Some(token)) => Self::authenticated(user, token),
            (user, token) => {
                if user.is_some() || token.is_some() {
                    warn!(
                        has_user = user.is_some(),
                        has_token = token.is_some(),
                        "Discarding partial persisted session"
                    );
                }
                Self::empty()
            }
        }
    }
}

/// The persisted envelope: `{"state": {...}, "version": 0}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: Session,
    #[serde(default)]
    pub version: u32,
}

struct Inner {
    session: Session,
    /// Set once any mutator runs; a late rehydration must not overwrite it.
    mutated: bool,
    rehydrated: bool,
}

/// Single source of truth for the current session.
///
/// Every mutation is persisted immediately. Rehydration from storage happens
/// once; callers that need the restored state await [`AuthStore::wait_rehydrated`].
pub struct AuthStore {
    storage: Arc<dyn DurableStorage>,
    inner: RwLock<Inner>,
    changes: watch::Sender<Session>,
    rehydrated: watch::Sender<bool>,
}

impl AuthStore {
    /// Create an empty store. Call [`AuthStore::rehydrate`] to restore state.
    pub fn new(storage: Arc<dyn DurableStorage>) -> Arc<Self> {
        let (changes, _) = watch::channel(Session::empty());
        let (rehydrated, _) = watch::channel(false);
        Arc::new(Self {
            storage,
            inner: RwLock::new(Inner {
                session: Session::empty(),
                mutated: false,
                rehydrated: false,
            }),
            changes,
            rehydrated,
        })
    }

    /// Create a store and start rehydrating it in the background.
    ///
    /// Inside a Tokio runtime the snapshot is loaded on the blocking pool and
    /// the store is usable immediately; outside one it is loaded inline.
    pub fn open(storage: Arc<dyn DurableStorage>) -> Arc<Self> {
        let store = Self::new(storage);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let background = Arc::clone(&store);
                handle.spawn_blocking(move || background.rehydrate());
            }
            Err(_) => store.rehydrate(),
        }
        store
    }

    /// Load the persisted snapshot once. Never fails: any problem with the
    /// snapshot leaves the store empty and unauthenticated.
    pub fn rehydrate(&self) {
        if self.is_rehydrated() {
            return;
        }

        let restored = self.load_snapshot();

        {
            let mut inner = self.write();
            if inner.rehydrated {
                return;
            }
            if inner.mutated {
                debug!("Session changed before rehydration finished, keeping live state");
            } else {
                inner.session = restored;
                if !inner.session.is_authenticated() {
                    // No bearer without a session
                    if let Err(e) = self.storage.remove(TOKEN_KEY) {
                        warn!(error = %e, "Failed to remove orphaned token");
                    }
                }
                self.changes.send_replace(inner.session.clone());
            }
            inner.rehydrated = true;
            info!(
                authenticated = inner.session.is_authenticated(),
                "Auth store rehydrated"
            );
        }

        self.rehydrated.send_replace(true);
    }

    pub fn is_rehydrated(&self) -> bool {
        self.read().rehydrated
    }

    /// Resolve once rehydration has completed.
    pub async fn wait_rehydrated(&self) {
        let mut rx = self.rehydrated.subscribe();
        // The sender lives as long as `self`, so this only returns on `true`
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Store the credential and mark the session authenticated.
    ///
    /// The token is not validated; login and register flows only call this
    /// with a non-empty token.
    pub fn set_auth(&self, user: User, token: String) {
        if let Err(e) = self.storage.set(TOKEN_KEY, &token) {
            warn!(error = %e, "Failed to write token key");
        }
        debug!(user_id = %user.id, role = %user.role, "Session authenticated");
        self.apply(|_| Session::authenticated(user, token));
    }

    /// Clear the credential and reset to an empty session. Idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove token key");
        }
        debug!("Session cleared");
        self.apply(|_| Session::empty());
    }

    /// Replace the user record only; the token and authenticated flag stay.
    pub fn update_user(&self, user: User) {
        self.apply(|session| session.with_user(user));
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.read().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.read().session.user().cloned()
    }

    /// Read the durable token key. This is what outgoing requests use.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read token key");
                None
            }
        }
    }

    /// Observe every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    fn apply(&self, f: impl FnOnce(Session) -> Session) {
        let mut inner = self.write();
        let current = std::mem::take(&mut inner.session);
        inner.session = f(current);
        inner.mutated = true;
        self.persist(&inner.session);
        self.changes.send_replace(inner.session.clone());
    }

    fn persist(&self, session: &Session) {
        let snapshot = Snapshot {
            state: session.clone(),
            version: SNAPSHOT_VERSION,
        };
        let result = serde_json::to_string(&snapshot)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.set(SNAPSHOT_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session snapshot");
        }
    }

    fn load_snapshot(&self) -> Session {
        let contents = match self.storage.get(SNAPSHOT_KEY) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("No persisted session");
                return Session::empty();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                return Session::empty();
            }
        };

        match serde_json::from_str::<Snapshot>(&contents) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => snapshot.state.normalized(),
            Ok(snapshot) => {
                warn!(version = snapshot.version, "Discarding session snapshot with unknown version");
                Session::empty()
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse persisted session");
                Session::empty()
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@uni.edu", id),
            name: format!("User {}", id),
            role,
            is_email_verified: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    fn store() -> (Arc<MemoryStorage>, Arc<AuthStore>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(storage.clone());
        store.rehydrate();
        (storage, store)
    }

    fn persisted(storage: &MemoryStorage) -> serde_json::Value {
        let json = storage.get(SNAPSHOT_KEY).unwrap().expect("snapshot written");
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_set_auth_writes_token_key() {
        let (storage, store) = store();
        store.set_auth(user("u1", UserRole::Student), "tok1".into());

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert_eq!(store.token().as_deref(), Some("tok1"));
        assert!(store.is_authenticated());

        let snapshot = persisted(&storage);
        assert_eq!(snapshot["version"], 0);
        assert_eq!(snapshot["state"]["token"], "tok1");
        assert_eq!(snapshot["state"]["isAuthenticated"], true);
        assert_eq!(snapshot["state"]["user"]["id"], "u1");
    }

    #[test]
    fn test_set_auth_then_logout_is_empty() {
        let (storage, store) = store();
        for i in 0..3 {
            store.set_auth(user(&format!("u{}", i), UserRole::Admin), format!("tok{}", i));
        }
        store.logout();

        assert_eq!(store.session(), Session::empty());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.token(), None);
        assert_eq!(persisted(&storage)["state"]["isAuthenticated"], false);

        // Idempotent
        store.logout();
        assert_eq!(store.session(), Session::empty());
    }

    #[test]
    fn test_update_user_only_touches_user() {
        let (_, store) = store();
        store.set_auth(user("u1", UserRole::Student), "tok1".into());

        let mut renamed = user("u1", UserRole::Student);
        renamed.name = "Ana María".into();
        store.update_user(renamed.clone());

        let session = store.session();
        assert_eq!(session.user(), Some(&renamed));
        assert_eq!(session.token(), Some("tok1"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_update_user_when_logged_out_stays_unauthenticated() {
        let (_, store) = store();
        store.update_user(user("u1", UserRole::Student));
        let session = store.session();
        assert!(session.user().is_some());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_rehydrate_restores_full_session() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let first = AuthStore::new(storage.clone());
            first.rehydrate();
            first.set_auth(user("u1", UserRole::Admin), "tok1".into());
        }

        let second = AuthStore::new(storage.clone());
        assert!(!second.is_authenticated());
        second.rehydrate();
        assert!(second.is_rehydrated());
        assert!(second.is_authenticated());
        assert!(second.session().is_admin());
    }

    #[test]
    fn test_rehydrate_guards_partial_state() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                SNAPSHOT_KEY,
                r#"{"state":{"user":null,"token":"tok-orphan","isAuthenticated":true},"version":0}"#,
            )
            .unwrap();

        let store = AuthStore::new(storage);
        store.rehydrate();
        assert!(!store.is_authenticated());
        assert_eq!(store.session(), Session::empty());

        // The orphaned token must not combine with a later user update
        store.update_user(user("u1", UserRole::Student));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_rehydrate_clears_orphaned_token_key() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                SNAPSHOT_KEY,
                r#"{"state":{"user":null,"token":"tok-orphan","isAuthenticated":true},"version":0}"#,
            )
            .unwrap();
        storage.set(TOKEN_KEY, "tok-orphan").unwrap();

        let store = AuthStore::new(storage.clone());
        store.rehydrate();
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_rehydrate_corrupt_snapshot_clears_token_key() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(SNAPSHOT_KEY, "{not json").unwrap();
        storage.set(TOKEN_KEY, "tok-stale").unwrap();

        let store = AuthStore::new(storage.clone());
        store.rehydrate();
        assert_eq!(store.session(), Session::empty());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_rehydrate_keeps_token_of_login_made_first() {
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(storage.clone());
        store.set_auth(user("u1", UserRole::Student), "tok-live".into());
        store.rehydrate();
        assert_eq!(store.token().as_deref(), Some("tok-live"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-live"));
    }

    #[test]
    fn test_rehydrate_recomputes_flag_when_false_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let snapshot = serde_json::json!({
            "state": {
                "user": {"id": "u1", "email": "a@b.c", "name": "A", "role": "student"},
                "token": "tok1",
                "isAuthenticated": false
            },
            "version": 0
        });
        storage.set(SNAPSHOT_KEY, &snapshot.to_string()).unwrap();

        let store = AuthStore::new(storage);
        store.rehydrate();
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_rehydrate_corrupt_or_foreign_snapshot_is_empty() {
        for contents in [
            "not json",
            r#"{"state":{"user":null}}"#,
            r#"{"state":{"token":"t","user":{"id":"u","email":"e","name":"n"}},"version":7}"#,
        ] {
            let storage = Arc::new(MemoryStorage::new());
            storage.set(SNAPSHOT_KEY, contents).unwrap();
            let store = AuthStore::new(storage);
            store.rehydrate();
            assert!(store.is_rehydrated());
            assert!(!store.is_authenticated(), "snapshot {:?}", contents);
        }
    }

    #[test]
    fn test_mutation_before_rehydration_wins() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let first = AuthStore::new(storage.clone());
            first.rehydrate();
            first.set_auth(user("old", UserRole::Student), "old-token".into());
        }

        let store = AuthStore::new(storage);
        store.logout();
        store.rehydrate();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_subscribe_sees_changes() {
        let (_, store) = store();
        let rx = store.subscribe();
        store.set_auth(user("u1", UserRole::Student), "tok1".into());
        assert!(rx.borrow().is_authenticated());
        store.logout();
        assert!(!rx.borrow().is_authenticated());
    }

    #[tokio::test]
    async fn test_open_signals_rehydrated() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                SNAPSHOT_KEY,
                r#"{"state":{"user":{"id":"u1","email":"e","name":"n","role":"admin"},"token":"t","isAuthenticated":true},"version":0}"#,
            )
            .unwrap();

        let store = AuthStore::open(storage);
        store.wait_rehydrated().await;
        assert!(store.is_rehydrated());
        assert!(store.session().is_admin());
    }
}
