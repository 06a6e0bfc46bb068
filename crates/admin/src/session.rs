//! Session store: one token per role, persisted across restarts.
//!
//! The store never validates tokens. Callers check [`Session::has_token`]
//! before triggering work that needs one; a stale or empty token is only
//! discovered when the backend rejects the request.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinic_admin_core::Role;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Errors reading or writing the durable token storage.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Tokens for both roles. An empty token means the role is signed out.
///
/// Each role also carries a revision, bumped every time its token changes
/// value. Revisions are not persisted.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone)]
pub struct Session {
    admin: SecretString,
    doctor: SecretString,
    admin_revision: u64,
    doctor_revision: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("admin", &"[REDACTED]")
            .field("doctor", &"[REDACTED]")
            .field("admin_revision", &self.admin_revision)
            .field("doctor_revision", &self.doctor_revision)
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_tokens(SecretString::from(""), SecretString::from(""))
    }
}

impl Session {
    fn with_tokens(admin: SecretString, doctor: SecretString) -> Self {
        Self {
            admin,
            doctor,
            admin_revision: 0,
            doctor_revision: 0,
        }
    }

    /// The token held for a role; empty when signed out.
    #[must_use]
    pub const fn token(&self, role: Role) -> &SecretString {
        match role {
            Role::Admin => &self.admin,
            Role::Doctor => &self.doctor,
        }
    }

    /// Whether a non-empty token is held for the role.
    #[must_use]
    pub fn has_token(&self, role: Role) -> bool {
        !self.token(role).expose_secret().is_empty()
    }

    /// True iff at least one role holds a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        Role::ALL.iter().any(|role| self.has_token(*role))
    }

    /// How many times the role's token has changed value in this process.
    #[must_use]
    pub const fn revision(&self, role: Role) -> u64 {
        match role {
            Role::Admin => self.admin_revision,
            Role::Doctor => self.doctor_revision,
        }
    }

    /// Replace a role's token; false when the value is unchanged.
    fn replace_token(&mut self, role: Role, token: SecretString) -> bool {
        let (slot, revision) = match role {
            Role::Admin => (&mut self.admin, &mut self.admin_revision),
            Role::Doctor => (&mut self.doctor, &mut self.doctor_revision),
        };
        if slot.expose_secret() == token.expose_secret() {
            return false;
        }
        *slot = token;
        *revision = revision.wrapping_add(1);
        true
    }
}

/// On-disk shape, keyed by the fixed storage keys.
#[derive(Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "aToken", default)]
    admin: String,
    #[serde(rename = "dToken", default)]
    doctor: String,
}

/// Durable token storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Session, SessionError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        let stored: StoredTokens =
            serde_json::from_slice(&raw).map_err(|source| SessionError::Corrupt {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(Session::with_tokens(
            SecretString::from(stored.admin),
            SecretString::from(stored.doctor),
        ))
    }

    /// Persist the session, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the file cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let stored = StoredTokens {
            admin: session.admin.expose_secret().to_string(),
            doctor: session.doctor.expose_secret().to_string(),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(|source| SessionError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Shared session store.
///
/// Cheap to clone; clones observe and update the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    sender: watch::Sender<Session>,
    storage: Option<TokenStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.inner.storage)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Restore the session from durable storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the storage cannot be read.
    #[instrument(skip(storage), fields(path = %storage.path().display()))]
    pub async fn load(storage: TokenStorage) -> Result<Self, SessionError> {
        let session = storage.load().await?;
        debug!(
            admin = session.has_token(Role::Admin),
            doctor = session.has_token(Role::Doctor),
            "Session restored"
        );
        Ok(Self::build(session, Some(storage)))
    }

    /// A store that is never persisted.
    #[must_use]
    pub fn in_memory(session: Session) -> Self {
        Self::build(session, None)
    }

    fn build(session: Session, storage: Option<TokenStorage>) -> Self {
        let (sender, _) = watch::channel(session);
        Self {
            inner: Arc::new(SessionStoreInner { sender, storage }),
        }
    }

    /// Current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.sender.borrow().clone()
    }

    /// The token currently held for a role; empty when signed out.
    #[must_use]
    pub fn token(&self, role: Role) -> SecretString {
        self.inner.sender.borrow().token(role).clone()
    }

    /// Receiver notified whenever a token changes value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.sender.subscribe()
    }

    /// Store a role's token and persist the session.
    ///
    /// Subscribers are notified only when the value actually changes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if persisting fails. The in-memory session is
    /// updated regardless.
    #[instrument(skip(self, token), fields(role = %role))]
    pub async fn set_token(&self, role: Role, token: SecretString) -> Result<(), SessionError> {
        let changed = self
            .inner
            .sender
            .send_if_modified(|session| session.replace_token(role, token));
        debug!(changed, "Token stored");
        self.persist().await
    }

    /// Sign a role out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if persisting fails.
    pub async fn clear(&self, role: Role) -> Result<(), SessionError> {
        self.set_token(role, SecretString::from("")).await
    }

    async fn persist(&self) -> Result<(), SessionError> {
        match &self.inner.storage {
            Some(storage) => storage.save(&self.snapshot()).await,
            None => Ok(()),
        }
    }
}

/// Fires once per non-empty token value a role takes on.
///
/// Used to re-fetch a role's resources when its token appears or changes,
/// including the first observation of a token restored at startup. Signing
/// out and back in with the same token fires again.
///
/// The trigger keys on the session's per-role revision rather than the
/// token text. A watch receiver only sees the latest session, so a sign-out
/// and sign-in that both land while a fetch is running show up as the same
/// token with a newer revision.
#[derive(Debug, Clone, Copy)]
pub struct TokenTrigger {
    role: Role,
    fired: Option<u64>,
}

impl TokenTrigger {
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self { role, fired: None }
    }

    /// Record the latest session; true when dependent fetches should run.
    pub fn observe(&mut self, session: &Session) -> bool {
        if !session.has_token(self.role) {
            self.fired = None;
            return false;
        }
        let revision = session.revision(self.role);
        if self.fired == Some(revision) {
            return false;
        }
        self.fired = Some(revision);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value)
    }

    #[test]
    fn test_empty_session_is_not_authenticated() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(!session.has_token(Role::Admin));
        assert_eq!(session.token(Role::Doctor).expose_secret(), "");
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let store =
            SessionStore::in_memory(Session::with_tokens(secret("admin-jwt-value"), secret("")));
        let debug_output = format!("{:?}", store.snapshot());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("admin-jwt-value"));
    }

    #[tokio::test]
    async fn test_tokens_are_independent_per_role() {
        let store = SessionStore::in_memory(Session::default());
        store.set_token(Role::Doctor, secret("doc")).await.unwrap();

        let session = store.snapshot();
        assert!(session.is_authenticated());
        assert!(session.has_token(Role::Doctor));
        assert!(!session.has_token(Role::Admin));

        store.clear(Role::Doctor).await.unwrap();
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_only() {
        let store = SessionStore::in_memory(Session::default());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.set_token(Role::Admin, secret("a")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();

        store.set_token(Role::Admin, secret("a")).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_storage_round_trip_uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let storage = TokenStorage::new(&path);

        let store = SessionStore::load(storage.clone()).await.unwrap();
        assert!(!store.snapshot().is_authenticated());

        store.set_token(Role::Admin, secret("tok-a")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["aToken"], "tok-a");
        assert_eq!(raw["dToken"], "");

        let restored = SessionStore::load(storage).await.unwrap();
        assert_eq!(restored.token(Role::Admin).expose_secret(), "tok-a");
    }

    #[tokio::test]
    async fn test_corrupt_storage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let result = TokenStorage::new(&path).load().await;
        assert!(matches!(result, Err(SessionError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_trigger_fires_once_per_distinct_token() {
        let store = SessionStore::in_memory(Session::default());
        let mut trigger = TokenTrigger::new(Role::Admin);
        assert!(!trigger.observe(&store.snapshot()));

        store.set_token(Role::Admin, secret("t1")).await.unwrap();
        assert!(trigger.observe(&store.snapshot()));
        store.set_token(Role::Admin, secret("t1")).await.unwrap();
        assert!(!trigger.observe(&store.snapshot()));

        store.set_token(Role::Admin, secret("t2")).await.unwrap();
        assert!(trigger.observe(&store.snapshot()));
        store.clear(Role::Admin).await.unwrap();
        assert!(!trigger.observe(&store.snapshot()));
        store.set_token(Role::Admin, secret("t2")).await.unwrap();
        assert!(trigger.observe(&store.snapshot()));
    }

    #[tokio::test]
    async fn test_trigger_fires_after_coalesced_sign_out_and_in() {
        let store = SessionStore::in_memory(Session::default());
        let mut rx = store.subscribe();
        let mut trigger = TokenTrigger::new(Role::Admin);

        store.set_token(Role::Admin, secret("t1")).await.unwrap();
        assert!(trigger.observe(&rx.borrow_and_update()));

        store.clear(Role::Admin).await.unwrap();
        store.set_token(Role::Admin, secret("t1")).await.unwrap();

        assert!(rx.has_changed().unwrap());
        let session = rx.borrow_and_update().clone();
        assert_eq!(session.token(Role::Admin).expose_secret(), "t1");
        assert_eq!(session.revision(Role::Admin), 3);
        assert!(trigger.observe(&session));
        assert!(!trigger.observe(&session));
    }

    #[tokio::test]
    async fn test_trigger_ignores_other_role() {
        let store = SessionStore::in_memory(Session::default());
        let mut trigger = TokenTrigger::new(Role::Doctor);

        store.set_token(Role::Admin, secret("a")).await.unwrap();
        assert!(!trigger.observe(&store.snapshot()));

        store.set_token(Role::Doctor, secret("d")).await.unwrap();
        assert!(trigger.observe(&store.snapshot()));
        store.set_token(Role::Admin, secret("b")).await.unwrap();
        assert!(!trigger.observe(&store.snapshot()));
    }
}
