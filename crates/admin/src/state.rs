//! Application state shared by every view.

use std::sync::Arc;

use clinic_admin_core::Role;
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::api::{BackendClient, LoginRequest};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::notify::Notifier;
use crate::session::{SessionStore, TokenStorage};
use crate::sync::{AdminSync, DoctorSync};
use crate::view::Layout;

/// Session, stores and actions for both roles, wired to one backend.
///
/// Cheap to clone; clones share everything.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: ClientConfig,
    client: BackendClient,
    session: SessionStore,
    notifier: Notifier,
    admin: AdminSync,
    doctor: DoctorSync,
}

impl AppState {
    /// Build the state, restoring the persisted session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or the session file
    /// cannot be read.
    pub async fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = BackendClient::new(&config)?;
        let session = SessionStore::load(TokenStorage::new(config.session_file.clone())).await?;
        Ok(Self::with_parts(config, client, session))
    }

    /// Build the state from already constructed parts.
    #[must_use]
    pub fn with_parts(config: ClientConfig, client: BackendClient, session: SessionStore) -> Self {
        let notifier = Notifier::new();
        let admin = AdminSync::new(client.clone(), session.clone(), notifier.clone());
        let doctor = DoctorSync::new(client.clone(), session.clone(), notifier.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                session,
                notifier,
                admin,
                doctor,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn admin(&self) -> &AdminSync {
        &self.inner.admin
    }

    #[must_use]
    pub fn doctor(&self) -> &DoctorSync {
        &self.inner.doctor
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::for_session(&self.inner.session.snapshot())
    }

    /// Sign a role in and store its token.
    ///
    /// A rejected login is also raised as an error notification.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the credentials, the request
    /// fails, or the token cannot be persisted.
    #[instrument(skip(self, credentials), fields(role = %role, email = %credentials.email))]
    pub async fn login(&self, role: Role, credentials: &LoginRequest) -> Result<(), Error> {
        let result = match role {
            Role::Admin => self.inner.client.admin_login(credentials).await,
            Role::Doctor => self.inner.client.doctor_login(credentials).await,
        };

        let token = match result {
            Ok(token) => token,
            Err(e) => {
                self.inner.notifier.error(e.user_message());
                return Err(e.into());
            }
        };

        self.inner
            .session
            .set_token(role, SecretString::from(token))
            .await?;
        info!("Signed in");
        Ok(())
    }

    /// Sign a role out, clearing its persisted token.
    ///
    /// # Errors
    ///
    /// Returns error if the session file cannot be written.
    #[instrument(skip(self), fields(role = %role))]
    pub async fn logout(&self, role: Role) -> Result<(), Error> {
        self.inner.session.clear(role).await?;
        info!("Signed out");
        Ok(())
    }
}
