//! Auth session store.
//!
//! The store owns the only mutable copy of the [`Session`]. It is published
//! through a `watch` channel and replaced as a whole, so readers and
//! subscribers never observe a half-updated session.

use std::sync::Arc;

use eportal_types::{Credentials, LoginRequest, Permissions, Session, UpdateProfileRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{AuthBackend, AuthError, AuthResult};
use crate::credentials::{CredentialStore, StoredCredentials, mask_token};

pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    credentials: Arc<dyn CredentialStore>,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Creates the store, rehydrating from `credentials` once.
    ///
    /// Expired or unreadable credentials yield an anonymous session; expired
    /// ones are also cleared.
    pub fn new(backend: Arc<dyn AuthBackend>, credentials: Arc<dyn CredentialStore>) -> Self {
        let initial = rehydrate(credentials.as_ref());
        let (tx, _rx) = watch::channel(initial);
        Self {
            backend,
            credentials,
            tx,
        }
    }

    /// Authenticates against the backend and replaces the session.
    ///
    /// On failure the current session is left untouched and subscribers are
    /// not notified.
    ///
    /// # Errors
    /// The classified backend failure.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        let request = LoginRequest {
            username: credentials.national_id.clone(),
            password: credentials.password.clone(),
        };

        let data = match self.backend.login(&request).await {
            Ok(data) => data,
            Err(err) => {
                info!(national_id = %credentials.national_id, error = %err, "login failed");
                return Err(err);
            }
        };

        let stored = StoredCredentials::new(
            data.user(&credentials.national_id),
            data.permissions(),
            data.token,
        );
        if let Err(e) = self.credentials.save(&stored) {
            warn!("Failed to persist session: {e:#}");
        }

        let session = stored.into_session();
        self.tx.send_replace(session.clone());
        info!(
            national_id = %credentials.national_id,
            permissions = session.permissions().len(),
            "logged in"
        );
        Ok(session)
    }

    /// Clears the session. Never fails; storage problems are logged.
    pub fn logout(&self) {
        self.clear_persisted();
        self.tx.send_replace(Session::anonymous());
        info!("logged out");
    }

    /// Drops the session because the backend no longer accepts it.
    pub fn expire(&self) {
        self.clear_persisted();
        self.tx.send_replace(Session::anonymous());
        warn!("session expired");
    }

    pub fn get_session(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Re-reads the signed-in user from the backend.
    ///
    /// A 401 expires the session. Other failures leave it as is. If the
    /// session changed while the request was in flight, the answer is dropped.
    ///
    /// # Errors
    /// The classified backend failure.
    pub async fn refresh_current_user(&self) -> AuthResult<Session> {
        let Some(token) = self.get_session().token().map(str::to_owned) else {
            return Ok(Session::anonymous());
        };
        debug!(token = %mask_token(&token), "refreshing current user");

        let current = match self.backend.current_user(&token).await {
            Ok(current) => current,
            Err(AuthError::InvalidCredentials) => {
                self.expire_if_current(&token);
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };

        let mut updated = None;
        self.tx.send_if_modified(|session| {
            if session.token() != Some(token.as_str()) {
                return false;
            }
            let permissions = if current.permissions.is_empty() {
                session.permissions().clone()
            } else {
                Permissions::from_matrix(&current.permissions)
            };
            let next = Session::authenticated(current.user(), permissions, token.clone());
            if *session == next {
                updated = Some(next);
                return false;
            }
            *session = next.clone();
            updated = Some(next);
            true
        });

        match updated {
            Some(session) => {
                self.persist(&session);
                Ok(session)
            }
            None => Ok(self.get_session()),
        }
    }

    /// Sends a profile update for the signed-in user and republishes the
    /// session with the new name.
    ///
    /// A 401 expires the session. If the session changed while the request
    /// was in flight, the new name is not applied.
    ///
    /// # Errors
    /// `NotAuthenticated` without a session, otherwise the classified backend
    /// failure.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> AuthResult<String> {
        let Some(token) = self.get_session().token().map(str::to_owned) else {
            return Err(AuthError::NotAuthenticated);
        };

        let message = match self.backend.update_profile(&token, request).await {
            Ok(message) => message,
            Err(AuthError::InvalidCredentials) => {
                self.expire_if_current(&token);
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                info!(error = %err, "profile update failed");
                return Err(err);
            }
        };

        let name = request.name.trim().to_string();
        let mut updated = None;
        self.tx.send_if_modified(|session| {
            let Some(auth) = session.auth() else {
                return false;
            };
            if auth.token != token || auth.user.name.as_deref() == Some(name.as_str()) {
                return false;
            }
            let user = auth.user.clone().with_name(name.clone());
            let next = Session::authenticated(user, auth.permissions.clone(), token.clone());
            *session = next.clone();
            updated = Some(next);
            true
        });
        if let Some(session) = updated {
            self.persist(&session);
        }

        info!(password_changed = request.new_password.is_some(), "profile updated");
        Ok(message)
    }

    /// Expires the session if it still carries `token`.
    fn expire_if_current(&self, token: &str) {
        let expired = self.tx.send_if_modified(|session| {
            if session.token() == Some(token) {
                *session = Session::anonymous();
                true
            } else {
                false
            }
        });
        if expired {
            self.clear_persisted();
            warn!("session expired");
        }
    }

    fn persist(&self, session: &Session) {
        if let Some(stored) = StoredCredentials::from_session(session)
            && let Err(e) = self.credentials.save(&stored)
        {
            warn!("Failed to persist session: {e:#}");
        }
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!("Failed to clear persisted session: {e:#}");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}

fn rehydrate(store: &dyn CredentialStore) -> Session {
    match store.load() {
        Ok(Some(stored)) if stored.is_expired() => {
            info!("persisted session has expired");
            if let Err(e) = store.clear() {
                warn!("Failed to clear expired session: {e:#}");
            }
            Session::anonymous()
        }
        Ok(Some(stored)) => {
            debug!(token = %mask_token(&stored.auth.token), "session rehydrated");
            stored.into_session()
        }
        Ok(None) => Session::anonymous(),
        Err(e) => {
            warn!("Ignoring unreadable persisted session: {e:#}");
            Session::anonymous()
        }
    }
}
