//! Session store: the signed-in user and their bearer token.
//!
//! The user and token travel together as one [`AuthSession`], so observers
//! never see one without the other. The backend decides whether a session is
//! valid: hydration always re-validates the stored token, and a failed
//! re-validation ends the session according to the [`RefreshPolicy`].

use std::sync::Arc;

use cartwheel_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, StoreApi};
use crate::config::RefreshPolicy;
use crate::error::{Error, Result, ValidationError, require};
use crate::models::{AuthSession, BearerToken, ProfileUpdate, Registration, User};
use crate::storage::{MirroredStore, keys};

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Signed-in user and token, if any.
    pub session: Option<AuthSession>,
    /// True until the first hydration finishes.
    pub loading: bool,
}

impl SessionState {
    const fn initial() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

/// Owner of the user/token pair.
///
/// All mutations run under a single write lock and are persisted to every
/// storage mirror before they return.
pub struct SessionStore {
    api: Arc<dyn StoreApi>,
    storage: MirroredStore,
    policy: RefreshPolicy,
    state: watch::Sender<SessionState>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Create a signed-out store in the loading state.
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>, storage: MirroredStore, policy: RefreshPolicy) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            api,
            storage,
            policy,
            state,
            write_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch for state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Bearer token of the current session.
    #[must_use]
    pub fn token(&self) -> Option<BearerToken> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Profile of the current session.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().session.as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|s| s.user.is_admin())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the session from storage and re-validate it with the backend.
    ///
    /// A stored user without a usable token (or the reverse) is treated as no
    /// session and cleared. Loading ends when this returns, whatever the
    /// outcome.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        if let Some(stored) = self.read_stored().await {
            debug!(user_id = %stored.user.id, "Restored session from storage");
            self.state.send_modify(|s| s.session = Some(stored));
            self.refresh_profile(None).await;
        } else {
            debug!("No usable stored session");
            self.logout().await;
        }
        self.state.send_modify(|s| s.loading = false);
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, [`Error::Auth`] with
    /// the backend's message when the credentials are rejected, or the
    /// transport error. The session is untouched on failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthSession> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        require("password", password.expose_secret())?;

        let session = self.api.authenticate(&email, password).await?;

        let _guard = self.write_lock.lock().await;
        self.install(&session).await;
        info!(user_id = %session.user.id, role = %session.user.role, "Signed in");
        Ok(session)
    }

    /// Create a customer account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing fields, otherwise the backend's
    /// rejection (e.g. an email already in use) or the transport error.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        require("name", &registration.name)?;
        Email::parse(&registration.email).map_err(ValidationError::from)?;
        require("password", registration.password.expose_secret())?;

        let user = self.api.register(registration).await?;
        info!(user_id = %user.id, "Registered account");
        Ok(user)
    }

    /// Re-fetch the profile and overwrite the stored user.
    ///
    /// Uses `token_override` when given, otherwise the current token; does
    /// nothing without one. On success with an override, the override becomes
    /// the session token. Failures are logged and, depending on the refresh
    /// policy, end the session. They are never returned.
    ///
    /// A refresh that finishes after the session changed (a new login or a
    /// logout) is discarded.
    #[instrument(skip_all, fields(with_override = token_override.is_some()))]
    pub async fn refresh_profile(&self, token_override: Option<&BearerToken>) {
        let Some(token) = token_override.cloned().or_else(|| self.token()) else {
            debug!("No token, skipping profile refresh");
            return;
        };

        let result = self.api.fetch_profile(&token).await;

        let _guard = self.write_lock.lock().await;
        let still_current = token_override.is_some() || self.token().as_ref() == Some(&token);
        if !still_current {
            debug!("Session changed during profile refresh, discarding result");
            return;
        }

        match result {
            Ok(user) => {
                debug!(user_id = %user.id, "Refreshed profile");
                self.install(&AuthSession { user, token }).await;
            }
            Err(e) if ends_session(self.policy, &e) => {
                warn!(error = %e, "Profile refresh failed, signing out");
                self.clear().await;
            }
            Err(e) => {
                warn!(error = %e, "Profile refresh failed, keeping session");
            }
        }
    }

    /// Change the signed-in user's name, email, or password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] without a session, a validation
    /// error for missing fields, or the backend's rejection. A 401 also ends
    /// the session.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let token = self.token().ok_or(Error::NotAuthenticated)?;
        require("name", &update.name)?;
        Email::parse(&update.email).map_err(ValidationError::from)?;
        if let Some(password) = &update.password {
            require("password", password.expose_secret())?;
        }

        let user = match self.api.update_profile(&token, update).await {
            Ok(user) => user,
            Err(e) => return Err(self.handle_mutation_error(&token, e).await),
        };

        let _guard = self.write_lock.lock().await;
        if self.token().as_ref() == Some(&token) {
            self.install(&AuthSession {
                user: user.clone(),
                token,
            })
            .await;
            info!(user_id = %user.id, "Updated profile");
        }
        Ok(user)
    }

    /// Delete the signed-in account, then sign out.
    ///
    /// Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] without a session, or the backend's
    /// rejection (admins cannot delete their own account this way). A 401
    /// also ends the session.
    #[instrument(skip_all)]
    pub async fn delete_account(&self) -> Result<String> {
        let token = self.token().ok_or(Error::NotAuthenticated)?;

        match self.api.delete_account(&token).await {
            Ok(message) => {
                info!("Deleted account");
                self.logout().await;
                Ok(message)
            }
            Err(e) => Err(self.handle_mutation_error(&token, e).await),
        }
    }

    /// Clear the session in memory and in every mirror. Idempotent.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _guard = self.write_lock.lock().await;
        self.clear().await;
    }

    // =========================================================================
    // Internals (callers hold the write lock)
    // =========================================================================

    async fn install(&self, session: &AuthSession) {
        self.state
            .send_modify(|s| s.session = Some(session.clone()));
        self.storage.write_json(keys::USER, &session.user).await;
        self.storage
            .write(keys::TOKEN, session.token.expose())
            .await;
    }

    async fn clear(&self) {
        let was_signed_in = self.state.send_if_modified(|s| s.session.take().is_some());
        self.storage.remove(&[keys::USER, keys::TOKEN]).await;
        if was_signed_in {
            info!("Signed out");
        }
    }

    async fn read_stored(&self) -> Option<AuthSession> {
        let [user, token] = self.storage.read_group([keys::USER, keys::TOKEN]).await;
        let user = match serde_json::from_str::<User>(&user?) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Stored user is malformed");
                return None;
            }
        };
        let token = BearerToken::parse(&token?)?;
        Some(AuthSession { user, token })
    }

    async fn handle_mutation_error(&self, token: &BearerToken, err: ApiError) -> Error {
        if matches!(err, ApiError::Unauthorized(_)) {
            let _guard = self.write_lock.lock().await;
            if self.token().as_ref() == Some(token) {
                warn!("Token rejected, signing out");
                self.clear().await;
            }
        }
        err.into()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .field("policy", &self.policy)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

const fn ends_session(policy: RefreshPolicy, err: &ApiError) -> bool {
    match policy {
        RefreshPolicy::AnyFailure => true,
        RefreshPolicy::AuthRejection => err.is_auth_rejection(),
    }
}
