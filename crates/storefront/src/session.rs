//! Login state and the admin/customer role switch.
//!
//! The session is persisted under [`keys::SESSION`] with the same discipline
//! as the cart: load on open, save after every change, and keep the in-memory
//! change when the save fails.

use lapak_core::{PhoneNumber, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError, AuthResponse};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Errors from login, registration and session persistence.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong phone number or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this phone number already exists.
    #[error("account already exists")]
    AccountExists,

    /// Display name is required for registration.
    #[error("name is required")]
    MissingName,

    /// The server returned a phone number we cannot parse.
    #[error("invalid phone number in profile: {0}")]
    InvalidProfile(#[from] lapak_core::PhoneError),

    /// The API request failed.
    #[error(transparent)]
    Api(ApiError),

    /// The session changed in memory but could not be saved.
    #[error("session not persisted: {0}")]
    Persistence(#[from] StorageError),
}

/// Who is using the app.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct Session {
    /// Which set of screens is active.
    pub role: Role,
    /// Display name from the profile; used as the customer name on orders.
    pub customer_name: Option<String>,
    /// Phone number of the logged-in account.
    pub phone: Option<PhoneNumber>,
    token: Option<SecretString>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("customer_name", &self.customer_name)
            .field("phone", &self.phone)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Session {
    /// Whether someone is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.phone.is_some()
    }

    /// Bearer token issued at login, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Name to put on an order: the profile name, else `fallback`.
    #[must_use]
    pub fn customer_name_or(&self, fallback: &str) -> String {
        self.customer_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Session for an authenticated user. `requested` is the phone the
    /// credentials were sent with; it stands in when the profile omits one.
    fn from_auth(auth: AuthResponse, requested: &PhoneNumber) -> Result<Self, AuthError> {
        let phone = if auth.user.phone.trim().is_empty() {
            requested.clone()
        } else {
            PhoneNumber::parse(&auth.user.phone)?
        };
        Ok(Self {
            role: auth.user.role,
            customer_name: Some(auth.user.name).filter(|n| !n.is_empty()),
            phone: Some(phone),
            token: auth.token.map(SecretString::from),
        })
    }
}

/// On-disk shape of a [`Session`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default)]
    role: Role,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    phone: Option<PhoneNumber>,
    #[serde(default)]
    token: Option<String>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            role: stored.role,
            customer_name: stored.customer_name,
            phone: stored.phone,
            token: stored.token.map(SecretString::from),
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            role: session.role,
            customer_name: session.customer_name.clone(),
            phone: session.phone.clone(),
            token: session.token.as_ref().map(|t| t.expose_secret().to_string()),
        }
    }
}

/// Persisted session with login, registration and role switching.
pub struct SessionStore<S> {
    storage: S,
    session: Session,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Hydrate the session from `storage`.
    ///
    /// A missing or unreadable value yields the default session; an
    /// unreadable one is returned alongside.
    #[instrument(skip(storage))]
    pub fn open(storage: S) -> (Self, Option<StorageError>) {
        let (session, problem) = match load(&storage) {
            Ok(session) => (session.unwrap_or_default(), None),
            Err(e) => {
                warn!(error = %e, "Failed to hydrate session, starting logged out");
                (Session::default(), Some(e))
            }
        };
        debug!(role = %session.role, logged_in = session.is_logged_in(), "Session loaded");
        (Self { storage, session }, problem)
    }

    /// The current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The active role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.session.role
    }

    /// Toggle between admin and customer. Returns the new role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Persistence`] if the change could not be saved;
    /// the role is switched regardless.
    #[instrument(skip(self), fields(from = %self.session.role))]
    pub fn switch_role(&mut self) -> Result<Role, AuthError> {
        self.session.role = self.session.role.toggled();
        info!(role = %self.session.role, "Role switched");
        self.save()?;
        Ok(self.session.role)
    }

    /// Log in and adopt the returned profile.
    ///
    /// On success the token, if any, is installed on `api`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the server rejects the
    /// phone/password pair.
    #[instrument(skip(self, api, password), fields(phone = %phone))]
    pub async fn login(
        &mut self,
        api: &ApiClient,
        phone: &PhoneNumber,
        password: &SecretString,
    ) -> Result<&Session, AuthError> {
        let auth = api.login(phone, password).await.map_err(|e| match e {
            ApiError::Unauthorized(_) | ApiError::NotFound(_) => AuthError::InvalidCredentials,
            other => AuthError::Api(other),
        })?;
        self.adopt(api, auth, phone)?;
        Ok(&self.session)
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingName`] before any request if `name` is
    /// blank, and [`AuthError::AccountExists`] if the phone is taken.
    #[instrument(skip(self, api, password), fields(phone = %phone))]
    pub async fn register(
        &mut self,
        api: &ApiClient,
        name: &str,
        phone: &PhoneNumber,
        password: &SecretString,
    ) -> Result<&Session, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let auth = api
            .register(name, phone, password)
            .await
            .map_err(|e| match e {
                ApiError::Status { status: 409, .. } => AuthError::AccountExists,
                other => AuthError::Api(other),
            })?;
        self.adopt(api, auth, phone)?;
        Ok(&self.session)
    }

    /// Return to the default logged-out customer session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Persistence`] if the change could not be saved;
    /// the session is reset regardless.
    #[instrument(skip(self, api))]
    pub fn logout(&mut self, api: &ApiClient) -> Result<(), AuthError> {
        self.session = Session::default();
        api.set_token(None);
        clear_sentry_user();
        info!("Logged out");
        self.storage.remove(keys::SESSION).inspect_err(|e| {
            warn!(error = %e, "Failed to remove stored session");
        })?;
        Ok(())
    }

    fn adopt(
        &mut self,
        api: &ApiClient,
        auth: AuthResponse,
        phone: &PhoneNumber,
    ) -> Result<(), AuthError> {
        self.session = Session::from_auth(auth, phone)?;
        api.set_token(self.session.token.clone());
        if let Some(name) = &self.session.customer_name {
            set_sentry_user(name);
        }
        info!(role = %self.session.role, "Logged in");
        self.save()
    }

    fn save(&self) -> Result<(), AuthError> {
        let key = keys::SESSION;
        let json = serde_json::to_string(&StoredSession::from(&self.session)).map_err(
            |source| StorageError::Encode {
                key: key.to_string(),
                source,
            },
        )?;
        self.storage.set(key, &json).inspect_err(|e| {
            warn!(error = %e, "Failed to persist session");
        })?;
        Ok(())
    }
}

fn load<S: KeyValueStore>(storage: &S) -> Result<Option<Session>, StorageError> {
    let Some(json) = storage.get(keys::SESSION)? else {
        return Ok(None);
    };
    let stored: StoredSession =
        serde_json::from_str(&json).map_err(|source| StorageError::Corrupt {
            key: keys::SESSION.to_string(),
            source,
        })?;
    Ok(Some(stored.into()))
}
