//! Accounts, credentials, and the signed-in session.

use core::fmt;

use cartwheel_core::{Email, Role, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Values that older clients wrote in place of a missing token.
const TOKEN_SENTINELS: &[&str] = &["null", "undefined"];

/// Profile of an account, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl User {
    /// Whether this account can use the admin console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Opaque bearer credential issued by the backend.
///
/// The client never inspects the token; only the backend decides whether it
/// is valid. `Debug` output is redacted.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token, rejecting empty values and the `"null"` /
    /// `"undefined"` placeholders.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || TOKEN_SENTINELS.contains(&raw) {
            return None;
        }
        Some(Self(SecretString::from(raw.to_string())))
    }

    /// The raw token, for the `Authorization` header and persistence.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for BearerToken {}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// A signed-in identity: profile and token always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub token: BearerToken,
}

/// Fields for creating a new account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Changes to the signed-in account's profile.
///
/// The backend replaces name and email; the password only changes when one
/// is given.
#[derive(Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub password: Option<SecretString>,
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
