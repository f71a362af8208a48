//! Core credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    Customer,
}

impl Role {
    /// Whether this role may manage other users and mail configuration.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Identity record of the authenticated user, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// The current authentication credential.
///
/// Invariant: `authenticated()` is true exactly when an access token is
/// present. The struct is only ever handed out as a snapshot; mutation goes
/// through [`CredentialStore`](super::CredentialStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserIdentity>,
    /// When the refresh token stops being usable, if the backend told us.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// An empty, unauthenticated credential.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Bearer value for the Authorization header, if authenticated.
    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[inline]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}
