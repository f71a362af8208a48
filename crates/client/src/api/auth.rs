//! Authentication endpoints: login, logout, session inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::credentials::UserIdentity;
use crate::error::Result;
use crate::session::SessionEvent;
use crate::transport::{ApiRequest, AuthenticatedClient};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: Option<String>,
    user: UserIdentity,
    expires_at: Option<DateTime<Utc>>,
}

/// Auth endpoint group.
pub struct AuthApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Log in with email and password.
    ///
    /// On success the credential store holds the new session and a
    /// [`SessionEvent::LoggedIn`] is broadcast. A 401 here surfaces as
    /// [`Error::Unauthorized`](crate::Error::Unauthorized) (bad credentials),
    /// never as a refresh attempt.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let request = ApiRequest::post("auth/login")
            .json(&LoginRequest { email, password })?
            .exempt_from_auth();

        let response: LoginResponse = self.client.execute_json(request).await?;

        info!(email = %email, "Login successful");
        self.client.store().set(
            response.access_token,
            response.refresh_token,
            Some(response.user.clone()),
            response.expires_at,
        );
        self.client.events().emit(SessionEvent::LoggedIn {
            user: Some(response.user.clone()),
        });

        Ok(response.user)
    }

    /// Log out. Best-effort on the wire: local state clears and the
    /// `LoggedOut` event fires whether or not the backend call lands.
    pub async fn logout(&self) -> Result<()> {
        let request = ApiRequest::post("auth/logout").exempt_from_auth();

        if let Err(e) = self.client.execute_unit(request).await {
            warn!(error = %e, "Logout call failed; clearing local session anyway");
        }

        self.client.store().clear();
        self.client.events().emit(SessionEvent::LoggedOut {
            reason: "logged out".into(),
        });
        Ok(())
    }

    /// The locally known authenticated user, if any.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.client.store().get().user
    }
}
