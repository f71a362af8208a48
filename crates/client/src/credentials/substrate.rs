//! Persistence substrates behind the credential store.
//!
//! Two substrates back the store: the cookie jar shared with the HTTP client
//! (so tokens ride along with requests) and a JSON state file that survives
//! restarts. Callers never touch a substrate directly; the store fans out.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, warn};
use url::Url;

use super::types::Credential;

/// Cookie names used on the wire, matching the backend contract.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Default cookie lifetime when the backend gave no expiry (7 days).
const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 3600;

/// One persistence substrate for credentials.
///
/// All operations are infallible by contract: a substrate that cannot
/// persist degrades to "credential not restored next start" and logs a
/// warning, it never propagates the failure into `set`/`clear`.
pub trait CredentialSubstrate: Send + Sync {
    /// Write the credential.
    fn persist(&self, credential: &Credential);

    /// Remove any persisted credential. Idempotent.
    fn clear(&self);

    /// Read back whatever this substrate can restore.
    fn load(&self) -> Option<Credential>;
}

/// Substrate writing token cookies into the jar the HTTP client sends from.
///
/// Only the token pair lives here; the user identity is restored from the
/// state-file substrate.
pub struct CookieSubstrate {
    jar: Arc<Jar>,
    origin: Url,
}

impl CookieSubstrate {
    /// `origin` is the API host the cookies are scoped to.
    pub fn new(jar: Arc<Jar>, origin: Url) -> Self {
        Self { jar, origin }
    }

    fn set_cookie(&self, name: &str, value: &str, max_age_secs: i64) {
        let cookie = format!("{}={}; Path=/; Max-Age={}", name, value, max_age_secs);
        self.jar.add_cookie_str(&cookie, &self.origin);
    }
}

impl CredentialSubstrate for CookieSubstrate {
    fn persist(&self, credential: &Credential) {
        let max_age = credential
            .expires_at
            .map(|at| (at - Utc::now()).num_seconds().max(0))
            .unwrap_or(DEFAULT_COOKIE_MAX_AGE_SECS);

        match &credential.access_token {
            Some(token) => self.set_cookie(ACCESS_TOKEN_COOKIE, token, max_age),
            None => self.set_cookie(ACCESS_TOKEN_COOKIE, "", 0),
        }
        match &credential.refresh_token {
            Some(token) => self.set_cookie(REFRESH_TOKEN_COOKIE, token, max_age),
            None => self.set_cookie(REFRESH_TOKEN_COOKIE, "", 0),
        }
    }

    fn clear(&self) {
        self.set_cookie(ACCESS_TOKEN_COOKIE, "", 0);
        self.set_cookie(REFRESH_TOKEN_COOKIE, "", 0);
    }

    fn load(&self) -> Option<Credential> {
        let header = self.jar.cookies(&self.origin)?;
        let raw = header.to_str().ok()?;

        let mut credential = Credential::empty();
        for pair in raw.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            match name {
                ACCESS_TOKEN_COOKIE if !value.is_empty() => {
                    credential.access_token = Some(value.to_string());
                }
                REFRESH_TOKEN_COOKIE if !value.is_empty() => {
                    credential.refresh_token = Some(value.to_string());
                }
                _ => {}
            }
        }

        credential.authenticated().then_some(credential)
    }
}

/// Substrate mirroring the credential to a JSON file on disk.
///
/// This is the durable application-state mirror: it is loaded once at startup
/// to rehydrate the session before the first protected call.
pub struct StateFileSubstrate {
    path: PathBuf,
}

impl StateFileSubstrate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSubstrate for StateFileSubstrate {
    fn persist(&self, credential: &Credential) {
        let json = match serde_json::to_vec_pretty(credential) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize credential state (not persisted)");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create state directory");
                return;
            }
        }

        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "Failed to write credential state");
        }
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove credential state");
            }
        }
    }

    fn load(&self) -> Option<Credential> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "Failed to read credential state");
                }
                return None;
            }
        };

        match serde_json::from_slice::<Credential>(&raw) {
            Ok(credential) if credential.authenticated() => Some(credential),
            Ok(_) => None,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring unreadable credential state");
                None
            }
        }
    }
}
