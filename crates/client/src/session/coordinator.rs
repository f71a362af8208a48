//! Single-flight coordination of token refresh.
//!
//! Any number of requests can fail with 401 at the same time; exactly one
//! refresh call may reach the backend. The first failure becomes the leader
//! and performs the refresh; every concurrent failure parks on a ticket and
//! is settled when the leader's call does, with the new token on success or
//! a uniform rejection on failure.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};

use super::events::{SessionEvent, SessionEvents};

/// Tokens produced by a successful refresh call.
///
/// Rotation of the refresh token is optional on this backend; `None` keeps
/// the stored one.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The one backend call the coordinator is allowed to make.
///
/// Implementations must not route through the authenticated pipeline: a 401
/// from the refresh endpoint itself is a terminal failure, never a trigger
/// for another refresh.
#[async_trait]
pub trait RefreshBackend: Send + Sync {
    async fn refresh(&self) -> Result<RefreshedSession>;
}

/// Outcome delivered to parked tickets: the new access token, or the shared
/// failure reason.
type TicketOutcome = std::result::Result<String, String>;

#[derive(Default)]
struct CoordinatorState {
    /// True while exactly one refresh call is outstanding.
    refreshing: bool,
    /// Parked requests, in arrival order. Non-empty only while `refreshing`.
    tickets: Vec<oneshot::Sender<TicketOutcome>>,
}

/// Serializes refresh attempts. One instance per process, injected into the
/// request pipeline.
pub struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
    store: Arc<CredentialStore>,
    backend: Arc<dyn RefreshBackend>,
    events: SessionEvents,
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<TicketOutcome>),
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        backend: Arc<dyn RefreshBackend>,
        events: SessionEvents,
    ) -> Self {
        Self {
            state: Mutex::new(CoordinatorState::default()),
            store,
            backend,
            events,
        }
    }

    /// Handle an authorization failure from a protected request.
    ///
    /// Returns the access token to retry the failed request with. Errors
    /// mean the session is gone: the store has been cleared and a
    /// [`SessionEvent::LoggedOut`] broadcast.
    pub async fn handle_auth_failure(&self) -> Result<String> {
        // Already logged out: nothing to refresh with, reject without
        // touching coordinator state (prevents a refresh storm when the
        // application is sitting on the login screen).
        if !self.store.get().has_refresh_token() {
            debug!("Auth failure while logged out; rejecting without refresh");
            return Err(Error::Unauthorized);
        }

        // Check-then-set under a sync lock: no await point between observing
        // Idle and claiming the in-flight flag.
        let role = {
            let mut state = self.state.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.tickets.push(tx);
                Role::Follower(rx)
            } else {
                state.refreshing = true;
                Role::Leader
            }
        };

        match role {
            Role::Follower(rx) => {
                debug!("Refresh already in flight; parking request");
                match rx.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(reason)) => Err(Error::SessionExpired(reason)),
                    // Leader dropped mid-settlement (process teardown).
                    Err(_) => Err(Error::SessionExpired("refresh abandoned".into())),
                }
            }
            Role::Leader => self.lead_refresh().await,
        }
    }

    /// Whether a refresh is currently outstanding.
    pub fn refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    async fn lead_refresh(&self) -> Result<String> {
        info!("Access token rejected; starting refresh");
        let outcome = self.backend.refresh().await;

        // Snapshot-and-clear: capture the queue and return to Idle first, so
        // a 401 arriving while we resolve tickets starts the next cycle
        // instead of parking forever.
        let tickets = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.tickets)
        };

        match outcome {
            Ok(session) => {
                info!(parked = tickets.len(), "Token refresh succeeded");
                self.store
                    .update_access_token(session.access_token.clone(), session.refresh_token);
                self.events.emit(SessionEvent::TokenRefreshed);

                for ticket in tickets {
                    let _ = ticket.send(Ok(session.access_token.clone()));
                }
                Ok(session.access_token)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(parked = tickets.len(), error = %reason, "Token refresh failed; forcing logout");

                self.store.clear();
                self.events.emit(SessionEvent::LoggedOut {
                    reason: reason.clone(),
                });

                for ticket in tickets {
                    let _ = ticket.send(Err(reason.clone()));
                }
                Err(Error::SessionExpired(reason))
            }
        }
    }
}
