//! Top-level client assembly.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::cookie::Jar;
use tracing::debug;

use crate::api::auth::AuthApi;
use crate::api::documents::DocumentsApi;
use crate::api::mail::MailApi;
use crate::api::phases::PhasesApi;
use crate::api::projects::{ProjectHit, ProjectsApi};
use crate::api::stats::StatsApi;
use crate::api::users::{UserHit, UsersApi};
use crate::config::ClientConfig;
use crate::credentials::{CookieSubstrate, CredentialStore, CredentialSubstrate, StateFileSubstrate};
use crate::error::Result;
use crate::search::{SearchCoordinator, SearchQuery};
use crate::session::{SessionEvent, SessionEvents};
use crate::transport::AuthenticatedClient;

/// The assembled Planora client: credential store, refresh coordinator and
/// request pipeline wired together once per process.
///
/// Cheap to clone; all clones share the same session.
#[derive(Clone)]
pub struct PlanoraClient {
    inner: Arc<AuthenticatedClient>,
}

impl PlanoraClient {
    /// Build a client with the in-memory and cookie substrates only (no
    /// session survives the process).
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Build a client whose session is mirrored to a state file and
    /// rehydrated from it before the first call.
    pub fn with_state_file(config: ClientConfig, state_file: impl Into<PathBuf>) -> Result<Self> {
        Self::build(config, Some(state_file.into()))
    }

    fn build(config: ClientConfig, state_file: Option<PathBuf>) -> Result<Self> {
        let config = Arc::new(config);
        let jar = Arc::new(Jar::default());
        let origin = config.api_host()?;

        // Registration order matters for rehydration: the state file carries
        // the user identity, the jar only the token pair.
        let mut substrates: Vec<Box<dyn CredentialSubstrate>> = Vec::new();
        if let Some(path) = state_file {
            substrates.push(Box::new(StateFileSubstrate::new(path)));
        }
        substrates.push(Box::new(CookieSubstrate::new(Arc::clone(&jar), origin)));

        let store = Arc::new(CredentialStore::new(substrates));
        if store.rehydrate() {
            debug!("Session rehydrated from persisted state");
        }

        let events = SessionEvents::new();
        let transport = AuthenticatedClient::new(config, store, jar, events)?;

        Ok(Self {
            inner: Arc::new(transport),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config().as_ref()
    }

    pub fn store(&self) -> &CredentialStore {
        self.inner.store().as_ref()
    }

    /// Subscribe to session lifecycle events (the `LoggedOut` event is the
    /// cue to show the login screen).
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.inner.events().subscribe()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.inner)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(&self.inner)
    }

    pub fn phases(&self) -> PhasesApi<'_> {
        PhasesApi::new(&self.inner)
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(&self.inner)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.inner)
    }

    pub fn mail(&self) -> MailApi<'_> {
        MailApi::new(&self.inner)
    }

    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi::new(&self.inner)
    }

    /// Debounced project-name search, as used by the project picker.
    pub fn project_search(&self) -> SearchCoordinator<ProjectHit> {
        let window = self.config().search_debounce;
        SearchCoordinator::new(Arc::new(self.clone()) as Arc<dyn SearchQuery<ProjectHit>>, window)
    }

    /// Debounced user search, as used by assignment pickers.
    pub fn user_search(&self) -> SearchCoordinator<UserHit> {
        let window = self.config().search_debounce;
        SearchCoordinator::new(Arc::new(self.clone()) as Arc<dyn SearchQuery<UserHit>>, window)
    }
}

#[async_trait::async_trait]
impl SearchQuery<ProjectHit> for PlanoraClient {
    async fn run(&self, term: &str) -> Result<Vec<ProjectHit>> {
        self.projects().search(term).await
    }
}

#[async_trait::async_trait]
impl SearchQuery<UserHit> for PlanoraClient {
    async fn run(&self, term: &str) -> Result<Vec<UserHit>> {
        self.users().search(term).await
    }
}
