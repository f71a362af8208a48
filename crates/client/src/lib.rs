//! Async client for the Planora project-management backend.
//!
//! The interesting machinery is the session core: a [`CredentialStore`]
//! replicated across a cookie jar and a durable state mirror, a
//! [`RefreshCoordinator`](session::RefreshCoordinator) that collapses
//! concurrent 401s into a single token refresh, and the
//! [`AuthenticatedClient`](transport::AuthenticatedClient) pipeline that
//! attaches bearer tokens and retries exactly once after a refresh. On top
//! sit typed endpoint groups for projects, phases, documents, users, mail
//! configuration and dashboard statistics, plus a debounced
//! latest-query-wins [`SearchCoordinator`](search::SearchCoordinator).

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod search;
pub mod session;
pub mod transport;

pub use client::PlanoraClient;
pub use config::{ClientConfig, Environment, Locale};
pub use credentials::{Credential, CredentialStore, Role, UserIdentity};
pub use error::{Error, Result};
pub use session::SessionEvent;
