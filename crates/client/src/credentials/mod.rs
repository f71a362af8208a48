//! Credential ownership and persistence.
//!
//! The [`CredentialStore`] is the single owner of the token pair and user
//! identity; it replicates every change to a cookie-jar substrate (sent with
//! requests) and a state-file substrate (restored at startup).

mod store;
mod substrate;
mod types;

pub use store::CredentialStore;
pub use substrate::{
    ACCESS_TOKEN_COOKIE, CookieSubstrate, CredentialSubstrate, REFRESH_TOKEN_COOKIE,
    StateFileSubstrate,
};
pub use types::{Credential, Role, UserIdentity};
