//! User administration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::Role;
use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient};

use super::Page;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserHit {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

pub struct UsersApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, size: u32) -> Result<Page<User>> {
        let request = ApiRequest::get("users").query("page", page).query("size", size);
        self.client.execute_json(request).await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        self.client
            .execute_json(ApiRequest::get(format!("users/{}", id)))
            .await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        self.client
            .execute_json(ApiRequest::post("users").json(user)?)
            .await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User> {
        self.client
            .execute_json(ApiRequest::put(format!("users/{}", id)).json(update)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::delete(format!("users/{}", id)))
            .await
    }

    /// Name/email search for assignment autocomplete.
    pub async fn search(&self, term: &str) -> Result<Vec<UserHit>> {
        let request = ApiRequest::get("users/search").query("q", term);
        self.client.execute_json(request).await
    }
}
