//! Project CRUD and name search.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient};

use super::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    Active,
    OnHold,
    Completed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub customer_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub customer_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Lightweight hit for autocomplete search.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHit {
    pub id: String,
    pub name: String,
}

pub struct ProjectsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, size: u32) -> Result<Page<Project>> {
        let request = ApiRequest::get("projects").query("page", page).query("size", size);
        self.client.execute_json(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Project> {
        self.client
            .execute_json(ApiRequest::get(format!("projects/{}", id)))
            .await
    }

    pub async fn create(&self, project: &NewProject) -> Result<Project> {
        self.client
            .execute_json(ApiRequest::post("projects").json(project)?)
            .await
    }

    pub async fn update(&self, id: &str, update: &ProjectUpdate) -> Result<Project> {
        self.client
            .execute_json(ApiRequest::put(format!("projects/{}", id)).json(update)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::delete(format!("projects/{}", id)))
            .await
    }

    /// Name search for autocomplete; screens wrap this in a
    /// [`SearchCoordinator`](crate::search::SearchCoordinator).
    pub async fn search(&self, term: &str) -> Result<Vec<ProjectHit>> {
        let request = ApiRequest::get("projects/search").query("q", term);
        self.client.execute_json(request).await
    }
}
