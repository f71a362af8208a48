//! Project phases.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    /// Position within the project's phase sequence.
    pub sequence: u32,
    pub status: PhaseStatus,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhase {
    pub name: String,
    pub sequence: u32,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PhaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

pub struct PhasesApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> PhasesApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Phase>> {
        self.client
            .execute_json(ApiRequest::get(format!("projects/{}/phases", project_id)))
            .await
    }

    pub async fn create(&self, project_id: &str, phase: &NewPhase) -> Result<Phase> {
        self.client
            .execute_json(ApiRequest::post(format!("projects/{}/phases", project_id)).json(phase)?)
            .await
    }

    pub async fn update(&self, phase_id: &str, update: &PhaseUpdate) -> Result<Phase> {
        self.client
            .execute_json(ApiRequest::put(format!("phases/{}", phase_id)).json(update)?)
            .await
    }

    pub async fn delete(&self, phase_id: &str) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::delete(format!("phases/{}", phase_id)))
            .await
    }
}
