//! Dashboard statistics.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient};

use super::projects::ProjectStatus;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub projects_total: u64,
    pub projects_by_status: HashMap<ProjectStatus, u64>,
    pub users_total: u64,
    pub documents_total: u64,
}

pub struct StatsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> StatsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        self.client
            .execute_json(ApiRequest::get("stats/dashboard"))
            .await
    }
}
