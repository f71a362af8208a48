//! Project documents: listing, multipart upload, deletion.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient, UploadPayload};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub project_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

pub struct DocumentsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<DocumentMeta>> {
        self.client
            .execute_json(ApiRequest::get(format!("projects/{}/documents", project_id)))
            .await
    }

    /// Upload a document to the upload host. The payload stays in memory so
    /// the pipeline can rebuild the form for its single post-refresh resend.
    pub async fn upload(&self, project_id: &str, payload: UploadPayload) -> Result<DocumentMeta> {
        let request = ApiRequest::upload("documents", payload).query("projectId", project_id);
        self.client.execute_json(request).await
    }

    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::delete(format!("documents/{}", document_id)))
            .await
    }
}
