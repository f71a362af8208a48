//! Outbound mail (SMTP sender) configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiRequest, AuthenticatedClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub sender_address: String,
    pub sender_name: String,
    pub use_tls: bool,
}

pub struct MailApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> MailApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn settings(&self) -> Result<MailSettings> {
        self.client
            .execute_json(ApiRequest::get("mail/settings"))
            .await
    }

    pub async fn update_settings(&self, settings: &MailSettings) -> Result<MailSettings> {
        self.client
            .execute_json(ApiRequest::put("mail/settings").json(settings)?)
            .await
    }
}
